use std::{io::Write, sync::Once};

static INIT: Once = Once::new();

/// Install the global logger once.
///
/// `RUST_LOG` takes precedence; otherwise only warnings are shown, or `info` and above when
/// `verbose` is set so request diagnostics become visible.
pub fn init(verbose: bool) {
    INIT.call_once(|| {
        let default_filter = if verbose { "info" } else { "warn" };
        let mut builder =
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter));

        builder.format(|buf, record| {
            writeln!(buf, "[{} {}] {}", record.level(), record.target(), record.args())
        });

        let _ = builder.try_init();
    });
}
