use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use inquire::{Confirm, Password, PasswordDisplayMode, Select, Text};
use log::debug;
use std::{
    io::{self, Write},
    sync::Arc,
};
use tokio::task::JoinSet;
use weather_core::{
    ApiClient, Config, FileLocationStore, LocationStore, Unit, WeatherFetcher, WeatherModel,
    WeatherService, WeatherViewModel, service::DEFAULT_ENDPOINT,
};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-tracker", version, about = "Weather Tracker CLI")]
pub struct Cli {
    /// Log status codes and response bodies of every request.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set the API key, endpoint and default display unit.
    Configure,

    /// Show current weather for a location.
    Show {
        /// Free-text location, e.g. "Philadelphia" or "48.85,2.35".
        location: String,

        /// Display unit: "f" or "c". Defaults to the configured unit.
        #[arg(short, long)]
        unit: Option<Unit>,
    },

    /// Look up a location and add it to the saved locations.
    Save {
        location: String,

        /// Do not ask for confirmation.
        #[arg(short, long)]
        yes: bool,
    },

    /// Remove a saved location by name.
    Remove {
        name: String,

        /// Do not ask for confirmation.
        #[arg(short, long)]
        yes: bool,
    },

    /// List saved locations with their current temperature and icon.
    List {
        /// Display unit: "f" or "c". Defaults to the configured unit.
        #[arg(short, long)]
        unit: Option<Unit>,

        /// Only show saved locations whose name contains this text.
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Remove every saved location.
    Clear {
        /// Do not ask for confirmation.
        #[arg(short, long)]
        yes: bool,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let stored = Config::load()?;
        let config = stored.clone().with_env_overrides();
        let verbose = self.verbose || config.verbose;
        debug!("using endpoint {}", config.endpoint());

        match self.command {
            // Edit what is on disk, not what the environment overrides.
            Command::Configure => configure(stored)?,
            Command::Show { location, unit } => {
                let vm = view_model(&config, verbose, unit)?;
                let model = search(&vm, &location).await?;
                let store = open_store()?;

                println!("{}", render::snapshot(&model, vm.unit(), chrono::Utc::now()));
                if store.contains(&model.location.name) {
                    println!("  (saved)");
                }
            }
            Command::Save { location, yes } => {
                let vm = view_model(&config, verbose, None)?;
                let model = search(&vm, &location).await?;
                save(&open_store()?, &model.location.name, yes)?;
            }
            Command::Remove { name, yes } => remove(&open_store()?, &name, yes)?,
            Command::List { unit, search } => {
                let unit = resolve_unit(&config, unit)?;
                let service = WeatherService::from_config(ApiClient::new(), &config).verbose(verbose);
                let store = open_store()?;
                list(&store, Arc::new(service), unit, search.as_deref(), &mut io::stdout()).await?;
            }
            Command::Clear { yes } => clear(&open_store()?, yes)?,
        }

        Ok(())
    }
}

/// The unit given on the command line, else the configured one.
fn resolve_unit(config: &Config, requested: Option<Unit>) -> Result<Unit> {
    match requested {
        Some(unit) => Ok(unit),
        None => config.default_unit(),
    }
}

fn view_model(
    config: &Config,
    verbose: bool,
    unit: Option<Unit>,
) -> Result<WeatherViewModel<WeatherService>> {
    let service = WeatherService::from_config(ApiClient::new(), config).verbose(verbose);
    Ok(WeatherViewModel::with_unit(service, resolve_unit(config, unit)?))
}

fn open_store() -> Result<FileLocationStore> {
    let path = Config::locations_file_path()?;
    FileLocationStore::open(&path)
        .with_context(|| format!("Failed to open saved locations: {}", path.display()))
}

async fn search<F: WeatherFetcher>(vm: &WeatherViewModel<F>, location: &str) -> Result<WeatherModel> {
    if !vm.load_weather(location).await {
        let reason = vm.error().unwrap_or_else(|| "unknown error".to_string());
        bail!("Could not load weather for '{location}': {reason}");
    }

    vm.current().ok_or_else(|| anyhow!("No weather data for '{location}'"))
}

fn confirm(prompt: &str, help: &str, assume_yes: bool) -> Result<bool> {
    if assume_yes {
        return Ok(true);
    }

    Confirm::new(prompt)
        .with_default(false)
        .with_help_message(help)
        .prompt()
        .context("Failed to read confirmation")
}

fn save(store: &impl LocationStore, name: &str, yes: bool) -> Result<()> {
    if store.contains(name) {
        println!("{name} is already in your library.");
        return Ok(());
    }

    if !confirm(&format!("Save {name}?"), &format!("{name} will be added to your library."), yes)? {
        println!("Cancelled.");
        return Ok(());
    }

    let membership = store.subscribe();
    store.create(name)?;
    println!("Saved {name}. {} location(s) in your library.", membership.borrow().len());
    Ok(())
}

fn remove(store: &impl LocationStore, name: &str, yes: bool) -> Result<()> {
    if !store.contains(name) {
        bail!("'{name}' is not a saved location");
    }

    if !confirm(&format!("Remove {name}?"), &format!("{name} will be removed from your library."), yes)? {
        println!("Cancelled.");
        return Ok(());
    }

    let membership = store.subscribe();
    store.delete_by_name(name)?;
    println!("Removed {name}. {} location(s) in your library.", membership.borrow().len());
    Ok(())
}

fn clear(store: &impl LocationStore, yes: bool) -> Result<()> {
    let count = store.list().len();
    if count == 0 {
        println!("No saved locations.");
        return Ok(());
    }

    if !confirm(&format!("Remove all {count} saved location(s)?"), "This cannot be undone.", yes)? {
        println!("Cancelled.");
        return Ok(());
    }

    store.clear()?;
    println!("Removed {count} location(s).");
    Ok(())
}

async fn list<F>(
    store: &impl LocationStore,
    fetcher: Arc<F>,
    unit: Unit,
    search: Option<&str>,
    out: &mut impl Write,
) -> Result<()>
where
    F: WeatherFetcher + 'static,
{
    let needle = search.map(str::to_lowercase);
    let names: Vec<String> = store
        .list()
        .into_iter()
        .filter(|name| needle.as_ref().is_none_or(|n| name.to_lowercase().contains(n.as_str())))
        .collect();

    if names.is_empty() {
        match search {
            Some(q) => writeln!(out, "No saved locations match '{q}'.")?,
            None => writeln!(out, "No locations yet. Use `weather-tracker save <location>` to add one.")?,
        }
        return Ok(());
    }

    let mut tasks = JoinSet::new();
    for (idx, name) in names.iter().cloned().enumerate() {
        let fetcher = Arc::clone(&fetcher);
        tasks.spawn(async move { (idx, fetcher.fetch_weather(&name).await) });
    }

    let mut rows = Vec::with_capacity(names.len());
    while let Some(joined) = tasks.join_next().await {
        rows.push(joined.context("Weather lookup task failed")?);
    }
    rows.sort_by_key(|(idx, _)| *idx);

    for ((_, outcome), name) in rows.iter().zip(&names) {
        writeln!(out, "{}", render::location_row(name, outcome.as_ref(), unit))?;
    }

    Ok(())
}

fn configure(mut config: Config) -> Result<()> {
    let key = Password::new("weatherapi.com API key:")
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked)
        .with_help_message("Leave empty to keep the current key")
        .prompt()
        .context("Failed to read API key")?;
    if !key.trim().is_empty() {
        config.set_api_key(key.trim().to_string());
    }

    let current_endpoint = config.endpoint().to_string();
    let endpoint = Text::new("Endpoint:")
        .with_default(&current_endpoint)
        .prompt()
        .context("Failed to read endpoint")?;
    config.endpoint = Some(endpoint.trim().to_string())
        .filter(|e| !e.is_empty() && e != DEFAULT_ENDPOINT);

    let units = vec![Unit::Fahrenheit.label(), Unit::Celsius.label()];
    let chosen = Select::new("Display unit:", units)
        .with_starting_cursor(unit_cursor(&config))
        .prompt()
        .context("Failed to read display unit")?;
    config.set_unit(chosen.parse()?);

    config.save()?;
    println!("Configuration saved to {}", Config::config_file_path()?.display());
    Ok(())
}

/// Preselected row of the unit prompt. An unreadable stored unit starts on the default.
fn unit_cursor(config: &Config) -> usize {
    usize::from(config.default_unit().unwrap_or_default() == Unit::Celsius)
}
