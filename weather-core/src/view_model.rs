//! Observable fetch state shared with the presentation layer.
//!
//! [`WeatherViewModel`] is the only owner of [`ViewState`]. Every mutation is applied in one
//! step through a `watch` channel, so subscribers never observe a half-updated state and two
//! completing fetches cannot interleave their updates.
//!
//! Overlapping [`WeatherViewModel::load_weather`] calls are independent: whichever fetch
//! *completes* last owns the snapshot slot, regardless of the order they were issued in.
//! Callers that need request-order semantics must serialize their calls.

use log::{debug, warn};
use tokio::sync::watch;

use crate::{model::{Unit, WeatherModel}, service::WeatherFetcher};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    /// Last successfully fetched snapshot. Failures never clear it.
    pub response: Option<WeatherModel>,
    pub is_loading: bool,
    /// Description of the most recent failure, cleared when a fetch starts or succeeds.
    pub error: Option<String>,
    pub unit: Unit,
}

#[derive(Debug)]
pub struct WeatherViewModel<F> {
    fetcher: F,
    state: watch::Sender<ViewState>,
}

impl<F: WeatherFetcher> WeatherViewModel<F> {
    pub fn new(fetcher: F) -> Self {
        Self::with_unit(fetcher, Unit::default())
    }

    pub fn with_unit(fetcher: F, unit: Unit) -> Self {
        let (state, _) = watch::channel(ViewState { unit, ..ViewState::default() });
        Self { fetcher, state }
    }

    /// Receive every state change from now on.
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> ViewState {
        self.state.borrow().clone()
    }

    pub fn current(&self) -> Option<WeatherModel> {
        self.state.borrow().response.clone()
    }

    pub fn error(&self) -> Option<String> {
        self.state.borrow().error.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading
    }

    pub fn unit(&self) -> Unit {
        self.state.borrow().unit
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Fetch `location` and publish the result. Returns whether the fetch succeeded.
    pub async fn load_weather(&self, location: &str) -> bool {
        self.state.send_modify(|state| {
            state.is_loading = true;
            state.error = None;
        });

        match self.fetcher.fetch_weather(location).await {
            Ok(response) => {
                debug!("loaded weather for '{location}' ({})", response.location.name);
                self.state.send_modify(|state| {
                    state.response = Some(response);
                    state.error = None;
                    state.is_loading = false;
                });
                true
            }
            Err(err) => {
                warn!("failed to load weather for '{location}': {err}");
                self.state.send_modify(|state| {
                    state.error = Some(err.to_string());
                    state.is_loading = false;
                });
                false
            }
        }
    }

    /// Switch between Fahrenheit and Celsius.
    pub fn update_unit(&self) {
        self.state.send_modify(|state| state.unit = state.unit.toggle());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{http::ApiError, model::fixtures};
    use async_trait::async_trait;
    use std::{collections::HashMap, sync::Mutex};
    use tokio::sync::oneshot;

    type Outcome = Result<WeatherModel, ApiError>;

    /// Fetcher whose responses are released by the test through oneshot channels.
    #[derive(Debug, Default)]
    struct GatedFetcher {
        gates: Mutex<HashMap<String, oneshot::Receiver<Outcome>>>,
    }

    impl GatedFetcher {
        fn gate(&self, location: &str) -> oneshot::Sender<Outcome> {
            let (tx, rx) = oneshot::channel();
            self.gates.lock().unwrap().insert(location.to_string(), rx);
            tx
        }
    }

    #[async_trait]
    impl WeatherFetcher for GatedFetcher {
        async fn fetch_weather(&self, location: &str) -> Outcome {
            let gate = self.gates.lock().unwrap().remove(location).expect("no gate for location");
            gate.await.unwrap_or(Err(ApiError::Abandoned))
        }
    }

    #[derive(Debug)]
    struct FixedFetcher(fn(&str) -> Outcome);

    #[async_trait]
    impl WeatherFetcher for FixedFetcher {
        async fn fetch_weather(&self, location: &str) -> Outcome {
            (self.0)(location)
        }
    }

    fn shown_name(state: &ViewState) -> Option<&str> {
        state.response.as_ref().map(|r| r.location.name.as_str())
    }

    #[tokio::test]
    async fn success_stores_snapshot_and_clears_loading() {
        let vm = WeatherViewModel::new(FixedFetcher(|loc| Ok(fixtures::snapshot(loc, 50.0))));

        assert!(vm.load_weather("Oslo").await);

        let state = vm.state();
        assert_eq!(shown_name(&state), Some("Oslo"));
        assert!(!state.is_loading);
        assert_eq!(state.error, None);
    }

    #[tokio::test]
    async fn failure_keeps_previous_snapshot_and_sets_error() {
        let fetcher = GatedFetcher::default();
        let ok = fetcher.gate("Oslo");
        let fail = fetcher.gate("Nowhere");
        let vm = WeatherViewModel::new(fetcher);

        ok.send(Ok(fixtures::snapshot("Oslo", 40.0))).unwrap();
        assert!(vm.load_weather("Oslo").await);

        fail.send(Err(ApiError::ClientError { status: 400, body: "{}".into() })).unwrap();
        assert!(!vm.load_weather("Nowhere").await);

        let state = vm.state();
        assert_eq!(shown_name(&state), Some("Oslo"));
        assert_eq!(state.error.as_deref(), Some("client error (HTTP 400)"));
        assert!(!state.is_loading);
    }

    #[tokio::test]
    async fn loading_is_set_only_while_the_fetch_is_pending() {
        let fetcher = GatedFetcher::default();
        let gate = fetcher.gate("Oslo");
        let vm = WeatherViewModel::new(fetcher);
        let mut rx = vm.subscribe();

        let observer = async {
            let state = rx.wait_for(|s| s.is_loading).await.unwrap().clone();
            assert_eq!(state.error, None);
            assert_eq!(state.response, None);
            gate.send(Ok(fixtures::snapshot("Oslo", 40.0))).unwrap();
        };

        let (loaded, ()) = tokio::join!(vm.load_weather("Oslo"), observer);

        assert!(loaded);
        assert!(!vm.is_loading());
    }

    #[tokio::test]
    async fn starting_a_fetch_clears_the_previous_error() {
        let fetcher = GatedFetcher::default();
        let fail = fetcher.gate("Nowhere");
        let retry = fetcher.gate("Oslo");
        let vm = WeatherViewModel::new(fetcher);

        fail.send(Err(ApiError::EmptyBody)).unwrap();
        assert!(!vm.load_weather("Nowhere").await);
        assert!(vm.error().is_some());

        let mut rx = vm.subscribe();
        let observer = async {
            let state = rx.wait_for(|s| s.is_loading).await.unwrap().clone();
            assert_eq!(state.error, None);
            retry.send(Ok(fixtures::snapshot("Oslo", 40.0))).unwrap();
        };

        let (loaded, ()) = tokio::join!(vm.load_weather("Oslo"), observer);
        assert!(loaded);
        assert_eq!(vm.error(), None);
    }

    #[tokio::test]
    async fn last_completion_wins_over_request_order() {
        let fetcher = GatedFetcher::default();
        let gate_a = fetcher.gate("A");
        let gate_b = fetcher.gate("B");
        let vm = WeatherViewModel::new(fetcher);
        let mut rx = vm.subscribe();

        // A is requested first but B's response arrives first.
        let network = async {
            gate_b.send(Ok(fixtures::snapshot("B", 60.0))).unwrap();
            rx.wait_for(|s| shown_name(s) == Some("B")).await.unwrap();
            gate_a.send(Ok(fixtures::snapshot("A", 30.0))).unwrap();
        };

        let (a, b, ()) = tokio::join!(vm.load_weather("A"), vm.load_weather("B"), network);

        assert!(a && b);
        assert_eq!(shown_name(&vm.state()), Some("A"));
        assert_eq!(vm.current().unwrap().current.temp_f, 30.0);
    }

    #[tokio::test]
    async fn update_unit_toggles_between_f_and_c() {
        let vm = WeatherViewModel::new(FixedFetcher(|_| Err(ApiError::EmptyBody)));

        assert_eq!(vm.unit().as_str(), "f");
        vm.update_unit();
        assert_eq!(vm.unit().as_str(), "c");
        vm.update_unit();
        assert_eq!(vm.unit().as_str(), "f");
    }

    #[tokio::test]
    async fn unit_change_is_published() {
        let vm = WeatherViewModel::with_unit(FixedFetcher(|_| Err(ApiError::EmptyBody)), Unit::Celsius);
        let mut rx = vm.subscribe();

        vm.update_unit();

        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().unit, Unit::Fahrenheit);
    }
}
