//! Core library for the `weather-tracker` CLI.
//!
//! This crate defines:
//! - A generic JSON-over-HTTPS request executor with typed outcomes
//! - The weather fetch service built on top of it
//! - Observable view state that coordinates fetches
//! - Configuration and the saved-locations store
//! - Shared domain models (weather snapshots, display units)
//!
//! It is used by `weather-tracker`, but can also be reused by other binaries or services.

pub mod config;
pub mod http;
pub mod locations;
pub mod model;
pub mod service;
pub mod view_model;

pub use config::Config;
pub use http::{ApiClient, ApiError, ErrorKind, HttpMethod, ParamValue, Params, RequestDescriptor};
pub use locations::{FileLocationStore, LocationStore, StoreError};
pub use model::{Condition, CurrentData, LocationData, Unit, WeatherModel};
pub use service::{WeatherFetcher, WeatherService};
pub use view_model::{ViewState, WeatherViewModel};
