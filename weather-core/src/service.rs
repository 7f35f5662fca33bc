use async_trait::async_trait;
use std::{fmt, sync::Arc};

use crate::{
    Config,
    http::{ApiClient, ApiError, RequestDescriptor},
    model::WeatherModel,
};

/// weatherapi.com current-conditions endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.weatherapi.com/v1/current.json";

/// Source of weather snapshots for a free-text location query.
#[async_trait]
pub trait WeatherFetcher: Send + Sync + fmt::Debug {
    async fn fetch_weather(&self, location: &str) -> Result<WeatherModel, ApiError>;
}

#[async_trait]
impl<F: WeatherFetcher + ?Sized> WeatherFetcher for Arc<F> {
    async fn fetch_weather(&self, location: &str) -> Result<WeatherModel, ApiError> {
        (**self).fetch_weather(location).await
    }
}

/// Fetches current conditions from weatherapi.com through an [`ApiClient`].
#[derive(Clone)]
pub struct WeatherService {
    client: ApiClient,
    endpoint: String,
    api_key: String,
    verbose: bool,
}

impl WeatherService {
    pub fn new(client: ApiClient, endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            verbose: false,
        }
    }

    /// The key is read once here; an unset key is sent as an empty string.
    pub fn from_config(client: ApiClient, config: &Config) -> Self {
        Self::new(client, config.endpoint(), config.api_key()).verbose(config.verbose)
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn descriptor(&self, location: &str) -> RequestDescriptor {
        RequestDescriptor::get(self.endpoint.as_str())
            .param("q", location)
            .param("key", self.api_key.as_str())
            .verbose(self.verbose)
    }
}

impl fmt::Debug for WeatherService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeatherService")
            .field("endpoint", &self.endpoint)
            .field("api_key", &if self.api_key.is_empty() { "<unset>" } else { "<redacted>" })
            .field("verbose", &self.verbose)
            .finish()
    }
}

#[async_trait]
impl WeatherFetcher for WeatherService {
    async fn fetch_weather(&self, location: &str) -> Result<WeatherModel, ApiError> {
        self.client.execute(self.descriptor(location)).await
    }
}
