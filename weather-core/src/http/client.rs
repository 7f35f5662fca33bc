use std::fmt;

use log::{debug, info, warn};
use reqwest::{Client, header::CONTENT_TYPE};
use serde::de::DeserializeOwned;
use url::Url;

use super::{bridge, descriptor::RequestDescriptor, error::ApiError};

/// Coarse class of an HTTP status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Informational,
    Success,
    Redirection,
    ClientError,
    ServerError,
}

impl StatusClass {
    /// Anything outside 100..=499 that is not a success is treated as a server error.
    pub fn of(status: u16) -> Self {
        match status {
            100..=199 => StatusClass::Informational,
            200..=299 => StatusClass::Success,
            300..=399 => StatusClass::Redirection,
            400..=499 => StatusClass::ClientError,
            _ => StatusClass::ServerError,
        }
    }

    fn into_error(self, status: u16, body: String) -> Option<ApiError> {
        match self {
            StatusClass::Success => None,
            StatusClass::Informational => Some(ApiError::Informational { status, body }),
            StatusClass::Redirection => Some(ApiError::Redirection { status, body }),
            StatusClass::ClientError => Some(ApiError::ClientError { status, body }),
            StatusClass::ServerError => Some(ApiError::ServerError { status, body }),
        }
    }
}

impl fmt::Display for StatusClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StatusClass::Informational => "informational",
            StatusClass::Success => "success",
            StatusClass::Redirection => "redirection",
            StatusClass::ClientError => "client error",
            StatusClass::ServerError => "server error",
        })
    }
}

/// Executes [`RequestDescriptor`]s and decodes JSON responses.
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Debug, Clone, Default)]
pub struct ApiClient {
    http: Client,
}

impl ApiClient {
    pub fn new() -> Self {
        Self { http: Client::new() }
    }

    pub fn with_client(http: Client) -> Self {
        Self { http }
    }

    /// Parse the endpoint and, for GET, append every parameter as a query item.
    pub fn build_url(descriptor: &RequestDescriptor) -> Result<Url, ApiError> {
        let mut url = Url::parse(&descriptor.endpoint)
            .map_err(|e| ApiError::InvalidEndpoint(format!("'{}': {e}", descriptor.endpoint)))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ApiError::InvalidEndpoint(format!(
                "'{}': unsupported scheme '{}'",
                descriptor.endpoint,
                url.scheme()
            )));
        }

        if descriptor.method.is_get() && !descriptor.params.is_empty() {
            // Descriptor params replace endpoint query items with the same key.
            let kept: Vec<(String, String)> = url
                .query_pairs()
                .filter(|(key, _)| descriptor.params.get(key).is_none())
                .map(|(key, value)| (key.into_owned(), value.into_owned()))
                .collect();

            let mut query = url.query_pairs_mut();
            query.clear().extend_pairs(&kept);
            for (key, value) in descriptor.params.iter() {
                query.append_pair(key, &value.to_string());
            }
        }

        Ok(url)
    }

    pub fn build_request(&self, descriptor: &RequestDescriptor) -> Result<reqwest::Request, ApiError> {
        let url = Self::build_url(descriptor)?;

        let mut builder = self
            .http
            .request(descriptor.method.into(), url)
            .header(CONTENT_TYPE, "application/json");

        // `header` appends, so a caller-supplied Content-Type sits next to the default one.
        for (name, value) in &descriptor.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        if !descriptor.method.is_get() {
            if let Some(body) = &descriptor.body {
                builder = builder.body(body.clone());
            } else if !descriptor.params.is_empty() {
                let json = serde_json::to_vec(&descriptor.params).map_err(|e| {
                    ApiError::InvalidRequest(format!("failed to encode parameters as JSON: {e}"))
                })?;
                builder = builder.body(json);
            }
        }

        builder.build().map_err(|e| ApiError::InvalidRequest(e.to_string()))
    }

    /// Execute `descriptor` and report the outcome to `completion`, exactly once.
    ///
    /// Descriptor errors are reported before returning. Otherwise the request runs on a
    /// spawned tokio task, so this must be called from within a tokio runtime.
    pub fn request<T, F>(&self, descriptor: RequestDescriptor, completion: F)
    where
        T: DeserializeOwned + Send + 'static,
        F: FnOnce(Result<T, ApiError>) + Send + 'static,
    {
        let request = match self.build_request(&descriptor) {
            Ok(request) => request,
            Err(err) => {
                warn!("not dispatching request to '{}': {err}", descriptor.endpoint);
                completion(Err(err));
                return;
            }
        };

        debug!(
            "dispatching {} {}{}",
            request.method(),
            request.url().host_str().unwrap_or_default(),
            request.url().path()
        );

        let http = self.http.clone();
        let verbose = descriptor.verbose;

        tokio::spawn(async move {
            let outcome = match http.execute(request).await {
                Ok(response) => {
                    let status = response.status().as_u16();
                    match response.bytes().await {
                        Ok(body) => interpret(status, &body, verbose),
                        Err(err) => Err(ApiError::Transport(err)),
                    }
                }
                Err(err) => Err(ApiError::Transport(err)),
            };

            if let Err(err) = &outcome {
                debug!("request finished with {:?}: {err}", err.kind());
            }

            completion(outcome);
        });
    }

    /// Awaitable form of [`ApiClient::request`].
    pub async fn execute<T>(&self, descriptor: RequestDescriptor) -> Result<T, ApiError>
    where
        T: DeserializeOwned + Send + 'static,
    {
        bridge::await_completion::<T, _>(|resolver| {
            self.request::<T, _>(descriptor, move |outcome| resolver.resolve(outcome))
        })
        .await
    }
}

/// Classify a received response and decode its body on success.
///
/// An empty body is reported before the status is looked at. Non-2xx bodies are logged and
/// never decoded.
pub fn interpret<T: DeserializeOwned>(status: u16, body: &[u8], verbose: bool) -> Result<T, ApiError> {
    if body.is_empty() {
        if verbose {
            info!("Status Code: {status} (empty body)");
        }
        return Err(ApiError::EmptyBody);
    }

    let class = StatusClass::of(status);
    let outcome = match class.into_error(status, String::from_utf8_lossy(body).into_owned()) {
        Some(err) => {
            warn!("HTTP {status} ({class}) response body:\n{}", pretty_body(body));
            Err(err)
        }
        None => serde_json::from_slice(body).map_err(|e| {
            warn!("failed to decode HTTP {status} response: {e}");
            ApiError::Decode(e)
        }),
    };

    if verbose {
        info!("Status Code: {status}\n{}", pretty_body(body));
    }

    outcome
}

/// Pretty-printed JSON if `body` is valid JSON, the lossy UTF-8 text otherwise.
pub fn pretty_body(body: &[u8]) -> String {
    serde_json::from_slice::<serde_json::Value>(body)
        .ok()
        .and_then(|value| serde_json::to_string_pretty(&value).ok())
        .unwrap_or_else(|| String::from_utf8_lossy(body).into_owned())
}
