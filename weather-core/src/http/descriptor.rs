use super::{method::HttpMethod, params::{ParamValue, Params}};

/// Structured description of an outbound request.
///
/// For GET requests `params` become query items. For every other method an explicit `body`
/// is sent verbatim, and otherwise non-empty `params` are sent as a JSON object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestDescriptor {
    pub endpoint: String,
    pub method: HttpMethod,
    pub params: Params,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
    /// Log the status code and pretty-printed body once the response is classified.
    pub verbose: bool,
}

impl RequestDescriptor {
    pub fn new(method: HttpMethod, endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            method,
            ..Self::default()
        }
    }

    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, endpoint)
    }

    pub fn post(endpoint: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, endpoint)
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.params.insert(key, value);
        self
    }

    pub fn params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}
