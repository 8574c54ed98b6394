use http::{HeaderMap, Method, StatusCode};

/// Per-request options of the pipeline.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Do not attach the bearer credential and never refresh on 401.
    /// Used by the refresh-token exchange itself.
    pub skip_auth: bool,
    /// Extra headers, applied before `Content-Type` and `Authorization`.
    pub headers: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn skip_auth() -> Self {
        Self {
            skip_auth: true,
            ..Self::default()
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }
}

/// A fully prepared request handed to the transport.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<String>,
}

/// Raw response as read from the wire.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}
