use http::header::{AUTHORIZATION, CONTENT_TYPE, HeaderName, HeaderValue};
use http::{HeaderMap, Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tokio::sync::OnceCell;

use crate::client::errors::ApiError;
use crate::client::transport::HttpTransport;
use crate::client::types::{HttpRequest, HttpResponse, RequestOptions};
use crate::config::EndpointConfig;
use crate::token::TokenCache;

pub(super) type RefreshCell = Arc<OnceCell<Result<bool, ApiError>>>;

/// JSON API client that attaches the bearer credential and re-authenticates transparently.
///
/// A 401 on an authenticated request triggers the shared refresh procedure and the
/// request is re-issued once. Concurrent 401s share a single refresh.
pub struct ApiClient {
    pub(super) transport: Arc<dyn HttpTransport>,
    pub(super) tokens: Arc<TokenCache>,
    pub(super) endpoints: EndpointConfig,
    pub(super) refresh_in_flight: Mutex<Option<RefreshCell>>,
}

impl ApiClient {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        tokens: Arc<TokenCache>,
        endpoints: EndpointConfig,
    ) -> Self {
        Self {
            transport,
            tokens,
            endpoints,
            refresh_in_flight: Mutex::new(None),
        }
    }

    pub fn endpoints(&self) -> &EndpointConfig {
        &self.endpoints
    }

    pub fn tokens(&self) -> &Arc<TokenCache> {
        &self.tokens
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        url: &str,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        self.request(Method::GET, url, None, &options).await
    }

    pub async fn post<B, T>(&self, url: &str, body: &B, options: RequestOptions) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_string(body)?;
        self.request(Method::POST, url, Some(body), &options).await
    }

    pub async fn put<B, T>(&self, url: &str, body: &B, options: RequestOptions) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_string(body)?;
        self.request(Method::PUT, url, Some(body), &options).await
    }

    pub async fn delete<T: DeserializeOwned>(
        &self,
        url: &str,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        self.request(Method::DELETE, url, None, &options).await
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        url: &str,
        body: Option<String>,
        options: &RequestOptions,
    ) -> Result<T, ApiError> {
        let url = self.endpoints.resolve(url);

        let mut response = self.send_once(&method, &url, body.clone(), options).await?;

        if response.status == StatusCode::UNAUTHORIZED && !options.skip_auth {
            tracing::debug!("{} {} returned 401, refreshing access token", method, url);
            // Refresh re-enters `request` through the exchange call
            if Box::pin(self.refresh_access_token()).await? {
                // The retry goes straight to the transport, so it can never refresh again
                response = self.send_once(&method, &url, body, options).await?;
            }
        }

        let value = into_json(response)?;
        serde_json::from_value(value).map_err(ApiError::from)
    }

    async fn send_once(
        &self,
        method: &Method,
        url: &str,
        body: Option<String>,
        options: &RequestOptions,
    ) -> Result<HttpResponse, ApiError> {
        let mut headers = HeaderMap::new();
        for (name, value) in &options.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ApiError::Header(e.to_string()))?;
            let value =
                HeaderValue::from_str(value).map_err(|e| ApiError::Header(e.to_string()))?;
            headers.insert(name, value);
        }
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if !options.skip_auth {
            if let Some(token) = self.tokens.access_token().await? {
                let bearer = HeaderValue::from_str(&format!("Bearer {token}"))
                    .map_err(|e| ApiError::Header(e.to_string()))?;
                headers.insert(AUTHORIZATION, bearer);
            }
        }

        let request = HttpRequest {
            method: method.clone(),
            url: url.to_string(),
            headers,
            body,
        };
        self.transport.send(request).await
    }
}

/// Turns a raw response into JSON. Non-2xx is an error; 204 and unparsable bodies become `{}`.
fn into_json(response: HttpResponse) -> Result<Value, ApiError> {
    if !response.status.is_success() {
        return Err(ApiError::Status {
            status: response.status,
            body: response.body,
        });
    }

    if response.status == StatusCode::NO_CONTENT {
        return Ok(Value::Object(serde_json::Map::new()));
    }

    Ok(serde_json::from_str(&response.body).unwrap_or_else(|_| {
        tracing::debug!("Response body is not JSON, returning empty object");
        Value::Object(serde_json::Map::new())
    }))
}
