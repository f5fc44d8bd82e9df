//! Typed HTTP client issuing one call per invocation against a base address.
//!
//! # Design
//! Each verb is split into a `build_*` method that produces an `HttpRequest`
//! with every header it needs, and `parse_response`, which applies the status
//! contract. The async `get`/`post`/`put`/`delete` methods compose the two
//! around a single awaited `Transport::send`.
//!
//! Header rules differ by verb and callers rely on the difference:
//! - `get` attaches `Accept`, the cache header and `Authorization` only when
//!   a non-empty token is given; without one it sends no headers at all.
//! - `post`, `put` and `delete` always attach `Accept` and the cache header,
//!   and add `Authorization` only for a non-empty token.
//!
//! `delete` carries a JSON body like `post` and `put` do.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use reqwest::header::HeaderValue;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::config::{HttpClientConfig, OptionsProvider};
use crate::connectivity::{Connectivity, StaticConnectivity};
use crate::error::ClientError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::logger::{AppLogger, TracingLogger};
use crate::transport::{ReqwestTransport, Transport};

pub const ACCEPT: &str = "Accept";
pub const AUTHORIZATION: &str = "Authorization";
pub const CONTENT_TYPE: &str = "Content-Type";

/// HTTP client whose request and response bodies are `T`, serialized as JSON.
///
/// Cloning is cheap: clones share the transport, logger, connectivity signal
/// and configuration.
pub struct TypedHttpClient<T> {
    transport: Arc<dyn Transport>,
    logger: Arc<dyn AppLogger>,
    connectivity: Arc<dyn Connectivity>,
    config: Arc<HttpClientConfig>,
    _body: PhantomData<fn() -> T>,
}

impl<T> Clone for TypedHttpClient<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            logger: Arc::clone(&self.logger),
            connectivity: Arc::clone(&self.connectivity),
            config: Arc::clone(&self.config),
            _body: PhantomData,
        }
    }
}

impl<T> fmt::Debug for TypedHttpClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedHttpClient")
            .field("body", &std::any::type_name::<T>())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<T> TypedHttpClient<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(
        transport: Arc<dyn Transport>,
        logger: Arc<dyn AppLogger>,
        connectivity: Arc<dyn Connectivity>,
        options: &impl OptionsProvider,
    ) -> Self {
        Self {
            transport,
            logger,
            connectivity,
            config: options.options(),
            _body: PhantomData,
        }
    }

    /// Reqwest transport, tracing logger and an always-online signal.
    pub fn with_defaults(options: &impl OptionsProvider) -> Self {
        Self::new(
            Arc::new(ReqwestTransport::new()),
            Arc::new(TracingLogger::for_type::<T>()),
            Arc::new(StaticConnectivity::online()),
            options,
        )
    }

    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    pub fn logger(&self) -> &dyn AppLogger {
        self.logger.as_ref()
    }

    /// Whether the network is reachable. The call methods never check this.
    pub fn is_connected(&self) -> bool {
        self.connectivity.is_connected()
    }

    // -----------------------------------------------------------------------
    // Request construction
    // -----------------------------------------------------------------------

    pub fn build_get(&self, path: &str, token: Option<&str>) -> Result<HttpRequest, ClientError> {
        require_path(path)?;
        let mut headers = Vec::new();
        if let Some(token) = non_empty(token) {
            self.push_content_negotiation(&mut headers);
            headers.push((AUTHORIZATION.to_string(), bearer(token)?));
        }
        Ok(HttpRequest {
            method: HttpMethod::Get,
            url: self.url(path),
            headers,
            body: None,
        })
    }

    pub fn build_post(&self, path: &str, body: &T, token: Option<&str>) -> Result<HttpRequest, ClientError> {
        self.build_with_body(HttpMethod::Post, path, body, token)
    }

    pub fn build_put(&self, path: &str, body: &T, token: &str) -> Result<HttpRequest, ClientError> {
        self.build_with_body(HttpMethod::Put, path, body, Some(token))
    }

    pub fn build_delete(&self, path: &str, body: &T, token: &str) -> Result<HttpRequest, ClientError> {
        self.build_with_body(HttpMethod::Delete, path, body, Some(token))
    }

    fn build_with_body(
        &self,
        method: HttpMethod,
        path: &str,
        body: &T,
        token: Option<&str>,
    ) -> Result<HttpRequest, ClientError> {
        require_path(path)?;
        let payload = serde_json::to_string(body).map_err(|e| ClientError::Serialization(e.to_string()))?;

        let mut headers = Vec::with_capacity(4);
        self.push_content_negotiation(&mut headers);
        if let Some(token) = non_empty(token) {
            headers.push((AUTHORIZATION.to_string(), bearer(token)?));
        }
        headers.push((
            CONTENT_TYPE.to_string(),
            format!("{}; charset=utf-8", self.config.application),
        ));

        Ok(HttpRequest {
            method,
            url: self.url(path),
            headers,
            body: Some(payload),
        })
    }

    fn push_content_negotiation(&self, headers: &mut Vec<(String, String)>) {
        headers.push((ACCEPT.to_string(), self.config.application.clone()));
        headers.push((self.config.cache.clone(), self.config.no_cache.clone()));
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_address)
    }

    // -----------------------------------------------------------------------
    // Response handling
    // -----------------------------------------------------------------------

    /// Body text for 2xx responses, `ClientError::HttpRequest` otherwise.
    pub fn parse_response(&self, response: HttpResponse) -> Result<String, ClientError> {
        if response.is_success() {
            return Ok(response.body);
        }
        Err(ClientError::HttpRequest {
            status: response.status,
            reason: response.reason,
        })
    }

    fn decode(&self, text: &str) -> Result<T, ClientError> {
        serde_json::from_str(text).map_err(|e| ClientError::Deserialization(e.to_string()))
    }

    async fn execute(&self, request: HttpRequest) -> Result<String, ClientError> {
        let method = request.method.as_str();
        let url = request.url.clone();
        debug!(method, url = %url, "sending request");

        let response = self.transport.send(request).await?;
        if !response.is_success() {
            debug!(method, url = %url, status = response.status, reason = %response.reason, "request failed");
        }
        self.parse_response(response)
    }

    // -----------------------------------------------------------------------
    // Calls
    // -----------------------------------------------------------------------

    pub async fn get(&self, path: &str, token: Option<&str>) -> Result<String, ClientError> {
        let request = self.build_get(path, token)?;
        self.execute(request).await
    }

    pub async fn post(&self, path: &str, body: &T, token: Option<&str>) -> Result<String, ClientError> {
        let request = self.build_post(path, body, token)?;
        self.execute(request).await
    }

    pub async fn put(&self, path: &str, body: &T, token: &str) -> Result<String, ClientError> {
        let request = self.build_put(path, body, token)?;
        self.execute(request).await
    }

    pub async fn delete(&self, path: &str, body: &T, token: &str) -> Result<String, ClientError> {
        let request = self.build_delete(path, body, token)?;
        self.execute(request).await
    }

    pub async fn get_typed(&self, path: &str, token: Option<&str>) -> Result<T, ClientError> {
        let text = self.get(path, token).await?;
        self.decode(&text)
    }

    pub async fn post_typed(&self, path: &str, body: &T, token: Option<&str>) -> Result<T, ClientError> {
        let text = self.post(path, body, token).await?;
        self.decode(&text)
    }

    pub async fn put_typed(&self, path: &str, body: &T, token: &str) -> Result<T, ClientError> {
        let text = self.put(path, body, token).await?;
        self.decode(&text)
    }

    pub async fn delete_typed(&self, path: &str, body: &T, token: &str) -> Result<T, ClientError> {
        let text = self.delete(path, body, token).await?;
        self.decode(&text)
    }
}

fn require_path(path: &str) -> Result<(), ClientError> {
    if path.is_empty() {
        return Err(ClientError::InvalidArgument("request path is empty".to_string()));
    }
    Ok(())
}

fn non_empty(token: Option<&str>) -> Option<&str> {
    token.filter(|t| !t.is_empty())
}

/// `Bearer <token>`, rejecting tokens that cannot appear in a header value.
fn bearer(token: &str) -> Result<String, ClientError> {
    let value = format!("Bearer {token}");
    if HeaderValue::from_str(&value).is_err() {
        return Err(ClientError::InvalidArgument(
            "token contains characters not allowed in a header".to_string(),
        ));
    }
    Ok(value)
}
