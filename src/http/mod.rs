use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::ClientError;

/// Enumerates HTTP methods understood by the lightweight transport abstraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// Minimal HTTP request representation handed to the transport.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: HashMap<String, String>,
    pub body: Option<Vec<u8>>,
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    /// Builds a POST request carrying a JSON body.
    ///
    /// Sets the `Content-Type` header to `application/json` and stores the
    /// provided buffer as the body.
    ///
    /// # Examples
    ///
    /// ```
    /// use kaiwa::http::{HttpMethod, HttpRequest};
    ///
    /// let request = HttpRequest::post_json("https://example.com", br"{}".to_vec());
    /// assert_eq!(request.method, HttpMethod::Post);
    /// assert_eq!(request.headers.get("Content-Type"), Some(&"application/json".to_string()));
    /// ```
    pub fn post_json(url: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            method: HttpMethod::Post,
            url: url.into(),
            headers: HashMap::from([("Content-Type".to_string(), "application/json".to_string())]),
            body: Some(body),
            timeout: None,
        }
    }

    /// Overrides the request headers after construction.
    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    /// Bounds the request with a per-call timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Minimal HTTP response representation.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Converts the body into a UTF-8 string.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Transport`] when the body is not valid UTF-8;
    /// an undecodable body is a transport-contract violation, not a schema one.
    pub fn into_string(self) -> Result<String, ClientError> {
        String::from_utf8(self.body).map_err(|err| ClientError::transport(err.to_string()))
    }
}

/// Transport abstraction used to decouple the client from the concrete HTTP stack.
///
/// The single seam where tests substitute an in-process mock for the real
/// network. Implementations map connection-level failures to
/// [`ClientError::Transport`]; a response that arrived, whatever its status,
/// is returned as [`HttpResponse`] for the caller to classify.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Sends a request and resolves when the full response is available.
    ///
    /// # Errors
    ///
    /// Implementations should map DNS failures, refused connections, and
    /// timeouts to [`ClientError::Transport`].
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ClientError>;
}

/// Thread-safe handle to a transport implementation.
pub type DynHttpTransport = Arc<dyn HttpTransport>;

/// Serializes a body to JSON, attaches headers, and issues a POST request.
///
/// Centralizes JSON serialization so the client does not duplicate header or
/// error handling.
///
/// # Errors
///
/// Returns [`ClientError::Validation`] if serialization fails, otherwise
/// forwards the error raised by [`HttpTransport::send`].
pub async fn post_json_with_headers<T: Serialize>(
    transport: &dyn HttpTransport,
    url: impl Into<String>,
    headers: HashMap<String, String>,
    timeout: Option<Duration>,
    body: &T,
) -> Result<HttpResponse, ClientError> {
    let payload = serde_json::to_vec(body).map_err(|err| {
        ClientError::invalid_field("$", format!("failed to serialize request: {err}"))
    })?;
    let mut request = HttpRequest::post_json(url, payload).with_headers(headers);
    if let Some(timeout) = timeout {
        request = request.with_timeout(timeout);
    }
    transport.send(request).await
}

pub mod reqwest;

#[cfg(test)]
mod tests {
    use super::*;
    use serde::ser;

    /// Transport that panics if `send` is invoked.
    ///
    /// Ensures serialization failures are surfaced before issuing real
    /// network requests.
    struct PanicTransport;

    #[async_trait]
    impl HttpTransport for PanicTransport {
        async fn send(&self, _request: HttpRequest) -> Result<HttpResponse, ClientError> {
            panic!("send should not be called");
        }
    }

    /// Body type that intentionally fails serialization.
    struct NonSerializableBody;

    impl Serialize for NonSerializableBody {
        fn serialize<S>(&self, _serializer: S) -> Result<S::Ok, S::Error>
        where
            S: serde::Serializer,
        {
            Err(ser::Error::custom(
                "intentional serialization failure for test",
            ))
        }
    }

    #[tokio::test]
    async fn post_json_with_headers_returns_validation_on_serde_error() {
        let transport = PanicTransport;
        let body = NonSerializableBody;
        let headers = HashMap::new();

        let result =
            post_json_with_headers(&transport, "http://example.com", headers, None, &body).await;

        match result {
            Err(ClientError::Validation { violations }) => {
                assert_eq!(violations.len(), 1);
                assert!(
                    violations[0].problem.contains("failed to serialize request"),
                    "unexpected violation: {}",
                    violations[0]
                );
            }
            Ok(_) => panic!("expected validation error for non serializable body"),
            other => panic!("unexpected error type: {other:?}"),
        }
    }
}
