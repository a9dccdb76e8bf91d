//! services/client/src/adapters/http.rs
//!
//! The request dispatcher: the one place that turns a service, a path and an
//! options bag into an HTTP call and normalizes what comes back. Every HTTP
//! adapter goes through here.

use quiz_core::ports::{PortError, PortResult};
use reqwest::{
    header::{ACCEPT, CONTENT_TYPE},
    Client, Method, StatusCode, Url,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::config::ServiceEndpoints;

//=========================================================================================
// Request & Response Types
//=========================================================================================

/// The backend a request is addressed to. Each has its own base URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Auth,
    Test,
    Content,
}

/// Method, body, headers and query for one call.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: Method,
    pub body: Option<Value>,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn post() -> Self {
        Self {
            method: Method::POST,
            ..Self::default()
        }
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn query(mut self, key: &str, value: impl Into<String>) -> Self {
        self.query.push((key.to_string(), value.into()));
        self
    }

    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }
}

/// A successful (2xx) response.
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatched {
    pub status: u16,
    /// Parsed body when the response declared a JSON content type.
    pub data: Option<Value>,
    /// Raw body when the response was non-empty and not JSON.
    pub text: Option<String>,
}

impl Dispatched {
    /// Deserializes the JSON body, failing when there was none.
    pub fn decode<T: DeserializeOwned>(self) -> PortResult<T> {
        let data = self
            .data
            .ok_or_else(|| PortError::Decode("response carried no JSON body".to_string()))?;
        serde_json::from_value(data).map_err(|e| PortError::Decode(e.to_string()))
    }
}

//=========================================================================================
// The Dispatcher
//=========================================================================================

/// Issues calls against the configured backends with a shared cookie store,
/// so the session cookie set by login rides along on every later request.
#[derive(Clone)]
pub struct HttpDispatcher {
    client: Client,
    endpoints: ServiceEndpoints,
}

impl HttpDispatcher {
    pub fn new(
        endpoints: ServiceEndpoints,
        timeout: Option<Duration>,
    ) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder().cookie_store(true);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            endpoints,
        })
    }

    pub fn base_url(&self, service: Service) -> &Url {
        match service {
            Service::Auth => &self.endpoints.auth,
            Service::Test => &self.endpoints.test,
            Service::Content => &self.endpoints.content,
        }
    }

    /// Joins a relative path onto the service base URL, keeping the base path.
    pub fn url_for(&self, service: Service, path: &str) -> PortResult<Url> {
        validate_path(path)?;
        let base = self.base_url(service).as_str().trim_end_matches('/');
        Url::parse(&format!("{}{}", base, path))
            .map_err(|e| PortError::InvalidRequest(format!("{}: {}", path, e)))
    }

    /// Issues one call. No retry, no cache.
    #[instrument(
        skip(self, options),
        fields(request_id = %Uuid::new_v4(), method = %options.method)
    )]
    pub async fn dispatch(
        &self,
        service: Service,
        path: &str,
        options: RequestOptions,
    ) -> PortResult<Dispatched> {
        let url = self.url_for(service, path)?;

        let mut request = self
            .client
            .request(options.method, url)
            .header(ACCEPT, "application/json");
        for (name, value) in &options.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if !options.query.is_empty() {
            request = request.query(&options.query);
        }
        if let Some(body) = &options.body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            warn!("Request could not be sent: {}", e);
            PortError::Transport(e.to_string())
        })?;

        let status = response.status();
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.contains("json"))
            .unwrap_or(false);
        let body = response
            .bytes()
            .await
            .map_err(|e| PortError::Transport(e.to_string()))?;

        if status == StatusCode::UNAUTHORIZED {
            debug!("Backend reported no authenticated session.");
            return Err(PortError::Unauthorized);
        }

        if !status.is_success() {
            let message = error_message(status, &body);
            warn!(status = status.as_u16(), "Request failed: {}", message);
            return Err(PortError::Http {
                status: status.as_u16(),
                message,
            });
        }

        let (data, text) = if body.is_empty() {
            (None, None)
        } else if is_json {
            let value: Value =
                serde_json::from_slice(&body).map_err(|e| PortError::Decode(e.to_string()))?;
            (Some(value), None)
        } else {
            (None, Some(String::from_utf8_lossy(&body).into_owned()))
        };

        debug!(status = status.as_u16(), "Request completed.");
        Ok(Dispatched {
            status: status.as_u16(),
            data,
            text,
        })
    }
}

//=========================================================================================
// Helpers
//=========================================================================================

fn validate_path(path: &str) -> PortResult<()> {
    let invalid = |reason: &str| Err(PortError::InvalidRequest(format!("{} ({})", reason, path)));
    if !path.starts_with('/') {
        return invalid("path must start with '/'");
    }
    if path.starts_with("//") || path.contains("://") {
        return invalid("path must be relative to the service");
    }
    if path.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return invalid("path must not contain whitespace");
    }
    Ok(())
}

/// Best-effort message from a JSON error body, falling back to the status line.
fn error_message(status: StatusCode, body: &[u8]) -> String {
    serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|v| {
            ["message", "error"]
                .iter()
                .find_map(|key| v.get(key).and_then(Value::as_str).map(str::to_string))
        })
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .map(str::to_string)
                .unwrap_or_else(|| status.to_string())
        })
}

/// Builds a `/a/b/c` path from raw segments, percent-encoding each one.
pub fn segment_path(segments: &[&str]) -> PortResult<String> {
    let mut scratch = Url::parse("http://localhost/")
        .map_err(|e| PortError::Unexpected(e.to_string()))?;
    scratch
        .path_segments_mut()
        .map_err(|_| PortError::Unexpected("base URL cannot hold a path".to_string()))?
        .clear()
        .extend(segments);
    Ok(scratch.path().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dispatcher() -> HttpDispatcher {
        let endpoints = ServiceEndpoints {
            auth: Url::parse("http://auth.local/api").unwrap(),
            test: Url::parse("http://test.local/").unwrap(),
            content: Url::parse("http://content.local/v1/").unwrap(),
        };
        HttpDispatcher::new(endpoints, None).unwrap()
    }

    #[test]
    fn url_keeps_the_service_base_path() {
        let d = dispatcher();
        assert_eq!(
            d.url_for(Service::Auth, "/auth/me").unwrap().as_str(),
            "http://auth.local/api/auth/me"
        );
        assert_eq!(
            d.url_for(Service::Test, "/test/history").unwrap().as_str(),
            "http://test.local/test/history"
        );
        assert_eq!(
            d.url_for(Service::Content, "/content/book").unwrap().as_str(),
            "http://content.local/v1/content/book"
        );
    }

    #[test]
    fn rejects_paths_that_are_not_relative_fragments() {
        let d = dispatcher();
        for bad in ["auth/me", "//evil.local/x", "/a://b", "/with space"] {
            assert!(
                matches!(d.url_for(Service::Auth, bad), Err(PortError::InvalidRequest(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn error_message_prefers_json_then_status_line() {
        assert_eq!(
            error_message(StatusCode::BAD_REQUEST, br#"{"message":"bad id"}"#),
            "bad id"
        );
        assert_eq!(
            error_message(StatusCode::CONFLICT, br#"{"error":"taken"}"#),
            "taken"
        );
        assert_eq!(
            error_message(StatusCode::INTERNAL_SERVER_ERROR, b"<html>oops</html>"),
            "Internal Server Error"
        );
    }

    #[test]
    fn segments_are_percent_encoded() {
        assert_eq!(segment_path(&["abc-1_2.~"]).unwrap(), "/abc-1_2.~");
        assert_eq!(segment_path(&["share", "a b/c"]).unwrap(), "/share/a%20b%2Fc");
        assert_eq!(
            segment_path(&["response", "share", "42", "김"]).unwrap(),
            "/response/share/42/%EA%B9%80"
        );
    }
}
