//! HTTP transport — the only component that touches the network.
//!
//! DESIGN
//! ======
//! `Transport` is the seam between session logic and HTTPS. The client hands
//! it a fully built request (host, path, headers, body) and gets back the
//! status, every `set-cookie` value, and the body text. `ReqwestTransport`
//! is the production implementation; tests substitute an in-memory one.
//!
//! `set-cookie` headers are collected before the body is read, and the body
//! is consumed chunk by chunk.

use reqwest::header::SET_COOKIE;

use crate::config::HttpTimeouts;
use crate::wire::HTTPS_PORT;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub host: &'static str,
    pub path: String,
    pub headers: Vec<(&'static str, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    #[must_use]
    pub fn url(&self) -> String {
        format!("https://{}:{HTTPS_PORT}{}", self.host, self.path)
    }

    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub set_cookies: Vec<String>,
    pub body: String,
}

/// The exchange did not complete (connect, TLS, I/O, or timeout).
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP client build failed: {0}")]
    ClientBuild(String),

    #[error("{0}")]
    Exchange(String),
}

// =============================================================================
// TRAIT
// =============================================================================

/// Issues one HTTPS request. Enables mocking in tests.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// # Errors
    ///
    /// Returns a [`TransportError`] only when no response was obtained. A
    /// response carrying an error payload or status is still `Ok`.
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

// =============================================================================
// REQWEST
// =============================================================================

pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a transport with no timeouts.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialized.
    pub fn new() -> Result<Self, TransportError> {
        Self::with_timeouts(HttpTimeouts::default())
    }

    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialized.
    pub fn with_timeouts(timeouts: HttpTimeouts) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeouts.request {
            builder = builder.timeout(timeout);
        }
        if let Some(timeout) = timeouts.connect {
            builder = builder.connect_timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| TransportError::ClientBuild(e.to_string()))?;
        Ok(Self { http })
    }
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
        };

        let mut builder = self.http.request(method, request.url());
        for (name, value) in &request.headers {
            builder = builder.header(*name, value);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let mut response = builder
            .send()
            .await
            .map_err(|e| TransportError::Exchange(e.to_string()))?;

        let status = response.status().as_u16();
        let set_cookies = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(str::to_string)
            .collect();

        let mut bytes = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| TransportError::Exchange(e.to_string()))?
        {
            bytes.extend_from_slice(&chunk);
        }
        let body = String::from_utf8_lossy(&bytes).into_owned();

        Ok(HttpResponse { status, set_cookies, body })
    }
}

#[cfg(test)]
#[path = "transport_test.rs"]
mod tests;
