//! Client and transport configuration.
//!
//! Both values are plain data fixed at construction. The library reads no
//! environment variables; the binary maps its flags onto these types.

use std::time::Duration;

/// Options recognized by [`crate::PokecClient`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientConfig {
    /// Record every operation call and every error through diagnostics.
    pub verbose: bool,
}

impl ClientConfig {
    #[must_use]
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

/// Timeouts applied by [`crate::transport::ReqwestTransport`].
///
/// `None` leaves the corresponding phase unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HttpTimeouts {
    pub request: Option<Duration>,
    pub connect: Option<Duration>,
}

impl HttpTimeouts {
    #[must_use]
    pub fn from_secs(request_secs: u64, connect_secs: u64) -> Self {
        Self {
            request: Some(Duration::from_secs(request_secs)),
            connect: Some(Duration::from_secs(connect_secs)),
        }
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
