//
//  stash-client
//  api/transport.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # HTTP Transport
//!
//! The transport is the shared `reqwest::Client` every request runs through.
//! It owns the connection pool, the per-request timeout and the TLS policy, and
//! is read-only once built. `reqwest::Client` is reference counted internally,
//! so cloning it hands out the same pool to any number of [`StashClient`]s.
//!
//! Certificate validation is **on** unless explicitly disabled with
//! [`TransportConfig::accept_invalid_certs`].
//!
//! [`StashClient`]: super::StashClient

use std::time::Duration;

use reqwest::Client;
use tracing::warn;

use super::StashError;

/// Per-request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Settings for the shared HTTP transport.
///
/// # Example
///
/// ```rust,no_run
/// use std::time::Duration;
/// use stash_client::api::TransportConfig;
///
/// let http = TransportConfig::default()
///     .timeout(Duration::from_secs(30))
///     .build()?;
/// # Ok::<(), stash_client::api::StashError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    /// Upper bound for a whole request, connect through body.
    pub timeout: Duration,

    /// Skip TLS certificate validation. Only for self-signed lab servers.
    pub accept_invalid_certs: bool,

    /// Value of the `User-Agent` header.
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            accept_invalid_certs: false,
            user_agent: format!("stash/{}", crate::VERSION),
        }
    }
}

impl TransportConfig {
    /// Sets the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Opts in to (or out of) accepting invalid TLS certificates.
    pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    /// Builds the shared HTTP client.
    pub fn build(&self) -> Result<Client, StashError> {
        if self.accept_invalid_certs {
            warn!("TLS certificate validation is disabled for this client");
        }

        Client::builder()
            .user_agent(&self.user_agent)
            .timeout(self.timeout)
            .danger_accept_invalid_certs(self.accept_invalid_certs)
            .build()
            .map_err(StashError::Transport)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_keep_tls_validation_on() {
        let config = TransportConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert!(!config.accept_invalid_certs);
        assert!(config.user_agent.starts_with("stash/"));
    }

    #[test]
    fn test_builder_methods() {
        let config = TransportConfig::default()
            .timeout(Duration::from_secs(3))
            .accept_invalid_certs(true);
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert!(config.accept_invalid_certs);
        assert!(config.build().is_ok());
    }
}
