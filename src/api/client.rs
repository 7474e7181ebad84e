//
//  stash-client
//  api/client.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Stash API Client
//!
//! [`StashClient`] is the single choke point every API call flows through:
//!
//! ```text
//! resource method -> WireRequest::build -> consume -> expect -> decode
//! ```
//!
//! The client holds no per-call state, so one instance can be shared freely
//! across tasks. Resource methods live in [`super::server`] as further `impl`
//! blocks on this type.

use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;
use url::Url;

use super::pagination::{self, Page};
use super::request::{ClientIdentity, WireRequest};
use super::response::{self, RawResponse};
use super::transport::TransportConfig;
use super::StashError;

/// Payload placeholder for requests without a body.
pub const NO_BODY: Option<&()> = None;

/// Typed client for a Stash / Bitbucket Server instance.
///
/// # Example
///
/// ```rust,no_run
/// use stash_client::api::StashClient;
///
/// # async fn example() -> Result<(), stash_client::api::StashError> {
/// let client = StashClient::new("admin", "secret", "https://stash.example.com/")?;
/// let repos = client.list_repositories().await?;
/// println!("{} repositories", repos.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct StashClient {
    http: Client,
    identity: ClientIdentity,
}

impl StashClient {
    /// Creates a client with the default transport (10s timeout, TLS validated).
    ///
    /// Empty `username` or `password` makes every request anonymous.
    pub fn new(username: &str, password: &str, base_url: &str) -> Result<Self, StashError> {
        let identity = ClientIdentity::new(username, password, base_url)?;
        Self::with_transport(identity, &TransportConfig::default())
    }

    /// Creates a client with its own transport built from `transport`.
    pub fn with_transport(
        identity: ClientIdentity,
        transport: &TransportConfig,
    ) -> Result<Self, StashError> {
        Ok(Self::with_http(identity, transport.build()?))
    }

    /// Creates a client over an existing, possibly shared, HTTP client.
    pub fn with_http(identity: ClientIdentity, http: Client) -> Self {
        Self { http, identity }
    }

    pub fn identity(&self) -> &ClientIdentity {
        &self.identity
    }

    pub fn base_url(&self) -> &Url {
        self.identity.base_url()
    }

    /// Builds a wire request for this client's identity.
    pub fn build_request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        payload: Option<&B>,
    ) -> Result<WireRequest, StashError> {
        WireRequest::build(&self.identity, method, path, payload)
    }

    /// Executes a request and classifies its status. See [`response::consume`].
    pub async fn consume(&self, request: WireRequest) -> Result<RawResponse, StashError> {
        response::consume(&self.http, request).await
    }

    /// Executes a request and requires its status to be one of `statuses`.
    ///
    /// # Errors
    ///
    /// Anything [`consume`](Self::consume) reports, or
    /// [`StashError::UnexpectedStatus`] when the status is not accepted.
    pub async fn expect(
        &self,
        request: WireRequest,
        statuses: &[u16],
    ) -> Result<RawResponse, StashError> {
        let raw = self.consume(request).await?;
        if statuses.contains(&raw.status) {
            Ok(raw)
        } else {
            debug!(status = raw.status, ?statuses, "unexpected server status");
            Err(StashError::unexpected_status(raw.status))
        }
    }

    /// Builds, executes and validates a request, returning the raw body.
    pub async fn request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        payload: Option<&B>,
        statuses: &[u16],
    ) -> Result<Vec<u8>, StashError> {
        let request = self.build_request(method, path, payload)?;
        Ok(self.expect(request, statuses).await?.body)
    }

    /// Like [`request`](Self::request), decoding the body into `T`.
    pub async fn request_json<T, B>(
        &self,
        method: Method,
        path: &str,
        payload: Option<&B>,
        statuses: &[u16],
    ) -> Result<T, StashError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = self.request(method, path, payload, statuses).await?;
        decode(body)
    }

    /// Fetches a single page of a paged endpoint.
    pub(crate) async fn fetch_page<T: DeserializeOwned>(
        &self,
        path: &str,
        start: u32,
    ) -> Result<Page<T>, StashError> {
        self.request_json(Method::GET, &pagination::paged_path(path, start), NO_BODY, &[200])
            .await
    }
}

/// Decodes a success body, keeping the raw bytes on failure.
pub fn decode<T: DeserializeOwned>(body: Vec<u8>) -> Result<T, StashError> {
    serde_json::from_slice(&body).map_err(|source| StashError::Decoding { source, body })
}
