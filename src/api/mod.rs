//
//  stash-client
//  api/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # API Client Layer
//!
//! This module provides the typed client for the Stash / Bitbucket Server REST API.
//!
//! ## Architecture
//!
//! Every call flows through one pipeline:
//!
//! - [`request`]: builds the wire request (URL, headers, JSON body, credentials)
//! - [`transport`]: the shared HTTP client (timeout, TLS policy, pool)
//! - [`response`]: executes the request and classifies the status code
//! - [`client`]: validates the status against the accepted set and decodes JSON
//! - [`pagination`]: walks offset-paged list endpoints
//!
//! The per-resource methods in [`server`] are thin call sites on top of it.
//!
//! ## Error Handling
//!
//! All failures are [`StashError`] values. Use [`is_repository_exists`] and
//! [`is_repository_not_found`] to branch on 409 / 404.

pub mod client;
pub mod error;
pub mod pagination;
pub mod request;
pub mod response;
pub mod server;
pub mod transport;

pub use client::{StashClient, NO_BODY};
pub use error::{is_repository_exists, is_repository_not_found, StashError};
pub use pagination::{Page, PageCursor, PAGE_LIMIT};
pub use request::{ClientIdentity, WireBody, WireRequest};
pub use response::{ApiErrorEntry, RawResponse};
pub use transport::TransportConfig;
