//
//  stash-client
//  api/error.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Stash API Errors
//!
//! Every failure produced by the request/response pipeline is a [`StashError`].
//! The variants are kept distinct so callers can branch on what actually went
//! wrong instead of parsing messages:
//!
//! | Variant | When | HTTP status known |
//! |---------|------|-------------------|
//! | `Transport` | DNS, connect, TLS or timeout failure | No |
//! | `BodyRead` | Body could not be read after the round trip | Yes |
//! | `Encoding` | Payload could not be serialized, nothing was sent | No |
//! | `Decoding` | A success body did not match the expected type | No (body kept) |
//! | `Api` | Status >= 400 with a parseable error envelope | Yes (body kept) |
//! | `UnparseableErrorBody` | Status >= 400 with a garbage error body | Yes |
//! | `UnexpectedStatus` | Status not in the caller's accepted set | Yes |
//! | `ForeignOrigin` | An absolute link points at another server, nothing was sent | No |
//!
//! ## Recognizers
//!
//! ```rust
//! use stash_client::api::{is_repository_exists, is_repository_not_found, StashError};
//!
//! let err = StashError::UnexpectedStatus {
//!     status: 409,
//!     reason: "unexpected server status".to_string(),
//! };
//! assert!(is_repository_exists(Some(&err)));
//! assert!(!is_repository_not_found(Some(&err)));
//! assert!(!is_repository_exists(None));
//! ```

use thiserror::Error;

use super::response::ApiErrorEntry;

/// Reason carried by [`StashError::UnexpectedStatus`].
pub const UNEXPECTED_STATUS_REASON: &str = "unexpected server status";

/// Unified error type for all Stash API operations.
#[derive(Error, Debug)]
pub enum StashError {
    /// The request never produced a response (DNS, refused connection, timeout).
    #[error("Network error: {0}")]
    Transport(#[source] reqwest::Error),

    /// The server answered but the body could not be read to completion.
    #[error("Failed to read response body (status {status}): {source}")]
    BodyRead {
        /// Status code of the response whose body failed.
        status: u16,
        #[source]
        source: reqwest::Error,
    },

    /// The request payload could not be serialized to JSON.
    #[error("Failed to encode request payload: {0}")]
    Encoding(#[source] serde_json::Error),

    /// A success response could not be decoded into the expected type.
    ///
    /// The raw body is retained for inspection.
    #[error("Failed to decode response body: {source}")]
    Decoding {
        #[source]
        source: serde_json::Error,
        /// The undecodable response body.
        body: Vec<u8>,
    },

    /// The server returned an error status with a well-formed error envelope.
    ///
    /// `message` is every entry's message joined by a single space.
    #[error("{message}")]
    Api {
        /// HTTP status code (always >= 400).
        status: u16,
        /// Joined human-readable message.
        message: String,
        /// The decoded envelope entries, in server order.
        errors: Vec<ApiErrorEntry>,
        /// The raw error body.
        body: Vec<u8>,
    },

    /// The server returned an error status but its body was not an error envelope.
    #[error("status {status}; unable to parse error body: {source}")]
    UnparseableErrorBody {
        /// HTTP status code (always >= 400).
        status: u16,
        #[source]
        source: serde_json::Error,
    },

    /// The response status was not one the operation accepts.
    #[error("{reason} ({status})")]
    UnexpectedStatus {
        /// The status that was actually returned.
        status: u16,
        /// Always [`UNEXPECTED_STATUS_REASON`] for pipeline-produced errors.
        reason: String,
    },

    /// The configured base URL is not a valid absolute URL.
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),

    /// Credentials produced a header value that HTTP cannot carry.
    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    /// Local file access failed (add-on uploads).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A server-supplied absolute link points away from the configured server.
    #[error("Refusing to follow link to another origin: {url}")]
    ForeignOrigin {
        /// The rejected link.
        url: String,
    },

    /// A non-final page arrived without a `nextPageStart` cursor.
    #[error("Server reported more pages after start {start} but sent no nextPageStart")]
    Pagination {
        /// Offset of the page that lacked a cursor.
        start: u32,
    },
}

impl StashError {
    /// Builds the error returned when a status is outside the accepted set.
    pub fn unexpected_status(status: u16) -> Self {
        Self::UnexpectedStatus {
            status,
            reason: UNEXPECTED_STATUS_REASON.to_string(),
        }
    }

    /// Returns the HTTP status code this error carries, if any.
    ///
    /// Transport, encoding and decoding failures have no status.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::BodyRead { status, .. }
            | Self::Api { status, .. }
            | Self::UnparseableErrorBody { status, .. }
            | Self::UnexpectedStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the raw response body kept alongside the error, if any.
    pub fn raw_body(&self) -> Option<&[u8]> {
        match self {
            Self::Api { body, .. } | Self::Decoding { body, .. } => Some(body),
            _ => None,
        }
    }

    /// `true` when the server answered 409 Conflict.
    pub fn is_conflict(&self) -> bool {
        self.status_code() == Some(409)
    }

    /// `true` when the server answered 404 Not Found.
    pub fn is_not_found(&self) -> bool {
        self.status_code() == Some(404)
    }
}

/// Reports whether an operation failed because the resource already exists (409).
pub fn is_repository_exists(err: Option<&StashError>) -> bool {
    err.is_some_and(StashError::is_conflict)
}

/// Reports whether an operation failed because the resource does not exist (404).
pub fn is_repository_not_found(err: Option<&StashError>) -> bool {
    err.is_some_and(StashError::is_not_found)
}
