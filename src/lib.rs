//
//  stash-client
//  lib.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Stash Client Library
//!
//! A typed client for the Atlassian Stash / Bitbucket Server REST API, plus the
//! `stash` command-line tool built on it.
//!
//! ## Overview
//!
//! Every operation goes through one pipeline: build a request, execute it,
//! classify the response, check the status against what the operation accepts,
//! and decode the body. Paged listings repeat the pipeline until the server
//! reports the last page.
//!
//! ## Module Structure
//!
//! - [`api`]: the client, its request/response pipeline and resource operations
//! - [`config`]: configuration file management
//! - [`cli`]: command-line interface definitions using clap
//! - [`output`]: output formatting (table, JSON)
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use stash_client::{StashClient, StashError};
//!
//! # async fn example() -> Result<(), StashError> {
//! let client = StashClient::new("admin", "secret", "https://stash.example.com/")?;
//!
//! for (id, repo) in client.list_repositories().await? {
//!     println!("{id}: {}/{}", repo.project.key, repo.slug);
//! }
//!
//! match client.create_repository("PROJ", "tools").await {
//!     Err(err) if err.is_conflict() => println!("already exists"),
//!     other => { other?; }
//! }
//! # Ok(())
//! # }
//! ```

/// Stash REST API client.
///
/// Request building, response classification, status validation, pagination
/// and one submodule per resource family under [`api::server`].
pub mod api;

/// Command-line interface definitions.
pub mod cli;

/// Configuration file management.
pub mod config;

/// Output formatting.
pub mod output;

pub use api::{StashClient, StashError};
pub use config::Config;

/// Name of the CLI binary.
pub const APP_NAME: &str = "stash";

/// Crate version, from Cargo.toml.
///
/// ```rust
/// use stash_client::VERSION;
///
/// println!("stash version {}", VERSION);
/// ```
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Exit codes for the CLI.
///
/// # Example
///
/// ```rust,no_run
/// use stash_client::exit_codes;
/// use std::process;
///
/// process::exit(exit_codes::NOT_FOUND);
/// ```
pub mod exit_codes {
    use crate::StashError;

    /// Successful execution.
    pub const SUCCESS: i32 = 0;

    /// An unspecified error occurred. Check stderr for details.
    pub const ERROR: i32 = 1;

    /// Invalid arguments (reported by clap).
    pub const USAGE: i32 = 2;

    /// The server rejected the credentials (401 or 403).
    pub const AUTH_ERROR: i32 = 4;

    /// The requested resource does not exist (404).
    pub const NOT_FOUND: i32 = 8;

    /// The resource already exists or is in a conflicting state (409).
    pub const CONFLICT: i32 = 9;

    /// Maps an error chain to an exit code using the first [`StashError`] in it.
    pub fn for_error(err: &anyhow::Error) -> i32 {
        let status = err
            .chain()
            .find_map(|cause| cause.downcast_ref::<StashError>())
            .and_then(StashError::status_code);

        match status {
            Some(401) | Some(403) => AUTH_ERROR,
            Some(404) => NOT_FOUND,
            Some(409) => CONFLICT,
            _ => ERROR,
        }
    }

}
