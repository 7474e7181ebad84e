//
//  stash-client
//  cli/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! CLI command definitions using clap derive macros

mod addon;
mod branch;
mod commit;
mod completion;
mod config;
mod pr;
mod project;
mod repo;
mod restriction;
mod tag;

pub use addon::AddonCommand;
pub use branch::BranchCommand;
pub use commit::CommitCommand;
pub use completion::CompletionCommand;
pub use config::ConfigCommand;
pub use pr::PrCommand;
pub use project::ProjectCommand;
pub use repo::RepoCommand;
pub use restriction::RestrictionCommand;
pub use tag::TagCommand;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use crate::api::{ClientIdentity, StashClient};
use crate::config::Config;
use crate::output::OutputWriter;

/// Work with Stash / Bitbucket Server from the command line
#[derive(Parser, Debug)]
#[command(
    name = "stash",
    version,
    about = "Work with Stash / Bitbucket Server from the command line",
    long_about = "stash is a CLI for Atlassian Stash and Bitbucket Server.\n\n\
                  It manages repositories, branches, pull requests and add-ons over the REST API.",
    propagate_version = true,
    after_help = "Use 'stash <command> --help' for more information about a command."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOptions,
}

/// Options shared by every command.
///
/// Flags override environment variables, which override the config file.
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Server base URL, e.g. https://stash.example.com/
    #[arg(long, global = true, env = "STASH_URL")]
    pub url: Option<String>,

    /// Configured host to use instead of the default host
    #[arg(long = "host", global = true, env = "STASH_HOST")]
    pub host: Option<String>,

    /// Username for basic authentication
    #[arg(long, short = 'u', global = true, env = "STASH_USER")]
    pub user: Option<String>,

    /// Password or personal access token
    #[arg(long, global = true, env = "STASH_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Skip TLS certificate validation
    #[arg(long, short = 'k', global = true, env = "STASH_INSECURE")]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, global = true, env = "STASH_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Path to the config file
    #[arg(long, global = true, env = "STASH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,
}

impl GlobalOptions {
    pub fn config_path(&self) -> Result<PathBuf> {
        match &self.config {
            Some(path) => Ok(path.clone()),
            None => Config::config_path(),
        }
    }

    pub fn load_config(&self) -> Result<Config> {
        Config::load_from(&self.config_path()?)
    }

    pub fn output(&self) -> OutputWriter {
        OutputWriter::from_flags(self.json)
    }

    /// Builds a client from flags, environment and config.
    pub fn client(&self) -> Result<StashClient> {
        let config = self.load_config()?;

        let host = match &self.host {
            Some(name) => Some(
                config
                    .host(name)
                    .with_context(|| format!("Unknown host '{}'", name))?,
            ),
            None => config.default_host_config(),
        };

        let base_url = self
            .url
            .as_deref()
            .or_else(|| host.map(|h| h.base_url.as_str()))
            .context(
                "No server configured. Use --url, set STASH_URL, or run 'stash config add-host'",
            )?;
        let username = self
            .user
            .as_deref()
            .or_else(|| host.and_then(|h| h.username.as_deref()))
            .unwrap_or_default();
        let password = self.password.as_deref().unwrap_or_default();

        let mut transport = config.http.transport();
        if let Some(secs) = self.timeout {
            transport = transport.timeout(Duration::from_secs(secs));
        }
        if self.insecure {
            transport = transport.accept_invalid_certs(true);
        }

        let identity = ClientIdentity::new(username, password, base_url)
            .with_context(|| format!("Invalid server URL '{}'", base_url))?;
        Ok(StashClient::with_transport(identity, &transport)?)
    }
}

/// Project key and repository slug of a repository-scoped command.
#[derive(Args, Debug, Clone)]
pub struct RepoArgs {
    /// Project key
    pub project: String,

    /// Repository slug
    pub slug: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage repositories
    #[command(visible_alias = "r")]
    Repo(RepoCommand),

    /// Manage projects
    #[command(visible_alias = "proj")]
    Project(ProjectCommand),

    /// Manage branches
    Branch(BranchCommand),

    /// List tags
    Tag(TagCommand),

    /// Manage branch restrictions
    Restriction(RestrictionCommand),

    /// Manage pull requests
    Pr(PrCommand),

    /// Inspect commits
    Commit(CommitCommand),

    /// Manage add-ons through the Universal Plugin Manager
    Addon(AddonCommand),

    /// Manage the CLI configuration
    Config(ConfigCommand),

    /// Generate shell completion scripts
    Completion(CompletionCommand),

    /// Show version information
    Version,
}
