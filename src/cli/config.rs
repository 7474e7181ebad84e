//
//  stash-client
//  cli/config.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! CLI configuration commands
//!
//! Reads and writes the config file: HTTP settings, known hosts and the
//! default host. Passwords are never written.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use console::style;

use super::GlobalOptions;
use crate::config::{host_name, normalize_base_url, HostConfig, CONFIG_KEYS};
use crate::output::{write_json, TableBuilder};

#[derive(Args, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigSubcommand {
    /// Print a configuration value
    Get(GetArgs),

    /// Set a configuration value
    Set(SetArgs),

    /// Show the whole configuration
    #[command(visible_alias = "ls")]
    List,

    /// Add or replace a server entry
    AddHost(AddHostArgs),

    /// Remove a server entry
    RemoveHost(RemoveHostArgs),

    /// Print the config file path
    Path,
}

#[derive(Args, Debug)]
pub struct GetArgs {
    /// One of: default_host, http.timeout_secs, http.insecure
    pub key: String,
}

#[derive(Args, Debug)]
pub struct SetArgs {
    pub key: String,

    pub value: String,
}

#[derive(Args, Debug)]
pub struct AddHostArgs {
    /// Server base URL
    pub base_url: String,

    /// Entry name; defaults to the URL's host
    #[arg(long)]
    pub name: Option<String>,

    /// Username to authenticate as
    #[arg(long = "username")]
    pub username: Option<String>,

    /// Make this the default host
    #[arg(long)]
    pub default: bool,
}

#[derive(Args, Debug)]
pub struct RemoveHostArgs {
    pub name: String,
}

impl ConfigCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        match &self.command {
            ConfigSubcommand::Get(args) => self.get(args, global),
            ConfigSubcommand::Set(args) => self.set(args, global),
            ConfigSubcommand::List => self.list(global),
            ConfigSubcommand::AddHost(args) => self.add_host(args, global),
            ConfigSubcommand::RemoveHost(args) => self.remove_host(args, global),
            ConfigSubcommand::Path => {
                println!("{}", global.config_path()?.display());
                Ok(())
            }
        }
    }

    fn get(&self, args: &GetArgs, global: &GlobalOptions) -> Result<()> {
        let config = global.load_config()?;
        if !CONFIG_KEYS.contains(&args.key.as_str()) {
            anyhow::bail!(
                "Unknown config key '{}'. Valid keys: {}",
                args.key,
                CONFIG_KEYS.join(", ")
            );
        }
        let value = config.get(&args.key);

        if global.json {
            write_json(&serde_json::json!({ "key": args.key, "value": value }))
        } else {
            if let Some(value) = value {
                println!("{}", value);
            }
            Ok(())
        }
    }

    fn set(&self, args: &SetArgs, global: &GlobalOptions) -> Result<()> {
        let path = global.config_path()?;
        let mut config = global.load_config()?;
        config.set(&args.key, &args.value)?;
        config.save_to(&path)?;

        global.output().write_success(&format!(
            "Set {} = {}",
            style(&args.key).cyan(),
            args.value
        ));
        Ok(())
    }

    fn list(&self, global: &GlobalOptions) -> Result<()> {
        let config = global.load_config()?;
        if global.json {
            return write_json(&config);
        }

        for key in CONFIG_KEYS {
            println!("{} = {}", key, config.get(key).unwrap_or_default());
        }

        if !config.hosts.is_empty() {
            println!();
            TableBuilder::new()
                .headers(["HOST", "BASE URL", "USERNAME", "DEFAULT"])
                .rows(config.hosts.iter().map(|(name, host)| {
                    vec![
                        name.clone(),
                        host.base_url.clone(),
                        host.username.clone().unwrap_or_default(),
                        if config.default_host.as_deref() == Some(name.as_str()) {
                            "*".to_string()
                        } else {
                            String::new()
                        },
                    ]
                }))
                .print();
        }
        Ok(())
    }

    fn add_host(&self, args: &AddHostArgs, global: &GlobalOptions) -> Result<()> {
        let path = global.config_path()?;
        let mut config = global.load_config()?;

        let name = match &args.name {
            Some(name) => name.clone(),
            None => host_name(&args.base_url)?,
        };
        let host = HostConfig {
            base_url: normalize_base_url(&args.base_url)?,
            username: args.username.clone(),
        };

        config.add_host(name.clone(), host);
        if args.default {
            config.default_host = Some(name.clone());
        }
        config
            .save_to(&path)
            .with_context(|| format!("Failed to save {}", path.display()))?;

        global
            .output()
            .write_success(&format!("Added host {}", style(&name).cyan()));
        Ok(())
    }

    fn remove_host(&self, args: &RemoveHostArgs, global: &GlobalOptions) -> Result<()> {
        let path = global.config_path()?;
        let mut config = global.load_config()?;

        if config.remove_host(&args.name).is_none() {
            anyhow::bail!("Unknown host '{}'", args.name);
        }
        config.save_to(&path)?;

        global
            .output()
            .write_success(&format!("Removed host {}", args.name));
        Ok(())
    }
}
