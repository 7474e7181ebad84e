//
//  stash-client
//  cli/addon.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Add-on commands
//!
//! Install, inspect, toggle and license add-ons through the Universal Plugin
//! Manager. These require an administrator account.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use console::style;

use super::GlobalOptions;
use crate::api::server::Addon;
use crate::output::{format_bool, print_field, print_header, TableOutput};

#[derive(Args, Debug)]
pub struct AddonCommand {
    #[command(subcommand)]
    pub command: AddonSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum AddonSubcommand {
    /// Print a UPM token
    Token,

    /// Show an add-on
    View(KeyArgs),

    /// Upload and install an add-on jar
    Install(InstallArgs),

    /// Uninstall an add-on
    Uninstall(KeyArgs),

    /// Enable an add-on
    Enable(KeyArgs),

    /// Disable an add-on
    Disable(KeyArgs),

    /// Set an add-on license
    License(LicenseArgs),
}

#[derive(Args, Debug)]
pub struct KeyArgs {
    /// Add-on key, e.g. com.example.hooks
    pub key: String,
}

#[derive(Args, Debug)]
pub struct InstallArgs {
    /// Path to the add-on jar or obr
    pub file: PathBuf,
}

#[derive(Args, Debug)]
pub struct LicenseArgs {
    /// Add-on key
    pub key: String,

    /// Raw license string
    pub license: String,
}

impl TableOutput for Addon {
    fn print_table(&self, color: bool) {
        print_header(self.name.as_deref().unwrap_or(&self.key));
        println!();
        print_field("Key", &self.key, color);
        if let Some(version) = &self.version {
            print_field("Version", version, color);
        }
        print_field("Enabled", &format_bool(self.enabled, color), color);
        print_field("User installed", &format_bool(self.user_installed, color), color);
        if let Some(description) = self.description.as_deref().filter(|d| !d.is_empty()) {
            println!();
            println!("{}", description);
        }
    }
}

impl AddonCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        match &self.command {
            AddonSubcommand::Token => {
                let token = global
                    .client()?
                    .get_upm_token()
                    .await
                    .context("Failed to get UPM token")?;
                println!("{}", token);
                Ok(())
            }
            AddonSubcommand::View(args) => {
                let addon = self.get(&args.key, global).await?;
                global.output().write(&addon)
            }
            AddonSubcommand::Install(args) => self.install(args, global).await,
            AddonSubcommand::Uninstall(args) => {
                global
                    .client()?
                    .uninstall_addon(&args.key)
                    .await
                    .with_context(|| format!("Failed to uninstall add-on '{}'", args.key))?;
                global
                    .output()
                    .write_success(&format!("Uninstalled {}", args.key));
                Ok(())
            }
            AddonSubcommand::Enable(args) => self.toggle(&args.key, true, global).await,
            AddonSubcommand::Disable(args) => self.toggle(&args.key, false, global).await,
            AddonSubcommand::License(args) => {
                global
                    .client()?
                    .set_addon_license(&args.key, &args.license)
                    .await
                    .with_context(|| format!("Failed to set license of '{}'", args.key))?;
                global
                    .output()
                    .write_success(&format!("License set for {}", args.key));
                Ok(())
            }
        }
    }

    async fn get(&self, key: &str, global: &GlobalOptions) -> Result<Addon> {
        global
            .client()?
            .get_addon(key)
            .await
            .with_context(|| format!("Failed to get add-on '{}'", key))
    }

    async fn install(&self, args: &InstallArgs, global: &GlobalOptions) -> Result<()> {
        let client = global.client()?;
        let token = client
            .get_upm_token()
            .await
            .context("Failed to get UPM token")?;

        let output = global.output();
        if !output.is_json() {
            eprintln!(
                "{} Uploading {}",
                style("→").cyan(),
                args.file.display()
            );
        }

        let key = client
            .install_addon(&token, &args.file)
            .await
            .with_context(|| format!("Failed to install {}", args.file.display()))?;

        if output.is_json() {
            return crate::output::write_json(&serde_json::json!({ "key": key }));
        }
        output.write_success(&format!("Installed {}", key));
        Ok(())
    }

    async fn toggle(&self, key: &str, enabled: bool, global: &GlobalOptions) -> Result<()> {
        let client = global.client()?;
        let addon = client
            .get_addon(key)
            .await
            .with_context(|| format!("Failed to get add-on '{}'", key))?;

        if enabled {
            client.enable_addon(&addon).await
        } else {
            client.disable_addon(&addon).await
        }
        .with_context(|| format!("Failed to update add-on '{}'", key))?;

        let verb = if enabled { "Enabled" } else { "Disabled" };
        global.output().write_success(&format!("{} {}", verb, key));
        Ok(())
    }
}
