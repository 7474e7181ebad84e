//
//  stash-client
//  cli/restriction.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Branch restriction commands

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use super::{GlobalOptions, RepoArgs};
use crate::api::server::BranchRestriction;
use crate::output::{write_json, TableRow};

#[derive(Args, Debug)]
pub struct RestrictionCommand {
    #[command(subcommand)]
    pub command: RestrictionSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum RestrictionSubcommand {
    /// List branch restrictions
    #[command(visible_alias = "ls")]
    List(RepoArgs),

    /// Restrict a branch so only one user may push
    Add(AddArgs),

    /// Remove a branch restriction
    #[command(visible_alias = "rm")]
    Remove(RemoveArgs),
}

#[derive(Args, Debug)]
pub struct AddArgs {
    #[command(flatten)]
    pub repo: RepoArgs,

    /// Branch name
    pub branch: String,

    /// User allowed to push
    #[arg(value_name = "USER")]
    pub allowed_user: String,
}

#[derive(Args, Debug)]
pub struct RemoveArgs {
    #[command(flatten)]
    pub repo: RepoArgs,

    /// Restriction ID, as shown by 'stash restriction list'
    pub id: u64,
}

impl TableRow for BranchRestriction {
    fn headers() -> &'static [&'static str] {
        &["ID", "BRANCH"]
    }

    fn row(&self, _color: bool) -> Vec<String> {
        let branch = if self.branch.display_id.is_empty() {
            &self.branch.id
        } else {
            &self.branch.display_id
        };
        vec![self.id.to_string(), branch.clone()]
    }
}

impl RestrictionCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        match &self.command {
            RestrictionSubcommand::List(args) => self.list(args, global).await,
            RestrictionSubcommand::Add(args) => self.add(args, global).await,
            RestrictionSubcommand::Remove(args) => self.remove(args, global).await,
        }
    }

    async fn list(&self, args: &RepoArgs, global: &GlobalOptions) -> Result<()> {
        let listing = global
            .client()?
            .get_branch_restrictions(&args.project, &args.slug)
            .await
            .context("Failed to get branch restrictions")?;

        global
            .output()
            .write_list(&listing.restrictions, "No branch restrictions")
    }

    async fn add(&self, args: &AddArgs, global: &GlobalOptions) -> Result<()> {
        let RepoArgs { project, slug } = &args.repo;
        let restriction = global
            .client()?
            .create_branch_restriction(project, slug, &args.branch, &args.allowed_user)
            .await
            .with_context(|| format!("Failed to restrict branch '{}'", args.branch))?;

        let output = global.output();
        if output.is_json() {
            return write_json(&restriction);
        }
        output.write_success(&format!(
            "Restricted {} to {} (restriction {})",
            args.branch, args.allowed_user, restriction.id
        ));
        Ok(())
    }

    async fn remove(&self, args: &RemoveArgs, global: &GlobalOptions) -> Result<()> {
        let RepoArgs { project, slug } = &args.repo;
        global
            .client()?
            .delete_branch_restriction(project, slug, args.id)
            .await
            .with_context(|| format!("Failed to remove branch restriction {}", args.id))?;

        global
            .output()
            .write_success(&format!("Removed branch restriction {}", args.id));
        Ok(())
    }
}
