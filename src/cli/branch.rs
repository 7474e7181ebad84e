//
//  stash-client
//  cli/branch.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Branch commands

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use console::style;

use super::{GlobalOptions, RepoArgs};
use crate::api::server::Branch;
use crate::output::TableRow;

#[derive(Args, Debug)]
pub struct BranchCommand {
    #[command(subcommand)]
    pub command: BranchSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum BranchSubcommand {
    /// List branches of a repository
    #[command(visible_alias = "ls")]
    List(RepoArgs),

    /// Delete a branch
    Delete(DeleteArgs),
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    #[command(flatten)]
    pub repo: RepoArgs,

    /// Branch name without the refs/heads/ prefix
    pub name: String,
}

impl TableRow for Branch {
    fn headers() -> &'static [&'static str] {
        &["BRANCH", "LATEST COMMIT", "DEFAULT"]
    }

    fn row(&self, color: bool) -> Vec<String> {
        let name = if self.is_default && color {
            style(&self.display_id).green().bold().to_string()
        } else {
            self.display_id.clone()
        };
        vec![
            name,
            self.latest_changeset.clone().unwrap_or_else(|| "-".to_string()),
            if self.is_default { "*" } else { "" }.to_string(),
        ]
    }
}

impl BranchCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        match &self.command {
            BranchSubcommand::List(args) => self.list(args, global).await,
            BranchSubcommand::Delete(args) => self.delete(args, global).await,
        }
    }

    async fn list(&self, args: &RepoArgs, global: &GlobalOptions) -> Result<()> {
        let branches = global
            .client()?
            .list_branches(&args.project, &args.slug)
            .await
            .with_context(|| format!("Failed to list branches of {}/{}", args.project, args.slug))?;

        let branches: Vec<Branch> = branches.into_values().collect();
        global.output().write_list(&branches, "No branches found")
    }

    async fn delete(&self, args: &DeleteArgs, global: &GlobalOptions) -> Result<()> {
        let RepoArgs { project, slug } = &args.repo;
        global
            .client()?
            .delete_branch(project, slug, &args.name)
            .await
            .with_context(|| format!("Failed to delete branch '{}'", args.name))?;

        global
            .output()
            .write_success(&format!("Deleted branch {} in {}/{}", args.name, project, slug));
        Ok(())
    }
}
