//
//  stash-client
//  cli/commit.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Commit commands

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use super::{GlobalOptions, RepoArgs};
use crate::api::server::Commit;
use crate::output::{format_datetime, print_field, print_header, truncate, TableOutput, TableRow};

#[derive(Args, Debug)]
pub struct CommitCommand {
    #[command(subcommand)]
    pub command: CommitSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum CommitSubcommand {
    /// Show a commit
    View(ViewArgs),

    /// List commits between two commits
    Range(RangeArgs),
}

#[derive(Args, Debug)]
pub struct ViewArgs {
    #[command(flatten)]
    pub repo: RepoArgs,

    /// Commit hash
    pub hash: String,
}

#[derive(Args, Debug)]
pub struct RangeArgs {
    #[command(flatten)]
    pub repo: RepoArgs,

    /// Exclusive lower bound
    pub since: String,

    /// Inclusive upper bound
    pub until: String,
}

impl TableRow for Commit {
    fn headers() -> &'static [&'static str] {
        &["COMMIT", "AUTHOR", "DATE", "MESSAGE"]
    }

    fn row(&self, _color: bool) -> Vec<String> {
        let summary = self
            .message
            .as_deref()
            .and_then(|m| m.lines().next())
            .unwrap_or_default();
        vec![
            self.display_id.clone(),
            self.author.name.clone(),
            format_datetime(self.authored_at()),
            truncate(summary, 60),
        ]
    }
}

impl TableOutput for Commit {
    fn print_table(&self, color: bool) {
        print_header(&self.id);
        println!();
        print_field(
            "Author",
            &format!("{} <{}>", self.author.name, self.author.email_address),
            color,
        );
        print_field("Date", &format_datetime(self.authored_at()), color);
        if !self.attributes.jira_keys.is_empty() {
            print_field("Issues", &self.attributes.jira_keys.join(", "), color);
        }
        if let Some(message) = &self.message {
            println!();
            println!("{}", message);
        }
    }
}

impl CommitCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        match &self.command {
            CommitSubcommand::View(args) => {
                let commit = global
                    .client()?
                    .get_commit(&args.repo.project, &args.repo.slug, &args.hash)
                    .await
                    .with_context(|| format!("Failed to get commit {}", args.hash))?;
                global.output().write(&commit)
            }
            CommitSubcommand::Range(args) => {
                let commits = global
                    .client()?
                    .get_commits(&args.repo.project, &args.repo.slug, &args.since, &args.until)
                    .await
                    .with_context(|| {
                        format!("Failed to list commits {}..{}", args.since, args.until)
                    })?;
                global.output().write_list(&commits.commits, "No commits in range")
            }
        }
    }
}
