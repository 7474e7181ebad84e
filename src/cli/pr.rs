//
//  stash-client
//  cli/pr.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use console::style;

use super::{GlobalOptions, RepoArgs};
use crate::api::server::{NewPullRequest, PullRequest, PullRequestUpdate};
use crate::api::StashClient;
use crate::output::{
    format_datetime, format_status, print_field, print_header, truncate, write_json, TableOutput,
    TableRow,
};

#[derive(Args, Debug)]
pub struct PrCommand {
    #[command(subcommand)]
    pub command: PrSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum PrSubcommand {
    /// List pull requests
    #[command(visible_alias = "ls")]
    List(ListArgs),

    /// Show a pull request
    View(IdArgs),

    /// Open a pull request
    Create(CreateArgs),

    /// Change title, description, target or reviewers
    Edit(EditArgs),

    /// Merge a pull request
    Merge(MergeArgs),

    /// Comment on a pull request
    Comment(CommentArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub repo: RepoArgs,

    /// Filter by state
    #[arg(long, short = 's', default_value = "OPEN", value_parser = ["OPEN", "MERGED", "DECLINED", "ALL"], ignore_case = true)]
    pub state: String,
}

#[derive(Args, Debug)]
pub struct IdArgs {
    #[command(flatten)]
    pub repo: RepoArgs,

    /// Pull request ID
    pub id: u64,
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    #[command(flatten)]
    pub repo: RepoArgs,

    #[arg(long, short = 't')]
    pub title: String,

    #[arg(long, short = 'd', default_value = "")]
    pub description: String,

    /// Source branch or ref
    #[arg(long)]
    pub from: String,

    /// Target branch or ref
    #[arg(long)]
    pub to: String,

    /// Reviewer username (repeatable)
    #[arg(long = "reviewer", short = 'r')]
    pub reviewers: Vec<String>,
}

#[derive(Args, Debug)]
pub struct EditArgs {
    #[command(flatten)]
    pub target: IdArgs,

    /// Expected pull request version; fetched from the server when omitted
    #[arg(long = "pr-version", value_name = "VERSION")]
    pub expected_version: Option<u32>,

    #[arg(long, short = 't', default_value = "")]
    pub title: String,

    #[arg(long, short = 'd', default_value = "")]
    pub description: String,

    /// New target branch or ref
    #[arg(long)]
    pub to: Option<String>,

    /// Reviewer username (repeatable)
    #[arg(long = "reviewer", short = 'r')]
    pub reviewers: Vec<String>,
}

#[derive(Args, Debug)]
pub struct MergeArgs {
    #[command(flatten)]
    pub target: IdArgs,

    /// Expected pull request version; fetched from the server when omitted
    #[arg(long = "pr-version", value_name = "VERSION")]
    pub expected_version: Option<u32>,
}

#[derive(Args, Debug)]
pub struct CommentArgs {
    #[command(flatten)]
    pub target: IdArgs,

    /// Comment text
    pub text: String,
}

/// Qualifies a bare branch name as `refs/heads/<name>`.
fn full_ref(name: &str) -> String {
    if name.starts_with("refs/") {
        name.to_string()
    } else {
        format!("refs/heads/{}", name)
    }
}

fn display_name(pr_user: &crate::api::server::User) -> &str {
    pr_user
        .display_name
        .as_deref()
        .filter(|name| !name.is_empty())
        .unwrap_or(&pr_user.name)
}

impl TableRow for PullRequest {
    fn headers() -> &'static [&'static str] {
        &["ID", "STATE", "TITLE", "AUTHOR", "BRANCHES"]
    }

    fn row(&self, color: bool) -> Vec<String> {
        let id = if color {
            style(format!("#{}", self.id)).cyan().to_string()
        } else {
            format!("#{}", self.id)
        };
        vec![
            id,
            format_status(&self.state, color),
            truncate(&self.title, 45),
            truncate(display_name(&self.author.user), 18),
            format!(
                "{} → {}",
                truncate(&self.from_ref.display_id, 20),
                truncate(&self.to_ref.display_id, 15)
            ),
        ]
    }
}

impl TableOutput for PullRequest {
    fn print_table(&self, color: bool) {
        print_header(&format!("PR #{}: {}", self.id, self.title));
        println!();

        print_field("State", &format_status(&self.state, color), color);
        print_field("Version", &self.version.to_string(), color);
        print_field("Author", display_name(&self.author.user), color);
        println!();

        print_field("Source", &self.from_ref.display_id, color);
        print_field("Destination", &self.to_ref.display_id, color);

        if !self.reviewers.is_empty() {
            let reviewers: Vec<String> = self
                .reviewers
                .iter()
                .map(|r| {
                    let name = display_name(&r.user);
                    if r.approved {
                        format!("{} (approved)", name)
                    } else {
                        name.to_string()
                    }
                })
                .collect();
            print_field("Reviewers", &reviewers.join(", "), color);
        }
        println!();

        if let Some(desc) = self.description.as_deref().filter(|d| !d.is_empty()) {
            println!("Description:");
            println!("{}", desc);
            println!();
        }

        print_field("Created", &format_datetime(self.created_at()), color);
        print_field("Updated", &format_datetime(self.updated_at()), color);
    }
}

impl PrCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        match &self.command {
            PrSubcommand::List(args) => self.list(args, global).await,
            PrSubcommand::View(args) => self.view(args, global).await,
            PrSubcommand::Create(args) => self.create(args, global).await,
            PrSubcommand::Edit(args) => self.edit(args, global).await,
            PrSubcommand::Merge(args) => self.merge(args, global).await,
            PrSubcommand::Comment(args) => self.comment(args, global).await,
        }
    }

    async fn list(&self, args: &ListArgs, global: &GlobalOptions) -> Result<()> {
        let RepoArgs { project, slug } = &args.repo;
        let prs = global
            .client()?
            .list_pull_requests(project, slug, &args.state.to_uppercase())
            .await
            .with_context(|| format!("Failed to list pull requests of {}/{}", project, slug))?;

        global.output().write_list(&prs, "No pull requests found")
    }

    async fn view(&self, args: &IdArgs, global: &GlobalOptions) -> Result<()> {
        let pr = global
            .client()?
            .get_pull_request(&args.repo.project, &args.repo.slug, args.id)
            .await
            .with_context(|| format!("Failed to get pull request #{}", args.id))?;

        global.output().write(&pr)
    }

    async fn create(&self, args: &CreateArgs, global: &GlobalOptions) -> Result<()> {
        let RepoArgs { project, slug } = &args.repo;
        let request = NewPullRequest {
            title: args.title.clone(),
            description: args.description.clone(),
            from_ref: full_ref(&args.from),
            to_ref: full_ref(&args.to),
            reviewers: args.reviewers.clone(),
        };

        let pr = global
            .client()?
            .create_pull_request(project, slug, &request)
            .await
            .context("Failed to create pull request")?;

        let output = global.output();
        if output.is_json() {
            return output.write(&pr);
        }
        output.write_success(&format!("Created pull request #{}: {}", pr.id, pr.title));
        Ok(())
    }

    async fn edit(&self, args: &EditArgs, global: &GlobalOptions) -> Result<()> {
        let IdArgs { repo, id } = &args.target;
        let client = global.client()?;
        let version = resolve_version(&client, &args.target, args.expected_version).await?;

        let update = PullRequestUpdate {
            version,
            title: args.title.clone(),
            description: args.description.clone(),
            to_ref: args.to.as_deref().map(full_ref),
            reviewers: args.reviewers.clone(),
        };

        let pr = client
            .update_pull_request(&repo.project, &repo.slug, *id, &update)
            .await
            .with_context(|| format!("Failed to update pull request #{}", id))?;

        let output = global.output();
        if output.is_json() {
            return output.write(&pr);
        }
        output.write_success(&format!("Updated pull request #{} (version {})", pr.id, pr.version));
        Ok(())
    }

    async fn merge(&self, args: &MergeArgs, global: &GlobalOptions) -> Result<()> {
        let IdArgs { repo, id } = &args.target;
        let client = global.client()?;
        let version = resolve_version(&client, &args.target, args.expected_version).await?;

        let result = client
            .merge_pull_request(&repo.project, &repo.slug, *id, version)
            .await
            .with_context(|| format!("Failed to merge pull request #{}", id))?;

        let output = global.output();
        if output.is_json() {
            write_json(&result)?;
        } else if result.is_merged() {
            output.write_success(&format!("Merged pull request #{}", id));
        } else {
            for error in &result.errors {
                output.write_error(&error.message);
                for veto in &error.vetoes {
                    eprintln!("  - {}: {}", veto.summary_message, veto.detailed_message);
                }
            }
        }

        if !result.is_merged() {
            bail!("Pull request #{} was not merged", id);
        }
        Ok(())
    }

    async fn comment(&self, args: &CommentArgs, global: &GlobalOptions) -> Result<()> {
        let IdArgs { repo, id } = &args.target;
        let comment = global
            .client()?
            .create_comment(&repo.project, &repo.slug, *id, &args.text)
            .await
            .with_context(|| format!("Failed to comment on pull request #{}", id))?;

        let output = global.output();
        if output.is_json() {
            return write_json(&comment);
        }
        output.write_success(&format!("Added comment {} to pull request #{}", comment.id, id));
        Ok(())
    }
}

async fn resolve_version(client: &StashClient, target: &IdArgs, version: Option<u32>) -> Result<u32> {
    if let Some(version) = version {
        return Ok(version);
    }
    let pr = client
        .get_pull_request(&target.repo.project, &target.repo.slug, target.id)
        .await
        .with_context(|| format!("Failed to get pull request #{}", target.id))?;
    Ok(pr.version)
}
