//
//  stash-client
//  cli/repo.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Repository commands.
//!
//! - Listing all repositories or those of one project
//! - Viewing, creating, renaming, moving and deleting a repository
//! - Locating a repository by clone URL
//! - Printing a file at a given ref

use std::io::Write;

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};

use super::{GlobalOptions, RepoArgs};
use crate::api::server::{find_by_clone_url, Repository};
use crate::output::{format_bool, format_status, print_field, print_header, TableOutput, TableRow};

#[derive(Args, Debug)]
pub struct RepoCommand {
    #[command(subcommand)]
    pub command: RepoSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum RepoSubcommand {
    /// List repositories
    #[command(visible_alias = "ls")]
    List(ListArgs),

    /// Show repository details
    View(RepoArgs),

    /// Create a git repository
    Create(RepoArgs),

    /// Rename a repository
    Rename(RenameArgs),

    /// Move a repository to another project
    Move(MoveArgs),

    /// Delete a repository
    Delete(DeleteArgs),

    /// Find the repository with a given clone URL
    Find(FindArgs),

    /// Print a file from a repository
    Cat(CatArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only list repositories of this project
    #[arg(long, short = 'p')]
    pub project: Option<String>,
}

#[derive(Args, Debug)]
pub struct RenameArgs {
    #[command(flatten)]
    pub repo: RepoArgs,

    /// New repository name
    pub new_name: String,
}

#[derive(Args, Debug)]
pub struct MoveArgs {
    #[command(flatten)]
    pub repo: RepoArgs,

    /// Key of the destination project
    pub new_project: String,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    #[command(flatten)]
    pub repo: RepoArgs,

    /// Confirm deletion
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(Args, Debug)]
pub struct FindArgs {
    /// Clone URL (ssh or http)
    pub clone_url: String,
}

#[derive(Args, Debug)]
pub struct CatArgs {
    #[command(flatten)]
    pub repo: RepoArgs,

    /// Path of the file inside the repository
    pub path: String,

    /// Branch, tag or commit
    #[arg(long, default_value = "master")]
    pub at: String,
}

impl TableRow for Repository {
    fn headers() -> &'static [&'static str] {
        &["ID", "PROJECT", "SLUG", "NAME", "STATE"]
    }

    fn row(&self, color: bool) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.project.key.clone(),
            self.slug.clone(),
            self.name.clone(),
            format_status(self.state.as_deref().unwrap_or("-"), color),
        ]
    }
}

impl TableOutput for Repository {
    fn print_table(&self, color: bool) {
        print_header(&format!("{}/{}", self.project.key, self.slug));
        println!();

        print_field("ID", &self.id.to_string(), color);
        print_field("Name", &self.name, color);
        print_field("SCM", &self.scm_id, color);
        if let Some(state) = &self.state {
            print_field("State", &format_status(state, color), color);
        }
        print_field("Public", &format_bool(self.is_public, color), color);
        print_field("Forkable", &format_bool(self.forkable, color), color);

        if let Some(web) = self.web_url() {
            println!();
            print_field("Web URL", web, color);
        }

        if !self.links.clone.is_empty() {
            println!();
            for link in &self.links.clone {
                print_field(&format!("Clone ({})", link.name), &link.href, color);
            }
        }
    }
}

impl RepoCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        match &self.command {
            RepoSubcommand::List(args) => self.list(args, global).await,
            RepoSubcommand::View(args) => self.view(args, global).await,
            RepoSubcommand::Create(args) => self.create(args, global).await,
            RepoSubcommand::Rename(args) => self.rename(args, global).await,
            RepoSubcommand::Move(args) => self.move_repo(args, global).await,
            RepoSubcommand::Delete(args) => self.delete(args, global).await,
            RepoSubcommand::Find(args) => self.find(args, global).await,
            RepoSubcommand::Cat(args) => self.cat(args, global).await,
        }
    }

    async fn list(&self, args: &ListArgs, global: &GlobalOptions) -> Result<()> {
        let client = global.client()?;

        let repos = match &args.project {
            Some(project) => client
                .list_project_repositories(project)
                .await
                .with_context(|| format!("Failed to list repositories of '{}'", project))?,
            None => client
                .list_repositories()
                .await
                .context("Failed to list repositories")?,
        };

        let repos: Vec<Repository> = repos.into_values().collect();
        global.output().write_list(&repos, "No repositories found")
    }

    async fn view(&self, args: &RepoArgs, global: &GlobalOptions) -> Result<()> {
        let repo = global
            .client()?
            .get_repository(&args.project, &args.slug)
            .await
            .with_context(|| format!("Failed to get repository {}/{}", args.project, args.slug))?;

        global.output().write(&repo)
    }

    async fn create(&self, args: &RepoArgs, global: &GlobalOptions) -> Result<()> {
        let repo = global
            .client()?
            .create_repository(&args.project, &args.slug)
            .await
            .with_context(|| format!("Failed to create repository {}/{}", args.project, args.slug))?;

        let output = global.output();
        if output.is_json() {
            return output.write(&repo);
        }
        output.write_success(&format!("Created repository {}/{}", repo.project.key, repo.slug));
        if let Some(ssh) = repo.ssh_url() {
            output.write_info(ssh);
        }
        Ok(())
    }

    async fn rename(&self, args: &RenameArgs, global: &GlobalOptions) -> Result<()> {
        let RepoArgs { project, slug } = &args.repo;
        global
            .client()?
            .rename_repository(project, slug, &args.new_name)
            .await
            .with_context(|| format!("Failed to rename repository {}/{}", project, slug))?;

        global.output().write_success(&format!(
            "Renamed {}/{} to '{}'",
            project, slug, args.new_name
        ));
        Ok(())
    }

    async fn move_repo(&self, args: &MoveArgs, global: &GlobalOptions) -> Result<()> {
        let RepoArgs { project, slug } = &args.repo;
        global
            .client()?
            .move_repository(project, slug, &args.new_project)
            .await
            .with_context(|| format!("Failed to move repository {}/{}", project, slug))?;

        global.output().write_success(&format!(
            "Moved {}/{} to project {}",
            project, slug, args.new_project
        ));
        Ok(())
    }

    async fn delete(&self, args: &DeleteArgs, global: &GlobalOptions) -> Result<()> {
        let RepoArgs { project, slug } = &args.repo;
        if !args.yes {
            bail!("Refusing to delete {}/{} without --yes", project, slug);
        }

        global
            .client()?
            .remove_repository(project, slug)
            .await
            .with_context(|| format!("Failed to delete repository {}/{}", project, slug))?;

        global
            .output()
            .write_success(&format!("Scheduled {}/{} for deletion", project, slug));
        Ok(())
    }

    async fn find(&self, args: &FindArgs, global: &GlobalOptions) -> Result<()> {
        let repos = global
            .client()?
            .list_repositories()
            .await
            .context("Failed to list repositories")?;

        let repo = find_by_clone_url(&repos, &args.clone_url)
            .with_context(|| format!("No repository has clone URL '{}'", args.clone_url))?;

        global.output().write(repo)
    }

    async fn cat(&self, args: &CatArgs, global: &GlobalOptions) -> Result<()> {
        let RepoArgs { project, slug } = &args.repo;
        let content = global
            .client()?
            .get_raw_file(project, slug, &args.path, &args.at)
            .await
            .with_context(|| format!("Failed to read '{}' at {}", args.path, args.at))?;

        let mut stdout = std::io::stdout().lock();
        stdout.write_all(&content)?;
        stdout.flush()?;
        Ok(())
    }
}
