//
//  stash-client
//  cli/project.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Project commands

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use super::GlobalOptions;
use crate::api::server::Project;
use crate::output::{format_bool, print_field, print_header, TableOutput};

#[derive(Args, Debug)]
pub struct ProjectCommand {
    #[command(subcommand)]
    pub command: ProjectSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum ProjectSubcommand {
    /// Create a project
    Create(CreateArgs),
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Project key, e.g. PROJ
    pub key: String,
}

impl TableOutput for Project {
    fn print_table(&self, color: bool) {
        print_header(&self.key);
        println!();
        print_field("ID", &self.id.to_string(), color);
        if let Some(name) = &self.name {
            print_field("Name", name, color);
        }
        if let Some(description) = self.description.as_deref().filter(|d| !d.is_empty()) {
            print_field("Description", description, color);
        }
        print_field("Public", &format_bool(self.is_public, color), color);
    }
}

impl ProjectCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        match &self.command {
            ProjectSubcommand::Create(args) => self.create(args, global).await,
        }
    }

    async fn create(&self, args: &CreateArgs, global: &GlobalOptions) -> Result<()> {
        let project = global
            .client()?
            .create_project(&args.key)
            .await
            .with_context(|| format!("Failed to create project '{}'", args.key))?;

        let output = global.output();
        if output.is_json() {
            output.write(&project)
        } else {
            output.write_success(&format!("Created project {}", project.key));
            Ok(())
        }
    }
}
