//
//  stash-client
//  cli/tag.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Tag commands

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use super::{GlobalOptions, RepoArgs};
use crate::api::server::Tag;
use crate::output::TableRow;

#[derive(Args, Debug)]
pub struct TagCommand {
    #[command(subcommand)]
    pub command: TagSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum TagSubcommand {
    /// List tags of a repository
    #[command(visible_alias = "ls")]
    List(RepoArgs),
}

impl TableRow for Tag {
    fn headers() -> &'static [&'static str] {
        &["TAG", "TARGET"]
    }

    fn row(&self, _color: bool) -> Vec<String> {
        let target = self
            .latest_commit
            .as_deref()
            .or(self.hash.as_deref())
            .unwrap_or("-");
        vec![self.display_id.clone(), target.to_string()]
    }
}

impl TagCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        match &self.command {
            TagSubcommand::List(args) => {
                let tags = global
                    .client()?
                    .list_tags(&args.project, &args.slug)
                    .await
                    .with_context(|| {
                        format!("Failed to list tags of {}/{}", args.project, args.slug)
                    })?;

                let tags: Vec<Tag> = tags.into_values().collect();
                global.output().write_list(&tags, "No tags found")
            }
        }
    }
}
