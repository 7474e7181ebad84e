//
//  stash-client
//  api/server/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Stash REST Resources
//!
//! One submodule per resource family. Each holds the wire types for that
//! family and an `impl StashClient` block with its operations:
//!
//! - [`projects`] - project creation
//! - [`repositories`] - repository CRUD, listing and clone-URL lookup
//! - [`refs`] - branches and tags
//! - [`permissions`] - branch restrictions
//! - [`pullrequests`] - pull requests, merges and comments
//! - [`commits`] - commits and raw file content
//! - [`addons`] - Universal Plugin Manager add-on management
//!
//! ## Endpoint Families
//!
//! ```text
//! /rest/api/1.0/...                 core API
//! /rest/branch-permissions/1.0/...  branch restrictions
//! /rest/branch-utils/1.0/...        branch deletion
//! /rest/plugins/1.0/...             add-ons
//! /projects/{p}/repos/{r}/browse    raw files
//! ```
//!
//! ## Notes
//!
//! - Timestamps are Unix milliseconds
//! - Optional fields default to `None` / `false` / empty when absent

pub mod addons;
pub mod commits;
pub mod permissions;
pub mod projects;
pub mod pullrequests;
pub mod refs;
pub mod repositories;

pub use addons::Addon;
pub use commits::{Commit, CommitAuthor, Commits};
pub use permissions::{BranchPermission, BranchRestriction, BranchRestrictions};
pub use projects::Project;
pub use pullrequests::{
    Comment, MergeError, MergeResult, NewPullRequest, Participant, PullRequest,
    PullRequestUpdate, Ref, User, Veto,
};
pub use refs::{Branch, Tag};
pub use repositories::{find_by_clone_url, CloneLink, Repository};
