//
//  stash-client
//  api/server/permissions.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Branch restrictions (`/rest/branch-permissions/1.0`).

use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::refs::Branch;
use crate::api::{StashClient, StashError, NO_BODY};

/// A restriction on who may push to a branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchRestriction {
    pub id: u64,
    #[serde(default)]
    pub branch: Branch,
}

/// The restriction listing of a repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchRestrictions {
    #[serde(default, rename = "values")]
    pub restrictions: Vec<BranchRestriction>,
}

/// Payload for creating a restriction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BranchPermission {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "value")]
    pub branch: String,
    pub users: Vec<String>,
    pub groups: Vec<String>,
}

impl BranchPermission {
    /// A restriction on `branch` that only `user` may bypass.
    pub fn for_user(branch: &str, user: &str) -> Self {
        Self {
            kind: "BRANCH".to_string(),
            branch: branch.to_string(),
            users: vec![user.to_string()],
            groups: Vec::new(),
        }
    }
}

fn restricted_path(project_key: &str, slug: &str) -> String {
    format!(
        "/rest/branch-permissions/1.0/projects/{}/repos/{}/restricted",
        project_key, slug
    )
}

impl StashClient {
    pub async fn get_branch_restrictions(
        &self,
        project_key: &str,
        slug: &str,
    ) -> Result<BranchRestrictions, StashError> {
        self.request_json(Method::GET, &restricted_path(project_key, slug), NO_BODY, &[200])
            .await
    }

    /// Restricts `branch` to `user`. The server answers `200`, not `201`.
    pub async fn create_branch_restriction(
        &self,
        project_key: &str,
        slug: &str,
        branch: &str,
        user: &str,
    ) -> Result<BranchRestriction, StashError> {
        self.request_json(
            Method::POST,
            &restricted_path(project_key, slug),
            Some(&BranchPermission::for_user(branch, user)),
            &[200],
        )
        .await
    }

    pub async fn delete_branch_restriction(
        &self,
        project_key: &str,
        slug: &str,
        id: u64,
    ) -> Result<(), StashError> {
        self.request(
            Method::DELETE,
            &format!("{}/{}", restricted_path(project_key, slug), id),
            NO_BODY,
            &[204],
        )
        .await?;
        Ok(())
    }
}
