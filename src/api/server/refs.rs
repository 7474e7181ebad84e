//
//  stash-client
//  api/server/refs.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Branches and Tags
//!
//! ```text
//! GET    /rest/api/1.0/projects/{p}/repos/{r}/branches        (paged)
//! GET    /rest/api/1.0/projects/{p}/repos/{r}/tags            (paged)
//! DELETE /rest/branch-utils/1.0/projects/{p}/repos/{r}/branches
//! ```
//!
//! Branch and tag listings are keyed by display name ("main", "v1.0").

use std::collections::BTreeMap;

use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::api::pagination::collect_keyed;
use crate::api::{StashClient, StashError};

/// A branch reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    /// Full ref name, e.g. "refs/heads/main".
    #[serde(default)]
    pub id: String,

    /// Short name, e.g. "main".
    #[serde(default, rename = "displayId")]
    pub display_id: String,

    /// Head commit of the branch.
    #[serde(default, rename = "latestChangeset", alias = "latestCommit")]
    pub latest_changeset: Option<String>,

    #[serde(default, rename = "isDefault")]
    pub is_default: bool,
}

/// A tag reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Full ref name, e.g. "refs/tags/v1.0".
    pub id: String,

    /// Short name, e.g. "v1.0".
    #[serde(rename = "displayId")]
    pub display_id: String,

    /// Object the tag points at.
    #[serde(default)]
    pub hash: Option<String>,

    #[serde(default, rename = "latestCommit")]
    pub latest_commit: Option<String>,
}

#[derive(Serialize)]
struct DeleteBranchRequest {
    name: String,
    #[serde(rename = "dryRun")]
    dry_run: bool,
}

impl StashClient {
    /// Lists all branches of a repository, keyed by display name.
    pub async fn list_branches(
        &self,
        project_key: &str,
        slug: &str,
    ) -> Result<BTreeMap<String, Branch>, StashError> {
        let path = format!("/rest/api/1.0/projects/{}/repos/{}/branches", project_key, slug);
        let path = path.as_str();
        collect_keyed(
            move |start| self.fetch_page(path, start),
            |branch: &Branch| branch.display_id.clone(),
        )
        .await
    }

    /// Lists all tags of a repository, keyed by display name.
    pub async fn list_tags(
        &self,
        project_key: &str,
        slug: &str,
    ) -> Result<BTreeMap<String, Tag>, StashError> {
        let path = format!("/rest/api/1.0/projects/{}/repos/{}/tags", project_key, slug);
        let path = path.as_str();
        collect_keyed(
            move |start| self.fetch_page(path, start),
            |tag: &Tag| tag.display_id.clone(),
        )
        .await
    }

    /// Deletes `refs/heads/{branch}`. Expects `204`.
    pub async fn delete_branch(
        &self,
        project_key: &str,
        slug: &str,
        branch: &str,
    ) -> Result<(), StashError> {
        let payload = DeleteBranchRequest {
            name: format!("refs/heads/{}", branch),
            dry_run: false,
        };
        self.request(
            Method::DELETE,
            &format!(
                "/rest/branch-utils/1.0/projects/{}/repos/{}/branches",
                project_key, slug
            ),
            Some(&payload),
            &[204],
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use mockito::Matcher;
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn test_list_branches_keyed_by_display_id() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/rest/api/1.0/projects/PROJ/repos/repo/branches")
            .match_query(Matcher::UrlEncoded("start".into(), "0".into()))
            .with_status(200)
            .with_body(
                json!({
                    "values": [
                        {"id": "refs/heads/main", "displayId": "main", "latestChangeset": "abc", "isDefault": true},
                        {"id": "refs/heads/dev", "displayId": "dev", "latestChangeset": "def", "isDefault": false}
                    ],
                    "isLastPage": false,
                    "nextPageStart": 2
                })
                .to_string(),
            )
            .create_async()
            .await;
        server
            .mock("GET", "/rest/api/1.0/projects/PROJ/repos/repo/branches")
            .match_query(Matcher::UrlEncoded("start".into(), "2".into()))
            .with_status(200)
            .with_body(
                json!({
                    "values": [{"id": "refs/heads/feature/x", "displayId": "feature/x"}],
                    "isLastPage": true
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = StashClient::new("", "", &server.url()).unwrap();
        let branches = client.list_branches("PROJ", "repo").await.unwrap();

        assert_eq!(branches.len(), 3);
        assert!(branches["main"].is_default);
        assert_eq!(branches["dev"].latest_changeset.as_deref(), Some("def"));
        assert_eq!(branches["feature/x"].id, "refs/heads/feature/x");
    }

    #[tokio::test]
    async fn test_list_tags() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/rest/api/1.0/projects/PROJ/repos/repo/tags")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(
                json!({
                    "values": [{"id": "refs/tags/v1.0", "displayId": "v1.0", "hash": "123"}],
                    "isLastPage": true
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = StashClient::new("", "", &server.url()).unwrap();
        let tags = client.list_tags("PROJ", "repo").await.unwrap();
        assert_eq!(tags["v1.0"].hash.as_deref(), Some("123"));
    }

    #[tokio::test]
    async fn test_delete_branch_sends_full_ref() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("DELETE", "/rest/branch-utils/1.0/projects/PROJ/repos/repo/branches")
            .match_body(Matcher::Json(json!({"name": "refs/heads/old", "dryRun": false})))
            .with_status(204)
            .create_async()
            .await;

        let client = StashClient::new("", "", &server.url()).unwrap();
        client.delete_branch("PROJ", "repo", "old").await.unwrap();
        mock.assert_async().await;
    }
}
