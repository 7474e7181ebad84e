//
//  stash-client
//  api/server/commits.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Commits and raw file content.

use chrono::{DateTime, TimeZone, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::api::{StashClient, StashError, NO_BODY};

/// Upper bound on commits returned by [`StashClient::get_commits`].
pub const COMMIT_RANGE_LIMIT: u32 = 1000;

/// A commit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub id: String,

    #[serde(default, rename = "displayId")]
    pub display_id: String,

    #[serde(default)]
    pub author: CommitAuthor,

    /// Milliseconds since the epoch.
    #[serde(default, rename = "authorTimestamp")]
    pub author_timestamp: i64,

    #[serde(default)]
    pub message: Option<String>,

    #[serde(default)]
    pub attributes: CommitAttributes,
}

impl Commit {
    pub fn authored_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.author_timestamp).single()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitAuthor {
    #[serde(default)]
    pub name: String,

    #[serde(default, rename = "emailAddress")]
    pub email_address: String,
}

/// Server-side commit attributes. Only linked Jira issues are decoded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitAttributes {
    #[serde(default, rename = "jira-key")]
    pub jira_keys: Vec<String>,
}

/// A commit range.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commits {
    #[serde(default, rename = "values")]
    pub commits: Vec<Commit>,
}

impl StashClient {
    pub async fn get_commit(
        &self,
        project_key: &str,
        slug: &str,
        hash: &str,
    ) -> Result<Commit, StashError> {
        self.request_json(
            Method::GET,
            &format!(
                "/rest/api/1.0/projects/{}/repos/{}/commits/{}",
                project_key, slug, hash
            ),
            NO_BODY,
            &[200],
        )
        .await
    }

    /// Commits reachable from `until` but not from `since`, newest first.
    ///
    /// Fetched in one request of at most [`COMMIT_RANGE_LIMIT`] commits.
    pub async fn get_commits(
        &self,
        project_key: &str,
        slug: &str,
        since: &str,
        until: &str,
    ) -> Result<Commits, StashError> {
        self.request_json(
            Method::GET,
            &format!(
                "/rest/api/1.0/projects/{}/repos/{}/commits?since={}&until={}&limit={}",
                project_key, slug, since, until, COMMIT_RANGE_LIMIT
            ),
            NO_BODY,
            &[200],
        )
        .await
    }

    /// Raw content of `path` at `at` (a branch, tag or commit).
    ///
    /// Uses the web UI browse endpoint, which expects lower-case keys.
    pub async fn get_raw_file(
        &self,
        project_key: &str,
        slug: &str,
        path: &str,
        at: &str,
    ) -> Result<Vec<u8>, StashError> {
        self.request(
            Method::GET,
            &format!(
                "/projects/{}/repos/{}/browse/{}?at={}&raw",
                project_key.to_lowercase(),
                slug.to_lowercase(),
                path.trim_start_matches('/'),
                at
            ),
            NO_BODY,
            &[200],
        )
        .await
    }
}
