//
//  stash-client
//  api/server/pullrequests.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Stash Pull Request API
//!
//! Pull requests propose merging a source ref (`fromRef`) into a target ref
//! (`toRef`) of the same repository.
//!
//! ## API Endpoints
//!
//! ```text
//! GET/POST  /rest/api/1.0/projects/{projectKey}/repos/{slug}/pull-requests       (GET paged)
//! GET/PUT   /rest/api/1.0/projects/{projectKey}/repos/{slug}/pull-requests/{id}
//! POST      /rest/api/1.0/projects/{projectKey}/repos/{slug}/pull-requests/{id}/merge
//! POST      /rest/api/1.0/projects/{projectKey}/repos/{slug}/pull-requests/{id}/comments
//! ```
//!
//! ## Merging
//!
//! A merge answered with `409 Conflict` is not a failure of the call: the
//! server explains in the body which merge checks vetoed it, and
//! [`StashClient::merge_pull_request`] returns those as [`MergeResult::errors`].
//!
//! ## Notes
//!
//! - Timestamps (`createdDate`, `updatedDate`) are Unix milliseconds
//! - Updates must carry the current `version`, or the server answers `409`

use chrono::{DateTime, TimeZone, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::repositories::Repository;
use crate::api::client::decode;
use crate::api::pagination::collect_list;
use crate::api::{StashClient, StashError, NO_BODY};

/// A pull request as returned by the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    pub id: u64,

    /// Optimistic locking version, required for updates and merges.
    #[serde(default)]
    pub version: u32,

    #[serde(default)]
    pub closed: bool,

    #[serde(default)]
    pub open: bool,

    /// "OPEN", "MERGED" or "DECLINED".
    #[serde(default)]
    pub state: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default, rename = "fromRef")]
    pub from_ref: Ref,

    #[serde(default, rename = "toRef")]
    pub to_ref: Ref,

    #[serde(default, rename = "createdDate")]
    pub created_date: i64,

    #[serde(default, rename = "updatedDate")]
    pub updated_date: i64,

    #[serde(default)]
    pub reviewers: Vec<Participant>,

    #[serde(default)]
    pub author: Participant,
}

impl PullRequest {
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.created_date).single()
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.updated_date).single()
    }
}

/// One side of a pull request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ref {
    /// Full ref name, e.g. "refs/heads/feature".
    #[serde(default)]
    pub id: String,

    #[serde(default, rename = "displayId")]
    pub display_id: String,

    #[serde(default, rename = "latestCommit")]
    pub latest_commit: Option<String>,

    #[serde(default)]
    pub repository: Option<Repository>,
}

/// A user account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub name: String,

    #[serde(default, rename = "emailAddress")]
    pub email_address: Option<String>,

    #[serde(default, rename = "displayName")]
    pub display_name: Option<String>,
}

/// The author or a reviewer of a pull request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    #[serde(default)]
    pub user: User,

    #[serde(default)]
    pub approved: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// A pull request comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: u64,

    #[serde(default)]
    pub text: String,

    #[serde(default)]
    pub version: u32,
}

/// Input for [`StashClient::create_pull_request`].
///
/// `from_ref` and `to_ref` are full ref names ("refs/heads/feature").
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewPullRequest {
    pub title: String,
    pub description: String,
    pub from_ref: String,
    pub to_ref: String,
    pub reviewers: Vec<String>,
}

/// Input for [`StashClient::update_pull_request`].
///
/// Empty strings leave the corresponding field untouched. `to_ref` retargets
/// the pull request when set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PullRequestUpdate {
    pub version: u32,
    pub title: String,
    pub description: String,
    pub to_ref: Option<String>,
    pub reviewers: Vec<String>,
}

/// Outcome of a merge attempt.
///
/// On success `pull_request` holds the merged pull request and `errors` is
/// empty. When the server refuses with `409`, `pull_request` is `None` and
/// `errors` says why.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeResult {
    pub pull_request: Option<PullRequest>,
    pub errors: Vec<MergeError>,
}

impl MergeResult {
    pub fn is_merged(&self) -> bool {
        self.pull_request.is_some() && self.errors.is_empty()
    }
}

/// A reason the server refused a merge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeError {
    #[serde(default)]
    pub context: Option<String>,

    #[serde(default)]
    pub message: String,

    #[serde(default, rename = "exceptionName")]
    pub exception_name: Option<String>,

    /// The branches have conflicting changes.
    #[serde(default)]
    pub conflicted: bool,

    #[serde(default)]
    pub vetoes: Vec<Veto>,
}

/// A merge check that blocked the merge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Veto {
    #[serde(default, rename = "summaryMessage")]
    pub summary_message: String,

    #[serde(default, rename = "detailedMessage")]
    pub detailed_message: String,
}

#[derive(Deserialize)]
struct MergeConflict {
    #[serde(default)]
    errors: Vec<MergeError>,
}

// Wire payloads. Empty fields are omitted so a PUT only touches what is set.
// `version` is always sent on update, including version 0.

#[derive(Serialize)]
struct PullRequestResource<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<u32>,
    #[serde(skip_serializing_if = "is_blank")]
    title: &'a str,
    #[serde(skip_serializing_if = "is_blank")]
    description: &'a str,
    #[serde(rename = "fromRef", skip_serializing_if = "Option::is_none")]
    from_ref: Option<RefSpec<'a>>,
    #[serde(rename = "toRef", skip_serializing_if = "Option::is_none")]
    to_ref: Option<RefSpec<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    reviewers: Vec<ReviewerSpec<'a>>,
}

#[derive(Serialize)]
struct RefSpec<'a> {
    id: &'a str,
    repository: RepositorySpec<'a>,
}

#[derive(Serialize)]
struct RepositorySpec<'a> {
    slug: &'a str,
    project: ProjectSpec<'a>,
}

#[derive(Serialize)]
struct ProjectSpec<'a> {
    key: &'a str,
}

#[derive(Serialize)]
struct ReviewerSpec<'a> {
    user: UserSpec<'a>,
}

#[derive(Serialize)]
struct UserSpec<'a> {
    name: &'a str,
}

#[derive(Serialize)]
struct MergeRequest {
    version: u32,
}

#[derive(Serialize)]
struct CommentRequest<'a> {
    text: &'a str,
}

fn is_blank(value: &&str) -> bool {
    value.is_empty()
}

fn ref_spec<'a>(project_key: &'a str, slug: &'a str, id: &'a str) -> RefSpec<'a> {
    RefSpec {
        id,
        repository: RepositorySpec {
            slug,
            project: ProjectSpec { key: project_key },
        },
    }
}

fn reviewer_specs(reviewers: &[String]) -> Vec<ReviewerSpec<'_>> {
    reviewers
        .iter()
        .map(|name| ReviewerSpec {
            user: UserSpec { name },
        })
        .collect()
}

fn pull_requests_path(project_key: &str, slug: &str) -> String {
    format!(
        "/rest/api/1.0/projects/{}/repos/{}/pull-requests",
        project_key, slug
    )
}

impl StashClient {
    /// Lists pull requests in `state` ("OPEN", "MERGED", "DECLINED" or "ALL"),
    /// in server order.
    pub async fn list_pull_requests(
        &self,
        project_key: &str,
        slug: &str,
        state: &str,
    ) -> Result<Vec<PullRequest>, StashError> {
        let path = format!("{}?state={}", pull_requests_path(project_key, slug), state);
        let path = path.as_str();
        collect_list(move |start| self.fetch_page(path, start)).await
    }

    pub async fn get_pull_request(
        &self,
        project_key: &str,
        slug: &str,
        id: u64,
    ) -> Result<PullRequest, StashError> {
        self.request_json(
            Method::GET,
            &format!("{}/{}", pull_requests_path(project_key, slug), id),
            NO_BODY,
            &[200],
        )
        .await
    }

    /// Opens a pull request between two refs of the same repository.
    pub async fn create_pull_request(
        &self,
        project_key: &str,
        slug: &str,
        pull_request: &NewPullRequest,
    ) -> Result<PullRequest, StashError> {
        let payload = PullRequestResource {
            version: None,
            title: &pull_request.title,
            description: &pull_request.description,
            from_ref: Some(ref_spec(project_key, slug, &pull_request.from_ref)),
            to_ref: Some(ref_spec(project_key, slug, &pull_request.to_ref)),
            reviewers: reviewer_specs(&pull_request.reviewers),
        };
        self.request_json(
            Method::POST,
            &pull_requests_path(project_key, slug),
            Some(&payload),
            &[201],
        )
        .await
    }

    pub async fn update_pull_request(
        &self,
        project_key: &str,
        slug: &str,
        id: u64,
        update: &PullRequestUpdate,
    ) -> Result<PullRequest, StashError> {
        let payload = PullRequestResource {
            version: Some(update.version),
            title: &update.title,
            description: &update.description,
            from_ref: None,
            to_ref: update
                .to_ref
                .as_deref()
                .map(|to_ref| ref_spec(project_key, slug, to_ref)),
            reviewers: reviewer_specs(&update.reviewers),
        };
        self.request_json(
            Method::PUT,
            &format!("{}/{}", pull_requests_path(project_key, slug), id),
            Some(&payload),
            &[200],
        )
        .await
    }

    /// Merges a pull request at `version`.
    ///
    /// # Errors
    ///
    /// Any pipeline error except a `409` carrying an error envelope, which is
    /// reported through [`MergeResult::errors`] instead. A `409` whose body is
    /// not an envelope still fails with [`StashError::UnparseableErrorBody`].
    pub async fn merge_pull_request(
        &self,
        project_key: &str,
        slug: &str,
        id: u64,
        version: u32,
    ) -> Result<MergeResult, StashError> {
        let path = format!("{}/{}/merge", pull_requests_path(project_key, slug), id);
        match self
            .request(Method::POST, &path, Some(&MergeRequest { version }), &[200])
            .await
        {
            Ok(body) => Ok(MergeResult {
                pull_request: Some(decode(body)?),
                errors: Vec::new(),
            }),
            Err(StashError::Api {
                status: 409, body, ..
            }) => {
                let conflict: MergeConflict = decode(body)?;
                Ok(MergeResult {
                    pull_request: None,
                    errors: conflict.errors,
                })
            }
            Err(err) => Err(err),
        }
    }

    pub async fn create_comment(
        &self,
        project_key: &str,
        slug: &str,
        id: u64,
        text: &str,
    ) -> Result<Comment, StashError> {
        self.request_json(
            Method::POST,
            &format!("{}/{}/comments", pull_requests_path(project_key, slug), id),
            Some(&CommentRequest { text }),
            &[201],
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use mockito::Matcher;
    use serde_json::json;

    use super::*;

    const BASE: &str = "/rest/api/1.0/projects/PROJ/repos/repo/pull-requests";

    fn pr_json(id: u64, version: u32) -> serde_json::Value {
        json!({
            "id": id,
            "version": version,
            "title": format!("PR {id}"),
            "state": "OPEN",
            "open": true,
            "closed": false,
            "createdDate": 1_700_000_000_000_i64,
            "updatedDate": 1_700_000_100_000_i64,
            "fromRef": {"id": "refs/heads/feature", "displayId": "feature", "latestCommit": "abc"},
            "toRef": {"id": "refs/heads/main", "displayId": "main"},
            "author": {"user": {"name": "alice", "displayName": "Alice"}},
            "reviewers": [{"user": {"name": "bob"}, "approved": true}]
        })
    }

    fn client_for(server: &mockito::ServerGuard) -> StashClient {
        StashClient::new("", "", &server.url()).unwrap()
    }

    #[tokio::test]
    async fn test_list_pull_requests_keeps_server_order() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", BASE)
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("state".into(), "OPEN".into()),
                Matcher::UrlEncoded("start".into(), "0".into()),
            ]))
            .with_status(200)
            .with_body(
                json!({"values": [pr_json(9, 0), pr_json(3, 0)], "isLastPage": false, "nextPageStart": 2})
                    .to_string(),
            )
            .create_async()
            .await;
        server
            .mock("GET", BASE)
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("state".into(), "OPEN".into()),
                Matcher::UrlEncoded("start".into(), "2".into()),
            ]))
            .with_status(200)
            .with_body(json!({"values": [pr_json(5, 0)], "isLastPage": true}).to_string())
            .create_async()
            .await;

        let prs = client_for(&server)
            .list_pull_requests("PROJ", "repo", "OPEN")
            .await
            .unwrap();

        let ids: Vec<u64> = prs.iter().map(|pr| pr.id).collect();
        assert_eq!(ids, vec![9, 3, 5]);
        assert_eq!(prs[0].author.user.name, "alice");
        assert!(prs[0].reviewers[0].approved);
    }

    #[tokio::test]
    async fn test_create_pull_request_payload() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", BASE)
            .match_body(Matcher::Json(json!({
                "title": "Add widget",
                "fromRef": {"id": "refs/heads/feature", "repository": {"slug": "repo", "project": {"key": "PROJ"}}},
                "toRef": {"id": "refs/heads/main", "repository": {"slug": "repo", "project": {"key": "PROJ"}}},
                "reviewers": [{"user": {"name": "bob"}}]
            })))
            .with_status(201)
            .with_body(pr_json(1, 0).to_string())
            .create_async()
            .await;

        let pr = client_for(&server)
            .create_pull_request(
                "PROJ",
                "repo",
                &NewPullRequest {
                    title: "Add widget".to_string(),
                    from_ref: "refs/heads/feature".to_string(),
                    to_ref: "refs/heads/main".to_string(),
                    reviewers: vec!["bob".to_string()],
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(pr.id, 1);
        assert_eq!(pr.from_ref.latest_commit.as_deref(), Some("abc"));
    }

    #[tokio::test]
    async fn test_update_pull_request_omits_empty_fields() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PUT", format!("{BASE}/4").as_str())
            .match_body(Matcher::Json(json!({"version": 2, "description": "better"})))
            .with_status(200)
            .with_body(pr_json(4, 3).to_string())
            .create_async()
            .await;

        let pr = client_for(&server)
            .update_pull_request(
                "PROJ",
                "repo",
                4,
                &PullRequestUpdate {
                    version: 2,
                    description: "better".to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(pr.version, 3);
    }

    #[tokio::test]
    async fn test_update_pull_request_sends_version_zero() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PUT", format!("{BASE}/4").as_str())
            .match_body(Matcher::Json(json!({"version": 0, "title": "new"})))
            .with_status(200)
            .with_body(pr_json(4, 1).to_string())
            .create_async()
            .await;

        let pr = client_for(&server)
            .update_pull_request(
                "PROJ",
                "repo",
                4,
                &PullRequestUpdate {
                    version: 0,
                    title: "new".to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(pr.version, 1);
    }

    #[tokio::test]
    async fn test_merge_conflict_without_envelope_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", format!("{BASE}/4/merge").as_str())
            .with_status(409)
            .with_body("<html>Conflict</html>")
            .create_async()
            .await;

        let err = client_for(&server)
            .merge_pull_request("PROJ", "repo", 4, 1)
            .await
            .unwrap_err();

        assert!(matches!(err, StashError::UnparseableErrorBody { status: 409, .. }));
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_merge_success() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", format!("{BASE}/4/merge").as_str())
            .match_body(Matcher::Json(json!({"version": 1})))
            .with_status(200)
            .with_body(pr_json(4, 2).to_string())
            .create_async()
            .await;

        let result = client_for(&server)
            .merge_pull_request("PROJ", "repo", 4, 1)
            .await
            .unwrap();

        assert!(result.is_merged());
        assert_eq!(result.pull_request.map(|pr| pr.id), Some(4));
    }

    #[tokio::test]
    async fn test_merge_conflict_is_decoded_outcome() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", format!("{BASE}/4/merge").as_str())
            .with_status(409)
            .with_body(
                json!({"errors": [{
                    "context": null,
                    "message": "Merging the pull request has been vetoed.",
                    "exceptionName": "com.atlassian.bitbucket.pull.PullRequestMergeVetoedException",
                    "conflicted": false,
                    "vetoes": [{"summaryMessage": "Not approved", "detailedMessage": "Needs 2 approvals"}]
                }]})
                .to_string(),
            )
            .create_async()
            .await;

        let result = client_for(&server)
            .merge_pull_request("PROJ", "repo", 4, 1)
            .await
            .unwrap();

        assert!(!result.is_merged());
        assert!(result.pull_request.is_none());
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].vetoes[0].summary_message, "Not approved");
    }

    #[tokio::test]
    async fn test_merge_other_failures_are_errors() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", format!("{BASE}/4/merge").as_str())
            .with_status(401)
            .with_body(r#"{"errors": [{"message": "Authentication failed"}]}"#)
            .create_async()
            .await;

        let err = client_for(&server)
            .merge_pull_request("PROJ", "repo", 4, 1)
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), Some(401));
        assert_eq!(err.to_string(), "Authentication failed");
    }

    #[tokio::test]
    async fn test_create_comment() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", format!("{BASE}/4/comments").as_str())
            .match_body(Matcher::Json(json!({"text": "LGTM"})))
            .with_status(201)
            .with_body(r#"{"id": 77, "text": "LGTM", "version": 0}"#)
            .create_async()
            .await;

        let comment = client_for(&server)
            .create_comment("PROJ", "repo", 4, "LGTM")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(comment.id, 77);
    }

    #[test]
    fn test_timestamps_are_milliseconds() {
        let pr: PullRequest = serde_json::from_value(pr_json(1, 0)).unwrap();
        let created = pr.created_at().unwrap();
        assert_eq!(created.timestamp(), 1_700_000_000);
        assert!(pr.updated_at().unwrap() > created);
    }
}
