//
//  stash-client
//  api/server/repositories.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Stash Repository API
//!
//! Repositories always belong to exactly one project and are addressed by
//! `(project key, slug)`.
//!
//! ## API Endpoints
//!
//! ```text
//! GET          /rest/api/1.0/repos                               (paged)
//! GET/POST     /rest/api/1.0/projects/{projectKey}/repos         (GET paged)
//! GET/PUT/DEL  /rest/api/1.0/projects/{projectKey}/repos/{slug}
//! ```
//!
//! Listings are returned as maps keyed by repository ID, so a repository that
//! shifts between pages while listing is only reported once.

use std::collections::BTreeMap;

use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::projects::Project;
use crate::api::pagination::collect_keyed;
use crate::api::{StashClient, StashError, NO_BODY};

/// A repository as returned by the server.
///
/// # Example
///
/// ```rust
/// use stash_client::api::server::Repository;
///
/// let repo: Repository = serde_json::from_str(r#"{
///     "id": 1,
///     "name": "My Repo",
///     "slug": "my-repo",
///     "project": {"id": 2, "key": "PROJ"},
///     "scmId": "git",
///     "links": {"clone": [
///         {"href": "ssh://git@stash.example.com:7999/proj/my-repo.git", "name": "ssh"}
///     ]}
/// }"#).unwrap();
///
/// assert_eq!(repo.ssh_url(), Some("ssh://git@stash.example.com:7999/proj/my-repo.git"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    /// Unique numeric identifier.
    pub id: u64,

    /// Display name.
    pub name: String,

    /// URL-safe identifier used in paths and clone URLs.
    pub slug: String,

    /// The owning project.
    #[serde(default)]
    pub project: Project,

    /// Source control type, "git" in practice.
    #[serde(default, rename = "scmId")]
    pub scm_id: String,

    /// Lifecycle state, e.g. "AVAILABLE".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    #[serde(default)]
    pub forkable: bool,

    #[serde(default, rename = "public")]
    pub is_public: bool,

    #[serde(default)]
    pub links: RepositoryLinks,
}

/// Links attached to a repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryLinks {
    /// Clone URLs, one per protocol.
    #[serde(default)]
    pub clone: Vec<CloneLink>,

    /// Web UI links.
    #[serde(default, rename = "self")]
    pub self_link: Vec<SelfLink>,
}

/// A clone URL and the protocol it is for ("ssh" or "http").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloneLink {
    pub href: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelfLink {
    pub href: String,
}

impl Repository {
    /// The SSH clone URL, if the server advertises one.
    pub fn ssh_url(&self) -> Option<&str> {
        self.links
            .clone
            .iter()
            .find(|link| link.name == "ssh")
            .map(|link| link.href.as_str())
    }

    /// The web UI URL, if present.
    pub fn web_url(&self) -> Option<&str> {
        self.links.self_link.first().map(|link| link.href.as_str())
    }

    /// `true` if any clone link of this repository is exactly `url`.
    pub fn has_clone_url(&self, url: &str) -> bool {
        self.links.clone.iter().any(|link| link.href == url)
    }
}

/// Finds the repository that has `url` among its clone links.
pub fn find_by_clone_url<'a>(
    repositories: &'a BTreeMap<u64, Repository>,
    url: &str,
) -> Option<&'a Repository> {
    repositories.values().find(|repo| repo.has_clone_url(url))
}

#[derive(Serialize)]
struct CreateRepositoryRequest<'a> {
    name: &'a str,
    #[serde(rename = "scmId")]
    scm_id: &'a str,
}

#[derive(Serialize)]
struct RenameRepositoryRequest<'a> {
    name: &'a str,
}

#[derive(Serialize)]
struct MoveRepositoryRequest<'a> {
    project: ProjectKey<'a>,
}

#[derive(Serialize)]
struct ProjectKey<'a> {
    key: &'a str,
}

fn repository_path(project_key: &str, slug: &str) -> String {
    format!("/rest/api/1.0/projects/{}/repos/{}", project_key, slug)
}

impl StashClient {
    /// Creates a git repository named `slug` in `project_key`. Expects `201`.
    pub async fn create_repository(
        &self,
        project_key: &str,
        slug: &str,
    ) -> Result<Repository, StashError> {
        let payload = CreateRepositoryRequest {
            name: slug,
            scm_id: "git",
        };
        self.request_json(
            Method::POST,
            &format!("/rest/api/1.0/projects/{}/repos", project_key),
            Some(&payload),
            &[201],
        )
        .await
    }

    /// Renames a repository. Expects `201`.
    pub async fn rename_repository(
        &self,
        project_key: &str,
        slug: &str,
        new_name: &str,
    ) -> Result<(), StashError> {
        self.request(
            Method::PUT,
            &repository_path(project_key, slug),
            Some(&RenameRepositoryRequest { name: new_name }),
            &[201],
        )
        .await?;
        Ok(())
    }

    /// Moves a repository to another project. Expects `201`.
    pub async fn move_repository(
        &self,
        project_key: &str,
        slug: &str,
        new_project_key: &str,
    ) -> Result<(), StashError> {
        let payload = MoveRepositoryRequest {
            project: ProjectKey {
                key: new_project_key,
            },
        };
        self.request(
            Method::PUT,
            &repository_path(project_key, slug),
            Some(&payload),
            &[201],
        )
        .await?;
        Ok(())
    }

    /// Schedules a repository for deletion. Expects `202` or `204`.
    pub async fn remove_repository(&self, project_key: &str, slug: &str) -> Result<(), StashError> {
        self.request(
            Method::DELETE,
            &repository_path(project_key, slug),
            NO_BODY,
            &[202, 204],
        )
        .await?;
        Ok(())
    }

    /// Fetches a single repository.
    pub async fn get_repository(
        &self,
        project_key: &str,
        slug: &str,
    ) -> Result<Repository, StashError> {
        self.request_json(
            Method::GET,
            &repository_path(project_key, slug),
            NO_BODY,
            &[200],
        )
        .await
    }

    /// Lists every repository visible to the client, keyed by ID.
    pub async fn list_repositories(&self) -> Result<BTreeMap<u64, Repository>, StashError> {
        collect_keyed(
            move |start| self.fetch_page("/rest/api/1.0/repos", start),
            |repo: &Repository| repo.id,
        )
        .await
    }

    /// Lists the repositories of one project, keyed by ID.
    pub async fn list_project_repositories(
        &self,
        project_key: &str,
    ) -> Result<BTreeMap<u64, Repository>, StashError> {
        let path = format!("/rest/api/1.0/projects/{}/repos", project_key);
        let path = path.as_str();
        collect_keyed(
            move |start| self.fetch_page(path, start),
            |repo: &Repository| repo.id,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use mockito::Matcher;
    use serde_json::json;

    use super::*;

    fn repo_json(id: u64, slug: &str) -> serde_json::Value {
        json!({
            "id": id,
            "name": slug,
            "slug": slug,
            "project": {"id": 1, "key": "PROJ"},
            "scmId": "git",
            "links": {
                "clone": [
                    {"href": format!("ssh://git@stash:7999/proj/{slug}.git"), "name": "ssh"},
                    {"href": format!("https://stash/scm/proj/{slug}.git"), "name": "http"}
                ]
            }
        })
    }

    fn page_json(values: Vec<serde_json::Value>, start: u32, next: Option<u32>) -> String {
        let size = values.len();
        json!({
            "values": values,
            "size": size,
            "limit": 25,
            "start": start,
            "isLastPage": next.is_none(),
            "nextPageStart": next
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_create_repository() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/rest/api/1.0/projects/PROJ/repos")
            .match_body(Matcher::Json(json!({"name": "repo", "scmId": "git"})))
            .with_status(201)
            .with_body(repo_json(5, "repo").to_string())
            .create_async()
            .await;

        let client = StashClient::new("", "", &server.url()).unwrap();
        let repo = client.create_repository("PROJ", "repo").await.unwrap();

        mock.assert_async().await;
        assert_eq!(repo.id, 5);
        assert_eq!(repo.project.key, "PROJ");
    }

    #[tokio::test]
    async fn test_rename_requires_201() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("PUT", "/rest/api/1.0/projects/PROJ/repos/repo")
            .match_body(Matcher::Json(json!({"name": "renamed"})))
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let client = StashClient::new("", "", &server.url()).unwrap();
        let err = client
            .rename_repository("PROJ", "repo", "renamed")
            .await
            .unwrap_err();
        assert!(matches!(err, StashError::UnexpectedStatus { status: 200, .. }));
    }

    #[tokio::test]
    async fn test_move_repository_targets_repository_path() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PUT", "/rest/api/1.0/projects/PROJ/repos/repo")
            .match_body(Matcher::Json(json!({"project": {"key": "OTHER"}})))
            .with_status(201)
            .with_body("{}")
            .create_async()
            .await;

        let client = StashClient::new("", "", &server.url()).unwrap();
        client.move_repository("PROJ", "repo", "OTHER").await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_remove_accepts_202_and_204() {
        let mut server = mockito::Server::new_async().await;
        for status in [202, 204] {
            let mock = server
                .mock("DELETE", "/rest/api/1.0/projects/PROJ/repos/repo")
                .with_status(status)
                .create_async()
                .await;

            let client = StashClient::new("", "", &server.url()).unwrap();
            client.remove_repository("PROJ", "repo").await.unwrap();
            mock.assert_async().await;
            mock.remove_async().await;
        }
    }

    #[tokio::test]
    async fn test_missing_repository_is_not_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/rest/api/1.0/projects/PROJ/repos/nope")
            .with_status(404)
            .with_body(r#"{"errors":[{"message":"Repository PROJ/nope does not exist."}]}"#)
            .create_async()
            .await;

        let client = StashClient::new("", "", &server.url()).unwrap();
        let err = client.get_repository("PROJ", "nope").await.unwrap_err();
        assert!(crate::api::is_repository_not_found(Some(&err)));
    }

    #[tokio::test]
    async fn test_list_repositories_walks_pages_by_server_cursor() {
        let mut server = mockito::Server::new_async().await;
        let first = server
            .mock("GET", "/rest/api/1.0/repos")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("start".into(), "0".into()),
                Matcher::UrlEncoded("limit".into(), "25".into()),
            ]))
            .with_status(200)
            .with_body(page_json(vec![repo_json(1, "a"), repo_json(2, "b")], 0, Some(30)))
            .create_async()
            .await;
        let second = server
            .mock("GET", "/rest/api/1.0/repos")
            .match_query(Matcher::UrlEncoded("start".into(), "30".into()))
            .with_status(200)
            .with_body(page_json(vec![repo_json(2, "b"), repo_json(3, "c")], 30, None))
            .create_async()
            .await;

        let client = StashClient::new("", "", &server.url()).unwrap();
        let repos = client.list_repositories().await.unwrap();

        first.assert_async().await;
        second.assert_async().await;
        assert_eq!(repos.keys().copied().collect::<Vec<_>>(), vec![1, 2, 3]);

        let found = find_by_clone_url(&repos, "https://stash/scm/proj/c.git").unwrap();
        assert_eq!(found.id, 3);
        assert!(find_by_clone_url(&repos, "https://stash/scm/proj/z.git").is_none());
    }

    #[tokio::test]
    async fn test_list_project_repositories() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/rest/api/1.0/projects/PROJ/repos")
            .match_query(Matcher::UrlEncoded("start".into(), "0".into()))
            .with_status(200)
            .with_body(page_json(vec![repo_json(9, "only")], 0, None))
            .create_async()
            .await;

        let client = StashClient::new("", "", &server.url()).unwrap();
        let repos = client.list_project_repositories("PROJ").await.unwrap();
        assert_eq!(repos[&9].slug, "only");
    }

    #[test]
    fn test_ssh_url_absent() {
        let mut repo: Repository = serde_json::from_value(repo_json(1, "a")).unwrap();
        repo.links.clone.retain(|link| link.name != "ssh");
        assert_eq!(repo.ssh_url(), None);
    }
}
