//
//  stash-client
//  api/server/projects.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Stash Project API
//!
//! Projects are the top-level container for repositories. They are identified
//! by a short uppercase key that appears in every repository path.
//!
//! ## API Endpoint
//!
//! ```text
//! POST /rest/api/1.0/projects
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! let project = client.create_project("PROJ").await?;
//! println!("Created project {} ({})", project.key, project.id);
//! ```

use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::api::{StashClient, StashError};

/// A Stash project.
///
/// Repository payloads embed a trimmed-down project (`id` and `key` only), so
/// everything else is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Unique numeric identifier assigned by the server.
    #[serde(default)]
    pub id: u64,

    /// Short uppercase key used in URLs. Example: "PROJ".
    pub key: String,

    /// Human-readable display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Whether the project is publicly readable.
    #[serde(default, rename = "public")]
    pub is_public: bool,
}

#[derive(Serialize)]
struct CreateProjectRequest<'a> {
    key: &'a str,
}

impl StashClient {
    /// Creates a project with the given key. Expects `201 Created`.
    pub async fn create_project(&self, project_key: &str) -> Result<Project, StashError> {
        self.request_json(
            Method::POST,
            "/rest/api/1.0/projects",
            Some(&CreateProjectRequest { key: project_key }),
            &[201],
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use mockito::Matcher;

    use super::*;

    #[tokio::test]
    async fn test_create_project() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/rest/api/1.0/projects")
            .match_body(Matcher::Json(serde_json::json!({"key": "PROJ"})))
            .with_status(201)
            .with_body(r#"{"id": 7, "key": "PROJ", "name": "Project", "public": false}"#)
            .create_async()
            .await;

        let client = StashClient::new("", "", &server.url()).unwrap();
        let project = client.create_project("PROJ").await.unwrap();

        mock.assert_async().await;
        assert_eq!(project.id, 7);
        assert_eq!(project.name.as_deref(), Some("Project"));
    }

    #[tokio::test]
    async fn test_create_existing_project_is_conflict() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/rest/api/1.0/projects")
            .with_status(409)
            .with_body(r#"{"errors":[{"context":"key","message":"Project key is already taken"}]}"#)
            .create_async()
            .await;

        let client = StashClient::new("", "", &server.url()).unwrap();
        let err = client.create_project("PROJ").await.unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(err.to_string(), "Project key is already taken");
    }
}
