//
//  stash-client
//  api/request.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Request Builder
//!
//! Turns a request intent (method, relative path, optional payload) into a
//! [`WireRequest`]: absolute URL, headers and body bytes. Building is pure, so the
//! same inputs always produce the same wire request.
//!
//! Headers applied to every request:
//!
//! | Header | When |
//! |--------|------|
//! | `X-Atlassian-Token: no-check` | Always (the server's XSRF guard) |
//! | `Accept` / `Content-Type: application/json` | When a payload is present |
//! | `Authorization: Basic ...` | When both username and password are non-empty |

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::multipart::Form;
use reqwest::{Client, Method, RequestBuilder};
use serde::Serialize;
use url::Url;

use super::StashError;

/// Header the server checks before accepting state-changing requests.
pub const ATLASSIAN_TOKEN_HEADER: &str = "x-atlassian-token";

/// MIME type for JSON bodies.
pub const APPLICATION_JSON: &str = "application/json";

/// Credentials and base URL of a client. Immutable once built.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientIdentity {
    username: String,
    password: String,
    base_url: Url,
}

impl fmt::Debug for ClientIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientIdentity")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}

impl ClientIdentity {
    /// Creates an identity. Empty username or password means anonymous access.
    ///
    /// # Errors
    ///
    /// Returns [`StashError::InvalidBaseUrl`] if `base_url` is not absolute.
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        base_url: &str,
    ) -> Result<Self, StashError> {
        Ok(Self {
            username: username.into(),
            password: password.into(),
            base_url: Url::parse(base_url)?,
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `true` when requests will carry Basic credentials.
    pub fn is_authenticated(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }

    /// Resolves a path against the base URL with exactly one separating slash.
    ///
    /// Absolute `http(s)://` links (as returned by some task endpoints) are used
    /// unchanged when they share the base URL's scheme, host and port.
    ///
    /// # Errors
    ///
    /// Returns [`StashError::ForeignOrigin`] for an absolute link to any other
    /// origin, so credentials never leave the configured server.
    ///
    /// ```rust
    /// use stash_client::api::ClientIdentity;
    ///
    /// let with_slash = ClientIdentity::new("", "", "https://host/")?;
    /// let without = ClientIdentity::new("", "", "https://host")?;
    /// assert_eq!(with_slash.resolve("/rest/x")?, "https://host/rest/x");
    /// assert_eq!(without.resolve("/rest/x")?, "https://host/rest/x");
    /// # Ok::<(), stash_client::api::StashError>(())
    /// ```
    pub fn resolve(&self, path: &str) -> Result<String, StashError> {
        if path.starts_with("http://") || path.starts_with("https://") {
            return match Url::parse(path) {
                Ok(link) if link.origin() == self.base_url.origin() => Ok(path.to_string()),
                _ => Err(StashError::ForeignOrigin {
                    url: path.to_string(),
                }),
            };
        }

        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(format!("{}/{}", base, path))
    }

    /// The `Authorization` header value, or `None` for anonymous access.
    pub fn authorization(&self) -> Option<String> {
        self.is_authenticated().then(|| {
            let pair = format!("{}:{}", self.username, self.password);
            format!("Basic {}", STANDARD.encode(pair))
        })
    }
}

/// Body of a wire request.
#[derive(Debug)]
pub enum WireBody {
    /// Serialized JSON bytes.
    Json(Vec<u8>),
    /// A multipart form (add-on uploads).
    Multipart(Form),
}

/// A fully built request, owned by the call that built it.
#[derive(Debug)]
pub struct WireRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<WireBody>,
}

impl WireRequest {
    /// Builds a wire request from a method, relative path and optional payload.
    ///
    /// # Errors
    ///
    /// Returns [`StashError::Encoding`] if the payload cannot be serialized; no
    /// partial request is produced.
    ///
    /// # Example
    ///
    /// ```rust
    /// use reqwest::Method;
    /// use stash_client::api::{ClientIdentity, WireRequest};
    ///
    /// let identity = ClientIdentity::new("admin", "secret", "https://stash.example.com/")?;
    /// let request = WireRequest::build(
    ///     &identity,
    ///     Method::POST,
    ///     "/rest/api/1.0/projects",
    ///     Some(&serde_json::json!({"key": "PROJ"})),
    /// )?;
    /// assert_eq!(request.url, "https://stash.example.com/rest/api/1.0/projects");
    /// assert!(request.headers.contains_key("authorization"));
    /// # Ok::<(), stash_client::api::StashError>(())
    /// ```
    pub fn build<B: Serialize + ?Sized>(
        identity: &ClientIdentity,
        method: Method,
        path: &str,
        payload: Option<&B>,
    ) -> Result<Self, StashError> {
        let body = payload
            .map(serde_json::to_vec)
            .transpose()
            .map_err(StashError::Encoding)?;

        let mut headers = base_headers(identity)?;
        if body.is_some() {
            headers.insert(ACCEPT, HeaderValue::from_static(APPLICATION_JSON));
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));
        }

        Ok(Self {
            method,
            url: identity.resolve(path)?,
            headers,
            body: body.map(WireBody::Json),
        })
    }

    /// Builds a multipart upload request. The form sets its own content type.
    pub fn multipart(
        identity: &ClientIdentity,
        method: Method,
        path: &str,
        form: Form,
    ) -> Result<Self, StashError> {
        Ok(Self {
            method,
            url: identity.resolve(path)?,
            headers: base_headers(identity)?,
            body: Some(WireBody::Multipart(form)),
        })
    }

    /// Replaces the `Content-Type` header (vendor media types).
    pub fn with_content_type(mut self, content_type: &'static str) -> Self {
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        self
    }

    /// Drops the `Accept` header.
    pub fn without_accept(mut self) -> Self {
        self.headers.remove(ACCEPT);
        self
    }

    /// JSON body bytes, if this request carries a JSON body.
    pub fn json_body(&self) -> Option<&[u8]> {
        match &self.body {
            Some(WireBody::Json(bytes)) => Some(bytes),
            _ => None,
        }
    }

    pub(crate) fn into_builder(self, http: &Client) -> RequestBuilder {
        let builder = http.request(self.method, &self.url).headers(self.headers);
        match self.body {
            Some(WireBody::Json(bytes)) => builder.body(bytes),
            Some(WireBody::Multipart(form)) => builder.multipart(form),
            None => builder,
        }
    }
}

fn base_headers(identity: &ClientIdentity) -> Result<HeaderMap, StashError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        HeaderName::from_static(ATLASSIAN_TOKEN_HEADER),
        HeaderValue::from_static("no-check"),
    );

    if let Some(credentials) = identity.authorization() {
        let mut value = HeaderValue::from_str(&credentials)?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }

    Ok(headers)
}
