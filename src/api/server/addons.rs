//
//  stash-client
//  api/server/addons.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Add-on Management
//!
//! Add-ons are managed through the Universal Plugin Manager (UPM) REST API.
//!
//! ## API Endpoints
//!
//! ```text
//! GET          /rest/plugins/1.0/?os_authType=basic     upm-token header
//! POST         /rest/plugins/1.0/?token={token}         multipart upload
//! GET/PUT/DEL  /rest/plugins/1.0/{key}-key
//! GET/PUT      /rest/plugins/1.0/{key}-key/license
//! ```
//!
//! ## Installation
//!
//! An upload answers with a task link. The task is polled every
//! [`INSTALL_POLL_INTERVAL`] until the server reports it done, then the task's
//! result link yields the installed add-on key.
//!
//! ## Notes
//!
//! UPM uses vendor media types for writes. Enabling or disabling sends the whole
//! add-on document back, so [`Addon`] keeps every field it does not model in
//! [`Addon::extra`].

use std::path::Path;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::api::client::decode;
use crate::api::{StashClient, StashError, WireRequest, NO_BODY};

/// Delay between installation task polls.
pub const INSTALL_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Media type for add-on document updates.
pub const PLUGIN_MEDIA_TYPE: &str = "application/vnd.atl.plugins.plugin+json";

/// Media type for license updates.
pub const LICENSE_MEDIA_TYPE: &str = "application/vnd.atl.plugins+json";

const UPM_TOKEN_HEADER: &str = "upm-token";

/// An installed add-on.
///
/// # Example
///
/// ```rust
/// use stash_client::api::server::Addon;
///
/// let addon: Addon = serde_json::from_str(r#"{
///     "key": "com.example.hooks",
///     "enabled": true,
///     "version": "1.2.0",
///     "vendor": {"name": "Example"}
/// }"#).unwrap();
///
/// assert!(addon.enabled);
/// assert!(addon.extra.contains_key("vendor"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Addon {
    pub key: String,

    #[serde(default)]
    pub enabled: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, rename = "userInstalled")]
    pub user_installed: bool,

    /// Fields not modelled above, sent back unchanged on update.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Deserialize)]
struct InstallResponse {
    links: InstallLinks,
}

#[derive(Deserialize)]
struct InstallLinks {
    alternate: String,
}

#[derive(Deserialize)]
struct TaskStatus {
    #[serde(default)]
    done: bool,
}

#[derive(Deserialize)]
struct CompletedTask {
    links: CompletedLinks,
}

#[derive(Deserialize)]
struct CompletedLinks {
    result: String,
}

#[derive(Deserialize)]
struct InstalledAddon {
    key: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct License {
    #[serde(default, rename = "rawLicense")]
    raw_license: Option<String>,
}

fn addon_path(key: &str) -> String {
    format!("/rest/plugins/1.0/{}-key", key)
}

impl StashClient {
    /// Fetches the UPM token required for uploads.
    ///
    /// Returns an empty string if the server sends no token header.
    pub async fn get_upm_token(&self) -> Result<String, StashError> {
        let request =
            self.build_request(Method::GET, "/rest/plugins/1.0/?os_authType=basic", NO_BODY)?;
        let raw = self.expect(request, &[200]).await?;
        Ok(raw.header(UPM_TOKEN_HEADER).unwrap_or_default().to_string())
    }

    pub async fn get_addon(&self, key: &str) -> Result<Addon, StashError> {
        self.request_json(Method::GET, &addon_path(key), NO_BODY, &[200])
            .await
    }

    /// Uploads an add-on jar and waits for the installation to finish.
    ///
    /// Returns the installed add-on key.
    pub async fn install_addon(&self, token: &str, file: &Path) -> Result<String, StashError> {
        let bytes = tokio::fs::read(file).await?;
        let file_name = file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "plugin.jar".to_string());

        let form = Form::new()
            .text("url", "")
            .part("plugin", Part::bytes(bytes).file_name(file_name));
        let request = WireRequest::multipart(
            self.identity(),
            Method::POST,
            &format!("/rest/plugins/1.0/?token={}", token),
            form,
        )?;

        let raw = self.expect(request, &[200, 202]).await?;
        let response: InstallResponse = decode(raw.body)?;
        self.wait_addon_installation(&response.links.alternate).await
    }

    /// Polls an installation task until done and returns the add-on key.
    pub async fn wait_addon_installation(&self, task: &str) -> Result<String, StashError> {
        loop {
            let raw = self
                .consume(self.build_request(Method::GET, task, NO_BODY)?)
                .await?;

            let status: TaskStatus = decode(raw.body.clone())?;
            if !status.done {
                debug!(task, "add-on installation pending");
                tokio::time::sleep(INSTALL_POLL_INTERVAL).await;
                continue;
            }

            let completed: CompletedTask = decode(raw.body)?;
            let raw = self
                .consume(self.build_request(Method::GET, &completed.links.result, NO_BODY)?)
                .await?;
            let installed: InstalledAddon = decode(raw.body)?;
            return Ok(installed.key);
        }
    }

    /// Uninstalls an add-on. An add-on that is already gone counts as success.
    pub async fn uninstall_addon(&self, key: &str) -> Result<(), StashError> {
        match self
            .request(Method::DELETE, &addon_path(key), NO_BODY, &[204])
            .await
        {
            Ok(_) => Ok(()),
            Err(err) if err.is_not_found() => Ok(()),
            Err(err) => Err(err),
        }
    }

    pub async fn enable_addon(&self, addon: &Addon) -> Result<(), StashError> {
        self.put_addon(Addon {
            enabled: true,
            ..addon.clone()
        })
        .await
    }

    pub async fn disable_addon(&self, addon: &Addon) -> Result<(), StashError> {
        self.put_addon(Addon {
            enabled: false,
            ..addon.clone()
        })
        .await
    }

    async fn put_addon(&self, addon: Addon) -> Result<(), StashError> {
        let request = self
            .build_request(Method::PUT, &addon_path(&addon.key), Some(&addon))?
            .with_content_type(PLUGIN_MEDIA_TYPE);
        self.expect(request, &[200]).await?;
        Ok(())
    }

    /// Installs `license` for an add-on unless it is already the current one.
    pub async fn set_addon_license(&self, key: &str, license: &str) -> Result<(), StashError> {
        let path = format!("{}/license", addon_path(key));
        let current: License = self
            .request_json(Method::GET, &path, NO_BODY, &[200])
            .await?;

        if current.raw_license.as_deref() == Some(license) {
            debug!(key, "add-on license unchanged");
            return Ok(());
        }

        let payload = License {
            raw_license: Some(license.to_string()),
        };
        let request = self
            .build_request(Method::PUT, &path, Some(&payload))?
            .with_content_type(LICENSE_MEDIA_TYPE)
            .without_accept();
        self.expect(request, &[200]).await?;
        Ok(())
    }
}
