//
//  stash-client
//  config/hosts.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Host naming helpers.
//!
//! ```rust
//! use stash_client::config::{host_name, normalize_base_url};
//!
//! assert_eq!(host_name("https://Stash.Example.com:7990/").unwrap(), "stash.example.com:7990");
//! assert_eq!(normalize_base_url(" https://stash.example.com// ").unwrap(), "https://stash.example.com/");
//! ```

use anyhow::{Context, Result};
use url::Url;

fn parse(base_url: &str) -> Result<Url> {
    let url = Url::parse(base_url.trim())
        .with_context(|| format!("Invalid server URL '{}'", base_url.trim()))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        anyhow::bail!("Server URL must be an http(s) URL: {}", url);
    }
    Ok(url)
}

/// Config key for a server: lower-cased host, plus the port when not default.
pub fn host_name(base_url: &str) -> Result<String> {
    let url = parse(base_url)?;
    let host = url.host_str().unwrap_or_default().to_lowercase();
    Ok(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host,
    })
}

/// Validates a server URL and trims it to a single trailing slash.
pub fn normalize_base_url(base_url: &str) -> Result<String> {
    let url = parse(base_url)?;
    Ok(format!("{}/", url.as_str().trim_end_matches('/')))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_name() {
        assert_eq!(host_name("https://stash.example.com").unwrap(), "stash.example.com");
        assert_eq!(host_name("http://localhost:7990/stash").unwrap(), "localhost:7990");
        assert_eq!(host_name("https://stash.example.com:443/").unwrap(), "stash.example.com");
    }

    #[test]
    fn test_rejects_non_http_urls() {
        assert!(host_name("stash.example.com").is_err());
        assert!(host_name("ssh://git@stash.example.com:7999").is_err());
        assert!(normalize_base_url("").is_err());
    }

    #[test]
    fn test_normalize_keeps_context_path() {
        assert_eq!(
            normalize_base_url("https://example.com/stash").unwrap(),
            "https://example.com/stash/"
        );
    }
}
