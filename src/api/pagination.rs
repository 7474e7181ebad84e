//
//  stash-client
//  api/pagination.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Offset Pagination
//!
//! Stash list endpoints are offset-paged: the client asks for `start` and
//! `limit`, and each page answers with `isLastPage` and `nextPageStart`.
//!
//! [`collect_pages`] walks the pages starting at offset 0, always continuing from
//! the server-supplied `nextPageStart` (never a locally computed offset), and
//! stops when a page reports `isLastPage`. How the values of each page are merged
//! is up to the caller: [`collect_keyed`] for ID- or name-keyed collections,
//! [`collect_list`] for plain append order.
//!
//! There is no upper bound on the number of pages fetched.
//!
//! # Example
//!
//! ```rust
//! use stash_client::api::Page;
//!
//! let json = r#"{
//!     "values": [{"key": "PROJ"}],
//!     "size": 1,
//!     "limit": 25,
//!     "isLastPage": false,
//!     "nextPageStart": 25,
//!     "start": 0
//! }"#;
//!
//! let page: Page<serde_json::Value> = serde_json::from_str(json).unwrap();
//! assert!(page.has_next());
//! assert_eq!(page.next_start(), Some(25));
//! ```

use std::collections::BTreeMap;
use std::future::Future;

use serde::{Deserialize, Serialize};

use super::StashError;

/// Page size requested by every paged call site.
pub const PAGE_LIMIT: u32 = 25;

/// One page of results from a paged endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Page<T> {
    /// Items in this page.
    #[serde(default)]
    pub values: Vec<T>,

    /// Number of items in this page.
    #[serde(default)]
    pub size: u32,

    /// Page size that was requested.
    #[serde(default)]
    pub limit: u32,

    /// Whether this is the final page.
    #[serde(default, rename = "isLastPage")]
    pub is_last_page: bool,

    /// Offset to request next. Absent on the last page.
    #[serde(default, rename = "nextPageStart")]
    pub next_page_start: Option<u32>,

    /// Offset of the first item in this page.
    #[serde(default)]
    pub start: u32,
}

/// Cursor state extracted from a page, without its values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    pub start: u32,
    pub limit: u32,
    pub is_last_page: bool,
    pub next_page_start: Option<u32>,
}

impl<T> Page<T> {
    /// `true` unless the server marked this page as the last one.
    pub fn has_next(&self) -> bool {
        !self.is_last_page
    }

    /// The offset for the following request.
    pub fn next_start(&self) -> Option<u32> {
        self.next_page_start
    }

    pub fn cursor(&self) -> PageCursor {
        PageCursor {
            start: self.start,
            limit: self.limit,
            is_last_page: self.is_last_page,
            next_page_start: self.next_page_start,
        }
    }
}

/// Appends the paging query parameters to a path that may already have a query.
pub fn paged_path(path: &str, start: u32) -> String {
    let separator = if path.contains('?') { '&' } else { '?' };
    format!("{}{}start={}&limit={}", path, separator, start, PAGE_LIMIT)
}

/// Fetches every page and hands each value to `merge`, in order.
///
/// # Errors
///
/// Propagates the first fetch error. Returns [`StashError::Pagination`] if a
/// non-final page has no `nextPageStart`.
pub async fn collect_pages<T, F, Fut, M>(mut fetch: F, mut merge: M) -> Result<(), StashError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Page<T>, StashError>>,
    M: FnMut(T),
{
    let mut start = 0;
    loop {
        let page = fetch(start).await?;
        let cursor = page.cursor();
        page.values.into_iter().for_each(&mut merge);

        if cursor.is_last_page {
            return Ok(());
        }

        start = cursor
            .next_page_start
            .ok_or(StashError::Pagination { start })?;
    }
}

/// Collects every page into a map keyed by `key`. Later pages win on duplicates.
pub async fn collect_keyed<K, T, F, Fut>(
    fetch: F,
    key: impl Fn(&T) -> K,
) -> Result<BTreeMap<K, T>, StashError>
where
    K: Ord,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Page<T>, StashError>>,
{
    let mut collected = BTreeMap::new();
    collect_pages(fetch, |item| {
        collected.insert(key(&item), item);
    })
    .await?;
    Ok(collected)
}

/// Collects every page into a list in server order.
pub async fn collect_list<T, F, Fut>(fetch: F) -> Result<Vec<T>, StashError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Page<T>, StashError>>,
{
    let mut collected = Vec::new();
    collect_pages(fetch, |item| collected.push(item)).await?;
    Ok(collected)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    fn page(values: Vec<u32>, start: u32, next: Option<u32>) -> Page<u32> {
        Page {
            size: values.len() as u32,
            values,
            limit: PAGE_LIMIT,
            is_last_page: next.is_none(),
            next_page_start: next,
            start,
        }
    }

    #[tokio::test]
    async fn test_follows_server_cursor_not_local_offsets() {
        let requested = RefCell::new(Vec::new());
        let items = collect_list(|start| {
            requested.borrow_mut().push(start);
            let result = match start {
                0 => Ok(page(vec![1, 2], 0, Some(7))),
                7 => Ok(page(vec![3], 7, Some(40))),
                40 => Ok(page(vec![4, 5], 40, None)),
                other => panic!("unexpected start {other}"),
            };
            async move { result }
        })
        .await
        .unwrap();

        assert_eq!(items, vec![1, 2, 3, 4, 5]);
        assert_eq!(*requested.borrow(), vec![0, 7, 40]);
    }

    #[tokio::test]
    async fn test_total_equals_sum_of_page_sizes() {
        let pages = [vec![1, 2, 3], vec![], vec![4], vec![5, 6]];
        let items = collect_list(|start| {
            let index = start as usize;
            let next = (index + 1 < pages.len()).then_some(start + 1);
            let result = Ok(page(pages[index].clone(), start, next));
            async move { result }
        })
        .await
        .unwrap();

        let expected: usize = pages.iter().map(Vec::len).sum();
        assert_eq!(items.len(), expected);
    }

    #[tokio::test]
    async fn test_keyed_collection_deduplicates() {
        let map = collect_keyed(
            |start| {
                let result = match start {
                    0 => Ok(page(vec![10, 20], 0, Some(2))),
                    _ => Ok(page(vec![20, 30], 2, None)),
                };
                async move { result }
            },
            |value| *value,
        )
        .await
        .unwrap();

        assert_eq!(map.keys().copied().collect::<Vec<_>>(), vec![10, 20, 30]);
    }

    #[tokio::test]
    async fn test_missing_cursor_on_non_final_page_is_an_error() {
        let err = collect_list(|start| {
            let mut result = page(vec![1], start, None);
            result.is_last_page = false;
            async move { Ok(result) }
        })
        .await
        .unwrap_err();

        assert!(matches!(err, StashError::Pagination { start: 0 }));
    }

    #[tokio::test]
    async fn test_fetch_error_stops_pagination() {
        let calls = RefCell::new(0);
        let err = collect_list(|start| {
            *calls.borrow_mut() += 1;
            let result = match start {
                0 => Ok(page(vec![1], 0, Some(1))),
                _ => Err(StashError::unexpected_status(500)),
            };
            async move { result }
        })
        .await
        .unwrap_err();

        assert_eq!(err.status_code(), Some(500));
        assert_eq!(*calls.borrow(), 2);
    }

    #[test]
    fn test_paged_path() {
        assert_eq!(paged_path("/rest/api/1.0/repos", 0), "/rest/api/1.0/repos?start=0&limit=25");
        assert_eq!(
            paged_path("/rest/x/pull-requests?state=OPEN", 25),
            "/rest/x/pull-requests?state=OPEN&start=25&limit=25"
        );
    }

    #[test]
    fn test_page_defaults() {
        let page: Page<u32> = serde_json::from_str(r#"{"values":[1],"isLastPage":true}"#).unwrap();
        assert!(!page.has_next());
        assert_eq!(page.next_start(), None);
        assert_eq!(page.start, 0);
    }
}
