//
//  stash-client
//  api/response.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Response Consumer
//!
//! [`consume`] executes a [`WireRequest`], reads the whole body and classifies
//! the outcome by status code:
//!
//! - `< 400` is a success, whatever the body looks like. The body is never
//!   inspected here, so a `200` with a non-JSON body is still `Ok`.
//! - `>= 400` is decoded as an error envelope:
//!   ```json
//!   {"errors": [{"context": "name", "message": "...", "exceptionName": "..."}]}
//!   ```
//!   A parseable envelope becomes [`StashError::Api`] carrying the joined
//!   messages and the raw body; anything else becomes
//!   [`StashError::UnparseableErrorBody`] without a body.

use reqwest::header::HeaderMap;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::request::WireRequest;
use super::StashError;

/// One entry of the server's error envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorEntry {
    /// The field or parameter the error refers to, if any.
    #[serde(default)]
    pub context: Option<String>,

    /// Human-readable message.
    #[serde(default)]
    pub message: Option<String>,

    /// Fully qualified server-side exception class.
    #[serde(default, rename = "exceptionName")]
    pub exception_name: Option<String>,
}

/// The JSON body returned with error statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorEnvelope {
    pub errors: Vec<ApiErrorEntry>,
}

impl ApiErrorEnvelope {
    /// All messages joined by a single space, in server order.
    pub fn joined_message(&self) -> String {
        self.errors
            .iter()
            .map(|entry| entry.message.as_deref().unwrap_or_default())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A fully read response with a success (< 400) status.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Returns the named header as a string, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}

/// Executes a request and classifies the response.
///
/// # Errors
///
/// - [`StashError::Transport`] if no response arrived.
/// - [`StashError::BodyRead`] if the body could not be read.
/// - [`StashError::Api`] / [`StashError::UnparseableErrorBody`] for statuses >= 400.
pub async fn consume(http: &Client, request: WireRequest) -> Result<RawResponse, StashError> {
    debug!(method = %request.method, url = %request.url, "sending request");

    let response = request
        .into_builder(http)
        .send()
        .await
        .map_err(StashError::Transport)?;

    let status = response.status().as_u16();
    let headers = response.headers().clone();

    // `bytes()` takes the response by value; the connection goes back to the
    // pool on both the success and the error path.
    let body = response
        .bytes()
        .await
        .map_err(|source| StashError::BodyRead { status, source })?
        .to_vec();

    debug!(status, bytes = body.len(), "received response");
    classify(status, headers, body)
}

/// Classifies an already-read response by status code.
pub fn classify(status: u16, headers: HeaderMap, body: Vec<u8>) -> Result<RawResponse, StashError> {
    if status < 400 {
        return Ok(RawResponse {
            status,
            headers,
            body,
        });
    }

    match serde_json::from_slice::<ApiErrorEnvelope>(&body) {
        Ok(envelope) => Err(StashError::Api {
            status,
            message: envelope.joined_message(),
            errors: envelope.errors,
            body,
        }),
        Err(source) => Err(StashError::UnparseableErrorBody { status, source }),
    }
}

#[cfg(test)]
mod tests {
    use reqwest::Method;

    use super::*;
    use crate::api::request::ClientIdentity;

    const TWO_ERRORS: &str = r#"{
        "errors": [
            {
                "context": "name",
                "message": "The name should be between 1 and 255 characters.",
                "exceptionName": null
            },
            {
                "context": "email",
                "message": "The email should be a valid email address.",
                "exceptionName": null
            }
        ]
    }"#;

    const INVALID_JSON: &str = "{invalid: json}";

    fn get(base: &str, path: &str) -> WireRequest {
        let identity = ClientIdentity::new("", "", base).unwrap();
        WireRequest::build(&identity, Method::GET, path, None::<&()>).unwrap()
    }

    #[tokio::test]
    async fn test_error_status_with_two_errors_joins_messages() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/rest/x")
            .with_status(400)
            .with_body(TWO_ERRORS)
            .create_async()
            .await;

        let err = consume(&Client::new(), get(&server.url(), "/rest/x"))
            .await
            .unwrap_err();

        mock.assert_async().await;
        assert_eq!(
            err.to_string(),
            "The name should be between 1 and 255 characters. \
             The email should be a valid email address."
        );
        assert_eq!(err.status_code(), Some(400));
        assert_eq!(err.raw_body(), Some(TWO_ERRORS.as_bytes()));
        match err {
            StashError::Api { errors, .. } => {
                assert_eq!(errors.len(), 2);
                assert_eq!(errors[1].context.as_deref(), Some("email"));
                assert_eq!(errors[0].exception_name, None);
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_truncated_body_keeps_status() {
        use std::io::{Read, Write};
        use std::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let server = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut chunk = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut chunk).unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&chunk[..n]);
            }
            stream
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\nhello")
                .unwrap();
        });

        let err = consume(&Client::new(), get(&format!("http://{addr}"), "/rest/x"))
            .await
            .unwrap_err();
        server.join().unwrap();

        assert!(matches!(err, StashError::BodyRead { status: 200, .. }));
        assert_eq!(err.status_code(), Some(200));
    }

    #[tokio::test]
    async fn test_success_status_with_invalid_json_is_not_an_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/rest/x")
            .with_status(200)
            .with_body(INVALID_JSON)
            .create_async()
            .await;

        let raw = consume(&Client::new(), get(&server.url(), "/rest/x"))
            .await
            .unwrap();

        assert_eq!(raw.status, 200);
        assert_eq!(raw.body, INVALID_JSON.as_bytes());
    }

    #[tokio::test]
    async fn test_error_status_with_invalid_json_is_unparseable() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/rest/x")
            .with_status(500)
            .with_body(INVALID_JSON)
            .create_async()
            .await;

        let err = consume(&Client::new(), get(&server.url(), "/rest/x"))
            .await
            .unwrap_err();

        assert!(matches!(err, StashError::UnparseableErrorBody { status: 500, .. }));
        assert!(err.to_string().starts_with("status 500; unable to parse error body:"));
        assert_eq!(err.raw_body(), None);
    }

    #[tokio::test]
    async fn test_error_status_with_wrong_shape_is_unparseable() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/rest/x")
            .with_status(404)
            .with_body(r#"{"message": "not the envelope"}"#)
            .create_async()
            .await;

        let err = consume(&Client::new(), get(&server.url(), "/rest/x"))
            .await
            .unwrap_err();

        assert!(matches!(err, StashError::UnparseableErrorBody { status: 404, .. }));
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_redirect_class_status_is_success() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/rest/x")
            .with_status(304)
            .create_async()
            .await;

        let raw = consume(&Client::new(), get(&server.url(), "/rest/x"))
            .await
            .unwrap();
        assert_eq!(raw.status, 304);
        assert!(raw.body.is_empty());
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = consume(&Client::new(), get(&format!("http://{addr}"), "/rest/x"))
            .await
            .unwrap_err();

        assert!(matches!(err, StashError::Transport(_)));
        assert_eq!(err.status_code(), None);
    }

    #[test]
    fn test_joined_message_preserves_order_and_tolerates_missing_messages() {
        let envelope: ApiErrorEnvelope = serde_json::from_str(
            r#"{"errors":[{"message":"A"},{"context":"x"},{"message":"B"}]}"#,
        )
        .unwrap();
        assert_eq!(envelope.joined_message(), "A  B");

        let err = classify(
            400,
            HeaderMap::new(),
            br#"{"errors":[{"message":"A"},{"message":"B"}]}"#.to_vec(),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "A B");
    }

    #[test]
    fn test_response_header_lookup() {
        let mut headers = HeaderMap::new();
        headers.insert("upm-token", "abc".parse().unwrap());
        let raw = classify(200, headers, Vec::new()).unwrap();
        assert_eq!(raw.header("upm-token"), Some("abc"));
        assert_eq!(raw.header("missing"), None);
    }
}
