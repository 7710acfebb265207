use std::fmt;
use std::time::Duration;

use axum::body::Bytes;
use reqwest::{Client, StatusCode, header::CONTENT_TYPE};
use serde_json::Value;
use thiserror::Error;

/// Which external service a call targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Vote,
    Results,
}

impl Service {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vote => "vote",
            Self::Results => "results",
        }
    }

    /// Capitalized name used in client-facing messages.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Vote => "Vote",
            Self::Results => "Results",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The service answered with a non-2xx status.
    #[error("upstream responded with {status}")]
    Status { status: StatusCode, body: String },

    /// The request could not be completed.
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// A 2xx response whose body could not be read as JSON.
    #[error("invalid response body: {0}")]
    Decode(#[source] reqwest::Error),
}

/// HTTP client for the vote and results services.
///
/// One attempt per call, no retries. Cloning shares the connection pool.
#[derive(Clone, Debug)]
pub struct UpstreamClient {
    http: Client,
}

impl UpstreamClient {
    pub fn new(timeout: Option<Duration>) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
        })
    }

    /// `POST {base}/vote` with `body` as-is. The response body is discarded on success.
    pub async fn post_vote(&self, base: &str, body: Bytes) -> Result<(), UpstreamError> {
        let res = self
            .http
            .post(format!("{base}/vote"))
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(UpstreamError::Transport)?;

        ensure_success(res).await?;
        Ok(())
    }

    /// `GET {base}/results?pollId=<poll_id>`, returning the JSON body untouched.
    pub async fn fetch_results(&self, base: &str, poll_id: &str) -> Result<Value, UpstreamError> {
        let res = self
            .http
            .get(format!("{base}/results?pollId={}", encode_uri_component(poll_id)))
            .send()
            .await
            .map_err(UpstreamError::Transport)?;

        ensure_success(res)
            .await?
            .json::<Value>()
            .await
            .map_err(UpstreamError::Decode)
    }
}

/// Percent-encode everything outside the URI-component unreserved set.
/// A space becomes `%20`, never `+`.
fn encode_uri_component(value: &str) -> String {
    value
        .bytes()
        .map(|b| match b {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => String::from(b as char),
            _ => format!("%{b:02X}"),
        })
        .collect()
}

async fn ensure_success(res: reqwest::Response) -> Result<reqwest::Response, UpstreamError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let body = res.text().await.unwrap_or_default();
    Err(UpstreamError::Status { status, body })
}
