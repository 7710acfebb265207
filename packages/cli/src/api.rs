use async_trait::async_trait;
use common::{ResultsResponse, VoteSubmission};
use reqwest::{Client, StatusCode, Url};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid server URL '{0}'")]
    InvalidServer(String),

    #[error("server responded with {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// The two proxy routes the client talks to.
#[async_trait]
pub trait PollApi: Send + Sync {
    async fn submit_vote(&self, vote: &VoteSubmission) -> Result<(), ApiError>;

    async fn fetch_results(&self, poll_id: &str) -> Result<ResultsResponse, ApiError>;
}

/// [`PollApi`] over HTTP against a running proxy server.
pub struct HttpPollApi {
    http: Client,
    base: Url,
}

impl HttpPollApi {
    pub fn new(server: &str) -> Result<Self, ApiError> {
        let base =
            Url::parse(server).map_err(|_| ApiError::InvalidServer(server.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::InvalidServer(server.to_string()));
        }
        Ok(Self {
            http: Client::new(),
            base,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidServer(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

async fn ensure_success(res: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let body = res.text().await.unwrap_or_default();
    Err(ApiError::Status { status, body })
}

#[async_trait]
impl PollApi for HttpPollApi {
    async fn submit_vote(&self, vote: &VoteSubmission) -> Result<(), ApiError> {
        let url = self.endpoint(&["api", "vote"])?;
        let res = self.http.post(url).json(vote).send().await?;
        ensure_success(res).await?;
        Ok(())
    }

    async fn fetch_results(&self, poll_id: &str) -> Result<ResultsResponse, ApiError> {
        let url = self.endpoint(&["api", "results", poll_id])?;
        let res = self.http.get(url).send().await?;
        Ok(ensure_success(res).await?.json().await?)
    }
}
