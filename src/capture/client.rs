use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::config::ApiConfig;
use crate::models::LogEntry;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// How a single delivery attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Accepted,
    /// The service answered with something other than 200.
    Rejected { status: u16, body: String },
    /// No answer at all: refused, timed out, DNS failure.
    Unreachable(String),
}

#[async_trait]
pub trait LogSink: Send + Sync {
    async fn send(&self, entry: &LogEntry) -> SubmitOutcome;
}

pub struct LogClient {
    client: reqwest::Client,
    url: String,
}

impl LogClient {
    pub fn new(config: &ApiConfig) -> Result<Self, reqwest::Error> {
        Self::with_url(config.log_url())
    }

    pub fn with_url(url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl LogSink for LogClient {
    async fn send(&self, entry: &LogEntry) -> SubmitOutcome {
        let response = match self.client.post(&self.url).json(entry).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(url = %self.url, "Log submission failed: {e}");
                return SubmitOutcome::Unreachable(e.to_string());
            }
        };

        let status = response.status();
        if status == StatusCode::OK {
            return SubmitOutcome::Accepted;
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => format!("(unreadable response body: {e})"),
        };
        tracing::warn!(status = status.as_u16(), "Log service rejected entry");
        SubmitOutcome::Rejected {
            status: status.as_u16(),
            body,
        }
    }
}
