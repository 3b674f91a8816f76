//! Naver DataLab search trend client
//!
//! Posts keyword groups to the DataLab search API with:
//! - Rate limiting with governor
//! - Retry with exponential backoff on 429/5xx/timeouts
//! - Client credential headers

use super::error::{SourceError, SourceResult};
use super::{DateRange, TrendSource};
use crate::config::{Config, PROVIDER_MAX_GROUP_SIZE};
use crate::models::{KeywordGroup, RawObservation};
use crate::utils::retry::{with_retry_if, RetryConfig, RetryError};
use async_trait::async_trait;
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use reqwest::{header::CONTENT_TYPE, Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::time::Duration;
use tracing::debug;

const CLIENT_ID_HEADER: &str = "X-Naver-Client-Id";
const CLIENT_SECRET_HEADER: &str = "X-Naver-Client-Secret";
const API_DATE_FORMAT: &str = "%Y-%m-%d";

/// Request body of the search trend API
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchTrendRequest<'a> {
    start_date: String,
    end_date: String,
    time_unit: &'static str,
    keyword_groups: &'a [KeywordGroup],
}

/// Response body of the search trend API
#[derive(Debug, Deserialize)]
struct SearchTrendResponse {
    results: Vec<SearchTrendResult>,
}

#[derive(Debug, Deserialize)]
struct SearchTrendResult {
    title: String,
    #[serde(default)]
    data: Vec<SearchTrendPoint>,
}

#[derive(Debug, Deserialize)]
struct SearchTrendPoint {
    period: String,
    ratio: f64,
}

/// DataLab search trend client
pub struct NaverDataLabClient {
    /// HTTP client with configured timeout and compression
    client: Client,

    /// Rate limiter to control request frequency
    rate_limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,

    endpoint: String,
    client_id: String,
    client_secret: String,
    retry: RetryConfig,
}

impl NaverDataLabClient {
    /// Create a client with default rate limit, retries and timeout
    ///
    /// # Errors
    ///
    /// Returns `SourceError::Http` if the HTTP client cannot be created
    pub fn new(
        endpoint: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> SourceResult<Self> {
        Self::with_options(
            endpoint,
            client_id,
            client_secret,
            2,
            RetryConfig::default(),
            Duration::from_secs(30),
        )
    }

    /// Create a client with custom configuration
    ///
    /// # Errors
    ///
    /// Returns `SourceError::Http` if the HTTP client cannot be created
    pub fn with_options(
        endpoint: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        requests_per_second: u32,
        retry: RetryConfig,
        timeout: Duration,
    ) -> SourceResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .gzip(true)
            .user_agent(format!("gemtrend/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        let rate = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN);
        let rate_limiter = RateLimiter::direct(Quota::per_second(rate));

        Ok(Self {
            client,
            rate_limiter,
            endpoint: endpoint.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            retry,
        })
    }

    /// Build a client from application configuration
    ///
    /// # Errors
    ///
    /// Fails if credentials are missing or the HTTP client cannot be built
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let (id, secret) = config.credentials()?;
        let retry = RetryConfig::new(config.source.max_retries);
        Ok(Self::with_options(
            &config.source.endpoint,
            id,
            secret,
            config.source.rate_limit,
            retry,
            config.request_timeout(),
        )?)
    }

    /// Single POST without retry
    async fn post_once(&self, body: &SearchTrendRequest<'_>) -> SourceResult<SearchTrendResponse> {
        self.rate_limiter.until_ready().await;

        let response = self
            .client
            .post(&self.endpoint)
            .header(CLIENT_ID_HEADER, &self.client_id)
            .header(CLIENT_SECRET_HEADER, &self.client_secret)
            .header(CONTENT_TYPE, "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SourceError::Timeout
                } else {
                    SourceError::Http(e)
                }
            })?;

        let status = response.status();
        if status.is_success() {
            let text = response.text().await?;
            return serde_json::from_str(&text).map_err(|e| SourceError::Decode(e.to_string()));
        }

        Err(match status {
            StatusCode::TOO_MANY_REQUESTS => SourceError::RateLimit,
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                SourceError::Unauthorized(status.as_u16())
            }
            s if s.is_server_error() => SourceError::ServerError(s.as_u16()),
            s => SourceError::Rejected {
                status: s.as_u16(),
                body: response.text().await.unwrap_or_default(),
            },
        })
    }
}

#[async_trait]
impl TrendSource for NaverDataLabClient {
    async fn fetch_batch(
        &self,
        groups: &[KeywordGroup],
        range: DateRange,
    ) -> SourceResult<Vec<RawObservation>> {
        if groups.len() > PROVIDER_MAX_GROUP_SIZE {
            return Err(SourceError::BatchTooLarge {
                size: groups.len(),
                max: PROVIDER_MAX_GROUP_SIZE,
            });
        }
        if groups.is_empty() {
            return Ok(Vec::new());
        }

        let body = SearchTrendRequest {
            start_date: range.start.format(API_DATE_FORMAT).to_string(),
            end_date: range.end.format(API_DATE_FORMAT).to_string(),
            time_unit: "date",
            keyword_groups: groups,
        };

        let response = with_retry_if(
            &self.retry,
            || self.post_once(&body),
            SourceError::is_recoverable,
        )
        .await
        .map_err(|e| match e {
            RetryError::Aborted(e) => e,
            RetryError::Exhausted { last, .. } => SourceError::MaxRetriesExceeded(Box::new(last)),
        })?;

        let observations: Vec<RawObservation> = response
            .results
            .into_iter()
            .flat_map(|result| {
                let title = result.title;
                result
                    .data
                    .into_iter()
                    .map(move |point| RawObservation::new(title.clone(), point.period, point.ratio))
            })
            .collect();

        debug!(
            groups = groups.len(),
            observations = observations.len(),
            "DataLab batch decoded"
        );

        Ok(observations)
    }
}
