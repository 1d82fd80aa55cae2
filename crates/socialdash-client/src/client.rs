//! HTTP client for the LinkedIn analytics API.
//!
//! GET endpoints take the filters as query parameters; the post table and
//! search endpoints take a JSON body. There is no retry layer: a failed call
//! is reported once and the caller decides whether to ask again.

use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use socialdash_core::{AppConfig, FilterParameters, PageRequest, SearchScope, TimeSeriesMetric};

use crate::endpoints;
use crate::error::ClientError;
use crate::types::{
    AiAnalysis, ClicksEnvelope, ClicksPerPostType, Insights, MetricSnapshot, PostPage,
    PostTableRequest, PostTypeEngagement, PostTypeEngagementEnvelope, SearchRequest,
    SearchResult, TimeSeries, UploadAck,
};
use crate::upload::UploadFile;

/// Client for the analytics API.
///
/// Use [`AnalyticsClient::new`] with the application config, or
/// [`AnalyticsClient::with_base_url`] to point at a mock server in tests.
#[derive(Debug, Clone)]
pub struct AnalyticsClient {
    client: Client,
    base_url: Url,
    api_token: Option<String>,
}

impl AnalyticsClient {
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the `reqwest::Client` cannot be built
    /// or [`ClientError::InvalidBaseUrl`] if the configured URL is invalid.
    pub fn new(config: &AppConfig) -> Result<Self, ClientError> {
        Self::with_base_url(
            &config.api_base_url,
            config.request_timeout_secs,
            &config.user_agent,
            config.api_token.as_deref(),
        )
    }

    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the `reqwest::Client` cannot be built
    /// or [`ClientError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
        api_token: Option<&str>,
    ) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Exactly one trailing slash, so joining `linkedin/...` appends to the
        // base path instead of replacing its last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let parsed = Url::parse(&normalised).map_err(|e| ClientError::InvalidBaseUrl {
            base_url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url: parsed,
            api_token: api_token.map(str::to_owned),
        })
    }

    /// Summary tiles from `/linkedin/dashboard`.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Api`] on a non-2xx status.
    /// - [`ClientError::Http`] on network failure.
    /// - [`ClientError::Deserialize`] if the body does not match.
    pub async fn tiles(&self, filters: &FilterParameters) -> Result<MetricSnapshot, ClientError> {
        let body = self.get_json(endpoints::TILES, &filters.query_pairs()).await?;
        decode_or_default(body, endpoints::TILES)
    }

    /// Aggregate metrics from `/linkedin/metrics`.
    ///
    /// # Errors
    ///
    /// Same as [`AnalyticsClient::tiles`].
    pub async fn metrics(
        &self,
        filters: &FilterParameters,
    ) -> Result<MetricSnapshot, ClientError> {
        let body = self.get_json(endpoints::METRICS, &filters.query_pairs()).await?;
        decode_or_default(body, endpoints::METRICS)
    }

    /// Word cloud, hashtag performance, and sentiment over time.
    ///
    /// # Errors
    ///
    /// Same as [`AnalyticsClient::tiles`].
    pub async fn ai_analysis(&self, filters: &FilterParameters) -> Result<AiAnalysis, ClientError> {
        let body = self
            .get_json(endpoints::AI_ANALYSIS, &filters.query_pairs())
            .await?;
        decode_or_default(body, endpoints::AI_ANALYSIS)
    }

    /// Time series for `metric`.
    ///
    /// # Errors
    ///
    /// Same as [`AnalyticsClient::tiles`].
    pub async fn engagement_over_time(
        &self,
        filters: &FilterParameters,
        metric: TimeSeriesMetric,
    ) -> Result<TimeSeries, ClientError> {
        let mut query = filters.query_pairs();
        query.push(("metric", metric.as_str().to_string()));
        let body = self.get_json(endpoints::ENGAGEMENT_OVER_TIME, &query).await?;
        TimeSeries::from_response(metric, body).map_err(|e| ClientError::Deserialize {
            context: endpoints::ENGAGEMENT_OVER_TIME.to_string(),
            source: e,
        })
    }

    /// # Errors
    ///
    /// Same as [`AnalyticsClient::tiles`].
    pub async fn engagement_by_post_type(
        &self,
        filters: &FilterParameters,
    ) -> Result<Vec<PostTypeEngagement>, ClientError> {
        let body = self
            .get_json(endpoints::ENGAGEMENT_BY_POST_TYPE, &filters.query_pairs())
            .await?;
        let envelope: PostTypeEngagementEnvelope =
            decode_or_default(body, endpoints::ENGAGEMENT_BY_POST_TYPE)?;
        Ok(envelope.engagement_by_post_types)
    }

    /// # Errors
    ///
    /// Same as [`AnalyticsClient::tiles`].
    pub async fn clicks_per_post_type(
        &self,
        filters: &FilterParameters,
    ) -> Result<Vec<ClicksPerPostType>, ClientError> {
        let body = self
            .get_json(endpoints::CLICKS_PER_POST_TYPE, &filters.query_pairs())
            .await?;
        let envelope: ClicksEnvelope = decode_or_default(body, endpoints::CLICKS_PER_POST_TYPE)?;
        Ok(envelope.clicks_per_post_types)
    }

    /// Content suggestions from `/linkedin/suggestions`.
    ///
    /// # Errors
    ///
    /// Same as [`AnalyticsClient::tiles`].
    pub async fn insights(&self, filters: &FilterParameters) -> Result<Insights, ClientError> {
        let body = self
            .get_json(endpoints::INSIGHTS, &filters.query_pairs())
            .await?;
        decode_or_default(body, endpoints::INSIGHTS)
    }

    /// Raw content-engagement breakdown. The shape is owned by the backend
    /// and passed through untouched.
    ///
    /// # Errors
    ///
    /// [`ClientError::Api`] or [`ClientError::Http`].
    pub async fn content_engagement(
        &self,
        filters: &FilterParameters,
    ) -> Result<serde_json::Value, ClientError> {
        self.get_json(endpoints::CONTENT_ENGAGEMENT, &filters.query_pairs())
            .await
    }

    /// One page of the post engagement table.
    ///
    /// # Errors
    ///
    /// Same as [`AnalyticsClient::tiles`].
    pub async fn post_page(
        &self,
        filters: &FilterParameters,
        page: PageRequest,
    ) -> Result<PostPage, ClientError> {
        let body = self
            .post_json(endpoints::POST_TABLE, &PostTableRequest::new(filters, page))
            .await?;
        decode_or_default(body, endpoints::POST_TABLE)
    }

    /// Keyword search over posts in `scope`. A `null` body is an empty result.
    ///
    /// # Errors
    ///
    /// Same as [`AnalyticsClient::tiles`].
    pub async fn search_posts(
        &self,
        keyword: &str,
        scope: &SearchScope,
    ) -> Result<Vec<SearchResult>, ClientError> {
        let body = self
            .post_json(endpoints::SEARCH_POSTS, &SearchRequest { keyword, scope })
            .await?;
        decode_or_default(body, endpoints::SEARCH_POSTS)
    }

    /// Uploads one spreadsheet as a multipart form with a single `file` field.
    ///
    /// # Errors
    ///
    /// - [`ClientError::InvalidFile`] if the file fails validation.
    /// - [`ClientError::Api`] if the backend rejects it.
    /// - [`ClientError::Http`] on network failure.
    pub async fn upload_file(&self, file: &UploadFile) -> Result<UploadAck, ClientError> {
        file.validate()?;
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(file.mime_type())?;
        let form = Form::new().part("file", part);

        tracing::debug!(file = %file.name, bytes = file.bytes.len(), "uploading file");
        let request = self.authorize(self.client.post(self.endpoint(endpoints::UPLOAD)?));
        let response = request.multipart(form).send().await?;
        let body = read_json(response, endpoints::UPLOAD).await?;
        decode_or_default(body, endpoints::UPLOAD)
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|e| ClientError::InvalidBaseUrl {
                base_url: self.base_url.to_string(),
                reason: e.to_string(),
            })
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get_json(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<serde_json::Value, ClientError> {
        let url = self.endpoint(path)?;
        tracing::debug!(%url, "GET");
        let response = self
            .authorize(self.client.get(url))
            .query(query)
            .send()
            .await?;
        read_json(response, path).await
    }

    async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<serde_json::Value, ClientError> {
        let url = self.endpoint(path)?;
        tracing::debug!(%url, "POST");
        let response = self
            .authorize(self.client.post(url))
            .json(body)
            .send()
            .await?;
        read_json(response, path).await
    }
}

/// Reads the body as JSON. An empty body is `null`. A non-2xx status becomes
/// [`ClientError::Api`] carrying the body's `message` field when present.
async fn read_json(response: Response, context: &str) -> Result<serde_json::Value, ClientError> {
    let status = response.status();
    let text = response.text().await?;
    let parsed: Result<serde_json::Value, serde_json::Error> = if text.trim().is_empty() {
        Ok(serde_json::Value::Null)
    } else {
        serde_json::from_str(&text)
    };

    if !status.is_success() {
        let body = parsed.ok();
        let message = body
            .as_ref()
            .and_then(|v| v.get("message"))
            .and_then(serde_json::Value::as_str)
            .map(str::to_owned)
            .or_else(|| status.canonical_reason().map(str::to_owned))
            .unwrap_or_else(|| "request failed".to_string());
        return Err(ClientError::Api {
            status: status.as_u16(),
            message,
            data: body.filter(|v| !v.is_null()),
        });
    }

    parsed.map_err(|e| ClientError::Deserialize {
        context: context.to_string(),
        source: e,
    })
}

/// Decodes `body`, treating `null` as the type's empty value.
fn decode_or_default<T>(body: serde_json::Value, context: &str) -> Result<T, ClientError>
where
    T: DeserializeOwned + Default,
{
    if body.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(body).map_err(|e| ClientError::Deserialize {
        context: context.to_string(),
        source: e,
    })
}
