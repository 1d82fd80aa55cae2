//! Request payloads and response types for the analytics API.
//!
//! The backend is loose about numbers: rates and counts arrive as JSON
//! numbers or as numeric strings (`"4.25"`), and empty collections sometimes
//! arrive as `null`. The helpers at the bottom absorb both.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use socialdash_core::{FilterParameters, PageRequest, SearchScope, TimeSeriesMetric};

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Body of `POST /linkedin/posts/engagement-table`.
#[derive(Debug, Serialize)]
pub(crate) struct PostTableRequest<'a> {
    #[serde(flatten)]
    pub filters: &'a FilterParameters,
    pub offset: u32,
    pub limit: u32,
}

impl<'a> PostTableRequest<'a> {
    pub(crate) fn new(filters: &'a FilterParameters, page: PageRequest) -> Self {
        Self {
            filters,
            offset: page.offset(),
            limit: page.limit(),
        }
    }
}

/// Body of `POST /linkedin/posts/search`.
#[derive(Debug, Serialize)]
pub(crate) struct SearchRequest<'a> {
    pub keyword: &'a str,
    #[serde(flatten)]
    pub scope: &'a SearchScope,
}

// ---------------------------------------------------------------------------
// Tiles
// ---------------------------------------------------------------------------

/// Tile value: most metrics are numeric, the top post is a title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TileValue {
    Number(f64),
    Text(String),
}

impl TileValue {
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            TileValue::Number(n) => Some(*n),
            TileValue::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// One summary statistic: a value and its change against the prior period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricTile {
    #[serde(alias = "title")]
    pub value: TileValue,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub change: f64,
}

/// Metric name to tile. Replaced wholesale on every fetch.
///
/// Entries that do not look like a tile are dropped while decoding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, serde_json::Value>")]
pub struct MetricSnapshot(pub BTreeMap<String, MetricTile>);

impl From<BTreeMap<String, serde_json::Value>> for MetricSnapshot {
    fn from(raw: BTreeMap<String, serde_json::Value>) -> Self {
        Self(
            raw.into_iter()
                .filter_map(|(name, v)| {
                    serde_json::from_value::<MetricTile>(v)
                        .ok()
                        .map(|tile| (name, tile))
                })
                .collect(),
        )
    }
}

impl MetricSnapshot {
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&MetricTile> {
        self.0.get(name)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ---------------------------------------------------------------------------
// AI analysis: word cloud, hashtags, sentiment
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordCount {
    pub word: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub count: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HashtagPerformance {
    pub hashtag: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub count: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub total_engagement: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub avg_engagement: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub positive_sentiment: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub negative_sentiment: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub neutral_sentiment: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentPoint {
    pub date: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub positive: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub negative: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub neutral: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SentimentEnvelope {
    #[serde(default, deserialize_with = "null_as_default")]
    sentiment_over_time: Vec<SentimentPoint>,
}

/// Response of `/linkedin/posts/ai-analysis`. One response feeds the word
/// cloud, hashtag, and sentiment panels.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiAnalysis {
    #[serde(default, deserialize_with = "null_as_default")]
    pub word_cloud: Vec<WordCount>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub hashtag_performance: Vec<HashtagPerformance>,
    /// Nested on the wire as `sentimentOverTime.sentimentOverTime`.
    #[serde(
        default,
        rename = "sentimentOverTime",
        deserialize_with = "nested_sentiment"
    )]
    pub sentiment: Vec<SentimentPoint>,
}

fn nested_sentiment<'de, D>(deserializer: D) -> Result<Vec<SentimentPoint>, D::Error>
where
    D: Deserializer<'de>,
{
    let envelope = Option::<SentimentEnvelope>::deserialize(deserializer)?;
    Ok(envelope.unwrap_or_default().sentiment_over_time)
}

// ---------------------------------------------------------------------------
// Charts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeriesPoint {
    pub date: String,
    pub metric_value: f64,
}

/// Points for the currently selected metric, replaced atomically per fetch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeries {
    pub metric: TimeSeriesMetric,
    pub points: Vec<TimeSeriesPoint>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTimeSeries {
    #[serde(default, deserialize_with = "null_as_default")]
    engagement_over_time: Vec<serde_json::Map<String, serde_json::Value>>,
}

impl TimeSeries {
    /// Decodes an engagement-over-time response for `metric`.
    ///
    /// Each point carries its value either as `metricValue` or under the
    /// metric's own wire name (`engagementRate`, `clicks`, ...). Points with
    /// no date or no readable value are skipped.
    ///
    /// # Errors
    ///
    /// Returns the decode error if the envelope itself is malformed.
    pub fn from_response(
        metric: TimeSeriesMetric,
        body: serde_json::Value,
    ) -> Result<Self, serde_json::Error> {
        let raw: RawTimeSeries = if body.is_null() {
            RawTimeSeries::default()
        } else {
            serde_json::from_value(body)?
        };
        let points = raw
            .engagement_over_time
            .into_iter()
            .filter_map(|point| {
                let date = point.get("date")?.as_str()?.to_string();
                let value = point
                    .get("metricValue")
                    .or_else(|| point.get(metric.as_str()))
                    .and_then(value_as_f64)?;
                Some(TimeSeriesPoint {
                    date,
                    metric_value: value,
                })
            })
            .collect();
        Ok(Self { metric, points })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostTypeEngagement {
    pub post_type: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub engagement_rate: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PostTypeEngagementEnvelope {
    #[serde(default, deserialize_with = "null_as_default")]
    pub engagement_by_post_types: Vec<PostTypeEngagement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClicksPerPostType {
    pub post_type: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub clicks: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub ctr: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ClicksEnvelope {
    #[serde(default, deserialize_with = "null_as_default")]
    pub clicks_per_post_types: Vec<ClicksPerPostType>,
}

// ---------------------------------------------------------------------------
// Insights
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordInsight {
    pub keyword: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub avg_engagement: f64,
    #[serde(default)]
    pub sentiment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelevantPost {
    pub post_title: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub engagement_rate: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub relevance_score: f64,
}

/// Response of `/linkedin/suggestions`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insights {
    #[serde(default, deserialize_with = "null_as_default")]
    pub top_keywords: Vec<KeywordInsight>,
    #[serde(default)]
    pub best_time_to_post: Option<String>,
    #[serde(default)]
    pub best_post_type: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub most_relevant_posts: Vec<RelevantPost>,
}

// ---------------------------------------------------------------------------
// Post table and search
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub post_type: String,
    #[serde(default)]
    pub audience: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub impressions: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub views: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub clicks: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub ctr: f64,
}

/// One page of the post engagement table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPage {
    #[serde(default, deserialize_with = "null_as_default")]
    pub posts: Vec<Post>,
    #[serde(default, alias = "totalCount")]
    pub total_posts: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default)]
    pub post_title: String,
    #[serde(default)]
    pub post_type: String,
    #[serde(default)]
    pub product_type: String,
}

/// Body returned by a successful upload. The backend may send nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UploadAck {
    #[serde(default)]
    pub message: Option<String>,
}

// ---------------------------------------------------------------------------
// Lenient decoding helpers
// ---------------------------------------------------------------------------

fn value_as_f64(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().trim_end_matches('%').parse().ok(),
        _ => None,
    }
}

/// Accepts a number, a numeric string (optionally with a trailing `%`), or
/// `null` (read as `0.0`).
fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(0.0);
    }
    value_as_f64(&value)
        .ok_or_else(|| serde::de::Error::custom(format!("expected a number, got {value}")))
}

/// Accepts a string or a number and yields a string.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string or number, got {other}"
        ))),
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
