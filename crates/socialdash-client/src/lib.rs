//! HTTP client for the LinkedIn analytics API behind the dashboard.
//!
//! Wraps `reqwest` with typed request payloads and response decoding for
//! every panel endpoint, plus multipart spreadsheet upload. Non-2xx
//! responses surface as [`ClientError::Api`] and can be flattened to the
//! `{ status, message, data }` shape with [`ClientError::normalized`].

pub mod cards;
pub mod client;
pub mod endpoints;
pub mod error;
pub mod types;
pub mod upload;

pub use cards::{metric_cards, ChangeDirection, MetricCard};
pub use client::AnalyticsClient;
pub use error::{ClientError, NormalizedError};
pub use types::{
    AiAnalysis, ClicksPerPostType, HashtagPerformance, Insights, KeywordInsight, MetricSnapshot,
    MetricTile, Post, PostPage, PostTypeEngagement, RelevantPost, SearchResult, SentimentPoint,
    TileValue, TimeSeries, TimeSeriesPoint, UploadAck, WordCount,
};
pub use upload::{check_batch_size, UploadFile, ALLOWED_EXTENSIONS, MAX_FILES_PER_BATCH};
