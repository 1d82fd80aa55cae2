//! Paths of the analytics API, relative to the configured base URL.

pub const TILES: &str = "linkedin/dashboard";
pub const METRICS: &str = "linkedin/metrics";
pub const AI_ANALYSIS: &str = "linkedin/posts/ai-analysis";
pub const ENGAGEMENT_OVER_TIME: &str = "linkedin/charts/engagement-over-time";
pub const ENGAGEMENT_BY_POST_TYPE: &str = "linkedin/charts/engagement-by-post-type";
pub const CLICKS_PER_POST_TYPE: &str = "linkedin/charts/clicks-per-post-type";
pub const INSIGHTS: &str = "linkedin/suggestions";
pub const CONTENT_ENGAGEMENT: &str = "linkedin/content-engagement";
pub const POST_TABLE: &str = "linkedin/posts/engagement-table";
pub const SEARCH_POSTS: &str = "linkedin/posts/search";
pub const UPLOAD: &str = "linkedin/upload";
