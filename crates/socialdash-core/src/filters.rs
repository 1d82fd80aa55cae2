//! Filter parameters shared by every dashboard fetch.
//!
//! `FilterParameters` is the wire-facing shape: optional dates and an empty
//! post selection are omitted from serialized payloads and query strings
//! rather than sent as empty values.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The filter dimensions applied to every panel fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterParameters {
    /// Product (workspace) identifier, e.g. `pirai-infotech`.
    pub product_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    /// Post IDs confirmed from the search box.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub selected_post_ids: Vec<String>,
}

impl FilterParameters {
    #[must_use]
    pub fn new(product_type: impl Into<String>) -> Self {
        Self {
            product_type: product_type.into(),
            start_date: None,
            end_date: None,
            selected_post_ids: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_date_range(mut self, range: Option<DateRange>) -> Self {
        self.start_date = range.map(|r| r.start);
        self.end_date = range.map(|r| r.end);
        self
    }

    #[must_use]
    pub fn with_selected_posts(mut self, ids: Vec<String>) -> Self {
        self.selected_post_ids = ids;
        self
    }

    /// Returns the date range when both ends are set.
    #[must_use]
    pub fn date_range(&self) -> Option<DateRange> {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => Some(DateRange { start, end }),
            _ => None,
        }
    }

    /// Query-string pairs for GET endpoints. Unset fields are left out.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("productType", self.product_type.clone())];
        if let Some(start) = self.start_date {
            pairs.push(("startDate", start.to_string()));
        }
        if let Some(end) = self.end_date {
            pairs.push(("endDate", end.to_string()));
        }
        if !self.selected_post_ids.is_empty() {
            pairs.push(("postIds", self.selected_post_ids.join(",")));
        }
        pairs
    }

    /// The subset of filters that scopes a post search.
    #[must_use]
    pub fn search_scope(&self) -> SearchScope {
        SearchScope {
            product_type: self.product_type.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }
}

/// Inclusive calendar range. Start after end is passed through unchanged;
/// the upstream service decides what that means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    #[must_use]
    pub const fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }
}

/// Product and date scope a search runs under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchScope {
    pub product_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

/// Metric plotted by the engagement-over-time panel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimeSeriesMetric {
    #[default]
    EngagementRate,
    Impressions,
    Clicks,
    Reactions,
    Comments,
    Reposts,
}

impl TimeSeriesMetric {
    pub const ALL: [TimeSeriesMetric; 6] = [
        TimeSeriesMetric::EngagementRate,
        TimeSeriesMetric::Impressions,
        TimeSeriesMetric::Clicks,
        TimeSeriesMetric::Reactions,
        TimeSeriesMetric::Comments,
        TimeSeriesMetric::Reposts,
    ];

    /// Wire name, used both as the `metric` query value and as the field
    /// name of each point in the response.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            TimeSeriesMetric::EngagementRate => "engagementRate",
            TimeSeriesMetric::Impressions => "impressions",
            TimeSeriesMetric::Clicks => "clicks",
            TimeSeriesMetric::Reactions => "reactions",
            TimeSeriesMetric::Comments => "comments",
            TimeSeriesMetric::Reposts => "reposts",
        }
    }
}

impl std::fmt::Display for TimeSeriesMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TimeSeriesMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().to_ascii_lowercase() == normalized)
            .ok_or_else(|| {
                let known: Vec<&str> = Self::ALL.iter().map(|m| m.as_str()).collect();
                format!("unknown metric '{s}'; expected one of {}", known.join(", "))
            })
    }
}
