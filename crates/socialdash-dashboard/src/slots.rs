//! Display slots: passive holders for each panel's latest data.
//!
//! Every fetch takes a ticket from its slot before dispatch. A completion is
//! written only if its ticket is still the newest one issued for that slot,
//! so a slow response for old filters can never overwrite a newer one.

use std::fmt;

use serde::Serialize;
use socialdash_client::{
    metric_cards, AiAnalysis, ClicksPerPostType, HashtagPerformance, Insights, MetricCard,
    MetricSnapshot, NormalizedError, PostPage, PostTypeEngagement, SentimentPoint, TimeSeries,
    WordCount,
};
use socialdash_core::{PageRequest, Pagination};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotId {
    Tiles,
    WordCloud,
    Hashtags,
    Sentiment,
    EngagementOverTime,
    EngagementByPostType,
    ClicksPerPostType,
    Insights,
    PostTable,
}

impl SlotId {
    pub const ALL: [SlotId; 9] = [
        SlotId::Tiles,
        SlotId::WordCloud,
        SlotId::Hashtags,
        SlotId::Sentiment,
        SlotId::EngagementOverTime,
        SlotId::EngagementByPostType,
        SlotId::ClicksPerPostType,
        SlotId::Insights,
        SlotId::PostTable,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SlotId::Tiles => "tiles",
            SlotId::WordCloud => "word_cloud",
            SlotId::Hashtags => "hashtags",
            SlotId::Sentiment => "sentiment",
            SlotId::EngagementOverTime => "engagement_over_time",
            SlotId::EngagementByPostType => "engagement_by_post_type",
            SlotId::ClicksPerPostType => "clicks_per_post_type",
            SlotId::Insights => "insights",
            SlotId::PostTable => "post_table",
        }
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a panel currently shows. A failed fetch clears the data; the panel
/// renders its empty state with a retry affordance.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum SlotState<T> {
    #[default]
    Empty,
    Ready(T),
    Failed(NormalizedError),
}

#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct Slot<T> {
    #[serde(skip)]
    issued: u64,
    #[serde(skip)]
    applied: u64,
    state: SlotState<T>,
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self {
            issued: 0,
            applied: 0,
            state: SlotState::Empty,
        }
    }
}

impl<T> Slot<T> {
    /// Issues the next sequence number for a fetch targeting this slot.
    pub fn begin(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    /// Writes a completion if `seq` is the newest ticket issued. Returns
    /// `false` when the completion is stale and was discarded.
    pub fn complete(&mut self, seq: u64, result: Result<T, NormalizedError>) -> bool {
        if seq != self.issued {
            return false;
        }
        self.state = match result {
            Ok(data) => SlotState::Ready(data),
            Err(error) => SlotState::Failed(error),
        };
        self.applied = seq;
        true
    }

    #[must_use]
    pub fn state(&self) -> &SlotState<T> {
        &self.state
    }

    #[must_use]
    pub fn data(&self) -> Option<&T> {
        match &self.state {
            SlotState::Ready(data) => Some(data),
            _ => None,
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<&NormalizedError> {
        match &self.state {
            SlotState::Failed(error) => Some(error),
            _ => None,
        }
    }

    /// True while the newest issued fetch has not landed yet.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.applied != self.issued
    }

    #[must_use]
    pub fn issued(&self) -> u64 {
        self.issued
    }
}

/// All panels of the dashboard.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DisplaySlots {
    pub tiles: Slot<MetricSnapshot>,
    pub word_cloud: Slot<Vec<WordCount>>,
    pub hashtags: Slot<Vec<HashtagPerformance>>,
    pub sentiment: Slot<Vec<SentimentPoint>>,
    pub engagement_over_time: Slot<TimeSeries>,
    pub engagement_by_post_type: Slot<Vec<PostTypeEngagement>>,
    pub clicks_per_post_type: Slot<Vec<ClicksPerPostType>>,
    pub insights: Slot<Insights>,
    pub post_table: Slot<PostPage>,
}

impl DisplaySlots {
    /// Card row built from the tiles slot; zeroed cards when it has no data.
    #[must_use]
    pub fn cards(&self) -> Vec<MetricCard> {
        match self.tiles.data() {
            Some(snapshot) => metric_cards(snapshot),
            None => metric_cards(&MetricSnapshot::default()),
        }
    }

    /// Pager state for `current`, using the row total of the last applied
    /// table page.
    #[must_use]
    pub fn pagination(&self, current: PageRequest) -> Pagination {
        Pagination::new(current, self.post_table.data().map(|page| page.total_posts))
    }

    #[must_use]
    pub fn is_ready(&self, id: SlotId) -> bool {
        match id {
            SlotId::Tiles => self.tiles.data().is_some(),
            SlotId::WordCloud => self.word_cloud.data().is_some(),
            SlotId::Hashtags => self.hashtags.data().is_some(),
            SlotId::Sentiment => self.sentiment.data().is_some(),
            SlotId::EngagementOverTime => self.engagement_over_time.data().is_some(),
            SlotId::EngagementByPostType => self.engagement_by_post_type.data().is_some(),
            SlotId::ClicksPerPostType => self.clicks_per_post_type.data().is_some(),
            SlotId::Insights => self.insights.data().is_some(),
            SlotId::PostTable => self.post_table.data().is_some(),
        }
    }

    pub(crate) fn begin_analysis(&mut self) -> AnalysisTickets {
        AnalysisTickets {
            word_cloud: self.word_cloud.begin(),
            hashtags: self.hashtags.begin(),
            sentiment: self.sentiment.begin(),
        }
    }
}

/// Tickets for the three panels fed by one AI-analysis response.
#[derive(Debug, Clone, Copy)]
pub(crate) struct AnalysisTickets {
    pub word_cloud: u64,
    pub hashtags: u64,
    pub sentiment: u64,
}

/// Splits one AI-analysis result into its three panel results.
#[allow(clippy::type_complexity)]
pub(crate) fn split_analysis(
    result: Result<AiAnalysis, NormalizedError>,
) -> (
    Result<Vec<WordCount>, NormalizedError>,
    Result<Vec<HashtagPerformance>, NormalizedError>,
    Result<Vec<SentimentPoint>, NormalizedError>,
) {
    match result {
        Ok(analysis) => (
            Ok(analysis.word_cloud),
            Ok(analysis.hashtag_performance),
            Ok(analysis.sentiment),
        ),
        Err(error) => (Err(error.clone()), Err(error.clone()), Err(error)),
    }
}
