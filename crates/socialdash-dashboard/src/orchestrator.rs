//! Fetch orchestrator: dispatches panel fetches for a parameter snapshot and
//! routes each response to its display slot.
//!
//! Three modes exist:
//!
//! - [`FetchOrchestrator::refresh_all`] fetches every panel concurrently.
//! - [`FetchOrchestrator::refresh_metric`] fetches only the time series.
//! - [`FetchOrchestrator::refresh_page`] fetches only the post table.
//!
//! Completions are applied as they arrive, each through its slot's sequence
//! guard. Nothing is cancelled: a superseded request still runs to
//! completion and its response is simply discarded.

use std::sync::atomic::{AtomicUsize, Ordering};

use serde::Serialize;
use socialdash_client::{AnalyticsClient, NormalizedError};
use socialdash_core::ParamSnapshot;
use tokio::sync::RwLock;

use crate::events::{DashboardEvent, EventBus, Notification};
use crate::slots::{split_analysis, AnalysisTickets, DisplaySlots, Slot, SlotId};

/// What happened to one slot's completion.
#[derive(Debug, Clone, PartialEq)]
pub enum SlotOutcome {
    Updated,
    /// A newer fetch was issued for the slot; this response was dropped.
    Stale,
    /// The slot now shows an error state.
    Failed(NormalizedError),
}

/// Per-slot results of one refresh.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RefreshReport {
    pub updated: Vec<SlotId>,
    pub stale: Vec<SlotId>,
    pub failed: Vec<(SlotId, NormalizedError)>,
}

impl RefreshReport {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Slots whose display changed, failures included.
    #[must_use]
    pub fn written(&self) -> Vec<SlotId> {
        let mut slots: Vec<SlotId> = self
            .updated
            .iter()
            .copied()
            .chain(self.failed.iter().map(|(id, _)| *id))
            .collect();
        slots.sort_unstable();
        slots
    }

    fn record(&mut self, id: SlotId, outcome: SlotOutcome) {
        match outcome {
            SlotOutcome::Updated => self.updated.push(id),
            SlotOutcome::Stale => self.stale.push(id),
            SlotOutcome::Failed(error) => self.failed.push((id, error)),
        }
    }
}

/// Sequence numbers for every panel of one full refresh.
#[derive(Debug, Clone, Copy)]
pub struct FullTickets {
    tiles: u64,
    analysis: AnalysisTickets,
    series: u64,
    by_type: u64,
    clicks: u64,
    insights: u64,
    table: u64,
}

#[derive(Debug)]
pub struct FetchOrchestrator {
    client: AnalyticsClient,
    slots: RwLock<DisplaySlots>,
    bus: EventBus,
    full_refreshes: AtomicUsize,
}

impl FetchOrchestrator {
    #[must_use]
    pub fn new(client: AnalyticsClient, bus: EventBus) -> Self {
        Self {
            client,
            slots: RwLock::new(DisplaySlots::default()),
            bus,
            full_refreshes: AtomicUsize::new(0),
        }
    }

    /// Copy of the current panel contents.
    pub async fn slots(&self) -> DisplaySlots {
        self.slots.read().await.clone()
    }

    /// True while any full refresh is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.full_refreshes.load(Ordering::SeqCst) > 0
    }

    /// Issues one ticket per panel for a full refresh.
    ///
    /// Callers that derive the snapshot from shared state should take the
    /// tickets while still holding that state's lock, so ticket order matches
    /// snapshot order.
    pub async fn issue_all(&self) -> FullTickets {
        let mut slots = self.slots.write().await;
        FullTickets {
            tiles: slots.tiles.begin(),
            analysis: slots.begin_analysis(),
            series: slots.engagement_over_time.begin(),
            by_type: slots.engagement_by_post_type.begin(),
            clicks: slots.clicks_per_post_type.begin(),
            insights: slots.insights.begin(),
            table: slots.post_table.begin(),
        }
    }

    pub async fn issue_metric(&self) -> u64 {
        self.slots.write().await.engagement_over_time.begin()
    }

    pub async fn issue_page(&self) -> u64 {
        self.slots.write().await.post_table.begin()
    }

    /// Fetches every panel for `snapshot` concurrently.
    ///
    /// Each slot is written at most once. A failure in one source does not
    /// hold back the others; if any fail, a single error notification is
    /// published once all have settled.
    pub async fn refresh_all(&self, snapshot: &ParamSnapshot) -> RefreshReport {
        let tickets = self.issue_all().await;
        self.refresh_all_with(snapshot, tickets).await
    }

    /// [`FetchOrchestrator::refresh_all`] with tickets already issued.
    pub async fn refresh_all_with(
        &self,
        snapshot: &ParamSnapshot,
        tickets: FullTickets,
    ) -> RefreshReport {
        let FullTickets {
            tiles: tiles_seq,
            analysis: analysis_seq,
            series: series_seq,
            by_type: by_type_seq,
            clicks: clicks_seq,
            insights: insights_seq,
            table: table_seq,
        } = tickets;
        tracing::debug!(revision = snapshot.revision, tiles_seq, "dispatching full refresh");

        if self.full_refreshes.fetch_add(1, Ordering::SeqCst) == 0 {
            self.bus.publish(DashboardEvent::Loading(true));
        }

        let filters = &snapshot.filters;
        let (tiles, analysis, series, by_type, clicks, insights, table) = tokio::join!(
            async {
                let result = self.client.tiles(filters).await;
                self.apply(SlotId::Tiles, tiles_seq, normalize(result), |s| &mut s.tiles)
                    .await
            },
            async {
                let result = normalize(self.client.ai_analysis(filters).await);
                let (words, tags, sentiment) = split_analysis(result);
                [
                    self.apply(SlotId::WordCloud, analysis_seq.word_cloud, words, |s| {
                        &mut s.word_cloud
                    })
                    .await,
                    self.apply(SlotId::Hashtags, analysis_seq.hashtags, tags, |s| &mut s.hashtags)
                        .await,
                    self.apply(SlotId::Sentiment, analysis_seq.sentiment, sentiment, |s| {
                        &mut s.sentiment
                    })
                    .await,
                ]
            },
            async {
                let result = self
                    .client
                    .engagement_over_time(filters, snapshot.metric)
                    .await;
                self.apply(
                    SlotId::EngagementOverTime,
                    series_seq,
                    normalize(result),
                    |s| &mut s.engagement_over_time,
                )
                .await
            },
            async {
                let result = self.client.engagement_by_post_type(filters).await;
                self.apply(
                    SlotId::EngagementByPostType,
                    by_type_seq,
                    normalize(result),
                    |s| &mut s.engagement_by_post_type,
                )
                .await
            },
            async {
                let result = self.client.clicks_per_post_type(filters).await;
                self.apply(
                    SlotId::ClicksPerPostType,
                    clicks_seq,
                    normalize(result),
                    |s| &mut s.clicks_per_post_type,
                )
                .await
            },
            async {
                let result = self.client.insights(filters).await;
                self.apply(SlotId::Insights, insights_seq, normalize(result), |s| {
                    &mut s.insights
                })
                .await
            },
            async {
                let result = self.client.post_page(filters, snapshot.page).await;
                self.apply(SlotId::PostTable, table_seq, normalize(result), |s| {
                    &mut s.post_table
                })
                .await
            },
        );

        let [words, tags, sentiment] = analysis;
        let mut report = RefreshReport::default();
        report.record(SlotId::Tiles, tiles);
        report.record(SlotId::WordCloud, words);
        report.record(SlotId::Hashtags, tags);
        report.record(SlotId::Sentiment, sentiment);
        report.record(SlotId::EngagementOverTime, series);
        report.record(SlotId::EngagementByPostType, by_type);
        report.record(SlotId::ClicksPerPostType, clicks);
        report.record(SlotId::Insights, insights);
        report.record(SlotId::PostTable, table);

        if self.full_refreshes.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.bus.publish(DashboardEvent::Loading(false));
        }

        if !report.failed.is_empty() {
            let count = report.failed.len();
            self.bus.publish(DashboardEvent::Notification(Notification::error(
                format!("Failed to load {count} of {} dashboard panels", SlotId::ALL.len()),
            )));
        }

        tracing::info!(
            revision = snapshot.revision,
            updated = report.updated.len(),
            stale = report.stale.len(),
            failed = report.failed.len(),
            "full refresh settled"
        );
        report
    }

    /// Fetches only the engagement time series for the snapshot's metric.
    pub async fn refresh_metric(&self, snapshot: &ParamSnapshot) -> RefreshReport {
        let seq = self.issue_metric().await;
        self.refresh_metric_with(snapshot, seq).await
    }

    pub async fn refresh_metric_with(&self, snapshot: &ParamSnapshot, seq: u64) -> RefreshReport {
        tracing::debug!(metric = %snapshot.metric, seq, "dispatching metric refresh");

        let result = self
            .client
            .engagement_over_time(&snapshot.filters, snapshot.metric)
            .await;
        let outcome = self
            .apply(SlotId::EngagementOverTime, seq, normalize(result), |s| {
                &mut s.engagement_over_time
            })
            .await;
        self.single_report(SlotId::EngagementOverTime, outcome)
    }

    /// Fetches only the post table page named by the snapshot.
    pub async fn refresh_page(&self, snapshot: &ParamSnapshot) -> RefreshReport {
        let seq = self.issue_page().await;
        self.refresh_page_with(snapshot, seq).await
    }

    pub async fn refresh_page_with(&self, snapshot: &ParamSnapshot, seq: u64) -> RefreshReport {
        tracing::debug!(page = snapshot.page.number, seq, "dispatching page refresh");

        let result = self
            .client
            .post_page(&snapshot.filters, snapshot.page)
            .await;
        let outcome = self
            .apply(SlotId::PostTable, seq, normalize(result), |s| {
                &mut s.post_table
            })
            .await;
        self.single_report(SlotId::PostTable, outcome)
    }

    fn single_report(&self, id: SlotId, outcome: SlotOutcome) -> RefreshReport {
        if let SlotOutcome::Failed(error) = &outcome {
            self.bus
                .publish(DashboardEvent::Notification(Notification::error(format!(
                    "Failed to load {id}: {}",
                    error.message
                ))));
        }
        let mut report = RefreshReport::default();
        report.record(id, outcome);
        report
    }

    async fn apply<T>(
        &self,
        id: SlotId,
        seq: u64,
        result: Result<T, NormalizedError>,
        pick: impl FnOnce(&mut DisplaySlots) -> &mut Slot<T>,
    ) -> SlotOutcome {
        let failure = result.as_ref().err().cloned();
        let applied = {
            let mut slots = self.slots.write().await;
            pick(&mut *slots).complete(seq, result)
        };

        if !applied {
            tracing::debug!(slot = %id, seq, "discarding stale response");
            return SlotOutcome::Stale;
        }

        self.bus.publish(DashboardEvent::SlotUpdated(id));
        match failure {
            Some(error) => {
                tracing::warn!(slot = %id, seq, status = ?error.status, error = %error.message, "panel fetch failed");
                SlotOutcome::Failed(error)
            }
            None => SlotOutcome::Updated,
        }
    }
}

fn normalize<T>(result: Result<T, socialdash_client::ClientError>) -> Result<T, NormalizedError> {
    result.map_err(|e| e.normalized())
}
