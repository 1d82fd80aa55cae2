//! The dashboard session facade.
//!
//! Every user action goes through here: the action writes the parameter
//! store, takes the resulting snapshot, and dispatches the refresh that
//! matches what changed. Completion handlers only ever write display slots.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use socialdash_client::{check_batch_size, AnalyticsClient, UploadFile};
use socialdash_core::{
    AppConfig, DateRange, FilterParameters, FilterPatch, Pagination, ParamSnapshot,
    ParameterStore, ProductsFile, StoreChange, TimeSeriesMetric,
};
use tokio::sync::{broadcast, Mutex};

use crate::error::DashboardError;
use crate::events::{DashboardEvent, EventBus, Notification};
use crate::orchestrator::{FetchOrchestrator, RefreshReport};
use crate::search::SearchFlow;
use crate::slots::DisplaySlots;
use crate::upload::{upload_all, UploadReport};

/// Session knobs taken from [`AppConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardSettings {
    pub default_product: String,
    pub page_size: u32,
    pub search_debounce: Duration,
    /// Wait between a fully successful upload and the refresh it triggers,
    /// giving the backend time to ingest.
    pub upload_settle: Duration,
    pub event_capacity: usize,
}

impl DashboardSettings {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            default_product: config.default_product.clone(),
            page_size: config.page_size,
            search_debounce: Duration::from_millis(config.search_debounce_ms),
            upload_settle: Duration::from_millis(config.upload_settle_ms),
            event_capacity: config.event_capacity,
        }
    }
}

/// Result of [`Dashboard::upload`].
#[derive(Debug, Clone, Serialize)]
pub struct UploadOutcome {
    pub report: UploadReport,
    /// Present only when every file succeeded and the dashboard reloaded.
    pub refresh: Option<RefreshReport>,
}

#[derive(Debug)]
pub struct Dashboard {
    client: AnalyticsClient,
    products: ProductsFile,
    settings: DashboardSettings,
    store: Mutex<ParameterStore>,
    orchestrator: FetchOrchestrator,
    search: SearchFlow,
    bus: EventBus,
}

impl Dashboard {
    /// Creates a session scoped to the configured default product. Nothing
    /// is fetched until [`Dashboard::load`].
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::UnknownProduct`] if the default product is
    /// not in the catalogue.
    pub fn new(
        client: AnalyticsClient,
        products: ProductsFile,
        settings: DashboardSettings,
    ) -> Result<Self, DashboardError> {
        if products.find(&settings.default_product).is_none() {
            return Err(DashboardError::UnknownProduct(
                settings.default_product.clone(),
            ));
        }

        let filters = FilterParameters::new(settings.default_product.clone());
        let bus = EventBus::new(settings.event_capacity);
        let search = SearchFlow::new(
            client.clone(),
            filters.search_scope(),
            settings.search_debounce,
        );
        let orchestrator = FetchOrchestrator::new(client.clone(), bus.clone());

        Ok(Self {
            client,
            products,
            store: Mutex::new(ParameterStore::new(filters, settings.page_size)),
            settings,
            orchestrator,
            search,
            bus,
        })
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<DashboardEvent> {
        self.bus.subscribe()
    }

    #[must_use]
    pub fn products(&self) -> &ProductsFile {
        &self.products
    }

    #[must_use]
    pub fn search(&self) -> &SearchFlow {
        &self.search
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.orchestrator.is_loading()
    }

    pub async fn snapshot(&self) -> Arc<ParamSnapshot> {
        self.store.lock().await.snapshot()
    }

    pub async fn slots(&self) -> DisplaySlots {
        self.orchestrator.slots().await
    }

    pub async fn pagination(&self) -> Pagination {
        let page = self.snapshot().await.page;
        self.slots().await.pagination(page)
    }

    /// Initial full refresh.
    pub async fn load(&self) -> RefreshReport {
        let (snapshot, tickets) = {
            let store = self.store.lock().await;
            (store.snapshot(), self.orchestrator.issue_all().await)
        };
        self.orchestrator.refresh_all_with(&snapshot, tickets).await
    }

    /// Re-runs the full refresh with the current parameters.
    pub async fn retry(&self) -> RefreshReport {
        self.load().await
    }

    /// Switches product. Returns `Ok(None)` if it was already selected.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::UnknownProduct`] for an id not in the
    /// catalogue.
    pub async fn set_product(&self, id: &str) -> Result<Option<RefreshReport>, DashboardError> {
        if self.products.find(id).is_none() {
            return Err(DashboardError::UnknownProduct(id.to_string()));
        }
        let patch = FilterPatch {
            product_type: Some(id.to_string()),
            ..Self::rescope_patch()
        };
        Ok(self.apply_scope_change(patch).await)
    }

    /// Sets or clears (`None`) the date range.
    pub async fn set_date_range(&self, range: Option<DateRange>) -> Option<RefreshReport> {
        let patch = FilterPatch {
            date_range: Some(range),
            ..Self::rescope_patch()
        };
        self.apply_scope_change(patch).await
    }

    /// Copies the search selection into the shared filters and reloads.
    /// Returns `None` when the selection already matches.
    pub async fn confirm_search_selection(&self) -> Option<RefreshReport> {
        let ids = self.search.selected().await;
        self.apply_selection(ids).await
    }

    /// Clears the search box and its selection. A selection already
    /// confirmed into the filters is dropped too, which reloads the panels.
    pub async fn clear_search(&self) -> Option<RefreshReport> {
        self.search.clear().await;
        self.apply_selection(Vec::new()).await
    }

    /// Changes the plotted metric; only the time series is refetched.
    pub async fn select_metric(&self, metric: TimeSeriesMetric) -> Option<RefreshReport> {
        let (snapshot, seq) = {
            let mut store = self.store.lock().await;
            if store.select_metric(metric) == StoreChange::Unchanged {
                return None;
            }
            (store.snapshot(), self.orchestrator.issue_metric().await)
        };
        Some(self.orchestrator.refresh_metric_with(&snapshot, seq).await)
    }

    /// Moves the post table to page `number`. Out-of-range pages and the
    /// current page are no-ops and return `None`.
    pub async fn go_to_page(&self, number: u32) -> Option<RefreshReport> {
        let pager = self.pagination().await;
        if pager.target(number).is_none() {
            tracing::debug!(number, last = pager.last_page(), "page out of range");
            return None;
        }
        let (snapshot, seq) = {
            let mut store = self.store.lock().await;
            if store.set_page(number) == StoreChange::Unchanged {
                return None;
            }
            (store.snapshot(), self.orchestrator.issue_page().await)
        };
        Some(self.orchestrator.refresh_page_with(&snapshot, seq).await)
    }

    /// Uploads a batch of spreadsheets. Only when every file succeeds does
    /// the dashboard wait out the settle delay and reload everything.
    ///
    /// A file rejected locally (wrong extension, empty) is reported with an
    /// error status and never sent; the rest of the batch still uploads.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::Client`] for an empty or oversized batch; in
    /// that case nothing is sent.
    pub async fn upload(&self, files: &[UploadFile]) -> Result<UploadOutcome, DashboardError> {
        check_batch_size(files)?;
        let report = upload_all(&self.client, files).await;

        if !report.all_succeeded() {
            let names: Vec<&str> = report
                .failures()
                .iter()
                .map(|f| f.name.as_str())
                .collect();
            self.bus.publish(DashboardEvent::Notification(Notification::error(
                format!("Upload failed for {}", names.join(", ")),
            )));
            return Ok(UploadOutcome {
                report,
                refresh: None,
            });
        }

        self.bus.publish(DashboardEvent::Notification(Notification::success(
            format!("{} file(s) uploaded", report.files.len()),
        )));
        tokio::time::sleep(self.settings.upload_settle).await;
        let refresh = self.load().await;
        Ok(UploadOutcome {
            report,
            refresh: Some(refresh),
        })
    }

    /// Product and date changes also drop the confirmed post selection,
    /// whose ids may not exist in the new scope.
    fn rescope_patch() -> FilterPatch {
        FilterPatch::selected_posts(Vec::new())
    }

    async fn apply_selection(&self, ids: Vec<String>) -> Option<RefreshReport> {
        let (snapshot, tickets) = {
            let mut store = self.store.lock().await;
            if store.update(FilterPatch::selected_posts(ids)) == StoreChange::Unchanged {
                return None;
            }
            (store.snapshot(), self.orchestrator.issue_all().await)
        };
        Some(self.orchestrator.refresh_all_with(&snapshot, tickets).await)
    }

    // Tickets and the search scope are taken under the store lock so that
    // concurrent actions reach the slots in the order they hit the store.
    async fn apply_scope_change(&self, patch: FilterPatch) -> Option<RefreshReport> {
        let (snapshot, tickets, rescope) = {
            let mut store = self.store.lock().await;
            if store.update(patch) == StoreChange::Unchanged {
                return None;
            }
            let snapshot = store.snapshot();
            let tickets = self.orchestrator.issue_all().await;
            let rescope = self.search.rescope(snapshot.filters.search_scope()).await;
            (snapshot, tickets, rescope)
        };

        let (report, phase) = tokio::join!(
            self.orchestrator.refresh_all_with(&snapshot, tickets),
            self.search.finish_rescope(rescope),
        );
        tracing::debug!(revision = snapshot.revision, search = ?phase, "filters changed");
        Some(report)
    }
}
