//! The parameter store: the single source of truth for filter state.
//!
//! Every write produces a fresh immutable [`ParamSnapshot`]; fetches receive
//! an `Arc` of the snapshot current at dispatch time and never observe later
//! writes. Any effective filter change resets the table to page 1.

use std::sync::Arc;

use crate::filters::{DateRange, FilterParameters, TimeSeriesMetric};
use crate::pagination::PageRequest;

/// Immutable view of the parameters at one point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSnapshot {
    /// Incremented on every effective write.
    pub revision: u64,
    pub filters: FilterParameters,
    pub metric: TimeSeriesMetric,
    pub page: PageRequest,
}

/// Shallow merge of explicitly provided filter fields.
///
/// `date_range: Some(None)` clears both dates; `None` leaves them alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterPatch {
    pub product_type: Option<String>,
    pub date_range: Option<Option<DateRange>>,
    pub selected_post_ids: Option<Vec<String>>,
}

impl FilterPatch {
    #[must_use]
    pub fn product(product_type: impl Into<String>) -> Self {
        Self {
            product_type: Some(product_type.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn date_range(range: Option<DateRange>) -> Self {
        Self {
            date_range: Some(range),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn selected_posts(ids: Vec<String>) -> Self {
        Self {
            selected_post_ids: Some(ids),
            ..Self::default()
        }
    }
}

/// What an update changed, which decides the refresh the caller dispatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreChange {
    Unchanged,
    /// Filters changed; the page was reset to 1.
    Filters,
    Metric,
    Page,
}

#[derive(Debug)]
pub struct ParameterStore {
    current: Arc<ParamSnapshot>,
}

impl ParameterStore {
    #[must_use]
    pub fn new(filters: FilterParameters, page_size: u32) -> Self {
        Self {
            current: Arc::new(ParamSnapshot {
                revision: 0,
                filters,
                metric: TimeSeriesMetric::default(),
                page: PageRequest::first(page_size),
            }),
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> Arc<ParamSnapshot> {
        Arc::clone(&self.current)
    }

    /// Applies a filter patch. The page number goes back to 1 whenever the
    /// filters actually change.
    pub fn update(&mut self, patch: FilterPatch) -> StoreChange {
        let mut filters = self.current.filters.clone();
        if let Some(product_type) = patch.product_type {
            filters.product_type = product_type;
        }
        if let Some(range) = patch.date_range {
            filters = filters.with_date_range(range);
        }
        if let Some(ids) = patch.selected_post_ids {
            filters.selected_post_ids = ids;
        }

        if filters == self.current.filters {
            return StoreChange::Unchanged;
        }

        let page = self.current.page.with_number(1);
        self.replace(|snap| {
            snap.filters = filters;
            snap.page = page;
        });
        StoreChange::Filters
    }

    pub fn select_metric(&mut self, metric: TimeSeriesMetric) -> StoreChange {
        if metric == self.current.metric {
            return StoreChange::Unchanged;
        }
        self.replace(|snap| snap.metric = metric);
        StoreChange::Metric
    }

    /// Moves the table to page `number`. Range checks belong to the caller,
    /// which knows the row total.
    pub fn set_page(&mut self, number: u32) -> StoreChange {
        if number == self.current.page.number {
            return StoreChange::Unchanged;
        }
        let page = self.current.page.with_number(number);
        self.replace(|snap| snap.page = page);
        StoreChange::Page
    }

    fn replace(&mut self, edit: impl FnOnce(&mut ParamSnapshot)) {
        let mut next = (*self.current).clone();
        edit(&mut next);
        next.revision = self.current.revision + 1;
        self.current = Arc::new(next);
    }
}
