//! Debounced post search scoped by the current filters.
//!
//! Each keystroke bumps a generation counter and waits out the debounce
//! window; only the call whose generation is still current afterwards sends
//! a request. The same counter guards completions, so results for an older
//! query never replace newer ones. In-flight requests are not aborted.
//!
//! Selected result ids stay local until the dashboard confirms them into the
//! parameter store.

use std::collections::BTreeSet;
use std::time::Duration;

use serde::Serialize;
use socialdash_client::{AnalyticsClient, SearchResult};
use socialdash_core::SearchScope;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchPhase {
    Idle,
    Debouncing,
    Fetching,
    Results,
    Empty,
    /// The request failed; rendered the same as `Empty`.
    Error,
}

/// Read-only copy of the search box state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchView {
    pub phase: SearchPhase,
    pub query: String,
    pub results: Vec<SearchResult>,
    pub selected: Vec<String>,
}

#[derive(Debug)]
struct SearchState {
    phase: SearchPhase,
    query: String,
    generation: u64,
    scope: SearchScope,
    results: Vec<SearchResult>,
    selected: BTreeSet<String>,
}

/// Pending work after a scope change.
#[derive(Debug)]
pub(crate) enum Rescope {
    Settled(SearchPhase),
    Refetch {
        generation: u64,
        query: String,
        scope: SearchScope,
    },
}

#[derive(Debug)]
pub struct SearchFlow {
    client: AnalyticsClient,
    debounce: Duration,
    state: Mutex<SearchState>,
}

impl SearchFlow {
    #[must_use]
    pub fn new(client: AnalyticsClient, scope: SearchScope, debounce: Duration) -> Self {
        Self {
            client,
            debounce,
            state: Mutex::new(SearchState {
                phase: SearchPhase::Idle,
                query: String::new(),
                generation: 0,
                scope,
                results: Vec::new(),
                selected: BTreeSet::new(),
            }),
        }
    }

    /// Handles one keystroke's worth of input.
    ///
    /// Returns the phase the flow settled in, or `None` when a later
    /// keystroke superseded this one. A blank query clears the results and
    /// returns to `Idle` immediately.
    pub async fn input(&self, query: &str) -> Option<SearchPhase> {
        let query = query.trim().to_string();
        let generation = {
            let mut state = self.state.lock().await;
            state.generation += 1;
            state.query.clone_from(&query);
            if query.is_empty() {
                state.phase = SearchPhase::Idle;
                state.results.clear();
                return Some(SearchPhase::Idle);
            }
            state.phase = SearchPhase::Debouncing;
            state.generation
        };

        tokio::time::sleep(self.debounce).await;

        let scope = {
            let mut state = self.state.lock().await;
            if state.generation != generation {
                return None;
            }
            state.phase = SearchPhase::Fetching;
            state.scope.clone()
        };

        self.fetch(generation, &query, &scope).await
    }

    /// Clears the query, results and selection.
    pub async fn clear(&self) {
        let mut state = self.state.lock().await;
        state.generation += 1;
        state.query.clear();
        state.results.clear();
        state.selected.clear();
        state.phase = SearchPhase::Idle;
    }

    /// Moves the search to a new product/date scope.
    ///
    /// The selection is reset since its ids may not exist in the new scope.
    /// With a non-empty query the search is re-run at once, without debounce
    /// and without passing through `Fetching`.
    pub async fn set_scope(&self, scope: SearchScope) -> Option<SearchPhase> {
        let rescope = self.rescope(scope).await;
        self.finish_rescope(rescope).await
    }

    /// Records the new scope and claims a generation for the re-run, without
    /// sending anything yet.
    pub(crate) async fn rescope(&self, scope: SearchScope) -> Rescope {
        let mut state = self.state.lock().await;
        if state.scope == scope {
            return Rescope::Settled(state.phase);
        }
        state.scope.clone_from(&scope);
        state.selected.clear();
        if state.query.is_empty() {
            return Rescope::Settled(state.phase);
        }
        state.generation += 1;
        Rescope::Refetch {
            generation: state.generation,
            query: state.query.clone(),
            scope,
        }
    }

    pub(crate) async fn finish_rescope(&self, rescope: Rescope) -> Option<SearchPhase> {
        match rescope {
            Rescope::Settled(phase) => Some(phase),
            Rescope::Refetch {
                generation,
                query,
                scope,
            } => {
                tracing::debug!(query = %query, product = %scope.product_type, "re-running search for new scope");
                self.fetch(generation, &query, &scope).await
            }
        }
    }

    /// Flips selection of one result id; returns whether it is now selected.
    pub async fn toggle(&self, id: &str) -> bool {
        let mut state = self.state.lock().await;
        if state.selected.remove(id) {
            false
        } else {
            state.selected.insert(id.to_string());
            true
        }
    }

    pub async fn selected(&self) -> Vec<String> {
        self.state.lock().await.selected.iter().cloned().collect()
    }

    pub async fn phase(&self) -> SearchPhase {
        self.state.lock().await.phase
    }

    pub async fn view(&self) -> SearchView {
        let state = self.state.lock().await;
        SearchView {
            phase: state.phase,
            query: state.query.clone(),
            results: state.results.clone(),
            selected: state.selected.iter().cloned().collect(),
        }
    }

    async fn fetch(
        &self,
        generation: u64,
        query: &str,
        scope: &SearchScope,
    ) -> Option<SearchPhase> {
        let result = self.client.search_posts(query, scope).await;

        let mut state = self.state.lock().await;
        if state.generation != generation {
            tracing::debug!(query, "discarding superseded search response");
            return None;
        }
        match result {
            Ok(results) => {
                state.phase = if results.is_empty() {
                    SearchPhase::Empty
                } else {
                    SearchPhase::Results
                };
                state.results = results;
            }
            Err(e) => {
                tracing::warn!(query, error = %e, "post search failed");
                state.phase = SearchPhase::Error;
                state.results.clear();
            }
        }
        Some(state.phase)
    }
}
