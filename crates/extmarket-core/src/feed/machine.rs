// ── Feed state machine ──
//
// Synchronous core of the feed controller. Every trigger and completion
// passes through here on one thread; the async shell only moves events
// and runs fetches. Keeping it pure makes each transition unit-testable.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use extmarket_api::RemoteQuery;
use tracing::{debug, warn};

use super::view::{FeedState, FeedView, announcement};
use crate::accumulator::{ResultAccumulator, ResultSet};
use crate::config::FeedConfig;
use crate::error::CoreError;
use crate::model::QueryParameters;
use crate::query::build_query;
use crate::sequencer::{PageRequest, RequestId, RequestSequencer};
use crate::service::FetchedPage;

/// What a completion did to the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Superseded request; nothing changed.
    Stale,
    /// Page merged; the feed is `Loaded`.
    Merged { page_index: u64 },
    /// Current request failed; the feed is in `Error`.
    Failed { page_index: u64 },
}

/// Owns parameters, state and results for one feed.
#[derive(Debug)]
pub struct FeedMachine {
    config: FeedConfig,
    sequencer: RequestSequencer,
    accumulator: ResultAccumulator,
    params: QueryParameters,
    state: FeedState,
    results: ResultSet,
    /// Last page merged into `results`.
    page_index: u64,
    /// Page of the current in-flight request.
    loading_page: Option<u64>,
    /// Recency anchor for the current lineage.
    as_of: DateTime<Utc>,
    /// Bumped whenever `results` is replaced or merged into.
    revision: u64,
}

impl FeedMachine {
    pub fn new(config: FeedConfig, params: QueryParameters, sequencer: RequestSequencer) -> Self {
        let accumulator = ResultAccumulator::new(config.page_size);
        Self {
            config,
            sequencer,
            accumulator,
            params: params.normalized(),
            state: FeedState::Idle,
            results: ResultSet::default(),
            page_index: 0,
            loading_page: None,
            as_of: DateTime::<Utc>::MIN_UTC,
            revision: 0,
        }
    }

    pub fn params(&self) -> &QueryParameters {
        &self.params
    }

    pub fn state(&self) -> &FeedState {
        &self.state
    }

    pub fn results(&self) -> &ResultSet {
        &self.results
    }

    pub fn page_index(&self) -> u64 {
        self.page_index
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    // ── Triggers ─────────────────────────────────────────────────────

    /// Switch to `params`. Equal parameters are ignored once the feed has
    /// started; anything else restarts from page 0.
    pub fn change_params(
        &mut self,
        params: QueryParameters,
        now: DateTime<Utc>,
    ) -> Option<PageRequest> {
        let params = params.normalized();
        if params == self.params && self.state != FeedState::Idle {
            debug!("parameters unchanged, ignoring");
            return None;
        }
        self.params = params;
        Some(self.start_lineage(now))
    }

    /// Refetch page 0 of the current parameters.
    pub fn reload(&mut self, now: DateTime<Utc>) -> PageRequest {
        self.start_lineage(now)
    }

    /// Request the page after the last merged one. Valid from `Loaded`, or
    /// from `Error` after a later page failed, when more results exist.
    /// From `Error` this retries the failed page.
    pub fn next_page(&mut self) -> Option<PageRequest> {
        let settled = matches!(self.state, FeedState::Loaded | FeedState::Error(_));
        if !settled || self.loading_page.is_some() || !self.results.has_more() {
            return None;
        }
        let page_index = self.page_index + 1;
        let request = self
            .sequencer
            .issue(self.params.clone(), page_index, self.as_of);
        self.enter_loading(&request);
        Some(request)
    }

    fn start_lineage(&mut self, now: DateTime<Utc>) -> PageRequest {
        self.as_of = now;
        self.results = self.accumulator.reset();
        self.revision += 1;
        self.page_index = 0;
        let request = self.sequencer.issue(self.params.clone(), 0, now);
        self.enter_loading(&request);
        request
    }

    fn enter_loading(&mut self, request: &PageRequest) {
        debug!(
            request = %request.request_id,
            page = request.page_index,
            "issuing page request"
        );
        self.state = FeedState::Loading(request.request_id);
        self.loading_page = Some(request.page_index);
    }

    // ── Completions ──────────────────────────────────────────────────

    /// Apply the outcome of request `id`. Outcomes for anything but the
    /// current request are dropped.
    pub fn complete(
        &mut self,
        id: RequestId,
        outcome: Result<FetchedPage, CoreError>,
    ) -> Completion {
        let is_awaited = self.sequencer.is_current(id) && self.state == FeedState::Loading(id);
        let page_index = match self.loading_page {
            Some(page) if is_awaited => page,
            _ => {
                debug!(request = %id, "discarding stale response");
                return Completion::Stale;
            }
        };
        self.loading_page = None;

        match outcome {
            Ok(page) => {
                let current = std::mem::take(&mut self.results);
                self.results =
                    self.accumulator.merge(current, page.items, page_index, page.total_count);
                self.revision += 1;
                self.page_index = page_index;
                self.state = FeedState::Loaded;
                Completion::Merged { page_index }
            }
            Err(e) => {
                warn!(request = %id, page = page_index, error = %e, "page request failed");
                let message = if page_index == 0 {
                    self.results = self.accumulator.reset();
                    self.revision += 1;
                    format!(
                        "Failed to load extensions: {e}. Please try again, or report the problem at {}",
                        self.config.feedback_url
                    )
                } else {
                    format!("Failed to load more extensions: {e}")
                };
                self.state = FeedState::Error(message);
                Completion::Failed { page_index }
            }
        }
    }

    /// Make every in-flight request permanently stale.
    pub fn shutdown(&mut self) {
        self.sequencer.invalidate();
        self.loading_page = None;
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Remote query for a request issued by this machine.
    pub fn query_for(&self, request: &PageRequest) -> RemoteQuery {
        build_query(
            &request.params,
            request.page_index,
            self.config.page_size,
            request.as_of,
        )
    }

    pub fn view(&self) -> FeedView {
        let items = Arc::new(self.results.snapshot());
        let loading_more = self.loading_page.is_some_and(|page| page > 0);
        let error_message = match &self.state {
            FeedState::Error(message) => Some(message.clone()),
            _ => None,
        };

        FeedView {
            params: self.params.clone(),
            state: self.state.clone(),
            status_announcement: announcement(
                &self.state,
                &self.params,
                items.len(),
                self.results.total_count(),
                loading_more,
            ),
            is_loading: matches!(self.state, FeedState::Loading(_)),
            has_more: self.results.has_more(),
            total_count: self.results.total_count(),
            page_index: self.page_index,
            revision: self.revision,
            error_message,
            items,
        }
    }
}
