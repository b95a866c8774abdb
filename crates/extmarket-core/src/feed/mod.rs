// ── Feed controller ──
//
// Async shell around `FeedMachine`. A single task owns the machine and
// drains one event queue: user triggers, debounce expiries and fetch
// completions all arrive there, so transitions never interleave. Fetches
// and debounce timers run as child tasks that post back to the queue.

mod machine;
mod view;

pub use machine::{Completion, FeedMachine};
pub use view::{FeedState, FeedView};

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::FeedConfig;
use crate::error::CoreError;
use crate::model::{Category, QueryParameters, SortKey, VersionTag};
use crate::prefs::{Persistence, Preferences};
use crate::scroll::ScrollTrigger;
use crate::sequencer::{PageRequest, RequestId, RequestSequencer};
use crate::service::{FetchedPage, QueryService};
use crate::stream::FeedStream;

// ── Events ───────────────────────────────────────────────────────────

enum FeedEvent {
    SetSearchText(String),
    SetCategory(Option<Category>),
    SetSort(SortKey),
    SetVersion(Option<VersionTag>),
    LoadNextPage,
    Reload,
    DebounceElapsed {
        generation: u64,
    },
    FetchCompleted {
        request_id: RequestId,
        outcome: Result<FetchedPage, CoreError>,
    },
}

// ── FeedController ───────────────────────────────────────────────────

/// Handle to a running feed.
///
/// Cheaply cloneable via `Arc<FeedInner>`. Triggers are fire-and-forget;
/// results arrive through [`subscribe()`](Self::subscribe). Dropping the
/// last handle stops the feed and makes every in-flight fetch stale.
#[derive(Clone)]
pub struct FeedController {
    inner: Arc<FeedInner>,
}

struct FeedInner {
    config: FeedConfig,
    events: mpsc::UnboundedSender<FeedEvent>,
    view: watch::Receiver<FeedView>,
    cancel: CancellationToken,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for FeedInner {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl FeedController {
    /// Start a feed for `initial` and immediately request its first page.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn<S: QueryService>(
        service: Arc<S>,
        persistence: Arc<dyn Persistence>,
        sequencer: RequestSequencer,
        config: FeedConfig,
        initial: QueryParameters,
    ) -> Self {
        let machine = FeedMachine::new(config.clone(), initial, sequencer);
        let (view_tx, view_rx) = watch::channel(machine.view());
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        let worker = FeedWorker {
            machine,
            service,
            persistence,
            events: events_tx.clone(),
            view: view_tx,
            cancel: cancel.clone(),
            debounce: config.search_debounce,
            pending_search: None,
            generation: 0,
        };
        let handle = tokio::spawn(worker.run(events_rx));
        info!("feed controller started");

        Self {
            inner: Arc::new(FeedInner {
                config,
                events: events_tx,
                view: view_rx,
                cancel,
                task: Mutex::new(Some(handle)),
            }),
        }
    }

    pub fn config(&self) -> &FeedConfig {
        &self.inner.config
    }

    // ── Triggers ─────────────────────────────────────────────────────

    /// Update the search text. Applied after the debounce quiet period.
    pub fn set_search_text(&self, text: impl Into<String>) -> Result<(), CoreError> {
        self.send(FeedEvent::SetSearchText(text.into()))
    }

    pub fn set_category(&self, category: Option<Category>) -> Result<(), CoreError> {
        self.send(FeedEvent::SetCategory(category))
    }

    pub fn set_sort(&self, sort: SortKey) -> Result<(), CoreError> {
        self.send(FeedEvent::SetSort(sort))
    }

    pub fn set_version(&self, version: Option<VersionTag>) -> Result<(), CoreError> {
        self.send(FeedEvent::SetVersion(version))
    }

    /// Ask for the next page. Ignored while a request is in flight or when
    /// nothing more exists. After a later page failed, retries that page.
    pub fn load_next_page(&self) -> Result<(), CoreError> {
        self.send(FeedEvent::LoadNextPage)
    }

    /// Refetch from page 0 with the current parameters.
    pub fn reload(&self) -> Result<(), CoreError> {
        self.send(FeedEvent::Reload)
    }

    fn send(&self, event: FeedEvent) -> Result<(), CoreError> {
        if self.inner.cancel.is_cancelled() {
            return Err(CoreError::Shutdown);
        }
        self.inner.events.send(event).map_err(|_| CoreError::Shutdown)
    }

    // ── Observation ──────────────────────────────────────────────────

    /// Latest published view.
    pub fn view(&self) -> FeedView {
        self.inner.view.borrow().clone()
    }

    pub fn subscribe(&self) -> FeedStream {
        FeedStream::new(self.inner.view.clone())
    }

    /// A scroll trigger tuned to this feed's threshold.
    pub fn scroll_trigger(&self) -> ScrollTrigger {
        ScrollTrigger::new(self.inner.config.scroll_threshold_px)
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Stop the feed and wait for its task to finish. In-flight fetches
    /// are aborted and their results never applied.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();
        if let Some(handle) = self.inner.task.lock().await.take() {
            let _ = handle.await;
        }
        info!("feed controller stopped");
    }
}

// ── Worker task ──────────────────────────────────────────────────────

struct FeedWorker<S: QueryService> {
    machine: FeedMachine,
    service: Arc<S>,
    persistence: Arc<dyn Persistence>,
    events: mpsc::UnboundedSender<FeedEvent>,
    view: watch::Sender<FeedView>,
    cancel: CancellationToken,
    debounce: std::time::Duration,
    /// Search text waiting out the debounce period.
    pending_search: Option<String>,
    generation: u64,
}

impl<S: QueryService> FeedWorker<S> {
    async fn run(mut self, mut events: mpsc::UnboundedReceiver<FeedEvent>) {
        let request = self.machine.reload(Utc::now());
        self.fetch(&request);
        self.publish();

        loop {
            tokio::select! {
                biased;
                () = self.cancel.cancelled() => break,
                event = events.recv() => {
                    let Some(event) = event else { break };
                    if self.handle(event) {
                        self.publish();
                    }
                }
            }
        }

        self.machine.shutdown();
    }

    /// Apply one event. Returns `true` when the view changed.
    fn handle(&mut self, event: FeedEvent) -> bool {
        match event {
            FeedEvent::SetSearchText(text) => {
                self.generation += 1;
                self.pending_search = Some(text);
                self.schedule_debounce(self.generation);
                false
            }
            FeedEvent::DebounceElapsed { generation } => {
                if generation != self.generation {
                    return false;
                }
                let Some(text) = self.pending_search.take() else {
                    return false;
                };
                let params = self.machine.params().clone().with_search(text);
                self.apply(params)
            }
            FeedEvent::SetCategory(category) => {
                let params = self.machine.params().clone().with_category(category);
                self.apply(params)
            }
            FeedEvent::SetSort(sort) => {
                if sort != self.machine.params().sort {
                    Preferences::new(self.persistence.as_ref()).save_sort(sort);
                }
                let params = self.machine.params().clone().with_sort(sort);
                self.apply(params)
            }
            FeedEvent::SetVersion(version) => {
                if version != self.machine.params().version {
                    Preferences::new(self.persistence.as_ref()).save_version(version);
                }
                let params = self.machine.params().clone().with_version(version);
                self.apply(params)
            }
            FeedEvent::LoadNextPage => match self.machine.next_page() {
                Some(request) => {
                    self.fetch(&request);
                    true
                }
                None => false,
            },
            FeedEvent::Reload => {
                let request = self.machine.reload(Utc::now());
                self.fetch(&request);
                true
            }
            FeedEvent::FetchCompleted {
                request_id,
                outcome,
            } => self.machine.complete(request_id, outcome) != Completion::Stale,
        }
    }

    fn apply(&mut self, params: QueryParameters) -> bool {
        match self.machine.change_params(params, Utc::now()) {
            Some(request) => {
                self.fetch(&request);
                true
            }
            None => false,
        }
    }

    fn publish(&self) {
        self.view.send_replace(self.machine.view());
    }

    fn fetch(&self, request: &PageRequest) {
        let query = self.machine.query_for(request);
        let request_id = request.request_id;
        let service = Arc::clone(&self.service);
        let events = self.events.clone();
        let cancel = self.cancel.clone();

        tokio::spawn(async move {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    debug!(request = %request_id, "fetch aborted");
                }
                outcome = service.query(&query) => {
                    let _ = events.send(FeedEvent::FetchCompleted { request_id, outcome });
                }
            }
        });
    }

    fn schedule_debounce(&self, generation: u64) {
        let events = self.events.clone();
        let cancel = self.cancel.clone();
        let delay = self.debounce;

        tokio::spawn(async move {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {}
                () = tokio::time::sleep(delay) => {
                    let _ = events.send(FeedEvent::DebounceElapsed { generation });
                }
            }
        });
    }
}
