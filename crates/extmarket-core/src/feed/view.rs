// ── Renderer-facing snapshot ──

use std::sync::Arc;

use serde::Serialize;

use crate::model::{ListItem, QueryParameters};
use crate::sequencer::RequestId;

/// Lifecycle of the feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum FeedState {
    Idle,
    Loading(RequestId),
    Loaded,
    Error(String),
}

/// Everything a renderer needs to paint the feed at one instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedView {
    pub params: QueryParameters,
    pub state: FeedState,
    pub items: Arc<Vec<Arc<ListItem>>>,
    pub is_loading: bool,
    pub has_more: bool,
    pub total_count: u64,
    /// Last page merged into `items`.
    pub page_index: u64,
    /// Changes on every merge or reset of `items`, even when the last item
    /// stays the same.
    #[serde(skip)]
    pub revision: u64,
    pub error_message: Option<String>,
    /// One-line summary for assistive output and status bars.
    pub status_announcement: String,
}

impl FeedView {
    /// Loaded successfully with nothing to show.
    pub fn is_empty_result(&self) -> bool {
        self.state == FeedState::Loaded && self.items.is_empty()
    }

    /// Last item in display order, the one a `ScrollTrigger` watches.
    pub fn last_item(&self) -> Option<&Arc<ListItem>> {
        self.items.last()
    }

    /// Caption above the list, e.g. `1234 Extensions matching "git"`.
    pub fn heading(&self) -> String {
        let mut heading = format!(
            "{} {}",
            self.total_count,
            plural(self.total_count, "Extension", "Extensions")
        );
        if let Some(term) = self.params.search_term() {
            heading.push_str(&format!(" matching \"{term}\""));
        }
        heading
    }
}

/// Status text for a view in `state`.
pub(crate) fn announcement(
    state: &FeedState,
    params: &QueryParameters,
    shown: usize,
    total: u64,
    loading_more: bool,
) -> String {
    match state {
        FeedState::Idle => String::new(),
        FeedState::Loading(_) if loading_more => "Loading more extensions...".to_owned(),
        FeedState::Loading(_) => "Loading extensions...".to_owned(),
        FeedState::Error(message) => message.clone(),
        FeedState::Loaded if shown == 0 => "No extensions found".to_owned(),
        FeedState::Loaded => {
            let mut text = format!(
                "Showing {shown} of {total} {}",
                plural(total, "extension", "extensions")
            );
            if let Some(term) = params.search_term() {
                text.push_str(&format!(" matching \"{term}\""));
            }
            text.push_str(", sorted by ");
            text.push_str(params.sort.label());
            text
        }
    }
}

fn plural<'a>(n: u64, one: &'a str, many: &'a str) -> &'a str {
    if n == 1 { one } else { many }
}
