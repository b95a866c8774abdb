// ── Runtime feed configuration ──
//
// Tuning knobs for the feed controller. Core never reads config files;
// the CLI builds a `FeedConfig` from `extmarket-config` and hands it in.

use std::time::Duration;

/// Default number of items per page.
pub const DEFAULT_PAGE_SIZE: u64 = 50;

/// Default quiet period before a search-text edit is applied.
pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Default distance (logical px) from the viewport at which the next page loads.
pub const DEFAULT_SCROLL_THRESHOLD_PX: u32 = 500;

/// Where users report catalog problems.
pub const DEFAULT_FEEDBACK_URL: &str = "https://github.com/orbrx/jupyter-marketplace/issues/new/choose";

/// Configuration for a single feed controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedConfig {
    /// Items requested per page (the remote window size).
    pub page_size: u64,
    /// Quiet period for search-text debouncing.
    pub search_debounce: Duration,
    /// Proximity threshold handed to the `ScrollTrigger`.
    pub scroll_threshold_px: u32,
    /// Link appended to first-page failure messages.
    pub feedback_url: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            search_debounce: DEFAULT_SEARCH_DEBOUNCE,
            scroll_threshold_px: DEFAULT_SCROLL_THRESHOLD_PX,
            feedback_url: DEFAULT_FEEDBACK_URL.to_owned(),
        }
    }
}
