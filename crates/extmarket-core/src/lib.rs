//! Incremental result-feed controller for the extension marketplace.
//!
//! This crate turns a changing set of query parameters (search text,
//! category, sort, JupyterLab version) into a stable, deduplicated,
//! incrementally loaded list of catalog items:
//!
//! - **[`FeedController`]**: async handle over a single worker task that
//!   owns the [`FeedMachine`]. Debounces search edits, issues page
//!   requests, drops stale responses, and publishes [`FeedView`]s.
//!
//! - **[`build_query`]**: pure mapping from parameters and a page index to
//!   a fully specified [`RemoteQuery`](extmarket_api::RemoteQuery).
//!
//! - **[`RequestSequencer`]** / **[`ResultAccumulator`]**: request
//!   currency and id-unique page merging.
//!
//! - **[`ScrollTrigger`]**: edge-triggered "load more" detector for
//!   renderers.
//!
//! - **[`QueryService`]**: the seam to the catalog, implemented by
//!   [`RestQueryService`] and the in-process [`MemoryCatalog`].
//!
//! - **[`Persistence`]**: remembered sort and version choices.

pub mod accumulator;
pub mod config;
pub mod convert;
pub mod error;
pub mod feed;
pub mod model;
pub mod prefs;
pub mod query;
pub mod scroll;
pub mod sequencer;
pub mod service;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use accumulator::{ResultAccumulator, ResultSet};
pub use config::FeedConfig;
pub use error::CoreError;
pub use feed::{Completion, FeedController, FeedMachine, FeedState, FeedView};
pub use prefs::{
    MemoryPersistence, Persistence, PersistenceError, PreferenceOverrides, Preferences,
    SavedPreferences,
};
pub use query::build_query;
pub use scroll::ScrollTrigger;
pub use sequencer::{PageRequest, RequestId, RequestSequencer};
pub use service::{FetchedPage, MemoryCatalog, QueryService, RestQueryService};
pub use stream::{FeedStream, FeedWatchStream};

pub use model::{
    Category, DetailItem, ItemId, ListItem, QueryParameters, SortKey, UnknownVersion, VersionTag,
};
