// ── Domain model ──
//
// Canonical types shared by the feed machinery and its consumers.

pub mod item;
pub mod item_id;
pub mod params;

pub use item::{DetailItem, ListItem};
pub use item_id::ItemId;
pub use params::{Category, QueryParameters, SortKey, UnknownVersion, VersionTag};
