// ── Scroll trigger ──
//
// Edge-triggered "load more" detector. The renderer reports which item is
// rendered last and how far that item sits below the viewport; the trigger
// fires once per entry into the threshold zone.

use crate::model::ItemId;

/// Watches the last rendered item and raises a single "load next page"
/// signal when it comes within `threshold_px` of the viewport.
#[derive(Debug, Clone)]
pub struct ScrollTrigger {
    threshold_px: u32,
    observed: Option<ItemId>,
    /// List revision the observed item belongs to.
    revision: u64,
    armed: bool,
}

impl ScrollTrigger {
    pub fn new(threshold_px: u32) -> Self {
        Self {
            threshold_px,
            observed: None,
            revision: 0,
            armed: false,
        }
    }

    pub fn threshold_px(&self) -> u32 {
        self.threshold_px
    }

    /// The item currently watched, if any.
    pub fn observed(&self) -> Option<ItemId> {
        self.observed
    }

    /// Point the trigger at the last item of list `revision`
    /// (see [`FeedView::revision`](crate::FeedView::revision)).
    ///
    /// Any list change re-arms, including a merge that only refreshed items
    /// already shown and left the last item in place. The same item at the
    /// same revision leaves the trigger untouched.
    pub fn observe(&mut self, last: Option<ItemId>, revision: u64) {
        if self.observed == last && self.revision == revision {
            return;
        }
        self.observed = last;
        self.revision = revision;
        self.armed = last.is_some();
    }

    /// Report the observed item's position.
    ///
    /// `distance_px` is how far the item's top edge lies below the bottom of
    /// the viewport (zero or negative once it is visible). Returns `true`
    /// exactly once per entry into the zone.
    pub fn update(&mut self, distance_px: i64) -> bool {
        if self.observed.is_none() {
            return false;
        }

        let in_zone = distance_px <= i64::from(self.threshold_px);
        if !in_zone {
            self.armed = true;
            return false;
        }

        if self.armed {
            self.armed = false;
            return true;
        }
        false
    }

    /// Stop observing entirely (teardown or empty list).
    pub fn disconnect(&mut self) {
        self.observed = None;
        self.armed = false;
    }
}
