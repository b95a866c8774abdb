// ── Request sequencing ──
//
// Every fetch is stamped with a strictly increasing id. Only the most
// recently issued id is current; anything older is stale no matter when
// it completes.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::QueryParameters;

/// Monotonic request identifier, unique for a controller's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RequestId(u64);

impl RequestId {
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One stamped page fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub params: QueryParameters,
    pub page_index: u64,
    pub request_id: RequestId,
    /// Anchor for time-relative filters, shared by the whole lineage.
    pub as_of: DateTime<Utc>,
}

/// Issues request ids and answers "is this still the one we want?".
#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: u64,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamp a new request. The returned id becomes the only current id
    /// before any fetch starts.
    pub fn issue(
        &mut self,
        params: QueryParameters,
        page_index: u64,
        as_of: DateTime<Utc>,
    ) -> PageRequest {
        self.latest += 1;
        PageRequest {
            params,
            page_index,
            request_id: RequestId(self.latest),
            as_of,
        }
    }

    pub fn is_current(&self, id: RequestId) -> bool {
        self.latest != 0 && id.0 == self.latest
    }

    /// Make every outstanding id stale without issuing a new request.
    pub fn invalidate(&mut self) {
        self.latest += 1;
    }

    pub fn latest(&self) -> Option<RequestId> {
        (self.latest != 0).then_some(RequestId(self.latest))
    }
}
