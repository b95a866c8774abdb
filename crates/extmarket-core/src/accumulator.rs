// ── Result accumulation ──
//
// Merges fetched pages into one ordered, id-unique result set. Page 0
// starts over; later pages append. Storage is an `IndexMap` so inserting
// an existing id replaces its data but keeps its position.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::model::{ItemId, ListItem};

/// The accumulated feed for one parameter lineage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    items: IndexMap<ItemId, Arc<ListItem>>,
    total_count: u64,
    has_more: bool,
}

impl ResultSet {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn get(&self, id: ItemId) -> Option<&Arc<ListItem>> {
        self.items.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<ListItem>> {
        self.items.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.items.keys().copied()
    }

    /// Id of the last item in display order.
    pub fn last_id(&self) -> Option<ItemId> {
        self.items.last().map(|(id, _)| *id)
    }

    /// Cheap ordered copy for publishing to renderers.
    pub fn snapshot(&self) -> Vec<Arc<ListItem>> {
        self.items.values().cloned().collect()
    }
}

/// Stateless merge rules, parameterized by page size.
#[derive(Debug, Clone, Copy)]
pub struct ResultAccumulator {
    page_size: u64,
}

impl ResultAccumulator {
    pub fn new(page_size: u64) -> Self {
        Self {
            page_size: page_size.max(1),
        }
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    pub fn reset(&self) -> ResultSet {
        ResultSet::default()
    }

    /// Fold one fetched page into `current`.
    ///
    /// Page 0 discards `current`. Duplicate ids (within a page or against
    /// earlier pages) keep the first position and the latest data.
    pub fn merge(
        &self,
        current: ResultSet,
        page: Vec<ListItem>,
        page_index: u64,
        total_count: u64,
    ) -> ResultSet {
        if page_index > 0 && page.is_empty() {
            // Nothing arrived past the end: keep what we have, stop paging.
            return ResultSet {
                has_more: false,
                ..current
            };
        }

        let mut items = if page_index == 0 {
            IndexMap::with_capacity(page.len())
        } else {
            current.items
        };

        for item in page {
            items.insert(item.id, Arc::new(item));
        }

        let loaded_through = page_index.saturating_add(1).saturating_mul(self.page_size);
        ResultSet {
            items,
            total_count,
            has_more: loaded_through < total_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn item(id: u64, name: &str) -> ListItem {
        ListItem {
            id: ItemId::new(id),
            name: name.to_owned(),
            description: None,
            summary: None,
            author: None,
            category: None,
            logo_url: None,
            github_stars: 0,
            download_count_month: 0,
            download_count_total: 0,
            last_updated: None,
        }
    }

    fn names(set: &ResultSet) -> Vec<&str> {
        set.iter().map(|i| i.name.as_str()).collect()
    }

    #[test]
    fn first_page_then_append() {
        let acc = ResultAccumulator::new(3);
        let set = acc.merge(
            acc.reset(),
            vec![item(1, "A"), item(2, "B"), item(3, "C")],
            0,
            5,
        );
        assert!(set.has_more());
        assert_eq!(set.total_count(), 5);

        let set = acc.merge(set, vec![item(4, "D"), item(5, "E")], 1, 5);
        assert_eq!(names(&set), vec!["A", "B", "C", "D", "E"]);
        assert!(!set.has_more());
    }

    #[test]
    fn duplicates_in_first_page_keep_position_and_latest_data() {
        let acc = ResultAccumulator::new(50);
        let set = acc.merge(
            acc.reset(),
            vec![item(7, "old"), item(8, "B"), item(7, "new")],
            0,
            3,
        );
        assert_eq!(set.len(), 2);
        assert_eq!(names(&set), vec!["new", "B"]);
    }

    #[test]
    fn later_page_overwrites_in_place() {
        let acc = ResultAccumulator::new(2);
        let set = acc.merge(acc.reset(), vec![item(1, "A"), item(2, "B")], 0, 4);
        let set = acc.merge(set, vec![item(1, "A2"), item(3, "C")], 1, 4);
        assert_eq!(names(&set), vec!["A2", "B", "C"]);
        assert_eq!(set.last_id(), Some(ItemId::new(3)));
    }

    #[test]
    fn first_page_replaces_everything() {
        let acc = ResultAccumulator::new(2);
        let set = acc.merge(acc.reset(), vec![item(1, "A"), item(2, "B")], 0, 10);
        let set = acc.merge(set, vec![item(9, "Z")], 0, 1);
        assert_eq!(names(&set), vec!["Z"]);
        assert!(!set.has_more());
    }

    #[test]
    fn empty_later_page_is_a_no_op_that_stops_paging() {
        let acc = ResultAccumulator::new(2);
        let set = acc.merge(acc.reset(), vec![item(1, "A"), item(2, "B")], 0, 10);
        assert!(set.has_more());

        let set = acc.merge(set, Vec::new(), 1, 10);
        assert_eq!(names(&set), vec!["A", "B"]);
        assert_eq!(set.total_count(), 10);
        assert!(!set.has_more());
    }

    #[test]
    fn ids_stay_unique() {
        let acc = ResultAccumulator::new(3);
        let mut set = acc.reset();
        for (page, ids) in [[1, 2, 3], [3, 4, 1], [5, 5, 2]].into_iter().enumerate() {
            let page_items = ids.iter().map(|&id| item(id, "x")).collect();
            set = acc.merge(set, page_items, u64::try_from(page).unwrap_or(0), 100);
        }
        let mut ids: Vec<_> = set.ids().collect();
        let before = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), before);
        assert_eq!(set.len(), 5);
    }
}
