// ── Query construction ──
//
// Pure mapping from user parameters and a page index to the remote query
// that fetches that page. Identical inputs always produce an identical
// query, so pages of one lineage never shift under each other.

use chrono::{DateTime, Duration, Utc};

use extmarket_api::{Bound, Column, Filter, OrderBy, RemoteQuery};

use crate::model::{QueryParameters, SortKey};

/// Columns a search term is matched against.
pub const SEARCH_COLUMNS: [Column; 4] = [
    Column::Name,
    Column::Description,
    Column::Summary,
    Column::Author,
];

/// "New & Rising" only considers extensions updated within this window...
pub const RISING_WINDOW_DAYS: i64 = 30;
/// ...with fewer total downloads than this...
pub const RISING_MAX_DOWNLOADS: u64 = 10_000;
/// ...and fewer stars than this.
pub const RISING_MAX_STARS: u64 = 100;

/// Build the remote query for page `page_index` of `params`.
///
/// `as_of` anchors the "New & Rising" recency window; callers pass the same
/// instant for every page of a lineage.
pub fn build_query(
    params: &QueryParameters,
    page_index: u64,
    page_size: u64,
    as_of: DateTime<Utc>,
) -> RemoteQuery {
    let mut filters = Vec::new();

    if let Some(category) = &params.category {
        filters.push(Filter::Eq {
            column: Column::Category,
            value: category.as_str().to_owned(),
        });
    }

    if let Some(term) = params.search_term() {
        filters.push(Filter::AnyILike {
            columns: SEARCH_COLUMNS.to_vec(),
            needle: term.to_owned(),
        });
    }

    if let Some(version) = params.version {
        filters.push(Filter::Contains {
            column: Column::LabVersions,
            value: version.as_str().to_owned(),
        });
    }

    if params.sort == SortKey::NewAndRising {
        filters.extend(rising_filters(as_of));
    }

    RemoteQuery {
        filters,
        order: vec![primary_order(params.sort), OrderBy::asc(Column::Id)],
        offset: page_index.saturating_mul(page_size),
        limit: page_size,
    }
}

fn rising_filters(as_of: DateTime<Utc>) -> [Filter; 3] {
    [
        Filter::Gte {
            column: Column::LastUpdated,
            bound: Bound::Time(as_of - Duration::days(RISING_WINDOW_DAYS)),
        },
        Filter::Lt {
            column: Column::DownloadCountTotal,
            bound: Bound::Int(RISING_MAX_DOWNLOADS),
        },
        Filter::Lt {
            column: Column::GithubStars,
            bound: Bound::Int(RISING_MAX_STARS),
        },
    ]
}

fn primary_order(sort: SortKey) -> OrderBy {
    match sort {
        SortKey::NewAndRising | SortKey::LastUpdated => OrderBy::desc(Column::LastUpdated),
        SortKey::DownloadCountMonth => OrderBy::desc(Column::DownloadCountMonth),
        SortKey::DownloadCountTotal => OrderBy::desc(Column::DownloadCountTotal),
        SortKey::GithubStars => OrderBy::desc(Column::GithubStars),
        SortKey::Name => OrderBy::asc(Column::Name),
    }
}
