// ── Query services ──
//
// The feed controller talks to the catalog only through `QueryService`.
// `RestQueryService` hits the live endpoint; `MemoryCatalog` evaluates the
// same `RemoteQuery` over an in-process item list (fixtures, offline use).

use std::cmp::Ordering;
use std::future::Future;
use std::path::Path;

use chrono::{DateTime, Utc};
use tracing::debug;

use extmarket_api::{Bound, Column, Direction, Filter, OrderBy, RemoteQuery, RestClient};

use crate::convert::parse_timestamp;
use crate::error::CoreError;
use crate::model::{DetailItem, ItemId, ListItem};

/// One page as delivered by a query service.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedPage {
    pub items: Vec<ListItem>,
    pub total_count: u64,
}

/// Executes remote queries for the feed controller.
pub trait QueryService: Send + Sync + 'static {
    fn query(
        &self,
        query: &RemoteQuery,
    ) -> impl Future<Output = Result<FetchedPage, CoreError>> + Send;
}

// ── REST ─────────────────────────────────────────────────────────────

/// `QueryService` over the catalog REST endpoint.
#[derive(Debug, Clone)]
pub struct RestQueryService {
    client: RestClient,
}

impl RestQueryService {
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &RestClient {
        &self.client
    }

    /// Full record for one extension.
    pub async fn detail(&self, id: ItemId) -> Result<DetailItem, CoreError> {
        self.client
            .get_extension(id.get())
            .await?
            .map(DetailItem::from)
            .ok_or_else(|| CoreError::ExtensionNotFound {
                identifier: id.to_string(),
            })
    }

    /// When the catalog data was last refreshed.
    pub async fn latest_update(&self) -> Result<Option<DateTime<Utc>>, CoreError> {
        let raw = self.client.latest_update().await?;
        Ok(raw.as_deref().and_then(parse_timestamp))
    }
}

impl QueryService for RestQueryService {
    async fn query(&self, query: &RemoteQuery) -> Result<FetchedPage, CoreError> {
        let page = self.client.query_extensions(query).await?;
        Ok(FetchedPage {
            items: page.data.into_iter().map(ListItem::from).collect(),
            total_count: page.total_count,
        })
    }
}

// ── In-memory catalog ────────────────────────────────────────────────

/// An in-process catalog that answers `RemoteQuery`s the way the REST
/// endpoint would: filters AND-ed, nulls last on ascending order, window
/// applied after sorting, exact total.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    items: Vec<DetailItem>,
}

impl MemoryCatalog {
    pub fn new(items: Vec<DetailItem>) -> Self {
        Self { items }
    }

    /// Parse a JSON array of extension records.
    pub fn from_json(raw: &str) -> Result<Self, CoreError> {
        let items: Vec<DetailItem> =
            serde_json::from_str(raw).map_err(|e| CoreError::MalformedData {
                message: format!("invalid catalog fixture: {e}"),
            })?;
        Ok(Self::new(items))
    }

    /// Load a JSON fixture from disk.
    pub fn from_path(path: &Path) -> Result<Self, CoreError> {
        let raw = std::fs::read_to_string(path).map_err(|e| CoreError::Config {
            message: format!("cannot read fixture {}: {e}", path.display()),
        })?;
        Self::from_json(&raw)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: ItemId) -> Option<&DetailItem> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn detail(&self, id: ItemId) -> Result<DetailItem, CoreError> {
        self.get(id)
            .cloned()
            .ok_or_else(|| CoreError::ExtensionNotFound {
                identifier: id.to_string(),
            })
    }

    /// Most recent `last_updated` in the catalog.
    pub fn latest_update(&self) -> Option<DateTime<Utc>> {
        self.items.iter().filter_map(|i| i.item.last_updated).max()
    }

    /// Evaluate `query` synchronously.
    pub fn evaluate(&self, query: &RemoteQuery) -> FetchedPage {
        let mut matched: Vec<&DetailItem> = self
            .items
            .iter()
            .filter(|item| query.filters.iter().all(|f| matches_filter(item, f)))
            .collect();

        matched.sort_by(|a, b| compare_by(a, b, &query.order));

        let total_count = u64::try_from(matched.len()).unwrap_or(u64::MAX);
        let offset = usize::try_from(query.offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(query.limit).unwrap_or(usize::MAX);

        let items = matched
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|d| d.item.clone())
            .collect();

        FetchedPage { items, total_count }
    }
}

impl QueryService for MemoryCatalog {
    async fn query(&self, query: &RemoteQuery) -> Result<FetchedPage, CoreError> {
        let page = self.evaluate(query);
        debug!(
            offset = query.offset,
            returned = page.items.len(),
            total = page.total_count,
            "memory catalog query"
        );
        Ok(page)
    }
}

// ── Evaluation helpers ───────────────────────────────────────────────

enum Cell<'a> {
    Int(u64),
    Text(Option<&'a str>),
    Time(Option<DateTime<Utc>>),
    List(&'a [String]),
}

fn cell(item: &DetailItem, column: Column) -> Cell<'_> {
    let list = &item.item;
    match column {
        Column::Id => Cell::Int(list.id.get()),
        Column::Name => Cell::Text(Some(&list.name)),
        Column::Description => Cell::Text(list.description.as_deref()),
        Column::Summary => Cell::Text(list.summary.as_deref()),
        Column::Author => Cell::Text(list.author.as_deref()),
        Column::Category => Cell::Text(list.category.as_deref()),
        Column::GithubStars => Cell::Int(list.github_stars),
        Column::DownloadCountMonth => Cell::Int(list.download_count_month),
        Column::DownloadCountTotal => Cell::Int(list.download_count_total),
        Column::LastUpdated => Cell::Time(list.last_updated),
        Column::LabVersions => Cell::List(&item.lab_versions),
    }
}

fn matches_filter(item: &DetailItem, filter: &Filter) -> bool {
    match filter {
        Filter::Eq { column, value } => match cell(item, *column) {
            Cell::Int(n) => value.parse::<u64>().is_ok_and(|v| v == n),
            Cell::Text(text) => text == Some(value.as_str()),
            Cell::Time(_) | Cell::List(_) => false,
        },
        Filter::Gte { column, bound } => {
            compare_to_bound(item, *column, bound).is_some_and(Ordering::is_ge)
        }
        Filter::Lt { column, bound } => {
            compare_to_bound(item, *column, bound).is_some_and(Ordering::is_lt)
        }
        Filter::Contains { column, value } => match cell(item, *column) {
            Cell::List(values) => values.iter().any(|v| v == value),
            _ => false,
        },
        Filter::AnyILike { columns, needle } => {
            let needle = needle.to_lowercase();
            columns.iter().any(|column| match cell(item, *column) {
                Cell::Text(Some(text)) => text.to_lowercase().contains(&needle),
                _ => false,
            })
        }
    }
}

/// `None` when the cell is null or not comparable with the bound.
fn compare_to_bound(item: &DetailItem, column: Column, bound: &Bound) -> Option<Ordering> {
    match (cell(item, column), bound) {
        (Cell::Int(n), Bound::Int(b)) => Some(n.cmp(b)),
        (Cell::Time(Some(t)), Bound::Time(b)) => Some(t.cmp(b)),
        _ => None,
    }
}

fn compare_by(a: &DetailItem, b: &DetailItem, order: &[OrderBy]) -> Ordering {
    order
        .iter()
        .map(|term| {
            let ord = compare_cells(&cell(a, term.column), &cell(b, term.column));
            match term.direction {
                Direction::Asc => ord,
                Direction::Desc => ord.reverse(),
            }
        })
        .find(|ord| ord.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Ascending comparison with nulls sorting after every value.
fn compare_cells(a: &Cell<'_>, b: &Cell<'_>) -> Ordering {
    match (a, b) {
        (Cell::Int(x), Cell::Int(y)) => x.cmp(y),
        (Cell::Text(x), Cell::Text(y)) => nulls_last(*x, *y, |x, y| {
            x.to_lowercase()
                .cmp(&y.to_lowercase())
                .then_with(|| x.cmp(y))
        }),
        (Cell::Time(x), Cell::Time(y)) => nulls_last(*x, *y, |x, y| x.cmp(&y)),
        (Cell::List(x), Cell::List(y)) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

fn nulls_last<T>(a: Option<T>, b: Option<T>, cmp: impl FnOnce(T, T) -> Ordering) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => cmp(x, y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
