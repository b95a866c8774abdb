// ── Remote query description ──
//
// A fully-specified, backend-neutral description of one catalog page
// request: filter predicates, ordering, and an offset/limit window.
// `to_query_pairs` renders it in PostgREST query-string syntax.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

// ── Columns ──────────────────────────────────────────────────────────

/// Catalog columns that queries may filter or order on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Id,
    Name,
    Description,
    Summary,
    Author,
    Category,
    GithubStars,
    DownloadCountMonth,
    DownloadCountTotal,
    LastUpdated,
    LabVersions,
}

impl Column {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::Description => "description",
            Self::Summary => "summary",
            Self::Author => "author",
            Self::Category => "category",
            Self::GithubStars => "github_stars",
            Self::DownloadCountMonth => "download_count_month",
            Self::DownloadCountTotal => "download_count_total",
            Self::LastUpdated => "last_updated",
            Self::LabVersions => "lab_versions",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Ordering ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Asc,
    Desc,
}

/// One `ORDER BY` term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    pub column: Column,
    pub direction: Direction,
}

impl OrderBy {
    pub fn asc(column: Column) -> Self {
        Self {
            column,
            direction: Direction::Asc,
        }
    }

    pub fn desc(column: Column) -> Self {
        Self {
            column,
            direction: Direction::Desc,
        }
    }
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dir = match self.direction {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        };
        write!(f, "{}.{dir}", self.column)
    }
}

// ── Filters ──────────────────────────────────────────────────────────

/// A typed bound for range predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Bound {
    Int(u64),
    Time(DateTime<Utc>),
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Time(t) => f.write_str(&t.to_rfc3339_opts(SecondsFormat::Secs, true)),
        }
    }
}

/// A filter predicate. All predicates in a query are AND-ed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Filter {
    /// `column = value`
    Eq { column: Column, value: String },
    /// `column >= bound`
    Gte { column: Column, bound: Bound },
    /// `column < bound`
    Lt { column: Column, bound: Bound },
    /// Array column contains `value`.
    Contains { column: Column, value: String },
    /// Case-insensitive substring match on any of `columns`.
    AnyILike { columns: Vec<Column>, needle: String },
}

// ── RemoteQuery ──────────────────────────────────────────────────────

/// Everything the endpoint needs to serve one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteQuery {
    pub filters: Vec<Filter>,
    pub order: Vec<OrderBy>,
    pub offset: u64,
    pub limit: u64,
}

impl RemoteQuery {
    /// Render as PostgREST query parameters (without `select`).
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(self.filters.len() + 3);

        for filter in &self.filters {
            let pair = match filter {
                Filter::Eq { column, value } => (column.to_string(), format!("eq.{value}")),
                Filter::Gte { column, bound } => (column.to_string(), format!("gte.{bound}")),
                Filter::Lt { column, bound } => (column.to_string(), format!("lt.{bound}")),
                Filter::Contains { column, value } => {
                    (column.to_string(), format!("cs.{{{}}}", quote_value(value)))
                }
                Filter::AnyILike { columns, needle } => {
                    let pattern = quote_value(&format!("*{needle}*"));
                    let terms: Vec<String> = columns
                        .iter()
                        .map(|c| format!("{c}.ilike.{pattern}"))
                        .collect();
                    ("or".to_owned(), format!("({})", terms.join(",")))
                }
            };
            pairs.push(pair);
        }

        if !self.order.is_empty() {
            let order: Vec<String> = self.order.iter().map(ToString::to_string).collect();
            pairs.push(("order".to_owned(), order.join(",")));
        }

        pairs.push(("offset".to_owned(), self.offset.to_string()));
        pairs.push(("limit".to_owned(), self.limit.to_string()));
        pairs
    }
}

/// Double-quote a value for use inside PostgREST logic trees and arrays.
///
/// Reserved characters (`,` `.` `:` `(` `)`) are then taken literally;
/// embedded quotes and backslashes are backslash-escaped.
fn quote_value(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 2);
    out.push('"');
    for ch in raw.chars() {
        if ch == '"' || ch == '\\' {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('"');
    out
}
