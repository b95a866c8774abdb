// ── Catalog wire types ──
//
// Row shapes returned by the `extensions` table. Timestamps stay as raw
// strings here; `extmarket-core` parses them into `DateTime<Utc>`.

use serde::{Deserialize, Serialize};

/// Columns fetched for list views.
pub const LIST_COLUMNS: &str = "id,name,description,summary,author,category,logo_url,\
github_stars,download_count_month,download_count_total,last_updated";

/// One page of rows plus the exact total reported by the endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub offset: u64,
    pub limit: u64,
    pub total_count: u64,
    pub data: Vec<T>,
}

/// Lightweight row for list/grid rendering, from `select=LIST_COLUMNS`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtensionRow {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub github_stars: u64,
    #[serde(default)]
    pub download_count_month: u64,
    #[serde(default)]
    pub download_count_total: u64,
    #[serde(default)]
    pub last_updated: Option<String>,
}

/// Full row for the detail view, from `select=*`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtensionDetailRow {
    #[serde(flatten)]
    pub row: ExtensionRow,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub license: Option<String>,
    #[serde(default)]
    pub pypi_url: Option<String>,
    #[serde(default)]
    pub github_url: Option<String>,
    #[serde(default)]
    pub github_forks: u64,
    #[serde(default)]
    pub github_issues: u64,
    #[serde(default)]
    pub download_count_week: u64,
    #[serde(default)]
    pub download_count_day: u64,
    #[serde(default)]
    pub lab_versions: Vec<String>,
}

/// Projection used by the data-freshness lookup.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct LastUpdatedRow {
    #[serde(default)]
    pub last_updated: Option<String>,
}
