// ── Catalog items ──
//
// `ListItem` is the lightweight projection rendered in the feed.
// `DetailItem` adds the fields only the detail view needs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ItemId;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// One row of the result feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListItem {
    pub id: ItemId,
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
    pub last_updated: Option<DateTime<Utc>>,
}

impl ListItem {
    /// Human label for `last_updated`, relative to `now`.
    ///
    /// Under a day reads "Updated today", under a month counts days or
    /// weeks, anything older shows the calendar date.
    pub fn relative_update_label(&self, now: DateTime<Utc>) -> Option<String> {
        let updated = self.last_updated?;
        let days = (now - updated).num_days();

        let label = match days {
            i64::MIN..=0 => "Updated today".to_owned(),
            1 => "Updated yesterday".to_owned(),
            2..=6 => format!("Updated {days} days ago"),
            7..=29 => {
                let weeks = days / 7;
                let unit = if weeks == 1 { "week" } else { "weeks" };
                format!("Updated {weeks} {unit} ago")
            }
            _ => format!("Updated {}", updated.format("%b %-d, %Y")),
        };
        Some(label)
    }

    /// First non-empty of summary and description.
    pub fn blurb(&self) -> Option<&str> {
        self.summary
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .or_else(|| self.description.as_deref().filter(|s| !s.trim().is_empty()))
    }
}

/// Everything known about one extension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailItem {
    #[serde(flatten)]
    pub item: ListItem,
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
    /// JupyterLab major versions the extension supports ("3", "4").
    #[serde(default)]
    pub lab_versions: Vec<String>,
}

impl DetailItem {
    pub fn id(&self) -> ItemId {
        self.item.id
    }

    /// Popularity score weighting recent downloads heavily and stars by
    /// how recently the extension was updated.
    ///
    /// `day*50 + week*20 + month*5 + stars * max(1, 30 / (days_since_update + 1))`
    #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
    pub fn trending_score(&self, now: DateTime<Utc>) -> f64 {
        let update_factor = self.item.last_updated.map_or(1.0, |updated| {
            let days = (now - updated).num_seconds() as f64 / SECONDS_PER_DAY;
            (30.0 / (days + 1.0)).max(1.0)
        });

        self.download_count_day as f64 * 50.0
            + self.download_count_week as f64 * 20.0
            + self.item.download_count_month as f64 * 5.0
            + self.item.github_stars as f64 * update_factor
    }

    /// Whether the extension declares support for `tag`.
    pub fn supports(&self, tag: &str) -> bool {
        self.lab_versions.iter().any(|v| v == tag)
    }
}

impl From<DetailItem> for ListItem {
    fn from(detail: DetailItem) -> Self {
        detail.item
    }
}
