// ── API-to-domain type conversions ──
//
// Bridges raw `extmarket_api` rows into canonical `extmarket_core::model`
// types. Timestamps are parsed into `DateTime<Utc>`; unparseable values
// are dropped rather than failing the whole page.

use chrono::{DateTime, NaiveDateTime, Utc};

use extmarket_api::{ExtensionDetailRow, ExtensionRow};

use crate::model::{DetailItem, ItemId, ListItem};

// ── Helpers ────────────────────────────────────────────────────────

/// Parse a catalog timestamp.
///
/// Accepts RFC 3339 (`2025-03-01T10:00:00+00:00`) and the zone-less
/// Postgres form (`2025-03-01T10:00:00.123456`), the latter read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn parse_opt_timestamp(raw: Option<&String>) -> Option<DateTime<Utc>> {
    raw.and_then(|s| parse_timestamp(s))
}

// ── Row → model ────────────────────────────────────────────────────

impl From<ExtensionRow> for ListItem {
    fn from(row: ExtensionRow) -> Self {
        let last_updated = parse_opt_timestamp(row.last_updated.as_ref());
        Self {
            id: ItemId::new(row.id),
            name: row.name,
            description: row.description,
            summary: row.summary,
            author: row.author,
            category: row.category,
            logo_url: row.logo_url,
            github_stars: row.github_stars,
            download_count_month: row.download_count_month,
            download_count_total: row.download_count_total,
            last_updated,
        }
    }
}

impl From<ExtensionDetailRow> for DetailItem {
    fn from(row: ExtensionDetailRow) -> Self {
        Self {
            item: row.row.into(),
            version: row.version,
            license: row.license,
            pypi_url: row.pypi_url,
            github_url: row.github_url,
            github_forks: row.github_forks,
            github_issues: row.github_issues,
            download_count_week: row.download_count_week,
            download_count_day: row.download_count_day,
            lab_versions: row.lab_versions,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_rfc3339_with_offset() {
        let dt = parse_timestamp("2025-03-01T12:00:00+02:00").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap());
    }

    #[test]
    fn parses_zoneless_as_utc() {
        let dt = parse_timestamp("2025-03-01T10:00:00.123456").unwrap();
        assert_eq!(dt.timestamp(), 1_740_823_200);
        assert!(parse_timestamp("2025-03-01 10:00:00").is_some());
    }

    #[test]
    fn garbage_timestamp_is_dropped() {
        let row = ExtensionRow {
            id: 3,
            name: "x".into(),
            description: None,
            summary: None,
            author: None,
            category: None,
            logo_url: None,
            github_stars: 0,
            download_count_month: 0,
            download_count_total: 0,
            last_updated: Some("yesterday-ish".into()),
        };
        let item = ListItem::from(row);
        assert_eq!(item.id, ItemId::new(3));
        assert!(item.last_updated.is_none());
    }
}
