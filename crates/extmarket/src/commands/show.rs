//! Show command: one extension in full.

use chrono::{DateTime, Utc};
use serde::Serialize;

use extmarket_core::{DetailItem, ItemId, MemoryCatalog};

use crate::cli::ShowArgs;
use crate::error::CliError;
use crate::output::{self, Painter};

use super::Context;

/// Detail record plus the values derived from it at display time.
#[derive(Debug, Serialize)]
struct ExtensionDetail {
    #[serde(flatten)]
    detail: DetailItem,
    trending_score: f64,
    updated: Option<String>,
}

impl ExtensionDetail {
    fn new(detail: DetailItem, now: DateTime<Utc>) -> Self {
        Self {
            trending_score: detail.trending_score(now),
            updated: detail.item.relative_update_label(now),
            detail,
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: &ShowArgs, ctx: &Context) -> Result<(), CliError> {
    let id = ItemId::new(args.id);
    let detail = match &args.source.fixture {
        Some(path) => MemoryCatalog::from_path(path)?.detail(id)?,
        None => ctx.rest_service()?.detail(id).await?,
    };

    let view = ExtensionDetail::new(detail, Utc::now());
    let painter = ctx.painter;
    let out = output::render_single(
        ctx.format,
        &view,
        |v| render_detail(v, painter),
        |v| v.detail.item.name.clone(),
    )?;
    output::print_output(&out, ctx.quiet);
    Ok(())
}

fn render_detail(view: &ExtensionDetail, painter: Painter) -> String {
    let d = &view.detail;
    let item = &d.item;
    let opt = |value: Option<&str>| value.unwrap_or_default().to_owned();

    let title = match &d.version {
        Some(version) => format!("{} {version}", item.name),
        None => item.name.clone(),
    };

    let fields = output::render_fields(&[
        ("ID", item.id.to_string()),
        ("Author", opt(item.author.as_deref())),
        ("Category", opt(item.category.as_deref())),
        ("License", opt(d.license.as_deref())),
        ("JupyterLab", d.lab_versions.join(", ")),
        ("Stars", item.github_stars.to_string()),
        ("Forks", d.github_forks.to_string()),
        ("Open issues", d.github_issues.to_string()),
        (
            "Downloads",
            format!(
                "{} today, {} this week, {} this month, {} total",
                d.download_count_day,
                d.download_count_week,
                item.download_count_month,
                item.download_count_total
            ),
        ),
        ("Trending", format!("{:.1}", view.trending_score)),
        ("Updated", opt(view.updated.as_deref())),
        ("PyPI", opt(d.pypi_url.as_deref())),
        ("GitHub", opt(d.github_url.as_deref())),
    ]);

    let mut out = painter.heading(&title);
    if let Some(blurb) = item.blurb() {
        out.push('\n');
        out.push_str(&painter.muted(blurb));
    }
    out.push_str("\n\n");
    out.push_str(&fields);
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixture() -> DetailItem {
        serde_json::from_value(serde_json::json!({
            "id": 3,
            "name": "jupyterlab-git",
            "summary": "A Git extension for JupyterLab",
            "github_stars": 10,
            "download_count_day": 2,
            "last_updated": "2024-03-01T00:00:00Z",
            "lab_versions": ["3", "4"]
        }))
        .unwrap()
    }

    #[test]
    fn detail_carries_derived_values() {
        let now = Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap();
        let view = ExtensionDetail::new(fixture(), now);
        // 2 * 50 + 10 * (30 / 2)
        assert!((view.trending_score - 250.0).abs() < f64::EPSILON);
        assert_eq!(view.updated.as_deref(), Some("Updated yesterday"));

        let text = render_detail(&view, Painter::new(false));
        assert!(text.starts_with("jupyterlab-git\nA Git extension for JupyterLab"));
        assert!(text.contains("JupyterLab  3, 4"));
    }
}
