//! Browse command: drives a feed controller page by page.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use indicatif::ProgressBar;
use tabled::Tabled;

use extmarket_config::FilePersistence;
use extmarket_core::{
    Category, CoreError, FeedConfig, FeedController, FeedState, FeedView, ListItem,
    MemoryCatalog, Persistence, PreferenceOverrides, Preferences, QueryParameters, QueryService,
    RequestSequencer, VersionTag,
};

use crate::cli::BrowseArgs;
use crate::error::CliError;
use crate::output::{self, Painter};

use super::Context;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ExtensionRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Author")]
    author: String,
    #[tabled(rename = "Stars")]
    stars: String,
    #[tabled(rename = "Downloads/mo")]
    downloads: String,
    #[tabled(rename = "Updated")]
    updated: String,
}

impl ExtensionRow {
    fn new(item: &ListItem, now: DateTime<Utc>) -> Self {
        Self {
            id: item.id.to_string(),
            name: output::truncate(&item.name, 40),
            category: item.category.clone().unwrap_or_default(),
            author: output::truncate(item.author.as_deref().unwrap_or_default(), 24),
            stars: item.github_stars.to_string(),
            downloads: item.download_count_month.to_string(),
            updated: item
                .relative_update_label(now)
                .map(|label| label.trim_start_matches("Updated ").to_owned())
                .unwrap_or_default(),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: BrowseArgs, ctx: &Context) -> Result<(), CliError> {
    let feed_config = ctx.config.to_feed_config()?;
    let store: Arc<dyn Persistence> = Arc::new(FilePersistence::at_default_path());

    let version = args
        .version
        .as_deref()
        .map(VersionTag::parse_choice)
        .transpose()
        .map_err(|e| CliError::Validation {
            field: "lab-version".into(),
            reason: e.to_string(),
        })?;

    // Explicit choices win over saved ones and are remembered for next time
    let prefs = Preferences::new(store.as_ref());
    let params = prefs.resolve(PreferenceOverrides {
        search_text: args.search,
        category: args.category.as_deref().and_then(Category::parse),
        sort: args.sort,
        version,
    });
    if let Some(sort) = args.sort {
        prefs.save_sort(sort);
    }
    if let Some(version) = version {
        prefs.save_version(version);
    }

    let progress = ctx.spinner();
    let view = match &args.source.fixture {
        Some(path) => {
            let catalog = MemoryCatalog::from_path(path)?;
            tracing::info!(items = catalog.len(), path = %path.display(), "loaded catalog fixture");
            drive(Arc::new(catalog), store, feed_config, params, args.pages, &progress).await
        }
        None => {
            let service = ctx.rest_service()?;
            drive(Arc::new(service), store, feed_config, params, args.pages, &progress).await
        }
    };
    progress.finish_and_clear();
    let view = view?;

    if let Some(message) = &view.error_message {
        // First-page failure leaves nothing to show
        if view.items.is_empty() {
            return Err(CliError::FeedFailed {
                message: message.clone(),
            });
        }
        if !ctx.quiet {
            eprintln!("{}", ctx.painter.warning(message));
        }
    }

    let now = Utc::now();
    let painter = ctx.painter;
    let out = output::render_single(
        ctx.format,
        &view,
        |v| render_feed(v, now, painter),
        |v| {
            v.items
                .iter()
                .map(|item| item.id.to_string())
                .collect::<Vec<_>>()
                .join("\n")
        },
    )?;
    output::print_output(&out, ctx.quiet);
    Ok(())
}

// ── Feed driving ────────────────────────────────────────────────────

async fn drive<S: QueryService>(
    service: Arc<S>,
    store: Arc<dyn Persistence>,
    config: FeedConfig,
    params: QueryParameters,
    pages: u64,
    progress: &ProgressBar,
) -> Result<FeedView, CliError> {
    let feed = FeedController::spawn(service, store, RequestSequencer::new(), config, params);
    let result = scroll_pages(&feed, pages, progress).await;
    feed.shutdown().await;
    result
}

/// Load pages until `pages` are in, the catalog runs out, or a page fails.
///
/// Every row is printed, so after each page the last item sits at the
/// bottom edge of the viewport and the scroll trigger fires.
async fn scroll_pages(
    feed: &FeedController,
    pages: u64,
    progress: &ProgressBar,
) -> Result<FeedView, CliError> {
    let mut stream = feed.subscribe();
    let mut trigger = feed.scroll_trigger();

    progress.set_message("Loading extensions...");
    let mut view = stream.settled().await.ok_or(CoreError::Shutdown)?;

    while view.page_index + 1 < pages && view.state == FeedState::Loaded && view.has_more {
        trigger.observe(view.last_item().map(|item| item.id), view.revision);
        if !trigger.update(0) {
            break;
        }

        let before = view.page_index;
        progress.set_message(format!(
            "Loading more extensions... ({} of {})",
            view.items.len(),
            view.total_count
        ));
        feed.load_next_page()?;
        view = stream
            .wait_for(|v| !v.is_loading && (v.page_index > before || v.error_message.is_some()))
            .await
            .ok_or(CoreError::Shutdown)?;
    }

    trigger.disconnect();
    Ok(view)
}

// ── Rendering ───────────────────────────────────────────────────────

fn render_feed(view: &FeedView, now: DateTime<Utc>, painter: Painter) -> String {
    if view.is_empty_result() {
        return view.status_announcement.clone();
    }

    let rows: Vec<ExtensionRow> = view
        .items
        .iter()
        .map(|item| ExtensionRow::new(item, now))
        .collect();

    let mut out = painter.heading(&view.heading());
    out.push('\n');
    out.push_str(&output::render_table(&rows));
    out.push('\n');
    out.push_str(&painter.muted(&view.status_announcement));
    if view.has_more {
        out.push_str(&painter.muted(" (use --pages to load more)"));
    }
    out
}
