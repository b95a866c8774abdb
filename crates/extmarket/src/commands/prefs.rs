//! Prefs subcommand handlers.

use std::collections::BTreeMap;

use serde::Serialize;

use extmarket_config::FilePersistence;
use extmarket_core::prefs::{SORT_KEY, VERSION_KEY};
use extmarket_core::{Persistence, Preferences, VersionTag};

use crate::cli::{PrefsArgs, PrefsCommand};
use crate::error::CliError;
use crate::output;

use super::Context;

/// Saved preferences as stored, next to what a browse would start with.
#[derive(Debug, Serialize)]
struct PrefsView {
    path: String,
    sort: String,
    version: String,
    /// Raw stored entries, including ones this version doesn't understand.
    stored: BTreeMap<String, String>,
}

pub fn handle(args: PrefsArgs, ctx: &Context) -> Result<(), CliError> {
    let store = FilePersistence::at_default_path();
    let prefs = Preferences::new(&store);

    match args.command {
        PrefsCommand::Show => {
            let saved = prefs.load();
            let view = PrefsView {
                path: store.path().display().to_string(),
                sort: saved.sort.unwrap_or_default().as_str().to_owned(),
                version: VersionTag::choice_str(saved.version.flatten()).to_owned(),
                stored: store.entries()?,
            };
            let out = output::render_single(
                ctx.format,
                &view,
                |v| {
                    output::render_fields(&[
                        ("File", v.path.clone()),
                        ("Sort", v.sort.clone()),
                        ("JupyterLab", v.version.clone()),
                    ])
                },
                |v| format!("sort={}\nversion={}", v.sort, v.version),
            )?;
            output::print_output(&out, ctx.quiet);
            Ok(())
        }

        PrefsCommand::Set { sort, version } => {
            if sort.is_none() && version.is_none() {
                return Err(CliError::Validation {
                    field: "prefs".into(),
                    reason: "pass --sort and/or --lab-version".into(),
                });
            }
            let version = version
                .as_deref()
                .map(VersionTag::parse_choice)
                .transpose()
                .map_err(|e| CliError::Validation {
                    field: "lab-version".into(),
                    reason: e.to_string(),
                })?;

            // Write directly so a read-only store is reported, not swallowed
            if let Some(sort) = sort {
                store_value(&store, SORT_KEY, sort.as_str())?;
            }
            if let Some(version) = version {
                store_value(&store, VERSION_KEY, VersionTag::choice_str(version))?;
            }
            if !ctx.quiet {
                eprintln!("Saved preferences to {}", store.path().display());
            }
            Ok(())
        }

        PrefsCommand::Clear => {
            prefs.clear();
            if !ctx.quiet {
                eprintln!("Cleared saved preferences");
            }
            Ok(())
        }
    }
}

fn store_value(store: &FilePersistence, key: &str, value: &str) -> Result<(), CliError> {
    store.save(key, value).map_err(|e| CliError::Validation {
        field: "preferences".into(),
        reason: e.to_string(),
    })
}
