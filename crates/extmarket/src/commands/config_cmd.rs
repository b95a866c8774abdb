//! Config subcommand handlers.

use extmarket_config::{self as config, Config};

use crate::cli::{ConfigArgs, ConfigCommand};
use crate::error::CliError;
use crate::output;

use super::Context;

/// Copy of `cfg` safe to print: plaintext secrets masked.
fn redacted(cfg: &Config) -> Config {
    let mut cfg = cfg.clone();
    if cfg.endpoint.api_key.is_some() {
        cfg.endpoint.api_key = Some("****".into());
    }
    cfg
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: &ConfigArgs, ctx: &Context) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), ctx.quiet);
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = redacted(&ctx.config);
            let toml_text = toml::to_string_pretty(&cfg).map_err(config::ConfigError::from)?;
            let out = output::render_single(
                ctx.format,
                &cfg,
                |_| toml_text.trim_end().to_owned(),
                |c| c.endpoint.url.clone().unwrap_or_default(),
            )?;
            output::print_output(&out, ctx.quiet);
            Ok(())
        }
    }
}
