//! Command handlers and the context they share.

pub mod browse;
pub mod config_cmd;
pub mod prefs;
pub mod show;

use std::io::IsTerminal;
use std::time::Duration;

use clap::ValueEnum;
use indicatif::{ProgressBar, ProgressStyle};
use secrecy::SecretString;

use extmarket_api::RestClient;
use extmarket_config::Config;
use extmarket_core::{CoreError, RestQueryService};

use crate::cli::{ColorMode, Command, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output::{self, Painter};

/// Settings resolved once per invocation: config file, then CLI flags.
pub struct Context {
    pub config: Config,
    pub format: OutputFormat,
    pub painter: Painter,
    pub quiet: bool,
    endpoint: Option<String>,
    api_key: Option<String>,
    timeout: Option<u64>,
}

impl Context {
    pub fn new(config: Config, global: &GlobalOpts) -> Self {
        let format = global
            .output
            .or_else(|| OutputFormat::from_str(&config.defaults.output, true).ok())
            .unwrap_or(OutputFormat::Table);
        let color = global
            .color
            .or_else(|| ColorMode::from_str(&config.defaults.color, true).ok())
            .unwrap_or(ColorMode::Auto);

        Self {
            format,
            painter: Painter::new(output::should_color(color)),
            quiet: global.quiet,
            endpoint: global.endpoint.clone(),
            api_key: global.api_key.clone(),
            timeout: global.timeout,
            config,
        }
    }

    /// REST-backed catalog service from config plus CLI overrides.
    pub fn rest_service(&self) -> Result<RestQueryService, CliError> {
        let url = self.config.endpoint_url(self.endpoint.as_deref())?;
        let api_key = match &self.api_key {
            Some(key) => SecretString::from(key.clone()),
            None => extmarket_config::resolve_api_key(&self.config.endpoint)?,
        };
        let transport = self.config.to_transport(self.timeout);
        let client =
            RestClient::from_api_key(&url, &api_key, &transport).map_err(CoreError::from)?;
        tracing::debug!(base = %client.base_url(), "catalog client ready");
        Ok(RestQueryService::new(client))
    }

    /// Spinner on stderr for interactive table output, hidden otherwise.
    pub fn spinner(&self) -> ProgressBar {
        if self.quiet || self.format != OutputFormat::Table || !std::io::stderr().is_terminal() {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
            bar.set_style(style);
        }
        bar.enable_steady_tick(Duration::from_millis(100));
        bar
    }
}

/// Route a parsed command to its handler.
pub async fn dispatch(command: Command, global: &GlobalOpts) -> Result<(), CliError> {
    // Config commands render whatever loads, even when the file is broken
    let ctx = match &command {
        Command::Config(_) => Context::new(extmarket_config::load_config_or_default(), global),
        _ => Context::new(extmarket_config::load_config()?, global),
    };

    tracing::debug!(command = ?command, "dispatching command");
    match command {
        Command::Browse(args) => browse::handle(args, &ctx).await,
        Command::Show(args) => show::handle(&args, &ctx).await,
        Command::Prefs(args) => prefs::handle(args, &ctx),
        Command::Config(args) => config_cmd::handle(&args, &ctx),
    }
}
