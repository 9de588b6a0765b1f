use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use log::{info, warn};

use crate::cheapshark;
use crate::config;
use crate::data::{DealService, GiveawayService, NewsService};
use crate::fetch::ClientConfig;
use crate::gamerpower;
use crate::logging;
use crate::news;
use crate::ui;

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Alternate config file; the platform config dir is used when absent.
    pub config_file: Option<PathBuf>,
}

pub fn run() -> Result<()> {
    run_with(RunOptions::default())
}

pub fn run_with(opts: RunOptions) -> Result<()> {
    let cfg = config::load(config::LoadOptions {
        config_file: opts.config_file.clone(),
        env_prefix: None,
    })
    .context("load config")?;
    let config_path = opts.config_file.or_else(config::default_path);
    let display_path = friendly_path(config_path.as_ref());

    let _logger = match logging::init(&cfg.logging) {
        Ok(handle) => Some(handle),
        Err(err) => {
            eprintln!("warning: logging disabled: {err:#}");
            None
        }
    };
    info!("gamedeals-tui {} starting, config {display_path}", crate::VERSION);

    let http = ClientConfig {
        user_agent: cfg.sources.user_agent.clone(),
        timeout: cfg.sources.timeout,
        http_client: None,
    };
    let client_config = ClientConfig {
        http_client: Some(http.http().context("build http client")?),
        ..http
    };

    let giveaways: Arc<dyn GiveawayService> = Arc::new(
        gamerpower::Client::new(&client_config, &cfg.sources.giveaways_url)
            .context("create gamerpower client")?,
    );
    let deals: Arc<dyn DealService> = Arc::new(
        cheapshark::Client::new(
            &client_config,
            &cheapshark::Endpoints {
                deals: cfg.sources.deals_url.clone(),
                stores: cfg.sources.stores_url.clone(),
                redirect: cfg.sources.redirect_url.clone(),
            },
        )
        .context("create cheapshark client")?,
    );
    let news: Arc<dyn NewsService> = Arc::new(
        news::Client::new(
            &client_config,
            &cfg.sources.news_url,
            cfg.sources.news_limit,
        )
        .context("create news client")?,
    );

    let options = ui::Options {
        giveaway_service: giveaways,
        deal_service: deals,
        news_service: news,
        refresh_interval: cfg.refresh.interval,
        platform: cfg.ui.platform,
        deal_sort: cfg.ui.deal_sort,
        deal_store_id: cfg.sources.deals_store_id.clone(),
        deal_page_size: cfg.sources.deals_page_size,
        news_category: cfg.ui.news_category,
        config_path: display_path,
    };

    let mut model = ui::Model::new(options);
    let result = model.run();
    if let Err(err) = &result {
        warn!("exiting with error: {err:#}");
    } else {
        info!("bye");
    }
    result
}

fn friendly_path(path: Option<&PathBuf>) -> String {
    if let Some(path) = path {
        if let Some(home) = dirs::home_dir() {
            if let Ok(stripped) = path.strip_prefix(&home) {
                let mut display = String::from("~");
                if !stripped.as_os_str().is_empty() {
                    display.push_str(&format!("/{}", stripped.display()));
                }
                return display;
            }
        }
        path.display().to_string()
    } else {
        "~/.config/gamedeals-tui/config.yaml".to_string()
    }
}
