use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::cheapshark::{self, DealSort};
use crate::fetch;
use crate::gamerpower::{self, Platform};
use crate::news::{self, NewsCategory};
use crate::scheduler;

const DEFAULT_ENV_PREFIX: &str = "GAMEDEALS";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub refresh: RefreshConfig,
    #[serde(default)]
    pub ui: UIConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourcesConfig {
    #[serde(default = "default_giveaways_url")]
    pub giveaways_url: String,
    #[serde(default = "default_deals_url")]
    pub deals_url: String,
    #[serde(default = "default_stores_url")]
    pub stores_url: String,
    #[serde(default = "default_redirect_url")]
    pub redirect_url: String,
    #[serde(default = "default_news_url")]
    pub news_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
    #[serde(default)]
    pub deals_store_id: String,
    #[serde(default = "default_page_size")]
    pub deals_page_size: u32,
    #[serde(default = "default_news_limit")]
    pub news_limit: usize,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            giveaways_url: default_giveaways_url(),
            deals_url: default_deals_url(),
            stores_url: default_stores_url(),
            redirect_url: default_redirect_url(),
            news_url: default_news_url(),
            user_agent: default_user_agent(),
            timeout: default_timeout(),
            deals_store_id: String::new(),
            deals_page_size: default_page_size(),
            news_limit: default_news_limit(),
        }
    }
}

fn default_giveaways_url() -> String {
    gamerpower::GIVEAWAYS_URL.to_string()
}

fn default_deals_url() -> String {
    cheapshark::DEALS_URL.to_string()
}

fn default_stores_url() -> String {
    cheapshark::STORES_URL.to_string()
}

fn default_redirect_url() -> String {
    cheapshark::REDIRECT_URL.to_string()
}

fn default_news_url() -> String {
    news::SEARCH_URL.to_string()
}

fn default_user_agent() -> String {
    format!("gamedeals-tui/{}", crate::VERSION)
}

fn default_timeout() -> Duration {
    fetch::DEFAULT_TIMEOUT
}

fn default_page_size() -> u32 {
    cheapshark::DEFAULT_PAGE_SIZE
}

fn default_news_limit() -> usize {
    news::DEFAULT_LIMIT
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RefreshConfig {
    #[serde(default = "default_refresh_interval", with = "humantime_serde")]
    pub interval: Duration,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval: default_refresh_interval(),
        }
    }
}

fn default_refresh_interval() -> Duration {
    scheduler::DEFAULT_REFRESH_INTERVAL
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct UIConfig {
    #[serde(default)]
    pub platform: Platform,
    #[serde(default)]
    pub deal_sort: DealSort,
    #[serde(default)]
    pub news_category: NewsCategory,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_directory")]
    pub directory: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: default_log_directory(),
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_directory() -> Option<PathBuf> {
    dirs::cache_dir().map(|dir| dir.join("gamedeals-tui").join("logs"))
}

#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    pub config_file: Option<PathBuf>,
    pub env_prefix: Option<String>,
}

pub fn load(options: LoadOptions) -> Result<Config> {
    let mut cfg = Config::default();

    if let Some(path) = options.config_file.as_ref() {
        if path.exists() {
            let from_file = read_config_file(path)?;
            cfg = merge_config(cfg, from_file);
        }
    } else if let Some(default_path) = default_config_path() {
        if default_path.exists() {
            let from_file = read_config_file(&default_path)?;
            cfg = merge_config(cfg, from_file);
        }
    }

    let prefix = options.env_prefix.as_deref().unwrap_or(DEFAULT_ENV_PREFIX);
    for (key, value) in load_env(prefix) {
        apply_env_value(&mut cfg, &key, value);
    }
    if cfg.sources.user_agent.trim().is_empty() {
        cfg.sources.user_agent = default_user_agent();
    }

    Ok(cfg)
}

fn read_config_file(path: &Path) -> Result<Config> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file at {}", path.display()))?;
    let config: Config = serde_yaml::from_str(&data)
        .with_context(|| format!("Failed to parse config file at {}", path.display()))?;
    Ok(config)
}

/// Layers a parsed file over `base`. Values equal to their defaults in `other`
/// are treated as unset. Environment overrides are applied key by key in
/// `load`, so they can set a value back to its default.
fn merge_config(mut base: Config, other: Config) -> Config {
    let defaults = Config::default();

    macro_rules! take_if_set {
        ($($section:ident . $field:ident),* $(,)?) => {
            $(
                if other.$section.$field != defaults.$section.$field {
                    base.$section.$field = other.$section.$field;
                }
            )*
        };
    }

    take_if_set!(
        sources.giveaways_url,
        sources.deals_url,
        sources.stores_url,
        sources.redirect_url,
        sources.news_url,
        sources.user_agent,
        sources.timeout,
        sources.deals_store_id,
        sources.deals_page_size,
        sources.news_limit,
        refresh.interval,
        ui.platform,
        ui.deal_sort,
        ui.news_category,
        logging.level,
        logging.directory,
    );

    base
}

/// Variables under `prefix`, keyed as `section.field`.
fn load_env(prefix: &str) -> HashMap<String, String> {
    let mut map: HashMap<String, String> = HashMap::new();
    let upper_prefix = format!("{}_", prefix.to_uppercase());

    for (key, value) in env::vars() {
        if let Some(stripped) = key.strip_prefix(&upper_prefix) {
            let normalized = stripped.to_ascii_lowercase().replace("__", ".");
            map.insert(normalized, value);
        }
    }
    map
}

fn apply_env_value(cfg: &mut Config, key: &str, value: String) {
    match key {
        "sources.giveaways_url" => cfg.sources.giveaways_url = value,
        "sources.deals_url" => cfg.sources.deals_url = value,
        "sources.stores_url" => cfg.sources.stores_url = value,
        "sources.redirect_url" => cfg.sources.redirect_url = value,
        "sources.news_url" => cfg.sources.news_url = value,
        "sources.user_agent" => cfg.sources.user_agent = value,
        "sources.deals_store_id" => cfg.sources.deals_store_id = value.trim().to_string(),
        "sources.timeout" => {
            if let Ok(duration) = humantime::parse_duration(&value) {
                cfg.sources.timeout = duration;
            }
        }
        "sources.deals_page_size" => {
            if let Ok(parsed) = value.parse::<u32>() {
                cfg.sources.deals_page_size = parsed;
            }
        }
        "sources.news_limit" => {
            if let Ok(parsed) = value.parse::<usize>() {
                cfg.sources.news_limit = parsed;
            }
        }
        "refresh.interval" => {
            if let Ok(duration) = humantime::parse_duration(&value) {
                cfg.refresh.interval = duration;
            }
        }
        "ui.platform" => {
            if let Some(platform) = Platform::from_key(&value) {
                cfg.ui.platform = platform;
            }
        }
        "ui.deal_sort" => {
            if let Some(sort) = DealSort::from_key(&value) {
                cfg.ui.deal_sort = sort;
            }
        }
        "ui.news_category" => {
            if let Some(category) = NewsCategory::from_key(&value) {
                cfg.ui.news_category = category;
            }
        }
        "logging.level" => cfg.logging.level = value,
        "logging.directory" => cfg.logging.directory = Some(PathBuf::from(value)),
        _ => {}
    }
}

pub fn default_path() -> Option<PathBuf> {
    default_config_path()
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("gamedeals-tui").join("config.yaml"))
}
