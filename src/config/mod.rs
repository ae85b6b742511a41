// Configuration module

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::ConfigError;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub client: ClientConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub offline: OfflineConfig,
}

impl Config {
    /// Load configuration from a YAML file and validate it.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        config.validate().map_err(ConfigError::Invalid)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        self.cache.validate()?;
        self.offline.validate()?;
        Ok(())
    }
}

/// API client settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ClientConfig {
    /// Base URL prepended by the typed endpoint helpers. Empty means the
    /// caller passes absolute URLs to `fetch_data` directly.
    #[serde(default)]
    pub base_url: String,
}

/// Request cache TTL categories and maintenance interval.
///
/// TTLs are per resource class, classified from the request URL. The
/// classification precedence lives in `cache::ttl`; this struct only carries
/// the durations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Collection listings and single-collection detail (default 30 min).
    #[serde(default = "default_collections_ttl_secs")]
    pub collections_ttl_secs: u64,
    /// Full card listings (default 20 min).
    #[serde(default = "default_cards_ttl_secs")]
    pub cards_ttl_secs: u64,
    /// Per-collection card listings (default 15 min).
    #[serde(default = "default_collection_cards_ttl_secs")]
    pub collection_cards_ttl_secs: u64,
    /// Single-card detail (default 10 min).
    #[serde(default = "default_card_detail_ttl_secs")]
    pub card_detail_ttl_secs: u64,
    /// Unclassified GET requests (default 10 min).
    #[serde(default = "default_default_ttl_secs")]
    pub default_ttl_secs: u64,
    /// Interval of the periodic expired-entry sweep (default 5 min).
    #[serde(default = "default_cleanup_interval_secs")]
    pub cleanup_interval_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            collections_ttl_secs: default_collections_ttl_secs(),
            cards_ttl_secs: default_cards_ttl_secs(),
            collection_cards_ttl_secs: default_collection_cards_ttl_secs(),
            card_detail_ttl_secs: default_card_detail_ttl_secs(),
            default_ttl_secs: default_default_ttl_secs(),
            cleanup_interval_secs: default_cleanup_interval_secs(),
        }
    }
}

fn default_collections_ttl_secs() -> u64 {
    30 * 60
}

fn default_cards_ttl_secs() -> u64 {
    20 * 60
}

fn default_collection_cards_ttl_secs() -> u64 {
    15 * 60
}

fn default_card_detail_ttl_secs() -> u64 {
    10 * 60
}

fn default_default_ttl_secs() -> u64 {
    10 * 60
}

fn default_cleanup_interval_secs() -> u64 {
    5 * 60
}

impl CacheConfig {
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }

    pub fn validate(&self) -> Result<(), String> {
        let ttls = [
            ("collections_ttl_secs", self.collections_ttl_secs),
            ("cards_ttl_secs", self.cards_ttl_secs),
            ("collection_cards_ttl_secs", self.collection_cards_ttl_secs),
            ("card_detail_ttl_secs", self.card_detail_ttl_secs),
            ("default_ttl_secs", self.default_ttl_secs),
            ("cleanup_interval_secs", self.cleanup_interval_secs),
        ];
        for (name, value) in ttls {
            if value == 0 {
                return Err(format!("{} must be greater than zero", name));
            }
        }
        Ok(())
    }
}

/// Offline resource cache settings: versioned bucket names, the static
/// resources fetched at install time, and per-bucket trim caps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfflineConfig {
    /// Generic bucket: precached static assets plus network-first fallbacks.
    #[serde(default = "default_cache_name")]
    pub cache_name: String,
    /// Generic image bucket.
    #[serde(default = "default_image_cache_name")]
    pub image_cache_name: String,
    /// Card image bucket.
    #[serde(default = "default_card_cache_name")]
    pub card_cache_name: String,
    /// Resources fetched and stored during install. Any failure fails the
    /// install.
    #[serde(default = "default_precache")]
    pub precache: Vec<String>,
    /// Maximum entries kept in the image bucket after a trim.
    #[serde(default = "default_image_cache_cap")]
    pub image_cache_cap: usize,
    /// Maximum entries kept in the card bucket after a trim.
    #[serde(default = "default_card_cache_cap")]
    pub card_cache_cap: usize,
    /// Requests under this prefix are never intercepted.
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,
    /// Requests under this prefix are treated as static resources.
    #[serde(default = "default_static_prefix")]
    pub static_prefix: String,
}

impl Default for OfflineConfig {
    fn default() -> Self {
        Self {
            cache_name: default_cache_name(),
            image_cache_name: default_image_cache_name(),
            card_cache_name: default_card_cache_name(),
            precache: default_precache(),
            image_cache_cap: default_image_cache_cap(),
            card_cache_cap: default_card_cache_cap(),
            api_prefix: default_api_prefix(),
            static_prefix: default_static_prefix(),
        }
    }
}

fn default_cache_name() -> String {
    "lore-cache-v2".to_string()
}

fn default_image_cache_name() -> String {
    "lore-images-v2".to_string()
}

fn default_card_cache_name() -> String {
    "lore-cards-v1".to_string()
}

fn default_precache() -> Vec<String> {
    vec![
        "/static/css/style.css".to_string(),
        "/static/js/header.js".to_string(),
        "/static/assets/icons/favicon.ico".to_string(),
    ]
}

fn default_image_cache_cap() -> usize {
    200
}

fn default_card_cache_cap() -> usize {
    500
}

fn default_api_prefix() -> String {
    "/api/".to_string()
}

fn default_static_prefix() -> String {
    "/static/".to_string()
}

impl OfflineConfig {
    pub fn validate(&self) -> Result<(), String> {
        let names = [
            &self.cache_name,
            &self.image_cache_name,
            &self.card_cache_name,
        ];
        for name in names {
            if name.is_empty() {
                return Err("bucket names cannot be empty".to_string());
            }
        }
        if self.cache_name == self.image_cache_name
            || self.cache_name == self.card_cache_name
            || self.image_cache_name == self.card_cache_name
        {
            return Err("bucket names must be distinct".to_string());
        }
        if self.image_cache_cap == 0 || self.card_cache_cap == 0 {
            return Err("bucket caps must be greater than zero".to_string());
        }
        Ok(())
    }
}
