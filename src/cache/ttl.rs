//! TTL classification of request URLs.
//!
//! Every GET URL maps to exactly one TTL class. Patterns are tested most
//! specific first: a `/api/colecciones/:id/cartas` path must hit the
//! per-collection class even though `/api/colecciones` is its prefix, and
//! `/api/cartas/:id` must hit the card-detail class before the bare card
//! listing pattern.

use regex::Regex;
use std::time::Duration;

use crate::config::CacheConfig;

/// Resource class a request URL falls into, for TTL purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TtlClass {
    /// Cards of one collection (`/api/colecciones/:id/cartas` or
    /// `/api/cartas?coleccion=:id`).
    CollectionCards,
    /// Single card detail (`/api/cartas/:id`).
    CardDetail,
    /// Full card listing (`/api/cartas`).
    CardListing,
    /// Collection listing or single collection (`/api/colecciones...`).
    Collections,
    /// Anything else.
    Default,
}

/// URL classifier carrying the configured duration per class.
pub struct TtlPolicy {
    collection_cards: Regex,
    card_detail: Regex,
    config: CacheConfig,
}

impl TtlPolicy {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            collection_cards: Regex::new(r"/api/(colecciones/[^/?]+/cartas|cartas\?.*coleccion=)")
                .expect("invalid collection-cards pattern - this is a compile-time bug"),
            card_detail: Regex::new(r"/api/cartas/[^/?]+$")
                .expect("invalid card-detail pattern - this is a compile-time bug"),
            config,
        }
    }

    /// Classify a URL, most specific pattern first.
    pub fn classify(&self, url: &str) -> TtlClass {
        if self.collection_cards.is_match(url) {
            TtlClass::CollectionCards
        } else if self.card_detail.is_match(url) {
            TtlClass::CardDetail
        } else if url.contains("/api/cartas") {
            TtlClass::CardListing
        } else if url.contains("/api/colecciones") {
            TtlClass::Collections
        } else {
            TtlClass::Default
        }
    }

    /// TTL for a URL, from its class.
    pub fn ttl_for(&self, url: &str) -> Duration {
        let secs = match self.classify(url) {
            TtlClass::CollectionCards => self.config.collection_cards_ttl_secs,
            TtlClass::CardDetail => self.config.card_detail_ttl_secs,
            TtlClass::CardListing => self.config.cards_ttl_secs,
            TtlClass::Collections => self.config.collections_ttl_secs,
            TtlClass::Default => self.config.default_ttl_secs,
        };
        Duration::from_secs(secs)
    }
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}
