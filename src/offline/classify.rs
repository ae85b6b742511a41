//! URL classification for intercepted requests.
//!
//! Every request maps to exactly one resource class through ordered pattern
//! tests. Card patterns run before the generic image patterns: card assets
//! also end in image extensions, so the order decides which bucket they
//! land in.

use regex::Regex;

use crate::config::OfflineConfig;

/// Resource class of an intercepted request URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceClass {
    /// Card artwork, cached in the card bucket.
    CardImage,
    /// Any other image, cached in the image bucket.
    GenericImage,
    /// Precached or `/static/`-prefixed assets.
    StaticResource,
    /// Backend API calls; never intercepted.
    Api,
    /// Everything else.
    Other,
}

pub struct Classifier {
    card_patterns: Vec<Regex>,
    image_patterns: Vec<Regex>,
    precache: Vec<String>,
    static_prefix: String,
    api_prefix: String,
}

impl Classifier {
    pub fn new(config: &OfflineConfig) -> Self {
        let card_patterns = [
            r"(?i)assets/collections/.*\.(png|jpg|jpeg|webp)",
            r"(?i)collections/[^/]+/.*\.(png|jpg|jpeg|webp)",
        ];
        let image_patterns = [
            r"(?i)\.(png|jpg|jpeg|svg|webp|gif)$",
            r"(?i)cdn\.jsdelivr\.net.*\.(png|jpg|jpeg|svg|webp|gif)",
            r"(?i)assets/images/cofre-.*\.webp",
        ];

        Self {
            card_patterns: compile(&card_patterns),
            image_patterns: compile(&image_patterns),
            precache: config.precache.clone(),
            static_prefix: config.static_prefix.clone(),
            api_prefix: config.api_prefix.clone(),
        }
    }

    /// Classify a URL. Card patterns take precedence over image patterns,
    /// images over the static prefix, statics over the API prefix.
    pub fn classify(&self, url: &str) -> ResourceClass {
        if self.card_patterns.iter().any(|p| p.is_match(url)) {
            ResourceClass::CardImage
        } else if self.image_patterns.iter().any(|p| p.is_match(url)) {
            ResourceClass::GenericImage
        } else if self.is_static(url) {
            ResourceClass::StaticResource
        } else if path_of(url).starts_with(&self.api_prefix) {
            ResourceClass::Api
        } else {
            ResourceClass::Other
        }
    }

    fn is_static(&self, url: &str) -> bool {
        let path = path_of(url);
        path.starts_with(&self.static_prefix) || self.precache.iter().any(|p| p == path)
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(&OfflineConfig::default())
    }
}

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("invalid resource pattern - this is a compile-time bug"))
        .collect()
}

/// Path component of a URL; absolute URLs are reduced to their path so the
/// prefix checks behave the same for `/static/x` and `https://host/static/x`.
fn path_of(url: &str) -> &str {
    let rest = match url.find("://") {
        Some(idx) => &url[idx + 3..],
        None => return url,
    };
    match rest.find('/') {
        Some(idx) => &rest[idx..],
        None => "/",
    }
}
