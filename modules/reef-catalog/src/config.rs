use serde::{Deserialize, Serialize};

/// Catalog module configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogConfig {
    /// Maximum length of reef names.
    pub max_name_length: usize,
    /// Maximum length of event and article titles.
    pub max_title_length: usize,
    /// Maximum length of descriptions and article bodies.
    pub max_text_length: usize,
    /// Featured articles shown on the home page.
    pub home_featured_limit: usize,
    /// Recent events shown on the home page.
    pub home_recent_events_limit: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            max_name_length: 100,
            max_title_length: 200,
            max_text_length: 10_000,
            home_featured_limit: 3,
            home_recent_events_limit: 5,
        }
    }
}
