//! Catalog entities and their inputs.

use reef_guard::OwnedResource;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Owner field of [`Event`].
pub const EVENT_OWNER_FIELD: &str = "reported_by";

/// Owner field of [`Article`].
pub const ARTICLE_OWNER_FIELD: &str = "author";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reef {
    pub id: Uuid,
    pub name: String,
    pub location: String,
    pub description: String,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Low,
    Moderate,
    High,
    Critical,
}

/// An observation reported against a reef.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub id: Uuid,
    pub reef_id: Uuid,
    pub title: String,
    pub description: String,
    pub severity: Severity,
    pub occurred_at: OffsetDateTime,
    pub reported_by: Uuid,
}

impl OwnedResource for Event {
    fn owner_ref(&self, field: &str) -> Option<Uuid> {
        (field == EVENT_OWNER_FIELD).then_some(self.reported_by)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub author: Uuid,
    pub published: bool,
    pub featured: bool,
    pub created_at: OffsetDateTime,
}

impl OwnedResource for Article {
    fn owner_ref(&self, field: &str) -> Option<Uuid> {
        (field == ARTICLE_OWNER_FIELD).then_some(self.author)
    }
}

/// Event joined with the reef it was reported on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventWithReef {
    pub event: Event,
    pub reef: Reef,
}

/// Landing page content.
#[derive(Debug, Clone)]
pub struct HomeSummary {
    pub featured_articles: Vec<Article>,
    pub recent_events: Vec<EventWithReef>,
    pub reef_count: usize,
    pub event_count: usize,
}

#[derive(Debug, Clone)]
pub struct NewReef {
    pub name: String,
    pub location: String,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct NewEvent {
    pub reef_id: Uuid,
    pub title: String,
    pub description: String,
    pub severity: Severity,
    /// Defaults to the time of reporting.
    pub occurred_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, Default)]
pub struct EventPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub severity: Option<Severity>,
    pub occurred_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone)]
pub struct NewArticle {
    pub title: String,
    pub body: String,
    pub published: bool,
    pub featured: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ArticlePatch {
    pub title: Option<String>,
    pub body: Option<String>,
    pub published: Option<bool>,
    pub featured: Option<bool>,
}
