//! REST request/response bodies.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::models::{
    Article, ArticlePatch, Event, EventPatch, EventWithReef, HomeSummary, NewArticle, NewEvent,
    NewReef, Reef, Severity,
};

// ==================== Responses ====================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReefDto {
    pub id: Uuid,
    pub name: String,
    pub location: String,
    pub description: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<Reef> for ReefDto {
    fn from(r: Reef) -> Self {
        Self {
            id: r.id,
            name: r.name,
            location: r.location,
            description: r.description,
            created_at: r.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventDto {
    pub id: Uuid,
    pub reef_id: Uuid,
    pub title: String,
    pub description: String,
    pub severity: Severity,
    #[serde(with = "time::serde::rfc3339")]
    pub occurred_at: OffsetDateTime,
    pub reported_by: Uuid,
}

impl From<Event> for EventDto {
    fn from(e: Event) -> Self {
        Self {
            id: e.id,
            reef_id: e.reef_id,
            title: e.title,
            description: e.description,
            severity: e.severity,
            occurred_at: e.occurred_at,
            reported_by: e.reported_by,
        }
    }
}

/// Event with its reef inlined.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventDetailDto {
    #[serde(flatten)]
    pub event: EventDto,
    pub reef: ReefDto,
}

impl From<EventWithReef> for EventDetailDto {
    fn from(e: EventWithReef) -> Self {
        Self {
            event: e.event.into(),
            reef: e.reef.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleDto {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub author: Uuid,
    pub published: bool,
    pub featured: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<Article> for ArticleDto {
    fn from(a: Article) -> Self {
        Self {
            id: a.id,
            title: a.title,
            body: a.body,
            author: a.author,
            published: a.published,
            featured: a.featured,
            created_at: a.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HomeDto {
    pub featured_articles: Vec<ArticleDto>,
    pub recent_events: Vec<EventDetailDto>,
    pub reef_count: usize,
    pub event_count: usize,
}

impl From<HomeSummary> for HomeDto {
    fn from(h: HomeSummary) -> Self {
        Self {
            featured_articles: h.featured_articles.into_iter().map(Into::into).collect(),
            recent_events: h.recent_events.into_iter().map(Into::into).collect(),
            reef_count: h.reef_count,
            event_count: h.event_count,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthDto {
    pub status: String,
}

// ==================== Requests ====================

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateReefReq {
    pub name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub description: String,
}

impl From<CreateReefReq> for NewReef {
    fn from(r: CreateReefReq) -> Self {
        Self {
            name: r.name,
            location: r.location,
            description: r.description,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportEventReq {
    pub reef_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub occurred_at: Option<OffsetDateTime>,
}

impl From<ReportEventReq> for NewEvent {
    fn from(r: ReportEventReq) -> Self {
        Self {
            reef_id: r.reef_id,
            title: r.title,
            description: r.description,
            severity: r.severity,
            occurred_at: r.occurred_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateEventReq {
    pub title: Option<String>,
    pub description: Option<String>,
    pub severity: Option<Severity>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub occurred_at: Option<OffsetDateTime>,
}

impl From<UpdateEventReq> for EventPatch {
    fn from(r: UpdateEventReq) -> Self {
        Self {
            title: r.title,
            description: r.description,
            severity: r.severity,
            occurred_at: r.occurred_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateArticleReq {
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub published: bool,
    #[serde(default)]
    pub featured: bool,
}

impl From<CreateArticleReq> for NewArticle {
    fn from(r: CreateArticleReq) -> Self {
        Self {
            title: r.title,
            body: r.body,
            published: r.published,
            featured: r.featured,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateArticleReq {
    pub title: Option<String>,
    pub body: Option<String>,
    pub published: Option<bool>,
    pub featured: Option<bool>,
}

impl From<UpdateArticleReq> for ArticlePatch {
    fn from(r: UpdateArticleReq) -> Self {
        Self {
            title: r.title,
            body: r.body,
            published: r.published,
            featured: r.featured,
        }
    }
}
