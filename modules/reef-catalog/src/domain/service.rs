use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use reef_guard::ObjectLookup;
use reef_security::Principal;
use time::OffsetDateTime;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::error::DomainError;
use super::models::{
    Article, ArticlePatch, Event, EventPatch, EventWithReef, HomeSummary, NewArticle, NewEvent,
    NewReef, Reef,
};
use super::repo::CatalogRepository;
use crate::config::CatalogConfig;

// ============================================================================
// Service Implementation
// ============================================================================

/// Catalog business rules.
///
/// Access control happens before these methods are called; the service
/// only validates input and keeps ordering rules.
pub struct CatalogService<R: CatalogRepository> {
    repo: Arc<R>,
    config: CatalogConfig,
}

impl<R: CatalogRepository> CatalogService<R> {
    #[must_use]
    pub fn new(repo: Arc<R>, config: CatalogConfig) -> Self {
        Self { repo, config }
    }

    #[must_use]
    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Object lookup for ownership checks on events.
    #[must_use]
    pub fn events(&self) -> EventLookup<'_, R> {
        EventLookup(self)
    }

    /// Object lookup for ownership checks on articles.
    #[must_use]
    pub fn articles(&self) -> ArticleLookup<'_, R> {
        ArticleLookup(self)
    }

    /// Featured articles, recent events and totals.
    ///
    /// # Errors
    ///
    /// Repository failures.
    #[instrument(skip(self))]
    pub async fn home(&self) -> Result<HomeSummary, DomainError> {
        let mut featured_articles: Vec<Article> = self
            .repo
            .list_articles()
            .await?
            .into_iter()
            .filter(|a| a.published && a.featured)
            .collect();
        sort_articles_newest_first(&mut featured_articles);
        featured_articles.truncate(self.config.home_featured_limit);

        let mut events = self.repo.list_events().await?;
        sort_events_newest_first(&mut events);
        events.truncate(self.config.home_recent_events_limit);
        let recent_events = self.attach_reefs(events).await?;

        Ok(HomeSummary {
            featured_articles,
            recent_events,
            reef_count: self.repo.count_reefs().await?,
            event_count: self.repo.count_events().await?,
        })
    }

    // ==================== Events ====================

    /// # Errors
    ///
    /// Repository failures.
    #[instrument(skip(self))]
    pub async fn list_events(&self) -> Result<Vec<EventWithReef>, DomainError> {
        let mut events = self.repo.list_events().await?;
        sort_events_newest_first(&mut events);
        debug!("Listing {} events", events.len());
        self.attach_reefs(events).await
    }

    /// # Errors
    ///
    /// `NotFound` for an unknown event.
    #[instrument(skip(self), fields(event_id = %id))]
    pub async fn get_event(&self, id: Uuid) -> Result<EventWithReef, DomainError> {
        let event = self.find_event(id).await?;
        let reef = self
            .repo
            .get_reef(event.reef_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Reef", event.reef_id))?;
        Ok(EventWithReef { event, reef })
    }

    /// # Errors
    ///
    /// `NotFound` for an unknown event.
    pub async fn find_event(&self, id: Uuid) -> Result<Event, DomainError> {
        self.repo
            .get_event(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Event", id))
    }

    /// Record a new event owned by `reporter`.
    ///
    /// # Errors
    ///
    /// `Validation` for bad input, `NotFound` for an unknown reef.
    #[instrument(skip(self, reporter, new_event), fields(reef_id = %new_event.reef_id))]
    pub async fn report_event(
        &self,
        reporter: &Principal,
        new_event: NewEvent,
    ) -> Result<Event, DomainError> {
        let event = Event {
            id: Uuid::now_v7(),
            reef_id: new_event.reef_id,
            title: required_text("title", &new_event.title, self.config.max_title_length)?,
            description: bounded_text(
                "description",
                new_event.description,
                self.config.max_text_length,
            )?,
            severity: new_event.severity,
            occurred_at: new_event
                .occurred_at
                .unwrap_or_else(OffsetDateTime::now_utc),
            reported_by: reporter.subject_id(),
        };

        let event = self.repo.insert_event(event).await?;
        info!(event_id = %event.id, reporter = %reporter.subject_id(), "Event reported");
        Ok(event)
    }

    /// # Errors
    ///
    /// `NotFound` for an unknown event, `Validation` for bad input.
    #[instrument(skip(self, patch), fields(event_id = %id))]
    pub async fn update_event(&self, id: Uuid, patch: EventPatch) -> Result<Event, DomainError> {
        let event = self.find_event(id).await?;
        self.apply_event_patch(event, patch).await
    }

    /// Apply `patch` to an event the caller has already loaded (and
    /// typically authorized), without fetching it again.
    ///
    /// # Errors
    ///
    /// `Validation` for bad input, `NotFound` if the event was deleted in
    /// the meantime.
    #[instrument(skip_all, fields(event_id = %event.id))]
    pub async fn apply_event_patch(
        &self,
        mut event: Event,
        patch: EventPatch,
    ) -> Result<Event, DomainError> {
        if let Some(title) = patch.title {
            event.title = required_text("title", &title, self.config.max_title_length)?;
        }
        if let Some(description) = patch.description {
            event.description =
                bounded_text("description", description, self.config.max_text_length)?;
        }
        if let Some(severity) = patch.severity {
            event.severity = severity;
        }
        if let Some(occurred_at) = patch.occurred_at {
            event.occurred_at = occurred_at;
        }

        let event = self.repo.update_event(event).await?;
        info!("Event updated");
        Ok(event)
    }

    /// # Errors
    ///
    /// `NotFound` for an unknown event.
    #[instrument(skip(self), fields(event_id = %id))]
    pub async fn delete_event(&self, id: Uuid) -> Result<(), DomainError> {
        self.repo.delete_event(id).await?;
        info!("Event deleted");
        Ok(())
    }

    // ==================== Reefs ====================

    /// All reefs ordered by name.
    ///
    /// # Errors
    ///
    /// Repository failures.
    #[instrument(skip(self))]
    pub async fn list_reefs(&self) -> Result<Vec<Reef>, DomainError> {
        let mut reefs = self.repo.list_reefs().await?;
        reefs.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(reefs)
    }

    /// # Errors
    ///
    /// `Validation` for bad input.
    #[instrument(skip(self, new_reef), fields(name = %new_reef.name))]
    pub async fn create_reef(&self, new_reef: NewReef) -> Result<Reef, DomainError> {
        let reef = Reef {
            id: Uuid::now_v7(),
            name: required_text("name", &new_reef.name, self.config.max_name_length)?,
            location: bounded_text(
                "location",
                new_reef.location,
                self.config.max_title_length,
            )?,
            description: bounded_text(
                "description",
                new_reef.description,
                self.config.max_text_length,
            )?,
            created_at: OffsetDateTime::now_utc(),
        };

        let reef = self.repo.insert_reef(reef).await?;
        info!(reef_id = %reef.id, "Reef created");
        Ok(reef)
    }

    /// Delete a reef no event refers to.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown reef, `ReefInUse` while events reference it.
    #[instrument(skip(self), fields(reef_id = %id))]
    pub async fn delete_reef(&self, id: Uuid) -> Result<(), DomainError> {
        self.repo.delete_reef(id).await?;
        info!("Reef deleted");
        Ok(())
    }

    // ==================== Articles ====================

    /// Published articles, newest first.
    ///
    /// # Errors
    ///
    /// Repository failures.
    #[instrument(skip(self))]
    pub async fn list_articles(&self) -> Result<Vec<Article>, DomainError> {
        let mut articles: Vec<Article> = self
            .repo
            .list_articles()
            .await?
            .into_iter()
            .filter(|a| a.published)
            .collect();
        sort_articles_newest_first(&mut articles);
        Ok(articles)
    }

    /// # Errors
    ///
    /// `NotFound` for an unknown article.
    pub async fn find_article(&self, id: Uuid) -> Result<Article, DomainError> {
        self.repo
            .get_article(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Article", id))
    }

    /// # Errors
    ///
    /// `Validation` for bad input.
    #[instrument(skip(self, author, new_article), fields(title = %new_article.title))]
    pub async fn create_article(
        &self,
        author: &Principal,
        new_article: NewArticle,
    ) -> Result<Article, DomainError> {
        let article = Article {
            id: Uuid::now_v7(),
            title: required_text("title", &new_article.title, self.config.max_title_length)?,
            body: bounded_text("body", new_article.body, self.config.max_text_length)?,
            author: author.subject_id(),
            published: new_article.published,
            featured: new_article.featured,
            created_at: OffsetDateTime::now_utc(),
        };

        let article = self.repo.insert_article(article).await?;
        info!(article_id = %article.id, author = %author.subject_id(), "Article created");
        Ok(article)
    }

    /// # Errors
    ///
    /// `NotFound` for an unknown article, `Validation` for bad input.
    #[instrument(skip(self, patch), fields(article_id = %id))]
    pub async fn update_article(
        &self,
        id: Uuid,
        patch: ArticlePatch,
    ) -> Result<Article, DomainError> {
        let article = self.find_article(id).await?;
        self.apply_article_patch(article, patch).await
    }

    /// Article counterpart of [`Self::apply_event_patch`].
    ///
    /// # Errors
    ///
    /// `Validation` for bad input, `NotFound` if the article was deleted in
    /// the meantime.
    #[instrument(skip_all, fields(article_id = %article.id))]
    pub async fn apply_article_patch(
        &self,
        mut article: Article,
        patch: ArticlePatch,
    ) -> Result<Article, DomainError> {
        if let Some(title) = patch.title {
            article.title = required_text("title", &title, self.config.max_title_length)?;
        }
        if let Some(body) = patch.body {
            article.body = bounded_text("body", body, self.config.max_text_length)?;
        }
        if let Some(published) = patch.published {
            article.published = published;
        }
        if let Some(featured) = patch.featured {
            article.featured = featured;
        }

        let article = self.repo.update_article(article).await?;
        info!("Article updated");
        Ok(article)
    }

    async fn attach_reefs(&self, events: Vec<Event>) -> Result<Vec<EventWithReef>, DomainError> {
        let reefs: HashMap<Uuid, Reef> = self
            .repo
            .list_reefs()
            .await?
            .into_iter()
            .map(|r| (r.id, r))
            .collect();

        Ok(events
            .into_iter()
            .filter_map(|event| match reefs.get(&event.reef_id) {
                Some(reef) => Some(EventWithReef {
                    reef: reef.clone(),
                    event,
                }),
                None => {
                    warn!(event_id = %event.id, reef_id = %event.reef_id, "Event references a missing reef");
                    None
                }
            })
            .collect())
    }
}

fn sort_events_newest_first(events: &mut [Event]) {
    events.sort_by(|a, b| {
        b.occurred_at
            .cmp(&a.occurred_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}

fn sort_articles_newest_first(articles: &mut [Article]) {
    articles.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}

/// Trimmed, non-empty, at most `max` characters.
fn required_text(field: &'static str, value: &str, max: usize) -> Result<String, DomainError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(DomainError::validation(field, "cannot be empty"));
    }
    bounded_text(field, value.to_owned(), max)
}

fn bounded_text(field: &'static str, value: String, max: usize) -> Result<String, DomainError> {
    let len = value.chars().count();
    if len > max {
        return Err(DomainError::validation(
            field,
            format!("too long: {len} characters (max: {max})"),
        ));
    }
    Ok(value)
}

// ============================================================================
// Ownership lookups
// ============================================================================

/// Resolves events for [`OwnershipGuard`](reef_guard::OwnershipGuard).
pub struct EventLookup<'a, R: CatalogRepository>(&'a CatalogService<R>);

#[async_trait]
impl<R: CatalogRepository> ObjectLookup for EventLookup<'_, R> {
    type Object = Event;
    type Error = DomainError;

    async fn get_object(&self, id: Uuid) -> Result<Event, DomainError> {
        self.0.find_event(id).await
    }
}

/// Resolves articles for [`OwnershipGuard`](reef_guard::OwnershipGuard).
pub struct ArticleLookup<'a, R: CatalogRepository>(&'a CatalogService<R>);

#[async_trait]
impl<R: CatalogRepository> ObjectLookup for ArticleLookup<'_, R> {
    type Object = Article;
    type Error = DomainError;

    async fn get_object(&self, id: Uuid) -> Result<Article, DomainError> {
        self.0.find_article(id).await
    }
}
