//! In-memory catalog storage.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::models::{Article, Event, Reef};
use crate::domain::repo::CatalogRepository;

#[derive(Default)]
struct Tables {
    reefs: HashMap<Uuid, Reef>,
    events: HashMap<Uuid, Event>,
    articles: HashMap<Uuid, Article>,
}

/// [`CatalogRepository`] kept in process memory.
///
/// All three tables sit behind one lock so reef/event integrity checks and
/// the write they guard happen atomically.
#[derive(Default)]
pub struct InMemoryCatalogRepository {
    tables: RwLock<Tables>,
}

impl InMemoryCatalogRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CatalogRepository for InMemoryCatalogRepository {
    async fn list_reefs(&self) -> Result<Vec<Reef>, DomainError> {
        Ok(self.tables.read().reefs.values().cloned().collect())
    }

    async fn get_reef(&self, id: Uuid) -> Result<Option<Reef>, DomainError> {
        Ok(self.tables.read().reefs.get(&id).cloned())
    }

    async fn insert_reef(&self, reef: Reef) -> Result<Reef, DomainError> {
        self.tables.write().reefs.insert(reef.id, reef.clone());
        Ok(reef)
    }

    async fn delete_reef(&self, id: Uuid) -> Result<(), DomainError> {
        let mut tables = self.tables.write();
        if !tables.reefs.contains_key(&id) {
            return Err(DomainError::not_found("Reef", id));
        }

        let events = tables.events.values().filter(|e| e.reef_id == id).count();
        if events > 0 {
            return Err(DomainError::ReefInUse { id, events });
        }

        tables.reefs.remove(&id);
        Ok(())
    }

    async fn count_reefs(&self) -> Result<usize, DomainError> {
        Ok(self.tables.read().reefs.len())
    }

    async fn list_events(&self) -> Result<Vec<Event>, DomainError> {
        Ok(self.tables.read().events.values().cloned().collect())
    }

    async fn get_event(&self, id: Uuid) -> Result<Option<Event>, DomainError> {
        Ok(self.tables.read().events.get(&id).cloned())
    }

    async fn insert_event(&self, event: Event) -> Result<Event, DomainError> {
        let mut tables = self.tables.write();
        if !tables.reefs.contains_key(&event.reef_id) {
            return Err(DomainError::not_found("Reef", event.reef_id));
        }
        tables.events.insert(event.id, event.clone());
        Ok(event)
    }

    async fn update_event(&self, event: Event) -> Result<Event, DomainError> {
        let mut tables = self.tables.write();
        let Some(slot) = tables.events.get_mut(&event.id) else {
            return Err(DomainError::not_found("Event", event.id));
        };
        *slot = event.clone();
        Ok(event)
    }

    async fn delete_event(&self, id: Uuid) -> Result<(), DomainError> {
        self.tables
            .write()
            .events
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| DomainError::not_found("Event", id))
    }

    async fn count_events(&self) -> Result<usize, DomainError> {
        Ok(self.tables.read().events.len())
    }

    async fn list_articles(&self) -> Result<Vec<Article>, DomainError> {
        Ok(self.tables.read().articles.values().cloned().collect())
    }

    async fn get_article(&self, id: Uuid) -> Result<Option<Article>, DomainError> {
        Ok(self.tables.read().articles.get(&id).cloned())
    }

    async fn insert_article(&self, article: Article) -> Result<Article, DomainError> {
        self.tables
            .write()
            .articles
            .insert(article.id, article.clone());
        Ok(article)
    }

    async fn update_article(&self, article: Article) -> Result<Article, DomainError> {
        let mut tables = self.tables.write();
        let Some(slot) = tables.articles.get_mut(&article.id) else {
            return Err(DomainError::not_found("Article", article.id));
        };
        *slot = article.clone();
        Ok(article)
    }
}
