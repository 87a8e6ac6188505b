use async_trait::async_trait;
use uuid::Uuid;

use super::error::DomainError;
use super::models::{Article, Event, Reef};

/// Persistence port of the catalog.
///
/// Listing order is unspecified; the service sorts. Implementations keep
/// referential integrity between events and reefs.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn list_reefs(&self) -> Result<Vec<Reef>, DomainError>;

    async fn get_reef(&self, id: Uuid) -> Result<Option<Reef>, DomainError>;

    async fn insert_reef(&self, reef: Reef) -> Result<Reef, DomainError>;

    /// Remove a reef nothing references.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id, `ReefInUse` while events reference it.
    async fn delete_reef(&self, id: Uuid) -> Result<(), DomainError>;

    async fn count_reefs(&self) -> Result<usize, DomainError>;

    async fn list_events(&self) -> Result<Vec<Event>, DomainError>;

    async fn get_event(&self, id: Uuid) -> Result<Option<Event>, DomainError>;

    /// # Errors
    ///
    /// `NotFound` when `event.reef_id` does not exist.
    async fn insert_event(&self, event: Event) -> Result<Event, DomainError>;

    async fn update_event(&self, event: Event) -> Result<Event, DomainError>;

    async fn delete_event(&self, id: Uuid) -> Result<(), DomainError>;

    async fn count_events(&self) -> Result<usize, DomainError>;

    async fn list_articles(&self) -> Result<Vec<Article>, DomainError>;

    async fn get_article(&self, id: Uuid) -> Result<Option<Article>, DomainError>;

    async fn insert_article(&self, article: Article) -> Result<Article, DomainError>;

    async fn update_article(&self, article: Article) -> Result<Article, DomainError>;
}
