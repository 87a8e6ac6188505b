use reef_guard::AccessError;
use thiserror::Error;
use uuid::Uuid;

/// Domain-specific errors using thiserror
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("{entity_type} not found: {id}")]
    NotFound { entity_type: &'static str, id: Uuid },

    #[error("Validation failed: {field}: {message}")]
    Validation { field: &'static str, message: String },

    #[error("Reef {id} is referenced by {events} event(s)")]
    ReefInUse { id: Uuid, events: usize },

    #[error(transparent)]
    Access(#[from] AccessError),
}

impl DomainError {
    #[must_use]
    pub fn not_found(entity_type: &'static str, id: Uuid) -> Self {
        Self::NotFound { entity_type, id }
    }

    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }
}
