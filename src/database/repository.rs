use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::database::models::{Person, User};

/// Errors from the repository layer
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Document-store operations for Person records.
#[async_trait]
pub trait PersonRepository: Send + Sync {
    /// All persons owned by the given user, in insertion order.
    async fn find_by_owner(&self, owner: Uuid) -> Result<Vec<Person>, RepositoryError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Person>, RepositoryError>;

    async fn insert(&self, person: Person) -> Result<Person, RepositoryError>;

    /// Update name and number only; returns the updated record, or None when
    /// no record matches the id.
    async fn update_fields(
        &self,
        id: Uuid,
        name: &str,
        number: &str,
    ) -> Result<Option<Person>, RepositoryError>;

    /// Delete by id, returning the removed record when one existed.
    async fn delete_by_id(&self, id: Uuid) -> Result<Option<Person>, RepositoryError>;
}

/// Document-store operations for User aggregates.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepositoryError>;

    /// Persist the full aggregate, replacing the stored owned-set.
    async fn save(&self, user: &User) -> Result<(), RepositoryError>;
}
