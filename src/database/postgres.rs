//! Postgres-backed repositories.
//!
//! Expected schema:
//!
//! ```sql
//! CREATE TABLE users (
//!     id      UUID PRIMARY KEY,
//!     persons UUID[] NOT NULL DEFAULT '{}'
//! );
//!
//! CREATE TABLE persons (
//!     id             UUID PRIMARY KEY,
//!     name           TEXT NOT NULL,
//!     number         TEXT NOT NULL,
//!     user_id        UUID NOT NULL,
//!     photo_url      TEXT NOT NULL,
//!     photo_filename TEXT NOT NULL,
//!     created_at     TIMESTAMPTZ NOT NULL DEFAULT now()
//! );
//! ```

use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, FromRow, PgPool};
use std::time::Duration;
use uuid::Uuid;

use crate::config::DatabaseConfig;
use crate::database::models::{Person, PhotoInfo, User};
use crate::database::repository::{PersonRepository, RepositoryError, UserRepository};

/// Build the shared connection pool from config.
pub async fn connect_pool(config: &DatabaseConfig) -> Result<PgPool, RepositoryError> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.connection_timeout))
        .connect(&config.url)
        .await
        .map_err(|e| RepositoryError::Connection(e.to_string()))
}

#[derive(Debug, FromRow)]
struct PersonRow {
    id: Uuid,
    name: String,
    number: String,
    user_id: Uuid,
    photo_url: String,
    photo_filename: String,
}

impl From<PersonRow> for Person {
    fn from(row: PersonRow) -> Self {
        Person {
            id: row.id,
            name: row.name,
            number: row.number,
            user: row.user_id,
            photo_info: PhotoInfo {
                url: row.photo_url,
                filename: row.photo_filename,
            },
        }
    }
}

const PERSON_COLUMNS: &str = "id, name, number, user_id, photo_url, photo_filename";

pub struct PgPersonRepository {
    pool: PgPool,
}

impl PgPersonRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PersonRepository for PgPersonRepository {
    async fn find_by_owner(&self, owner: Uuid) -> Result<Vec<Person>, RepositoryError> {
        let rows: Vec<PersonRow> = sqlx::query_as(&format!(
            "SELECT {} FROM persons WHERE user_id = $1 ORDER BY created_at",
            PERSON_COLUMNS
        ))
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Person::from).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Person>, RepositoryError> {
        let row: Option<PersonRow> = sqlx::query_as(&format!(
            "SELECT {} FROM persons WHERE id = $1",
            PERSON_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Person::from))
    }

    async fn insert(&self, person: Person) -> Result<Person, RepositoryError> {
        let row: PersonRow = sqlx::query_as(&format!(
            "INSERT INTO persons (id, name, number, user_id, photo_url, photo_filename) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            PERSON_COLUMNS
        ))
        .bind(person.id)
        .bind(&person.name)
        .bind(&person.number)
        .bind(person.user)
        .bind(&person.photo_info.url)
        .bind(&person.photo_info.filename)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn update_fields(
        &self,
        id: Uuid,
        name: &str,
        number: &str,
    ) -> Result<Option<Person>, RepositoryError> {
        let row: Option<PersonRow> = sqlx::query_as(&format!(
            "UPDATE persons SET name = $2, number = $3 WHERE id = $1 RETURNING {}",
            PERSON_COLUMNS
        ))
        .bind(id)
        .bind(name)
        .bind(number)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Person::from))
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<Option<Person>, RepositoryError> {
        let row: Option<PersonRow> = sqlx::query_as(&format!(
            "DELETE FROM persons WHERE id = $1 RETURNING {}",
            PERSON_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Person::from))
    }
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    persons: Vec<Uuid>,
}

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> =
            sqlx::query_as("SELECT id, persons FROM users WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(|r| User {
            id: r.id,
            persons: r.persons,
        }))
    }

    async fn save(&self, user: &User) -> Result<(), RepositoryError> {
        // Whole-array replace, matching the aggregate's load-modify-save
        // lifecycle. Concurrent savers race on the owned-set (last write wins).
        sqlx::query("UPDATE users SET persons = $2 WHERE id = $1")
            .bind(user.id)
            .bind(&user.persons)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
