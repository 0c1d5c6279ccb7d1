//! In-memory repositories used by the test suite and local development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::models::{Person, User};
use crate::database::repository::{PersonRepository, RepositoryError, UserRepository};

#[derive(Default)]
struct PersonTable {
    // Insertion order preserved for find_by_owner
    order: Vec<Uuid>,
    rows: HashMap<Uuid, Person>,
}

#[derive(Clone, Default)]
pub struct MemoryPersonRepository {
    table: Arc<RwLock<PersonTable>>,
}

impl MemoryPersonRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PersonRepository for MemoryPersonRepository {
    async fn find_by_owner(&self, owner: Uuid) -> Result<Vec<Person>, RepositoryError> {
        let table = self.table.read().await;
        Ok(table
            .order
            .iter()
            .filter_map(|id| table.rows.get(id))
            .filter(|p| p.user == owner)
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Person>, RepositoryError> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn insert(&self, person: Person) -> Result<Person, RepositoryError> {
        let mut table = self.table.write().await;
        table.order.push(person.id);
        table.rows.insert(person.id, person.clone());
        Ok(person)
    }

    async fn update_fields(
        &self,
        id: Uuid,
        name: &str,
        number: &str,
    ) -> Result<Option<Person>, RepositoryError> {
        let mut table = self.table.write().await;
        Ok(table.rows.get_mut(&id).map(|person| {
            person.name = name.to_string();
            person.number = number.to_string();
            person.clone()
        }))
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<Option<Person>, RepositoryError> {
        let mut table = self.table.write().await;
        table.order.retain(|existing| *existing != id);
        Ok(table.rows.remove(&id))
    }
}

#[derive(Clone, Default)]
pub struct MemoryUserRepository {
    rows: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a user directly, bypassing the save path.
    pub async fn put(&self, user: User) {
        self.rows.write().await.insert(user.id, user);
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepositoryError> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn save(&self, user: &User) -> Result<(), RepositoryError> {
        self.rows.write().await.insert(user.id, user.clone());
        Ok(())
    }
}
