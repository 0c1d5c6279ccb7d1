use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::database::models::{Person, PhotoInfo};
use crate::database::repository::{PersonRepository, RepositoryError, UserRepository};
use crate::storage::{unique_object_name, ObjectStore, StorageError};

/// Uploads are always recorded with this content type, whatever the client
/// actually sent.
const PHOTO_CONTENT_TYPE: &str = "image/jpeg";

#[derive(Debug, Error)]
pub enum PersonServiceError {
    #[error("{0}")]
    Validation(String),

    #[error("Person belongs to another user")]
    NotOwner,

    #[error("Person not found")]
    PersonNotFound,

    #[error("User {0} not found")]
    OwnerMissing(Uuid),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Whether get/update require the caller to own the Person. The upstream
/// behavior is public read and public update, so both default to off; the
/// flags exist so that choice is explicit and testable.
#[derive(Debug, Clone, Copy, Default)]
pub struct OwnershipPolicy {
    pub enforce_read_ownership: bool,
    pub enforce_update_ownership: bool,
}

/// Binary image payload taken from the create request.
pub struct UploadedImage {
    pub original_name: String,
    pub bytes: Vec<u8>,
}

/// Orchestrates the Person repository, the User owned-set, and the object
/// store, keeping the three consistent across create and delete.
pub struct PersonService {
    persons: Arc<dyn PersonRepository>,
    users: Arc<dyn UserRepository>,
    store: Arc<dyn ObjectStore>,
    storage_api_base: String,
    policy: OwnershipPolicy,
}

impl PersonService {
    pub fn new(
        persons: Arc<dyn PersonRepository>,
        users: Arc<dyn UserRepository>,
        store: Arc<dyn ObjectStore>,
        storage_api_base: impl Into<String>,
    ) -> Self {
        Self {
            persons,
            users,
            store,
            storage_api_base: storage_api_base.into(),
            policy: OwnershipPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: OwnershipPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// All persons owned by the caller, in repository insertion order.
    pub async fn list(&self, owner: Uuid) -> Result<Vec<Person>, PersonServiceError> {
        Ok(self.persons.find_by_owner(owner).await?)
    }

    /// Fetch one person by id. Reads are public unless
    /// `enforce_read_ownership` is set.
    pub async fn get(
        &self,
        id: Uuid,
        caller: Option<Uuid>,
    ) -> Result<Person, PersonServiceError> {
        let person = self
            .persons
            .find_by_id(id)
            .await?
            .ok_or(PersonServiceError::PersonNotFound)?;

        if self.policy.enforce_read_ownership && caller != Some(person.user) {
            return Err(PersonServiceError::NotOwner);
        }

        Ok(person)
    }

    /// Create a person with an attached photo.
    ///
    /// The object upload, the person insert, and the owned-set append are
    /// three independent writes with no compensation: a failure part-way
    /// leaves the earlier writes in place.
    pub async fn create(
        &self,
        owner: Uuid,
        name: &str,
        number: &str,
        image: UploadedImage,
    ) -> Result<Person, PersonServiceError> {
        if name.is_empty() || number.is_empty() {
            return Err(PersonServiceError::Validation(
                "Name and number are required".to_string(),
            ));
        }

        let mut user = self
            .users
            .find_by_id(owner)
            .await?
            .ok_or(PersonServiceError::OwnerMissing(owner))?;

        let key = unique_object_name(&image.original_name);
        let stored = self
            .store
            .upload(&key, image.bytes, PHOTO_CONTENT_TYPE)
            .await?;
        let photo_url = stored.public_url(&self.storage_api_base)?;

        let person = Person {
            id: Uuid::new_v4(),
            name: name.to_string(),
            number: number.to_string(),
            user: user.id,
            photo_info: PhotoInfo {
                url: photo_url,
                filename: stored.full_path,
            },
        };

        let saved = self.persons.insert(person).await?;

        user.persons.push(saved.id);
        self.users.save(&user).await?;

        tracing::info!(person = %saved.id, owner = %user.id, "created person");
        Ok(saved)
    }

    /// Update name and number by id. Updates are public unless
    /// `enforce_update_ownership` is set.
    pub async fn update(
        &self,
        id: Uuid,
        body: &Value,
        caller: Option<Uuid>,
    ) -> Result<Person, PersonServiceError> {
        let (name, number) = validate_update_body(body)?;

        if self.policy.enforce_update_ownership {
            let person = self
                .persons
                .find_by_id(id)
                .await?
                .ok_or(PersonServiceError::PersonNotFound)?;
            if caller != Some(person.user) {
                return Err(PersonServiceError::NotOwner);
            }
        }

        self.persons
            .update_fields(id, &name, &number)
            .await?
            .ok_or(PersonServiceError::PersonNotFound)
    }

    /// Delete a person, its stored photo, and the owned-set back-reference.
    ///
    /// The User is loaded from the caller's token id, not from the record's
    /// owner field. A caller who is not the owner still deletes the record
    /// but edits their own owned-set, leaving a dangling reference on the
    /// real owner. The three writes carry no compensation.
    pub async fn delete(&self, id: Uuid, caller: Uuid) -> Result<(), PersonServiceError> {
        let mut user = self
            .users
            .find_by_id(caller)
            .await?
            .ok_or(PersonServiceError::OwnerMissing(caller))?;

        let person = self
            .persons
            .delete_by_id(id)
            .await?
            .ok_or(PersonServiceError::PersonNotFound)?;

        self.store.delete(&person.photo_info.filename).await?;

        user.persons.retain(|person_id| *person_id != person.id);
        self.users.save(&user).await?;

        tracing::info!(person = %person.id, caller = %user.id, "deleted person");
        Ok(())
    }
}

/// Validate the update payload field by field, producing the granular client
/// errors in their fixed precedence: missing fields, then empty strings, then
/// wrong types.
fn validate_update_body(body: &Value) -> Result<(String, String), PersonServiceError> {
    let (Some(name), Some(number)) = (body.get("name"), body.get("number")) else {
        return Err(PersonServiceError::Validation(
            "Content is missing".to_string(),
        ));
    };

    let is_empty_string = |v: &Value| matches!(v, Value::String(s) if s.is_empty());
    if is_empty_string(name) || is_empty_string(number) {
        return Err(PersonServiceError::Validation(
            "Name and number are required".to_string(),
        ));
    }

    let (Value::String(name), Value::String(number)) = (name, number) else {
        return Err(PersonServiceError::Validation(
            "Name and number must be strings".to_string(),
        ));
    };

    Ok((name.clone(), number.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::{MemoryPersonRepository, MemoryUserRepository};
    use crate::database::models::User;
    use crate::storage::MemoryObjectStore;
    use serde_json::json;

    const API_BASE: &str = "https://firebasestorage.googleapis.com";

    struct Fixture {
        service: PersonService,
        persons: MemoryPersonRepository,
        users: MemoryUserRepository,
        store: MemoryObjectStore,
    }

    fn fixture_with_policy(policy: OwnershipPolicy) -> Fixture {
        let persons = MemoryPersonRepository::new();
        let users = MemoryUserRepository::new();
        let store = MemoryObjectStore::new("test.appspot.com");

        let service = PersonService::new(
            Arc::new(persons.clone()),
            Arc::new(users.clone()),
            Arc::new(store.clone()),
            API_BASE,
        )
        .with_policy(policy);

        Fixture {
            service,
            persons,
            users,
            store,
        }
    }

    fn fixture() -> Fixture {
        fixture_with_policy(OwnershipPolicy::default())
    }

    async fn seed_user(fx: &Fixture) -> Uuid {
        let id = Uuid::new_v4();
        fx.users
            .put(User {
                id,
                persons: vec![],
            })
            .await;
        id
    }

    fn jpeg_upload() -> UploadedImage {
        UploadedImage {
            original_name: "ada.jpg".to_string(),
            bytes: vec![0xFF, 0xD8, 0xFF, 0xE0],
        }
    }

    #[tokio::test]
    async fn create_links_owner_and_stores_photo() {
        let fx = fixture();
        let owner = seed_user(&fx).await;

        let person = fx
            .service
            .create(owner, "Ada", "123", jpeg_upload())
            .await
            .unwrap();

        assert_eq!(person.user, owner);
        assert!(person.photo_info.filename.ends_with("-ada.jpg"));
        assert!(person
            .photo_info
            .url
            .starts_with("https://firebasestorage.googleapis.com/v0/b/test.appspot.com/o/"));
        assert!(person.photo_info.url.ends_with("?alt=media"));

        // Object is live under the stored key, labeled image/jpeg
        let blob = fx.store.get(&person.photo_info.filename).await.unwrap();
        assert_eq!(blob.content_type, "image/jpeg");

        // Owner's owned-set gained the new id
        let user = fx.users.find_by_id(owner).await.unwrap().unwrap();
        assert_eq!(user.persons, vec![person.id]);
    }

    #[tokio::test]
    async fn create_rejects_empty_fields() {
        let fx = fixture();
        let owner = seed_user(&fx).await;

        let err = fx
            .service
            .create(owner, "", "123", jpeg_upload())
            .await
            .unwrap_err();
        assert!(matches!(err, PersonServiceError::Validation(_)));

        // Nothing was written
        assert_eq!(fx.store.len().await, 0);
        assert!(fx.service.list(owner).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_faults_when_owner_record_is_missing() {
        let fx = fixture();
        let ghost = Uuid::new_v4();

        let err = fx
            .service
            .create(ghost, "Ada", "123", jpeg_upload())
            .await
            .unwrap_err();
        assert!(matches!(err, PersonServiceError::OwnerMissing(id) if id == ghost));
    }

    #[tokio::test]
    async fn list_returns_only_callers_persons() {
        let fx = fixture();
        let alice = seed_user(&fx).await;
        let bob = seed_user(&fx).await;

        let ada = fx
            .service
            .create(alice, "Ada", "123", jpeg_upload())
            .await
            .unwrap();
        fx.service
            .create(bob, "Bert", "456", jpeg_upload())
            .await
            .unwrap();

        let listed = fx.service.list(alice).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, ada.id);
    }

    #[tokio::test]
    async fn get_returns_stored_record_without_ownership_check() {
        let fx = fixture();
        let owner = seed_user(&fx).await;
        let stranger = Uuid::new_v4();

        let person = fx
            .service
            .create(owner, "Ada", "123", jpeg_upload())
            .await
            .unwrap();

        // Public read: no caller, and a non-owner caller, both succeed
        let fetched = fx.service.get(person.id, None).await.unwrap();
        assert_eq!(fetched.id, person.id);
        assert_eq!(fetched.name, "Ada");

        fx.service.get(person.id, Some(stranger)).await.unwrap();
    }

    #[tokio::test]
    async fn get_missing_person_is_not_found() {
        let fx = fixture();
        let err = fx.service.get(Uuid::new_v4(), None).await.unwrap_err();
        assert!(matches!(err, PersonServiceError::PersonNotFound));
    }

    #[tokio::test]
    async fn read_ownership_policy_rejects_non_owner() {
        let fx = fixture_with_policy(OwnershipPolicy {
            enforce_read_ownership: true,
            enforce_update_ownership: false,
        });
        let owner = seed_user(&fx).await;
        let person = fx
            .service
            .create(owner, "Ada", "123", jpeg_upload())
            .await
            .unwrap();

        let err = fx
            .service
            .get(person.id, Some(Uuid::new_v4()))
            .await
            .unwrap_err();
        assert!(matches!(err, PersonServiceError::NotOwner));

        fx.service.get(person.id, Some(owner)).await.unwrap();
    }

    #[tokio::test]
    async fn update_validation_precedence() {
        let fx = fixture();
        let id = Uuid::new_v4();

        let cases = [
            (json!({ "number": "123" }), "Content is missing"),
            (json!({ "name": "Ada" }), "Content is missing"),
            (json!({}), "Content is missing"),
            (
                json!({ "name": "", "number": "123" }),
                "Name and number are required",
            ),
            (
                json!({ "name": "Ada", "number": "" }),
                "Name and number are required",
            ),
            (
                json!({ "name": 42, "number": "123" }),
                "Name and number must be strings",
            ),
            (
                json!({ "name": "Ada", "number": null }),
                "Name and number must be strings",
            ),
        ];

        for (body, expected) in cases {
            let err = fx.service.update(id, &body, None).await.unwrap_err();
            match err {
                PersonServiceError::Validation(msg) => assert_eq!(msg, expected),
                other => panic!("expected validation error, got {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn update_rewrites_name_and_number_only() {
        let fx = fixture();
        let owner = seed_user(&fx).await;
        let person = fx
            .service
            .create(owner, "Ada", "123", jpeg_upload())
            .await
            .unwrap();

        let updated = fx
            .service
            .update(person.id, &json!({ "name": "Ada L", "number": "456" }), None)
            .await
            .unwrap();

        assert_eq!(updated.name, "Ada L");
        assert_eq!(updated.number, "456");
        assert_eq!(updated.user, owner);
        assert_eq!(updated.photo_info, person.photo_info);
    }

    #[tokio::test]
    async fn update_missing_person_is_not_found() {
        let fx = fixture();
        let err = fx
            .service
            .update(
                Uuid::new_v4(),
                &json!({ "name": "Ada", "number": "123" }),
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, PersonServiceError::PersonNotFound));
    }

    #[tokio::test]
    async fn update_ownership_policy_rejects_non_owner() {
        let fx = fixture_with_policy(OwnershipPolicy {
            enforce_read_ownership: false,
            enforce_update_ownership: true,
        });
        let owner = seed_user(&fx).await;
        let person = fx
            .service
            .create(owner, "Ada", "123", jpeg_upload())
            .await
            .unwrap();

        let body = json!({ "name": "Mallory", "number": "666" });
        let err = fx
            .service
            .update(person.id, &body, Some(Uuid::new_v4()))
            .await
            .unwrap_err();
        assert!(matches!(err, PersonServiceError::NotOwner));

        let err = fx.service.update(person.id, &body, None).await.unwrap_err();
        assert!(matches!(err, PersonServiceError::NotOwner));

        fx.service
            .update(person.id, &body, Some(owner))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn delete_removes_record_object_and_back_reference() {
        let fx = fixture();
        let owner = seed_user(&fx).await;
        let person = fx
            .service
            .create(owner, "Ada", "123", jpeg_upload())
            .await
            .unwrap();

        fx.service.delete(person.id, owner).await.unwrap();

        assert!(fx.persons.find_by_id(person.id).await.unwrap().is_none());
        assert!(!fx.store.contains(&person.photo_info.filename).await);
        let user = fx.users.find_by_id(owner).await.unwrap().unwrap();
        assert!(user.persons.is_empty());
    }

    #[tokio::test]
    async fn second_delete_is_not_found() {
        let fx = fixture();
        let owner = seed_user(&fx).await;
        let person = fx
            .service
            .create(owner, "Ada", "123", jpeg_upload())
            .await
            .unwrap();

        fx.service.delete(person.id, owner).await.unwrap();
        let err = fx.service.delete(person.id, owner).await.unwrap_err();
        assert!(matches!(err, PersonServiceError::PersonNotFound));
    }

    #[tokio::test]
    async fn delete_by_non_owner_edits_callers_owned_set() {
        // Pins the upstream behavior: the User is loaded from the token, so a
        // non-owner delete leaves a dangling reference on the real owner.
        let fx = fixture();
        let owner = seed_user(&fx).await;
        let intruder = seed_user(&fx).await;
        let person = fx
            .service
            .create(owner, "Ada", "123", jpeg_upload())
            .await
            .unwrap();

        fx.service.delete(person.id, intruder).await.unwrap();

        assert!(fx.persons.find_by_id(person.id).await.unwrap().is_none());
        let owner_user = fx.users.find_by_id(owner).await.unwrap().unwrap();
        assert_eq!(owner_user.persons, vec![person.id]);
        let intruder_user = fx.users.find_by_id(intruder).await.unwrap().unwrap();
        assert!(intruder_user.persons.is_empty());
    }

    #[tokio::test]
    async fn person_serializes_with_wire_field_names() {
        let fx = fixture();
        let owner = seed_user(&fx).await;
        let person = fx
            .service
            .create(owner, "Ada", "123", jpeg_upload())
            .await
            .unwrap();

        let value = serde_json::to_value(&person).unwrap();
        assert!(value.get("photoInfo").is_some());
        assert!(value["photoInfo"].get("url").is_some());
        assert!(value["photoInfo"].get("filename").is_some());
        assert_eq!(value["user"], json!(owner.to_string()));
    }
}
