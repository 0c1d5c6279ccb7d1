use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Descriptor for the externally stored photo object: the public locator plus
/// the storage key needed to delete it later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoInfo {
    pub url: String,
    pub filename: String,
}

/// A contact record owned by exactly one User.
///
/// The owner and photo descriptor are set once at creation; update only
/// touches name and number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
    pub id: Uuid,
    pub name: String,
    pub number: String,
    pub user: Uuid,
    #[serde(rename = "photoInfo")]
    pub photo_info: PhotoInfo,
}
