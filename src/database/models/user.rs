use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity root. Authentication and account creation happen elsewhere; this
/// service only appends and removes Person references in `persons`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub persons: Vec<Uuid>,
}
