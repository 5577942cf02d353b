use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered account as exposed to clients. The password hash never
/// leaves the backend, so it has no place here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    /// File name under the public profile picture path.
    pub profile_image: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
