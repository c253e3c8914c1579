//! Signed-in user profile snapshot.

use serde::{Deserialize, Serialize};

use super::email::Email;
use super::id::UserId;
use super::role::UserRole;

/// Profile returned alongside a bearer token by login and registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(rename = "_id")]
    pub id: UserId,
    pub name: String,
    pub email: Email,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default)]
    pub role: UserRole,
}
