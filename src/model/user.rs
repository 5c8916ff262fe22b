use serde::{Deserialize, Serialize};

/// Read-only view of a user as exposed by the user directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserProfile {
    pub id: u64,
    pub role_id: u8,
    pub class: Option<String>,
    pub position: Option<String>,
}
