use serde::Serialize;

use crate::core::time::format_primitive;
use crate::db::models::Profile;
use crate::db::types::UserRole;

#[derive(Debug, Serialize)]
pub(crate) struct ProfileResponse {
    pub(crate) id: String,
    pub(crate) email: Option<String>,
    pub(crate) full_name: Option<String>,
    pub(crate) username: Option<String>,
    pub(crate) role: Option<UserRole>,
    pub(crate) created_at: String,
}

impl ProfileResponse {
    pub(crate) fn from_db(profile: Profile) -> Self {
        Self {
            id: profile.id,
            email: profile.email,
            full_name: profile.full_name,
            username: profile.username,
            role: profile.role,
            created_at: format_primitive(profile.created_at),
        }
    }
}
