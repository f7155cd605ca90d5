use crate::entities::UserRole;
use crate::models::ProfileResponse;
use crate::utils::Resource;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Who is calling, resolved once per session from the verified token and
/// the caller's profile row.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SessionContext {
    pub user_id: Uuid,
    pub session_id: String,
    pub role: UserRole,
    pub profile: ProfileResponse,
}

impl SessionContext {
    #[cfg(test)]
    pub fn for_role(user_id: Uuid, role: UserRole) -> Self {
        Self {
            user_id,
            session_id: format!("test-{user_id}"),
            role,
            profile: ProfileResponse {
                id: user_id,
                full_name: None,
                phone: None,
                role,
                created_at: None,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NavigationEntry {
    pub resource: Resource,
    pub label: String,
    pub path: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SessionResponse {
    pub session: SessionContext,
    pub navigation: Vec<NavigationEntry>,
}
