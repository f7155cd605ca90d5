//! Role to resource table. Every route gate goes through [`authorize`].

use crate::entities::UserRole;
use crate::error::{AppError, AppResult};
use crate::models::{NavigationEntry, SessionContext};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Dashboard,
    OwnBookings,
    Profile,
    CashierDashboard,
    ManageBookings,
    Articles,
    RealtimeFeed,
    AdminDashboard,
    Users,
    Finance,
    Settings,
    Fields,
}

use Resource::*;

const USER_RESOURCES: &[Resource] = &[Dashboard, OwnBookings, Profile];

const KASIR_RESOURCES: &[Resource] = &[
    Dashboard,
    OwnBookings,
    Profile,
    CashierDashboard,
    ManageBookings,
    Articles,
    RealtimeFeed,
];

const ADMIN_RESOURCES: &[Resource] = &[
    Dashboard,
    OwnBookings,
    Profile,
    CashierDashboard,
    ManageBookings,
    Articles,
    RealtimeFeed,
    AdminDashboard,
    Users,
    Finance,
    Settings,
    Fields,
];

impl Resource {
    /// Dashboard page for the resource, if it has one.
    pub fn page(&self) -> Option<(&'static str, &'static str)> {
        match self {
            Dashboard => Some(("Dashboard", "/dashboard")),
            OwnBookings => Some(("My bookings", "/dashboard/bookings")),
            Profile => Some(("Profile", "/dashboard/profile")),
            CashierDashboard => Some(("Cashier", "/dashboard/kasir")),
            ManageBookings => Some(("Bookings", "/dashboard/kasir/bookings")),
            Articles => Some(("Articles", "/dashboard/articles")),
            AdminDashboard => Some(("Admin", "/dashboard/admin")),
            Users => Some(("Users", "/dashboard/admin/users")),
            Finance => Some(("Finance", "/dashboard/admin/finance")),
            Settings => Some(("Settings", "/dashboard/admin/settings")),
            Fields => Some(("Fields", "/dashboard/admin/fields")),
            RealtimeFeed => None,
        }
    }
}

pub fn permitted(role: UserRole) -> &'static [Resource] {
    match role {
        UserRole::User => USER_RESOURCES,
        UserRole::Kasir => KASIR_RESOURCES,
        UserRole::Admin => ADMIN_RESOURCES,
    }
}

pub fn is_permitted(role: UserRole, resource: Resource) -> bool {
    permitted(role).contains(&resource)
}

pub fn authorize(session: &SessionContext, resource: Resource) -> AppResult<()> {
    if is_permitted(session.role, resource) {
        Ok(())
    } else {
        log::info!(
            "Denied {:?} to user {} with role {}",
            resource,
            session.user_id,
            session.role
        );
        Err(AppError::PermissionDenied)
    }
}

/// Navigation entries in table order.
pub fn navigation(role: UserRole) -> Vec<NavigationEntry> {
    permitted(role)
        .iter()
        .filter_map(|resource| {
            resource.page().map(|(label, path)| NavigationEntry {
                resource: *resource,
                label: label.to_string(),
                path: path.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(UserRole::Kasir, ManageBookings, true)]
    #[test_case(UserRole::Kasir, Settings, false)]
    #[test_case(UserRole::Kasir, Fields, false)]
    #[test_case(UserRole::Kasir, RealtimeFeed, true)]
    #[test_case(UserRole::User, ManageBookings, false)]
    #[test_case(UserRole::User, OwnBookings, true)]
    #[test_case(UserRole::User, Articles, false)]
    #[test_case(UserRole::Admin, Finance, true)]
    fn test_role_table(role: UserRole, resource: Resource, expected: bool) {
        assert_eq!(is_permitted(role, resource), expected);
    }

    #[test]
    fn test_admin_may_do_everything() {
        let everything = [
            Dashboard,
            OwnBookings,
            Profile,
            CashierDashboard,
            ManageBookings,
            Articles,
            RealtimeFeed,
            AdminDashboard,
            Users,
            Finance,
            Settings,
            Fields,
        ];
        assert!(everything.iter().all(|r| is_permitted(UserRole::Admin, *r)));
    }

    #[test]
    fn test_roles_are_nested() {
        assert!(USER_RESOURCES.iter().all(|r| is_permitted(UserRole::Kasir, *r)));
        assert!(KASIR_RESOURCES.iter().all(|r| is_permitted(UserRole::Admin, *r)));
    }

    #[test]
    fn test_navigation_skips_resources_without_pages() {
        let nav = navigation(UserRole::Kasir);
        assert_eq!(nav.len(), KASIR_RESOURCES.len() - 1);
        assert!(nav.iter().all(|e| e.resource != RealtimeFeed));
        assert_eq!(nav[0].path, "/dashboard");
    }

    #[test]
    fn test_authorize_denies_with_forbidden() {
        let session = SessionContext::for_role(uuid::Uuid::new_v4(), UserRole::User);
        assert!(matches!(
            authorize(&session, ManageBookings),
            Err(AppError::PermissionDenied)
        ));
        assert!(authorize(&session, Dashboard).is_ok());
    }
}
