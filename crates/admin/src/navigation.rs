//! Admin sidebar.
//!
//! The menu is a fixed tree. [`sidebar`] prunes it to what the session may
//! see and roots every link in the session's admin area.

use anime_tribes_core::Permission;
use serde::Serialize;

use crate::access::{ADMIN_PREFIX, SUPER_ADMIN_PREFIX};
use crate::session::AdminSession;

/// A sidebar entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavItem {
    pub name: &'static str,
    /// Link target; `None` for groups that only expand.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NavItem>,
}

struct MenuEntry {
    name: &'static str,
    path: Option<&'static str>,
    permission: Option<Permission>,
    children: &'static [MenuEntry],
}

const fn link(name: &'static str, path: &'static str, permission: Option<Permission>) -> MenuEntry {
    MenuEntry {
        name,
        path: Some(path),
        permission,
        children: &[],
    }
}

const fn group(
    name: &'static str,
    permission: Permission,
    children: &'static [MenuEntry],
) -> MenuEntry {
    MenuEntry {
        name,
        path: None,
        permission: Some(permission),
        children,
    }
}

const MENU: &[MenuEntry] = &[
    link("Dashboard", "/dashboard", None),
    group(
        "User Management",
        Permission::ManageAdmins,
        &[
            link("Admin Users", "/users/admins", Some(Permission::ManageAdmins)),
            link("Roles & Permissions", "/users/roles", Some(Permission::ManageRoles)),
            link("Customers", "/users/customers", Some(Permission::ViewCustomers)),
        ],
    ),
    group(
        "Products",
        Permission::ViewProducts,
        &[
            link("All Products", "/products", Some(Permission::ViewProducts)),
            link("Categories", "/products/categories", Some(Permission::ManageCategories)),
            link("Collections", "/collections", Some(Permission::ManageCategories)),
            link("Attributes", "/products/attributes", Some(Permission::ManageAttributes)),
            link("Inventory", "/products/inventory", Some(Permission::ManageInventory)),
        ],
    ),
    link("Orders", "/orders", Some(Permission::ViewOrders)),
    group(
        "Marketing",
        Permission::ManagePromotions,
        &[
            link("Promotions & Discounts", "/marketing/promotions", Some(Permission::ManagePromotions)),
            link("Banners & Sliders", "/marketing/banners", Some(Permission::ManageBanners)),
            link("Email Campaigns", "/marketing/email", Some(Permission::ManageMarketingCampaigns)),
        ],
    ),
    group(
        "Customer Support",
        Permission::ViewSupportTickets,
        &[
            link("Support Tickets", "/support/tickets", Some(Permission::ViewSupportTickets)),
            link("Reviews", "/reviews", Some(Permission::ManageReviews)),
        ],
    ),
    group(
        "Analytics",
        Permission::ViewAnalytics,
        &[
            link("Dashboard", "/analytics/dashboard", Some(Permission::ViewAnalytics)),
            link("Reports", "/analytics/reports", Some(Permission::ExportReports)),
        ],
    ),
    group(
        "Settings",
        Permission::ManageSettings,
        &[
            link("General", "/settings/general", Some(Permission::ManageSettings)),
            link("Shipping", "/settings/shipping", Some(Permission::ManageShippingMethods)),
            link("Payment", "/settings/payment", Some(Permission::ManagePaymentMethods)),
            link("Email Templates", "/settings/email", Some(Permission::ManageSettings)),
        ],
    ),
    link("Activity Logs", "/activity-logs", Some(Permission::ViewActivityLogs)),
];

/// Sidebar entries visible to `session`.
///
/// Groups left without children are dropped.
#[must_use]
pub fn sidebar(session: &AdminSession) -> Vec<NavItem> {
    let prefix = if session.is_super_admin() {
        SUPER_ADMIN_PREFIX
    } else {
        ADMIN_PREFIX
    };
    build(MENU, session, prefix)
}

fn build(entries: &[MenuEntry], session: &AdminSession, prefix: &str) -> Vec<NavItem> {
    entries
        .iter()
        .filter(|entry| entry.permission.is_none_or(|p| session.has_permission(p)))
        .filter_map(|entry| {
            let children = build(entry.children, session, prefix);
            if entry.path.is_none() && children.is_empty() {
                return None;
            }
            Some(NavItem {
                name: entry.name,
                href: entry.path.map(|path| format!("{prefix}{path}")),
                children,
            })
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use anime_tribes_core::{AdminId, Email, PermissionSet, Role};

    use super::*;

    fn session(role: Role, permissions: PermissionSet) -> AdminSession {
        AdminSession {
            id: AdminId::new("adm_3"),
            name: "Levi".to_string(),
            email: Email::parse("levi@animetribes.test").unwrap(),
            role,
            permissions,
        }
    }

    fn names(items: &[NavItem]) -> Vec<&'static str> {
        items.iter().map(|item| item.name).collect()
    }

    #[test]
    fn test_super_admin_sees_everything() {
        let menu = sidebar(&session(Role::SuperAdmin, PermissionSet::full_catalog()));
        assert_eq!(menu.len(), MENU.len());
        assert_eq!(menu[0].href.as_deref(), Some("/superadmin/dashboard"));
        let products = menu.iter().find(|i| i.name == "Products").unwrap();
        assert_eq!(products.children.len(), 5);
    }

    #[test]
    fn test_order_manager_menu() {
        let menu = sidebar(&session(
            Role::OrderManager,
            Role::OrderManager.default_permissions(),
        ));
        assert_eq!(names(&menu), vec!["Dashboard", "Orders"]);
        assert_eq!(menu[1].href.as_deref(), Some("/admin/orders"));
    }

    #[test]
    fn test_children_are_filtered() {
        let menu = sidebar(&session(
            Role::ProductManager,
            PermissionSet::from([Permission::ViewProducts, Permission::ManageInventory]),
        ));
        let products = menu.iter().find(|i| i.name == "Products").unwrap();
        assert_eq!(names(&products.children), vec!["All Products", "Inventory"]);
        assert!(products.href.is_none());
    }

    #[test]
    fn test_group_without_visible_children_is_dropped() {
        let menu = sidebar(&session(
            Role::Custom {
                name: None,
                permissions: PermissionSet::from([Permission::ManageAdmins]),
            },
            PermissionSet::from([Permission::ManageAdmins]),
        ));
        let users = menu.iter().find(|i| i.name == "User Management").unwrap();
        assert_eq!(names(&users.children), vec!["Admin Users"]);

        let menu = sidebar(&session(
            Role::Custom {
                name: None,
                permissions: PermissionSet::from([Permission::ManageSettings]),
            },
            PermissionSet::from([Permission::ManageSettings]),
        ));
        assert_eq!(names(&menu), vec!["Dashboard", "Settings"]);
    }
}
