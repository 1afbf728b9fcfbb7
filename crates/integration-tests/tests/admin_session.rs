//! Admin session store: permission resolution and persistence across a
//! simulated restart.

#![allow(clippy::unwrap_used)]

use anime_tribes_admin::access::{AccessDecision, authorize};
use anime_tribes_admin::navigation::sidebar;
use anime_tribes_admin::session::{AdminIdentity, SessionError, SessionStore};
use anime_tribes_core::storage::keys;
use anime_tribes_core::{
    AdminId, Email, MemoryStorage, Permission, PermissionSet, Role, RoleKind, Storage,
};

fn identity() -> AdminIdentity {
    AdminIdentity {
        id: AdminId::new("adm_42"),
        name: "Robin".to_string(),
        email: Email::parse("robin@animetribes.test").unwrap(),
    }
}

#[test]
fn test_has_permission_matches_resolved_set_for_every_role() {
    for kind in RoleKind::ALL {
        let mut store = SessionStore::open(MemoryStorage::new());
        let role = Role::from_kind(kind);

        if kind == RoleKind::SuperAdmin {
            store.login_super_admin(identity(), role).unwrap();
        } else {
            store.login_admin(identity(), role, None).unwrap();
        }

        let expected = if kind == RoleKind::SuperAdmin {
            PermissionSet::full_catalog()
        } else {
            kind.default_permissions()
        };
        for permission in Permission::ALL {
            assert_eq!(
                store.has_permission(permission),
                expected.contains(permission),
                "{kind} / {permission}"
            );
        }
    }
}

#[test]
fn test_super_admin_ignores_passed_permissions() {
    let mut store = SessionStore::open(MemoryStorage::new());
    store
        .login_admin(
            identity(),
            Role::SuperAdmin,
            Some(PermissionSet::from([Permission::ViewOrders])),
        )
        .unwrap();

    assert!(Permission::ALL.iter().all(|p| store.has_permission(*p)));
}

#[test]
fn test_session_survives_restart() {
    let storage = MemoryStorage::new();

    let mut store = SessionStore::open(storage.clone());
    let logged_in = store
        .login_admin(
            identity(),
            Role::Custom {
                name: Some("Night Shift".to_string()),
                permissions: PermissionSet::empty(),
            },
            Some(PermissionSet::from([
                Permission::ViewOrders,
                Permission::ViewSupportTickets,
            ])),
        )
        .unwrap()
        .clone();
    drop(store);

    let restarted = SessionStore::open(storage);
    assert_eq!(restarted.current(), Some(&logged_in));
    assert_eq!(restarted.role_name(), Some("Night Shift"));
}

#[test]
fn test_logout_clears_storage() {
    let storage = MemoryStorage::new();
    let mut store = SessionStore::open(storage.clone());
    store
        .login_admin(identity(), Role::OrderManager, None)
        .unwrap();
    store.logout().unwrap();

    assert!(storage.get(keys::ADMIN_USER).unwrap().is_none());
    assert!(!SessionStore::open(storage).is_authenticated());
}

#[test]
fn test_corrupt_session_starts_signed_out() {
    let storage = MemoryStorage::new();
    storage
        .set(keys::ADMIN_USER, r#"{"id":"adm_1","role":"wizard"}"#)
        .unwrap();

    let store = SessionStore::open(storage);
    assert!(!store.is_authenticated());
    assert!(!store.has_permission(Permission::ViewProducts));
}

#[test]
fn test_super_admin_entry_rejects_admins() {
    let mut store = SessionStore::open(MemoryStorage::new());
    let err = store
        .login_super_admin(identity(), Role::MarketingManager)
        .unwrap_err();

    assert!(matches!(err, SessionError::NotSuperAdmin));
    assert!(store.current().is_none());
}

#[test]
fn test_subscribers_see_login_and_logout() {
    let mut store = SessionStore::open(MemoryStorage::new());
    let rx = store.subscribe();

    store
        .login_admin(identity(), Role::AnalyticsManager, None)
        .unwrap();
    assert!(rx.borrow().is_authenticated());

    store.logout().unwrap();
    assert!(!rx.borrow().is_authenticated());
}

#[test]
fn test_session_drives_access_and_menu() {
    let mut store = SessionStore::open(MemoryStorage::new());
    assert_eq!(
        authorize(store.current(), "/admin/orders"),
        AccessDecision::Redirect("/admin/login")
    );

    store
        .login_admin(identity(), Role::OrderManager, None)
        .unwrap();
    let admin = store.current().unwrap();

    assert_eq!(authorize(Some(admin), "/admin/orders"), AccessDecision::Allow);
    assert_eq!(
        authorize(Some(admin), "/superadmin/dashboard"),
        AccessDecision::Redirect("/admin/dashboard")
    );
    let hrefs: Vec<_> = sidebar(admin)
        .into_iter()
        .filter_map(|item| item.href)
        .collect();
    assert_eq!(hrefs, vec!["/admin/dashboard", "/admin/orders"]);
}
