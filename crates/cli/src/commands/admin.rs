//! Admin session commands.

use anime_tribes_admin::access::{self, AccessDecision};
use anime_tribes_admin::navigation::{self, NavItem};
use anime_tribes_admin::session::{AdminIdentity, SessionError, SessionStore};
use anime_tribes_core::{AdminId, Email, EmailError, Permission, PermissionSet, Role, RoleKind};
use thiserror::Error;
use tracing::{info, warn};

use crate::storage::FileStorage;

#[derive(Debug, Error)]
pub enum AdminCommandError {
    #[error("Invalid email: {0}")]
    Email(#[from] EmailError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Denied(#[from] access::PermissionDenied),

    #[error("Not logged in")]
    NotLoggedIn,
}

/// Arguments of `admin login`.
pub struct Login {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: RoleKind,
    pub custom_name: Option<String>,
    pub permissions: Vec<Permission>,
    pub super_admin: bool,
}

pub fn open(storage: FileStorage) -> SessionStore<FileStorage> {
    SessionStore::open(storage)
}

fn role_for(kind: RoleKind, custom_name: Option<String>, permissions: &PermissionSet) -> Role {
    match kind {
        RoleKind::Custom => Role::Custom {
            name: custom_name,
            permissions: permissions.clone(),
        },
        other => Role::from_kind(other),
    }
}

/// Log in through the admin or super admin entry point.
pub fn login(
    sessions: &mut SessionStore<FileStorage>,
    args: Login,
) -> Result<(), AdminCommandError> {
    let identity = AdminIdentity {
        id: AdminId::new(args.id),
        name: args.name,
        email: Email::parse(&args.email)?,
    };
    let explicit: PermissionSet = args.permissions.into_iter().collect();
    let role = role_for(args.role, args.custom_name, &explicit);

    let admin = if args.super_admin {
        sessions.login_super_admin(identity, role)?
    } else {
        let permissions = (!explicit.is_empty()).then_some(explicit);
        sessions.login_admin(identity, role, permissions)?
    };

    info!(
        "Logged in as {} <{}> ({}, {} permissions)",
        admin.name,
        admin.email,
        admin.role_name(),
        admin.permissions.len()
    );
    Ok(())
}

pub fn logout(sessions: &mut SessionStore<FileStorage>) -> Result<(), AdminCommandError> {
    if !sessions.is_authenticated() {
        info!("Nobody is logged in");
        return Ok(());
    }
    sessions.logout()?;
    info!("Logged out");
    Ok(())
}

pub fn whoami(sessions: &SessionStore<FileStorage>) {
    let Some(admin) = sessions.current() else {
        info!("Not logged in");
        return;
    };

    info!("{} <{}>", admin.name, admin.email);
    info!("  Id:   {}", admin.id);
    info!("  Role: {}", admin.role_name());
    let permissions: Vec<&str> = admin.permissions.iter().map(Permission::as_str).collect();
    info!("  Permissions: {}", permissions.join(", "));
}

/// Fails with a non-zero exit when the permission is missing.
pub fn can(
    sessions: &SessionStore<FileStorage>,
    permission: Permission,
) -> Result<(), AdminCommandError> {
    access::require_permission(sessions.current(), permission)?;
    info!("Allowed: {permission}");
    Ok(())
}

pub fn menu(sessions: &SessionStore<FileStorage>) -> Result<(), AdminCommandError> {
    let admin = sessions.current().ok_or(AdminCommandError::NotLoggedIn)?;
    for line in render_menu(&navigation::sidebar(admin)) {
        info!("{line}");
    }
    Ok(())
}

pub fn access(sessions: &SessionStore<FileStorage>, path: &str) {
    match access::authorize(sessions.current(), path) {
        AccessDecision::Allow => info!("{path}: allowed"),
        AccessDecision::Redirect(to) => warn!("{path}: redirect to {to}"),
    }
}

fn render_menu(items: &[NavItem]) -> Vec<String> {
    let mut lines = Vec::new();
    for item in items {
        match &item.href {
            Some(href) => lines.push(format!("{} ({href})", item.name)),
            None => lines.push(item.name.to_string()),
        }
        for child in &item.children {
            let href = child.href.as_deref().unwrap_or_default();
            lines.push(format!("  {} ({href})", child.name));
        }
    }
    lines
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn login_args(role: RoleKind, permissions: Vec<Permission>) -> Login {
        Login {
            id: "adm_1".to_string(),
            name: "Nami".to_string(),
            email: "nami@animetribes.test".to_string(),
            role,
            custom_name: Some("Night Shift".to_string()),
            permissions,
            super_admin: false,
        }
    }

    #[test]
    fn test_login_persists_between_invocations() {
        let dir = tempfile::tempdir().unwrap();

        let mut sessions = open(FileStorage::new(dir.path()));
        login(&mut sessions, login_args(RoleKind::OrderManager, vec![])).unwrap();

        let reopened = open(FileStorage::new(dir.path()));
        assert!(reopened.has_permission(Permission::ManageOrders));
        assert!(!reopened.has_permission(Permission::ManageRoles));
        assert_eq!(reopened.role_name(), Some("Order Manager"));
    }

    #[test]
    fn test_custom_role_uses_explicit_permissions() {
        let dir = tempfile::tempdir().unwrap();
        let mut sessions = open(FileStorage::new(dir.path()));
        login(
            &mut sessions,
            login_args(RoleKind::Custom, vec![Permission::ViewOrders]),
        )
        .unwrap();

        assert_eq!(sessions.role_name(), Some("Night Shift"));
        assert!(can(&sessions, Permission::ViewOrders).is_ok());
        assert!(can(&sessions, Permission::ManageOrders).is_err());
    }

    #[test]
    fn test_super_admin_entry_rejects_other_roles() {
        let dir = tempfile::tempdir().unwrap();
        let mut sessions = open(FileStorage::new(dir.path()));
        let mut args = login_args(RoleKind::ProductManager, vec![]);
        args.super_admin = true;

        let err = login(&mut sessions, args).unwrap_err();
        assert!(matches!(
            err,
            AdminCommandError::Session(SessionError::NotSuperAdmin)
        ));
        assert!(!sessions.is_authenticated());
    }

    #[test]
    fn test_menu_requires_login() {
        let dir = tempfile::tempdir().unwrap();
        let sessions = open(FileStorage::new(dir.path()));
        assert!(matches!(
            menu(&sessions),
            Err(AdminCommandError::NotLoggedIn)
        ));
    }

    #[test]
    fn test_render_menu_indents_children() {
        let items = vec![NavItem {
            name: "Products",
            href: None,
            children: vec![NavItem {
                name: "All Products",
                href: Some("/admin/products".to_string()),
                children: vec![],
            }],
        }];
        assert_eq!(
            render_menu(&items),
            vec!["Products", "  All Products (/admin/products)"]
        );
    }
}
