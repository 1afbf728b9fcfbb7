//! Access decisions for the admin areas.
//!
//! Two areas exist: `/superadmin/*` for super admins and `/admin/*` for
//! everyone else. Signed-out visitors are sent to the matching login page;
//! admins who wander into the super admin area are sent to their own
//! dashboard.

use anime_tribes_core::Permission;
use thiserror::Error;

use crate::session::AdminSession;

pub const SUPER_ADMIN_PREFIX: &str = "/superadmin";
pub const ADMIN_PREFIX: &str = "/admin";

pub const SUPER_ADMIN_LOGIN: &str = "/superadmin/login";
pub const ADMIN_LOGIN: &str = "/admin/login";
pub const ADMIN_DASHBOARD: &str = "/admin/dashboard";

/// The session lacks a required permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("missing permission {permission}")]
pub struct PermissionDenied {
    pub permission: Permission,
}

/// Outcome of checking a path against the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Allow,
    Redirect(&'static str),
}

/// Whether `path` is inside the area rooted at `prefix`.
fn in_area(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Decide whether `session` may view `path`.
///
/// Login pages and paths outside both admin areas are always allowed.
#[must_use]
pub fn authorize(session: Option<&AdminSession>, path: &str) -> AccessDecision {
    let super_area = in_area(path, SUPER_ADMIN_PREFIX);
    let admin_area = in_area(path, ADMIN_PREFIX);

    if !(super_area || admin_area) || path == SUPER_ADMIN_LOGIN || path == ADMIN_LOGIN {
        return AccessDecision::Allow;
    }

    match session {
        None if super_area => AccessDecision::Redirect(SUPER_ADMIN_LOGIN),
        None => AccessDecision::Redirect(ADMIN_LOGIN),
        Some(admin) if super_area && !admin.is_super_admin() => {
            AccessDecision::Redirect(ADMIN_DASHBOARD)
        }
        Some(_) => AccessDecision::Allow,
    }
}

/// Require `permission` of the signed-in admin.
///
/// # Errors
///
/// Returns [`PermissionDenied`] when signed out or the permission is missing.
pub fn require_permission(
    session: Option<&AdminSession>,
    permission: Permission,
) -> Result<(), PermissionDenied> {
    if session.is_some_and(|admin| admin.has_permission(permission)) {
        Ok(())
    } else {
        Err(PermissionDenied { permission })
    }
}
