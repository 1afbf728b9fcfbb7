//! Admin session store.
//!
//! Holds the signed-in admin, persists it under the `adminUser` storage key
//! and publishes a [`SessionSnapshot`] on every change. Super admins always
//! hold the full permission catalog, whatever was supplied at login.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use anime_tribes_core::storage::{self, keys};
use anime_tribes_core::{AdminId, Email, Permission, PermissionSet, PersistError, Role, RoleKind, Storage};

use crate::error::{clear_sentry_user, set_sentry_user};

/// Errors returned by session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Super admin login attempted with another role.
    #[error("user is not a super admin")]
    NotSuperAdmin,

    /// The session could not be written to storage.
    #[error("failed to persist session: {0}")]
    Persistence(#[from] PersistError),
}

/// Who is logging in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminIdentity {
    pub id: AdminId,
    pub name: String,
    pub email: Email,
}

/// The authenticated admin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminSession {
    pub id: AdminId,
    pub name: String,
    pub email: Email,
    pub role: Role,
    /// Effective permissions.
    pub permissions: PermissionSet,
}

impl AdminSession {
    /// Resolve the effective permissions for `role`.
    ///
    /// Super admins get the full catalog. Everyone else gets `permissions`
    /// when non-empty, otherwise the role's defaults. Custom roles carry
    /// the resolved set.
    fn resolve(identity: AdminIdentity, role: Role, permissions: Option<PermissionSet>) -> Self {
        let permissions = if role.is_super_admin() {
            PermissionSet::full_catalog()
        } else {
            permissions
                .filter(|p| !p.is_empty())
                .unwrap_or_else(|| role.default_permissions())
        };

        let role = match role {
            Role::Custom { name, .. } => Role::Custom {
                name,
                permissions: permissions.clone(),
            },
            other => other,
        };

        Self {
            id: identity.id,
            name: identity.name,
            email: identity.email,
            role,
            permissions,
        }
    }

    #[must_use]
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.role.is_super_admin() || self.permissions.contains(permission)
    }

    #[must_use]
    pub const fn is_super_admin(&self) -> bool {
        self.role.is_super_admin()
    }

    /// Name shown for the role, e.g. in the sidebar header.
    #[must_use]
    pub fn role_name(&self) -> &str {
        self.role.display_name()
    }
}

/// Persisted layout of a session.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredAdmin {
    id: AdminId,
    name: String,
    email: Email,
    role: RoleKind,
    permissions: PermissionSet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    custom_role_name: Option<String>,
}

impl From<&AdminSession> for StoredAdmin {
    fn from(session: &AdminSession) -> Self {
        Self {
            id: session.id.clone(),
            name: session.name.clone(),
            email: session.email.clone(),
            role: session.role.kind(),
            permissions: session.permissions.clone(),
            custom_role_name: session.role.custom_name().map(str::to_owned),
        }
    }
}

impl From<StoredAdmin> for AdminSession {
    fn from(stored: StoredAdmin) -> Self {
        let role = match stored.role {
            RoleKind::Custom => Role::Custom {
                name: stored.custom_role_name,
                permissions: stored.permissions.clone(),
            },
            kind => Role::from_kind(kind),
        };
        let permissions = if role.is_super_admin() {
            PermissionSet::full_catalog()
        } else {
            stored.permissions
        };

        Self {
            id: stored.id,
            name: stored.name,
            email: stored.email,
            role,
            permissions,
        }
    }
}

/// What subscribers see after each change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub admin: Option<AdminSession>,
}

impl SessionSnapshot {
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.admin.is_some()
    }
}

/// The session store.
pub struct SessionStore<S: Storage> {
    storage: S,
    current: Option<AdminSession>,
    tx: watch::Sender<SessionSnapshot>,
}

impl<S: Storage> SessionStore<S> {
    /// Open the store, rehydrating any persisted session.
    ///
    /// A missing or unreadable session leaves the store unauthenticated.
    pub fn open(storage: S) -> Self {
        let current = match storage::load_json::<StoredAdmin, _>(&storage, keys::ADMIN_USER) {
            Ok(Some(stored)) => Some(AdminSession::from(stored)),
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "Failed to load admin session from storage");
                None
            }
        };

        if let Some(admin) = &current {
            debug!(admin_id = %admin.id, role = %admin.role.kind(), "Admin session restored");
        }

        let (tx, _rx) = watch::channel(SessionSnapshot {
            admin: current.clone(),
        });

        Self {
            storage,
            current,
            tx,
        }
    }

    /// Log in through the super admin entry point.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotSuperAdmin`] unless `role` is super admin,
    /// or [`SessionError::Persistence`] if the session could not be saved.
    pub fn login_super_admin(
        &mut self,
        identity: AdminIdentity,
        role: Role,
    ) -> Result<&AdminSession, SessionError> {
        if !role.is_super_admin() {
            warn!(admin_id = %identity.id, role = %role.kind(), "Rejected super admin login");
            return Err(SessionError::NotSuperAdmin);
        }
        self.commit(AdminSession::resolve(identity, role, None))
    }

    /// Log in through the admin entry point.
    ///
    /// `permissions` overrides the role defaults when non-empty.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Persistence`] if the session could not be
    /// saved.
    pub fn login_admin(
        &mut self,
        identity: AdminIdentity,
        role: Role,
        permissions: Option<PermissionSet>,
    ) -> Result<&AdminSession, SessionError> {
        self.commit(AdminSession::resolve(identity, role, permissions))
    }

    /// End the session. Does nothing when nobody is signed in.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Persistence`] if storage could not be cleared.
    pub fn logout(&mut self) -> Result<(), SessionError> {
        let Some(admin) = &self.current else {
            return Ok(());
        };
        let admin_id = admin.id.clone();

        self.storage
            .remove(keys::ADMIN_USER)
            .map_err(PersistError::from)?;

        self.current = None;
        self.tx.send_replace(SessionSnapshot::default());
        clear_sentry_user();
        info!(%admin_id, "Admin logged out");
        Ok(())
    }

    #[must_use]
    pub const fn current(&self) -> Option<&AdminSession> {
        self.current.as_ref()
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    #[must_use]
    pub fn is_super_admin(&self) -> bool {
        self.current.as_ref().is_some_and(AdminSession::is_super_admin)
    }

    /// Whether the signed-in admin may use `permission`. False when signed out.
    #[must_use]
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.current
            .as_ref()
            .is_some_and(|admin| admin.has_permission(permission))
    }

    #[must_use]
    pub fn role_name(&self) -> Option<&str> {
        self.current.as_ref().map(AdminSession::role_name)
    }

    /// Receive a snapshot after every committed change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.tx.subscribe()
    }

    fn commit(&mut self, session: AdminSession) -> Result<&AdminSession, SessionError> {
        storage::save_json(&self.storage, keys::ADMIN_USER, &StoredAdmin::from(&session))?;

        set_sentry_user(&session.id, Some(session.email.as_str()));
        info!(
            admin_id = %session.id,
            role = %session.role.kind(),
            permissions = session.permissions.len(),
            "Admin logged in"
        );

        self.tx.send_replace(SessionSnapshot {
            admin: Some(session.clone()),
        });
        Ok(self.current.insert(session))
    }
}
