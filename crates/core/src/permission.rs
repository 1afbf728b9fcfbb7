//! Permission catalog and admin roles.
//!
//! The catalog is fixed at build time. Every role except [`Role::Custom`]
//! maps to a fixed default permission set; custom roles carry their own
//! set and an optional display name.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A fine-grained admin capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    // Products
    ViewProducts,
    ManageProducts,
    ManageCategories,
    ManageInventory,
    ManageAttributes,

    // Orders
    ViewOrders,
    ManageOrders,
    ProcessRefunds,
    ViewCustomers,

    // Marketing
    ManagePromotions,
    ManageBanners,
    ManageMarketingCampaigns,

    // Customer support
    ViewSupportTickets,
    ManageSupportTickets,
    ManageReviews,

    // Analytics
    ViewAnalytics,
    ExportReports,

    // Admin management
    ManageAdmins,
    ManageRoles,
    ViewActivityLogs,

    // Settings
    ManageSettings,
    ManagePaymentMethods,
    ManageShippingMethods,
}

impl Permission {
    /// The whole catalog, in catalog order.
    pub const ALL: [Self; 23] = [
        Self::ViewProducts,
        Self::ManageProducts,
        Self::ManageCategories,
        Self::ManageInventory,
        Self::ManageAttributes,
        Self::ViewOrders,
        Self::ManageOrders,
        Self::ProcessRefunds,
        Self::ViewCustomers,
        Self::ManagePromotions,
        Self::ManageBanners,
        Self::ManageMarketingCampaigns,
        Self::ViewSupportTickets,
        Self::ManageSupportTickets,
        Self::ManageReviews,
        Self::ViewAnalytics,
        Self::ExportReports,
        Self::ManageAdmins,
        Self::ManageRoles,
        Self::ViewActivityLogs,
        Self::ManageSettings,
        Self::ManagePaymentMethods,
        Self::ManageShippingMethods,
    ];

    /// The wire tag, e.g. `manage_orders`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ViewProducts => "view_products",
            Self::ManageProducts => "manage_products",
            Self::ManageCategories => "manage_categories",
            Self::ManageInventory => "manage_inventory",
            Self::ManageAttributes => "manage_attributes",
            Self::ViewOrders => "view_orders",
            Self::ManageOrders => "manage_orders",
            Self::ProcessRefunds => "process_refunds",
            Self::ViewCustomers => "view_customers",
            Self::ManagePromotions => "manage_promotions",
            Self::ManageBanners => "manage_banners",
            Self::ManageMarketingCampaigns => "manage_marketing_campaigns",
            Self::ViewSupportTickets => "view_support_tickets",
            Self::ManageSupportTickets => "manage_support_tickets",
            Self::ManageReviews => "manage_reviews",
            Self::ViewAnalytics => "view_analytics",
            Self::ExportReports => "export_reports",
            Self::ManageAdmins => "manage_admins",
            Self::ManageRoles => "manage_roles",
            Self::ViewActivityLogs => "view_activity_logs",
            Self::ManageSettings => "manage_settings",
            Self::ManagePaymentMethods => "manage_payment_methods",
            Self::ManageShippingMethods => "manage_shipping_methods",
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Permission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| format!("unknown permission: {s}"))
    }
}

/// An ordered set of permissions, stored as a JSON array of tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet(BTreeSet<Permission>);

impl PermissionSet {
    /// The empty set.
    #[must_use]
    pub const fn empty() -> Self {
        Self(BTreeSet::new())
    }

    /// Every permission in the catalog.
    #[must_use]
    pub fn full_catalog() -> Self {
        Permission::ALL.into_iter().collect()
    }

    /// Membership test.
    #[must_use]
    pub fn contains(&self, permission: Permission) -> bool {
        self.0.contains(&permission)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Permission> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<const N: usize> From<[Permission; N]> for PermissionSet {
    fn from(permissions: [Permission; N]) -> Self {
        permissions.into_iter().collect()
    }
}

/// The wire tag of a role, as stored alongside a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoleKind {
    SuperAdmin,
    ProductManager,
    OrderManager,
    MarketingManager,
    CustomerSupportManager,
    AnalyticsManager,
    Custom,
}

impl RoleKind {
    /// Every role kind.
    pub const ALL: [Self; 7] = [
        Self::SuperAdmin,
        Self::ProductManager,
        Self::OrderManager,
        Self::MarketingManager,
        Self::CustomerSupportManager,
        Self::AnalyticsManager,
        Self::Custom,
    ];

    /// Default permissions granted by this role. Empty for `custom`.
    #[must_use]
    pub fn default_permissions(self) -> PermissionSet {
        use Permission as P;

        match self {
            Self::SuperAdmin => PermissionSet::full_catalog(),
            Self::ProductManager => PermissionSet::from([
                P::ViewProducts,
                P::ManageProducts,
                P::ManageCategories,
                P::ManageInventory,
                P::ManageAttributes,
            ]),
            Self::OrderManager => PermissionSet::from([
                P::ViewOrders,
                P::ManageOrders,
                P::ProcessRefunds,
                P::ViewCustomers,
            ]),
            Self::MarketingManager => PermissionSet::from([
                P::ManagePromotions,
                P::ManageBanners,
                P::ManageMarketingCampaigns,
            ]),
            Self::CustomerSupportManager => PermissionSet::from([
                P::ViewSupportTickets,
                P::ManageSupportTickets,
                P::ManageReviews,
                P::ViewCustomers,
            ]),
            Self::AnalyticsManager => PermissionSet::from([P::ViewAnalytics, P::ExportReports]),
            Self::Custom => PermissionSet::empty(),
        }
    }

    /// Human-readable role name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::SuperAdmin => "Super Admin",
            Self::ProductManager => "Product Manager",
            Self::OrderManager => "Order Manager",
            Self::MarketingManager => "Marketing Manager",
            Self::CustomerSupportManager => "Customer Support Manager",
            Self::AnalyticsManager => "Analytics Manager",
            Self::Custom => "Custom Role",
        }
    }

    /// The wire tag, e.g. `order-manager`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SuperAdmin => "super-admin",
            Self::ProductManager => "product-manager",
            Self::OrderManager => "order-manager",
            Self::MarketingManager => "marketing-manager",
            Self::CustomerSupportManager => "customer-support-manager",
            Self::AnalyticsManager => "analytics-manager",
            Self::Custom => "custom",
        }
    }
}

impl std::fmt::Display for RoleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RoleKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("invalid admin role: {s}"))
    }
}

/// Display name for a role tag, preferring a custom name for custom roles.
#[must_use]
pub fn display_name(kind: RoleKind, custom_name: Option<&str>) -> &str {
    match (kind, custom_name) {
        (RoleKind::Custom, Some(name)) if !name.is_empty() => name,
        _ => kind.display_name(),
    }
}

/// An admin role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    SuperAdmin,
    ProductManager,
    OrderManager,
    MarketingManager,
    CustomerSupportManager,
    AnalyticsManager,
    /// A role assembled by a super admin.
    Custom {
        name: Option<String>,
        permissions: PermissionSet,
    },
}

impl Role {
    /// Build a role from its wire tag. Custom roles start with no permissions.
    #[must_use]
    pub const fn from_kind(kind: RoleKind) -> Self {
        match kind {
            RoleKind::SuperAdmin => Self::SuperAdmin,
            RoleKind::ProductManager => Self::ProductManager,
            RoleKind::OrderManager => Self::OrderManager,
            RoleKind::MarketingManager => Self::MarketingManager,
            RoleKind::CustomerSupportManager => Self::CustomerSupportManager,
            RoleKind::AnalyticsManager => Self::AnalyticsManager,
            RoleKind::Custom => Self::Custom {
                name: None,
                permissions: PermissionSet::empty(),
            },
        }
    }

    #[must_use]
    pub const fn kind(&self) -> RoleKind {
        match self {
            Self::SuperAdmin => RoleKind::SuperAdmin,
            Self::ProductManager => RoleKind::ProductManager,
            Self::OrderManager => RoleKind::OrderManager,
            Self::MarketingManager => RoleKind::MarketingManager,
            Self::CustomerSupportManager => RoleKind::CustomerSupportManager,
            Self::AnalyticsManager => RoleKind::AnalyticsManager,
            Self::Custom { .. } => RoleKind::Custom,
        }
    }

    #[must_use]
    pub const fn is_super_admin(&self) -> bool {
        matches!(self, Self::SuperAdmin)
    }

    /// Permissions this role grants when none are supplied explicitly.
    #[must_use]
    pub fn default_permissions(&self) -> PermissionSet {
        match self {
            Self::Custom { permissions, .. } => permissions.clone(),
            other => other.kind().default_permissions(),
        }
    }

    /// The custom display name, if this is a named custom role.
    #[must_use]
    pub fn custom_name(&self) -> Option<&str> {
        match self {
            Self::Custom { name, .. } => name.as_deref(),
            _ => None,
        }
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        display_name(self.kind(), self.custom_name())
    }
}
