//! # Role Permissions
//!
//! What each [`UserRole`] may see and do in the console.
//!
//! ## Role Matrix
//! ```text
//! ┌──────────────────────────┬─────────┬──────────┐
//! │ Capability               │  ADMIN  │ SALESMAN │
//! ├──────────────────────────┼─────────┼──────────┤
//! │ Capture / update sales   │   ✅    │    ✅    │
//! │ Delete sales             │   ✅    │    ❌    │
//! │ Delete customers         │   ✅    │    ❌    │
//! │ Create/edit/adjust stock │   ✅    │    ❌    │
//! │ Import / export workbook │   ✅    │    ❌    │
//! │ Sales page size          │   200   │   100    │
//! │ Landing route            │   /     │  /sales  │
//! └──────────────────────────┴─────────┴──────────┘
//! ```
//!
//! The backend is authoritative; these gates only stop the console from
//! offering actions that would be refused anyway.

use serde::Serialize;
use ts_rs::TS;

use crate::types::UserRole;

/// Capability flags for one role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct Permissions {
    pub delete_customers: bool,
    pub manage_stock: bool,
    pub delete_sales: bool,
    pub import_export: bool,
    pub sales_page_limit: u32,
}

/// A single gated capability, used when refusing an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    DeleteCustomers,
    ManageStock,
    DeleteSales,
    ImportExport,
}

impl Capability {
    pub fn description(&self) -> &'static str {
        match self {
            Capability::DeleteCustomers => "delete customers",
            Capability::ManageStock => "manage vehicle stock",
            Capability::DeleteSales => "delete sales records",
            Capability::ImportExport => "import or export stock workbooks",
        }
    }
}

impl Permissions {
    pub fn allows(&self, capability: Capability) -> bool {
        match capability {
            Capability::DeleteCustomers => self.delete_customers,
            Capability::ManageStock => self.manage_stock,
            Capability::DeleteSales => self.delete_sales,
            Capability::ImportExport => self.import_export,
        }
    }
}

impl UserRole {
    pub fn permissions(&self) -> Permissions {
        match self {
            UserRole::Admin => Permissions {
                delete_customers: true,
                manage_stock: true,
                delete_sales: true,
                import_export: true,
                sales_page_limit: 200,
            },
            UserRole::Salesman => Permissions {
                delete_customers: false,
                manage_stock: false,
                delete_sales: false,
                import_export: false,
                sales_page_limit: 100,
            },
        }
    }

    /// Route a user lands on after login.
    pub fn landing_route(&self) -> &'static str {
        match self {
            UserRole::Admin => "/",
            UserRole::Salesman => "/sales",
        }
    }

    /// Navigation entries visible to this role, in display order.
    pub fn navigation(&self) -> Vec<NavItem> {
        NavItem::ALL
            .iter()
            .copied()
            .filter(|item| item.visible_to(*self))
            .collect()
    }
}

// =============================================================================
// Navigation
// =============================================================================

/// Sidebar entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, TS)]
#[ts(export)]
pub enum NavItem {
    Dashboard,
    Inventory,
    Sales,
    Customers,
    Payments,
    Transfers,
    Imports,
    Anomalies,
    Settings,
}

impl NavItem {
    pub const ALL: [NavItem; 9] = [
        NavItem::Dashboard,
        NavItem::Inventory,
        NavItem::Sales,
        NavItem::Customers,
        NavItem::Payments,
        NavItem::Transfers,
        NavItem::Imports,
        NavItem::Anomalies,
        NavItem::Settings,
    ];

    pub fn route(&self) -> &'static str {
        match self {
            NavItem::Dashboard => "/",
            NavItem::Inventory => "/inventory",
            NavItem::Sales => "/sales",
            NavItem::Customers => "/customers",
            NavItem::Payments => "/payments",
            NavItem::Transfers => "/transfers",
            NavItem::Imports => "/imports",
            NavItem::Anomalies => "/anomalies",
            NavItem::Settings => "/settings",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            NavItem::Dashboard => "Dashboard",
            NavItem::Inventory => "Inventory",
            NavItem::Sales => "Sales",
            NavItem::Customers => "Customers",
            NavItem::Payments => "Payments",
            NavItem::Transfers => "Transfers",
            NavItem::Imports => "Imports",
            NavItem::Anomalies => "Anomalies",
            NavItem::Settings => "Settings",
        }
    }

    /// Salesmen see sale capture, customers and their own settings.
    pub fn visible_to(&self, role: UserRole) -> bool {
        match role {
            UserRole::Admin => true,
            UserRole::Salesman => matches!(
                self,
                NavItem::Inventory | NavItem::Sales | NavItem::Customers | NavItem::Settings
            ),
        }
    }
}
