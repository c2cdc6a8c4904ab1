//! # showroom-core: Pure Domain Logic for the Showroom Console
//!
//! Everything the dealership console computes without touching the network.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Showroom Console Architecture                       │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Console / View layer                         │   │
//! │  │    Dashboard ──► Inventory ──► Sales ──► Transfers ──► Imports  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │          showroom-client (cache, session, transport)            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ Arc<Vec<T>> snapshots                  │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ showroom-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │ analytics │  │ validation│  │   │
//! │  │   │  Branch   │  │   Money   │  │ Dashboard │  │   rules   │  │   │
//! │  │   │  Stock    │  │  parsing  │  │  Metrics  │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • NO CLOCK • PURE FUNCTIONS               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Backend entities (Branch, VehicleStock, SalesRecord, ...)
//! - [`money`] - Integer money (paise) and lenient decimal parsing
//! - [`analytics`] - Dashboard aggregation and its memo
//! - [`filters`] - List filters rendered to canonical query parameters
//! - [`format`] - Currency/date display helpers
//! - [`status`] - Status pill tones and labels
//! - [`permissions`] - Role gates and navigation
//! - [`validation`] - Form validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: The caller passes `now`; nothing reads the clock
//! 2. **Integer Money**: Amounts are paise (i64), parsed once from decimal strings
//! 3. **Safe Defaults**: Malformed numbers become `0`, malformed dates become `"-"`
//!
//! ## Example Usage
//!
//! ```rust
//! use showroom_core::money::Money;
//!
//! let amount = Money::parse_or_zero("1000.50");
//! assert_eq!(amount.paise(), 100_050);
//! assert_eq!(Money::parse_or_zero("abc"), Money::zero());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod analytics;
pub mod error;
pub mod filters;
pub mod format;
pub mod money;
pub mod permissions;
pub mod status;
pub mod timestamp;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use analytics::{compute_dashboard, AnalyticsMemo, BranchStock, DashboardMetrics};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use permissions::{Capability, NavItem, Permissions};
pub use status::StatusTone;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Stock rows at or below this quantity show up in the low-stock list.
pub const LOW_STOCK_THRESHOLD: i64 = 3;

/// Maximum rows in the dashboard low-stock list.
pub const LOW_STOCK_LIMIT: usize = 8;

/// Maximum rows in the dashboard recent-sales list.
pub const RECENT_SALES_LIMIT: usize = 10;

/// Label used when a stock row carries no variant.
pub const DEFAULT_VARIANT: &str = "Standard";

/// Label used when a stock row is not attached to a branch.
pub const UNASSIGNED_BRANCH: &str = "Unassigned";
