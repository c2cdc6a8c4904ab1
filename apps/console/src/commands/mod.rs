//! # Console Commands
//!
//! One module per area. Every command takes the [`AppContext`] and returns
//! the lines to print.
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Command Flow                                         │
//! │                                                                         │
//! │  showroom sales delete 4                                                │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  signed_in(ctx)  ── no token ──► UNAUTHORIZED                           │
//! │         │           token, no profile ──► GET auth/me                   │
//! │         ▼                                                               │
//! │  ctx.api.delete_sale(4)  ── role gate ──► FORBIDDEN                     │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  render_*(…) ──► Vec<String> ──► stdout                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rendering is kept in plain functions over the fetched data so it can be
//! tested without a backend.

pub mod auth;
pub mod customers;
pub mod dashboard;
pub mod imports;
pub mod records;
pub mod sales;
pub mod stock;

use chrono::{DateTime, FixedOffset, Local};
use showroom_client::AppContext;
use showroom_core::UserProfile;

use crate::error::{CommandError, CommandResult};

/// The profile of the stored session, loading it if only a token is known.
pub(crate) async fn signed_in(ctx: &AppContext) -> CommandResult<UserProfile> {
    ctx.api
        .ensure_profile()
        .await?
        .ok_or_else(CommandError::not_signed_in)
}

/// The operator's wall clock with its UTC offset.
pub(crate) fn now() -> DateTime<FixedOffset> {
    Local::now().fixed_offset()
}

/// Placeholder for absent text columns.
pub(crate) fn or_dash(value: Option<&str>) -> &str {
    value.filter(|v| !v.trim().is_empty()).unwrap_or("-")
}
