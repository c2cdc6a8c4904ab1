//! # Domain Types
//!
//! The entities the dealership backend serves, as the console sees them.
//!
//! ## Entity Relationships
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Entity Relationships                             │
//! │                                                                         │
//! │  ┌──────────┐ 1    * ┌──────────────┐ 1    * ┌──────────────┐          │
//! │  │  Branch  │───────►│ VehicleStock │───────►│ SalesRecord  │          │
//! │  └──────────┘ (code) └──────────────┘  (id)  └──────┬───────┘          │
//! │       │                                            │ *                  │
//! │       │ from/to                                    ▼ 1                  │
//! │  ┌────┴──────────┐  ┌───────────────┐      ┌──────────────┐            │
//! │  │TransferRecord │  │ PaymentRecord │      │   Customer   │            │
//! │  └───────────────┘  └───────────────┘      └──────────────┘            │
//! │                                                                         │
//! │  ┌───────────────┐  ┌───────────────┐      ┌──────────────┐            │
//! │  │ AnomalyRecord │  │   ImportJob   │      │ UserProfile  │ ADMIN |    │
//! │  └───────────────┘  └───────────────┘      └──────────────┘ SALESMAN   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ownership
//! The backend owns every record. These are read-through copies; timestamps
//! stay as the server's strings and are parsed only where they are used
//! (see [`crate::timestamp`]).

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::CoreError;
use crate::money::Money;
use crate::{DEFAULT_VARIANT, UNASSIGNED_BRANCH};

// =============================================================================
// Roles & Profile
// =============================================================================

/// Role attached to a console user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum UserRole {
    /// Full access, including destructive actions and stock management.
    Admin,
    /// Sale capture and read access.
    Salesman,
}

impl UserRole {
    /// Wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "ADMIN",
            UserRole::Salesman => "SALESMAN",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "ADMIN" => Ok(UserRole::Admin),
            "SALESMAN" => Ok(UserRole::Salesman),
            other => Err(CoreError::UnknownRole(other.to_string())),
        }
    }
}

/// The authenticated user as returned by `auth/me`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UserProfile {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub user_role: UserRole,
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

impl UserProfile {
    /// Full name when set, otherwise the username.
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.username)
    }

    pub fn is_admin(&self) -> bool {
        self.user_role == UserRole::Admin
    }
}

/// Access/refresh token pair issued by `auth/login` and `auth/refresh`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

// =============================================================================
// Branches
// =============================================================================

/// A dealership showroom location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Branch {
    pub id: i64,
    pub name: String,
    pub city: String,
    pub code: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    pub created_at: String,
    pub updated_at: String,
}

// =============================================================================
// Vehicle Stock
// =============================================================================

/// A (model, variant, color, branch) quantity record.
///
/// `reserved <= quantity` is expected but never enforced here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct VehicleStock {
    pub id: i64,
    #[serde(default)]
    pub excel_row_number: Option<i64>,
    #[serde(default)]
    pub model_code: Option<String>,
    pub model_name: String,
    #[serde(default)]
    pub variant: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    pub quantity: i64,
    #[serde(default)]
    pub reserved: i64,
    #[serde(default)]
    pub branch_code: Option<String>,
    #[serde(default)]
    pub branch_name: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub last_synced_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl VehicleStock {
    /// Units that can still be sold: `max(quantity - reserved, 0)`.
    pub fn available(&self) -> i64 {
        (self.quantity - self.reserved).max(0)
    }

    /// Variant name, or "Standard" when absent or blank.
    pub fn variant_label(&self) -> &str {
        non_blank(self.variant.as_deref()).unwrap_or(DEFAULT_VARIANT)
    }

    /// Branch name, or "Unassigned" when absent or blank.
    pub fn branch_label(&self) -> &str {
        non_blank(self.branch_name.as_deref()).unwrap_or(UNASSIGNED_BRANCH)
    }
}

/// Body for `POST vehicle-stock`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct VehicleStockDraft {
    pub model_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub quantity: i64,
    #[serde(default)]
    pub reserved: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}

/// Body for `PATCH vehicle-stock/{id}`. Unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct VehicleStockPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reserved: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}

/// Body for `POST vehicle-stock/{id}/adjust`.
///
/// The backend rejects (400) an adjustment that would drive quantity negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StockAdjustment {
    pub adjustment: i64,
}

/// Result of a workbook import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StockImportSummary {
    #[serde(default)]
    pub processed: i64,
    #[serde(default)]
    pub created: i64,
    #[serde(default)]
    pub updated: i64,
    #[serde(default)]
    pub removed: i64,
    #[serde(default)]
    pub workbook: Option<String>,
}

// =============================================================================
// Customers
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Customer {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Body for `POST customers`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CustomerDraft {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// Body for `PATCH customers/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CustomerPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

// =============================================================================
// Sales
// =============================================================================

/// How a sale was paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum PaymentMode {
    Cash,
    /// Instant payment (UPI / bank transfer).
    Ip,
    Finance,
}

impl PaymentMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMode::Cash => "CASH",
            PaymentMode::Ip => "IP",
            PaymentMode::Finance => "FINANCE",
        }
    }
}

impl fmt::Display for PaymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "CASH" => Ok(PaymentMode::Cash),
            "IP" => Ok(PaymentMode::Ip),
            "FINANCE" => Ok(PaymentMode::Finance),
            other => Err(CoreError::UnknownPaymentMode(other.to_string())),
        }
    }
}

/// A captured sale.
///
/// `amount_received` stays a decimal string; use [`SalesRecord::amount`]
/// for arithmetic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SalesRecord {
    pub id: i64,
    pub customer_id: i64,
    pub vehicle_stock_id: i64,
    pub vehicle_name: String,
    #[serde(default)]
    pub variant: String,
    #[serde(default)]
    pub color: String,
    pub payment_mode: PaymentMode,
    #[serde(default)]
    pub bank: Option<String>,
    #[serde(default)]
    pub payment_date: Option<String>,
    #[serde(deserialize_with = "decimal_string")]
    pub amount_received: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub executive_id: Option<i64>,
    #[serde(default)]
    pub branch_code: Option<String>,
    #[serde(default)]
    pub branch_name: Option<String>,
    #[serde(default)]
    pub is_payment_received: bool,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default)]
    pub customer: Option<Customer>,
    #[serde(default)]
    pub executive: Option<UserProfile>,
}

impl SalesRecord {
    /// Amount received, zero when the server string is malformed.
    pub fn amount(&self) -> Money {
        Money::parse_or_zero(&self.amount_received)
    }

    /// Branch identity for grouping: name, falling back to code.
    pub fn branch_key(&self) -> Option<&str> {
        non_blank(self.branch_name.as_deref()).or_else(|| non_blank(self.branch_code.as_deref()))
    }
}

/// Body for `POST sales-records`.
///
/// Either `customer_id` names an existing customer or the inline
/// `customer_*` fields create one server-side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_location: Option<String>,
    pub vehicle_stock_id: i64,
    pub payment_mode: PaymentMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_date: Option<String>,
    pub amount_received: String,
    #[serde(default)]
    pub is_payment_received: bool,
}

/// Body for `PATCH sales-records/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SalePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_mode: Option<PaymentMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_received: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_payment_received: Option<bool>,
}

impl SalePatch {
    /// Patch that only flips the payment-received flag.
    pub fn payment_received(received: bool) -> Self {
        SalePatch {
            is_payment_received: Some(received),
            ..Default::default()
        }
    }
}

// =============================================================================
// Transfers, Payments, Anomalies, Imports
// =============================================================================

/// Lifecycle states for a stock transfer between branches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum TransferStatus {
    Requested,
    Approved,
    InTransit,
    Completed,
    Rejected,
}

impl TransferStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferStatus::Requested => "requested",
            TransferStatus::Approved => "approved",
            TransferStatus::InTransit => "in_transit",
            TransferStatus::Completed => "completed",
            TransferStatus::Rejected => "rejected",
        }
    }
}

impl FromStr for TransferStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(' ', "_").as_str() {
            "requested" => Ok(TransferStatus::Requested),
            "approved" => Ok(TransferStatus::Approved),
            "in_transit" => Ok(TransferStatus::InTransit),
            "completed" => Ok(TransferStatus::Completed),
            "rejected" => Ok(TransferStatus::Rejected),
            other => Err(CoreError::UnknownTransferStatus(other.to_string())),
        }
    }
}

/// Body for `PATCH transfers/{id}/status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TransferStatusUpdate {
    pub status: TransferStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TransferRecord {
    pub id: i64,
    pub from_branch_id: i64,
    pub to_branch_id: i64,
    pub model_id: i64,
    pub quantity: i64,
    /// Kept as a string; unknown states still render through the status pill.
    pub status: String,
    pub requested_at: String,
    #[serde(default)]
    pub completed_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PaymentRecord {
    pub id: i64,
    pub sale_id: i64,
    pub branch_id: i64,
    pub method: String,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(deserialize_with = "decimal_string")]
    pub amount: String,
    pub status: String,
    pub received_on: String,
    pub created_at: String,
    pub updated_at: String,
}

impl PaymentRecord {
    pub fn amount(&self) -> Money {
        Money::parse_or_zero(&self.amount)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AnomalyRecord {
    pub id: i64,
    #[serde(default)]
    pub branch_id: Option<i64>,
    pub category: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub payload: Option<Value>,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

impl AnomalyRecord {
    /// `payload.severity` when the detector supplied one, else the status.
    pub fn severity(&self) -> &str {
        self.payload
            .as_ref()
            .and_then(|p| p.get("severity"))
            .and_then(Value::as_str)
            .unwrap_or(&self.status)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ImportJob {
    pub id: i64,
    #[serde(default)]
    pub branch_id: Option<i64>,
    #[serde(default)]
    pub uploaded_by_id: Option<i64>,
    pub source_filename: String,
    #[serde(default)]
    pub sheet_name: Option<String>,
    pub status: String,
    #[serde(default)]
    pub summary: Option<Value>,
    #[serde(default)]
    pub executed_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl ImportJob {
    /// `(processed, total)` rows from the job summary, zero when absent.
    ///
    /// The importer has written both `processed_rows`/`total_rows` and the
    /// shorter `processed`/`total` keys over time.
    pub fn progress(&self) -> (i64, i64) {
        let read = |keys: [&str; 2]| -> i64 {
            let Some(summary) = self.summary.as_ref() else {
                return 0;
            };
            keys.iter()
                .filter_map(|k| summary.get(*k))
                .find_map(|v| v.as_i64().or_else(|| v.as_f64().map(|f| f as i64)))
                .unwrap_or(0)
        };
        (read(["processed_rows", "processed"]), read(["total_rows", "total"]))
    }
}

/// A workbook to send to `imports/upload`.
///
/// Sent as multipart form data; the optional fields are omitted when unset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub branch_id: Option<i64>,
    pub sheet_name: Option<String>,
}

/// Server-side totals from `reports/summary`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DashboardSummary {
    #[serde(default)]
    pub total_sales: i64,
    #[serde(default = "zero_decimal", deserialize_with = "decimal_string")]
    pub total_revenue: String,
}

impl DashboardSummary {
    pub fn revenue(&self) -> Money {
        Money::parse_or_zero(&self.total_revenue)
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn zero_decimal() -> String {
    "0".to_string()
}

/// Accepts a decimal as either a JSON string or a JSON number.
///
/// Decimal columns arrive as strings from most endpoints and as floats from
/// the reporting endpoint; both are kept as text so parsing stays in one place.
fn decimal_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(zero_decimal()),
        other => Err(serde::de::Error::custom(format!(
            "expected decimal string or number, got {}",
            other
        ))),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use serde_json::json;

    #[test]
    fn test_role_parsing() {
        assert_eq!("ADMIN".parse::<UserRole>().unwrap(), UserRole::Admin);
        assert_eq!("salesman".parse::<UserRole>().unwrap(), UserRole::Salesman);
        assert!("MANAGER".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_profile_deserializes_and_display_name() {
        let profile: UserProfile = serde_json::from_value(json!({
            "id": 7,
            "email": "asha@example.com",
            "username": "asha",
            "user_role": "SALESMAN",
            "is_active": true
        }))
        .unwrap();
        assert_eq!(profile.user_role, UserRole::Salesman);
        assert_eq!(profile.display_name(), "asha");
        assert!(!profile.is_admin());
    }

    #[test]
    fn test_stock_labels_and_available() {
        let mut row = stock(1, 5, 7);
        assert_eq!(row.available(), 0);
        assert_eq!(row.variant_label(), "Standard");
        assert_eq!(row.branch_label(), "Unassigned");

        row.variant = Some("ZX".to_string());
        row.branch_name = Some("  ".to_string());
        assert_eq!(row.variant_label(), "ZX");
        assert_eq!(row.branch_label(), "Unassigned");
    }

    #[test]
    fn test_sales_record_amount_accepts_number_or_string() {
        let base = json!({
            "id": 1,
            "customer_id": 2,
            "vehicle_stock_id": 3,
            "vehicle_name": "Amaze",
            "variant": "S",
            "color": "White",
            "payment_mode": "FINANCE",
            "amount_received": "1000.50",
            "is_payment_received": false,
            "created_at": "2024-03-01T10:00:00",
            "updated_at": "2024-03-01T10:00:00"
        });
        let record: SalesRecord = serde_json::from_value(base.clone()).unwrap();
        assert_eq!(record.amount().paise(), 100_050);

        let mut numeric = base;
        numeric["amount_received"] = json!(2500.25);
        let record: SalesRecord = serde_json::from_value(numeric).unwrap();
        assert_eq!(record.amount().paise(), 250_025);
    }

    #[test]
    fn test_sales_branch_key_falls_back_to_code() {
        let mut record = sale(1, "1", true, "2024-01-01T00:00:00");
        assert_eq!(record.branch_key(), None);
        record.branch_code = Some("BLR".to_string());
        assert_eq!(record.branch_key(), Some("BLR"));
        record.branch_name = Some("Koramangala".to_string());
        assert_eq!(record.branch_key(), Some("Koramangala"));
    }

    #[test]
    fn test_anomaly_severity() {
        let mut anomaly = AnomalyRecord {
            id: 1,
            branch_id: None,
            category: "stock_mismatch".to_string(),
            description: None,
            payload: None,
            status: "open".to_string(),
            created_at: "2024-01-01T00:00:00".to_string(),
            updated_at: "2024-01-01T00:00:00".to_string(),
        };
        assert_eq!(anomaly.severity(), "open");
        anomaly.payload = Some(json!({ "severity": "critical" }));
        assert_eq!(anomaly.severity(), "critical");
    }

    #[test]
    fn test_import_job_progress_reads_either_key() {
        let mut job = ImportJob {
            id: 1,
            branch_id: None,
            uploaded_by_id: None,
            source_filename: "stock.xlsx".to_string(),
            sheet_name: None,
            status: "processing".to_string(),
            summary: None,
            executed_at: None,
            created_at: "2024-01-01T00:00:00".to_string(),
            updated_at: "2024-01-01T00:00:00".to_string(),
        };
        assert_eq!(job.progress(), (0, 0));

        job.summary = Some(json!({ "processed_rows": 40, "total_rows": 120 }));
        assert_eq!(job.progress(), (40, 120));

        job.summary = Some(json!({ "processed": 5, "total": 9 }));
        assert_eq!(job.progress(), (5, 9));
    }

    #[test]
    fn test_transfer_status_round_trip_names() {
        assert_eq!("in transit".parse::<TransferStatus>().unwrap(), TransferStatus::InTransit);
        assert_eq!(
            serde_json::to_value(TransferStatusUpdate { status: TransferStatus::InTransit }).unwrap(),
            json!({ "status": "in_transit" })
        );
        assert!("lost".parse::<TransferStatus>().is_err());
    }

    #[test]
    fn test_dashboard_summary_float_revenue() {
        let summary: DashboardSummary =
            serde_json::from_value(json!({ "total_sales": 3, "total_revenue": 1500.5 })).unwrap();
        assert_eq!(summary.revenue().paise(), 150_050);
    }

    #[test]
    fn test_sale_patch_skips_unset_fields() {
        let body = serde_json::to_value(SalePatch::payment_received(true)).unwrap();
        assert_eq!(body, json!({ "is_payment_received": true }));
    }
}
