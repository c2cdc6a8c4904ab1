//! # List Filters
//!
//! Typed filters for the list endpoints and their canonical query string.
//!
//! The canonical string doubles as the cache identity of a read: two filters
//! that render to the same string are the same request.
//!
//! ```text
//! SalesFilter { limit: 100, payment_mode: FINANCE, .. }
//!        │
//!        ▼  query_pairs()   (unset fields omitted)
//! [("limit","100"), ("payment_mode","FINANCE")]
//!        │
//!        ▼  canonical_query()   (sorted by key, escaped)
//! "limit=100&payment_mode=FINANCE"
//! ```

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use ts_rs::TS;
use url::form_urlencoded;

use crate::types::{PaymentMode, VehicleStock};

/// Something that renders to query parameters.
pub trait QueryParams {
    fn query_pairs(&self) -> Vec<(&'static str, String)>;

    /// Sorted, escaped `k=v&k=v` form of [`QueryParams::query_pairs`].
    fn canonical_query(&self) -> String {
        canonical_query(&self.query_pairs())
    }
}

/// Renders pairs in a stable order so equal filters share a cache key.
pub fn canonical_query(pairs: &[(&str, String)]) -> String {
    let mut sorted: Vec<&(&str, String)> = pairs.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0).then_with(|| a.1.cmp(&b.1)));
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(sorted.iter().map(|(k, v)| (*k, v.as_str())))
        .finish()
}

fn push_opt<T: ToString>(pairs: &mut Vec<(&'static str, String)>, key: &'static str, value: &Option<T>) {
    if let Some(v) = value {
        pairs.push((key, v.to_string()));
    }
}

fn push_text(pairs: &mut Vec<(&'static str, String)>, key: &'static str, value: &Option<String>) {
    if let Some(v) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
        pairs.push((key, v.to_string()));
    }
}

// =============================================================================
// Customers
// =============================================================================

/// Filters for `GET customers`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CustomerFilter {
    pub search: Option<String>,
    pub location: Option<String>,
    pub skip: Option<u32>,
    pub limit: Option<u32>,
}

impl QueryParams for CustomerFilter {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        push_text(&mut pairs, "search", &self.search);
        push_text(&mut pairs, "location", &self.location);
        push_opt(&mut pairs, "skip", &self.skip);
        push_opt(&mut pairs, "limit", &self.limit);
        pairs
    }
}

// =============================================================================
// Vehicle Stock
// =============================================================================

/// Filters for `GET vehicle-stock`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct VehicleStockFilter {
    pub model_name: Option<String>,
    pub branch_code: Option<String>,
    pub city: Option<String>,
    /// Sent only when true.
    #[serde(default)]
    pub in_stock_only: bool,
}

impl QueryParams for VehicleStockFilter {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        push_text(&mut pairs, "model_name", &self.model_name);
        push_text(&mut pairs, "branch_code", &self.branch_code);
        push_text(&mut pairs, "city", &self.city);
        if self.in_stock_only {
            pairs.push(("in_stock_only", "true".to_string()));
        }
        pairs
    }
}

// =============================================================================
// Sales
// =============================================================================

/// Filters for `GET sales-records`. Dates are `YYYY-MM-DD`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SalesFilter {
    pub skip: Option<u32>,
    pub limit: Option<u32>,
    pub location: Option<String>,
    pub payment_mode: Option<PaymentMode>,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
    pub executive_id: Option<i64>,
}

impl QueryParams for SalesFilter {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        push_opt(&mut pairs, "skip", &self.skip);
        push_opt(&mut pairs, "limit", &self.limit);
        push_text(&mut pairs, "location", &self.location);
        push_opt(&mut pairs, "payment_mode", &self.payment_mode);
        push_text(&mut pairs, "from_date", &self.from_date);
        push_text(&mut pairs, "to_date", &self.to_date);
        push_opt(&mut pairs, "executive_id", &self.executive_id);
        pairs
    }
}

// =============================================================================
// Sale Form
// =============================================================================

/// Stock rows a sale can be captured against: in stock, sorted by branch
/// name then model name (missing names sort as empty).
pub fn sellable_stock(stock: &[VehicleStock]) -> Vec<VehicleStock> {
    let mut rows: Vec<VehicleStock> = stock.iter().filter(|s| s.quantity > 0).cloned().collect();
    rows.sort_by(|a, b| {
        let branch = |s: &VehicleStock| s.branch_name.clone().unwrap_or_default();
        match branch(a).cmp(&branch(b)) {
            Ordering::Equal => a.model_name.cmp(&b.model_name),
            other => other,
        }
    });
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::fixtures::stock;

    #[test]
    fn test_empty_filter_renders_nothing() {
        assert_eq!(SalesFilter::default().canonical_query(), "");
        assert_eq!(VehicleStockFilter::default().canonical_query(), "");
    }

    #[test]
    fn test_canonical_query_is_order_stable() {
        let filter = SalesFilter {
            payment_mode: Some(PaymentMode::Finance),
            limit: Some(100),
            from_date: Some("2024-03-01".to_string()),
            ..Default::default()
        };
        assert_eq!(
            filter.canonical_query(),
            "from_date=2024-03-01&limit=100&payment_mode=FINANCE"
        );
    }

    #[test]
    fn test_in_stock_only_sent_only_when_true() {
        let mut filter = VehicleStockFilter {
            city: Some("Pune".to_string()),
            ..Default::default()
        };
        assert_eq!(filter.canonical_query(), "city=Pune");
        filter.in_stock_only = true;
        assert_eq!(filter.canonical_query(), "city=Pune&in_stock_only=true");
    }

    #[test]
    fn test_blank_text_is_omitted_and_values_escaped() {
        let filter = CustomerFilter {
            search: Some("  ".to_string()),
            location: Some("A&B=C".to_string()),
            ..Default::default()
        };
        assert_eq!(filter.canonical_query(), "location=A%26B%3DC");
    }

    #[test]
    fn test_canonical_query_is_form_encoded() {
        let filter = CustomerFilter {
            search: Some("Ravi Kumar".to_string()),
            location: Some("50% off".to_string()),
            ..Default::default()
        };
        assert_eq!(filter.canonical_query(), "location=50%25+off&search=Ravi+Kumar");
    }

    #[test]
    fn test_sellable_stock_sorted_by_branch_then_model() {
        let mut a = stock(1, 2, 0);
        a.branch_name = Some("Baner".to_string());
        a.model_name = "Amaze".to_string();
        let mut b = stock(2, 0, 0);
        b.branch_name = Some("Andheri".to_string());
        let mut c = stock(3, 4, 0);
        c.branch_name = Some("Andheri".to_string());
        c.model_name = "Elevate".to_string();
        let mut d = stock(4, 1, 0);
        d.branch_name = Some("Andheri".to_string());
        d.model_name = "City".to_string();

        let ids: Vec<i64> = sellable_stock(&[a, b, c, d]).iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![4, 3, 1]);
    }
}
