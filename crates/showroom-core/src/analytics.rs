//! # Dashboard Analytics
//!
//! Turns the three fetched collections (stock, sales, branches) into the
//! dashboard's aggregate metrics. No network, no clock, no side effects.
//!
//! ## Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Dashboard Computation                            │
//! │                                                                         │
//! │  Arc<Vec<VehicleStock>> ──┐                                             │
//! │  Arc<Vec<SalesRecord>>  ──┼──► AnalyticsMemo ──hit──► Arc<Metrics>      │
//! │  Arc<Vec<Branch>>       ──┤        │                                    │
//! │  now (caller's clock)   ──┘        │ miss (new Arc or new month)        │
//! │                                    ▼                                    │
//! │                           compute_dashboard()                           │
//! │                                    │                                    │
//! │         ┌──────────────┬───────────┼────────────┬──────────────┐        │
//! │         ▼              ▼           ▼            ▼              ▼        │
//! │      stock         revenue      trends      branches       lists        │
//! │      totals        (paise)   (month buckets) (grouping)  (low / recent) │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Zero-Denominator Rules
//! Every ratio below has an explicit fallback so no `NaN`/`Infinity` can
//! reach the view:
//!
//! | Metric                    | Denominator     | Fallback        |
//! |---------------------------|-----------------|-----------------|
//! | `sales_trend_percent`     | previous count  | `None`          |
//! | `revenue_trend_percent`   | previous amount | `None`          |
//! | `average_deal_size`       | total sales     | `0`             |
//! | `average_stock_per_branch`| branch count    | `total_stock`   |
//! | `collections_completion`  | total sales     | `100`           |
//! | `coverage_ratio`          | total stock     | `0`             |

use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use ts_rs::TS;

use crate::money::Money;
use crate::timestamp::{parse_local, MonthBucket, MonthWindow};
use crate::types::{Branch, SalesRecord, VehicleStock};
use crate::{LOW_STOCK_LIMIT, LOW_STOCK_THRESHOLD, RECENT_SALES_LIMIT};

// =============================================================================
// Output Types
// =============================================================================

/// Quantity totals for one branch label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct BranchStock {
    /// Branch name, or "Unassigned".
    pub label: String,
    pub quantity: i64,
    pub reserved: i64,
}

/// Snapshot of every dashboard figure.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct DashboardMetrics {
    // Stock
    pub total_stock: i64,
    pub reserved_units: i64,
    pub available_stock: i64,
    pub total_models: usize,

    // Sales
    pub total_sales: usize,
    pub total_revenue: Money,
    pub received_count: usize,
    pub pending_payments: usize,
    pub average_deal_size: Money,

    // Month-to-date vs previous month
    pub current_month_sales: usize,
    pub previous_month_sales: usize,
    pub current_month_revenue: Money,
    pub previous_month_revenue: Money,
    /// `None` when the previous month had no sales.
    pub sales_trend_percent: Option<i64>,
    /// `None` when the previous month had no revenue.
    pub revenue_trend_percent: Option<i64>,

    // Branches
    /// Per-branch totals in first-seen order.
    pub branch_stock: Vec<BranchStock>,
    pub top_branch: Option<BranchStock>,
    pub active_branches: usize,
    pub average_stock_per_branch: i64,

    // Ratios, always within 0..=100
    pub collections_completion: i64,
    pub coverage_ratio: i64,

    // Lists
    pub low_stock: Vec<VehicleStock>,
    pub recent_sales: Vec<SalesRecord>,
}

// =============================================================================
// Computation
// =============================================================================

/// Computes the dashboard metrics from the current collections.
///
/// `now` carries the caller's offset; month boundaries are that offset's
/// wall-clock months. Sales whose `created_at` does not parse count toward
/// every total but fall into neither trend bucket.
pub fn compute_dashboard(
    stock: &[VehicleStock],
    sales: &[SalesRecord],
    branches: &[Branch],
    now: DateTime<FixedOffset>,
) -> DashboardMetrics {
    // Stock totals
    let total_stock = stock.iter().fold(0i64, |acc, s| acc.saturating_add(s.quantity));
    let reserved_units = stock.iter().fold(0i64, |acc, s| acc.saturating_add(s.reserved));
    let available_stock = total_stock.saturating_sub(reserved_units).max(0);

    let total_models = stock
        .iter()
        .map(|s| (s.model_name.as_str(), s.variant_label()))
        .collect::<HashSet<_>>()
        .len();

    // Sales totals
    let total_sales = sales.len();
    let total_revenue: Money = sales.iter().map(SalesRecord::amount).sum();
    let received_count = sales.iter().filter(|s| s.is_payment_received).count();
    let pending_payments = total_sales.saturating_sub(received_count);
    let average_deal_size = if total_sales > 0 {
        total_revenue.divide_rounded(total_sales as i64)
    } else {
        Money::zero()
    };

    // Month buckets
    let window = MonthWindow::containing(now);
    let offset = *now.offset();
    let mut current_month_sales = 0usize;
    let mut previous_month_sales = 0usize;
    let mut current_month_revenue = Money::zero();
    let mut previous_month_revenue = Money::zero();

    for sale in sales {
        let Some(created) = parse_local(&sale.created_at, offset) else {
            continue;
        };
        match window.bucket(created) {
            Some(MonthBucket::Current) => {
                current_month_sales += 1;
                current_month_revenue += sale.amount();
            }
            Some(MonthBucket::Previous) => {
                previous_month_sales += 1;
                previous_month_revenue += sale.amount();
            }
            None => {}
        }
    }

    let sales_trend_percent =
        trend_percent(current_month_sales as i64, previous_month_sales as i64);
    let revenue_trend_percent =
        trend_percent(current_month_revenue.paise(), previous_month_revenue.paise());

    // Branch grouping
    let branch_stock = group_by_branch(stock);
    let top_branch = top_branch(&branch_stock);
    let active_branches = sales
        .iter()
        .filter_map(SalesRecord::branch_key)
        .collect::<HashSet<_>>()
        .len();
    let average_stock_per_branch = if branches.is_empty() {
        total_stock
    } else {
        round_ratio(total_stock, branches.len() as i64, 1)
    };

    // Ratios
    let collections_completion = if total_sales == 0 {
        100
    } else {
        round_ratio(received_count as i64, total_sales as i64, 100).clamp(0, 100)
    };
    let coverage_ratio = if total_stock > 0 {
        round_ratio(available_stock, total_stock, 100).clamp(0, 100)
    } else {
        0
    };

    DashboardMetrics {
        total_stock,
        reserved_units,
        available_stock,
        total_models,
        total_sales,
        total_revenue,
        received_count,
        pending_payments,
        average_deal_size,
        current_month_sales,
        previous_month_sales,
        current_month_revenue,
        previous_month_revenue,
        sales_trend_percent,
        revenue_trend_percent,
        branch_stock,
        top_branch,
        active_branches,
        average_stock_per_branch,
        collections_completion,
        coverage_ratio,
        low_stock: low_stock(stock),
        recent_sales: sales.iter().take(RECENT_SALES_LIMIT).cloned().collect(),
    }
}

/// `round((current - previous) / previous * 100)`, or `None` when
/// `previous <= 0`.
pub fn trend_percent(current: i64, previous: i64) -> Option<i64> {
    if previous <= 0 {
        return None;
    }
    Some(round_ratio(current.saturating_sub(previous), previous, 100))
}

/// Rows at or below the low-stock threshold, ascending by quantity.
///
/// The sort is stable, so rows with equal quantity keep their fetch order.
pub fn low_stock(stock: &[VehicleStock]) -> Vec<VehicleStock> {
    let mut low: Vec<VehicleStock> = stock
        .iter()
        .filter(|s| s.quantity <= LOW_STOCK_THRESHOLD)
        .cloned()
        .collect();
    low.sort_by_key(|s| s.quantity);
    low.truncate(LOW_STOCK_LIMIT);
    low
}

fn group_by_branch(stock: &[VehicleStock]) -> Vec<BranchStock> {
    let mut groups: Vec<BranchStock> = Vec::new();
    for row in stock {
        let label = row.branch_label();
        match groups.iter_mut().find(|g| g.label == label) {
            Some(group) => {
                group.quantity = group.quantity.saturating_add(row.quantity);
                group.reserved = group.reserved.saturating_add(row.reserved);
            }
            None => groups.push(BranchStock {
                label: label.to_string(),
                quantity: row.quantity,
                reserved: row.reserved,
            }),
        }
    }
    groups
}

// Strictly-greater keeps the first branch on ties.
fn top_branch(groups: &[BranchStock]) -> Option<BranchStock> {
    let mut best: Option<&BranchStock> = None;
    for group in groups {
        if best.map_or(true, |b| group.quantity > b.quantity) {
            best = Some(group);
        }
    }
    best.cloned()
}

/// `round(numerator / denominator * scale)` with half-up rounding,
/// matching how the web console rounds (`Math.round`).
fn round_ratio(numerator: i64, denominator: i64, scale: i64) -> i64 {
    if denominator == 0 {
        return 0;
    }
    let value = numerator as f64 / denominator as f64 * scale as f64;
    (value + 0.5).floor() as i64
}

// =============================================================================
// Memoization
// =============================================================================

/// Caches the last computed metrics by input identity.
///
/// The key is pointer identity of the three `Arc` inputs plus the reporting
/// month of `now`. The cache hands out a new `Arc` whenever it refetches, so
/// a refetch always recomputes while re-renders with the same snapshot do not.
/// Holding the `Arc`s keeps their addresses from being reused.
#[derive(Debug, Default)]
pub struct AnalyticsMemo {
    last: Option<MemoEntry>,
    computations: u64,
}

#[derive(Debug)]
struct MemoEntry {
    stock: Arc<Vec<VehicleStock>>,
    sales: Arc<Vec<SalesRecord>>,
    branches: Arc<Vec<Branch>>,
    month: (i32, u32),
    metrics: Arc<DashboardMetrics>,
}

impl AnalyticsMemo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns cached metrics when every input is the same allocation and
    /// the reporting month is unchanged, otherwise recomputes.
    pub fn get_or_compute(
        &mut self,
        stock: &Arc<Vec<VehicleStock>>,
        sales: &Arc<Vec<SalesRecord>>,
        branches: &Arc<Vec<Branch>>,
        now: DateTime<FixedOffset>,
    ) -> Arc<DashboardMetrics> {
        let month = MonthWindow::containing(now).reporting_month();

        if let Some(entry) = &self.last {
            if Arc::ptr_eq(&entry.stock, stock)
                && Arc::ptr_eq(&entry.sales, sales)
                && Arc::ptr_eq(&entry.branches, branches)
                && entry.month == month
            {
                return Arc::clone(&entry.metrics);
            }
        }

        let metrics = Arc::new(compute_dashboard(stock, sales, branches, now));
        self.computations += 1;
        self.last = Some(MemoEntry {
            stock: Arc::clone(stock),
            sales: Arc::clone(sales),
            branches: Arc::clone(branches),
            month,
            metrics: Arc::clone(&metrics),
        });
        metrics
    }

    /// Number of times the metrics were actually computed.
    pub fn computations(&self) -> u64 {
        self.computations
    }

    /// Drops the cached snapshot (e.g. on logout).
    pub fn clear(&mut self) {
        self.last = None;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
