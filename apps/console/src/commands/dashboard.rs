//! # Dashboard Command
//!
//! Prints the metrics the client computes from stock, sales and branches.
//! `--branch` only changes the focus label; the figures always cover every
//! branch the signed-in user can see.

use chrono::FixedOffset;
use showroom_client::AppContext;
use showroom_core::format::{branch_focus_label, format_currency, format_date};
use showroom_core::{Branch, DashboardMetrics};

use super::{now, or_dash, signed_in};
use crate::error::CommandResult;

pub async fn show(ctx: &AppContext, branch: Option<i64>) -> CommandResult<Vec<String>> {
    signed_in(ctx).await?;
    ctx.preferences.set_selected_branch(branch);

    let now = now();
    let metrics = ctx.api.dashboard(now).await?;
    // Served from the cache the dashboard just filled.
    let branches = ctx.api.branches().await?;

    Ok(render(
        &metrics,
        ctx.preferences.selected_branch(),
        &branches,
        *now.offset(),
    ))
}

fn trend(percent: Option<i64>) -> String {
    match percent {
        Some(p) if p >= 0 => format!("+{}%", p),
        Some(p) => format!("{}%", p),
        None => "n/a".to_string(),
    }
}

pub fn render(
    metrics: &DashboardMetrics,
    selected_branch: Option<i64>,
    branches: &[Branch],
    offset: FixedOffset,
) -> Vec<String> {
    let mut lines = vec![
        format!("Viewing: {}", branch_focus_label(selected_branch, branches)),
        String::new(),
        format!(
            "Stock: {} units, {} reserved, {} available ({} models)",
            metrics.total_stock, metrics.reserved_units, metrics.available_stock, metrics.total_models
        ),
        format!(
            "Sales: {} deals, revenue {}, average {}",
            metrics.total_sales,
            format_currency(metrics.total_revenue),
            format_currency(metrics.average_deal_size)
        ),
        format!(
            "This month: {} deals ({}), {} ({})",
            metrics.current_month_sales,
            trend(metrics.sales_trend_percent),
            format_currency(metrics.current_month_revenue),
            trend(metrics.revenue_trend_percent)
        ),
        format!(
            "Collections: {} received, {} pending ({}% complete)",
            metrics.received_count, metrics.pending_payments, metrics.collections_completion
        ),
        format!(
            "Branches: {} active, {} units on average, coverage {}%",
            metrics.active_branches, metrics.average_stock_per_branch, metrics.coverage_ratio
        ),
    ];

    if let Some(top) = &metrics.top_branch {
        lines.push(format!("Top branch: {} ({} units)", top.label, top.quantity));
    }

    if !metrics.branch_stock.is_empty() {
        lines.push(String::new());
        lines.push("Stock by branch:".to_string());
        for row in &metrics.branch_stock {
            lines.push(format!("  {:<24} {:>6} {:>6} reserved", row.label, row.quantity, row.reserved));
        }
    }

    if !metrics.low_stock.is_empty() {
        lines.push(String::new());
        lines.push("Low stock:".to_string());
        for row in &metrics.low_stock {
            lines.push(format!(
                "  {} {} ({}) at {}: {} left",
                row.model_name,
                row.variant_label(),
                or_dash(row.color.as_deref()),
                row.branch_label(),
                row.quantity
            ));
        }
    }

    if !metrics.recent_sales.is_empty() {
        lines.push(String::new());
        lines.push("Recent sales:".to_string());
        for sale in &metrics.recent_sales {
            lines.push(format!(
                "  #{} {} {} {} {}",
                sale.id,
                format_date(Some(&sale.created_at), offset),
                sale.vehicle_name,
                format_currency(sale.amount()),
                if sale.is_payment_received { "received" } else { "pending" }
            ));
        }
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use showroom_core::compute_dashboard;

    fn ist() -> FixedOffset {
        FixedOffset::east_opt(19_800).unwrap()
    }

    fn metrics() -> DashboardMetrics {
        let stock: Vec<showroom_core::VehicleStock> = serde_json::from_value(serde_json::json!([
            {
                "id": 1, "model_name": "City", "quantity": 2, "reserved": 0,
                "branch_name": "Andheri",
                "created_at": "2024-01-01T00:00:00", "updated_at": "2024-01-01T00:00:00"
            }
        ]))
        .unwrap();
        let sales: Vec<showroom_core::SalesRecord> = serde_json::from_value(serde_json::json!([
            {
                "id": 7, "customer_id": 1, "vehicle_stock_id": 1, "vehicle_name": "City",
                "payment_mode": "CASH", "amount_received": "850000.00",
                "is_payment_received": true,
                "created_at": "2024-03-02T10:00:00", "updated_at": "2024-03-02T10:00:00"
            }
        ]))
        .unwrap();
        let now = ist().with_ymd_and_hms(2024, 3, 15, 9, 0, 0).unwrap();
        compute_dashboard(&stock, &sales, &[], now)
    }

    #[test]
    fn test_render_headline_figures() {
        let lines = render(&metrics(), None, &[], ist());
        assert_eq!(lines[0], "Viewing: All branches");
        assert_eq!(lines[2], "Stock: 2 units, 0 reserved, 2 available (1 models)");
        assert!(lines[3].contains("INR 8,50,000"));
        assert!(lines[4].contains("(n/a)"));
        assert!(lines.iter().any(|l| l.starts_with("Top branch: Andheri")));
        assert!(lines.iter().any(|l| l.contains("#7 02/03/2024 City")));
    }

    #[test]
    fn test_render_low_stock_uses_labels() {
        let lines = render(&metrics(), Some(99), &[], ist());
        assert_eq!(lines[0], "Viewing: Selected branch");
        assert!(lines.iter().any(|l| l == "  City Standard (-) at Andheri: 2 left"));
    }

    #[test]
    fn test_trend_sign() {
        assert_eq!(trend(Some(25)), "+25%");
        assert_eq!(trend(Some(-10)), "-10%");
        assert_eq!(trend(None), "n/a");
    }
}
