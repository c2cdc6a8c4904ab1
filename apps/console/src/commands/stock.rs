//! Vehicle stock: listing, adjustments and the workbook round trip.

use anyhow::Context;
use clap::Subcommand;
use showroom_client::AppContext;
use showroom_core::filters::{sellable_stock, VehicleStockFilter};
use showroom_core::VehicleStock;
use std::path::PathBuf;
use tracing::info;

use super::{or_dash, signed_in};
use crate::error::CommandResult;

#[derive(Subcommand, Debug)]
pub enum StockCommand {
    /// List stock rows
    List {
        #[arg(long)]
        model: Option<String>,
        #[arg(long)]
        branch_code: Option<String>,
        #[arg(long)]
        city: Option<String>,
        /// Only rows with quantity above zero
        #[arg(long)]
        in_stock: bool,
        /// Rows a sale can be captured against, grouped by branch
        #[arg(long, conflicts_with = "in_stock")]
        sellable: bool,
    },

    /// Add to (or, with a negative value, take from) a row's quantity
    Adjust {
        id: i64,
        #[arg(long, allow_negative_numbers = true)]
        by: i64,
    },

    /// Delete a stock row
    Delete { id: i64 },

    /// Download the stock workbook
    Export {
        #[arg(long, default_value = "vehicle-stock.xlsx")]
        out: PathBuf,
    },

    /// Re-import the server-side stock workbook
    Import,
}

pub async fn run(ctx: &AppContext, cmd: StockCommand) -> CommandResult<Vec<String>> {
    signed_in(ctx).await?;

    match cmd {
        StockCommand::List {
            model,
            branch_code,
            city,
            in_stock,
            sellable,
        } => {
            let filter = VehicleStockFilter {
                model_name: model,
                branch_code,
                city,
                in_stock_only: in_stock,
            };
            let rows = ctx.api.vehicle_stock(&filter).await?;
            let rows = if sellable {
                sellable_stock(&rows)
            } else {
                rows.as_ref().clone()
            };
            Ok(render_rows(&rows))
        }
        StockCommand::Adjust { id, by } => {
            let row = ctx.api.adjust_vehicle_stock(id, by).await?;
            Ok(vec![format!(
                "Stock #{} is now {} ({} available)",
                row.id,
                row.quantity,
                row.available()
            )])
        }
        StockCommand::Delete { id } => {
            ctx.api.delete_vehicle_stock(id).await?;
            Ok(vec![format!("Deleted stock #{}", id)])
        }
        StockCommand::Export { out } => {
            let bytes = ctx.api.export_vehicle_stock().await?;
            std::fs::write(&out, &bytes).with_context(|| format!("writing {}", out.display()))?;
            info!(path = %out.display(), bytes = bytes.len(), "Stock workbook saved");
            Ok(vec![format!("Saved {} bytes to {}", bytes.len(), out.display())])
        }
        StockCommand::Import => {
            let summary = ctx.api.import_vehicle_stock().await?;
            Ok(vec![format!(
                "Imported {}: {} processed, {} created, {} updated, {} removed",
                or_dash(summary.workbook.as_deref()),
                summary.processed,
                summary.created,
                summary.updated,
                summary.removed
            )])
        }
    }
}

pub fn render_rows(rows: &[VehicleStock]) -> Vec<String> {
    if rows.is_empty() {
        return vec!["No stock rows".to_string()];
    }
    rows.iter()
        .map(|row| {
            format!(
                "#{:<5} {} {} ({}) | {} | qty {} reserved {} available {}",
                row.id,
                row.model_name,
                row.variant_label(),
                or_dash(row.color.as_deref()),
                row.branch_label(),
                row.quantity,
                row.reserved,
                row.available()
            )
        })
        .collect()
}
