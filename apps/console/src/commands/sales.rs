//! Sales records: listing, capture, payment status and deletion.

use chrono::FixedOffset;
use clap::Subcommand;
use showroom_client::AppContext;
use showroom_core::filters::SalesFilter;
use showroom_core::format::{format_currency, format_date};
use showroom_core::{PaymentMode, SaleDraft, SalesRecord};

use super::{now, or_dash, signed_in};
use crate::error::{CommandError, CommandResult};

#[derive(Subcommand, Debug)]
pub enum SalesCommand {
    /// List sales, newest first as the backend returns them
    List {
        /// Page size (defaults to the role's page size)
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        skip: Option<u32>,
        /// CASH, IP or FINANCE
        #[arg(long)]
        mode: Option<PaymentMode>,
        /// YYYY-MM-DD
        #[arg(long)]
        from: Option<String>,
        /// YYYY-MM-DD
        #[arg(long)]
        to: Option<String>,
        #[arg(long)]
        location: Option<String>,
        /// Only sales whose payment is still pending
        #[arg(long)]
        pending: bool,
    },

    /// Capture a sale against a stock row
    Create {
        /// Stock row being sold
        #[arg(long)]
        stock: i64,
        /// Existing customer
        #[arg(long, conflicts_with = "customer_name")]
        customer_id: Option<i64>,
        /// New customer created with the sale
        #[arg(long)]
        customer_name: Option<String>,
        #[arg(long, requires = "customer_name")]
        customer_phone: Option<String>,
        #[arg(long, requires = "customer_name")]
        customer_location: Option<String>,
        #[arg(long, default_value = "CASH")]
        mode: PaymentMode,
        #[arg(long)]
        bank: Option<String>,
        /// YYYY-MM-DD
        #[arg(long)]
        payment_date: Option<String>,
        /// Decimal rupees, e.g. 85000.50
        #[arg(long)]
        amount: String,
        #[arg(long)]
        received: bool,
    },

    /// Set or clear the payment-received flag
    MarkPaid {
        id: i64,
        /// Mark as not received instead
        #[arg(long)]
        undo: bool,
    },

    /// Delete a sale (its stock is restored)
    Delete { id: i64 },
}

pub async fn run(ctx: &AppContext, cmd: SalesCommand) -> CommandResult<Vec<String>> {
    signed_in(ctx).await?;

    match cmd {
        SalesCommand::List {
            limit,
            skip,
            mode,
            from,
            to,
            location,
            pending,
        } => {
            let defaults = ctx.api.default_sales_filter().await;
            let filter = SalesFilter {
                limit: limit.or(defaults.limit),
                skip,
                payment_mode: mode,
                from_date: from,
                to_date: to,
                location,
                ..defaults
            };
            let sales = ctx.api.sales_records(&filter).await?;
            let rows: Vec<&SalesRecord> = sales
                .iter()
                .filter(|s| !pending || !s.is_payment_received)
                .collect();
            Ok(render_sales(&rows, *now().offset()))
        }
        SalesCommand::Create {
            stock,
            customer_id,
            customer_name,
            customer_phone,
            customer_location,
            mode,
            bank,
            payment_date,
            amount,
            received,
        } => {
            if customer_id.is_none() && customer_name.is_none() {
                return Err(CommandError::invalid_argument(
                    "either --customer-id or --customer-name is required",
                ));
            }
            let draft = SaleDraft {
                customer_id,
                customer_name,
                customer_phone,
                customer_location,
                vehicle_stock_id: stock,
                payment_mode: mode,
                bank,
                payment_date,
                amount_received: amount,
                is_payment_received: received,
            };
            let sale = ctx.api.create_sale(&draft).await?;
            Ok(vec![format!(
                "Captured sale #{}: {} for {}",
                sale.id,
                sale.vehicle_name,
                format_currency(sale.amount())
            )])
        }
        SalesCommand::MarkPaid { id, undo } => {
            let sale = ctx.api.mark_sale_paid(id, !undo).await?;
            let state = if sale.is_payment_received { "received" } else { "pending" };
            Ok(vec![format!("Sale #{} payment {}", sale.id, state)])
        }
        SalesCommand::Delete { id } => {
            ctx.api.delete_sale(id).await?;
            Ok(vec![format!("Deleted sale #{}", id)])
        }
    }
}

pub fn render_sales(sales: &[&SalesRecord], offset: FixedOffset) -> Vec<String> {
    if sales.is_empty() {
        return vec!["No sales".to_string()];
    }
    sales
        .iter()
        .map(|sale| {
            let customer = sale
                .customer
                .as_ref()
                .map(|c| c.name.as_str())
                .unwrap_or("-");
            format!(
                "#{:<5} {} | {} {} | {} | {} {} | {} | {}",
                sale.id,
                format_date(Some(&sale.created_at), offset),
                sale.vehicle_name,
                or_dash(Some(&sale.variant)),
                customer,
                sale.payment_mode,
                format_currency(sale.amount()),
                if sale.is_payment_received { "received" } else { "pending" },
                or_dash(sale.branch_key())
            )
        })
        .collect()
}
