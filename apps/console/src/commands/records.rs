//! Read-mostly lists: branches, transfers, payments and anomalies.

use chrono::FixedOffset;
use clap::Subcommand;
use showroom_client::AppContext;
use showroom_core::format::{format_currency, format_date, format_date_time};
use showroom_core::status::{status_label, status_tone};
use showroom_core::{AnomalyRecord, Branch, PaymentRecord, TransferRecord, TransferStatus};

use super::{now, or_dash, signed_in};
use crate::error::CommandResult;

#[derive(Subcommand, Debug)]
pub enum TransferCommand {
    /// List open transfers (the default)
    List,

    /// Move a transfer to a new status
    SetStatus {
        id: i64,
        /// requested, approved, in_transit, completed or rejected
        status: TransferStatus,
    },
}

pub async fn branches(ctx: &AppContext) -> CommandResult<Vec<String>> {
    signed_in(ctx).await?;
    let branches = ctx.api.branches().await?;
    Ok(render_branches(&branches))
}

pub async fn transfers(ctx: &AppContext, cmd: Option<TransferCommand>) -> CommandResult<Vec<String>> {
    signed_in(ctx).await?;

    match cmd.unwrap_or(TransferCommand::List) {
        TransferCommand::List => {
            let transfers = ctx.api.open_transfers().await?;
            Ok(render_transfers(&transfers, *now().offset()))
        }
        TransferCommand::SetStatus { id, status } => {
            let transfer = ctx.api.update_transfer_status(id, status).await?;
            Ok(vec![format!(
                "Transfer #{} is now {}",
                transfer.id,
                status_label(&transfer.status)
            )])
        }
    }
}

pub async fn payments(ctx: &AppContext, sale: Option<i64>) -> CommandResult<Vec<String>> {
    signed_in(ctx).await?;
    let payments = match sale {
        Some(id) => ctx.api.sale_payments(id).await?,
        None => ctx.api.pending_payments().await?,
    };
    Ok(render_payments(&payments, *now().offset()))
}

pub async fn anomalies(ctx: &AppContext) -> CommandResult<Vec<String>> {
    signed_in(ctx).await?;
    let anomalies = ctx.api.open_anomalies().await?;
    Ok(render_anomalies(&anomalies, *now().offset()))
}

// =============================================================================
// Rendering
// =============================================================================

pub fn render_branches(branches: &[Branch]) -> Vec<String> {
    if branches.is_empty() {
        return vec!["No branches".to_string()];
    }
    branches
        .iter()
        .map(|b| format!("#{:<5} {} ({}) | {}", b.id, b.name, b.code, b.city))
        .collect()
}

pub fn render_transfers(transfers: &[TransferRecord], offset: FixedOffset) -> Vec<String> {
    if transfers.is_empty() {
        return vec!["No open transfers".to_string()];
    }
    transfers
        .iter()
        .map(|t| {
            format!(
                "#{:<5} branch {} -> {} | model {} x{} | {} [{:?}] | requested {}",
                t.id,
                t.from_branch_id,
                t.to_branch_id,
                t.model_id,
                t.quantity,
                status_label(&t.status),
                status_tone(&t.status),
                format_date(Some(&t.requested_at), offset)
            )
        })
        .collect()
}

pub fn render_payments(payments: &[PaymentRecord], offset: FixedOffset) -> Vec<String> {
    if payments.is_empty() {
        return vec!["No payments".to_string()];
    }
    payments
        .iter()
        .map(|p| {
            format!(
                "#{:<5} sale {} | {} {} | ref {} | {} [{:?}] | {}",
                p.id,
                p.sale_id,
                p.method,
                format_currency(p.amount()),
                or_dash(p.reference.as_deref()),
                status_label(&p.status),
                status_tone(&p.status),
                format_date(Some(&p.received_on), offset)
            )
        })
        .collect()
}

pub fn render_anomalies(anomalies: &[AnomalyRecord], offset: FixedOffset) -> Vec<String> {
    if anomalies.is_empty() {
        return vec!["No open anomalies".to_string()];
    }
    anomalies
        .iter()
        .map(|a| {
            format!(
                "#{:<5} {} | {} [{:?}] | {} | {}",
                a.id,
                status_label(&a.category),
                a.severity(),
                status_tone(a.severity()),
                or_dash(a.description.as_deref()),
                format_date_time(Some(&a.created_at), offset)
            )
        })
        .collect()
}
