//! Customers.

use clap::Subcommand;
use showroom_client::AppContext;
use showroom_core::filters::CustomerFilter;
use showroom_core::{Customer, CustomerDraft};

use super::{or_dash, signed_in};
use crate::error::CommandResult;

#[derive(Subcommand, Debug)]
pub enum CustomerCommand {
    /// List customers
    List {
        /// Name or phone fragment
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
    },

    /// Add a customer
    Create {
        name: String,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        address: Option<String>,
    },

    /// Delete a customer (admins only)
    Delete { id: i64 },
}

pub async fn run(ctx: &AppContext, cmd: CustomerCommand) -> CommandResult<Vec<String>> {
    signed_in(ctx).await?;

    match cmd {
        CustomerCommand::List {
            search,
            location,
            limit,
        } => {
            let filter = CustomerFilter {
                search,
                location,
                limit,
                ..Default::default()
            };
            let customers = ctx.api.customers(&filter).await?;
            Ok(render_customers(&customers))
        }
        CustomerCommand::Create {
            name,
            phone,
            email,
            location,
            address,
        } => {
            let draft = CustomerDraft {
                name,
                phone,
                email,
                location,
                address,
            };
            let customer = ctx.api.create_customer(&draft).await?;
            Ok(vec![format!("Added customer #{} {}", customer.id, customer.name)])
        }
        CustomerCommand::Delete { id } => {
            ctx.api.delete_customer(id).await?;
            Ok(vec![format!("Deleted customer #{}", id)])
        }
    }
}

pub fn render_customers(customers: &[Customer]) -> Vec<String> {
    if customers.is_empty() {
        return vec!["No customers".to_string()];
    }
    customers
        .iter()
        .map(|c| {
            format!(
                "#{:<5} {} | {} | {}",
                c.id,
                c.name,
                or_dash(c.phone.as_deref()),
                or_dash(c.location.as_deref())
            )
        })
        .collect()
}
