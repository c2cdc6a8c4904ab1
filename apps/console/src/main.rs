//! # Showroom Console Entry Point
//!
//! ```text
//! $ showroom login --username admin
//! $ showroom dashboard --branch 2
//! $ showroom sales list --received false
//! ```
//!
//! Setup and dispatch live in lib.rs.

use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    showroom_console::run().await
}
