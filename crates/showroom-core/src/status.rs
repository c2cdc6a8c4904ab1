//! # Status Pills
//!
//! Transfers, payments, anomalies and import jobs all carry a free-form
//! status string. This module normalizes it into a tone and a label.
//!
//! ```text
//! ┌───────────────┬──────────────────────────────────────────────┐
//! │ Tone          │ Values (case-insensitive)                    │
//! ├───────────────┼──────────────────────────────────────────────┤
//! │ Warning       │ pending, requested, queued, warning          │
//! │ Progress      │ approved, in_transit, processing             │
//! │ Success       │ completed, posted, success                   │
//! │ Danger        │ failed, rejected, critical                   │
//! │ Neutral       │ info, anything else                          │
//! └───────────────┴──────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Visual tone of a status pill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum StatusTone {
    Warning,
    Progress,
    Success,
    Danger,
    Neutral,
}

/// Maps a raw status value to its tone.
pub fn status_tone(value: &str) -> StatusTone {
    match value.trim().to_lowercase().as_str() {
        "pending" | "requested" | "queued" | "warning" => StatusTone::Warning,
        "approved" | "in_transit" | "processing" => StatusTone::Progress,
        "completed" | "posted" | "success" => StatusTone::Success,
        "failed" | "rejected" | "critical" => StatusTone::Danger,
        _ => StatusTone::Neutral,
    }
}

/// Display label: underscores become spaces, case is kept.
pub fn status_label(value: &str) -> String {
    value.replace('_', " ")
}
