//! # Display Formatting
//!
//! Operator-facing text for amounts, dates and a few composite labels.
//! Every helper degrades to a safe placeholder (`"INR 0"`, `"-"`) instead of
//! failing on malformed server values.

use chrono::FixedOffset;

use crate::money::Money;
use crate::timestamp::parse_local;
use crate::types::{Branch, ImportJob};

/// Formats an amount as whole rupees with Indian digit grouping.
///
/// ```rust
/// use showroom_core::format::format_currency;
/// use showroom_core::Money;
///
/// assert_eq!(format_currency(Money::from_paise(123_456_789)), "INR 12,34,568");
/// ```
pub fn format_currency(amount: Money) -> String {
    let rupees = amount.round_to_rupees();
    let sign = if rupees < 0 { "-" } else { "" };
    format!("INR {}{}", sign, group_indian(rupees.unsigned_abs()))
}

/// Formats a decimal string from the backend; `"INR 0"` when missing or
/// unparseable.
pub fn format_currency_str(amount: Option<&str>) -> String {
    match amount.map(Money::parse_decimal) {
        Some(Ok(money)) => format_currency(money),
        _ => format_currency(Money::zero()),
    }
}

/// Groups digits the Indian way: last three, then pairs (`12,34,567`).
pub fn group_indian(value: u64) -> String {
    let digits = value.to_string();
    if digits.len() <= 3 {
        return digits;
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();
    format!("{},{}", groups.join(","), tail)
}

/// `dd/mm/yyyy`, or `"-"` when missing or unparseable.
pub fn format_date(raw: Option<&str>, offset: FixedOffset) -> String {
    raw.and_then(|r| parse_local(r, offset))
        .map(|dt| dt.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// `dd/mm/yyyy, HH:MM:SS`, or `"-"` when missing or unparseable.
pub fn format_date_time(raw: Option<&str>, offset: FixedOffset) -> String {
    raw.and_then(|r| parse_local(r, offset))
        .map(|dt| dt.format("%d/%m/%Y, %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// "Currently viewing" label for the branch focus selector.
pub fn branch_focus_label(selected: Option<i64>, branches: &[Branch]) -> String {
    let Some(id) = selected else {
        return "All branches".to_string();
    };
    branches
        .iter()
        .find(|b| b.id == id)
        .map(|b| format!("{} — {}", b.name, b.city))
        .unwrap_or_else(|| "Selected branch".to_string())
}

/// `"processed/total"` for an import job, `"-"` until a total is known.
pub fn import_progress_label(job: &ImportJob) -> String {
    match job.progress() {
        (_, 0) => "-".to_string(),
        (processed, total) => format!("{}/{}", processed, total),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::fixtures::branch;
    use serde_json::json;

    fn ist() -> FixedOffset {
        FixedOffset::east_opt(19_800).unwrap()
    }

    #[test]
    fn test_group_indian() {
        assert_eq!(group_indian(0), "0");
        assert_eq!(group_indian(999), "999");
        assert_eq!(group_indian(1000), "1,000");
        assert_eq!(group_indian(100_000), "1,00,000");
        assert_eq!(group_indian(1_234_567), "12,34,567");
        assert_eq!(group_indian(123_456_789), "12,34,56,789");
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(Money::from_paise(100_050)), "INR 1,001");
        assert_eq!(format_currency(Money::zero()), "INR 0");
        assert_eq!(format_currency(Money::from_rupees(-2500)), "INR -2,500");
        assert_eq!(format_currency_str(Some("750000.00")), "INR 7,50,000");
        assert_eq!(format_currency_str(Some("abc")), "INR 0");
        assert_eq!(format_currency_str(None), "INR 0");
    }

    #[test]
    fn test_format_dates() {
        assert_eq!(format_date(Some("2024-03-05T10:00:00"), ist()), "05/03/2024");
        assert_eq!(
            format_date_time(Some("2024-03-05T04:30:00Z"), ist()),
            "05/03/2024, 10:00:00"
        );
        assert_eq!(format_date(None, ist()), "-");
        assert_eq!(format_date(Some("garbage"), ist()), "-");
        assert_eq!(format_date_time(Some(""), ist()), "-");
    }

    #[test]
    fn test_branch_focus_label() {
        let branches = vec![branch(1, "Andheri", "Mumbai")];
        assert_eq!(branch_focus_label(None, &branches), "All branches");
        assert_eq!(branch_focus_label(Some(1), &branches), "Andheri — Mumbai");
        assert_eq!(branch_focus_label(Some(9), &branches), "Selected branch");
    }

    #[test]
    fn test_import_progress_label() {
        let mut job: ImportJob = serde_json::from_value(json!({
            "id": 1,
            "source_filename": "stock.xlsx",
            "status": "queued",
            "created_at": "2024-01-01T00:00:00",
            "updated_at": "2024-01-01T00:00:00"
        }))
        .unwrap();
        assert_eq!(import_progress_label(&job), "-");

        job.summary = Some(json!({ "processed_rows": 12, "total_rows": 30 }));
        assert_eq!(import_progress_label(&job), "12/30");
    }
}
