//! Turns raw bill fields into the strings shown on the bills page.

use crate::model::BillStatus;
use crate::Result;
use anyhow::Context;
use chrono::{Datelike, NaiveDate};

/// French short month names, capitalized and cut to three characters.
const MONTHS: [&str; 12] = [
    "Jan", "Fév", "Mar", "Avr", "Mai", "Jui", "Jui", "Aoû", "Sep", "Oct", "Nov", "Déc",
];

/// Formats a `YYYY-MM-DD` date for display, e.g. `2004-04-04` -> `4 Avr. 04`.
///
/// # Errors
/// Returns an error if `date` is not a valid `YYYY-MM-DD` date.
pub fn format_date(date: &str) -> Result<String> {
    let parsed = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid bill date '{date}'"))?;
    let month = MONTHS[parsed.month0() as usize];
    let year = parsed.year().rem_euclid(100);
    Ok(format!("{} {month}. {year:02}", parsed.day()))
}

/// Maps a status to its display label. Unknown statuses are shown as they are.
pub fn format_status(status: &BillStatus) -> String {
    match status {
        BillStatus::Pending => "En attente".to_string(),
        BillStatus::Accepted => "Accepté".to_string(),
        BillStatus::Refused => "Refused".to_string(),
        BillStatus::Other(s) => s.clone(),
    }
}
