//! Types that represent the core data model, such as `Bill` and `SelectedFile`.
mod bill;
mod file;
mod format;

pub use bill::{Bill, BillForm, BillStatus, DEFAULT_PCT};
pub use file::{BillUpload, CreatedBill, SelectedFile};
pub use format::{format_date, format_status};
use serde::{Deserialize, Serialize};

/// A bill prepared for the bills page: the raw record plus its display `date` and `status`.
///
/// When formatting fails, `date` and `status` hold the raw values and `formatted` is false.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DisplayBill {
    pub bill: Bill,
    pub date: String,
    pub status: String,
    pub formatted: bool,
}

impl DisplayBill {
    /// Formats `bill` for display.
    pub fn format(bill: Bill) -> crate::Result<Self> {
        let date = format_date(&bill.date)?;
        let status = format_status(&bill.status);
        Ok(Self {
            bill,
            date,
            status,
            formatted: true,
        })
    }

    /// Wraps `bill` without formatting it.
    pub fn unformatted(bill: Bill) -> Self {
        Self {
            date: bill.date.clone(),
            status: bill.status.to_string(),
            bill,
            formatted: false,
        }
    }
}
