//! Structured reporting of the failures the workflows recover from.

use serde::Serialize;
use tracing::{error, info, warn};

/// Something a workflow wants to tell the outside world about without failing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Diagnostic {
    /// `get_bills` finished with `count` bills.
    BillsListed { count: usize },
    /// A bill could not be formatted and is shown with its raw values.
    FormatFailed { bill_id: Option<String>, error: String },
    /// Uploading the justification failed.
    CreateFailed { error: String },
    /// Saving the bill failed.
    UpdateFailed { error: String },
}

/// Receives `Diagnostic`s.
pub trait Reporter: Send {
    fn report(&mut self, diagnostic: Diagnostic);
}

/// Writes diagnostics to the `tracing` log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&mut self, diagnostic: Diagnostic) {
        match diagnostic {
            Diagnostic::BillsListed { count } => info!(count, "Bills listed"),
            Diagnostic::FormatFailed { bill_id, error } => warn!(
                bill_id = bill_id.as_deref().unwrap_or(""),
                "Unable to format bill: {error}"
            ),
            Diagnostic::CreateFailed { error } => {
                error!("Unable to upload the justification: {error}")
            }
            Diagnostic::UpdateFailed { error } => error!("Unable to save the bill: {error}"),
        }
    }
}

/// Formats an error with its chain of causes on one line.
pub(crate) fn describe(e: &anyhow::Error) -> String {
    format!("{e:#}")
}
