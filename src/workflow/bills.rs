//! The bills page: fetch the session user's bills and prepare them for display.

use crate::api::BillsService;
use crate::model::DisplayBill;
use crate::report::{describe, Diagnostic, Reporter};
use crate::session::Session;
use crate::ui::{Navigator, Route};
use crate::Result;
use tracing::debug;

/// The link to a bill's justification, shown in a modal when the eye icon is clicked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JustificationPreview {
    pub file_url: String,
    pub file_name: String,
}

pub struct Bills {
    store: Box<dyn BillsService + Send>,
    session: Session,
    navigator: Box<dyn Navigator>,
    reporter: Box<dyn Reporter>,
}

impl Bills {
    pub fn new(
        store: Box<dyn BillsService + Send>,
        session: Session,
        navigator: Box<dyn Navigator>,
        reporter: Box<dyn Reporter>,
    ) -> Self {
        Self {
            store,
            session,
            navigator,
            reporter,
        }
    }

    /// Fetches all bills and formats each one, keeping the order `list` returned them in.
    ///
    /// A bill that cannot be formatted is reported and returned with its raw `date` and `status`.
    /// The number of bills is reported once per call.
    ///
    /// # Errors
    /// Returns the error of the `list` call unchanged.
    pub async fn get_bills(&mut self) -> Result<Vec<DisplayBill>> {
        debug!("Fetching bills for '{}'", self.session.email());
        let bills = self.store.list().await?;
        let mut formatted = Vec::with_capacity(bills.len());
        for bill in bills {
            let display = match DisplayBill::format(bill.clone()) {
                Ok(display) => display,
                Err(e) => {
                    self.reporter.report(Diagnostic::FormatFailed {
                        bill_id: bill.id.clone(),
                        error: describe(&e),
                    });
                    DisplayBill::unformatted(bill)
                }
            };
            formatted.push(display);
        }
        self.reporter.report(Diagnostic::BillsListed {
            count: formatted.len(),
        });
        Ok(formatted)
    }

    /// The "new bill" button.
    pub fn handle_click_new_bill(&mut self) {
        self.navigator.navigate(Route::NewBill);
    }

    /// The eye icon of a row. `None` when the bill has no justification.
    pub fn handle_click_icon_eye(&self, bill: &DisplayBill) -> Option<JustificationPreview> {
        bill.bill
            .justification()
            .map(|(file_url, file_name)| JustificationPreview {
                file_url: file_url.to_string(),
                file_name: file_name.to_string(),
            })
    }
}
