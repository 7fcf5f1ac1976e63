//! The new bill page: upload a justification as soon as it is picked, then save the bill when the
//! form is submitted.

use crate::api::BillsService;
use crate::model::{Bill, BillForm, BillStatus, BillUpload, CreatedBill, SelectedFile, DEFAULT_PCT};
use crate::report::{describe, Diagnostic, Reporter};
use crate::session::Session;
use crate::ui::{Alert, Navigator, Route};
use tracing::{debug, info};

/// The justification extensions the remote service accepts.
pub const ALLOWED_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// The alert shown when the justification has another extension.
pub const INVALID_FILE_MESSAGE: &str = "Le justificatif doit être au format jpeg, jpg ou png";

/// Returns true if the name of `file` ends with one of the `ALLOWED_EXTENSIONS`, in any case.
pub fn is_allowed_justification(file: &SelectedFile) -> bool {
    file.extension()
        .map(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// Where the page is in its lifecycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum NewBillState {
    #[default]
    Empty,
    /// A valid justification was picked but has not been uploaded.
    FileSelected { file_name: String },
    /// The justification was uploaded and the remote service created the bill.
    Uploaded {
        bill_id: String,
        file_url: String,
        file_name: String,
    },
    /// The bill was saved.
    Submitted,
}

/// The result of `handle_change_file`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileChange {
    /// The file has a forbidden extension. The user was alerted and nothing was uploaded.
    Rejected,
    Uploaded(CreatedBill),
    /// `create` failed. The error has been reported.
    UploadFailed { error: String },
}

/// The result of `handle_submit`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// The bill was saved and the user was sent to the bills page.
    Submitted(Bill),
    /// `update` failed. The error has been reported and the user stays on the form.
    Failed { error: String },
}

pub struct NewBill {
    store: Box<dyn BillsService + Send>,
    session: Session,
    navigator: Box<dyn Navigator>,
    alert: Box<dyn Alert>,
    reporter: Box<dyn Reporter>,
    state: NewBillState,
}

impl NewBill {
    pub fn new(
        store: Box<dyn BillsService + Send>,
        session: Session,
        navigator: Box<dyn Navigator>,
        alert: Box<dyn Alert>,
        reporter: Box<dyn Reporter>,
    ) -> Self {
        Self {
            store,
            session,
            navigator,
            alert,
            reporter,
            state: NewBillState::Empty,
        }
    }

    pub fn state(&self) -> &NewBillState {
        &self.state
    }

    /// The multipart payload for `file`: the file itself and the session user's email.
    pub fn upload_payload(&self, file: SelectedFile) -> BillUpload {
        BillUpload {
            file,
            email: self.session.email().to_string(),
        }
    }

    /// Validates `file` and, when its extension is allowed, uploads it right away.
    pub async fn handle_change_file(&mut self, file: SelectedFile) -> FileChange {
        if !is_allowed_justification(&file) {
            debug!("Rejected justification '{}'", file.name());
            self.alert.alert(INVALID_FILE_MESSAGE);
            return FileChange::Rejected;
        }

        let file_name = file.name().to_string();
        self.state = NewBillState::FileSelected {
            file_name: file_name.clone(),
        };
        let payload = self.upload_payload(file);
        match self.store.create(payload).await {
            Ok(created) => {
                debug!("Uploaded '{file_name}' to {}", created.file_url);
                self.state = NewBillState::Uploaded {
                    bill_id: created.id().to_string(),
                    file_url: created.file_url.clone(),
                    file_name: created.file_name.clone().unwrap_or(file_name),
                };
                FileChange::Uploaded(created)
            }
            Err(e) => {
                let error = describe(&e);
                self.reporter
                    .report(Diagnostic::CreateFailed { error: error.clone() });
                FileChange::UploadFailed { error }
            }
        }
    }

    /// Builds the bill from `form`, the session and the uploaded justification, if any.
    pub fn bill_from_form(&self, form: BillForm) -> Bill {
        let (id, file_url, file_name) = match &self.state {
            NewBillState::Uploaded {
                bill_id,
                file_url,
                file_name,
            } => (
                Some(bill_id.clone()),
                Some(file_url.clone()),
                Some(file_name.clone()),
            ),
            _ => (None, None, None),
        };
        Bill {
            id,
            expense_type: form.expense_type,
            name: form.name,
            date: form.date,
            amount: Some(form.amount),
            vat: form.vat,
            pct: Some(form.pct.unwrap_or(DEFAULT_PCT)),
            commentary: form.commentary,
            comment_admin: None,
            file_url,
            file_name,
            status: BillStatus::Pending,
            email: self.session.email().to_string(),
        }
    }

    /// Saves the bill described by `form` and goes back to the bills page.
    ///
    /// A failed save is reported and leaves the state as it was, without navigating.
    pub async fn handle_submit(&mut self, form: BillForm) -> Submission {
        let bill = self.bill_from_form(form);
        match self.store.update(bill).await {
            Ok(saved) => {
                info!("Bill '{}' submitted", saved.name);
                self.state = NewBillState::Submitted;
                self.navigator.navigate(Route::Bills);
                Submission::Submitted(saved)
            }
            Err(e) => {
                let error = describe(&e);
                self.reporter
                    .report(Diagnostic::UpdateFailed { error: error.clone() });
                Submission::Failed { error }
            }
        }
    }
}
