use crate::api::{bills_service, Mode};
use crate::args::NewBillArgs;
use crate::commands::{load_session, Out};
use crate::model::{Bill, SelectedFile};
use crate::report::TracingReporter;
use crate::ui::{LogAlert, LogNavigator};
use crate::workflow::{FileChange, NewBill, Submission, INVALID_FILE_MESSAGE};
use crate::{Config, Result};
use anyhow::bail;
use tracing::warn;

/// Picks the justification given in `args`, then submits the form.
///
/// An upload failure does not stop the submission, the bill is saved without its justification.
///
/// # Errors
/// - Returns an error if the file cannot be read or has a forbidden extension.
/// - Returns an error if the bill cannot be saved.
pub async fn new_bill(config: Config, mode: Mode, args: NewBillArgs) -> Result<Out<Bill>> {
    let session = load_session(&config).await?;
    let store = bills_service(&config, &session, mode)?;
    let file = SelectedFile::load(args.file()).await?;
    let mut page = NewBill::new(
        store,
        session,
        Box::new(LogNavigator),
        Box::new(LogAlert),
        Box::new(TracingReporter),
    );

    match page.handle_change_file(file).await {
        FileChange::Rejected => bail!(INVALID_FILE_MESSAGE),
        FileChange::Uploaded(_) => {}
        FileChange::UploadFailed { error } => {
            warn!("Submitting the bill without its justification: {error}")
        }
    }

    match page.handle_submit(args.form()).await {
        Submission::Submitted(bill) => {
            Ok(Out::new(format!("Note de frais '{}' envoyée", bill.name), bill))
        }
        Submission::Failed { error } => bail!("Unable to submit the bill: {error}"),
    }
}
