//! The two employee pages, expressed as workflows over injected capabilities.

mod bills;
mod new_bill;

pub use bills::{Bills, JustificationPreview};
pub use new_bill::{
    is_allowed_justification, FileChange, NewBill, NewBillState, Submission, ALLOWED_EXTENSIONS,
    INVALID_FILE_MESSAGE,
};
