//! The remote bills service and the ways of reaching it.
//!
//! Workflows only see the `BillsService` trait. `HttpStore` talks to the real API and `TestStore`
//! keeps everything in memory.

mod http_store;
mod test_store;

use crate::model::{Bill, BillUpload, CreatedBill};
use crate::session::Session;
use crate::{Config, Result};
use tracing::debug;

pub use http_store::HttpStore;
pub use test_store::{Operation, TestStore, TestStoreState};
#[cfg(test)]
pub(crate) use test_store::seed_bills;

/// Set this to a non-empty value to run against the seeded in-memory store.
pub const TEST_MODE_ENV: &str = "BILLED_IN_TEST_MODE";

/// The operations the workflows need from the bills collection.
#[async_trait::async_trait]
pub trait BillsService {
    /// Fetches every bill visible to the session user.
    async fn list(&mut self) -> Result<Vec<Bill>>;

    /// Uploads a justification and creates the bill that will own it.
    async fn create(&mut self, payload: BillUpload) -> Result<CreatedBill>;

    /// Persists `bill`, which must carry the `id` returned by `create`. Answers with the stored
    /// bill.
    async fn update(&mut self, bill: Bill) -> Result<Bill>;
}

/// Which `BillsService` implementation to use.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Http,
    Test,
}

impl Mode {
    /// `Mode::Test` when `BILLED_IN_TEST_MODE` is set and non-empty, `Mode::Http` otherwise.
    pub fn from_env() -> Self {
        match std::env::var(TEST_MODE_ENV) {
            Ok(value) if !value.is_empty() => Mode::Test,
            _ => Mode::Http,
        }
    }
}

/// Creates the `BillsService` for `mode`.
pub fn bills_service(
    config: &Config,
    session: &Session,
    mode: Mode,
) -> Result<Box<dyn BillsService + Send>> {
    debug!("Using the {mode:?} bills service");
    Ok(match mode {
        Mode::Http => Box::new(HttpStore::new(
            config.api_url().clone(),
            session.jwt().map(String::from),
        )?),
        Mode::Test => Box::new(TestStore::default()),
    })
}
