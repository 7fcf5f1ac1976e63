//! Implements the `BillsService` trait using in-memory data for testing purposes.
//!
//! Note: this is compiled even in the "production" version of this app so that we can run the whole
//! app, top-to-bottom, without a running API.

use crate::api::BillsService;
use crate::error::ServiceError;
use crate::model::{Bill, BillUpload, CreatedBill};
use crate::Result;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::trace;

/// The `BillsService` operations, used to record calls and to inject failures.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Operation {
    List,
    Create,
    Update,
}

/// Everything a `TestStore` holds.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct TestStoreState {
    /// The bills collection.
    pub bills: Vec<Bill>,
    /// Every call made, in order.
    pub calls: Vec<Operation>,
    /// Operations that fail with the given HTTP status until the entry is removed.
    pub failures: BTreeMap<Operation, u16>,
}

/// An implementation of the `BillsService` trait that keeps its data in memory. Clones share the
/// same state, so a test can hand one clone to a workflow and inspect the other.
#[derive(Debug, Clone)]
pub struct TestStore {
    state: Arc<Mutex<TestStoreState>>,
}

impl TestStore {
    /// Create a new `TestStore` holding `bills`.
    pub fn new(bills: Vec<Bill>) -> Self {
        Self {
            state: Arc::new(Mutex::new(TestStoreState {
                bills,
                ..Default::default()
            })),
        }
    }

    /// Makes every later call to `operation` fail with `status`.
    pub fn fail(&self, operation: Operation, status: u16) {
        self.lock().failures.insert(operation, status);
    }

    /// A snapshot of the current state.
    pub fn state(&self) -> TestStoreState {
        self.lock().clone()
    }

    /// The number of recorded calls to `operation`.
    pub fn count(&self, operation: Operation) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|&&call| call == operation)
            .count()
    }

    fn lock(&self) -> MutexGuard<'_, TestStoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records the call and returns the injected failure for `operation`, if there is one.
    fn begin(&self, operation: Operation) -> Result<MutexGuard<'_, TestStoreState>> {
        trace!("TestStore {operation:?}");
        let mut state = self.lock();
        state.calls.push(operation);
        let failure = state.failures.get(&operation).copied();
        match failure {
            Some(status) => Err(ServiceError::Status(status).into()),
            None => Ok(state),
        }
    }
}

#[async_trait::async_trait]
impl BillsService for TestStore {
    async fn list(&mut self) -> Result<Vec<Bill>> {
        let state = self.begin(Operation::List)?;
        Ok(state.bills.clone())
    }

    async fn create(&mut self, payload: BillUpload) -> Result<CreatedBill> {
        let mut state = self.begin(Operation::Create)?;
        let key = uuid::Uuid::new_v4().simple().to_string();
        let file_name = payload.file.name().to_string();
        let file_url = format!("https://localhost:3456/images/{file_name}");
        state.bills.push(Bill {
            id: Some(key.clone()),
            email: payload.email,
            file_url: Some(file_url.clone()),
            file_name: Some(file_name.clone()),
            ..Default::default()
        });
        Ok(CreatedBill {
            file_url,
            key,
            bill_id: None,
            file_name: Some(file_name),
        })
    }

    async fn update(&mut self, bill: Bill) -> Result<Bill> {
        let mut state = self.begin(Operation::Update)?;
        let existing = bill
            .id
            .as_ref()
            .and_then(|id| state.bills.iter().position(|b| b.id.as_ref() == Some(id)));
        match existing {
            Some(ix) => state.bills[ix] = bill.clone(),
            None => state.bills.push(bill.clone()),
        }
        Ok(bill)
    }
}

impl Default for TestStore {
    /// Loads seed data from this module.
    fn default() -> Self {
        Self::new(seed_bills())
    }
}

/// The seed bills from this module.
pub(crate) fn seed_bills() -> Vec<Bill> {
    // The seed is a constant that is covered by tests.
    serde_json::from_str(SEED_BILLS).unwrap_or_default()
}

/// Seed bill data, as the remote API would return it.
const SEED_BILLS: &str = r##"[
  {
    "id": "47qAXb6fIm2zOKkLzMro",
    "vat": "80",
    "fileUrl": "https://test.storage.tld/v0/b/billable-677b6.appspot.com/o/justificatifs%2Fpreview-facture-free-201801-pdf-1.jpg?alt=media&token=c1640e12-a24b-4b11-ae52-529112e9602a",
    "status": "pending",
    "type": "Hôtel et logement",
    "commentary": "séminaire billed",
    "name": "encore",
    "fileName": "preview-facture-free-201801-pdf-1.jpg",
    "date": "2004-04-04",
    "amount": 400,
    "commentAdmin": "ok",
    "email": "a@a",
    "pct": 20
  },
  {
    "id": "BeKy5Mo4jkmdfPGYpTxZ",
    "vat": "",
    "amount": 100,
    "name": "test1",
    "fileName": "1592770761.jpeg",
    "commentary": "plop",
    "pct": 20,
    "type": "Transports",
    "email": "a@a",
    "fileUrl": "https://test.storage.tld/v0/b/billable-677b6.appspot.com/o/justificatifs%2F1592770761.jpeg?alt=media&token=7685cd61-c112-42bc-9929-8a799bb82d8b",
    "date": "2001-01-01",
    "status": "refused",
    "commentAdmin": "en fait non"
  },
  {
    "id": "UIUZtnPQvnbFnB0ozvJh",
    "name": "test3",
    "email": "a@a",
    "type": "Services en ligne",
    "vat": "60",
    "pct": 20,
    "commentAdmin": "bon bah d'accord",
    "amount": 300,
    "status": "accepted",
    "date": "2003-03-03",
    "commentary": "",
    "fileName": "facture-client-php-exportee-dans-document-pdf-enregistre-sur-disque-dur.png",
    "fileUrl": "https://test.storage.tld/v0/b/billable-677b6.appspot.com/o/justificatifs%2Ffacture-client-php-exportee-dans-document-pdf-enregistre-sur-disque-dur.png?alt=media&token=571d34cb-9c8f-430a-af52-66221cae1da3"
  },
  {
    "id": "qcCK3SzECmaZAGRrHjaC",
    "status": "refused",
    "pct": 20,
    "amount": 200,
    "email": "a@a",
    "name": "test2",
    "vat": "40",
    "fileName": "preview-facture-free-201801-pdf-1.jpg",
    "date": "2002-02-02",
    "commentAdmin": "pas la bonne facture",
    "commentary": "test2",
    "type": "Restaurants et bars",
    "fileUrl": "https://firebasestorage.googleapis.com/v0/b/billable-677b6.appspot.com/o/justificatifs%2Fpreview-facture-free-201801-pdf-1.jpg?alt=media&token=4df6ed2c-12c8-42a2-b013-346c1346f732"
  }
]"##;
