//! The page-level capabilities the workflows drive: navigation between pages and blocking alerts.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// The named pages of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Route {
    Login,
    Bills,
    NewBill,
    Dashboard,
}

serde_plain::derive_display_from_serialize!(Route);
serde_plain::derive_fromstr_from_deserialize!(Route);

impl Route {
    /// The location path of the page.
    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/",
            Route::Bills => "#employee/bills",
            Route::NewBill => "#employee/bill/new",
            Route::Dashboard => "#admin/dashboard",
        }
    }
}

/// Moves the user to another page.
pub trait Navigator: Send {
    fn navigate(&mut self, route: Route);
}

/// Shows a message the user must acknowledge.
pub trait Alert: Send {
    fn alert(&mut self, message: &str);
}

/// A `Navigator` for the command line, where there are no pages to move between. It logs the move.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&mut self, route: Route) {
        info!("Navigating to {route} ({})", route.path());
    }
}

/// An `Alert` for the command line.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogAlert;

impl Alert for LogAlert {
    fn alert(&mut self, message: &str) {
        warn!("{message}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_route_paths() {
        assert_eq!("#employee/bills", Route::Bills.path());
        assert_eq!("#employee/bill/new", Route::NewBill.path());
        assert_eq!("NewBill", Route::NewBill.to_string());
        assert_eq!(Route::Bills, Route::from_str("Bills").unwrap());
    }
}
