//! Billed: the employee side of an expense-report application.
//!
//! The [`workflow`] module holds the two pages an employee uses: the bills list and the new bill
//! form. They talk to the remote bills API through the [`api::BillsService`] trait and read the
//! logged-in user from a [`session::Session`].

pub mod api;
pub mod args;
pub mod commands;
mod config;
mod error;
pub mod model;
pub mod report;
pub mod session;
pub mod ui;
mod utils;
pub mod view;
pub mod workflow;


pub use api::Mode;
pub use config::Config;
pub use error::{Error, Result, ServiceError};
