pub mod api;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod dom;
pub mod driver;
pub mod error;
pub mod expect;
pub mod formatter;
pub mod locator;
pub mod login;
pub mod report;
pub mod todo;
pub mod wait;

pub use driver::{Driver, NavigationResult};
pub use error::DriverError;
pub use locator::Locator;
pub use report::{CheckOutcome, RunReport, ScenarioReport, Severity};
