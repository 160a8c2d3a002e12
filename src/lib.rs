pub mod assistant;
pub mod clock;
pub mod config;
pub mod error;
pub mod feed;
pub mod format;
pub mod ledger;
pub mod models;
pub mod submit;

pub use error::{LedgerError, ParseError, Result};
