//! Fuzzy medicine-name search over the catalogue.

pub mod fuzzy;

pub use fuzzy::*;

use thiserror::Error;

use crate::db::DatabaseError;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}
