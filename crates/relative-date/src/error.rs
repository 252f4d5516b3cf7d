//! Error types for relative-date operations.
//!
//! Resolving an expression never fails; an unrecognized phrase is `None`.
//! These errors cover the surrounding layers: parsing reference timestamps,
//! timezones, and backfill rows.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateError {
    #[error("Invalid reference timestamp: {0}")]
    InvalidReference(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid row: {0}")]
    InvalidRow(String),
}

pub type Result<T> = std::result::Result<T, DateError>;
