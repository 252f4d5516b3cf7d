//! # relative-date
//!
//! Deterministic resolution of relative date phrases.
//!
//! Turns text like `"3 years ago"`, `"a month ago"`, or `"yesterday"` plus a
//! reference instant into a calendar date, and backfills year/month/day fields
//! on batches of JSON rows. Nothing reads the system clock; callers always
//! supply the reference instant.
//!
//! ## Modules
//!
//! - [`expression`] — free text → [`RelativeExpression`]
//! - [`resolver`] — expression + reference instant → [`ResolvedDate`]
//! - [`date`] — the resolved date triple and its [`Granularity`]
//! - [`reference`] — parsing stored reference timestamps and timezones
//! - [`backfill`] — apply the resolver across rows, leaving unmatched rows untouched
//! - [`error`] — Error types

pub mod backfill;
pub mod date;
pub mod error;
pub mod expression;
pub mod reference;
pub mod resolver;

pub use backfill::{Backfill, BackfillReport, Columns, RowOutcome};
pub use date::{Granularity, ResolvedDate, FLATTENED_DAY};
pub use error::DateError;
pub use expression::RelativeExpression;
pub use reference::{parse_reference, parse_timezone};
pub use resolver::resolve;
