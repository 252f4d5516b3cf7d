//! Resolution of relative expressions against a reference instant.
//!
//! Pure functions: the caller supplies the reference instant, so nothing
//! here reads the system clock. Calendar dates are taken in the reference's
//! own timezone.
//!
//! Year and month offsets are coarse, so their results are flattened to the
//! 15th of the resulting month ([`FLATTENED_DAY`]). Week, day, and hour
//! offsets are exact.

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, TimeDelta, TimeZone};

use crate::date::{ResolvedDate, FLATTENED_DAY};
use crate::expression::RelativeExpression;

/// Resolve a relative expression such as `"3 years ago"` to a calendar date.
///
/// Returns `None` when the text is not a recognized relative phrase, or when
/// the offset would leave chrono's representable date range. It never panics.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use relative_date::{resolve, ResolvedDate};
///
/// let reference = Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap();
/// assert_eq!(resolve("2 years ago", &reference), ResolvedDate::new(2022, 3, 15));
/// assert_eq!(resolve("banana", &reference), None);
/// ```
pub fn resolve<Tz: TimeZone>(expression: &str, reference: &DateTime<Tz>) -> Option<ResolvedDate> {
    RelativeExpression::parse(expression)?.resolve(reference)
}

impl RelativeExpression {
    /// Apply this offset to `reference`.
    pub fn resolve<Tz: TimeZone>(&self, reference: &DateTime<Tz>) -> Option<ResolvedDate> {
        let date = reference.date_naive();
        let resolved = match *self {
            Self::YearsAgo(n) => years_before(date, n)?,
            Self::MonthsAgo(n) => months_before(date, n)?,
            Self::WeeksAgo(n) => date.checked_sub_days(Days::new(u64::from(n) * 7))?,
            Self::Yesterday => date.pred_opt()?,
            Self::DaysAgo(n) => date.checked_sub_days(Days::new(u64::from(n)))?,
            Self::HoursAgo(n) => hours_before(reference, n)?,
        };
        Some(ResolvedDate::from(resolved))
    }
}

/// Same month, `n` years earlier, flattened to mid-month.
fn years_before(date: NaiveDate, n: u32) -> Option<NaiveDate> {
    let year = date.year().checked_sub(i32::try_from(n).ok()?)?;
    NaiveDate::from_ymd_opt(year, date.month(), FLATTENED_DAY)
}

/// `n` calendar months earlier, flattened to mid-month.
fn months_before(date: NaiveDate, n: u32) -> Option<NaiveDate> {
    // Anchor on the 1st so the subtraction never clamps a day-of-month.
    let first = date.with_day(1)?;
    first.checked_sub_months(Months::new(n))?.with_day(FLATTENED_DAY)
}

/// Calendar date of the instant `n` hours before `reference`.
fn hours_before<Tz: TimeZone>(reference: &DateTime<Tz>, n: u32) -> Option<NaiveDate> {
    let delta = TimeDelta::try_hours(i64::from(n))?;
    reference
        .clone()
        .checked_sub_signed(delta)
        .map(|dt| dt.date_naive())
}
