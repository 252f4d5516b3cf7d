//! Batch backfill of year/month/day fields from relative-date text.
//!
//! Each row is a JSON object holding a free-text expression column and an
//! optional reference timestamp column. Resolved rows get the three date
//! columns written; anything else leaves the row untouched so existing values
//! survive.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::date::ResolvedDate;
use crate::error::DateError;
use crate::reference::parse_reference;
use crate::resolver::resolve;

/// Column names read and written by [`Backfill`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Columns {
    pub expression: String,
    pub reference: String,
    pub year: String,
    pub month: String,
    pub day: String,
}

impl Default for Columns {
    fn default() -> Self {
        Self {
            expression: "date_text".to_string(),
            reference: "captured_at".to_string(),
            year: "year".to_string(),
            month: "month".to_string(),
            day: "day".to_string(),
        }
    }
}

/// What happened to one row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RowOutcome {
    Updated { date: ResolvedDate },
    NoMatch,
    MissingExpression,
    Skipped { reason: String },
}

/// Per-row outcomes plus totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BackfillReport {
    pub total: usize,
    pub updated: usize,
    pub no_match: usize,
    pub missing_expression: usize,
    pub skipped: usize,
    pub rows: Vec<RowOutcome>,
}

impl BackfillReport {
    fn record(&mut self, outcome: RowOutcome) {
        self.total += 1;
        match outcome {
            RowOutcome::Updated { .. } => self.updated += 1,
            RowOutcome::NoMatch => self.no_match += 1,
            RowOutcome::MissingExpression => self.missing_expression += 1,
            RowOutcome::Skipped { .. } => self.skipped += 1,
        }
        self.rows.push(outcome);
    }
}

/// Resolves relative-date text across a batch of rows.
#[derive(Debug, Clone)]
pub struct Backfill {
    columns: Columns,
    timezone: Tz,
    fallback: DateTime<Utc>,
}

impl Backfill {
    /// `fallback` is used for rows with no reference timestamp; callers
    /// normally pass the current time.
    pub fn new(columns: Columns, timezone: Tz, fallback: DateTime<Utc>) -> Self {
        Self {
            columns,
            timezone,
            fallback,
        }
    }

    pub fn columns(&self) -> &Columns {
        &self.columns
    }

    /// Resolve every row in place and report what happened.
    pub fn apply(&self, rows: &mut [Value]) -> BackfillReport {
        let mut report = BackfillReport::default();
        for (index, row) in rows.iter_mut().enumerate() {
            let outcome = match row.as_object_mut() {
                Some(obj) => self.apply_row(obj),
                None => RowOutcome::Skipped {
                    reason: DateError::InvalidRow("not a JSON object".to_string()).to_string(),
                },
            };
            match &outcome {
                RowOutcome::Updated { date } => log::debug!("row {index}: resolved to {date}"),
                RowOutcome::NoMatch => log::debug!("row {index}: no match, left unchanged"),
                RowOutcome::MissingExpression => log::debug!("row {index}: no expression"),
                RowOutcome::Skipped { reason } => log::warn!("row {index}: skipped: {reason}"),
            }
            report.record(outcome);
        }
        report
    }

    fn apply_row(&self, row: &mut Map<String, Value>) -> RowOutcome {
        let expression = match text_field(row, &self.columns.expression) {
            Ok(Some(text)) => text,
            Ok(None) => return RowOutcome::MissingExpression,
            Err(e) => return RowOutcome::Skipped { reason: e.to_string() },
        };

        let reference = match text_field(row, &self.columns.reference) {
            Ok(Some(text)) => match parse_reference(text, self.timezone) {
                Ok(dt) => dt,
                Err(e) => return RowOutcome::Skipped { reason: e.to_string() },
            },
            Ok(None) => self.fallback.with_timezone(&self.timezone),
            Err(e) => return RowOutcome::Skipped { reason: e.to_string() },
        };

        let Some(date) = resolve(expression, &reference) else {
            return RowOutcome::NoMatch;
        };

        row.insert(self.columns.year.clone(), Value::from(date.year));
        row.insert(self.columns.month.clone(), Value::from(date.month));
        row.insert(self.columns.day.clone(), Value::from(date.day));
        RowOutcome::Updated { date }
    }
}

/// Read a string column. Absent, null, and blank all count as missing.
fn text_field<'a>(row: &'a Map<String, Value>, column: &str) -> Result<Option<&'a str>, DateError> {
    match row.get(column) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(other) => Err(DateError::InvalidRow(format!(
            "column '{}' is not a string: {}",
            column, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap()
    }

    fn backfill() -> Backfill {
        Backfill::new(Columns::default(), Tz::UTC, now())
    }

    #[test]
    fn test_updates_matching_row() {
        let mut rows = vec![json!({
            "id": 7,
            "date_text": "2 years ago",
            "captured_at": "2024-03-10T00:00:00Z"
        })];
        let report = backfill().apply(&mut rows);

        assert_eq!(report.updated, 1);
        assert_eq!(
            rows[0],
            json!({
                "id": 7,
                "date_text": "2 years ago",
                "captured_at": "2024-03-10T00:00:00Z",
                "year": 2022,
                "month": 3,
                "day": 15
            })
        );
    }

    #[test]
    fn test_no_match_leaves_existing_values() {
        let original = json!({
            "date_text": "sometime last spring",
            "captured_at": "2024-03-10",
            "year": 2019,
            "month": 4,
            "day": 1
        });
        let mut rows = vec![original.clone()];
        let report = backfill().apply(&mut rows);

        assert_eq!(report.no_match, 1);
        assert_eq!(report.rows, vec![RowOutcome::NoMatch]);
        assert_eq!(rows[0], original);
    }

    #[test]
    fn test_missing_reference_uses_fallback() {
        let mut rows = vec![
            json!({"date_text": "yesterday"}),
            json!({"date_text": "yesterday", "captured_at": null}),
            json!({"date_text": "yesterday", "captured_at": "  "}),
        ];
        let report = backfill().apply(&mut rows);

        assert_eq!(report.updated, 3);
        for row in &rows {
            assert_eq!(row["day"], json!(9));
        }
    }

    #[test]
    fn test_reference_interpreted_in_timezone() {
        let bf = Backfill::new(Columns::default(), Tz::America__Chicago, now());
        // 03:00 UTC on Jan 10 is 21:00 on Jan 9 in Chicago.
        let mut rows = vec![json!({
            "date_text": "1 hour ago",
            "captured_at": "2024-01-10T03:00:00Z"
        })];
        bf.apply(&mut rows);
        assert_eq!(rows[0]["day"], json!(9));
    }

    #[test]
    fn test_missing_expression_counted() {
        let mut rows = vec![json!({"id": 1}), json!({"id": 2, "date_text": ""})];
        let report = backfill().apply(&mut rows);
        assert_eq!(report.missing_expression, 2);
        assert_eq!(rows[0], json!({"id": 1}));
    }

    #[test]
    fn test_bad_reference_skipped() {
        let mut rows = vec![json!({"date_text": "3 days ago", "captured_at": "soon"})];
        let report = backfill().apply(&mut rows);

        assert_eq!(report.skipped, 1);
        match &report.rows[0] {
            RowOutcome::Skipped { reason } => {
                assert!(reason.contains("Invalid reference"), "got: {reason}")
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(rows[0].get("year").is_none());
    }

    #[test]
    fn test_non_object_and_non_string_rows_skipped() {
        let mut rows = vec![json!([1, 2]), json!({"date_text": 42})];
        let report = backfill().apply(&mut rows);
        assert_eq!(report.skipped, 2);
        assert_eq!(report.total, 2);
    }

    #[test]
    fn test_custom_columns() {
        let columns = Columns {
            expression: "review_age".to_string(),
            reference: "scraped".to_string(),
            year: "review_year".to_string(),
            month: "review_month".to_string(),
            day: "review_day".to_string(),
        };
        let bf = Backfill::new(columns, Tz::UTC, now());
        let mut rows = vec![json!({"review_age": "a month ago", "scraped": "2024-01-20"})];
        bf.apply(&mut rows);
        assert_eq!(
            rows[0],
            json!({
                "review_age": "a month ago",
                "scraped": "2024-01-20",
                "review_year": 2023,
                "review_month": 12,
                "review_day": 15
            })
        );
    }

    #[test]
    fn test_report_serializes_outcome_tags() {
        let mut rows = vec![json!({"date_text": "5 days ago", "captured_at": "2024-03-01"})];
        let report = backfill().apply(&mut rows);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(
            json["rows"][0],
            json!({"outcome": "updated", "date": {"year": 2024, "month": 2, "day": 25}})
        );
        assert_eq!(json["updated"], json!(1));
    }
}
