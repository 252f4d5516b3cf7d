use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use proptest::prelude::*;
use relative_date::{resolve, RelativeExpression, ResolvedDate};

/// Reference instants between 1900 and 2200.
fn reference() -> impl Strategy<Value = DateTime<Utc>> {
    (-2_208_988_800i64..7_258_118_400i64)
        .prop_map(|secs| Utc.timestamp_opt(secs, 0).single().expect("in range"))
}

proptest! {
    #[test]
    fn years_ago_keeps_month_and_flattens_day(r in reference(), n in 0u32..500) {
        let got = resolve(&format!("{n} years ago"), &r).unwrap();
        prop_assert_eq!(got, ResolvedDate { year: r.year() - n as i32, month: r.month(), day: 15 });
    }

    #[test]
    fn months_ago_lands_on_fifteenth(r in reference(), n in 0u32..2400) {
        let got = resolve(&format!("{n} months ago"), &r).unwrap();
        let months_back = r.year() * 12 + r.month() as i32 - 1 - n as i32;
        prop_assert_eq!(got.year, months_back.div_euclid(12));
        prop_assert_eq!(got.month, months_back.rem_euclid(12) as u32 + 1);
        prop_assert_eq!(got.day, 15);
    }

    #[test]
    fn days_and_weeks_are_exact(r in reference(), n in 0u32..10_000) {
        let base = r.date_naive();
        let days = resolve(&format!("{n} days ago"), &r).unwrap();
        prop_assert_eq!(days.to_naive_date(), Some(base - Duration::days(n as i64)));
        let weeks = resolve(&format!("{n} weeks ago"), &r).unwrap();
        prop_assert_eq!(weeks.to_naive_date(), Some(base - Duration::days(7 * n as i64)));
    }

    #[test]
    fn hours_ago_is_date_of_shifted_instant(r in reference(), n in 0u32..100_000) {
        let got = resolve(&format!("{n} hours ago"), &r).unwrap();
        let expected: NaiveDate = (r - Duration::hours(n as i64)).date_naive();
        prop_assert_eq!(got.to_naive_date(), Some(expected));
    }

    #[test]
    fn yesterday_equals_one_day_ago(r in reference()) {
        prop_assert_eq!(resolve("yesterday", &r), resolve("1 day ago", &r));
    }

    #[test]
    fn case_does_not_matter(r in reference(), n in 0u32..100, upper in any::<bool>()) {
        let lower = format!("{n} weeks ago");
        let text = if upper { lower.to_uppercase() } else { lower.clone() };
        prop_assert_eq!(resolve(&text, &r), resolve(&lower, &r));
    }

    #[test]
    fn never_panics_on_arbitrary_text(text in ".*", r in reference()) {
        let first = resolve(&text, &r);
        prop_assert_eq!(first, resolve(&text, &r));
    }

    #[test]
    fn canonical_form_parses_back(n in 0u32..1_000_000) {
        for expr in [
            RelativeExpression::YearsAgo(n),
            RelativeExpression::MonthsAgo(n),
            RelativeExpression::WeeksAgo(n),
            RelativeExpression::DaysAgo(n),
            RelativeExpression::HoursAgo(n),
        ] {
            prop_assert_eq!(RelativeExpression::parse(&expr.to_string()), Some(expr));
        }
    }
}
