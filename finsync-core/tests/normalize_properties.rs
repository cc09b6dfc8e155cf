//! Property tests for the record normalizer.
//!
//! Uses proptest to verify:
//! 1. Column set — every output row carries exactly the destination columns, in order
//! 2. Gap filling — destination columns absent from the source are null
//! 3. Dropping — source columns absent from the destination never appear
//! 4. Row count — one output row per report period

use chrono::{Duration, NaiveDate};
use finsync_core::domain::{RawPayload, Scalar, WideTable};
use finsync_core::normalize::{canonical_name, normalize};
use proptest::prelude::*;
use std::collections::BTreeSet;

// ── Strategies ───────────────────────────────────────────────────────

const METRIC_POOL: &[&str] = &[
    "Total Revenue",
    "Cost Of Revenue",
    "Gross Profit",
    "Research And Development",
    "Selling General & Administration",
    "Net Income",
    "Basic EPS",
    "EBITDA",
    "Interest Expense, Net",
];

const EXTRA_DESTINATION: &[&str] = &["beta", "market_cap", "dividends", "free_cashflow"];

fn arb_metrics() -> impl Strategy<Value = Vec<&'static str>> {
    proptest::sample::subsequence(METRIC_POOL, 0..=METRIC_POOL.len())
}

fn arb_periods() -> impl Strategy<Value = Vec<NaiveDate>> {
    proptest::collection::btree_set(0i64..4000, 1..6).prop_map(|offsets| {
        let base = NaiveDate::from_ymd_opt(2010, 1, 1).unwrap();
        offsets.into_iter().rev().map(|d| base + Duration::days(d)).collect()
    })
}

fn arb_value() -> impl Strategy<Value = Scalar> {
    prop_oneof![
        Just(Scalar::Null),
        (-1.0e12..1.0e12_f64).prop_map(Scalar::Float),
    ]
}

/// A wide table plus a destination column list drawn partly from the
/// table's own (canonical) metric names and partly from unrelated names.
fn arb_case() -> impl Strategy<Value = (WideTable, Vec<String>)> {
    (arb_metrics(), arb_periods()).prop_flat_map(|(metrics, periods)| {
        let n = periods.len();
        let values = proptest::collection::vec(proptest::collection::vec(arb_value(), n), metrics.len());

        let mut candidates: Vec<String> = vec!["ticker".into(), "report_date".into()];
        candidates.extend(metrics.iter().map(|m| canonical_name(m)));
        candidates.extend(EXTRA_DESTINATION.iter().map(|s| s.to_string()));
        let destination = proptest::sample::subsequence(candidates.clone(), 1..=candidates.len())
            .prop_shuffle();

        (Just(metrics), Just(periods), values, destination).prop_map(
            |(metrics, periods, values, destination)| {
                let mut table = WideTable::new(
                    periods
                        .iter()
                        .map(|d| Scalar::Text(d.format("%Y-%m-%d").to_string()))
                        .collect(),
                );
                for (metric, row) in metrics.iter().zip(values) {
                    table.push_metric(*metric, row);
                }
                (table, destination)
            },
        )
    })
}

// ── Properties ───────────────────────────────────────────────────────

proptest! {
    #[test]
    fn rows_carry_exactly_the_destination_columns((table, destination) in arb_case()) {
        let out = normalize("AAPL", &RawPayload::Wide(table), &destination).unwrap();
        for row in &out.rows {
            let columns: Vec<&str> = row.columns().collect();
            let expected: Vec<&str> = destination.iter().map(String::as_str).collect();
            prop_assert_eq!(columns, expected);
        }
    }

    #[test]
    fn absent_source_columns_are_null((table, destination) in arb_case()) {
        let source: BTreeSet<String> = table
            .metrics
            .iter()
            .map(|m| canonical_name(m))
            .chain(["ticker".to_string(), "report_date".to_string()])
            .collect();
        let out = normalize("AAPL", &RawPayload::Wide(table), &destination).unwrap();

        for row in &out.rows {
            for column in destination.iter().filter(|c| !source.contains(*c)) {
                prop_assert_eq!(row.get(column), Some(&Scalar::Null));
            }
        }
        if !out.rows.is_empty() {
            for column in destination.iter().filter(|c| !source.contains(*c)) {
                prop_assert!(out.report.added_null.contains(column));
            }
        }
    }

    #[test]
    fn unknown_source_columns_are_dropped((table, destination) in arb_case()) {
        let dropped_expected: Vec<String> = table
            .metrics
            .iter()
            .map(|m| canonical_name(m))
            .filter(|c| !destination.contains(c))
            .collect();
        let out = normalize("AAPL", &RawPayload::Wide(table), &destination).unwrap();

        for row in &out.rows {
            for column in &dropped_expected {
                prop_assert!(row.get(column).is_none());
            }
        }
        if !out.rows.is_empty() {
            for column in &dropped_expected {
                prop_assert!(out.report.dropped.contains(column));
            }
        }
    }

    #[test]
    fn one_row_per_period((table, destination) in arb_case()) {
        let expected = if table.is_empty() { 0 } else { table.periods.len() };
        let periods: Vec<Scalar> = table.periods.clone();
        let out = normalize("AAPL", &RawPayload::Wide(table), &destination).unwrap();

        prop_assert_eq!(out.rows.len(), expected);
        for (row, period) in out.rows.iter().zip(&periods) {
            prop_assert_eq!(row.report_date.format("%Y-%m-%d").to_string(), period.to_string());
        }
    }
}
