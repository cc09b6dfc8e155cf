//! End-to-end pipeline runs against a temporary SQLite database.

mod common;

use common::*;
use finsync_core::domain::{DataType, RawPayload, RowTable, Scalar};
use finsync_core::error::IngestError;
use finsync_core::provider::InfoBundle;
use finsync_core::Pipeline;
use rusqlite::Connection;

fn tickers(list: &[&str]) -> Vec<String> {
    list.iter().map(|t| t.to_string()).collect()
}

#[test]
fn annual_income_row_matches_destination_columns() {
    let (_dir, store) = temp_store();
    let provider = ScriptedProvider::default().with_table(
        "AAPL",
        DataType::AnnualIncome,
        income_statement(&[("2023-12-31", 383_285_000_000.0, 214_137_000_000.0)]),
    );
    let progress = RecordingProgress::default();

    let summary =
        Pipeline::new(&provider, &store, &progress).run(&tickers(&["AAPL"]), &[DataType::AnnualIncome]);

    assert!(summary.all_succeeded());
    assert_eq!(summary.rows_inserted, 1);

    let (ticker, report_date, revenue): (String, String, f64) = Connection::open(store.path())
        .unwrap()
        .query_row(
            "SELECT ticker, report_date, total_revenue FROM annual_income_statements",
            [],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
        )
        .unwrap();
    assert_eq!(ticker, "AAPL");
    assert_eq!(report_date, "2023-12-31");
    assert_eq!(revenue, 383_285_000_000.0);

    let events = progress.events();
    assert!(events.contains(&"dropped annual_income_statements.cost_of_revenue".to_string()));
    assert!(events.contains(&"added annual_income_statements AAPL 2023-12-31".to_string()));
}

#[test]
fn second_identical_run_adds_nothing() {
    let (_dir, store) = temp_store();
    let provider = ScriptedProvider::default().with_table(
        "AAPL",
        DataType::AnnualIncome,
        income_statement(&[
            ("2023-12-31", 383.0, 214.0),
            ("2022-12-31", 394.0, 223.0),
        ]),
    );
    let progress = RecordingProgress::default();
    let pipeline = Pipeline::new(&provider, &store, &progress);

    let first = pipeline.run(&tickers(&["AAPL"]), &[DataType::AnnualIncome]);
    let second = pipeline.run(&tickers(&["AAPL"]), &[DataType::AnnualIncome]);

    assert_eq!(first.rows_inserted, 2);
    assert_eq!(second.rows_inserted, 0);
    assert_eq!(second.rows_skipped, 2);
    assert!(second.all_succeeded());
    assert_eq!(count_rows(store.path(), "annual_income_statements"), 2);
    assert!(progress
        .events()
        .contains(&"skipped annual_income_statements AAPL 2022-12-31".to_string()));
}

#[test]
fn empty_info_bundle_writes_nothing_and_run_continues() {
    let (_dir, store) = temp_store();
    let provider = ScriptedProvider::default().with_table(
        "AAPL",
        DataType::AnnualIncome,
        income_statement(&[("2023-12-31", 1.0, 1.0)]),
    );
    let progress = RecordingProgress::default();

    let summary = Pipeline::new(&provider, &store, &progress).run(
        &tickers(&["AAPL"]),
        &[DataType::StockMetrics, DataType::AnnualIncome],
    );

    assert_eq!(summary.no_data, 1);
    assert_eq!(summary.succeeded, 1);
    assert!(summary.all_succeeded());
    assert_eq!(count_rows(store.path(), "stock_metrics"), 0);
    assert_eq!(count_rows(store.path(), "annual_income_statements"), 1);
    assert!(progress
        .events()
        .contains(&"done AAPL stock_metrics: no data".to_string()));
}

#[test]
fn stock_metrics_are_reconciled_and_dated_as_of() {
    let (_dir, store) = temp_store();
    let mut info = InfoBundle::default();
    info.insert("longName", Scalar::Text("Apple Inc.".into()));
    info.insert("currentPrice", Scalar::Float(189.5));
    info.insert("recommendationKey", Scalar::Text("buy".into()));
    let provider = ScriptedProvider::default().with_info("AAPL", info);
    let progress = RecordingProgress::default();

    let summary = Pipeline::new(&provider, &store, &progress)
        .with_as_of(date("2024-05-01"))
        .run(&tickers(&["AAPL"]), &[DataType::StockMetrics]);
    assert_eq!(summary.rows_inserted, 1);

    let (report_date, name, price, beta): (String, String, f64, Option<f64>) =
        Connection::open(store.path())
            .unwrap()
            .query_row(
                "SELECT report_date, company_name, current_price, beta FROM stock_metrics",
                [],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?)),
            )
            .unwrap();
    assert_eq!(report_date, "2024-05-01");
    assert_eq!(name, "Apple Inc.");
    assert_eq!(price, 189.5);
    assert_eq!(beta, None);

    // Vocabulary fields the table does not define are dropped, not errors.
    let events = progress.events();
    assert!(events.contains(&"dropped stock_metrics.market_cap".to_string()));
    assert!(!events.contains(&"dropped stock_metrics.ticker".to_string()));
    assert!(!events.iter().any(|e| e.starts_with("null stock_metrics.")));
}

#[test]
fn stock_metrics_run_before_other_types() {
    let (_dir, store) = temp_store();
    let provider = ScriptedProvider::default();
    let progress = RecordingProgress::default();

    Pipeline::new(&provider, &store, &progress).run(
        &tickers(&["AAPL"]),
        &[DataType::News, DataType::StockMetrics, DataType::News],
    );

    let starts: Vec<String> = progress
        .events()
        .into_iter()
        .filter(|e| e.starts_with("start"))
        .collect();
    assert_eq!(starts, vec!["start AAPL stock_metrics", "start AAPL news"]);
}

#[test]
fn failing_ticker_does_not_stop_the_others() {
    let (_dir, store) = temp_store();
    let provider = ScriptedProvider::default()
        .with_unreachable("BAD")
        .with_table(
            "AAPL",
            DataType::AnnualIncome,
            income_statement(&[("2023-12-31", 1.0, 1.0)]),
        );
    let progress = RecordingProgress::default();

    let summary = Pipeline::new(&provider, &store, &progress)
        .run(&tickers(&["BAD", "AAPL"]), &[DataType::AnnualIncome]);

    assert_eq!(summary.units, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.succeeded, 1);
    assert!(!summary.all_succeeded());
    let (ticker, kind, err) = &summary.failures[0];
    assert_eq!(ticker, "BAD");
    assert_eq!(*kind, DataType::AnnualIncome);
    assert!(matches!(err, IngestError::Provider(_)));
    assert_eq!(count_rows(store.path(), "annual_income_statements"), 1);
}

#[test]
fn missing_destination_table_fails_only_that_unit() {
    let (_dir, store) = temp_store();
    let mut news = RowTable::new(vec!["title".into(), "publisher".into()]);
    news.push_row(Scalar::Int(1_714_608_000), vec!["Apple ships".into(), "Reuters".into()]);
    let provider = ScriptedProvider::default()
        .with_table("AAPL", DataType::QuarterlyIncome, income_statement(&[("2024-03-31", 1.0, 1.0)]))
        .with_table("AAPL", DataType::News, RawPayload::Rows(news));
    let progress = RecordingProgress::default();

    let summary = Pipeline::new(&provider, &store, &progress).run(
        &tickers(&["AAPL"]),
        &[DataType::QuarterlyIncome, DataType::News],
    );

    assert_eq!(summary.failed, 1);
    assert!(matches!(
        &summary.failures[0].2,
        IngestError::SchemaUnavailable { table } if table == "quarterly_income_statements"
    ));
    assert_eq!(count_rows(store.path(), "company_news"), 1);
}

#[test]
fn failed_duplicate_check_still_inserts() {
    let (_dir, sqlite) = temp_store();
    let mut store = FlakyStore::new(&sqlite);
    store.fail_lookups = true;
    let provider = ScriptedProvider::default().with_table(
        "AAPL",
        DataType::AnnualIncome,
        income_statement(&[("2023-12-31", 1.0, 1.0)]),
    );
    let progress = RecordingProgress::default();

    let summary = Pipeline::new(&provider, &store, &progress)
        .run(&tickers(&["AAPL"]), &[DataType::AnnualIncome]);

    assert!(summary.all_succeeded());
    assert_eq!(summary.rows_inserted, 1);
    assert!(progress
        .events()
        .contains(&"check failed annual_income_statements AAPL".to_string()));
    assert_eq!(count_rows(sqlite.path(), "annual_income_statements"), 1);
}

#[test]
fn insert_failure_keeps_earlier_rows_and_fails_unit() {
    let (_dir, sqlite) = temp_store();
    let mut store = FlakyStore::new(&sqlite);
    store.fail_insert_at = Some(1);
    let provider = ScriptedProvider::default().with_table(
        "AAPL",
        DataType::AnnualIncome,
        income_statement(&[
            ("2023-12-31", 1.0, 1.0),
            ("2022-12-31", 2.0, 2.0),
            ("2021-12-31", 3.0, 3.0),
        ]),
    );
    let progress = RecordingProgress::default();

    let summary = Pipeline::new(&provider, &store, &progress)
        .run(&tickers(&["AAPL"]), &[DataType::AnnualIncome]);

    assert_eq!(summary.failed, 1);
    assert_eq!(summary.rows_inserted, 1);
    let IngestError::Write(err) = &summary.failures[0].2 else {
        panic!("expected a write failure");
    };
    assert_eq!(err.written.inserted, 1);
    assert_eq!(count_rows(sqlite.path(), "annual_income_statements"), 1);
}

#[test]
fn uncoercible_report_date_fails_the_unit() {
    let (_dir, store) = temp_store();
    let mut news = RowTable::new(vec!["title".into()]);
    news.push_row("yesterday", vec!["Apple ships".into()]);
    let provider =
        ScriptedProvider::default().with_table("AAPL", DataType::News, RawPayload::Rows(news));
    let progress = RecordingProgress::default();

    let summary =
        Pipeline::new(&provider, &store, &progress).run(&tickers(&["AAPL"]), &[DataType::News]);

    assert_eq!(summary.failed, 1);
    assert!(matches!(&summary.failures[0].2, IngestError::Normalize(_)));
    assert_eq!(count_rows(store.path(), "company_news"), 0);
}
