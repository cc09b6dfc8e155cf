//! Dated events: corporate actions from the chart endpoint, news from search.

use super::models::{ChartResponse, SearchResponse};
use crate::domain::{RowTable, Scalar};
use crate::provider::ProviderError;
use std::collections::BTreeMap;

/// Dividends and splits merged into one row per event date, oldest first.
/// A date with only one kind of event carries 0 for the other.
pub fn action_rows(symbol: &str, resp: ChartResponse) -> Result<RowTable, ProviderError> {
    let result = resp.chart.result.ok_or_else(|| match resp.chart.error {
        Some(err) if err.code == "Not Found" => ProviderError::SymbolNotFound {
            symbol: symbol.to_string(),
        },
        Some(err) => ProviderError::ResponseFormatChanged(format!("{}: {}", err.code, err.description)),
        None => ProviderError::ResponseFormatChanged("empty result with no error".into()),
    })?;

    let events = result
        .into_iter()
        .next()
        .and_then(|data| data.events)
        .unwrap_or_default();

    // date -> (dividend, split ratio)
    let mut by_date: BTreeMap<i64, (f64, f64)> = BTreeMap::new();
    for div in events.dividends.values() {
        by_date.entry(div.date).or_insert((0.0, 0.0)).0 = div.amount;
    }
    for split in events.splits.values() {
        if split.denominator == 0.0 {
            continue;
        }
        by_date.entry(split.date).or_insert((0.0, 0.0)).1 = split.numerator / split.denominator;
    }

    let mut table = RowTable::new(vec!["Dividends".into(), "Stock Splits".into()]);
    for (date, (dividend, split)) in by_date {
        table.push_row(date, vec![Scalar::Float(dividend), Scalar::Float(split)]);
    }
    Ok(table)
}

/// News items indexed by publish time.
pub fn news_rows(resp: SearchResponse) -> RowTable {
    let mut table = RowTable::new(
        ["uuid", "title", "publisher", "link", "providerPublishTime", "type"]
            .map(String::from)
            .to_vec(),
    );
    for item in resp.news {
        table.push_row(
            item.provider_publish_time,
            vec![
                item.uuid.into(),
                item.title.into(),
                item.publisher.into(),
                item.link.into(),
                Scalar::Int(item.provider_publish_time),
                item.kind.into(),
            ],
        );
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dividends_and_splits_share_rows_by_date() {
        let json = r#"{"chart": {"result": [{"events": {
            "dividends": {
                "1699574400": {"amount": 0.24, "date": 1699574400},
                "1691712000": {"amount": 0.24, "date": 1691712000}
            },
            "splits": {
                "1598832000": {"date": 1598832000, "numerator": 4, "denominator": 1, "splitRatio": "4:1"}
            }
        }}], "error": null}}"#;
        let resp: ChartResponse = serde_json::from_str(json).unwrap();
        let table = action_rows("AAPL", resp).unwrap();

        assert_eq!(
            table.index,
            vec![Scalar::Int(1598832000), Scalar::Int(1691712000), Scalar::Int(1699574400)]
        );
        assert_eq!(table.rows[0], vec![Scalar::Float(0.0), Scalar::Float(4.0)]);
        assert_eq!(table.rows[2], vec![Scalar::Float(0.24), Scalar::Float(0.0)]);
    }

    #[test]
    fn chart_without_events_has_no_rows() {
        let json = r#"{"chart": {"result": [{"meta": {}}], "error": null}}"#;
        let resp: ChartResponse = serde_json::from_str(json).unwrap();
        assert!(action_rows("AAPL", resp).unwrap().is_empty());
    }

    #[test]
    fn chart_not_found_maps_to_symbol_not_found() {
        let json = r#"{"chart": {"result": null,
            "error": {"code": "Not Found", "description": "No data found, symbol may be delisted"}}}"#;
        let resp: ChartResponse = serde_json::from_str(json).unwrap();
        assert!(matches!(
            action_rows("ZZZZ", resp),
            Err(ProviderError::SymbolNotFound { .. })
        ));
    }

    #[test]
    fn news_items_become_rows() {
        let json = r#"{"news": [
            {"uuid": "a1", "title": "Apple ships", "publisher": "Reuters",
             "link": "https://example.com/a1", "providerPublishTime": 1714608000, "type": "STORY"}
        ]}"#;
        let resp: SearchResponse = serde_json::from_str(json).unwrap();
        let table = news_rows(resp);
        assert_eq!(table.index, vec![Scalar::Int(1714608000)]);
        assert_eq!(table.rows[0][1], Scalar::Text("Apple ships".into()));
        assert_eq!(table.rows[0][5], Scalar::Text("STORY".into()));
    }
}
