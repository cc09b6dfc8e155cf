//! quoteSummary modules: earnings calendar, analyst data and the info bundle.

use super::models::{QuoteSummaryResponse, RecommendationTrend, UpgradeDowngradeHistory};
use crate::domain::{FlatRecord, RowTable, Scalar};
use crate::normalize::REPORT_DATE_COLUMN;
use crate::provider::{InfoBundle, ProviderError};
use chrono::{DateTime, Datelike, Months, NaiveDate};
use serde_json::Value;
use std::collections::BTreeMap;

pub const CALENDAR_MODULES: &str = "calendarEvents";
pub const RECOMMENDATION_MODULES: &str = "recommendationTrend";
pub const UPGRADE_MODULES: &str = "upgradeDowngradeHistory";
pub const INFO_MODULES: &[&str] = &[
    "price",
    "summaryDetail",
    "defaultKeyStatistics",
    "financialData",
    "summaryProfile",
    "quoteType",
];

pub type Modules = BTreeMap<String, Value>;

/// First result of a quoteSummary response.
pub fn first_result(symbol: &str, resp: QuoteSummaryResponse) -> Result<Modules, ProviderError> {
    match resp.quote_summary.result {
        Some(results) => Ok(results.into_iter().next().unwrap_or_default()),
        None => Err(match resp.quote_summary.error {
            Some(err) if err.code == "Not Found" => ProviderError::SymbolNotFound {
                symbol: symbol.to_string(),
            },
            Some(err) => {
                ProviderError::ResponseFormatChanged(format!("{}: {}", err.code, err.description))
            }
            None => ProviderError::ResponseFormatChanged("empty result with no error".into()),
        }),
    }
}

/// `{"raw": 1.5, "fmt": "1.50"}` becomes `1.5`; plain leaves pass through.
/// Empty objects and arrays have no scalar value.
fn unwrap_raw(value: &Value) -> Option<Scalar> {
    match value {
        Value::Object(map) => map.get("raw").and_then(Scalar::from_json),
        other => Scalar::from_json(other),
    }
}

fn epoch_date(value: &Value) -> Scalar {
    unwrap_raw(value)
        .and_then(|s| match s {
            Scalar::Int(secs) => DateTime::from_timestamp(secs, 0).map(|dt| Scalar::Date(dt.date_naive())),
            _ => None,
        })
        .unwrap_or(Scalar::Null)
}

fn module<T: serde::de::DeserializeOwned>(
    modules: &Modules,
    name: &str,
) -> Result<Option<T>, ProviderError> {
    modules
        .get(name)
        .map(|v| serde_json::from_value(v.clone()))
        .transpose()
        .map_err(|e| ProviderError::ResponseFormatChanged(format!("module {name}: {e}")))
}

/// Upcoming earnings and dividend dates as one record dated `today`.
pub fn calendar_record(modules: &Modules, today: NaiveDate) -> FlatRecord {
    let mut record = FlatRecord::new();
    let Some(events) = modules.get(CALENDAR_MODULES) else {
        return record;
    };

    let null = Value::Null;
    let earnings = events.get("earnings").unwrap_or(&null);
    let earnings_date = earnings
        .get("earningsDate")
        .and_then(Value::as_array)
        .and_then(|dates| dates.first())
        .unwrap_or(&null);

    let fields = [
        ("Dividend Date", epoch_date(events.get("dividendDate").unwrap_or(&null))),
        ("Ex-Dividend Date", epoch_date(events.get("exDividendDate").unwrap_or(&null))),
        ("Earnings Date", epoch_date(earnings_date)),
        ("Earnings High", raw_or_null(earnings.get("earningsHigh"))),
        ("Earnings Low", raw_or_null(earnings.get("earningsLow"))),
        ("Earnings Average", raw_or_null(earnings.get("earningsAverage"))),
        ("Revenue High", raw_or_null(earnings.get("revenueHigh"))),
        ("Revenue Low", raw_or_null(earnings.get("revenueLow"))),
        ("Revenue Average", raw_or_null(earnings.get("revenueAverage"))),
    ];
    if fields.iter().all(|(_, v)| v.is_null()) {
        return record;
    }

    record.insert(REPORT_DATE_COLUMN, today);
    for (name, value) in fields {
        record.insert(name, value);
    }
    record
}

fn raw_or_null(value: Option<&Value>) -> Scalar {
    value.and_then(unwrap_raw).unwrap_or(Scalar::Null)
}

/// Analyst rating counts per month. `period` is a month offset such as `0m` or
/// `-2m`; the row is dated on the first day of that month.
pub fn recommendation_rows(modules: &Modules, today: NaiveDate) -> Result<RowTable, ProviderError> {
    let mut table = RowTable::new(
        ["period", "strongBuy", "buy", "hold", "sell", "strongSell"]
            .map(String::from)
            .to_vec(),
    );
    let Some(trend) = module::<RecommendationTrend>(modules, RECOMMENDATION_MODULES)? else {
        return Ok(table);
    };

    for entry in trend.trend {
        let Some(date) = month_for_period(&entry.period, today) else {
            return Err(ProviderError::ResponseFormatChanged(format!(
                "unrecognised recommendation period '{}'",
                entry.period
            )));
        };
        table.push_row(
            date,
            vec![
                Scalar::Text(entry.period),
                entry.strong_buy.into(),
                entry.buy.into(),
                entry.hold.into(),
                entry.sell.into(),
                entry.strong_sell.into(),
            ],
        );
    }
    Ok(table)
}

fn month_for_period(period: &str, today: NaiveDate) -> Option<NaiveDate> {
    let offset: i64 = period.strip_suffix('m')?.parse().ok()?;
    let first = today.with_day(1)?;
    let months = Months::new(u32::try_from(offset.unsigned_abs()).ok()?);
    if offset < 0 {
        first.checked_sub_months(months)
    } else {
        first.checked_add_months(months)
    }
}

/// Broker rating changes, one row per grade date.
pub fn upgrade_rows(modules: &Modules) -> Result<RowTable, ProviderError> {
    let mut table = RowTable::new(
        ["Firm", "ToGrade", "FromGrade", "Action"]
            .map(String::from)
            .to_vec(),
    );
    let Some(history) = module::<UpgradeDowngradeHistory>(modules, UPGRADE_MODULES)? else {
        return Ok(table);
    };

    for change in history.history {
        table.push_row(
            change.epoch_grade_date,
            vec![
                change.firm.into(),
                change.to_grade.into(),
                change.from_grade.into(),
                change.action.into(),
            ],
        );
    }
    Ok(table)
}

/// Union of the info modules. When two modules carry the same field, the one
/// listed first in [`INFO_MODULES`] wins.
pub fn info_bundle(modules: &Modules) -> InfoBundle {
    let mut bundle = InfoBundle::default();
    for name in INFO_MODULES {
        let Some(Value::Object(fields)) = modules.get(*name) else {
            continue;
        };
        for (key, value) in fields {
            let Some(scalar) = unwrap_raw(value) else {
                continue;
            };
            if scalar.is_null() {
                continue;
            }
            bundle.fields.entry(key.clone()).or_insert(scalar);
        }
    }
    bundle
}
