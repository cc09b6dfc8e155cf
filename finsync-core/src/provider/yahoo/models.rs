//! Response shapes of the Yahoo Finance endpoints.
//!
//! Only the fields the provider reads are modelled. Payloads whose keys are
//! data-dependent (series names, quoteSummary modules) stay as `serde_json::Value`.

use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub description: String,
}

// Fundamentals time series

#[derive(Debug, Deserialize)]
pub struct TimeseriesResponse {
    pub timeseries: TimeseriesBody,
}

#[derive(Debug, Deserialize)]
pub struct TimeseriesBody {
    pub result: Option<Vec<TimeseriesSeries>>,
    pub error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
pub struct TimeseriesSeries {
    pub meta: SeriesMeta,
    /// The data points live under a key equal to the series type.
    #[serde(flatten)]
    pub rest: HashMap<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct SeriesMeta {
    #[serde(rename = "type", default)]
    pub kind: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataPoint {
    pub as_of_date: String,
    pub reported_value: Option<RawValue>,
}

#[derive(Debug, Deserialize)]
pub struct RawValue {
    pub raw: Option<f64>,
}

// Chart (corporate actions)

#[derive(Debug, Deserialize)]
pub struct ChartResponse {
    pub chart: ChartBody,
}

#[derive(Debug, Deserialize)]
pub struct ChartBody {
    pub result: Option<Vec<ChartData>>,
    pub error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
pub struct ChartData {
    pub events: Option<ChartEvents>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChartEvents {
    #[serde(default)]
    pub dividends: BTreeMap<String, DividendEvent>,
    #[serde(default)]
    pub splits: BTreeMap<String, SplitEvent>,
}

#[derive(Debug, Deserialize)]
pub struct DividendEvent {
    pub amount: f64,
    pub date: i64,
}

#[derive(Debug, Deserialize)]
pub struct SplitEvent {
    pub date: i64,
    pub numerator: f64,
    pub denominator: f64,
}

// quoteSummary

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSummaryResponse {
    pub quote_summary: QuoteSummaryBody,
}

#[derive(Debug, Deserialize)]
pub struct QuoteSummaryBody {
    pub result: Option<Vec<BTreeMap<String, Value>>>,
    pub error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationTrend {
    #[serde(default)]
    pub trend: Vec<TrendEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendEntry {
    pub period: String,
    pub strong_buy: Option<i64>,
    pub buy: Option<i64>,
    pub hold: Option<i64>,
    pub sell: Option<i64>,
    pub strong_sell: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct UpgradeDowngradeHistory {
    #[serde(default)]
    pub history: Vec<GradeChange>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeChange {
    pub epoch_grade_date: i64,
    pub firm: Option<String>,
    pub to_grade: Option<String>,
    pub from_grade: Option<String>,
    pub action: Option<String>,
}

// Search (news)

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub news: Vec<NewsItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    pub uuid: Option<String>,
    pub title: Option<String>,
    pub publisher: Option<String>,
    pub link: Option<String>,
    pub provider_publish_time: i64,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}
