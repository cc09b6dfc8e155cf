//! Stock metrics snapshot: the fixed vocabulary mapping provider info fields
//! onto `stock_metrics` columns.

use super::InfoBundle;
use crate::domain::{FlatRecord, Scalar};
use crate::normalize::{REPORT_DATE_COLUMN, TICKER_COLUMN};
use chrono::NaiveDate;

/// `(stock_metrics column, info bundle key)`, in column order.
pub const STOCK_METRIC_FIELDS: &[(&str, &str)] = &[
    ("company_name", "longName"),
    ("exchange", "exchange"),
    ("currency", "financialCurrency"),
    ("current_price", "currentPrice"),
    ("previous_close", "previousClose"),
    ("open_price", "open"),
    ("day_low", "dayLow"),
    ("day_high", "dayHigh"),
    ("regular_market_previous_close", "regularMarketPreviousClose"),
    ("regular_market_open", "regularMarketOpen"),
    ("regular_market_day_low", "regularMarketDayLow"),
    ("regular_market_day_high", "regularMarketDayHigh"),
    ("dividend_rate", "dividendRate"),
    ("dividend_yield", "dividendYield"),
    ("ex_dividend_date", "exDividendDate"),
    ("payout_ratio", "payoutRatio"),
    ("five_year_avg_dividend_yield", "fiveYearAvgDividendYield"),
    ("beta", "beta"),
    ("trailing_pe", "trailingPE"),
    ("forward_pe", "forwardPE"),
    ("volume", "volume"),
    ("regular_market_volume", "regularMarketVolume"),
    ("average_volume", "averageVolume"),
    ("average_volume_10days", "averageVolume10days"),
    ("average_daily_volume_10day", "averageDailyVolume10Day"),
    ("bid", "bid"),
    ("ask", "ask"),
    ("bid_size", "bidSize"),
    ("ask_size", "askSize"),
    ("market_cap", "marketCap"),
    ("fifty_two_week_low", "fiftyTwoWeekLow"),
    ("fifty_two_week_high", "fiftyTwoWeekHigh"),
    ("price_to_sales_trailing_12months", "priceToSalesTrailing12Months"),
    ("fifty_day_average", "fiftyDayAverage"),
    ("two_hundred_day_average", "twoHundredDayAverage"),
    ("trailing_annual_dividend_rate", "trailingAnnualDividendRate"),
    ("trailing_annual_dividend_yield", "trailingAnnualDividendYield"),
    ("enterprise_value", "enterpriseValue"),
    ("profit_margins", "profitMargins"),
    ("float_shares", "floatShares"),
    ("shares_outstanding", "sharesOutstanding"),
    ("shares_short", "sharesShort"),
    ("shares_short_prior_month", "sharesShortPriorMonth"),
    ("shares_short_previous_month_date", "sharesShortPreviousMonthDate"),
    ("date_short_interest", "dateShortInterest"),
    ("shares_percent_shares_out", "sharesPercentSharesOut"),
    ("held_percent_insiders", "heldPercentInsiders"),
    ("held_percent_institutions", "heldPercentInstitutions"),
    ("short_ratio", "shortRatio"),
    ("short_percent_of_float", "shortPercentOfFloat"),
    ("book_value", "bookValue"),
    ("price_to_book", "priceToBook"),
    ("earnings_quarterly_growth", "earningsQuarterlyGrowth"),
    ("net_income_to_common", "netIncomeToCommon"),
    ("trailing_eps", "trailingEps"),
    ("forward_eps", "forwardEps"),
    ("peg_ratio", "pegRatio"),
    ("last_split_factor", "lastSplitFactor"),
    ("last_split_date", "lastSplitDate"),
    ("enterprise_to_revenue", "enterpriseToRevenue"),
    ("enterprise_to_ebitda", "enterpriseToEbitda"),
    ("last_dividend_value", "lastDividendValue"),
    ("last_dividend_date", "lastDividendDate"),
    ("target_high_price", "targetHighPrice"),
    ("target_low_price", "targetLowPrice"),
    ("target_mean_price", "targetMeanPrice"),
    ("target_median_price", "targetMedianPrice"),
    ("recommendation_mean", "recommendationMean"),
    ("recommendation_key", "recommendationKey"),
    ("number_of_analyst_opinions", "numberOfAnalystOpinions"),
    ("total_cash", "totalCash"),
    ("total_cash_per_share", "totalCashPerShare"),
    ("ebitda", "ebitda"),
    ("total_debt", "totalDebt"),
    ("quick_ratio", "quickRatio"),
    ("current_ratio", "currentRatio"),
    ("debt_to_equity", "debtToEquity"),
    ("revenue_per_share", "revenuePerShare"),
    ("return_on_assets", "returnOnAssets"),
    ("return_on_equity", "returnOnEquity"),
    ("free_cashflow", "freeCashflow"),
    ("operating_cashflow", "operatingCashflow"),
    ("earnings_growth", "earningsGrowth"),
    ("revenue_growth", "revenueGrowth"),
    ("gross_margins", "grossMargins"),
    ("ebitda_margins", "ebitdaMargins"),
    ("operating_margins", "operatingMargins"),
    ("trailing_peg_ratio", "trailingPegRatio"),
];

/// Builds the single-row stock metrics record for `ticker` as of `as_of`.
///
/// Every vocabulary field is present; fields missing from the bundle are null.
/// Returns `None` for an empty bundle.
pub fn stock_metrics_record(ticker: &str, as_of: NaiveDate, info: &InfoBundle) -> Option<FlatRecord> {
    if info.is_empty() {
        return None;
    }

    let mut record = FlatRecord::new();
    record.insert(TICKER_COLUMN, ticker);
    record.insert(REPORT_DATE_COLUMN, as_of);
    for (column, key) in STOCK_METRIC_FIELDS {
        record.insert(*column, info.get(key).cloned().unwrap_or(Scalar::Null));
    }
    Some(record)
}
