//! Financial statements from the fundamentals time-series endpoint.
//!
//! One request per statement and frequency. The response holds one series per
//! requested key; the series are pivoted into a wide table with display names
//! as rows and `asOfDate`s as columns, newest first.

use super::models::{DataPoint, TimeseriesResponse};
use crate::domain::{Frequency, Scalar, Statement, WideTable};
use crate::provider::ProviderError;

const INCOME_KEYS: &[&str] = &[
    "TotalRevenue",
    "OperatingRevenue",
    "CostOfRevenue",
    "GrossProfit",
    "OperatingExpense",
    "SellingGeneralAndAdministration",
    "ResearchAndDevelopment",
    "OperatingIncome",
    "NetNonOperatingInterestIncomeExpense",
    "InterestIncomeNonOperating",
    "InterestExpenseNonOperating",
    "OtherIncomeExpense",
    "PretaxIncome",
    "TaxProvision",
    "NetIncomeCommonStockholders",
    "NetIncome",
    "NetIncomeContinuousOperations",
    "DilutedNIAvailtoComStockholders",
    "BasicEPS",
    "DilutedEPS",
    "BasicAverageShares",
    "DilutedAverageShares",
    "TotalOperatingIncomeAsReported",
    "TotalExpenses",
    "NormalizedIncome",
    "InterestIncome",
    "InterestExpense",
    "NetInterestIncome",
    "EBIT",
    "EBITDA",
    "NormalizedEBITDA",
    "ReconciledCostOfRevenue",
    "ReconciledDepreciation",
    "TaxRateForCalcs",
    "TaxEffectOfUnusualItems",
];

const BALANCE_KEYS: &[&str] = &[
    "TotalAssets",
    "CurrentAssets",
    "CashCashEquivalentsAndShortTermInvestments",
    "CashAndCashEquivalents",
    "OtherShortTermInvestments",
    "Receivables",
    "AccountsReceivable",
    "Inventory",
    "OtherCurrentAssets",
    "TotalNonCurrentAssets",
    "NetPPE",
    "GrossPPE",
    "AccumulatedDepreciation",
    "InvestmentsAndAdvances",
    "OtherNonCurrentAssets",
    "TotalLiabilitiesNetMinorityInterest",
    "CurrentLiabilities",
    "AccountsPayable",
    "CurrentDebt",
    "CurrentDeferredRevenue",
    "OtherCurrentLiabilities",
    "TotalNonCurrentLiabilitiesNetMinorityInterest",
    "LongTermDebt",
    "OtherNonCurrentLiabilities",
    "TotalDebt",
    "NetDebt",
    "StockholdersEquity",
    "CommonStock",
    "RetainedEarnings",
    "GainsLossesNotAffectingRetainedEarnings",
    "TotalEquityGrossMinorityInterest",
    "TotalCapitalization",
    "CommonStockEquity",
    "WorkingCapital",
    "InvestedCapital",
    "TangibleBookValue",
    "ShareIssued",
    "OrdinarySharesNumber",
];

const CASH_FLOW_KEYS: &[&str] = &[
    "OperatingCashFlow",
    "NetIncomeFromContinuingOperations",
    "DepreciationAndAmortization",
    "DeferredIncomeTax",
    "StockBasedCompensation",
    "ChangeInWorkingCapital",
    "ChangeInReceivables",
    "ChangeInInventory",
    "ChangeInPayablesAndAccruedExpense",
    "OtherNonCashItems",
    "InvestingCashFlow",
    "CapitalExpenditure",
    "NetPPEPurchaseAndSale",
    "NetBusinessPurchaseAndSale",
    "NetInvestmentPurchaseAndSale",
    "NetOtherInvestingChanges",
    "FinancingCashFlow",
    "NetIssuancePaymentsOfDebt",
    "NetCommonStockIssuance",
    "RepurchaseOfCapitalStock",
    "CashDividendsPaid",
    "CommonStockDividendPaid",
    "NetOtherFinancingCharges",
    "EndCashPosition",
    "BeginningCashPosition",
    "ChangesInCash",
    "IncomeTaxPaidSupplementalData",
    "InterestPaidSupplementalData",
    "FreeCashFlow",
];

/// Series keys requested for a statement, without the frequency prefix.
pub fn statement_keys(statement: Statement) -> &'static [&'static str] {
    match statement {
        Statement::Income => INCOME_KEYS,
        Statement::Balance => BALANCE_KEYS,
        Statement::CashFlow => CASH_FLOW_KEYS,
    }
}

/// The comma-separated `type` query parameter, e.g. `annualTotalRevenue,annualCostOfRevenue`.
pub fn series_types(statement: Statement, frequency: Frequency) -> String {
    let prefix = frequency.series_prefix();
    statement_keys(statement)
        .iter()
        .map(|key| format!("{prefix}{key}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Splits a CamelCase series key into words: `TotalRevenue` becomes
/// `Total Revenue`, `BasicEPS` becomes `Basic EPS`, `NetPPE` stays an acronym.
pub fn humanize(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    let mut out = String::with_capacity(key.len() + 8);

    for (i, &c) in chars.iter().enumerate() {
        if i > 0 && c.is_uppercase() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || (prev.is_uppercase() && next_is_lower) {
                out.push(' ');
            }
        }
        out.push(c);
    }
    out
}

/// Pivots a time-series response into a wide table.
///
/// Metric rows follow the statement's key order; series the provider left
/// empty are omitted. A response without any data points yields an empty table.
pub fn parse_timeseries(
    symbol: &str,
    statement: Statement,
    frequency: Frequency,
    resp: TimeseriesResponse,
) -> Result<WideTable, ProviderError> {
    let series = match resp.timeseries.result {
        Some(series) => series,
        None => {
            return Err(match resp.timeseries.error {
                Some(err) if err.code == "Not Found" => ProviderError::SymbolNotFound {
                    symbol: symbol.to_string(),
                },
                Some(err) => {
                    ProviderError::ResponseFormatChanged(format!("{}: {}", err.code, err.description))
                }
                None => ProviderError::ResponseFormatChanged("empty result with no error".into()),
            });
        }
    };

    let prefix = frequency.series_prefix();
    let mut by_key: Vec<(String, Vec<DataPoint>)> = Vec::new();
    for s in series {
        let Some(kind) = s.meta.kind.first() else {
            continue;
        };
        let Some(values) = s.rest.get(kind) else {
            continue;
        };
        // Missing periods come back as JSON nulls.
        let points: Vec<Option<DataPoint>> = serde_json::from_value(values.clone())
            .map_err(|e| ProviderError::ResponseFormatChanged(format!("series {kind}: {e}")))?;
        let points: Vec<DataPoint> = points.into_iter().flatten().collect();
        if points.is_empty() {
            continue;
        }
        let key = kind.strip_prefix(prefix).unwrap_or(kind).to_string();
        by_key.push((key, points));
    }

    let mut periods: Vec<String> = by_key
        .iter()
        .flat_map(|(_, points)| points.iter().map(|p| p.as_of_date.clone()))
        .collect();
    periods.sort_unstable_by(|a, b| b.cmp(a));
    periods.dedup();

    let mut table = WideTable::new(periods.iter().cloned().map(Scalar::Text).collect());
    for key in statement_keys(statement) {
        let Some((_, points)) = by_key.iter().find(|(k, _)| k == key) else {
            continue;
        };
        let values = periods
            .iter()
            .map(|period| {
                points
                    .iter()
                    .find(|p| &p.as_of_date == period)
                    .and_then(|p| p.reported_value.as_ref())
                    .and_then(|v| v.raw)
                    .map_or(Scalar::Null, Scalar::Float)
            })
            .collect();
        table.push_metric(humanize(key), values);
    }

    Ok(table)
}
