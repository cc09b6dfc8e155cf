//! Data type identifiers and their destination tables.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A category of financial data that can be requested for a ticker.
///
/// Every variant has exactly one destination table; the mapping is total, so
/// an identifier that parses is always processable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    AnnualIncome,
    QuarterlyIncome,
    AnnualBalance,
    QuarterlyBalance,
    AnnualCashflow,
    QuarterlyCashflow,
    Actions,
    Calendar,
    Recommendations,
    UpgradesDowngrades,
    News,
    StockMetrics,
}

impl DataType {
    /// All identifiers in canonical order.
    pub const ALL: [DataType; 12] = [
        DataType::AnnualIncome,
        DataType::QuarterlyIncome,
        DataType::AnnualBalance,
        DataType::QuarterlyBalance,
        DataType::AnnualCashflow,
        DataType::QuarterlyCashflow,
        DataType::Actions,
        DataType::Calendar,
        DataType::Recommendations,
        DataType::UpgradesDowngrades,
        DataType::News,
        DataType::StockMetrics,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DataType::AnnualIncome => "annual_income",
            DataType::QuarterlyIncome => "quarterly_income",
            DataType::AnnualBalance => "annual_balance",
            DataType::QuarterlyBalance => "quarterly_balance",
            DataType::AnnualCashflow => "annual_cashflow",
            DataType::QuarterlyCashflow => "quarterly_cashflow",
            DataType::Actions => "actions",
            DataType::Calendar => "calendar",
            DataType::Recommendations => "recommendations",
            DataType::UpgradesDowngrades => "upgrades_downgrades",
            DataType::News => "news",
            DataType::StockMetrics => "stock_metrics",
        }
    }

    /// Destination table for this data type.
    pub fn table_name(self) -> &'static str {
        match self {
            DataType::AnnualIncome => "annual_income_statements",
            DataType::QuarterlyIncome => "quarterly_income_statements",
            DataType::AnnualBalance => "annual_balance_sheet",
            DataType::QuarterlyBalance => "quarterly_balance_sheet",
            DataType::AnnualCashflow => "annual_cash_flow",
            DataType::QuarterlyCashflow => "quarterly_cash_flow",
            DataType::Actions => "stock_actions",
            DataType::Calendar => "earnings_calendar",
            DataType::Recommendations => "analyst_recommendations",
            DataType::UpgradesDowngrades => "upgrades_downgrades",
            DataType::News => "company_news",
            DataType::StockMetrics => "stock_metrics",
        }
    }

    /// The statement kind, for the six financial statement identifiers.
    pub fn statement(self) -> Option<Statement> {
        match self {
            DataType::AnnualIncome | DataType::QuarterlyIncome => Some(Statement::Income),
            DataType::AnnualBalance | DataType::QuarterlyBalance => Some(Statement::Balance),
            DataType::AnnualCashflow | DataType::QuarterlyCashflow => Some(Statement::CashFlow),
            _ => None,
        }
    }

    /// Reporting frequency, for the six financial statement identifiers.
    pub fn frequency(self) -> Option<Frequency> {
        match self {
            DataType::AnnualIncome | DataType::AnnualBalance | DataType::AnnualCashflow => {
                Some(Frequency::Annual)
            }
            DataType::QuarterlyIncome
            | DataType::QuarterlyBalance
            | DataType::QuarterlyCashflow => Some(Frequency::Quarterly),
            _ => None,
        }
    }
}

/// Table name for a raw identifier string; `None` when the identifier is unmapped.
pub fn table_name_for(identifier: &str) -> Option<&'static str> {
    identifier.parse::<DataType>().ok().map(DataType::table_name)
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown data type '{0}'. Valid: {valid}", valid = valid_identifiers())]
pub struct UnknownDataType(pub String);

fn valid_identifiers() -> String {
    DataType::ALL
        .iter()
        .map(|dt| dt.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

impl FromStr for DataType {
    type Err = UnknownDataType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DataType::ALL
            .into_iter()
            .find(|dt| dt.as_str() == s)
            .ok_or_else(|| UnknownDataType(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Statement {
    Income,
    Balance,
    CashFlow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frequency {
    Annual,
    Quarterly,
}

impl Frequency {
    /// Prefix the provider puts in front of series keys.
    pub fn series_prefix(self) -> &'static str {
        match self {
            Frequency::Annual => "annual",
            Frequency::Quarterly => "quarterly",
        }
    }
}
