//! Yahoo Finance data provider.
//!
//! Statements come from the fundamentals time-series API, corporate actions
//! from the v8 chart API, news from search, and everything else from
//! quoteSummary. quoteSummary needs a cookie and crumb pair, fetched lazily and
//! cached for the life of the provider.
//!
//! Every call is a single blocking attempt. Yahoo Finance has no official API
//! and is subject to unannounced format changes; those surface as
//! `ResponseFormatChanged`.

mod events;
mod fundamentals;
mod models;
mod summary;

use super::{InfoBundle, MarketDataProvider, ProviderError};
use crate::config::ProviderConfig;
use crate::domain::{DataType, Frequency, RawPayload, Statement};
use chrono::{Local, NaiveDate, Utc};
use models::{ChartResponse, QuoteSummaryResponse, SearchResponse, TimeseriesResponse};
use reqwest::blocking::{Client, Response};
use reqwest::{header, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use summary::Modules;
use tracing::debug;
use urlencoding::encode;

const SECONDS_PER_YEAR: i64 = 365 * 24 * 60 * 60;

#[derive(Debug, Clone)]
struct Crumb {
    cookie: String,
    crumb: String,
}

/// Yahoo Finance data provider.
pub struct YahooProvider {
    client: Client,
    crumb: Mutex<Option<Crumb>>,
    news_count: u32,
    history_years: u32,
}

impl YahooProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| ProviderError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            crumb: Mutex::new(None),
            news_count: config.news_count,
            history_years: config.history_years,
        })
    }

    fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    /// Build the fundamentals time-series URL for one statement.
    fn timeseries_url(&self, symbol: &str, statement: Statement, frequency: Frequency) -> String {
        let period2 = Utc::now().timestamp();
        let period1 = period2 - i64::from(self.history_years) * SECONDS_PER_YEAR;
        format!(
            "https://query2.finance.yahoo.com/ws/fundamentals-timeseries/v1/finance/timeseries/{sym}\
             ?symbol={sym}&type={types}&period1={period1}&period2={period2}",
            sym = encode(symbol),
            types = fundamentals::series_types(statement, frequency),
        )
    }

    fn chart_url(symbol: &str) -> String {
        format!(
            "https://query2.finance.yahoo.com/v8/finance/chart/{}\
             ?range=max&interval=1d&events=div%2Csplits",
            encode(symbol)
        )
    }

    fn search_url(&self, symbol: &str) -> String {
        format!(
            "https://query2.finance.yahoo.com/v1/finance/search?q={}&quotesCount=0&newsCount={}",
            encode(symbol),
            self.news_count
        )
    }

    /// Send a GET and map the status onto the provider error taxonomy.
    fn get(&self, symbol: &str, url: &str, cookie: Option<&str>) -> Result<Response, ProviderError> {
        debug!(symbol, url, "GET");
        let mut request = self.client.get(url);
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        let resp = request
            .send()
            .map_err(|e| ProviderError::NetworkUnreachable(e.to_string()))?;

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(ProviderError::AuthenticationRequired(
                "Yahoo Finance requires authentication".into(),
            ));
        }
        if status == StatusCode::NOT_FOUND {
            return Err(ProviderError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = resp
                .headers()
                .get(header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(60);
            return Err(ProviderError::RateLimited {
                retry_after_secs: retry_after,
            });
        }
        if !status.is_success() {
            return Err(ProviderError::Http {
                status: status.as_u16(),
                symbol: symbol.to_string(),
            });
        }
        Ok(resp)
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        symbol: &str,
        url: &str,
        cookie: Option<&str>,
    ) -> Result<T, ProviderError> {
        self.get(symbol, url, cookie)?.json().map_err(|e| {
            ProviderError::ResponseFormatChanged(format!("failed to parse response for {symbol}: {e}"))
        })
    }

    fn ensure_crumb(&self) -> Result<Crumb, ProviderError> {
        let mut guard = self.crumb.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(crumb) = guard.as_ref() {
            return Ok(crumb.clone());
        }
        let crumb = self.fetch_crumb()?;
        *guard = Some(crumb.clone());
        Ok(crumb)
    }

    fn clear_crumb(&self) {
        *self.crumb.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }

    fn fetch_crumb(&self) -> Result<Crumb, ProviderError> {
        // fc.yahoo.com answers 404 but still sets the session cookie.
        let resp = self
            .client
            .get("https://fc.yahoo.com")
            .send()
            .map_err(|e| ProviderError::NetworkUnreachable(e.to_string()))?;

        let cookie = resp
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.split_once(';').map(|(v, _)| v.to_string()))
            .ok_or_else(|| ProviderError::AuthenticationRequired("no Yahoo session cookie".into()))?;

        let crumb = self
            .get("crumb", "https://query1.finance.yahoo.com/v1/test/getcrumb", Some(&cookie))?
            .text()
            .map_err(|e| ProviderError::AuthenticationRequired(format!("failed to read crumb: {e}")))?;
        if crumb.trim().is_empty() {
            return Err(ProviderError::AuthenticationRequired("empty crumb".into()));
        }

        debug!("obtained Yahoo crumb");
        Ok(Crumb { cookie, crumb })
    }

    fn quote_summary(&self, symbol: &str, modules: &str) -> Result<Modules, ProviderError> {
        let crumb = self.ensure_crumb()?;
        let url = format!(
            "https://query1.finance.yahoo.com/v10/finance/quoteSummary/{}?modules={}&crumb={}",
            encode(symbol),
            encode(modules),
            encode(&crumb.crumb)
        );

        let resp: QuoteSummaryResponse = match self.get_json(symbol, &url, Some(&crumb.cookie)) {
            Err(err @ ProviderError::AuthenticationRequired(_)) => {
                self.clear_crumb();
                return Err(err);
            }
            other => other?,
        };
        summary::first_result(symbol, resp)
    }

    fn statement(
        &self,
        symbol: &str,
        statement: Statement,
        frequency: Frequency,
    ) -> Result<RawPayload, ProviderError> {
        let url = self.timeseries_url(symbol, statement, frequency);
        let resp: TimeseriesResponse = self.get_json(symbol, &url, None)?;
        let table = fundamentals::parse_timeseries(symbol, statement, frequency, resp)?;
        Ok(RawPayload::Wide(table))
    }
}

impl MarketDataProvider for YahooProvider {
    fn fetch_table(
        &self,
        ticker: &str,
        kind: DataType,
    ) -> Result<Option<RawPayload>, ProviderError> {
        if let (Some(statement), Some(frequency)) = (kind.statement(), kind.frequency()) {
            return self.statement(ticker, statement, frequency).map(Some);
        }

        let payload = match kind {
            DataType::Actions => {
                let resp: ChartResponse = self.get_json(ticker, &Self::chart_url(ticker), None)?;
                RawPayload::Rows(events::action_rows(ticker, resp)?)
            }
            DataType::News => {
                let resp: SearchResponse = self.get_json(ticker, &self.search_url(ticker), None)?;
                RawPayload::Rows(events::news_rows(resp))
            }
            DataType::Calendar => {
                let modules = self.quote_summary(ticker, summary::CALENDAR_MODULES)?;
                RawPayload::Flat(summary::calendar_record(&modules, Self::today()))
            }
            DataType::Recommendations => {
                let modules = self.quote_summary(ticker, summary::RECOMMENDATION_MODULES)?;
                RawPayload::Rows(summary::recommendation_rows(&modules, Self::today())?)
            }
            DataType::UpgradesDowngrades => {
                let modules = self.quote_summary(ticker, summary::UPGRADE_MODULES)?;
                RawPayload::Rows(summary::upgrade_rows(&modules)?)
            }
            // Statements returned above; stock metrics come from the info bundle.
            _ => return Ok(None),
        };
        Ok(Some(payload))
    }

    fn fetch_info_bundle(&self, ticker: &str) -> Result<InfoBundle, ProviderError> {
        let modules = self.quote_summary(ticker, &summary::INFO_MODULES.join(","))?;
        Ok(summary::info_bundle(&modules))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> YahooProvider {
        YahooProvider::new(&ProviderConfig::default()).unwrap()
    }

    #[test]
    fn timeseries_url_requests_statement_series() {
        let url = provider().timeseries_url("BRK-B", Statement::Income, Frequency::Annual);
        assert!(url.starts_with(
            "https://query2.finance.yahoo.com/ws/fundamentals-timeseries/v1/finance/timeseries/BRK-B?symbol=BRK-B&type=annualTotalRevenue,"
        ));
        assert!(url.contains("&period1="));
    }

    #[test]
    fn symbols_are_url_encoded() {
        assert_eq!(
            YahooProvider::chart_url("^GSPC"),
            "https://query2.finance.yahoo.com/v8/finance/chart/%5EGSPC?range=max&interval=1d&events=div%2Csplits"
        );
    }

    #[test]
    fn search_url_carries_news_count() {
        let url = provider().search_url("AAPL");
        assert!(url.ends_with("q=AAPL&quotesCount=0&newsCount=20"));
    }
}
