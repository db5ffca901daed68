use crate::error::Result;
use crate::models::RawTransactionRecord;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Supplier of raw done-trade records, one tape per stock per date.
///
/// The engine treats this as a pure data provider: no data for a
/// stock/date is an empty list, not an error (the stock may simply not
/// have traded). Injected as a trait object so tests can instrument call
/// counts.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// All records for one stock on one trading date, in tape order
    async fn fetch(&self, stock_code: &str, date: NaiveDate) -> Result<Vec<RawTransactionRecord>>;

    /// Trading dates with tape data available, ascending
    async fn list_dates(&self) -> Result<Vec<NaiveDate>>;

    /// Stock codes with tape data on the given date, ascending
    async fn list_stocks(&self, date: NaiveDate) -> Result<Vec<String>>;
}
