//! CSV-backed done-trade tape store.
//!
//! Layout: `<DONE_TRADE_DIR>/<YYYY-MM-DD>/<STOCK>.csv`, one file per stock
//! per trading day with a header row. Malformed rows are skipped and
//! logged, never fatal; a missing file or date directory is an empty tape.

use crate::error::Result;
use crate::models::RawTransactionRecord;
use crate::services::RecordSource;
use crate::utils::{format_date, get_tape_data_dir};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub struct TapeStore {
    data_dir: PathBuf,
}

impl TapeStore {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    /// Construct from the DONE_TRADE_DIR environment variable
    pub fn from_env() -> Self {
        Self::new(get_tape_data_dir())
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn tape_path(&self, stock_code: &str, date: NaiveDate) -> PathBuf {
        self.data_dir
            .join(format_date(date))
            .join(format!("{}.csv", stock_code.to_uppercase()))
    }

    /// Read and parse one tape file. Rows failing validation are counted
    /// and skipped so one bad print never loses a whole day.
    fn read_tape(path: &Path) -> Result<Vec<RawTransactionRecord>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path)?;

        let mut records = Vec::new();
        let mut skipped = 0u64;

        for row in reader.records() {
            let row = row?;
            match RawTransactionRecord::from_csv_row(&row) {
                Ok(record) => records.push(record),
                Err(e) => {
                    skipped += 1;
                    warn!(path = %path.display(), error = %e, "Skipping malformed tape row");
                }
            }
        }

        if skipped > 0 {
            warn!(
                path = %path.display(),
                skipped,
                parsed = records.len(),
                "Tape file contained malformed rows"
            );
        }
        Ok(records)
    }
}

#[async_trait]
impl RecordSource for TapeStore {
    async fn fetch(&self, stock_code: &str, date: NaiveDate) -> Result<Vec<RawTransactionRecord>> {
        let path = self.tape_path(stock_code, date);
        if !path.exists() {
            debug!(stock = %stock_code, date = %format_date(date), "No tape file, empty record set");
            return Ok(Vec::new());
        }

        let records = Self::read_tape(&path)?;
        debug!(
            stock = %stock_code,
            date = %format_date(date),
            records = records.len(),
            "Tape loaded"
        );
        Ok(records)
    }

    async fn list_dates(&self) -> Result<Vec<NaiveDate>> {
        if !self.data_dir.exists() {
            return Ok(Vec::new());
        }

        let mut dates = Vec::new();
        for entry in std::fs::read_dir(&self.data_dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name();
            if let Ok(date) = NaiveDate::parse_from_str(&name.to_string_lossy(), "%Y-%m-%d") {
                dates.push(date);
            }
        }
        dates.sort();
        Ok(dates)
    }

    async fn list_stocks(&self, date: NaiveDate) -> Result<Vec<String>> {
        let date_dir = self.data_dir.join(format_date(date));
        if !date_dir.exists() {
            return Ok(Vec::new());
        }

        let mut stocks = Vec::new();
        for entry in std::fs::read_dir(&date_dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("csv") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    stocks.push(stem.to_uppercase());
                }
            }
        }
        stocks.sort();
        Ok(stocks)
    }
}
