use crate::constants::{tape_column, TAPE_COLUMNS};
use crate::error::{AppError, Result};
use serde::Serialize;

/// Which side of a trade crossed the spread.
///
/// The flag is precomputed by the upstream tape feed; the engine never
/// re-derives it from price context. Trades with an unrecognized flag are
/// excluded from order-flow totals but still count toward volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggressor {
    /// Buy side hit the ask (HAKA)
    Buy,
    /// Sell side hit the bid (HAKI)
    Sell,
    Unknown,
}

impl Aggressor {
    pub fn from_flag(flag: &str) -> Self {
        match flag {
            "B" => Aggressor::Buy,
            "S" => Aggressor::Sell,
            _ => Aggressor::Unknown,
        }
    }
}

/// One executed trade print from a trading day's done-trade tape.
///
/// Prices are integer tick prices (full IDR, e.g. 4520 not 4.52) and
/// volumes are share counts. Records are immutable once parsed; the tape
/// for a stock/date is append-only within the day and frozen after close.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTransactionRecord {
    /// 4-letter ticker (e.g. BBCA)
    pub stock_code: String,

    /// Intraday timestamp as HHMMSS integer (e.g. 93015 for 09:30:15)
    pub time: u32,

    /// Integer tick price, always > 0
    pub price: i64,

    /// Traded shares, always > 0 for an accepted record
    pub volume: u64,

    /// Buyer broker code (2-4 letters)
    pub buyer_broker: String,

    /// Seller broker code (2-4 letters)
    pub seller_broker: String,

    /// Buyer investor category (single letter, e.g. I/F/D)
    pub buyer_inv_type: String,

    /// Seller investor category
    pub seller_inv_type: String,

    /// Transaction type code (e.g. RG, TN, NG)
    pub trx_type: String,

    /// Trading session code (e.g. 1, 2, PRE, POST)
    pub session: String,

    /// Aggressor flag supplied by the feed
    pub aggressor: Aggressor,

    /// Buyer order identifier, used to count distinct orders
    pub buyer_order_ref: String,

    /// Seller order identifier
    pub seller_order_ref: String,
}

impl RawTransactionRecord {
    /// Parse a single tape CSV row.
    ///
    /// Returns an error for rows with the wrong column count, unparseable
    /// numeric fields, or prices/volumes violating the tape invariants
    /// (price > 0, volume > 0). Callers skip and log such rows rather than
    /// aborting the file.
    pub fn from_csv_row(row: &csv::StringRecord) -> Result<Self> {
        if row.len() != TAPE_COLUMNS {
            return Err(AppError::Parse(format!(
                "expected {} columns, got {}",
                TAPE_COLUMNS,
                row.len()
            )));
        }

        let field = |idx: usize| row.get(idx).unwrap_or("").trim().to_string();

        let time: u32 = field(tape_column::TIME)
            .parse()
            .map_err(|_| AppError::Parse(format!("invalid time '{}'", field(tape_column::TIME))))?;

        let price: i64 = field(tape_column::PRICE)
            .parse()
            .map_err(|_| AppError::Parse(format!("invalid price '{}'", field(tape_column::PRICE))))?;
        if price <= 0 {
            return Err(AppError::Parse(format!("non-positive price {}", price)));
        }

        let volume: u64 = field(tape_column::VOLUME).parse().map_err(|_| {
            AppError::Parse(format!("invalid volume '{}'", field(tape_column::VOLUME)))
        })?;
        if volume == 0 {
            return Err(AppError::Parse("zero volume".to_string()));
        }

        Ok(Self {
            stock_code: field(tape_column::STOCK_CODE),
            time,
            price,
            volume,
            buyer_broker: field(tape_column::BUYER_BROKER),
            seller_broker: field(tape_column::SELLER_BROKER),
            buyer_inv_type: field(tape_column::BUYER_INV_TYPE),
            seller_inv_type: field(tape_column::SELLER_INV_TYPE),
            trx_type: field(tape_column::TRX_TYPE),
            session: field(tape_column::SESSION),
            aggressor: Aggressor::from_flag(&field(tape_column::AGGRESSOR)),
            buyer_order_ref: field(tape_column::BUYER_ORDER_REF),
            seller_order_ref: field(tape_column::SELLER_ORDER_REF),
        })
    }
}
