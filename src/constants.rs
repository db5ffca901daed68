//! Done-trade tape CSV format and engine limits.
//!
//! Tape files live under `<DONE_TRADE_DIR>/<YYYY-MM-DD>/<STOCK>.csv`, one
//! file per stock per trading day, one row per executed trade print.

/// Number of columns in a done-trade tape row
pub const TAPE_COLUMNS: usize = 13;

/// Column indices for the done-trade tape (0-indexed)
pub mod tape_column {
    pub const STOCK_CODE: usize = 0;
    pub const TIME: usize = 1;
    pub const PRICE: usize = 2;
    pub const VOLUME: usize = 3;
    pub const BUYER_BROKER: usize = 4;
    pub const SELLER_BROKER: usize = 5;
    pub const BUYER_INV_TYPE: usize = 6;
    pub const SELLER_INV_TYPE: usize = 7;
    pub const TRX_TYPE: usize = 8;
    pub const SESSION: usize = 9;
    pub const AGGRESSOR: usize = 10;
    pub const BUYER_ORDER_REF: usize = 11;
    pub const SELLER_ORDER_REF: usize = 12;
}

/// Default time-to-live for cached pivot results, in seconds.
/// Override with the PIVOT_CACHE_TTL_SECS environment variable.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 600;

/// Maximum number of trading dates accepted in a single pivot request
pub const MAX_REQUEST_DATES: usize = 7;

/// Default number of pivot rows per page
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Hard cap on pageSize to keep responses bounded
pub const MAX_PAGE_SIZE: usize = 500;
