//! Dimension resolver: maps a pivot type to its key extraction and the set
//! of derived metric columns that apply.
//!
//! This is a fixed strategy table keyed by the `PivotType` enum. The wire
//! string is parsed exactly once at the request boundary; nothing in the
//! aggregation path branches on strings.

use crate::models::{PivotType, RawTransactionRecord};
use crate::utils::time_key;

/// A record field usable as (part of) an aggregation key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Time,
    BuyerBroker,
    SellerBroker,
    Price,
    StockCode,
    BuyerInvType,
    SellerInvType,
    TrxType,
    Session,
}

impl Field {
    /// Extract this field's row-key string from a record
    pub fn key(&self, record: &RawTransactionRecord) -> String {
        match self {
            Field::Time => time_key(record.time),
            Field::BuyerBroker => record.buyer_broker.clone(),
            Field::SellerBroker => record.seller_broker.clone(),
            Field::Price => record.price.to_string(),
            Field::StockCode => record.stock_code.clone(),
            Field::BuyerInvType => record.buyer_inv_type.clone(),
            Field::SellerInvType => record.seller_inv_type.clone(),
            Field::TrxType => record.trx_type.clone(),
            Field::Session => record.session.clone(),
        }
    }
}

/// Shape of the aggregation key space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyShape {
    /// One field, one-level row map
    Single(Field),
    /// Two fields folded into a compound row key, primary first
    Composite { primary: Field, breakdown: Field },
    /// Two-level outer -> inner map (buyer x seller cross-tabs)
    Cross { outer: Field, inner: Field },
}

/// Which order reference feeds the distinct-order count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderSide {
    Buyer,
    Seller,
    Both,
}

/// Resolved behavior for one pivot dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DimensionSpec {
    pub pivot_type: PivotType,
    pub shape: KeyShape,
    /// Report a volume-weighted average price column
    pub avg_price: bool,
    /// Report HAKA/HAKI order-flow columns
    pub order_flow: bool,
    /// Report a distinct-order-count column from this side's order refs
    pub order_count: Option<OrderSide>,
}

/// Separator used in compound row keys of composite dimensions
pub const COMPOSITE_KEY_SEPARATOR: char = '|';

/// Resolve a pivot type to its dimension spec.
///
/// Pure lookup with no side effects; safe to call concurrently. Average
/// price, order flow and order counts apply to broker-, session-, investor-
/// and stock-oriented dimensions. They are off for `price` and `time`,
/// where the metric would be degenerate or is already the key itself.
pub fn resolve(pivot_type: PivotType) -> DimensionSpec {
    use Field::*;
    use KeyShape::*;

    let (shape, derived, order_count) = match pivot_type {
        PivotType::Time => (Single(Time), false, None),
        PivotType::Price => (Single(Price), false, None),
        PivotType::BuyerBroker => (Single(BuyerBroker), true, Some(OrderSide::Buyer)),
        PivotType::SellerBroker => (Single(SellerBroker), true, Some(OrderSide::Seller)),
        PivotType::StockCode => (Single(StockCode), true, Some(OrderSide::Both)),
        PivotType::InvTyp1 => (Single(BuyerInvType), true, Some(OrderSide::Buyer)),
        PivotType::InvTyp2 => (Single(SellerInvType), true, Some(OrderSide::Seller)),
        PivotType::TrxType => (Single(TrxType), true, Some(OrderSide::Both)),
        PivotType::TrxSess => (Single(Session), true, Some(OrderSide::Both)),

        PivotType::BuyerSellerCross => (
            Cross { outer: BuyerBroker, inner: SellerBroker },
            true,
            Some(OrderSide::Both),
        ),
        PivotType::SellerBuyerBreakdown => (
            Cross { outer: SellerBroker, inner: BuyerBroker },
            true,
            Some(OrderSide::Both),
        ),
        PivotType::BuyerSellerDetail => (
            Composite { primary: BuyerBroker, breakdown: SellerBroker },
            true,
            Some(OrderSide::Both),
        ),

        PivotType::SessionBuyerBroker => (
            Composite { primary: Session, breakdown: BuyerBroker },
            true,
            Some(OrderSide::Buyer),
        ),
        PivotType::SessionSellerBroker => (
            Composite { primary: Session, breakdown: SellerBroker },
            true,
            Some(OrderSide::Seller),
        ),
        PivotType::SessionStockCode => (
            Composite { primary: Session, breakdown: StockCode },
            true,
            Some(OrderSide::Both),
        ),
        PivotType::BuyerBrokerSession => (
            Composite { primary: BuyerBroker, breakdown: Session },
            true,
            Some(OrderSide::Buyer),
        ),
        PivotType::SellerBrokerSession => (
            Composite { primary: SellerBroker, breakdown: Session },
            true,
            Some(OrderSide::Seller),
        ),
        PivotType::StockCodeSession => (
            Composite { primary: StockCode, breakdown: Session },
            true,
            Some(OrderSide::Both),
        ),
        PivotType::BuyerInvTypeBroker => (
            Composite { primary: BuyerInvType, breakdown: BuyerBroker },
            true,
            Some(OrderSide::Buyer),
        ),
        PivotType::SellerInvTypeBroker => (
            Composite { primary: SellerInvType, breakdown: SellerBroker },
            true,
            Some(OrderSide::Seller),
        ),
        PivotType::TrxTypeBuyerBroker => (
            Composite { primary: TrxType, breakdown: BuyerBroker },
            true,
            Some(OrderSide::Buyer),
        ),
        PivotType::TrxTypeSellerBroker => (
            Composite { primary: TrxType, breakdown: SellerBroker },
            true,
            Some(OrderSide::Seller),
        ),
    };

    DimensionSpec {
        pivot_type,
        shape,
        avg_price: derived,
        order_flow: derived,
        order_count: if derived { order_count } else { None },
    }
}

impl DimensionSpec {
    /// Row key for single and composite shapes. Cross shapes are keyed by
    /// the aggregator directly from `outer`/`inner`.
    pub fn row_key(&self, record: &RawTransactionRecord) -> String {
        match self.shape {
            KeyShape::Single(field) => field.key(record),
            KeyShape::Composite { primary, breakdown } => format!(
                "{}{}{}",
                primary.key(record),
                COMPOSITE_KEY_SEPARATOR,
                breakdown.key(record)
            ),
            KeyShape::Cross { outer, .. } => outer.key(record),
        }
    }
}
