use crate::error::{AppError, Result};
use serde::Serialize;
use std::fmt;

/// Pivot dimension requested by the dashboard.
///
/// Wire strings are case-sensitive and must match exactly; anything else is
/// a client error carrying the full list of valid values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PivotType {
    Time,
    BuyerBroker,
    SellerBroker,
    Price,
    StockCode,
    InvTyp1,
    InvTyp2,
    TrxType,
    TrxSess,
    BuyerSellerCross,
    SellerBuyerBreakdown,
    BuyerSellerDetail,
    SessionBuyerBroker,
    SessionSellerBroker,
    SessionStockCode,
    BuyerBrokerSession,
    SellerBrokerSession,
    StockCodeSession,
    BuyerInvTypeBroker,
    SellerInvTypeBroker,
    TrxTypeBuyerBroker,
    TrxTypeSellerBroker,
}

impl PivotType {
    /// All recognized pivot types, in documentation order
    pub fn all() -> &'static [PivotType] {
        &[
            PivotType::Time,
            PivotType::BuyerBroker,
            PivotType::SellerBroker,
            PivotType::Price,
            PivotType::StockCode,
            PivotType::InvTyp1,
            PivotType::InvTyp2,
            PivotType::TrxType,
            PivotType::TrxSess,
            PivotType::BuyerSellerCross,
            PivotType::SellerBuyerBreakdown,
            PivotType::BuyerSellerDetail,
            PivotType::SessionBuyerBroker,
            PivotType::SessionSellerBroker,
            PivotType::SessionStockCode,
            PivotType::BuyerBrokerSession,
            PivotType::SellerBrokerSession,
            PivotType::StockCodeSession,
            PivotType::BuyerInvTypeBroker,
            PivotType::SellerInvTypeBroker,
            PivotType::TrxTypeBuyerBroker,
            PivotType::TrxTypeSellerBroker,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PivotType::Time => "time",
            PivotType::BuyerBroker => "buyer_broker",
            PivotType::SellerBroker => "seller_broker",
            PivotType::Price => "price",
            PivotType::StockCode => "stock_code",
            PivotType::InvTyp1 => "inv_typ1",
            PivotType::InvTyp2 => "inv_typ2",
            PivotType::TrxType => "trx_type",
            PivotType::TrxSess => "trx_sess",
            PivotType::BuyerSellerCross => "buyer_seller_cross",
            PivotType::SellerBuyerBreakdown => "seller_buyer_breakdown",
            PivotType::BuyerSellerDetail => "buyer_seller_detail",
            PivotType::SessionBuyerBroker => "session_buyer_broker",
            PivotType::SessionSellerBroker => "session_seller_broker",
            PivotType::SessionStockCode => "session_stock_code",
            PivotType::BuyerBrokerSession => "buyer_broker_session",
            PivotType::SellerBrokerSession => "seller_broker_session",
            PivotType::StockCodeSession => "stock_code_session",
            PivotType::BuyerInvTypeBroker => "buyer_inv_type_broker",
            PivotType::SellerInvTypeBroker => "seller_inv_type_broker",
            PivotType::TrxTypeBuyerBroker => "trx_type_buyer_broker",
            PivotType::TrxTypeSellerBroker => "trx_type_seller_broker",
        }
    }

    /// Parse a wire string, case-sensitive
    pub fn from_str(s: &str) -> Result<Self> {
        Self::all()
            .iter()
            .find(|t| t.as_str() == s)
            .copied()
            .ok_or_else(|| {
                let valid: Vec<&str> = Self::all().iter().map(|t| t.as_str()).collect();
                AppError::InvalidInput(format!(
                    "Invalid pivotType '{}'. Valid values: {}",
                    s,
                    valid.join(", ")
                ))
            })
    }
}

impl fmt::Display for PivotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_round_trip() {
        for &t in PivotType::all() {
            assert_eq!(PivotType::from_str(t.as_str()).unwrap(), t);
        }
    }

    #[test]
    fn test_count() {
        assert_eq!(PivotType::all().len(), 22);
    }

    #[test]
    fn test_unknown_rejected() {
        let err = PivotType::from_str("not_a_real_type").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Invalid pivotType"));
        assert!(msg.contains("buyer_seller_cross"));
    }

    #[test]
    fn test_case_sensitive() {
        assert!(PivotType::from_str("Time").is_err());
        assert!(PivotType::from_str("BUYER_BROKER").is_err());
    }
}
