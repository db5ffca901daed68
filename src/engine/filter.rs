use crate::models::RawTransactionRecord;

/// Pre-aggregation record filters. All supplied predicates must hold
/// (conjunctive) for a record to pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Filters {
    pub stock_codes: Option<Vec<String>>,
    pub buyer_brokers: Option<Vec<String>>,
    pub seller_brokers: Option<Vec<String>>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
}

impl Filters {
    /// Canonical form used for cache keys and matching: entries trimmed and
    /// uppercased (tape codes and brokers are uppercase), lists sorted and
    /// deduplicated, empty lists collapsed to None, price bounds ordered.
    /// Logically identical filter sets normalize to equal (and
    /// equal-hashing) values.
    pub fn normalized(mut self) -> Self {
        fn canon(list: Option<Vec<String>>) -> Option<Vec<String>> {
            let list = list?;
            if list.is_empty() {
                return None;
            }
            let mut list: Vec<String> = list.iter().map(|s| s.trim().to_uppercase()).collect();
            list.sort();
            list.dedup();
            Some(list)
        }

        self.stock_codes = canon(self.stock_codes);
        self.buyer_brokers = canon(self.buyer_brokers);
        self.seller_brokers = canon(self.seller_brokers);

        if let (Some(min), Some(max)) = (self.min_price, self.max_price) {
            if min > max {
                self.min_price = Some(max);
                self.max_price = Some(min);
            }
        }
        self
    }

    /// Conjunctive predicate over one record
    pub fn matches(&self, record: &RawTransactionRecord) -> bool {
        if let Some(codes) = &self.stock_codes {
            if !codes.iter().any(|c| c == &record.stock_code) {
                return false;
            }
        }
        if let Some(brokers) = &self.buyer_brokers {
            if !brokers.iter().any(|b| b == &record.buyer_broker) {
                return false;
            }
        }
        if let Some(brokers) = &self.seller_brokers {
            if !brokers.iter().any(|b| b == &record.seller_broker) {
                return false;
            }
        }
        if let Some(min) = self.min_price {
            if record.price < min {
                return false;
            }
        }
        if let Some(max) = self.max_price {
            if record.price > max {
                return false;
            }
        }
        true
    }

    pub fn is_empty(&self) -> bool {
        self.stock_codes.is_none()
            && self.buyer_brokers.is_none()
            && self.seller_brokers.is_none()
            && self.min_price.is_none()
            && self.max_price.is_none()
    }
}
