//! Folds raw done-trade records into per-dimension, per-date cells.
//!
//! All sums are integer accumulations; volume-weighted averages are derived
//! only at finalization. Combined with BTreeMap-keyed output this makes the
//! serialized result independent of record iteration order.

use crate::engine::dimension::{DimensionSpec, Field, KeyShape, OrderSide};
use crate::engine::filter::Filters;
use crate::models::{AggregateCell, Aggressor, PivotResult, RawTransactionRecord};
use crate::utils::format_date;
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

/// Running sums for one cell. price*volume products are kept in u128 so the
/// average never sees intermediate rounding.
#[derive(Debug, Default)]
struct CellAccumulator {
    volume: u64,
    count: u64,
    price_volume: u128,
    haka_volume: u64,
    haka_price_volume: u128,
    haki_volume: u64,
    haki_price_volume: u128,
    order_refs: BTreeSet<String>,
}

impl CellAccumulator {
    fn add(&mut self, record: &RawTransactionRecord, spec: &DimensionSpec) {
        self.volume += record.volume;
        self.count += 1;

        let pv = record.price as u128 * record.volume as u128;
        if spec.avg_price {
            self.price_volume += pv;
        }

        // Ambiguous aggressor flags contribute to volume/count only
        if spec.order_flow {
            match record.aggressor {
                Aggressor::Buy => {
                    self.haka_volume += record.volume;
                    self.haka_price_volume += pv;
                }
                Aggressor::Sell => {
                    self.haki_volume += record.volume;
                    self.haki_price_volume += pv;
                }
                Aggressor::Unknown => {}
            }
        }

        match spec.order_count {
            Some(OrderSide::Buyer) => {
                self.order_refs.insert(record.buyer_order_ref.clone());
            }
            Some(OrderSide::Seller) => {
                self.order_refs.insert(record.seller_order_ref.clone());
            }
            Some(OrderSide::Both) => {
                self.order_refs.insert(record.buyer_order_ref.clone());
                self.order_refs.insert(record.seller_order_ref.clone());
            }
            None => {}
        }
    }

    fn finalize(self, spec: &DimensionSpec) -> AggregateCell {
        let weighted = |pv: u128, vol: u64| -> Option<f64> {
            if vol > 0 {
                Some(pv as f64 / vol as f64)
            } else {
                None
            }
        };

        AggregateCell {
            volume: self.volume,
            count: self.count,
            avg_price: if spec.avg_price {
                weighted(self.price_volume, self.volume)
            } else {
                None
            },
            haka_volume: spec.order_flow.then_some(self.haka_volume),
            haka_avg_price: if spec.order_flow {
                weighted(self.haka_price_volume, self.haka_volume)
            } else {
                None
            },
            haki_volume: spec.order_flow.then_some(self.haki_volume),
            haki_avg_price: if spec.order_flow {
                weighted(self.haki_price_volume, self.haki_volume)
            } else {
                None
            },
            distinct_order_count: spec.order_count.map(|_| self.order_refs.len()),
        }
    }
}

/// Aggregate per-date record lists into a pivot result.
///
/// Each date is folded independently. Records failing the filters are
/// discarded; zero-volume records are skipped with a warning (data
/// integrity guard, never fatal). An empty date contributes nothing and is
/// not an error.
pub fn aggregate(
    records_by_date: &BTreeMap<NaiveDate, Vec<RawTransactionRecord>>,
    spec: &DimensionSpec,
    filters: &Filters,
) -> PivotResult {
    match spec.shape {
        KeyShape::Single(_) | KeyShape::Composite { .. } => {
            aggregate_standard(records_by_date, spec, filters)
        }
        KeyShape::Cross { outer, inner } => {
            aggregate_cross(records_by_date, spec, filters, outer, inner)
        }
    }
}

fn aggregate_standard(
    records_by_date: &BTreeMap<NaiveDate, Vec<RawTransactionRecord>>,
    spec: &DimensionSpec,
    filters: &Filters,
) -> PivotResult {
    let mut accumulators: BTreeMap<String, BTreeMap<String, CellAccumulator>> = BTreeMap::new();

    for (&date, records) in records_by_date {
        let date_key = format_date(date);
        let mut skipped = 0u64;
        let mut folded = 0u64;

        for record in records {
            if record.volume == 0 {
                skipped += 1;
                continue;
            }
            if !filters.matches(record) {
                continue;
            }
            accumulators
                .entry(spec.row_key(record))
                .or_default()
                .entry(date_key.clone())
                .or_default()
                .add(record, spec);
            folded += 1;
        }

        if skipped > 0 {
            warn!(
                date = %date_key,
                skipped,
                "Skipped zero-volume records during aggregation"
            );
        }
        debug!(date = %date_key, folded, pivot_type = %spec.pivot_type, "Date folded");
    }

    PivotResult::Standard(
        accumulators
            .into_iter()
            .map(|(row_key, dates)| {
                let cells = dates
                    .into_iter()
                    .map(|(date_key, acc)| (date_key, acc.finalize(spec)))
                    .collect();
                (row_key, cells)
            })
            .collect(),
    )
}

/// Two-level buyer x seller cross tabulation, built in one pass.
///
/// Only cells that receive at least one record are materialized; the full
/// cross product is never allocated.
fn aggregate_cross(
    records_by_date: &BTreeMap<NaiveDate, Vec<RawTransactionRecord>>,
    spec: &DimensionSpec,
    filters: &Filters,
    outer: Field,
    inner: Field,
) -> PivotResult {
    let mut accumulators: BTreeMap<String, BTreeMap<String, BTreeMap<String, CellAccumulator>>> =
        BTreeMap::new();

    for (&date, records) in records_by_date {
        let date_key = format_date(date);
        let mut skipped = 0u64;

        for record in records {
            if record.volume == 0 {
                skipped += 1;
                continue;
            }
            if !filters.matches(record) {
                continue;
            }
            accumulators
                .entry(outer.key(record))
                .or_default()
                .entry(inner.key(record))
                .or_default()
                .entry(date_key.clone())
                .or_default()
                .add(record, spec);
        }

        if skipped > 0 {
            warn!(
                date = %date_key,
                skipped,
                "Skipped zero-volume records during cross-tab aggregation"
            );
        }
    }

    PivotResult::Cross(
        accumulators
            .into_iter()
            .map(|(outer_key, inners)| {
                let inner_map = inners
                    .into_iter()
                    .map(|(inner_key, dates)| {
                        let cells = dates
                            .into_iter()
                            .map(|(date_key, acc)| (date_key, acc.finalize(spec)))
                            .collect();
                        (inner_key, cells)
                    })
                    .collect();
                (outer_key, inner_map)
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::dimension::resolve;
    use crate::models::PivotType;

    fn record(
        buyer: &str,
        seller: &str,
        price: i64,
        volume: u64,
        aggressor: Aggressor,
    ) -> RawTransactionRecord {
        RawTransactionRecord {
            stock_code: "BBCA".to_string(),
            time: 93015,
            price,
            volume,
            buyer_broker: buyer.to_string(),
            seller_broker: seller.to_string(),
            buyer_inv_type: "I".to_string(),
            seller_inv_type: "F".to_string(),
            trx_type: "RG".to_string(),
            session: "1".to_string(),
            aggressor,
            buyer_order_ref: format!("B-{}-{}", buyer, price),
            seller_order_ref: format!("S-{}-{}", seller, price),
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn one_date(records: Vec<RawTransactionRecord>) -> BTreeMap<NaiveDate, Vec<RawTransactionRecord>> {
        let mut map = BTreeMap::new();
        map.insert(date("2024-03-15"), records);
        map
    }

    #[test]
    fn test_weighted_average_equal_weights() {
        let records = one_date(vec![
            record("YP", "PD", 100, 10, Aggressor::Unknown),
            record("YP", "PD", 200, 10, Aggressor::Unknown),
        ]);
        let spec = resolve(PivotType::BuyerBroker);
        let result = aggregate(&records, &spec, &Filters::default());

        match result {
            PivotResult::Standard(rows) => {
                let cell = &rows["YP"]["2024-03-15"];
                assert_eq!(cell.volume, 20);
                assert_eq!(cell.count, 2);
                assert_eq!(cell.avg_price, Some(150.0));
            }
            _ => panic!("expected standard result"),
        }
    }

    #[test]
    fn test_weighted_average_unequal_weights() {
        // (100 * 10 + 200 * 30) / 40 = 175, not the simple mean 150
        let records = one_date(vec![
            record("YP", "PD", 100, 10, Aggressor::Unknown),
            record("YP", "PD", 200, 30, Aggressor::Unknown),
        ]);
        let spec = resolve(PivotType::BuyerBroker);
        let result = aggregate(&records, &spec, &Filters::default());

        match result {
            PivotResult::Standard(rows) => {
                assert_eq!(rows["YP"]["2024-03-15"].avg_price, Some(175.0));
            }
            _ => panic!("expected standard result"),
        }
    }

    #[test]
    fn test_volume_conservation() {
        let records = vec![
            record("YP", "PD", 100, 10, Aggressor::Buy),
            record("PD", "CC", 110, 25, Aggressor::Sell),
            record("CC", "YP", 120, 7, Aggressor::Unknown),
            record("YP", "CC", 130, 18, Aggressor::Buy),
        ];
        let input_volume: u64 = records.iter().map(|r| r.volume).sum();
        let by_date = one_date(records);

        for &pivot_type in PivotType::all() {
            let spec = resolve(pivot_type);
            let result = aggregate(&by_date, &spec, &Filters::default());
            let total: u64 = match &result {
                PivotResult::Standard(rows) => rows
                    .values()
                    .flat_map(|dates| dates.values())
                    .map(|c| c.volume)
                    .sum(),
                PivotResult::Cross(rows) => rows
                    .values()
                    .flat_map(|inners| inners.values())
                    .flat_map(|dates| dates.values())
                    .map(|c| c.volume)
                    .sum(),
            };
            assert_eq!(total, input_volume, "volume not conserved for {}", pivot_type);
        }
    }

    #[test]
    fn test_cross_tab_sparse_and_complete() {
        let records = one_date(vec![
            record("YP", "PD", 100, 10, Aggressor::Unknown),
            record("YP", "CC", 100, 20, Aggressor::Unknown),
            record("PD", "CC", 100, 30, Aggressor::Unknown),
        ]);
        let spec = resolve(PivotType::BuyerSellerCross);
        let result = aggregate(&records, &spec, &Filters::default());

        match result {
            PivotResult::Cross(rows) => {
                // Every (buyer, seller) pair that traded is present
                assert!(rows["YP"]["PD"]["2024-03-15"].volume >= 10);
                assert!(rows["YP"]["CC"]["2024-03-15"].volume >= 20);
                assert!(rows["PD"]["CC"]["2024-03-15"].volume >= 30);
                // No dense materialization: PD never bought from PD or YP
                assert!(!rows["PD"].contains_key("PD"));
                assert!(!rows["PD"].contains_key("YP"));
                assert!(!rows.contains_key("CC"));
            }
            _ => panic!("expected cross result"),
        }
    }

    #[test]
    fn test_haka_haki_split_excludes_unknown() {
        let records = one_date(vec![
            record("YP", "PD", 100, 10, Aggressor::Buy),
            record("YP", "PD", 200, 30, Aggressor::Sell),
            record("YP", "PD", 300, 5, Aggressor::Unknown),
        ]);
        let spec = resolve(PivotType::BuyerBroker);
        let result = aggregate(&records, &spec, &Filters::default());

        match result {
            PivotResult::Standard(rows) => {
                let cell = &rows["YP"]["2024-03-15"];
                // Unknown still counts toward volume/count
                assert_eq!(cell.volume, 45);
                assert_eq!(cell.count, 3);
                assert_eq!(cell.haka_volume, Some(10));
                assert_eq!(cell.haka_avg_price, Some(100.0));
                assert_eq!(cell.haki_volume, Some(30));
                assert_eq!(cell.haki_avg_price, Some(200.0));
            }
            _ => panic!("expected standard result"),
        }
    }

    #[test]
    fn test_haka_avg_absent_without_aggressor_buys() {
        let records = one_date(vec![record("YP", "PD", 100, 10, Aggressor::Sell)]);
        let spec = resolve(PivotType::BuyerBroker);
        let result = aggregate(&records, &spec, &Filters::default());

        match result {
            PivotResult::Standard(rows) => {
                let cell = &rows["YP"]["2024-03-15"];
                assert_eq!(cell.haka_volume, Some(0));
                assert_eq!(cell.haka_avg_price, None);
            }
            _ => panic!("expected standard result"),
        }
    }

    #[test]
    fn test_distinct_order_count_dedupes_refs() {
        // Same buyer order filled in three prints
        let mut r1 = record("YP", "PD", 100, 10, Aggressor::Buy);
        let mut r2 = record("YP", "CC", 100, 10, Aggressor::Buy);
        let mut r3 = record("YP", "PD", 100, 10, Aggressor::Buy);
        r1.buyer_order_ref = "ORDER-1".to_string();
        r2.buyer_order_ref = "ORDER-1".to_string();
        r3.buyer_order_ref = "ORDER-2".to_string();

        let spec = resolve(PivotType::BuyerBroker);
        let result = aggregate(&one_date(vec![r1, r2, r3]), &spec, &Filters::default());

        match result {
            PivotResult::Standard(rows) => {
                assert_eq!(rows["YP"]["2024-03-15"].distinct_order_count, Some(2));
            }
            _ => panic!("expected standard result"),
        }
    }

    #[test]
    fn test_filter_conjunction_restricts_rows() {
        let records = one_date(vec![
            record("A", "B", 100, 10, Aggressor::Unknown),
            record("B", "C", 100, 10, Aggressor::Unknown),
            record("C", "A", 100, 10, Aggressor::Unknown),
        ]);
        let filters = Filters {
            buyer_brokers: Some(vec!["A".to_string()]),
            ..Default::default()
        };
        let spec = resolve(PivotType::BuyerBroker);
        let result = aggregate(&records, &spec, &filters);

        assert_eq!(result.row_keys(), vec!["A"]);
    }

    #[test]
    fn test_determinism_under_reordering() {
        let forward = vec![
            record("YP", "PD", 100, 10, Aggressor::Buy),
            record("PD", "CC", 110, 25, Aggressor::Sell),
            record("CC", "YP", 120, 7, Aggressor::Unknown),
            record("YP", "CC", 130, 18, Aggressor::Buy),
        ];
        let mut reversed = forward.clone();
        reversed.reverse();

        for &pivot_type in PivotType::all() {
            let spec = resolve(pivot_type);
            let a = aggregate(&one_date(forward.clone()), &spec, &Filters::default());
            let b = aggregate(&one_date(reversed.clone()), &spec, &Filters::default());
            assert_eq!(
                serde_json::to_string(&a).unwrap(),
                serde_json::to_string(&b).unwrap(),
                "non-deterministic output for {}",
                pivot_type
            );
        }
    }

    #[test]
    fn test_empty_date_contributes_nothing() {
        let mut by_date = one_date(vec![record("YP", "PD", 100, 10, Aggressor::Buy)]);
        by_date.insert(date("2024-03-16"), vec![]);

        let spec = resolve(PivotType::BuyerBroker);
        let result = aggregate(&by_date, &spec, &Filters::default());

        match result {
            PivotResult::Standard(rows) => {
                assert_eq!(rows.len(), 1);
                assert!(!rows["YP"].contains_key("2024-03-16"));
            }
            _ => panic!("expected standard result"),
        }
    }

    #[test]
    fn test_time_dimension_has_no_derived_columns() {
        let records = one_date(vec![record("YP", "PD", 100, 10, Aggressor::Buy)]);
        let spec = resolve(PivotType::Time);
        let result = aggregate(&records, &spec, &Filters::default());

        match result {
            PivotResult::Standard(rows) => {
                let cell = &rows["093015"]["2024-03-15"];
                assert_eq!(cell.avg_price, None);
                assert_eq!(cell.haka_volume, None);
                assert_eq!(cell.distinct_order_count, None);
            }
            _ => panic!("expected standard result"),
        }
    }

    #[test]
    fn test_dates_aggregate_independently() {
        let mut by_date = BTreeMap::new();
        by_date.insert(
            date("2024-03-15"),
            vec![record("YP", "PD", 100, 10, Aggressor::Unknown)],
        );
        by_date.insert(
            date("2024-03-16"),
            vec![record("YP", "PD", 200, 40, Aggressor::Unknown)],
        );

        let spec = resolve(PivotType::BuyerBroker);
        let result = aggregate(&by_date, &spec, &Filters::default());

        match result {
            PivotResult::Standard(rows) => {
                assert_eq!(rows["YP"]["2024-03-15"].avg_price, Some(100.0));
                assert_eq!(rows["YP"]["2024-03-16"].avg_price, Some(200.0));
            }
            _ => panic!("expected standard result"),
        }
    }
}
