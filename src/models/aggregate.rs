use serde::Serialize;
use std::collections::BTreeMap;

/// Summary statistics for one pivot cell.
///
/// `avg_price` and the HAKA/HAKI averages are volume-weighted
/// (sum of price*volume over sum of volume), never simple means, to match
/// financial reporting conventions. Optional columns are present only when
/// the dimension declares them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateCell {
    pub volume: u64,
    pub count: u64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_price: Option<f64>,

    /// Aggressor-buy (hit-ask) volume
    #[serde(skip_serializing_if = "Option::is_none")]
    pub haka_volume: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub haka_avg_price: Option<f64>,

    /// Aggressor-sell (hit-bid) volume
    #[serde(skip_serializing_if = "Option::is_none")]
    pub haki_volume: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub haki_avg_price: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub distinct_order_count: Option<usize>,
}

/// Per-date cells for one pivot row, keyed by YYYY-MM-DD.
///
/// A requested date with no passing records simply has no entry; the
/// response echoes the full requested date list so callers can tell
/// "no trades" from "not requested".
pub type DateCells = BTreeMap<String, AggregateCell>;

/// Completed pivot aggregation, immutable once built.
///
/// BTreeMap keys make the serialized form byte-identical for a given record
/// set regardless of the order records were folded in. Pagination and
/// sorting operate on read-only views (`row_keys` + `subset`), never in
/// place.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PivotResult {
    /// rowKey -> date -> cell (single-field and composite dimensions)
    Standard(BTreeMap<String, DateCells>),
    /// buyer -> seller -> date -> cell (cross-tab dimensions, sparse)
    Cross(BTreeMap<String, BTreeMap<String, DateCells>>),
}

impl PivotResult {
    /// Top-level row keys (outer keys for the cross-tab variant)
    pub fn row_keys(&self) -> Vec<String> {
        match self {
            PivotResult::Standard(rows) => rows.keys().cloned().collect(),
            PivotResult::Cross(rows) => rows.keys().cloned().collect(),
        }
    }

    pub fn row_count(&self) -> usize {
        match self {
            PivotResult::Standard(rows) => rows.len(),
            PivotResult::Cross(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }

    /// Copy of this result restricted to the given row keys (one page)
    pub fn subset(&self, keys: &[String]) -> PivotResult {
        match self {
            PivotResult::Standard(rows) => PivotResult::Standard(
                keys.iter()
                    .filter_map(|k| rows.get(k).map(|v| (k.clone(), v.clone())))
                    .collect(),
            ),
            PivotResult::Cross(rows) => PivotResult::Cross(
                keys.iter()
                    .filter_map(|k| rows.get(k).map(|v| (k.clone(), v.clone())))
                    .collect(),
            ),
        }
    }
}
