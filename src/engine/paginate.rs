//! Deterministic row-key ordering and clamped pagination over pivot rows.

use crate::constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Caller-selected ordering for time-like row keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Numeric descending (most recent HHMMSS first)
    Latest,
    /// Numeric ascending
    Oldest,
}

/// Sort row keys for client consumption.
///
/// With an explicit order, keys sort numerically in that direction. Without
/// one, an all-numeric key set (price levels, times) sorts numerically
/// descending and anything else sorts lexically ascending. Ties break
/// stably on the key string so output never depends on input order.
pub fn sort_row_keys(mut keys: Vec<String>, order: Option<SortOrder>) -> Vec<String> {
    let all_numeric = !keys.is_empty() && keys.iter().all(|k| k.parse::<i64>().is_ok());

    match (order, all_numeric) {
        (Some(SortOrder::Oldest), true) => {
            keys.sort_by(|a, b| numeric_cmp(a, b).then_with(|| a.cmp(b)));
        }
        (Some(SortOrder::Latest), true) | (None, true) => {
            keys.sort_by(|a, b| numeric_cmp(b, a).then_with(|| a.cmp(b)));
        }
        // Non-numeric keys always sort lexically ascending
        (_, false) => keys.sort(),
    }
    keys
}

fn numeric_cmp(a: &str, b: &str) -> Ordering {
    match (a.parse::<i64>(), b.parse::<i64>()) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        _ => Ordering::Equal,
    }
}

/// Pagination metadata returned alongside each page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: usize,
    pub page_size: usize,
    pub total_rows: usize,
    pub total_pages: usize,
}

/// One page of sorted row keys plus its metadata
#[derive(Debug)]
pub struct PageSlice {
    pub keys: Vec<String>,
    pub pagination: Pagination,
}

/// Slice `keys` into one page. Out-of-range pages are clamped to the last
/// valid page, never an error; page numbering is 1-based.
pub fn paginate(keys: &[String], page: Option<usize>, page_size: Option<usize>) -> PageSlice {
    let page_size = page_size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    let total_rows = keys.len();
    let total_pages = total_rows.div_ceil(page_size).max(1);
    let page = page.unwrap_or(1).clamp(1, total_pages);

    let start = (page - 1) * page_size;
    let end = (start + page_size).min(total_rows);
    let slice = if start < total_rows {
        keys[start..end].to_vec()
    } else {
        Vec::new()
    };

    PageSlice {
        keys: slice,
        pagination: Pagination {
            page,
            page_size,
            total_rows,
            total_pages,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_numeric_keys_default_descending() {
        let sorted = sort_row_keys(keys(&["9500", "10200", "100"]), None);
        assert_eq!(sorted, keys(&["10200", "9500", "100"]));
    }

    #[test]
    fn test_non_numeric_keys_lexical_ascending() {
        let sorted = sort_row_keys(keys(&["YP", "CC", "PD"]), None);
        assert_eq!(sorted, keys(&["CC", "PD", "YP"]));
    }

    #[test]
    fn test_mixed_keys_fall_back_to_lexical() {
        let sorted = sort_row_keys(keys(&["100", "YP"]), None);
        assert_eq!(sorted, keys(&["100", "YP"]));
    }

    #[test]
    fn test_time_keys_latest_and_oldest() {
        let times = keys(&["093015", "140000", "091500"]);
        assert_eq!(
            sort_row_keys(times.clone(), Some(SortOrder::Latest)),
            keys(&["140000", "093015", "091500"])
        );
        assert_eq!(
            sort_row_keys(times, Some(SortOrder::Oldest)),
            keys(&["091500", "093015", "140000"])
        );
    }

    #[test]
    fn test_paginate_basic() {
        let rows = keys(&["A", "B", "C", "D", "E"]);
        let page = paginate(&rows, Some(2), Some(2));
        assert_eq!(page.keys, keys(&["C", "D"]));
        assert_eq!(page.pagination.total_rows, 5);
        assert_eq!(page.pagination.total_pages, 3);
        assert_eq!(page.pagination.page, 2);
    }

    #[test]
    fn test_paginate_clamps_out_of_range_page() {
        let rows = keys(&["A", "B", "C", "D", "E"]);
        let page = paginate(&rows, Some(100), Some(2));
        // Last valid page's content, not an empty response
        assert_eq!(page.pagination.page, 3);
        assert_eq!(page.keys, keys(&["E"]));
    }

    #[test]
    fn test_paginate_clamps_zero_page() {
        let rows = keys(&["A", "B", "C"]);
        let page = paginate(&rows, Some(0), Some(2));
        assert_eq!(page.pagination.page, 1);
        assert_eq!(page.keys, keys(&["A", "B"]));
    }

    #[test]
    fn test_paginate_empty_rows() {
        let page = paginate(&[], Some(1), Some(10));
        assert!(page.keys.is_empty());
        assert_eq!(page.pagination.total_pages, 1);
        assert_eq!(page.pagination.total_rows, 0);
    }

    #[test]
    fn test_page_size_clamped_to_limits() {
        let rows = keys(&["A", "B", "C"]);
        let page = paginate(&rows, Some(1), Some(0));
        assert_eq!(page.pagination.page_size, 1);
        let page = paginate(&rows, Some(1), Some(10_000));
        assert_eq!(page.pagination.page_size, MAX_PAGE_SIZE);
    }
}
