//! Page result container for the dual-statement pagination protocol.

use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

/// One page of rows plus the numbers from the count statement.
///
/// `totals` holds the extra aggregate columns requested through
/// `page(..., totals)` (everything besides `Count` in the second result set).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination<T> {
    pub data: Vec<T>,
    pub page_index: i32,
    pub page_size: i32,
    pub page_count: i32,
    pub total_count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub totals: Option<Map<String, JsonValue>>,
}

impl<T> Pagination<T> {
    pub fn new(
        data: Vec<T>,
        page_index: i32,
        page_size: i32,
        total_count: i64,
        totals: Option<Map<String, JsonValue>>,
    ) -> Self {
        Self {
            data,
            page_index,
            page_size,
            page_count: page_count(total_count, page_size),
            total_count,
            totals,
        }
    }

    /// A page with no rows.
    pub fn empty(page_index: i32, page_size: i32) -> Self {
        Self::new(Vec::new(), page_index, page_size, 0, None)
    }

    pub fn has_next(&self) -> bool {
        self.page_index < self.page_count
    }

    /// Transform the rows, keeping the counters.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Pagination<U> {
        Pagination {
            data: self.data.into_iter().map(f).collect(),
            page_index: self.page_index,
            page_size: self.page_size,
            page_count: self.page_count,
            total_count: self.total_count,
            totals: self.totals,
        }
    }
}

fn page_count(total_count: i64, page_size: i32) -> i32 {
    if page_size <= 0 || total_count <= 0 {
        return 0;
    }
    let pages = (total_count + i64::from(page_size) - 1) / i64::from(page_size);
    crate::convert::saturate_i32(pages)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_count_rounds_up() {
        assert_eq!(Pagination::new(vec![1], 1, 20, 41, None).page_count, 3);
        assert_eq!(Pagination::new(vec![1], 1, 20, 40, None).page_count, 2);
        assert_eq!(Pagination::<i32>::empty(1, 20).page_count, 0);
        assert_eq!(Pagination::<i32>::new(vec![], 1, 0, 10, None).page_count, 0);
    }

    #[test]
    fn serializes_camel_case() {
        let page = Pagination::new(vec!["a"], 2, 1, 3, None);
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["pageIndex"], 2);
        assert_eq!(json["pageCount"], 3);
        assert!(json.get("totals").is_none());
        assert!(page.has_next());
    }
}
