//! Webservice response envelopes.

use serde::Deserialize;

use crate::model::values::null_as_default;

/// One page of a paginated collection.
///
/// `total` and `page_size` are reported even when `data` is empty.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct PaginatedResponse<T> {
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Vec<T>,
    #[serde(default)]
    pub page: usize,
    #[serde(rename = "pageSize", default)]
    pub page_size: usize,
    #[serde(default)]
    pub total: usize,
}

impl<T> PaginatedResponse<T> {
    /// Number of pages the collection spans. A zero page size counts as one page.
    #[must_use]
    pub fn max_pages(&self) -> usize {
        if self.page_size == 0 {
            return 1;
        }
        self.total.div_ceil(self.page_size)
    }
}

/// Identifiers of the currently active properties.
#[derive(Debug, Deserialize)]
pub struct ActiveIdsResponse {
    pub data: ActiveIds,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ActiveIds {
    pub total: usize,
    #[serde(deserialize_with = "null_as_default")]
    pub result: Vec<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(total: usize, page_size: usize) -> PaginatedResponse<i64> {
        PaginatedResponse {
            data: Vec::new(),
            page: 1,
            page_size,
            total,
        }
    }

    #[test]
    fn test_max_pages() {
        assert_eq!(page(0, 100).max_pages(), 0);
        assert_eq!(page(100, 100).max_pages(), 1);
        assert_eq!(page(101, 100).max_pages(), 2);
        assert_eq!(page(250, 100).max_pages(), 3);
        assert_eq!(page(250, 0).max_pages(), 1);
    }

    #[test]
    fn test_decode_envelope() {
        let resp: PaginatedResponse<i64> =
            serde_json::from_str(r#"{"data": null, "page": 1, "pageSize": 100, "total": 340}"#)
                .unwrap();
        assert!(resp.data.is_empty());
        assert_eq!(resp.max_pages(), 4);

        let active: ActiveIdsResponse =
            serde_json::from_str(r#"{"data": {"total": 2, "result": [5, 7]}}"#).unwrap();
        assert_eq!(active.data.result, [5, 7]);
    }
}
