use serde::{Deserialize, Serialize};

pub const DEFAULT_LIMIT: u32 = 5;
pub const MAX_LIMIT: u32 = 100;

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl PageParams {
    /// `(page, limit)` with page >= 1 and limit in 1..=MAX_LIMIT.
    pub fn resolve(&self) -> (u32, u32) {
        let page = self.page.unwrap_or(1).max(1);
        let limit = self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        (page, limit)
    }
}

/// Rows to skip for `page`; widened so a huge page cannot overflow.
pub fn offset(page: u32, limit: u32) -> u64 {
    u64::from(page.saturating_sub(1)) * u64::from(limit)
}

/// One page of results with the counts a client needs to render pagination.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub status: bool,
    pub result: Vec<T>,
    pub total: u64,
    pub current_page: u32,
    pub page_count: u32,
}

impl<T> Page<T> {
    pub fn new(result: Vec<T>, total: u64, page: u32, limit: u32) -> Self {
        Page {
            status: true,
            result,
            total,
            current_page: page,
            page_count: total.div_ceil(u64::from(limit)) as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_defaults_and_clamps() {
        assert_eq!(PageParams::default().resolve(), (1, DEFAULT_LIMIT));
        let params = PageParams {
            page: Some(0),
            limit: Some(10_000),
        };
        assert_eq!(params.resolve(), (1, MAX_LIMIT));
    }

    #[test]
    fn test_offset_of_last_page_does_not_wrap() {
        assert_eq!(offset(1, 5), 0);
        assert_eq!(offset(3, 5), 10);
        assert_eq!(offset(u32::MAX, MAX_LIMIT), u64::from(u32::MAX - 1) * 100);
    }

    #[test]
    fn test_page_count_rounds_up() {
        assert_eq!(Page::<u8>::new(vec![], 11, 1, 5).page_count, 3);
        assert_eq!(Page::<u8>::new(vec![], 0, 1, 5).page_count, 0);
        assert_eq!(Page::<u8>::new(vec![], 10, 2, 5).page_count, 2);
    }
}
