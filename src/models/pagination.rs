//! Paging parameters and metadata

use crate::error::{AppError, AppResult};
use serde::Serialize;
use utoipa::ToSchema;

pub const DEFAULT_PAGE_SIZE: u64 = 10;
pub const MAX_PAGE_SIZE: u64 = 100;

/// Checked `page`/`limit` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationParams {
    pub page: u64,
    pub limit: u64,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PaginationParams {
    /// `page` starts at 1, `limit` is 1..=100 (default 10).
    pub fn new(page: Option<u64>, limit: Option<u64>) -> AppResult<Self> {
        let page = page.unwrap_or(1);
        let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE);
        if page < 1 {
            return Err(AppError::ValidationError(
                "page must be at least 1".to_string(),
            ));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&limit) {
            return Err(AppError::ValidationError(format!(
                "limit must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }
        // OFFSET is a signed bigint on the database side
        let offset = (page - 1)
            .checked_mul(limit)
            .filter(|o| i64::try_from(*o).is_ok());
        if offset.is_none() {
            return Err(AppError::ValidationError("page is out of range".to_string()));
        }
        Ok(Self { page, limit })
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    pub fn info(&self, total: u64) -> PaginationInfo {
        PaginationInfo {
            page: self.page,
            limit: self.limit,
            total,
            pages: total.div_ceil(self.limit),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct PaginationInfo {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub pages: u64,
}

/// One page of results.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: PaginationInfo,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            pagination: self.pagination,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_and_offset() {
        let p = PaginationParams::new(None, None).unwrap();
        assert_eq!(p, PaginationParams::default());
        assert_eq!(p.offset(), 0);

        let p = PaginationParams::new(Some(3), Some(20)).unwrap();
        assert_eq!(p.offset(), 40);
    }

    #[test]
    fn test_out_of_range_is_rejected() {
        assert!(PaginationParams::new(Some(0), None).is_err());
        assert!(PaginationParams::new(None, Some(0)).is_err());
        assert!(PaginationParams::new(None, Some(101)).is_err());
        assert!(PaginationParams::new(None, Some(100)).is_ok());
    }

    #[test]
    fn test_huge_page_is_rejected() {
        assert!(PaginationParams::new(Some(u64::MAX), Some(100)).is_err());
        assert!(PaginationParams::new(Some(u64::MAX / 2 + 3), Some(1)).is_err());

        let last = i64::MAX as u64 / 100;
        let p = PaginationParams::new(Some(last), Some(100)).unwrap();
        assert_eq!(p.offset(), (last - 1) * 100);
    }

    #[test]
    fn test_info_page_count() {
        let p = PaginationParams::new(Some(1), Some(10)).unwrap();
        assert_eq!(p.info(0).pages, 0);
        assert_eq!(p.info(10).pages, 1);
        assert_eq!(p.info(11).pages, 2);
        assert_eq!(p.info(11).total, 11);
    }
}
