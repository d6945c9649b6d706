//! Pagination request normalisation and result envelope.

use serde::Serialize;

/// One page of results plus the unpaged total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    /// 1-based page number actually served.
    pub page: u32,
    /// Page size actually applied after clamping.
    pub page_size: u32,
}

/// Normalized page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl PageRequest {
    /// Normalizes raw caller input.
    ///
    /// - `page` 0 or absent becomes 1.
    /// - `page_size` 0 or absent becomes `default_size`; anything above
    ///   `max_size` is clamped.
    pub fn normalize(
        page: Option<u32>,
        page_size: Option<u32>,
        default_size: u32,
        max_size: u32,
    ) -> Self {
        let page = match page {
            Some(0) | None => 1,
            Some(value) => value,
        };
        let page_size = match page_size {
            Some(0) | None => default_size,
            Some(value) => value,
        }
        .min(max_size)
        .max(1);
        Self { page, page_size }
    }

    pub fn limit(&self) -> u32 {
        self.page_size
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.page_size)
    }

    pub fn wrap<T>(&self, items: Vec<T>, total: u64) -> Page<T> {
        Page {
            items,
            total,
            page: self.page,
            page_size: self.page_size,
        }
    }
}
