use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PER_PAGE: u32 = 12;
pub const MAX_PER_PAGE: u32 = 50;

/// 分页请求，构造时即完成取值范围约束
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageRequest {
    page: u32,
    per_page: u32,
}

impl PageRequest {
    /// `page` 至少为 1，`per_page` 限制在 `[1, MAX_PER_PAGE]`
    pub fn new(page: i64, per_page: i64) -> Self {
        Self {
            page: page.clamp(1, u32::MAX as i64) as u32,
            per_page: per_page.clamp(1, MAX_PER_PAGE as i64) as u32,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    pub fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.per_page as u64
    }

    pub fn total_pages(&self, total: u64) -> u64 {
        total_pages(total, self.per_page)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE as i64, DEFAULT_PER_PAGE as i64)
    }
}

/// ceil(total / per_page)
pub fn total_pages(total: u64, per_page: u32) -> u64 {
    if per_page == 0 {
        return 0;
    }
    total.div_ceil(per_page as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset() {
        for page in 1..=20i64 {
            for per_page in 1..=50i64 {
                let req = PageRequest::new(page, per_page);
                assert_eq!(req.offset(), ((page - 1) * per_page) as u64);
            }
        }
    }

    #[test]
    fn test_per_page_clamped() {
        assert_eq!(PageRequest::new(1, 0).per_page(), 1);
        assert_eq!(PageRequest::new(1, -7).per_page(), 1);
        assert_eq!(PageRequest::new(1, 1000).per_page(), 50);
        assert_eq!(PageRequest::new(1, 50).per_page(), 50);
        assert_eq!(PageRequest::new(1, 12).per_page(), 12);
    }

    #[test]
    fn test_page_minimum() {
        assert_eq!(PageRequest::new(0, 12).page(), 1);
        assert_eq!(PageRequest::new(-3, 12).page(), 1);
        assert_eq!(PageRequest::new(0, 12).offset(), 0);
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(25, 12), 3);
        assert_eq!(total_pages(24, 12), 2);
        assert_eq!(total_pages(0, 12), 0);
        assert_eq!(total_pages(1, 50), 1);
        assert_eq!(total_pages(10, 0), 0);
    }
}
