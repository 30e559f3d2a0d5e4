//! Pagination utilities for list queries
//!
//! `PageRequest` normalizes the raw `page`/`limit` query values; `Pagination`
//! is the summary returned next to a page of records.

use configs::QueryConfig;
use serde::Serialize;

/// Largest offset or limit a SQL backend accepts (`BIGINT`).
pub const MAX_BOUND: u64 = i64::MAX as u64;

/// Normalized paging input
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page index
    pub page: u64,
    /// items per page
    pub limit: u64,
}

impl PageRequest {
    /// Parse raw values, falling back to page 1 and `cfg.default_limit` when
    /// missing, non-numeric or zero. `limit` is capped at `cfg.max_limit`
    /// and never exceeds [`MAX_BOUND`].
    pub fn from_raw(page: Option<&str>, limit: Option<&str>, cfg: &QueryConfig) -> Self {
        let page = parse_positive(page).unwrap_or(1);
        let limit = parse_positive(limit).unwrap_or(cfg.default_limit);
        let limit = match cfg.max_limit {
            Some(max) => limit.min(max),
            None => limit,
        };
        Self { page, limit: limit.min(MAX_BOUND) }
    }

    /// Rows to skip: `(page - 1) * limit`
    pub fn start_index(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// `page * limit`
    pub fn end_index(&self) -> u64 {
        self.page.saturating_mul(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self { Self { page: 1, limit: 10 } }
}

fn parse_positive(raw: Option<&str>) -> Option<u64> {
    raw.and_then(|s| s.trim().parse::<u64>().ok()).filter(|n| *n > 0)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PageLink {
    pub page: u64,
    pub limit: u64,
}

/// Summary sent with every list response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<PageLink>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<PageLink>,
    pub total: u64,
    pub pages: u64,
    pub current_page: u64,
    pub limit: u64,
}

impl Pagination {
    pub fn build(req: PageRequest, total: u64) -> Self {
        let next = (req.end_index() < total).then_some(PageLink { page: req.page + 1, limit: req.limit });
        let prev = (req.start_index() > 0).then_some(PageLink { page: req.page - 1, limit: req.limit });
        Self {
            next,
            prev,
            total,
            pages: total.div_ceil(req.limit),
            current_page: req.page,
            limit: req.limit,
        }
    }
}
