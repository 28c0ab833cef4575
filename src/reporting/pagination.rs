//! Lenient parsing of paging inputs.
//!
//! Query parameters arrive as raw strings. Nothing here ever rejects a request:
//! malformed or out-of-range values fall back to defaults or get clamped.

use crate::lesson_store::PageRequest;
use serde::Serialize;

/// Pagination block returned alongside every paged report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: u64,
    pub page: usize,
    pub limit: usize,
    pub total_pages: u64,
}

impl Pagination {
    pub fn new(total: u64, request: PageRequest) -> Self {
        Self {
            total,
            page: request.page,
            limit: request.limit,
            total_pages: total_pages(total, request.limit),
        }
    }
}

pub fn total_pages(total: u64, limit: usize) -> u64 {
    if limit == 0 {
        return 0;
    }
    total.div_ceil(limit as u64)
}

fn parse_int(raw: Option<&str>) -> Option<i64> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<i64>().ok())
}

/// Missing, non-numeric or < 1 → 1.
pub fn parse_page(raw: Option<&str>) -> usize {
    match parse_int(raw) {
        Some(page) if page >= 1 => usize::try_from(page).unwrap_or(usize::MAX),
        _ => 1,
    }
}

/// Missing, non-numeric or < 1 → `default_limit`, above `max_limit` → `max_limit`.
pub fn parse_limit(raw: Option<&str>, default_limit: usize, max_limit: usize) -> usize {
    match parse_int(raw) {
        Some(limit) if limit >= 1 => usize::try_from(limit)
            .unwrap_or(usize::MAX)
            .min(max_limit),
        _ => default_limit,
    }
}

/// Missing or non-numeric → `default_days`, ≤ 0 → 0 (today only),
/// above `max_days` → `max_days`.
pub fn parse_days(raw: Option<&str>, default_days: u32, max_days: u32) -> u32 {
    match parse_int(raw) {
        Some(days) if days <= 0 => 0,
        Some(days) => u32::try_from(days).unwrap_or(u32::MAX).min(max_days),
        None => default_days,
    }
}

/// `true|false|1|0`, case-insensitive. Anything else is treated as absent.
pub fn parse_flag(raw: Option<&str>) -> Option<bool> {
    let value = raw?.trim();
    if value.eq_ignore_ascii_case("true") || value == "1" {
        Some(true)
    } else if value.eq_ignore_ascii_case("false") || value == "0" {
        Some(false)
    } else {
        None
    }
}

/// Empty strings count as absent.
pub fn non_empty(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
