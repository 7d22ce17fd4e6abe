//! `page` / `limit` query parameters.

use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Page {
    /// `page` falls back to 1 when absent or unparseable and is clamped to at least 1.
    /// `limit` falls back to `default_limit` when absent, unparseable, or below 1.
    pub fn from_query(query: &HashMap<String, String>, default_limit: i64) -> Self {
        let page = query
            .get("page")
            .and_then(|v| v.trim().parse::<i64>().ok())
            .unwrap_or(1)
            .max(1);
        let limit = query
            .get("limit")
            .and_then(|v| v.trim().parse::<i64>().ok())
            .filter(|n| *n >= 1)
            .unwrap_or(default_limit);
        Page {
            limit,
            offset: (page - 1).saturating_mul(limit),
        }
    }
}
