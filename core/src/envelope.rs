use serde::{Deserialize, Serialize};

/// One page of a listing together with the parameters that produced it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Number of matches before pagination
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
}

/// Wrap a page of items; negative `limit` / `offset` are reported as 0
pub fn paginate<T>(items: Vec<T>, total: usize, limit: i64, offset: i64) -> Page<T> {
    Page {
        items,
        total: total as u64,
        limit: limit.max(0).unsigned_abs(),
        offset: offset.max(0).unsigned_abs(),
    }
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            limit: self.limit,
            offset: self.offset,
        }
    }
}
