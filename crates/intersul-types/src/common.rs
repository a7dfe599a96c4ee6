//! Types shared by every resource.

use serde::{Deserialize, Serialize};

/// Server-assigned record identifier.
pub type EntityId = i64;

/// Anything the API addresses by a numeric id.
pub trait Entity {
    /// The record's identifier.
    fn id(&self) -> EntityId;
}

/// Paginated list envelope returned by paged endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paginated<T> {
    /// Records on this page.
    pub data: Vec<T>,
    /// Total number of records across all pages.
    pub total: u64,
    /// 1-based page number.
    pub page: u32,
    /// Page size.
    pub limit: u32,
    /// Number of pages at this page size.
    pub total_pages: u32,
}

impl<T> Paginated<T> {
    /// An empty first page.
    pub fn empty(limit: u32) -> Self {
        Self {
            data: Vec::new(),
            total: 0,
            page: 1,
            limit,
            total_pages: 0,
        }
    }
}

/// Plain `{ "message": ... }` acknowledgement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Implements [`Entity`] for record types with an `id` field.
macro_rules! impl_entity {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::common::Entity for $ty {
                fn id(&self) -> $crate::common::EntityId {
                    self.id
                }
            }
        )+
    };
}

pub(crate) use impl_entity;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paginated_wire_shape() {
        let page: Paginated<u8> = serde_json::from_value(serde_json::json!({
            "data": [1, 2],
            "total": 2,
            "page": 1,
            "limit": 10,
            "total_pages": 1
        }))
        .unwrap();

        assert_eq!(page.data, vec![1, 2]);
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn test_empty_page() {
        let page: Paginated<u8> = Paginated::empty(25);
        assert!(page.data.is_empty());
        assert_eq!(page.limit, 25);
        assert_eq!(page.page, 1);
    }
}
