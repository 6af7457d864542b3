pub mod bookmark;
pub mod comment;
pub mod dating;
pub mod edge;
pub mod interaction;
pub mod like;
pub mod message;
pub mod notification;
pub mod post;
pub mod user;

use serde::{Deserialize, Serialize};
use validator::Validate;

pub const DEFAULT_PAGE_SIZE: i64 = 50;
pub const MAX_PAGE_SIZE: i64 = 100;

fn default_limit() -> i64 {
    DEFAULT_PAGE_SIZE
}

/// Query parameters for paginated list endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Validate)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 100))]
    pub limit: i64,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub offset: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_SIZE,
            offset: 0,
        }
    }
}

impl Pagination {
    pub fn new(limit: i64, offset: i64) -> crate::error::Result<Self> {
        let page = Self { limit, offset };
        page.validate()?;
        Ok(page)
    }

    /// Slice an already ordered list
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.offset as usize)
            .take(self.limit as usize)
            .collect()
    }
}

/// `{success: true}` style acknowledgement used by mutating endpoints
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ack {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Ack {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_bounds() {
        assert!(Pagination::new(1, 0).is_ok());
        assert!(Pagination::new(100, 10).is_ok());
        assert!(Pagination::new(0, 0).is_err());
        assert!(Pagination::new(101, 0).is_err());
        assert!(Pagination::new(10, -1).is_err());
    }

    #[test]
    fn test_pagination_defaults_from_query() {
        let page: Pagination = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(page, Pagination::default());
    }

    #[test]
    fn test_apply_slices_window() {
        let page = Pagination::new(2, 1).unwrap();
        assert_eq!(page.apply(vec![1, 2, 3, 4]), vec![2, 3]);
        let past_end = Pagination::new(5, 10).unwrap();
        assert!(past_end.apply(vec![1, 2, 3]).is_empty());
    }
}
