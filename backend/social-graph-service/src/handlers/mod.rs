//! HTTP handlers, one module per resource. Handlers unpack the request,
//! call a service and shape the response; rules live in the services.

pub mod blocks;
pub mod bookmarks;
pub mod collections;
pub mod comments;
pub mod dating;
pub mod follows;
pub mod health;
pub mod interactions;
pub mod likes;
pub mod messages;
pub mod notifications;
pub mod posts;
pub mod profile;
pub mod recommendations;

use crate::domain::{Pagination, DEFAULT_PAGE_SIZE};
use crate::error::Result;
use actix_web::web;
use serde::Deserialize;

fn default_limit() -> i64 {
    DEFAULT_PAGE_SIZE
}

/// `?q=&limit=&offset=` for the search endpoints
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

impl SearchQuery {
    pub fn page(&self) -> Result<Pagination> {
        Pagination::new(self.limit, self.offset)
    }
}

/// Range-checked pagination from the query string
pub fn page(query: web::Query<Pagination>) -> Result<Pagination> {
    let raw = query.into_inner();
    Pagination::new(raw.limit, raw.offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[test]
    fn test_page_rejects_out_of_range() {
        let ok = page(web::Query(Pagination { limit: 10, offset: 5 })).unwrap();
        assert_eq!(ok.limit, 10);

        let err = page(web::Query(Pagination { limit: 0, offset: 0 })).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = page(web::Query(Pagination { limit: 101, offset: 0 })).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = page(web::Query(Pagination { limit: 10, offset: -1 })).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_search_query_defaults() {
        let q: SearchQuery = serde_json::from_str(r#"{"q": "neo"}"#).unwrap();
        assert_eq!(q.limit, DEFAULT_PAGE_SIZE);
        assert_eq!(q.offset, 0);
        assert!(q.page().is_ok());
    }
}
