use axum::{Json, body::Bytes, http::StatusCode};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::{error::AppError, store::Pagination};

/// Successful response body: `{ "success": true, "data": ... }`.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: T,
}

pub type Reply<T> = (StatusCode, Json<Envelope<T>>);

pub fn ok<T: Serialize>(data: T) -> Reply<T> {
    reply(StatusCode::OK, data)
}

pub fn created<T: Serialize>(data: T) -> Reply<T> {
    reply(StatusCode::CREATED, data)
}

fn reply<T: Serialize>(status: StatusCode, data: T) -> Reply<T> {
    (
        status,
        Json(Envelope {
            success: true,
            data,
        }),
    )
}

/// One page of a listing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub current_page: u64,
    pub total_pages: u64,
    pub total_items: u64,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, total_items: u64, pagination: &Pagination) -> Self {
        Self {
            items,
            current_page: pagination.page,
            total_pages: pagination.total_pages(total_items),
            total_items,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            current_page: self.current_page,
            total_pages: self.total_pages,
            total_items: self.total_items,
        }
    }
}

/// Raw JSON body. An empty body reads as `{}` so validation can name the
/// missing fields.
pub fn parse_body(bytes: &Bytes) -> Result<Value, AppError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }

    serde_json::from_slice(bytes).map_err(|_| AppError::MalformedPayload)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parse_body() {
        assert_eq!(parse_body(&Bytes::new()).unwrap(), json!({}));
        assert_eq!(
            parse_body(&Bytes::from_static(b"{\"a\":1}")).unwrap(),
            json!({ "a": 1 })
        );
        assert!(matches!(
            parse_body(&Bytes::from_static(b"{\"a\":")),
            Err(AppError::MalformedPayload)
        ));
    }

    #[test]
    fn test_paginated() {
        let page = Paginated::new(vec![1, 2, 3], 23, &Pagination { page: 2, limit: 3 });
        assert_eq!(page.total_pages, 8);
        assert_eq!(page.current_page, 2);

        let json = serde_json::to_value(page.map(|n| n * 10)).unwrap();
        assert_eq!(
            json,
            json!({ "items": [10, 20, 30], "currentPage": 2, "totalPages": 8, "totalItems": 23 })
        );
    }
}
