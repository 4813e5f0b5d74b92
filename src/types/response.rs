use crate::db::PasswordRecord;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Message keys returned in `i18n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Message {
    PasswordSaved,
    PasswordExists,
    PasswordNotFound,
    PasswordIsSame,
    PasswordIsNotSame,
    PasswordDeleted,
    AllPasswords,
}

/// Pagination envelope. Listings are never paged: one page holding everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub page: u32,
    pub last: u32,
    pub limit: usize,
    pub total: usize,
}

impl PageMeta {
    pub fn single_page(total: usize) -> Self {
        Self {
            page: 1,
            last: 1,
            limit: total,
            total,
        }
    }
}

/// Structured result of an action. The HTTP status mirrors `code`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionResult {
    pub code: u16,
    pub i18n: Message,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<PageMeta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<PasswordRecord>>,
}

impl ActionResult {
    pub fn ok(i18n: Message) -> Self {
        Self {
            code: StatusCode::OK.as_u16(),
            i18n,
            meta: None,
            data: None,
        }
    }

    /// Business-rule rejection; not an error.
    pub fn rejected(i18n: Message) -> Self {
        Self {
            code: StatusCode::BAD_REQUEST.as_u16(),
            i18n,
            meta: None,
            data: None,
        }
    }

    pub fn listing(records: Vec<PasswordRecord>) -> Self {
        Self {
            code: StatusCode::OK.as_u16(),
            i18n: Message::AllPasswords,
            meta: Some(PageMeta::single_page(records.len())),
            data: Some(records),
        }
    }
}

impl IntoResponse for ActionResult {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.code).unwrap_or(StatusCode::OK);
        (status, Json(self)).into_response()
    }
}
