//! Small helpers shared across route files.

use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::app::errors::ApiError;

pub fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::validation("Invalid id", Vec::new()))
}

/// Success envelope: `{success: true, message, data: {<key>: …, token?}}`.
pub fn data_response(
    status: StatusCode,
    message: &str,
    key: &str,
    principal: Value,
    token: Option<String>,
) -> axum::response::Response {
    let mut data = serde_json::Map::new();
    data.insert(key.to_string(), principal);
    if let Some(token) = token {
        data.insert("token".to_string(), json!(token));
    }

    (
        status,
        Json(json!({
            "success": true,
            "message": message,
            "data": data,
        })),
    )
        .into_response()
}
