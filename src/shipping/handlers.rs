//! Request handlers for `/api/shipping`.
//!
//! Each handler validates the request shape, performs one repository call
//! and maps the outcome onto a status code. Absent and `null` fields count as
//! missing; `0` is a valid value.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use super::error::ApiError;
use super::model::{NewShipping, ShippingFilter};
use super::AppState;
use crate::request::Request;
use crate::response::{IntoResponse, Json, Response};
use crate::status::Status;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateShippingRequest {
    user_id: Option<i32>,
    product_id: Option<i32>,
    count: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CancelShippingRequest {
    shipping_id: Option<Value>,
}

/// `shippingId` may arrive as a JSON integer or a numeric string. Any other
/// value, fractions and booleans included, does not name a record.
fn resolve_shipping_id(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => n.as_i64().and_then(|n| i32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Parses a JSON body. An empty body reads as `{}` so it reports missing
/// fields rather than a syntax error.
fn parse_body<T: DeserializeOwned + Default>(req: &Request) -> Result<T, ApiError> {
    if req.body().iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    req.json().map_err(|e| {
        debug!(error = %e, "rejecting malformed body");
        ApiError::InvalidBody
    })
}

/// `POST /api/shipping/create`
pub async fn create(state: AppState, req: Request) -> Result<Response, ApiError> {
    let body: CreateShippingRequest = parse_body(&req)?;
    let (Some(user_id), Some(product_id), Some(count)) = (body.user_id, body.product_id, body.count) else {
        return Err(ApiError::MissingFields);
    };

    let record = state.repository
        .create(NewShipping { user_id, product_id, count })
        .await?;
    info!(id = record.id, user_id, product_id, count, "shipping created");

    Ok((Status::Created, Json(record)).into_response())
}

/// `PUT /api/shipping/cancel`
pub async fn cancel(state: AppState, req: Request) -> Result<Response, ApiError> {
    let body: CancelShippingRequest = parse_body(&req)?;
    let id = body.shipping_id
        .as_ref()
        .ok_or(ApiError::MissingShippingId)
        .and_then(|v| resolve_shipping_id(v).ok_or(ApiError::InvalidShippingId))?;

    if state.repository.find_by_id(id).await?.is_none() {
        return Err(ApiError::NotFound);
    }

    let record = state.repository.cancel(id).await?;
    info!(id, "shipping cancelled");

    Ok(Json(record).into_response())
}

/// `GET /api/shipping/get[?userId=]`
///
/// A `userId` that is not an integer is ignored and every record is listed.
pub async fn list(state: AppState, req: Request) -> Result<Response, ApiError> {
    let filter = ShippingFilter {
        user_id: req.query("userId").and_then(|v| v.parse().ok()),
    };
    let records = state.repository.find_many(filter).await?;
    Ok(Json(records).into_response())
}
