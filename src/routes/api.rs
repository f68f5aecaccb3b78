use rocket::serde::json::Json;
use rocket::State;
use serde_json::{json, Value};

use crate::bot::commands::clamp_limit;
use crate::models::content::ContentRecord;
use crate::service::{Lookup, Service};

use super::{blocking, ApiError};

// ── Lookup (gated) ─────────────────────────────────────

#[get("/content/<code>?<user>")]
pub async fn content_lookup(
    service: &State<Service>,
    code: String,
    user: i64,
) -> Result<Json<Lookup>, ApiError> {
    let service = service.inner().clone();
    let lookup = blocking(move || service.lookup(user, &code)).await?;
    Ok(Json(lookup))
}

// ── Listings ───────────────────────────────────────────

#[get("/recent?<limit>")]
pub async fn recent(
    service: &State<Service>,
    limit: Option<i64>,
) -> Result<Json<Vec<ContentRecord>>, ApiError> {
    let service = service.inner().clone();
    let limit = clamp_limit(limit);
    Ok(Json(blocking(move || service.list_recent(limit)).await?))
}

#[get("/top?<limit>")]
pub async fn top(
    service: &State<Service>,
    limit: Option<i64>,
) -> Result<Json<Vec<ContentRecord>>, ApiError> {
    let service = service.inner().clone();
    let limit = clamp_limit(limit);
    Ok(Json(blocking(move || service.top_by_views(limit)).await?))
}

// ── Health ─────────────────────────────────────────────

#[get("/health")]
pub async fn health(service: &State<Service>) -> Result<Json<Value>, ApiError> {
    let service = service.inner().clone();
    let contents = blocking(move || service.content.count()).await?;
    Ok(Json(json!({ "status": "ok", "contents": contents })))
}

pub fn routes() -> Vec<rocket::Route> {
    routes![content_lookup, recent, top, health]
}
