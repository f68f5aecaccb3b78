pub mod api;
pub mod webhook;

use rocket::http::Status;
use rocket::response::{self, Responder};
use rocket::serde::json::Json;
use rocket::Request;
use serde_json::json;

use crate::error::BotError;

/// JSON error body with a status code matching the error kind.
#[derive(Debug)]
pub struct ApiError(pub BotError);

impl From<BotError> for ApiError {
    fn from(e: BotError) -> Self {
        ApiError(e)
    }
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        let status = match &self.0 {
            BotError::Validation(_) => Status::BadRequest,
            BotError::NotFound(_) => Status::NotFound,
            BotError::Permission => Status::Forbidden,
            BotError::External(_) => Status::BadGateway,
            BotError::Storage(_) | BotError::Internal(_) => {
                log::error!("[api] {} failed: {}", req.uri(), self.0);
                Status::InternalServerError
            }
        };
        (status, Json(json!({ "error": self.0.to_string() }))).respond_to(req)
    }
}

/// Runs blocking store/oracle work off the async executor.
pub async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> crate::error::Result<T> + Send + 'static,
    T: Send + 'static,
{
    rocket::tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError(BotError::Internal(format!("worker task failed: {}", e))))?
        .map_err(ApiError)
}
