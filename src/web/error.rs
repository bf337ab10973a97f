use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::repository::{OrderError, TacoError};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("not found")]
    NotFound,

    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::AlreadySaved(_) | OrderError::UnsavedTaco { .. } => {
                ApiError::BadRequest(err.to_string())
            }
            OrderError::Storage(e) => ApiError::Internal(e.into()),
        }
    }
}

impl From<TacoError> for ApiError {
    fn from(err: TacoError) -> Self {
        match err {
            TacoError::InvalidTimestamp(_) => ApiError::BadRequest(err.to_string()),
            TacoError::Storage(e) => ApiError::Internal(e.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Internal(e) => {
                // details stay in the log
                error!(error = %e, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::NotFound.into_response().status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::from(OrderError::UnsavedTaco { position: 0 })
                .into_response()
                .status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(OrderError::Storage(rusqlite::Error::QueryReturnedNoRows))
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_out_of_range_timestamp_is_bad_request() {
        let far = chrono::DateTime::<chrono::Utc>::MAX_UTC;
        assert_eq!(
            ApiError::from(TacoError::InvalidTimestamp(far))
                .into_response()
                .status(),
            StatusCode::BAD_REQUEST
        );
    }
}
