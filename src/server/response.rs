//! JSON response bodies and error mapping.
//!
//! Request outcomes, including failures the client caused, are answered
//! with HTTP 200 and an `error` field. Only store or I/O failures produce a
//! 5xx.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use issues_lib::{IssueError, REQUIRED_FIELDS_MISSING};
use serde::Serialize;
use tracing::error;

pub const MISSING_ID: &str = "missing _id";
pub const COULD_NOT_UPDATE: &str = "could not update";
pub const COULD_NOT_DELETE: &str = "could not delete";
pub const NO_UPDATE_FIELDS: &str = "no update field(s) sent";
pub const SUCCESSFULLY_UPDATED: &str = "successfully updated";
pub const SUCCESSFULLY_DELETED: &str = "successfully deleted";
pub const INTERNAL_ERROR: &str = "internal server error";

/// `{result, _id}` body for a successful update or delete.
#[derive(Debug, Clone, Serialize)]
pub struct ActionResult {
    pub result: &'static str,
    #[serde(rename = "_id")]
    pub id: String,
}

impl ActionResult {
    #[must_use]
    pub fn updated(id: String) -> Self {
        Self {
            result: SUCCESSFULLY_UPDATED,
            id,
        }
    }

    #[must_use]
    pub fn deleted(id: String) -> Self {
        Self {
            result: SUCCESSFULLY_DELETED,
            id,
        }
    }
}

/// `{error, _id?}` body.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// Handler error wrapping a service failure.
#[derive(Debug)]
pub struct ApiError(pub IssueError);

impl From<IssueError> for ApiError {
    fn from(err: IssueError) -> Self {
        Self(err)
    }
}

impl ApiError {
    /// Client-facing message for an expected outcome.
    fn message(&self) -> &'static str {
        match self.0 {
            IssueError::Validation { .. } | IssueError::ValidationErrors { .. } => {
                REQUIRED_FIELDS_MISSING
            }
            IssueError::MissingId => MISSING_ID,
            IssueError::UpdateFailed { .. } => COULD_NOT_UPDATE,
            IssueError::DeleteFailed { .. } => COULD_NOT_DELETE,
            IssueError::NoUpdateFields { .. } => NO_UPDATE_FIELDS,
            _ => INTERNAL_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.0.is_expected() {
            let body = ErrorBody {
                error: self.message(),
                id: self.0.issue_id().map(str::to_string),
            };
            return (StatusCode::OK, Json(body)).into_response();
        }

        error!(error = %self.0, "request failed");
        let body = ErrorBody {
            error: INTERNAL_ERROR,
            id: None,
        };
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::{Value, json};

    async fn render(err: IssueError) -> (StatusCode, Value) {
        let response = ApiError(err).into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_expected_outcomes_are_200() {
        let (status, body) = render(IssueError::MissingId).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "error": "missing _id" }));

        let (status, body) = render(IssueError::NoUpdateFields {
            id: "abc".to_string(),
        })
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "error": "no update field(s) sent", "_id": "abc" }));

        let (_, body) = render(IssueError::validation("created_by", REQUIRED_FIELDS_MISSING)).await;
        assert_eq!(body, json!({ "error": "required field(s) missing" }));
    }

    #[tokio::test]
    async fn test_storage_failure_is_500() {
        let (status, body) = render(IssueError::Storage("disk full".to_string())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "internal server error" }));
    }

    #[test]
    fn test_action_result_shape() {
        let value = serde_json::to_value(ActionResult::deleted("abc".to_string())).unwrap();
        assert_eq!(value, json!({ "result": "successfully deleted", "_id": "abc" }));
    }
}
