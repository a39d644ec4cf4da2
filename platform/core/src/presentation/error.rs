// Copyright (c) 2026 Benevole contributors
// SPDX-License-Identifier: AGPL-3.0
//! HTTP error mapping.
//!
//! Validation failures render as
//! `{"error": "validation failed", "fields": {...}}`, everything else as
//! `{"error": "..."}`. Infrastructure failures are logged and replaced by a
//! generic message.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::application::error::WorkflowError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    #[error("malformed request body: {0}")]
    MalformedPayload(String),

    #[error("{0}")]
    NotFound(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::MalformedPayload(rejection.body_text())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MalformedPayload(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Workflow(err) => match err {
                WorkflowError::Validation(_) => StatusCode::BAD_REQUEST,
                WorkflowError::MissionNotFound(_) | WorkflowError::VolunteerNotFound(_) => {
                    StatusCode::NOT_FOUND
                }
                WorkflowError::DuplicateEmail
                | WorkflowError::MissionFull { .. }
                | WorkflowError::MissionNotOpen { .. }
                | WorkflowError::AlreadyRegistered(_)
                | WorkflowError::InvalidStatusTransition { .. }
                | WorkflowError::ConcurrentStatusChange(_) => StatusCode::CONFLICT,
                WorkflowError::StoreUnavailable(_) | WorkflowError::Internal(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match &self {
            ApiError::Workflow(WorkflowError::Validation(errors)) => {
                json!({ "error": "validation failed", "fields": errors })
            }
            _ if status.is_server_error() => {
                error!(error = %self, "Request failed");
                json!({ "error": "internal server error" })
            }
            _ => json!({ "error": self.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::mission::MissionStatus;
    use crate::domain::validation::ValidationErrors;
    use http_body_util::BodyExt;

    async fn render(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_validation_body_lists_fields() {
        let err = ApiError::from(WorkflowError::Validation(ValidationErrors::single("email", "email is required")));
        let (status, body) = render(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation failed");
        assert_eq!(body["fields"]["email"][0], "email is required");
    }

    #[tokio::test]
    async fn test_conflicts() {
        let (status, body) = render(WorkflowError::MissionFull { max_participants: 3 }.into()).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body["error"].as_str().unwrap().contains("maximum of 3"));

        let (status, _) = render(WorkflowError::MissionNotOpen { status: MissionStatus::Cancelled }.into()).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let matricule = crate::domain::volunteer::Matricule::from_sequence("VOL", 7);
        let (status, body) = render(WorkflowError::ConcurrentStatusChange(matricule).into()).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body["error"].as_str().unwrap().contains("VOL-000007"));
    }

    #[tokio::test]
    async fn test_store_failure_hides_detail() {
        let err = WorkflowError::StoreUnavailable("connection refused to 10.0.0.3:5432".to_string());
        let (status, body) = render(err.into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "internal server error" }));
    }
}
