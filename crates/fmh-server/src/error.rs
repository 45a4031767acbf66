use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use fmh_core::error::LogbookError;

/// Error body returned by every failing request.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("{0}")]
    BadRequest(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            ApiError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                "Method not allowed".to_string(),
            ),
            ApiError::BadRequest(detail) => (StatusCode::BAD_REQUEST, detail.clone()),
            ApiError::Internal(detail) => {
                tracing::error!(detail, "import request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to import logbook".to_string(),
                )
            }
        };

        let body = ErrorBody {
            success: false,
            error: message,
        };
        (status, Json(body)).into_response()
    }
}

impl From<LogbookError> for ApiError {
    fn from(err: LogbookError) -> Self {
        match err {
            LogbookError::AuthenticationRequired => ApiError::Unauthorized,
            LogbookError::NoProcedures => {
                ApiError::BadRequest("No procedures found in the PDF".into())
            }
            e if e.is_extraction() => {
                tracing::warn!(error = %e, "uploaded PDF could not be read");
                ApiError::BadRequest("Could not read the uploaded PDF".into())
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let body = to_bytes(response.into_body(), 1024).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_unauthorized_returns_401() {
        let response = ApiError::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let json = body_json(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Unauthorized");
    }

    #[tokio::test]
    async fn test_internal_hides_detail() {
        let response = ApiError::Internal("disk I/O error".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["error"], "Failed to import logbook");
    }

    #[tokio::test]
    async fn test_no_procedures_is_a_bad_request() {
        let response = ApiError::from(LogbookError::NoProcedures).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_unreadable_pdf_is_a_bad_request() {
        let err = ApiError::from(LogbookError::Extraction("bad xref".into()));
        assert!(matches!(err, ApiError::BadRequest(_)));

        let err = ApiError::from(LogbookError::PdftotextFailed {
            code: 1,
            stderr: "Syntax Error".into(),
        });
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn test_missing_pdftotext_is_internal() {
        let err = ApiError::from(LogbookError::PdftotextNotFound);
        assert!(matches!(err, ApiError::Internal(_)));
    }
}
