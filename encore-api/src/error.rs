use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    extract::FromRequest,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;

use encore_core::{CoreError, FieldError};

/// `{status, message?, data}` wrapper of every JSON response
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: T,
}

pub type ApiResult<T> = Result<Json<Envelope<T>>, AppError>;

pub fn success<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(Json(Envelope {
        status: "success",
        message: None,
        data,
    }))
}

pub fn success_with<T: Serialize>(message: impl Into<String>, data: T) -> ApiResult<T> {
    Ok(Json(Envelope {
        status: "success",
        message: Some(message.into()),
        data,
    }))
}

#[derive(Debug)]
pub enum AppError {
    AuthenticationError(String),
    AuthorizationError(String),
    ValidationError(Vec<FieldError>),
    InvalidActionError(String),
    NotFoundError(String),
    ConflictError(String),
    RateLimited,
    InternalServerError(String),
    Anyhow(anyhow::Error),
}

impl AppError {
    pub fn unauthenticated() -> Self {
        AppError::AuthenticationError("Not authorized".to_string())
    }

    pub fn invalid(field: &str, message: &str) -> Self {
        AppError::ValidationError(vec![FieldError::new(field, message)])
    }
}

impl AppError {
    fn from_core(err: CoreError) -> Self {
        match err {
            CoreError::ValidationError(fields) => AppError::ValidationError(fields),
            CoreError::NotFoundError(msg) => AppError::NotFoundError(msg),
            CoreError::AuthorizationError(msg) => AppError::AuthorizationError(msg),
            CoreError::InvalidActionError(action) => AppError::InvalidActionError(action),
            CoreError::ConflictError(msg) => AppError::ConflictError(msg),
            CoreError::StorageError(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, data) = match self {
            AppError::AuthenticationError(msg) => (StatusCode::UNAUTHORIZED, msg, json!(null)),
            AppError::AuthorizationError(msg) => (StatusCode::FORBIDDEN, msg, json!(null)),
            AppError::ValidationError(fields) => (StatusCode::BAD_REQUEST, "Invalid request".to_string(), json!(fields)),
            AppError::InvalidActionError(action) => {
                tracing::debug!("Rejected offer action {:?}", action);
                (StatusCode::BAD_REQUEST, "Unknown action on the offer".to_string(), json!(null))
            }
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, msg, json!(null)),
            AppError::ConflictError(msg) => (StatusCode::CONFLICT, msg, json!(null)),
            AppError::RateLimited => (StatusCode::TOO_MANY_REQUESTS, "Rate limit exceeded".to_string(), json!(null)),
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string(), json!(null))
            }
            AppError::Anyhow(err) => {
                tracing::error!("Internal Server Error: {:#}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string(), json!(null))
            }
        };

        let body = Json(json!({
            "status": "error",
            "message": message,
            "data": data,
        }));

        (status, body).into_response()
    }
}

/// Extractor rejections are client mistakes; everything else is unexpected.
impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();
        let err = match err.downcast::<CoreError>() {
            Ok(core) => return AppError::from_core(core),
            Err(err) => err,
        };
        let err = match err.downcast::<JsonRejection>() {
            Ok(rejection) => return AppError::invalid("body", &rejection.body_text()),
            Err(err) => err,
        };
        let err = match err.downcast::<QueryRejection>() {
            Ok(rejection) => return AppError::invalid("query", &rejection.body_text()),
            Err(err) => err,
        };
        match err.downcast::<PathRejection>() {
            Ok(rejection) => AppError::invalid("id", &rejection.body_text()),
            Err(err) => AppError::Anyhow(err),
        }
    }
}

/// `axum::Json` answering with the error envelope on bad input
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

#[derive(axum::extract::FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

#[derive(axum::extract::FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_of(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_validation_lists_fields() {
        let (status, body) = body_of(CoreError::invalid("price", "The price must be specified").into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "error");
        assert_eq!(body["message"], "Invalid request");
        assert_eq!(body["data"][0]["field"], "price");
    }

    #[tokio::test]
    async fn test_storage_detail_is_not_leaked() {
        let (status, body) = body_of(CoreError::StorageError("connection refused".to_string()).into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Internal server error");
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let cases = [
            (AppError::unauthenticated(), StatusCode::UNAUTHORIZED),
            (CoreError::forbidden("no").into(), StatusCode::FORBIDDEN),
            (CoreError::not_found("gone").into(), StatusCode::NOT_FOUND),
            (CoreError::InvalidActionError("cancel".to_string()).into(), StatusCode::BAD_REQUEST),
            (CoreError::ConflictError("twice".to_string()).into(), StatusCode::CONFLICT),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn test_anyhow_keeps_core_mapping() {
        let err: AppError = anyhow::Error::new(CoreError::not_found("gone")).into();
        assert!(matches!(err, AppError::NotFoundError(_)));
    }
}
