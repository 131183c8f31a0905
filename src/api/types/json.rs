//! JSON extractor whose rejections share the API error body

use axum::{
    extract::{rejection::JsonRejection as AxumRejection, FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json as AxumJson,
};
use serde::de::DeserializeOwned;

use super::error::{ApiErrorResponse, ApiErrorType};

/// Drop-in for `axum::Json`
#[derive(Debug, Clone, Copy, Default)]
pub struct Json<T>(pub T);

/// Body could not be read or deserialized
#[derive(Debug)]
pub struct JsonRejection {
    status: StatusCode,
    detail: String,
}

impl JsonRejection {
    fn from_axum(rejection: &AxumRejection) -> Self {
        let detail = match rejection {
            AxumRejection::JsonDataError(err) => {
                format!("Invalid request body: {}", err.body_text())
            }
            AxumRejection::JsonSyntaxError(err) => {
                format!("Invalid JSON syntax: {}", err.body_text())
            }
            AxumRejection::MissingJsonContentType(_) => {
                "Missing Content-Type header. Expected 'application/json'.".to_string()
            }
            AxumRejection::BytesRejection(err) => {
                format!("Failed to read request body: {}", err.body_text())
            }
            _ => "Invalid JSON request".to_string(),
        };

        Self {
            status: rejection.status(),
            detail,
        }
    }
}

impl IntoResponse for JsonRejection {
    fn into_response(self) -> Response {
        // Field-level failures are validation errors, everything else is a malformed request
        let error_type = if self.status == StatusCode::UNPROCESSABLE_ENTITY {
            ApiErrorType::ValidationError
        } else {
            ApiErrorType::InvalidRequest
        };

        let body = ApiErrorResponse {
            detail: self.detail,
            error_type,
        };

        (self.status, AxumJson(body)).into_response()
    }
}

impl<S, T> FromRequest<S> for Json<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = JsonRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        AxumJson::<T>::from_request(req, state)
            .await
            .map(|AxumJson(value)| Json(value))
            .map_err(|rejection| JsonRejection::from_axum(&rejection))
    }
}

impl<T> IntoResponse for Json<T>
where
    T: serde::Serialize,
{
    fn into_response(self) -> Response {
        AxumJson(self.0).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    #[allow(dead_code)]
    struct JoinBody {
        name: String,
    }

    fn post(body: &str) -> Request {
        Request::builder()
            .method("POST")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_missing_field_is_unprocessable() {
        let rejection = Json::<JoinBody>::from_request(post(r#"{"role": "Designer"}"#), &())
            .await
            .unwrap_err();

        assert_eq!(rejection.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(rejection.detail.contains("name"));
    }

    #[tokio::test]
    async fn test_syntax_error_is_bad_request() {
        let rejection = Json::<JoinBody>::from_request(post("{not json"), &())
            .await
            .unwrap_err();

        assert_eq!(rejection.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_rejection_body_shape() {
        let response = JsonRejection {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            detail: "missing field `name`".to_string(),
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["type"], "validation_error");
        assert_eq!(body["detail"], "missing field `name`");
    }
}
