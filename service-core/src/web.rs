//! Response envelope and request-body helpers shared by every handler.
//!
//! Every JSON response has the shape `{"results": <data|null>, "errors": [...]}`;
//! `errors` is omitted when empty.

use crate::error::AppError;
use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub results: Option<T>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ResponseError>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResponseError {
    pub message: String,
}

impl<T> ApiResponse<T> {
    pub fn ok(results: T) -> Self {
        Self {
            results: Some(results),
            errors: Vec::new(),
        }
    }

    pub fn empty() -> Self {
        Self {
            results: None,
            errors: Vec::new(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            results: None,
            errors: vec![ResponseError {
                message: message.into(),
            }],
        }
    }
}

/// `201 Created` with `data` wrapped in the envelope.
pub fn created<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Json(ApiResponse::ok(data))).into_response()
}

/// JSON body extractor whose rejection is an [`AppError`].
///
/// A body that cannot be decoded is reported as an internal error, so the
/// client only ever sees the generic 500 envelope for it.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(decode_error(rejection)),
        }
    }
}

fn decode_error(rejection: JsonRejection) -> AppError {
    AppError::InternalError(anyhow::anyhow!(
        "decode request body: {}",
        rejection.body_text()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, routing::post, Router};
    use http_body_util::BodyExt;
    use tower::util::ServiceExt;

    #[derive(Debug, Deserialize)]
    struct Ping {
        name: String,
    }

    async fn ping(JsonBody(ping): JsonBody<Ping>) -> Response {
        created(ping.name)
    }

    fn app() -> Router {
        Router::new().route("/ping", post(ping))
    }

    #[test]
    fn error_envelope_has_null_results() {
        let body = serde_json::to_value(ApiResponse::<()>::error("Not Found")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"results": null, "errors": [{"message": "Not Found"}]})
        );
    }

    #[test]
    fn ok_envelope_omits_errors() {
        let body = serde_json::to_value(ApiResponse::ok(7)).unwrap();
        assert_eq!(body, serde_json::json!({"results": 7}));
    }

    #[tokio::test]
    async fn decodes_valid_body() {
        let response = app()
            .oneshot(
                axum::http::Request::builder()
                    .method("POST")
                    .uri("/ping")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"name":"n1"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["results"], "n1");
    }

    #[tokio::test]
    async fn malformed_body_is_a_generic_500() {
        let response = app()
            .oneshot(
                axum::http::Request::builder()
                    .method("POST")
                    .uri("/ping")
                    .header("content-type", "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["errors"][0]["message"], "Internal Server Error");
    }
}
