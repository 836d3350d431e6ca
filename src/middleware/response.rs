use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Map, Value};

/// Wrapper for API responses that adds the `{"status":"success"}` envelope
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: Option<T>,
    pub message: Option<String>,
    pub status_code: Option<StatusCode>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Successful response with default 200 status
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            message: None,
            status_code: None,
        }
    }

    pub fn with_status(data: T, status_code: StatusCode) -> Self {
        Self {
            data: Some(data),
            message: None,
            status_code: Some(status_code),
        }
    }

    /// 201 Created
    pub fn created(data: T) -> Self {
        Self::with_status(data, StatusCode::CREATED)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl ApiResponse<()> {
    /// Envelope carrying only a message
    pub fn message_only(message: impl Into<String>) -> Self {
        Self {
            data: None,
            message: Some(message.into()),
            status_code: None,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status_code.unwrap_or(StatusCode::OK);

        let mut envelope = Map::new();
        envelope.insert("status".to_string(), Value::from("success"));
        if let Some(message) = self.message {
            envelope.insert("message".to_string(), Value::from(message));
        }

        if let Some(data) = self.data {
            match serde_json::to_value(&data) {
                Ok(value) => {
                    envelope.insert("data".to_string(), value);
                }
                Err(e) => {
                    tracing::error!("Failed to serialize response data: {}", e);
                    return (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(json!({
                            "status": "error",
                            "message": "Failed to serialize response data",
                            "code": "INTERNAL_SERVER_ERROR"
                        })),
                    )
                        .into_response();
                }
            }
        }

        (status, Json(Value::Object(envelope))).into_response()
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn success_envelope_with_message() {
        let response = ApiResponse::created(json!({ "id": 1 }))
            .with_message("Created")
            .into_response();
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = body_json(response).await;
        assert_eq!(body["status"], "success");
        assert_eq!(body["message"], "Created");
        assert_eq!(body["data"]["id"], 1);
    }

    #[tokio::test]
    async fn message_only_omits_data() {
        let body = body_json(ApiResponse::message_only("Done").into_response()).await;
        assert_eq!(body, json!({ "status": "success", "message": "Done" }));
    }
}
