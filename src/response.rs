use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Structured rejection for a denied event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub status_code: u16,
    pub message: String,
    pub retry_after_seconds: u64,
}

impl Rejection {
    pub fn too_many_requests(message: impl Into<String>, retry_after_seconds: u64) -> Self {
        Self {
            status_code: StatusCode::TOO_MANY_REQUESTS.as_u16(),
            message: message.into(),
            retry_after_seconds,
        }
    }
}

/// Decision object handed back to the HTTP layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RateLimitResponse {
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_seconds: Option<u64>,
}

impl RateLimitResponse {
    pub fn allowed(count: usize) -> Self {
        Self {
            allowed: true,
            count: Some(count),
            status_code: None,
            message: None,
            retry_after_seconds: None,
        }
    }

    pub fn denied(rejection: &Rejection) -> Self {
        Self {
            allowed: false,
            count: None,
            status_code: Some(rejection.status_code),
            message: Some(rejection.message.clone()),
            retry_after_seconds: Some(rejection.retry_after_seconds),
        }
    }
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::TOO_MANY_REQUESTS);
        let mut response = (status, Json(RateLimitResponse::denied(&self))).into_response();
        response
            .headers_mut()
            .insert(header::RETRY_AFTER, HeaderValue::from(self.retry_after_seconds));
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_denied_body_shape() {
        let rejection = Rejection::too_many_requests("Too many orders", 3595);
        let json = serde_json::to_value(RateLimitResponse::denied(&rejection)).unwrap();

        assert_eq!(json["allowed"], false);
        assert_eq!(json["status_code"], 429);
        assert_eq!(json["message"], "Too many orders");
        assert_eq!(json["retry_after_seconds"], 3595);
        assert!(json.get("count").is_none());
    }

    #[test]
    fn test_allowed_body_omits_rejection_fields() {
        let json = serde_json::to_value(RateLimitResponse::allowed(3)).unwrap();
        assert_eq!(json, serde_json::json!({ "allowed": true, "count": 3 }));
    }

    #[test]
    fn test_rejection_into_response_sets_retry_after() {
        let response = Rejection::too_many_requests("slow down", 60).into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "60");
    }
}
