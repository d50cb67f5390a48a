//! Error conversions
//!
//! HTTP rendering of [`AppError`] when the `axum` feature is on.

#[cfg(feature = "axum")]
use super::app_error::AppError;

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;
        use axum::http::StatusCode;

        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        // RFC 7807 Problem Details. `error` mirrors `detail` for clients that
        // only read `{ error }`.
        let body = serde_json::json!({
            "type": format!("https://httpstatuses.io/{}", self.status_code()),
            "title": self.kind().as_str(),
            "status": self.status_code(),
            "detail": self.message(),
            "error": self.message(),
            "action": self.action(),
        });

        (status, Json(body)).into_response()
    }
}

#[cfg(all(test, feature = "axum"))]
mod tests {
    use super::*;
    use crate::error::kind::ErrorKind;

    #[tokio::test]
    async fn test_problem_details_body() {
        use axum::response::IntoResponse;

        let response = AppError::new(ErrorKind::Unauthorized, "Token missing")
            .with_action("Please sign in.")
            .into_response();
        assert_eq!(response.status().as_u16(), 401);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "Token missing");
        assert_eq!(body["detail"], "Token missing");
        assert_eq!(body["title"], "Unauthorized");
        assert_eq!(body["action"], "Please sign in.");
    }
}
