#[cfg(test)]
mod tests {
    use crate::auth::TokenError;
    use crate::error::{AppError, AppResult, OptionExt};
    use crate::models::SignupRequest;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use http_body_util::BodyExt;
    use serde_json::Value;
    use validator::Validate;

    async fn body_json(error: AppError) -> (StatusCode, Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_app_error_display() {
        let error = AppError::BadRequest("Invalid input".to_string());
        assert_eq!(format!("{}", error), "Bad request: Invalid input");

        let error = AppError::NotFound("content not found".to_string());
        assert_eq!(format!("{}", error), "Not found: content not found");

        let error = AppError::Forbidden("no token given".to_string());
        assert_eq!(format!("{}", error), "Forbidden: no token given");

        let error = AppError::RateLimited { retry_after_seconds: 60 };
        assert_eq!(format!("{}", error), "Rate limited. Retry after 60 seconds");

        let error = AppError::ValidationError { field: "email".to_string(), message: "bad".to_string() };
        assert_eq!(format!("{}", error), "Validation error on field 'email': bad");
    }

    #[test]
    fn test_app_error_status_codes() {
        let cases = [
            (AppError::BadRequest("x".to_string()), StatusCode::BAD_REQUEST),
            (AppError::NotFound("x".to_string()), StatusCode::NOT_FOUND),
            (AppError::Conflict("x".to_string()), StatusCode::CONFLICT),
            (AppError::ServiceUnavailable("x".to_string()), StatusCode::SERVICE_UNAVAILABLE),
            (AppError::Database("x".to_string()), StatusCode::INTERNAL_SERVER_ERROR),
            (AppError::InvalidInput("x".to_string()), StatusCode::BAD_REQUEST),
            (AppError::Forbidden("x".to_string()), StatusCode::FORBIDDEN),
            (AppError::RateLimited { retry_after_seconds: 1 }, StatusCode::TOO_MANY_REQUESTS),
            (
                AppError::ValidationError { field: "f".to_string(), message: "m".to_string() },
                StatusCode::BAD_REQUEST,
            ),
            (AppError::Internal(anyhow::anyhow!("boom")), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }

    #[tokio::test]
    async fn test_error_envelope_has_message() {
        let (status, body) = body_json(AppError::Forbidden("wrong password".to_string())).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "wrong password");
        assert_eq!(body["error"]["code"], "FORBIDDEN");
        assert_eq!(body["error"]["message"], "wrong password");
        assert_eq!(body["status"], 403);
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_internal_error_hides_details() {
        let (_, body) = body_json(AppError::Internal(anyhow::anyhow!("secret connection string"))).await;
        assert_eq!(body["message"], "An internal server error occurred");
        assert!(!body.to_string().contains("secret connection string"));
        assert!(body["error"]["details"]["error_id"].is_string());
    }

    #[tokio::test]
    async fn test_rate_limited_details() {
        let (_, body) = body_json(AppError::RateLimited { retry_after_seconds: 42 }).await;
        assert_eq!(body["error"]["code"], "RATE_LIMITED");
        assert_eq!(body["error"]["details"]["retry_after_seconds"], 42);
    }

    #[test]
    fn test_from_sqlx_errors() {
        let error: AppError = sqlx::Error::RowNotFound.into();
        assert!(matches!(error, AppError::NotFound(_)));

        let error: AppError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(error, AppError::ServiceUnavailable(_)));

        let error: AppError = sqlx::Error::PoolClosed.into();
        assert!(matches!(error, AppError::Database(_)));
    }

    #[test]
    fn test_from_validation_errors_reports_first_field() {
        let req = SignupRequest {
            email: "not-an-email".to_string(),
            username: "ab".to_string(),
            password: "password123".to_string(),
        };
        let errs = req.validate().unwrap_err();
        match AppError::from(errs) {
            AppError::ValidationError { field, .. } => assert_eq!(field, "email"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_from_token_errors() {
        let error: AppError = TokenError::Expired.into();
        match error {
            AppError::Forbidden(msg) => assert!(msg.starts_with("error verifying token")),
            other => panic!("unexpected error: {:?}", other),
        }

        let error: AppError = TokenError::Encode("bad key".to_string()).into();
        assert!(matches!(error, AppError::Internal(_)));
    }

    #[test]
    fn test_option_ext() {
        let some: Option<i32> = Some(42);
        assert_eq!(some.ok_or_not_found("content").unwrap(), 42);

        let none: Option<i32> = None;
        match none.ok_or_not_found("content") {
            Err(AppError::NotFound(msg)) => assert_eq!(msg, "content not found"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_app_result_with_question_mark() {
        fn lookup(found: bool) -> AppResult<&'static str> {
            let value = if found { Some("alice") } else { None };
            let name = value.ok_or_not_found("user")?;
            Ok(name)
        }

        assert_eq!(lookup(true).unwrap(), "alice");
        assert!(matches!(lookup(false), Err(AppError::NotFound(_))));
    }
}
