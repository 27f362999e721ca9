use axum::{
    extract::{FromRequest, Request},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};

/// Largest accepted request body. Also used for the router's `DefaultBodyLimit`.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// An Axum middleware that validates incoming requests for common security issues.
///
/// This middleware checks for:
/// - Path traversal attempts in the request URI.
/// - Suspicious user agents (logged only).
/// - Excessive content length.
///
/// Failing requests are answered with `400 Bad Request` or `413 Payload Too Large`.
pub async fn validate_request_middleware(req: Request, next: Next) -> Response {
    let uri_path = req.uri().path();
    if contains_path_traversal(uri_path) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "message": "Path traversal detected in request",
                "error": {
                    "code": "INVALID_PATH",
                    "message": "Path traversal detected in request",
                },
                "status": 400,
            })),
        )
            .into_response();
    }

    if let Some(user_agent) = req.headers().get("user-agent") {
        if let Ok(ua_str) = user_agent.to_str() {
            if is_suspicious_user_agent(ua_str) {
                tracing::warn!("Suspicious user agent detected: {}", sanitize_for_logging(ua_str));
            }
        }
    }

    // Early rejection; DefaultBodyLimit still guards chunked bodies
    if matches!(req.method(), &axum::http::Method::POST | &axum::http::Method::PUT) {
        let length = req
            .headers()
            .get("content-length")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<usize>().ok());
        if let Some(length) = length {
            if length > MAX_BODY_BYTES {
                let message = format!("Request body exceeds maximum size of {} bytes", MAX_BODY_BYTES);
                return (
                    StatusCode::PAYLOAD_TOO_LARGE,
                    Json(json!({
                        "message": message,
                        "error": {
                            "code": "PAYLOAD_TOO_LARGE",
                            "message": message,
                        },
                        "status": 413,
                    })),
                )
                    .into_response();
            }
        }
    }

    next.run(req).await
}

/// JSON body extractor that also runs the body's `validator` rules.
///
/// Malformed JSON (including an unknown content `type`) becomes a 400
/// `BAD_REQUEST`; a rule violation becomes a 400 `VALIDATION_ERROR` naming the field.
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
        value.validate()?;
        Ok(ValidatedJson(value))
    }
}

/// Check if a path contains traversal attempts
fn contains_path_traversal(path: &str) -> bool {
    let lower = path.to_lowercase();

    if path.contains("/..") || path.contains("\\..") || path.starts_with("..") {
        return true;
    }

    if path.contains("/./") || path.contains("\\.\\") {
        return true;
    }

    // Multiple dots (bypass attempt: ....)
    if path.contains("....") {
        return true;
    }

    // URL-encoded variants (single and double encoding)
    let encoded_patterns = [
        "%2e%2e",
        "%252e%252e", // .. and double-encoded ..
        "%2e/",
        "%252e%2f", // ./
        "/%2e",
        "%2f%2e", // /.
        "%2e\\",
        "%2e%5c", // .\\
        "%5c%2e",
        "%5c%5c", // \\.
        "%00",    // Null byte
    ];

    for pattern in &encoded_patterns {
        if lower.contains(pattern) {
            return true;
        }
    }

    path.contains('\0')
}

/// Check for suspicious user agents (simple heuristic)
fn is_suspicious_user_agent(ua: &str) -> bool {
    let ua_lower = ua.to_lowercase();
    ua_lower.contains("scanner")
        || (ua_lower.contains("crawler") && !ua_lower.contains("googlebot") && !ua_lower.contains("bingbot"))
        || ua_lower.contains("nikto")
        || ua_lower.contains("sqlmap")
        || ua_lower.contains("havij")
        || ua_lower.contains("acunetix")
}

/// Parses a record id taken from the URL.
pub fn validate_uuid(id: &str, entity: &str) -> AppResult<Uuid> {
    Uuid::parse_str(id).map_err(|_| AppError::InvalidInput(format!("invalid {} id: {}", entity, sanitize_for_logging(id))))
}

/// Sanitizes user input for logging purposes.
///
/// Removes control characters, limits the length to 200 chars and escapes quotes.
pub fn sanitize_for_logging(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_control() || c.is_whitespace())
        .take(200)
        .collect::<String>()
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\'', "\\\'")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_traversal_detection() {
        assert!(contains_path_traversal("../etc/passwd"));
        assert!(contains_path_traversal("./../../etc/passwd"));
        assert!(contains_path_traversal("/api/v1/brain/../content"));
        assert!(contains_path_traversal("%2e%2e/etc"));
        assert!(contains_path_traversal("path\0with\0null"));

        assert!(!contains_path_traversal("/api/v1/content"));
        assert!(!contains_path_traversal("/api/v1/brain/11198274"));
    }

    #[test]
    fn test_suspicious_user_agents() {
        assert!(is_suspicious_user_agent("nikto/2.1.5"));
        assert!(is_suspicious_user_agent("sqlmap/1.0"));
        assert!(is_suspicious_user_agent("random scanner bot"));

        assert!(!is_suspicious_user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64)"));
        assert!(!is_suspicious_user_agent("Googlebot/2.1"));
    }

    #[test]
    fn test_uuid_validation() {
        assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000", "content").is_ok());
        assert!(matches!(validate_uuid("not-a-uuid", "content"), Err(AppError::InvalidInput(_))));
        assert!(validate_uuid("550e8400-e29b-41d4-a716", "content").is_err());
    }

    #[test]
    fn test_sanitize_for_logging() {
        assert_eq!(sanitize_for_logging("normal text"), "normal text");
        assert_eq!(sanitize_for_logging("text\nwith\nnewlines"), "text\nwith\nnewlines");

        let with_control = "text\x00with\x01control\x02chars";
        let sanitized = sanitize_for_logging(with_control);
        assert!(!sanitized.contains('\x00'));
        assert!(!sanitized.contains('\x01'));
        assert!(!sanitized.contains('\x02'));

        let long_text = "a".repeat(300);
        assert_eq!(sanitize_for_logging(&long_text).len(), 200);
    }
}
