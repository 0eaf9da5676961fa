//! User identity extractor.
//!
//! Authentication is owned by the platform's gateway, which verifies the
//! caller and forwards the user id in the `x-user-id` header. This crate
//! trusts that header; the extractor only enforces its presence and shape.
//!
//! # Example
//!
//! ```ignore
//! async fn my_handler(RequireUser(user): RequireUser) -> impl IntoResponse {
//!     format!("Hello, {}!", user)
//! }
//! ```

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::domain::foundation::UserId;

const USER_HEADER: &str = "x-user-id";

/// Extractor that requires a forwarded user identity.
#[derive(Debug, Clone)]
pub struct RequireUser(pub UserId);

#[async_trait]
impl<S> FromRequestParts<S> for RequireUser
where
    S: Send + Sync,
{
    type Rejection = IdentityRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(USER_HEADER)
            .and_then(|h| h.to_str().ok())
            .ok_or(IdentityRejection)?;

        let user = UserId::new(header).map_err(|_| IdentityRejection)?;
        Ok(RequireUser(user))
    }
}

/// Rejection returned when the identity header is missing or empty.
#[derive(Debug)]
pub struct IdentityRejection;

impl IntoResponse for IdentityRejection {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({
                "error": "Missing or invalid user identity",
                "code": "UNAUTHORIZED"
            })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(request: Request<()>) -> Result<RequireUser, IdentityRejection> {
        let (mut parts, _) = request.into_parts();
        RequireUser::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn valid_header_is_extracted() {
        let request = Request::builder()
            .header("x-user-id", "user-1")
            .body(())
            .unwrap();
        let RequireUser(user) = extract(request).await.unwrap();
        assert_eq!(user.as_str(), "user-1");
    }

    #[tokio::test]
    async fn missing_header_is_rejected() {
        let request = Request::builder().body(()).unwrap();
        assert!(extract(request).await.is_err());
    }

    #[tokio::test]
    async fn blank_header_is_rejected() {
        let request = Request::builder()
            .header("x-user-id", "   ")
            .body(())
            .unwrap();
        assert!(extract(request).await.is_err());
    }
}
