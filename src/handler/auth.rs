use axum::{
    extract::{Extension, Request},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::domain::StaffRole;
use crate::handler::errors::ErrorResponse;
use crate::services::jwt_service::{Claims, JwtService};
use crate::tenant::{TenantDb, TenantRegistry};

#[derive(Clone)]
pub struct AuthenticatedStaff {
    pub staff_id: i64,
    pub username: String,
    pub role: StaffRole,
    pub tenant: String,
}

impl TryFrom<Claims> for AuthenticatedStaff {
    type Error = anyhow::Error;

    // A subject that is not a staff id means the token was not minted by
    // us; the caller rejects it rather than acting as anyone.
    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        Ok(Self {
            staff_id: claims.sub.parse()?,
            username: claims.username,
            role: claims.role,
            tenant: claims.tenant,
        })
    }
}

/// Middleware that requires JWT authentication
pub async fn require_auth(
    Extension(jwt_service): Extension<Arc<JwtService>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Response {
    let token = match extract_bearer_token(&headers) {
        Some(token) => token,
        None => {
            return ErrorResponse::unauthorized("Missing authorization header").into_response();
        }
    };

    match jwt_service
        .verify_token(&token)
        .and_then(AuthenticatedStaff::try_from)
    {
        Ok(staff) => {
            request.extensions_mut().insert(staff);
            next.run(request).await
        }
        Err(_) => ErrorResponse::unauthorized("Invalid or expired token").into_response(),
    }
}

/// Middleware that resolves the caller's tenant claim to a database pool.
/// Runs after `require_auth`; an unknown routing key is rejected rather
/// than falling back to any other tenant's database.
pub async fn resolve_tenant(
    Extension(registry): Extension<TenantRegistry>,
    Extension(staff): Extension<AuthenticatedStaff>,
    mut request: Request,
    next: Next,
) -> Response {
    match registry.pool(&staff.tenant) {
        Some(pool) => {
            request.extensions_mut().insert(TenantDb(pool));
            next.run(request).await
        }
        None => {
            tracing::warn!(tenant = %staff.tenant, "Unknown tenant routing key");
            ErrorResponse::unauthorized("Unknown tenant").into_response()
        }
    }
}

/// Middleware that requires the Manager role
pub async fn require_manager(
    Extension(staff): Extension<AuthenticatedStaff>,
    request: Request,
    next: Next,
) -> Response {
    if staff.role == StaffRole::Manager {
        next.run(request).await
    } else {
        ErrorResponse::forbidden("Manager access required").into_response()
    }
}

/// Extract Bearer token from Authorization header or cookies
pub(crate) fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    if let Some(auth_header) = headers.get("authorization") {
        if let Ok(auth_str) = auth_header.to_str() {
            if auth_str.starts_with("Bearer ") && auth_str.len() > 7 {
                return Some(auth_str[7..].to_string());
            }
        }
    }

    if let Some(cookie_header) = headers.get("cookie") {
        if let Ok(cookie_str) = cookie_header.to_str() {
            for cookie in cookie_str.split(';') {
                let cookie = cookie.trim();
                if let Some(token_value) = cookie.strip_prefix("jwt_token=") {
                    if !token_value.is_empty() {
                        return Some(token_value.to_string());
                    }
                }
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, HeaderValue};

    #[test]
    fn test_extract_bearer_token_from_header() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer test123"));

        let token = extract_bearer_token(&headers);
        assert_eq!(token, Some("test123".to_string()));
    }

    #[test]
    fn test_extract_bearer_token_from_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "cookie",
            HeaderValue::from_static("jwt_token=test123; other=value"),
        );

        let token = extract_bearer_token(&headers);
        assert_eq!(token, Some("test123".to_string()));
    }

    #[test]
    fn test_extract_bearer_token_empty_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert("cookie", HeaderValue::from_static("jwt_token="));

        let token = extract_bearer_token(&headers);
        assert_eq!(token, None);
    }

    #[test]
    fn test_extract_bearer_token_missing() {
        let headers = HeaderMap::new();
        let token = extract_bearer_token(&headers);
        assert_eq!(token, None);
    }

    #[test]
    fn test_extract_bearer_token_invalid_format() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Basic abc123"));

        let token = extract_bearer_token(&headers);
        assert_eq!(token, None);
    }

    #[test]
    fn test_authenticated_staff_from_claims() {
        let claims = Claims {
            sub: "123".to_string(),
            username: "agent_adisa".to_string(),
            role: StaffRole::Agent,
            tenant: "west-branch".to_string(),
            exp: 1234567890,
            iat: 1234567890,
            iss: "coopcredit".to_string(),
        };

        let staff = AuthenticatedStaff::try_from(claims).unwrap();
        assert_eq!(staff.staff_id, 123);
        assert_eq!(staff.username, "agent_adisa");
        assert_eq!(staff.role, StaffRole::Agent);
        assert_eq!(staff.tenant, "west-branch");
    }

    #[test]
    fn test_malformed_subject_is_rejected() {
        let claims = Claims {
            sub: "not-a-number".to_string(),
            username: "agent_adisa".to_string(),
            role: StaffRole::Agent,
            tenant: "default".to_string(),
            exp: 1234567890,
            iat: 1234567890,
            iss: "coopcredit".to_string(),
        };

        assert!(AuthenticatedStaff::try_from(claims).is_err());
    }
}
