use axum::{
    extract::{Extension, Json, Query},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::domain::StaffRole;
use crate::handler::auth::{extract_bearer_token, AuthenticatedStaff};
use crate::handler::errors::ErrorResponse;
use crate::repository::sqlx_impl::PgStaffRepository;
use crate::services::jwt_service::JwtService;
use crate::services::staff_service::{ChangePasswordRequest, RegisterStaffRequest, StaffService};

#[derive(Deserialize)]
pub struct LoginApi {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct RefreshTokenRequest {
    pub token: String,
}

#[derive(Serialize)]
pub struct RefreshTokenResponse {
    pub token: String,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

type StaffServiceType = StaffService<PgStaffRepository>;

// Staff records live in the primary database regardless of tenant, so the
// auth endpoints build their service from the default pool.
fn staff_service(pool: sqlx::PgPool, jwt_service: Arc<JwtService>) -> StaffServiceType {
    StaffService::new(Arc::new(PgStaffRepository::new(pool)), jwt_service)
}

/// POST /api/login
pub async fn login_api(
    Extension(pool): Extension<sqlx::PgPool>,
    Extension(jwt_service): Extension<Arc<JwtService>>,
    Json(payload): Json<LoginApi>,
) -> impl IntoResponse {
    let service = staff_service(pool, jwt_service);
    match service.login(payload.username, payload.password).await {
        Ok(auth) => (StatusCode::OK, Json(auth)).into_response(),
        Err(e) => ErrorResponse::from_error(&e).into_response(),
    }
}

/// POST /api/register (manager-guarded at the router)
pub async fn register_api(
    Extension(pool): Extension<sqlx::PgPool>,
    Extension(jwt_service): Extension<Arc<JwtService>>,
    Json(payload): Json<RegisterStaffRequest>,
) -> impl IntoResponse {
    let service = staff_service(pool, jwt_service);
    match service.register(payload).await {
        Ok(staff) => (StatusCode::CREATED, Json(staff)).into_response(),
        Err(e) => ErrorResponse::from_error(&e).into_response(),
    }
}

/// GET /api/me
pub async fn me_api(
    Extension(pool): Extension<sqlx::PgPool>,
    Extension(jwt_service): Extension<Arc<JwtService>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let token = match extract_bearer_token(&headers) {
        Some(token) => token,
        None => {
            return ErrorResponse::unauthorized("Missing authorization header").into_response();
        }
    };

    let service = staff_service(pool, jwt_service);
    match service.get_by_token(&token).await {
        Ok(staff) => (StatusCode::OK, Json(staff)).into_response(),
        Err(e) => ErrorResponse::from_error(&e).into_response(),
    }
}

/// POST /api/change-password
pub async fn change_password_api(
    Extension(pool): Extension<sqlx::PgPool>,
    Extension(jwt_service): Extension<Arc<JwtService>>,
    Extension(staff): Extension<AuthenticatedStaff>,
    Json(payload): Json<ChangePasswordRequest>,
) -> impl IntoResponse {
    let service = staff_service(pool, jwt_service);
    match service.change_password(staff.staff_id, payload).await {
        Ok(()) => (
            StatusCode::OK,
            Json(MessageResponse {
                message: "Password changed successfully".to_string(),
            }),
        )
            .into_response(),
        Err(e) => ErrorResponse::from_error(&e).into_response(),
    }
}

#[derive(Deserialize)]
pub struct StaffFilter {
    pub role: StaffRole,
}

/// GET /api/staff (manager-guarded at the router)
pub async fn list_staff_api(
    Extension(pool): Extension<sqlx::PgPool>,
    Extension(jwt_service): Extension<Arc<JwtService>>,
    Query(filter): Query<StaffFilter>,
) -> impl IntoResponse {
    let service = staff_service(pool, jwt_service);
    match service.list_by_role(filter.role).await {
        Ok(staff) => (StatusCode::OK, Json(staff)).into_response(),
        Err(e) => ErrorResponse::from_error(&e).into_response(),
    }
}

/// POST /api/refresh-token
pub async fn refresh_token_api(
    Extension(pool): Extension<sqlx::PgPool>,
    Extension(jwt_service): Extension<Arc<JwtService>>,
    Json(payload): Json<RefreshTokenRequest>,
) -> impl IntoResponse {
    let service = staff_service(pool, jwt_service);
    match service.refresh_token(&payload.token).await {
        Ok(token) => (StatusCode::OK, Json(RefreshTokenResponse { token })).into_response(),
        Err(e) => ErrorResponse::unauthorized(e.to_string()).into_response(),
    }
}
