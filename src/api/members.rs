use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::handler::errors::ErrorResponse;
use crate::repository::sqlx_impl::{PgMemberRepository, PgSequenceRepository};
use crate::domain::MemberNumber;
use crate::repository::MemberUpdate;
use crate::services::id_service::IdService;
use crate::services::member_service::{EnrollMemberRequest, MemberService};
use crate::tenant::TenantDb;

type MemberServiceType = MemberService<PgMemberRepository, PgSequenceRepository>;

fn member_service(pool: sqlx::PgPool) -> MemberServiceType {
    MemberService::new(
        Arc::new(PgMemberRepository::new(pool.clone())),
        IdService::new(Arc::new(PgSequenceRepository::new(pool))),
    )
}

#[derive(Deserialize)]
pub struct MemberFilter {
    pub branch: Option<String>,
}

/// POST /api/members
pub async fn enroll_member(
    Extension(TenantDb(pool)): Extension<TenantDb>,
    Json(payload): Json<EnrollMemberRequest>,
) -> impl IntoResponse {
    match member_service(pool).enroll(payload).await {
        Ok(member) => (StatusCode::CREATED, Json(member)).into_response(),
        Err(e) => ErrorResponse::from_error(&e).into_response(),
    }
}

/// GET /api/members
pub async fn list_members(
    Extension(TenantDb(pool)): Extension<TenantDb>,
    Query(filter): Query<MemberFilter>,
) -> impl IntoResponse {
    match member_service(pool).list(filter.branch.as_deref()).await {
        Ok(members) => (StatusCode::OK, Json(members)).into_response(),
        Err(e) => ErrorResponse::from_error(&e).into_response(),
    }
}

/// GET /api/members/:member_no
pub async fn get_member(
    Extension(TenantDb(pool)): Extension<TenantDb>,
    Path(member_no): Path<MemberNumber>,
) -> impl IntoResponse {
    match member_service(pool).get(member_no.as_ref()).await {
        Ok(member) => (StatusCode::OK, Json(member)).into_response(),
        Err(e) => ErrorResponse::from_error(&e).into_response(),
    }
}

/// PUT /api/members/:member_no
pub async fn update_member(
    Extension(TenantDb(pool)): Extension<TenantDb>,
    Path(member_no): Path<MemberNumber>,
    Json(payload): Json<MemberUpdate>,
) -> impl IntoResponse {
    match member_service(pool).update(member_no.as_ref(), payload).await {
        Ok(member) => (StatusCode::OK, Json(member)).into_response(),
        Err(e) => ErrorResponse::from_error(&e).into_response(),
    }
}

/// DELETE /api/members/:member_no (deactivates, never deletes history)
pub async fn deactivate_member(
    Extension(TenantDb(pool)): Extension<TenantDb>,
    Path(member_no): Path<MemberNumber>,
) -> impl IntoResponse {
    match member_service(pool).deactivate(member_no.as_ref()).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => ErrorResponse::from_error(&e).into_response(),
    }
}
