use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use crate::handler::errors::ErrorResponse;
use crate::repository::sqlx_impl::{
    PgExpenseRepository, PgRepaymentRepository, PgRevenueRepository,
};
use crate::services::revenue_service::RevenueService;
use crate::tenant::TenantDb;

type RevenueServiceType =
    RevenueService<PgRepaymentRepository, PgExpenseRepository, PgRevenueRepository>;

fn revenue_service(pool: sqlx::PgPool) -> RevenueServiceType {
    RevenueService::new(
        Arc::new(PgRepaymentRepository::new(pool.clone())),
        Arc::new(PgExpenseRepository::new(pool.clone())),
        Arc::new(PgRevenueRepository::new(pool)),
    )
}

/// GET /api/reports/revenue/:year
///
/// Recomputes the twelve monthly figures for the year and stores them as
/// snapshots before returning them.
pub async fn revenue_report(
    Extension(TenantDb(pool)): Extension<TenantDb>,
    Path(year): Path<i32>,
) -> impl IntoResponse {
    match revenue_service(pool).compute_year(year).await {
        Ok(rows) => (StatusCode::OK, Json(rows)).into_response(),
        Err(e) => ErrorResponse::from_error(&e).into_response(),
    }
}

/// GET /api/reports/revenue/:year/snapshots
pub async fn revenue_snapshots(
    Extension(TenantDb(pool)): Extension<TenantDb>,
    Path(year): Path<i32>,
) -> impl IntoResponse {
    match revenue_service(pool).snapshots_for_year(year).await {
        Ok(rows) => (StatusCode::OK, Json(rows)).into_response(),
        Err(e) => ErrorResponse::from_error(&e).into_response(),
    }
}
