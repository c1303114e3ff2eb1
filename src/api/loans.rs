use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::domain::{LoanStatus, MemberNumber};
use crate::handler::errors::ErrorResponse;
use crate::repository::sqlx_impl::{
    PgAccountRepository, PgLoanRepository, PgMemberRepository, PgRepaymentRepository,
    PgSequenceRepository,
};
use crate::services::id_service::IdService;
use crate::services::loan_service::{ApplyLoanRequest, LoanService};
use crate::services::repayment_service::RepaymentService;
use crate::tenant::TenantDb;

type LoanServiceType = LoanService<
    PgLoanRepository,
    PgRepaymentRepository,
    PgMemberRepository,
    PgAccountRepository,
    PgSequenceRepository,
>;

type RepaymentServiceType =
    RepaymentService<PgRepaymentRepository, PgLoanRepository, PgAccountRepository>;

fn loan_service(pool: sqlx::PgPool) -> LoanServiceType {
    LoanService::new(
        Arc::new(PgLoanRepository::new(pool.clone())),
        Arc::new(PgRepaymentRepository::new(pool.clone())),
        Arc::new(PgMemberRepository::new(pool.clone())),
        Arc::new(PgAccountRepository::new(pool.clone())),
        IdService::new(Arc::new(PgSequenceRepository::new(pool))),
    )
}

fn repayment_service(pool: sqlx::PgPool) -> RepaymentServiceType {
    RepaymentService::new(
        Arc::new(PgRepaymentRepository::new(pool.clone())),
        Arc::new(PgLoanRepository::new(pool.clone())),
        Arc::new(PgAccountRepository::new(pool)),
    )
}

#[derive(Deserialize)]
pub struct LoanFilter {
    pub status: Option<LoanStatus>,
}

/// POST /api/loans
pub async fn apply_loan(
    Extension(TenantDb(pool)): Extension<TenantDb>,
    Json(payload): Json<ApplyLoanRequest>,
) -> impl IntoResponse {
    match loan_service(pool).apply(payload).await {
        Ok(loan) => (StatusCode::CREATED, Json(loan)).into_response(),
        Err(e) => ErrorResponse::from_error(&e).into_response(),
    }
}

/// GET /api/loans
pub async fn list_loans(
    Extension(TenantDb(pool)): Extension<TenantDb>,
    Query(filter): Query<LoanFilter>,
) -> impl IntoResponse {
    match loan_service(pool).list(filter.status).await {
        Ok(loans) => (StatusCode::OK, Json(loans)).into_response(),
        Err(e) => ErrorResponse::from_error(&e).into_response(),
    }
}

/// GET /api/members/:member_no/loans
pub async fn list_member_loans(
    Extension(TenantDb(pool)): Extension<TenantDb>,
    Path(member_no): Path<MemberNumber>,
) -> impl IntoResponse {
    match loan_service(pool).list_for_member(member_no.as_ref()).await {
        Ok(loans) => (StatusCode::OK, Json(loans)).into_response(),
        Err(e) => ErrorResponse::from_error(&e).into_response(),
    }
}

/// GET /api/loans/:loan_no
pub async fn get_loan(
    Extension(TenantDb(pool)): Extension<TenantDb>,
    Path(loan_no): Path<String>,
) -> impl IntoResponse {
    match loan_service(pool).detail(&loan_no).await {
        Ok(detail) => (StatusCode::OK, Json(detail)).into_response(),
        Err(e) => ErrorResponse::from_error(&e).into_response(),
    }
}

/// POST /api/loans/:loan_no/approve
pub async fn approve_loan(
    Extension(TenantDb(pool)): Extension<TenantDb>,
    Path(loan_no): Path<String>,
) -> impl IntoResponse {
    match loan_service(pool).approve(&loan_no).await {
        Ok(loan) => (StatusCode::OK, Json(loan)).into_response(),
        Err(e) => ErrorResponse::from_error(&e).into_response(),
    }
}

/// POST /api/loans/:loan_no/cancel
pub async fn cancel_loan(
    Extension(TenantDb(pool)): Extension<TenantDb>,
    Path(loan_no): Path<String>,
) -> impl IntoResponse {
    match loan_service(pool).cancel(&loan_no).await {
        Ok(loan) => (StatusCode::OK, Json(loan)).into_response(),
        Err(e) => ErrorResponse::from_error(&e).into_response(),
    }
}

/// GET /api/loans/:loan_no/repayments
pub async fn loan_repayments(
    Extension(TenantDb(pool)): Extension<TenantDb>,
    Path(loan_no): Path<String>,
) -> impl IntoResponse {
    match repayment_service(pool).schedule(&loan_no).await {
        Ok(schedule) => (StatusCode::OK, Json(schedule)).into_response(),
        Err(e) => ErrorResponse::from_error(&e).into_response(),
    }
}

/// POST /api/loans/:loan_no/repayments/:installment/collect
pub async fn collect_repayment(
    Extension(TenantDb(pool)): Extension<TenantDb>,
    Path((loan_no, installment)): Path<(String, i32)>,
) -> impl IntoResponse {
    match repayment_service(pool).collect(&loan_no, installment).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(e) => ErrorResponse::from_error(&e).into_response(),
    }
}
