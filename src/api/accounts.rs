use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use crate::domain::{AccountNumber, MemberNumber};
use crate::handler::errors::ErrorResponse;
use crate::repository::sqlx_impl::{
    PgAccountRepository, PgMemberRepository, PgSequenceRepository,
};
use crate::services::account_service::{AccountService, OpenAccountRequest, PostingRequest};
use crate::services::id_service::IdService;
use crate::tenant::TenantDb;

type AccountServiceType =
    AccountService<PgAccountRepository, PgMemberRepository, PgSequenceRepository>;

fn account_service(pool: sqlx::PgPool) -> AccountServiceType {
    AccountService::new(
        Arc::new(PgAccountRepository::new(pool.clone())),
        Arc::new(PgMemberRepository::new(pool.clone())),
        IdService::new(Arc::new(PgSequenceRepository::new(pool))),
    )
}

/// POST /api/accounts
pub async fn open_account(
    Extension(TenantDb(pool)): Extension<TenantDb>,
    Json(payload): Json<OpenAccountRequest>,
) -> impl IntoResponse {
    match account_service(pool).open(payload).await {
        Ok(account) => (StatusCode::CREATED, Json(account)).into_response(),
        Err(e) => ErrorResponse::from_error(&e).into_response(),
    }
}

/// GET /api/accounts/:account_no
pub async fn get_account(
    Extension(TenantDb(pool)): Extension<TenantDb>,
    Path(account_no): Path<AccountNumber>,
) -> impl IntoResponse {
    match account_service(pool).get(account_no.as_ref()).await {
        Ok(account) => (StatusCode::OK, Json(account)).into_response(),
        Err(e) => ErrorResponse::from_error(&e).into_response(),
    }
}

/// GET /api/members/:member_no/accounts
pub async fn list_member_accounts(
    Extension(TenantDb(pool)): Extension<TenantDb>,
    Path(member_no): Path<MemberNumber>,
) -> impl IntoResponse {
    match account_service(pool).list_for_member(member_no.as_ref()).await {
        Ok(accounts) => (StatusCode::OK, Json(accounts)).into_response(),
        Err(e) => ErrorResponse::from_error(&e).into_response(),
    }
}

/// POST /api/accounts/:account_no/deposit
pub async fn deposit(
    Extension(TenantDb(pool)): Extension<TenantDb>,
    Path(account_no): Path<AccountNumber>,
    Json(payload): Json<PostingRequest>,
) -> impl IntoResponse {
    match account_service(pool)
        .deposit(account_no.as_ref(), payload)
        .await
    {
        Ok(entry) => (StatusCode::CREATED, Json(entry)).into_response(),
        Err(e) => ErrorResponse::from_error(&e).into_response(),
    }
}

/// POST /api/accounts/:account_no/withdraw
pub async fn withdraw(
    Extension(TenantDb(pool)): Extension<TenantDb>,
    Path(account_no): Path<AccountNumber>,
    Json(payload): Json<PostingRequest>,
) -> impl IntoResponse {
    match account_service(pool)
        .withdraw(account_no.as_ref(), payload)
        .await
    {
        Ok(entry) => (StatusCode::CREATED, Json(entry)).into_response(),
        Err(e) => ErrorResponse::from_error(&e).into_response(),
    }
}

/// GET /api/accounts/:account_no/transactions
pub async fn account_statement(
    Extension(TenantDb(pool)): Extension<TenantDb>,
    Path(account_no): Path<AccountNumber>,
) -> impl IntoResponse {
    match account_service(pool).statement(account_no.as_ref()).await {
        Ok(entries) => (StatusCode::OK, Json(entries)).into_response(),
        Err(e) => ErrorResponse::from_error(&e).into_response(),
    }
}
