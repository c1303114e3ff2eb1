use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;

use crate::handler::auth::AuthenticatedStaff;
use crate::handler::errors::ErrorResponse;
use crate::repository::sqlx_impl::PgWalletRepository;
use crate::services::wallet_service::{WalletMovementRequest, WalletService};
use crate::tenant::TenantDb;

type WalletServiceType = WalletService<PgWalletRepository>;

fn wallet_service(pool: sqlx::PgPool) -> WalletServiceType {
    WalletService::new(Arc::new(PgWalletRepository::new(pool)))
}

/// GET /api/wallet
pub async fn get_wallet(
    Extension(TenantDb(pool)): Extension<TenantDb>,
    Extension(staff): Extension<AuthenticatedStaff>,
) -> impl IntoResponse {
    match wallet_service(pool).get(staff.staff_id).await {
        Ok(wallet) => (StatusCode::OK, Json(wallet)).into_response(),
        Err(e) => ErrorResponse::from_error(&e).into_response(),
    }
}

/// POST /api/wallet/topup
pub async fn top_up_wallet(
    Extension(TenantDb(pool)): Extension<TenantDb>,
    Extension(staff): Extension<AuthenticatedStaff>,
    Json(payload): Json<WalletMovementRequest>,
) -> impl IntoResponse {
    match wallet_service(pool).top_up(staff.staff_id, payload).await {
        Ok(wallet) => (StatusCode::OK, Json(wallet)).into_response(),
        Err(e) => ErrorResponse::from_error(&e).into_response(),
    }
}

/// POST /api/wallet/withdraw
pub async fn withdraw_wallet(
    Extension(TenantDb(pool)): Extension<TenantDb>,
    Extension(staff): Extension<AuthenticatedStaff>,
    Json(payload): Json<WalletMovementRequest>,
) -> impl IntoResponse {
    match wallet_service(pool).withdraw(staff.staff_id, payload).await {
        Ok(wallet) => (StatusCode::OK, Json(wallet)).into_response(),
        Err(e) => ErrorResponse::from_error(&e).into_response(),
    }
}
