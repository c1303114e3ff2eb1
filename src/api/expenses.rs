use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;

use crate::handler::errors::ErrorResponse;
use crate::repository::sqlx_impl::{PgCategoryRepository, PgExpenseRepository};
use crate::services::expense_service::{
    CreateCategoryRequest, ExpenseService, RecordExpenseRequest,
};
use crate::tenant::TenantDb;

type ExpenseServiceType = ExpenseService<PgExpenseRepository, PgCategoryRepository>;

fn expense_service(pool: sqlx::PgPool) -> ExpenseServiceType {
    ExpenseService::new(
        Arc::new(PgExpenseRepository::new(pool.clone())),
        Arc::new(PgCategoryRepository::new(pool)),
    )
}

#[derive(Deserialize)]
pub struct ExpenseFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// POST /api/categories
pub async fn create_category(
    Extension(TenantDb(pool)): Extension<TenantDb>,
    Json(payload): Json<CreateCategoryRequest>,
) -> impl IntoResponse {
    match expense_service(pool).create_category(payload).await {
        Ok(category) => (StatusCode::CREATED, Json(category)).into_response(),
        Err(e) => ErrorResponse::from_error(&e).into_response(),
    }
}

/// GET /api/categories
pub async fn list_categories(
    Extension(TenantDb(pool)): Extension<TenantDb>,
) -> impl IntoResponse {
    match expense_service(pool).list_categories().await {
        Ok(categories) => (StatusCode::OK, Json(categories)).into_response(),
        Err(e) => ErrorResponse::from_error(&e).into_response(),
    }
}

/// DELETE /api/categories/:category_id
pub async fn delete_category(
    Extension(TenantDb(pool)): Extension<TenantDb>,
    Path(category_id): Path<i64>,
) -> impl IntoResponse {
    match expense_service(pool).delete_category(category_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => ErrorResponse::from_error(&e).into_response(),
    }
}

/// POST /api/expenses
pub async fn record_expense(
    Extension(TenantDb(pool)): Extension<TenantDb>,
    Json(payload): Json<RecordExpenseRequest>,
) -> impl IntoResponse {
    match expense_service(pool).record(payload).await {
        Ok(expense) => (StatusCode::CREATED, Json(expense)).into_response(),
        Err(e) => ErrorResponse::from_error(&e).into_response(),
    }
}

/// GET /api/expenses
pub async fn list_expenses(
    Extension(TenantDb(pool)): Extension<TenantDb>,
    Query(filter): Query<ExpenseFilter>,
) -> impl IntoResponse {
    match expense_service(pool).list(filter.from, filter.to).await {
        Ok(expenses) => (StatusCode::OK, Json(expenses)).into_response(),
        Err(e) => ErrorResponse::from_error(&e).into_response(),
    }
}

/// DELETE /api/expenses/:expense_id
pub async fn delete_expense(
    Extension(TenantDb(pool)): Extension<TenantDb>,
    Path(expense_id): Path<i64>,
) -> impl IntoResponse {
    match expense_service(pool).delete(expense_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => ErrorResponse::from_error(&e).into_response(),
    }
}
