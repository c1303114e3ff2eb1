use crate::repository::{
    Category, CategoryRepository, Expense, ExpenseRepository, NewCategory, NewExpense,
};
use crate::services::CoreError;
use anyhow::Result;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecordExpenseRequest {
    pub category_id: i64,
    pub amount: Decimal,
    pub memo: Option<String>,
    pub spent_on: NaiveDate,
}

#[derive(Clone)]
pub struct ExpenseService<E: ExpenseRepository, C: CategoryRepository> {
    pub expenses: Arc<E>,
    pub categories: Arc<C>,
}

impl<E: ExpenseRepository, C: CategoryRepository> ExpenseService<E, C> {
    pub fn new(expenses: Arc<E>, categories: Arc<C>) -> Self {
        Self {
            expenses,
            categories,
        }
    }

    pub async fn create_category(&self, req: CreateCategoryRequest) -> Result<Category> {
        if req.name.trim().is_empty() {
            return Err(CoreError::invalid("category name must not be empty"));
        }
        if self.categories.find_by_name(&req.name).await?.is_some() {
            return Err(CoreError::conflict(format!(
                "category `{}` already exists",
                req.name
            )));
        }

        self.categories
            .insert_category(NewCategory {
                external_id: Uuid::new_v4(),
                name: req.name,
                description: req.description,
            })
            .await
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>> {
        self.categories.list_categories().await
    }

    pub async fn delete_category(&self, category_id: i64) -> Result<()> {
        let deleted = self.categories.delete_category(category_id).await?;
        if !deleted {
            return Err(CoreError::not_found(format!(
                "category {} not found",
                category_id
            )));
        }
        Ok(())
    }

    pub async fn record(&self, req: RecordExpenseRequest) -> Result<Expense> {
        if req.amount <= Decimal::ZERO {
            return Err(CoreError::invalid("amount must be positive"));
        }
        self.categories
            .find_by_id(req.category_id)
            .await?
            .ok_or_else(|| {
                CoreError::not_found(format!("category {} not found", req.category_id))
            })?;

        self.expenses
            .insert_expense(NewExpense {
                external_id: Uuid::new_v4(),
                category_id: req.category_id,
                amount: req.amount,
                memo: req.memo.unwrap_or_default(),
                spent_on: req.spent_on,
            })
            .await
    }

    pub async fn list(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<Expense>> {
        self.expenses.list_expenses(from, to).await
    }

    pub async fn delete(&self, expense_id: i64) -> Result<()> {
        let deleted = self.expenses.delete_expense(expense_id).await?;
        if !deleted {
            return Err(CoreError::not_found(format!(
                "expense {} not found",
                expense_id
            )));
        }
        Ok(())
    }
}
