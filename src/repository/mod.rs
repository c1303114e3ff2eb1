use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{LoanStatus, StaffRole, TransactionKind};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct Member {
    pub member_id: i64,
    pub external_id: Uuid,
    pub member_no: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub branch: Option<String>,
    pub active: bool,
    pub enrolled_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewMember {
    pub external_id: Uuid,
    pub member_no: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub branch: Option<String>,
}

/// Mutable contact details of a member. Identity fields never change.
#[derive(Debug, Clone, Deserialize)]
pub struct MemberUpdate {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub branch: Option<String>,
}

#[async_trait]
pub trait MemberRepository: Send + Sync + 'static {
    async fn insert_member(&self, new_member: NewMember) -> Result<Member>;
    async fn find_by_member_no(&self, member_no: &str) -> Result<Option<Member>>;
    async fn list_members(&self, branch: Option<&str>) -> Result<Vec<Member>>;
    async fn update_member(&self, member_no: &str, update: MemberUpdate) -> Result<Option<Member>>;
    async fn set_active(&self, member_no: &str, active: bool) -> Result<bool>;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct Account {
    pub account_id: i64,
    pub external_id: Uuid,
    pub account_no: String,
    pub member_no: String,
    pub balance: Decimal,
    pub opened_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewAccount {
    pub external_id: Uuid,
    pub account_no: String,
    pub member_no: String,
    pub balance: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct LedgerEntry {
    pub entry_id: i64,
    pub external_id: Uuid,
    pub account_no: String,
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub balance_after: Decimal,
    pub memo: String,
    pub reference: String,
    pub posted_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewLedgerEntry {
    pub account_no: String,
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub memo: String,
    pub reference: String,
}

#[async_trait]
pub trait AccountRepository: Send + Sync + 'static {
    async fn insert_account(&self, new_account: NewAccount) -> Result<Account>;
    async fn find_by_account_no(&self, account_no: &str) -> Result<Option<Account>>;
    async fn list_for_member(&self, member_no: &str) -> Result<Vec<Account>>;
    /// Applies the entry to the stored balance and inserts the ledger row in
    /// one database transaction. Fails without side effects when the account
    /// is missing or a withdrawal would overdraw.
    async fn post_entry(&self, entry: NewLedgerEntry) -> Result<LedgerEntry>;
    async fn list_entries(&self, account_no: &str) -> Result<Vec<LedgerEntry>>;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct Loan {
    pub loan_id: i64,
    pub external_id: Uuid,
    pub loan_no: String,
    pub member_no: String,
    pub account_no: String,
    pub principal: Decimal,
    pub interest_rate: Decimal,
    pub term_months: i32,
    pub status: LoanStatus,
    pub applied_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewLoan {
    pub external_id: Uuid,
    pub loan_no: String,
    pub member_no: String,
    pub account_no: String,
    pub principal: Decimal,
    pub interest_rate: Decimal,
    pub term_months: i32,
}

#[async_trait]
pub trait LoanRepository: Send + Sync + 'static {
    async fn insert_loan(&self, new_loan: NewLoan) -> Result<Loan>;
    async fn find_by_loan_no(&self, loan_no: &str) -> Result<Option<Loan>>;
    async fn list_loans(&self, status: Option<LoanStatus>) -> Result<Vec<Loan>>;
    async fn list_for_member(&self, member_no: &str) -> Result<Vec<Loan>>;
    /// Flips a Pending loan to Approved and stores its repayment schedule
    /// in the same transaction. The status check is part of the write, so
    /// a loan that already left Pending is never overwritten; that case
    /// returns `false`.
    async fn approve_pending(
        &self,
        loan_no: &str,
        approved_at: DateTime<Utc>,
        schedule: Vec<NewRepayment>,
    ) -> Result<bool>;
    /// Flips a Pending loan to Cancelled with the same guarded write.
    /// Returns `false` when the loan is no longer Pending.
    async fn cancel_pending(&self, loan_no: &str) -> Result<bool>;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct Repayment {
    pub repayment_id: i64,
    pub loan_no: String,
    pub installment: i32,
    pub due_date: NaiveDate,
    pub due_amount: Decimal,
    pub paid: bool,
    pub paid_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewRepayment {
    pub loan_no: String,
    pub installment: i32,
    pub due_date: NaiveDate,
    pub due_amount: Decimal,
}

/// A repayment joined with the interest rate of its loan, as needed by the
/// revenue aggregation.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DueRepayment {
    pub due_amount: Decimal,
    pub interest_rate: Decimal,
}

#[async_trait]
pub trait RepaymentRepository: Send + Sync + 'static {
    async fn list_for_loan(&self, loan_no: &str) -> Result<Vec<Repayment>>;
    async fn find_installment(
        &self,
        loan_no: &str,
        installment: i32,
    ) -> Result<Option<Repayment>>;
    async fn mark_paid(&self, loan_no: &str, installment: i32) -> Result<bool>;
    async fn count_outstanding(&self, loan_no: &str) -> Result<i64>;
    async fn due_in_range(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<DueRepayment>>;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct Category {
    pub category_id: i64,
    pub external_id: Uuid,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewCategory {
    pub external_id: Uuid,
    pub name: String,
    pub description: Option<String>,
}

#[async_trait]
pub trait CategoryRepository: Send + Sync + 'static {
    async fn insert_category(&self, new_category: NewCategory) -> Result<Category>;
    async fn find_by_name(&self, name: &str) -> Result<Option<Category>>;
    async fn find_by_id(&self, category_id: i64) -> Result<Option<Category>>;
    async fn list_categories(&self) -> Result<Vec<Category>>;
    async fn delete_category(&self, category_id: i64) -> Result<bool>;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct Expense {
    pub expense_id: i64,
    pub external_id: Uuid,
    pub category_id: i64,
    pub amount: Decimal,
    pub memo: String,
    pub spent_on: NaiveDate,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewExpense {
    pub external_id: Uuid,
    pub category_id: i64,
    pub amount: Decimal,
    pub memo: String,
    pub spent_on: NaiveDate,
}

#[async_trait]
pub trait ExpenseRepository: Send + Sync + 'static {
    async fn insert_expense(&self, new_expense: NewExpense) -> Result<Expense>;
    async fn list_expenses(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<Expense>>;
    async fn delete_expense(&self, expense_id: i64) -> Result<bool>;
    async fn total_in_range(&self, from: NaiveDate, to: NaiveDate) -> Result<Decimal>;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct Staff {
    pub staff_id: i64,
    pub external_id: Uuid,
    pub username: String,
    pub full_name: String,
    pub role: StaffRole,
    pub tenant: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewStaff {
    pub external_id: Uuid,
    pub username: String,
    pub full_name: String,
    pub role: StaffRole,
    pub tenant: String,
    pub password_hash: String,
}

#[async_trait]
pub trait StaffRepository: Send + Sync + 'static {
    async fn insert_staff(&self, new_staff: NewStaff) -> Result<Staff>;
    async fn find_by_username(&self, username: &str) -> Result<Option<Staff>>;
    async fn find_by_id(&self, staff_id: i64) -> Result<Option<Staff>>;
    async fn list_by_role(&self, role: StaffRole) -> Result<Vec<Staff>>;
    async fn update_password(&self, staff_id: i64, password_hash: &str) -> Result<()>;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct Wallet {
    pub wallet_id: i64,
    pub staff_id: i64,
    pub balance: Decimal,
    pub updated_at: DateTime<Utc>,
}

#[async_trait]
pub trait WalletRepository: Send + Sync + 'static {
    async fn find_for_staff(&self, staff_id: i64) -> Result<Option<Wallet>>;
    /// Creates the wallet on first use, then applies the delta atomically.
    /// A negative delta that would push the balance below zero fails without
    /// side effects.
    async fn apply_delta(&self, staff_id: i64, delta: Decimal) -> Result<Wallet>;
}

#[async_trait]
pub trait SequenceRepository: Send + Sync + 'static {
    /// Atomically increments and returns the named counter. Starts at 1.
    async fn next_value(&self, name: &str) -> Result<i64>;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct RevenueSnapshot {
    pub snapshot_id: i64,
    pub year: i32,
    pub month: i32,
    pub interest_revenue: Decimal,
    pub expense_total: Decimal,
    pub net_revenue: Decimal,
    pub computed_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewRevenueSnapshot {
    pub year: i32,
    pub month: i32,
    pub interest_revenue: Decimal,
    pub expense_total: Decimal,
    pub net_revenue: Decimal,
}

#[async_trait]
pub trait RevenueRepository: Send + Sync + 'static {
    async fn upsert_snapshot(&self, snapshot: NewRevenueSnapshot) -> Result<RevenueSnapshot>;
    async fn list_for_year(&self, year: i32) -> Result<Vec<RevenueSnapshot>>;
}

pub mod sqlx_impl;
