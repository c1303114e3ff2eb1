use super::{
    Account, AccountRepository, Category, CategoryRepository, DueRepayment, Expense,
    ExpenseRepository, LedgerEntry, Loan, LoanRepository, Member, MemberRepository, MemberUpdate,
    NewAccount, NewCategory, NewExpense, NewLedgerEntry, NewLoan, NewMember, NewRepayment,
    NewRevenueSnapshot, NewStaff, Repayment, RepaymentRepository, RevenueRepository,
    RevenueSnapshot, SequenceRepository, Staff, StaffRepository, Wallet, WalletRepository,
};
use crate::domain::{LoanStatus, StaffRole, TransactionKind};
use crate::services::CoreError;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

const MEMBER_COLUMNS: &str = "member_id, external_id, member_no, full_name, phone, address, branch, active, enrolled_at, updated_at";
const ACCOUNT_COLUMNS: &str =
    "account_id, external_id, account_no, member_no, balance, opened_at, updated_at";
const LEDGER_COLUMNS: &str = "entry_id, external_id, account_no, kind, amount, balance_after, memo, reference, posted_at";
const LOAN_COLUMNS: &str = "loan_id, external_id, loan_no, member_no, account_no, principal, interest_rate, term_months, status, applied_at, approved_at, updated_at";
const REPAYMENT_COLUMNS: &str =
    "repayment_id, loan_no, installment, due_date, due_amount, paid, paid_at";
const STAFF_COLUMNS: &str =
    "staff_id, external_id, username, full_name, role, tenant, password_hash, created_at, updated_at";

pub struct PgMemberRepository {
    pub pool: PgPool,
}

impl PgMemberRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MemberRepository for PgMemberRepository {
    async fn insert_member(&self, new_member: NewMember) -> Result<Member> {
        let sql = format!(
            "INSERT INTO members (external_id, member_no, full_name, phone, address, branch) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {MEMBER_COLUMNS}"
        );
        let rec = sqlx::query_as::<_, Member>(&sql)
            .bind(new_member.external_id)
            .bind(&new_member.member_no)
            .bind(&new_member.full_name)
            .bind(&new_member.phone)
            .bind(&new_member.address)
            .bind(&new_member.branch)
            .fetch_one(&self.pool)
            .await?;
        Ok(rec)
    }

    async fn find_by_member_no(&self, member_no: &str) -> Result<Option<Member>> {
        let sql = format!("SELECT {MEMBER_COLUMNS} FROM members WHERE member_no = $1");
        let rec = sqlx::query_as::<_, Member>(&sql)
            .bind(member_no)
            .fetch_optional(&self.pool)
            .await?;
        Ok(rec)
    }

    async fn list_members(&self, branch: Option<&str>) -> Result<Vec<Member>> {
        let recs = match branch {
            Some(branch) => {
                let sql = format!(
                    "SELECT {MEMBER_COLUMNS} FROM members WHERE branch = $1 ORDER BY member_no"
                );
                sqlx::query_as::<_, Member>(&sql)
                    .bind(branch)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql = format!("SELECT {MEMBER_COLUMNS} FROM members ORDER BY member_no");
                sqlx::query_as::<_, Member>(&sql).fetch_all(&self.pool).await?
            }
        };
        Ok(recs)
    }

    async fn update_member(&self, member_no: &str, update: MemberUpdate) -> Result<Option<Member>> {
        let sql = format!(
            "UPDATE members SET full_name = COALESCE($2, full_name), \
             phone = COALESCE($3, phone), address = COALESCE($4, address), \
             branch = COALESCE($5, branch), updated_at = NOW() \
             WHERE member_no = $1 RETURNING {MEMBER_COLUMNS}"
        );
        let rec = sqlx::query_as::<_, Member>(&sql)
            .bind(member_no)
            .bind(&update.full_name)
            .bind(&update.phone)
            .bind(&update.address)
            .bind(&update.branch)
            .fetch_optional(&self.pool)
            .await?;
        Ok(rec)
    }

    async fn set_active(&self, member_no: &str, active: bool) -> Result<bool> {
        let result =
            sqlx::query("UPDATE members SET active = $2, updated_at = NOW() WHERE member_no = $1")
                .bind(member_no)
                .bind(active)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}

pub struct PgAccountRepository {
    pub pool: PgPool,
}

impl PgAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountRepository for PgAccountRepository {
    async fn insert_account(&self, new_account: NewAccount) -> Result<Account> {
        let sql = format!(
            "INSERT INTO accounts (external_id, account_no, member_no, balance) \
             VALUES ($1, $2, $3, $4) RETURNING {ACCOUNT_COLUMNS}"
        );
        let rec = sqlx::query_as::<_, Account>(&sql)
            .bind(new_account.external_id)
            .bind(&new_account.account_no)
            .bind(&new_account.member_no)
            .bind(new_account.balance)
            .fetch_one(&self.pool)
            .await?;
        Ok(rec)
    }

    async fn find_by_account_no(&self, account_no: &str) -> Result<Option<Account>> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE account_no = $1");
        let rec = sqlx::query_as::<_, Account>(&sql)
            .bind(account_no)
            .fetch_optional(&self.pool)
            .await?;
        Ok(rec)
    }

    async fn list_for_member(&self, member_no: &str) -> Result<Vec<Account>> {
        let sql =
            format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE member_no = $1 ORDER BY account_no");
        let recs = sqlx::query_as::<_, Account>(&sql)
            .bind(member_no)
            .fetch_all(&self.pool)
            .await?;
        Ok(recs)
    }

    async fn post_entry(&self, entry: NewLedgerEntry) -> Result<LedgerEntry> {
        let mut tx = self.pool.begin().await?;

        // Row lock so concurrent postings against the same account serialize.
        let balance: Decimal =
            sqlx::query_scalar("SELECT balance FROM accounts WHERE account_no = $1 FOR UPDATE")
                .bind(&entry.account_no)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| anyhow!("account not found"))?;

        let balance_after = match entry.kind {
            TransactionKind::Deposit => balance + entry.amount,
            TransactionKind::Withdrawal => {
                if entry.amount > balance {
                    return Err(CoreError::invalid(format!(
                        "insufficient balance: {}",
                        balance
                    )));
                }
                balance - entry.amount
            }
        };

        sqlx::query("UPDATE accounts SET balance = $2, updated_at = NOW() WHERE account_no = $1")
            .bind(&entry.account_no)
            .bind(balance_after)
            .execute(&mut *tx)
            .await?;

        let sql = format!(
            "INSERT INTO ledger_entries (external_id, account_no, kind, amount, balance_after, memo, reference) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {LEDGER_COLUMNS}"
        );
        let rec = sqlx::query_as::<_, LedgerEntry>(&sql)
            .bind(uuid::Uuid::new_v4())
            .bind(&entry.account_no)
            .bind(entry.kind)
            .bind(entry.amount)
            .bind(balance_after)
            .bind(&entry.memo)
            .bind(&entry.reference)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(rec)
    }

    async fn list_entries(&self, account_no: &str) -> Result<Vec<LedgerEntry>> {
        let sql = format!(
            "SELECT {LEDGER_COLUMNS} FROM ledger_entries WHERE account_no = $1 ORDER BY posted_at DESC"
        );
        let recs = sqlx::query_as::<_, LedgerEntry>(&sql)
            .bind(account_no)
            .fetch_all(&self.pool)
            .await?;
        Ok(recs)
    }
}

pub struct PgLoanRepository {
    pub pool: PgPool,
}

impl PgLoanRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LoanRepository for PgLoanRepository {
    async fn insert_loan(&self, new_loan: NewLoan) -> Result<Loan> {
        let sql = format!(
            "INSERT INTO loans (external_id, loan_no, member_no, account_no, principal, interest_rate, term_months) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {LOAN_COLUMNS}"
        );
        let rec = sqlx::query_as::<_, Loan>(&sql)
            .bind(new_loan.external_id)
            .bind(&new_loan.loan_no)
            .bind(&new_loan.member_no)
            .bind(&new_loan.account_no)
            .bind(new_loan.principal)
            .bind(new_loan.interest_rate)
            .bind(new_loan.term_months)
            .fetch_one(&self.pool)
            .await?;
        Ok(rec)
    }

    async fn find_by_loan_no(&self, loan_no: &str) -> Result<Option<Loan>> {
        let sql = format!("SELECT {LOAN_COLUMNS} FROM loans WHERE loan_no = $1");
        let rec = sqlx::query_as::<_, Loan>(&sql)
            .bind(loan_no)
            .fetch_optional(&self.pool)
            .await?;
        Ok(rec)
    }

    async fn list_loans(&self, status: Option<LoanStatus>) -> Result<Vec<Loan>> {
        let recs = match status {
            Some(status) => {
                let sql =
                    format!("SELECT {LOAN_COLUMNS} FROM loans WHERE status = $1 ORDER BY loan_no");
                sqlx::query_as::<_, Loan>(&sql)
                    .bind(status)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql = format!("SELECT {LOAN_COLUMNS} FROM loans ORDER BY loan_no");
                sqlx::query_as::<_, Loan>(&sql).fetch_all(&self.pool).await?
            }
        };
        Ok(recs)
    }

    async fn list_for_member(&self, member_no: &str) -> Result<Vec<Loan>> {
        let sql = format!("SELECT {LOAN_COLUMNS} FROM loans WHERE member_no = $1 ORDER BY loan_no");
        let recs = sqlx::query_as::<_, Loan>(&sql)
            .bind(member_no)
            .fetch_all(&self.pool)
            .await?;
        Ok(recs)
    }

    async fn approve_pending(
        &self,
        loan_no: &str,
        approved_at: DateTime<Utc>,
        schedule: Vec<NewRepayment>,
    ) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        // Compare-and-swap: the expected status is part of the WHERE clause,
        // so a loan that raced out of Pending is left untouched.
        let result = sqlx::query(
            "UPDATE loans SET status = $2, approved_at = $3, updated_at = NOW() \
             WHERE loan_no = $1 AND status = $4",
        )
        .bind(loan_no)
        .bind(LoanStatus::Approved)
        .bind(approved_at)
        .bind(LoanStatus::Pending)
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            return Ok(false);
        }

        for item in &schedule {
            sqlx::query(
                "INSERT INTO repayments (loan_no, installment, due_date, due_amount) \
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(&item.loan_no)
            .bind(item.installment)
            .bind(item.due_date)
            .bind(item.due_amount)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(true)
    }

    async fn cancel_pending(&self, loan_no: &str) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE loans SET status = $2, updated_at = NOW() \
             WHERE loan_no = $1 AND status = $3",
        )
        .bind(loan_no)
        .bind(LoanStatus::Cancelled)
        .bind(LoanStatus::Pending)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

pub struct PgRepaymentRepository {
    pub pool: PgPool,
}

impl PgRepaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RepaymentRepository for PgRepaymentRepository {
    async fn list_for_loan(&self, loan_no: &str) -> Result<Vec<Repayment>> {
        let sql = format!(
            "SELECT {REPAYMENT_COLUMNS} FROM repayments WHERE loan_no = $1 ORDER BY installment"
        );
        let recs = sqlx::query_as::<_, Repayment>(&sql)
            .bind(loan_no)
            .fetch_all(&self.pool)
            .await?;
        Ok(recs)
    }

    async fn find_installment(
        &self,
        loan_no: &str,
        installment: i32,
    ) -> Result<Option<Repayment>> {
        let sql = format!(
            "SELECT {REPAYMENT_COLUMNS} FROM repayments WHERE loan_no = $1 AND installment = $2"
        );
        let rec = sqlx::query_as::<_, Repayment>(&sql)
            .bind(loan_no)
            .bind(installment)
            .fetch_optional(&self.pool)
            .await?;
        Ok(rec)
    }

    async fn mark_paid(&self, loan_no: &str, installment: i32) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE repayments SET paid = TRUE, paid_at = NOW() \
             WHERE loan_no = $1 AND installment = $2 AND paid = FALSE",
        )
        .bind(loan_no)
        .bind(installment)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_outstanding(&self, loan_no: &str) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM repayments WHERE loan_no = $1 AND paid = FALSE",
        )
        .bind(loan_no)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn due_in_range(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<DueRepayment>> {
        let recs = sqlx::query_as::<_, DueRepayment>(
            "SELECT r.due_amount, l.interest_rate FROM repayments r \
             JOIN loans l ON l.loan_no = r.loan_no \
             WHERE r.due_date >= $1 AND r.due_date < $2 AND l.status = 'Approved'",
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;
        Ok(recs)
    }
}

pub struct PgCategoryRepository {
    pub pool: PgPool,
}

impl PgCategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryRepository for PgCategoryRepository {
    async fn insert_category(&self, new_category: NewCategory) -> Result<Category> {
        let rec = sqlx::query_as::<_, Category>(
            "INSERT INTO categories (external_id, name, description) VALUES ($1, $2, $3) \
             RETURNING category_id, external_id, name, description",
        )
        .bind(new_category.external_id)
        .bind(&new_category.name)
        .bind(&new_category.description)
        .fetch_one(&self.pool)
        .await?;
        Ok(rec)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Category>> {
        let rec = sqlx::query_as::<_, Category>(
            "SELECT category_id, external_id, name, description FROM categories WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(rec)
    }

    async fn find_by_id(&self, category_id: i64) -> Result<Option<Category>> {
        let rec = sqlx::query_as::<_, Category>(
            "SELECT category_id, external_id, name, description FROM categories \
             WHERE category_id = $1",
        )
        .bind(category_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(rec)
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        let recs = sqlx::query_as::<_, Category>(
            "SELECT category_id, external_id, name, description FROM categories ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(recs)
    }

    async fn delete_category(&self, category_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM categories WHERE category_id = $1")
            .bind(category_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

pub struct PgExpenseRepository {
    pub pool: PgPool,
}

impl PgExpenseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const EXPENSE_COLUMNS: &str =
    "expense_id, external_id, category_id, amount, memo, spent_on, recorded_at";

#[async_trait]
impl ExpenseRepository for PgExpenseRepository {
    async fn insert_expense(&self, new_expense: NewExpense) -> Result<Expense> {
        let sql = format!(
            "INSERT INTO expenses (external_id, category_id, amount, memo, spent_on) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {EXPENSE_COLUMNS}"
        );
        let rec = sqlx::query_as::<_, Expense>(&sql)
            .bind(new_expense.external_id)
            .bind(new_expense.category_id)
            .bind(new_expense.amount)
            .bind(&new_expense.memo)
            .bind(new_expense.spent_on)
            .fetch_one(&self.pool)
            .await?;
        Ok(rec)
    }

    async fn list_expenses(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<Expense>> {
        let sql = format!(
            "SELECT {EXPENSE_COLUMNS} FROM expenses \
             WHERE ($1::date IS NULL OR spent_on >= $1) AND ($2::date IS NULL OR spent_on < $2) \
             ORDER BY spent_on DESC"
        );
        let recs = sqlx::query_as::<_, Expense>(&sql)
            .bind(from)
            .bind(to)
            .fetch_all(&self.pool)
            .await?;
        Ok(recs)
    }

    async fn delete_expense(&self, expense_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM expenses WHERE expense_id = $1")
            .bind(expense_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn total_in_range(&self, from: NaiveDate, to: NaiveDate) -> Result<Decimal> {
        let total: Decimal = sqlx::query_scalar(
            "SELECT COALESCE(SUM(amount), 0) FROM expenses WHERE spent_on >= $1 AND spent_on < $2",
        )
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }
}

pub struct PgStaffRepository {
    pub pool: PgPool,
}

impl PgStaffRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StaffRepository for PgStaffRepository {
    async fn insert_staff(&self, new_staff: NewStaff) -> Result<Staff> {
        let sql = format!(
            "INSERT INTO staff (external_id, username, full_name, role, tenant, password_hash) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {STAFF_COLUMNS}"
        );
        let rec = sqlx::query_as::<_, Staff>(&sql)
            .bind(new_staff.external_id)
            .bind(&new_staff.username)
            .bind(&new_staff.full_name)
            .bind(new_staff.role)
            .bind(&new_staff.tenant)
            .bind(&new_staff.password_hash)
            .fetch_one(&self.pool)
            .await?;
        Ok(rec)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Staff>> {
        let sql = format!("SELECT {STAFF_COLUMNS} FROM staff WHERE username = $1");
        let rec = sqlx::query_as::<_, Staff>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(rec)
    }

    async fn find_by_id(&self, staff_id: i64) -> Result<Option<Staff>> {
        let sql = format!("SELECT {STAFF_COLUMNS} FROM staff WHERE staff_id = $1");
        let rec = sqlx::query_as::<_, Staff>(&sql)
            .bind(staff_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(rec)
    }

    async fn list_by_role(&self, role: StaffRole) -> Result<Vec<Staff>> {
        let sql = format!("SELECT {STAFF_COLUMNS} FROM staff WHERE role = $1 ORDER BY username");
        let recs = sqlx::query_as::<_, Staff>(&sql)
            .bind(role)
            .fetch_all(&self.pool)
            .await?;
        Ok(recs)
    }

    async fn update_password(&self, staff_id: i64, password_hash: &str) -> Result<()> {
        sqlx::query("UPDATE staff SET password_hash = $2, updated_at = NOW() WHERE staff_id = $1")
            .bind(staff_id)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

pub struct PgWalletRepository {
    pub pool: PgPool,
}

impl PgWalletRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WalletRepository for PgWalletRepository {
    async fn find_for_staff(&self, staff_id: i64) -> Result<Option<Wallet>> {
        let rec = sqlx::query_as::<_, Wallet>(
            "SELECT wallet_id, staff_id, balance, updated_at FROM wallets WHERE staff_id = $1",
        )
        .bind(staff_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(rec)
    }

    async fn apply_delta(&self, staff_id: i64, delta: Decimal) -> Result<Wallet> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO wallets (staff_id, balance) VALUES ($1, 0) ON CONFLICT (staff_id) DO NOTHING")
            .bind(staff_id)
            .execute(&mut *tx)
            .await?;

        let balance: Decimal =
            sqlx::query_scalar("SELECT balance FROM wallets WHERE staff_id = $1 FOR UPDATE")
                .bind(staff_id)
                .fetch_one(&mut *tx)
                .await?;

        let new_balance = balance + delta;
        if new_balance < Decimal::ZERO {
            return Err(CoreError::invalid(format!(
                "insufficient wallet balance: {}",
                balance
            )));
        }

        let rec = sqlx::query_as::<_, Wallet>(
            "UPDATE wallets SET balance = $2, updated_at = NOW() WHERE staff_id = $1 \
             RETURNING wallet_id, staff_id, balance, updated_at",
        )
        .bind(staff_id)
        .bind(new_balance)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(rec)
    }
}

pub struct PgSequenceRepository {
    pub pool: PgPool,
}

impl PgSequenceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SequenceRepository for PgSequenceRepository {
    async fn next_value(&self, name: &str) -> Result<i64> {
        let value: i64 = sqlx::query_scalar(
            "INSERT INTO sequences (name, value) VALUES ($1, 1) \
             ON CONFLICT (name) DO UPDATE SET value = sequences.value + 1 \
             RETURNING value",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok(value)
    }
}

pub struct PgRevenueRepository {
    pub pool: PgPool,
}

impl PgRevenueRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RevenueRepository for PgRevenueRepository {
    async fn upsert_snapshot(&self, snapshot: NewRevenueSnapshot) -> Result<RevenueSnapshot> {
        let rec = sqlx::query_as::<_, RevenueSnapshot>(
            "INSERT INTO revenue_snapshots (year, month, interest_revenue, expense_total, net_revenue) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (year, month) DO UPDATE SET \
               interest_revenue = EXCLUDED.interest_revenue, \
               expense_total = EXCLUDED.expense_total, \
               net_revenue = EXCLUDED.net_revenue, \
               computed_at = NOW() \
             RETURNING snapshot_id, year, month, interest_revenue, expense_total, net_revenue, computed_at",
        )
        .bind(snapshot.year)
        .bind(snapshot.month)
        .bind(snapshot.interest_revenue)
        .bind(snapshot.expense_total)
        .bind(snapshot.net_revenue)
        .fetch_one(&self.pool)
        .await?;
        Ok(rec)
    }

    async fn list_for_year(&self, year: i32) -> Result<Vec<RevenueSnapshot>> {
        let recs = sqlx::query_as::<_, RevenueSnapshot>(
            "SELECT snapshot_id, year, month, interest_revenue, expense_total, net_revenue, computed_at \
             FROM revenue_snapshots WHERE year = $1 ORDER BY month",
        )
        .bind(year)
        .fetch_all(&self.pool)
        .await?;
        Ok(recs)
    }
}
