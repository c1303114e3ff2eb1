use crate::domain::LoanStatus;
use crate::repository::{
    AccountRepository, Loan, LoanRepository, MemberRepository, NewLoan, NewRepayment, Repayment,
    RepaymentRepository, SequenceRepository,
};
use crate::services::id_service::IdService;
use crate::services::CoreError;
use anyhow::Result;
use chrono::{Months, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::RepaymentStatus;

#[derive(Debug, Clone, Deserialize)]
pub struct ApplyLoanRequest {
    pub member_no: String,
    pub account_no: String,
    pub principal: Decimal,
    pub interest_rate: Decimal,
    pub term_months: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoanDetail {
    pub loan: Loan,
    pub repayment_status: RepaymentStatus,
    pub schedule: Vec<Repayment>,
}

#[derive(Clone)]
pub struct LoanService<
    L: LoanRepository,
    R: RepaymentRepository,
    M: MemberRepository,
    A: AccountRepository,
    S: SequenceRepository,
> {
    pub loans: Arc<L>,
    pub repayments: Arc<R>,
    pub members: Arc<M>,
    pub accounts: Arc<A>,
    pub ids: IdService<S>,
}

impl<
        L: LoanRepository,
        R: RepaymentRepository,
        M: MemberRepository,
        A: AccountRepository,
        S: SequenceRepository,
    > LoanService<L, R, M, A, S>
{
    pub fn new(
        loans: Arc<L>,
        repayments: Arc<R>,
        members: Arc<M>,
        accounts: Arc<A>,
        ids: IdService<S>,
    ) -> Self {
        Self {
            loans,
            repayments,
            members,
            accounts,
            ids,
        }
    }

    pub async fn apply(&self, req: ApplyLoanRequest) -> Result<Loan> {
        if req.principal <= Decimal::ZERO {
            return Err(CoreError::invalid("principal must be positive"));
        }
        if req.interest_rate < Decimal::ZERO {
            return Err(CoreError::invalid("interest rate must not be negative"));
        }
        if req.term_months < 1 {
            return Err(CoreError::invalid("term must be at least one month"));
        }

        let member = self
            .members
            .find_by_member_no(&req.member_no)
            .await?
            .ok_or_else(|| CoreError::not_found(format!("member `{}` not found", req.member_no)))?;
        if !member.active {
            return Err(CoreError::conflict(format!(
                "member `{}` is not active",
                req.member_no
            )));
        }

        let account = self
            .accounts
            .find_by_account_no(&req.account_no)
            .await?
            .ok_or_else(|| {
                CoreError::not_found(format!("account `{}` not found", req.account_no))
            })?;
        if account.member_no != member.member_no {
            return Err(CoreError::invalid(format!(
                "account `{}` does not belong to member `{}`",
                req.account_no, req.member_no
            )));
        }

        let loan_no = self.ids.next_loan_no().await?;
        self.loans
            .insert_loan(NewLoan {
                external_id: Uuid::new_v4(),
                loan_no,
                member_no: member.member_no,
                account_no: account.account_no,
                principal: req.principal,
                interest_rate: req.interest_rate,
                term_months: req.term_months,
            })
            .await
    }

    pub async fn approve(&self, loan_no: &str) -> Result<Loan> {
        let loan = self.get(loan_no).await?;
        self.transition(&loan, LoanStatus::Approved)?;

        let approved_at = Utc::now();
        let schedule = build_schedule(&loan, approved_at.date_naive())?;
        if !self
            .loans
            .approve_pending(loan_no, approved_at, schedule)
            .await?
        {
            // A concurrent request moved the loan out of Pending between
            // our read and the write.
            return Err(CoreError::conflict(format!(
                "loan `{}` is no longer pending",
                loan_no
            )));
        }

        self.get(loan_no).await
    }

    pub async fn cancel(&self, loan_no: &str) -> Result<Loan> {
        let loan = self.get(loan_no).await?;
        self.transition(&loan, LoanStatus::Cancelled)?;

        if !self.loans.cancel_pending(loan_no).await? {
            return Err(CoreError::conflict(format!(
                "loan `{}` is no longer pending",
                loan_no
            )));
        }
        self.get(loan_no).await
    }

    pub async fn get(&self, loan_no: &str) -> Result<Loan> {
        self.loans
            .find_by_loan_no(loan_no)
            .await?
            .ok_or_else(|| CoreError::not_found(format!("loan `{}` not found", loan_no)))
    }

    pub async fn detail(&self, loan_no: &str) -> Result<LoanDetail> {
        let loan = self.get(loan_no).await?;
        let schedule = self.repayments.list_for_loan(loan_no).await?;
        let outstanding = self.repayments.count_outstanding(loan_no).await?;

        let repayment_status = if !schedule.is_empty() && outstanding == 0 {
            RepaymentStatus::Completed
        } else {
            RepaymentStatus::Ongoing
        };

        Ok(LoanDetail {
            loan,
            repayment_status,
            schedule,
        })
    }

    pub async fn list(&self, status: Option<LoanStatus>) -> Result<Vec<Loan>> {
        self.loans.list_loans(status).await
    }

    pub async fn list_for_member(&self, member_no: &str) -> Result<Vec<Loan>> {
        self.loans.list_for_member(member_no).await
    }

    fn transition(&self, loan: &Loan, to: LoanStatus) -> Result<()> {
        if !loan.status.can_transition(to) {
            return Err(CoreError::conflict(format!(
                "loan `{}` cannot move from {} to {}",
                loan.loan_no, loan.status, to
            )));
        }
        Ok(())
    }
}

/// Even monthly installments of `principal × (1 + interest%) / term`, first
/// due one month after approval. The last installment absorbs the rounding
/// remainder so the schedule sums exactly to the total.
fn build_schedule(loan: &Loan, approved_on: chrono::NaiveDate) -> Result<Vec<NewRepayment>> {
    let total = loan.principal
        * (Decimal::ONE + loan.interest_rate / Decimal::ONE_HUNDRED);
    let term = Decimal::from(loan.term_months);
    let per_installment = (total / term).round_dp(2);

    let mut schedule = Vec::with_capacity(loan.term_months as usize);
    let mut allocated = Decimal::ZERO;

    for installment in 1..=loan.term_months {
        let due_amount = if installment == loan.term_months {
            (total - allocated).round_dp(2)
        } else {
            per_installment
        };
        allocated += due_amount;

        let due_date = approved_on
            .checked_add_months(Months::new(installment as u32))
            .ok_or_else(|| CoreError::invalid("repayment date out of range"))?;

        schedule.push(NewRepayment {
            loan_no: loan.loan_no.clone(),
            installment,
            due_date,
            due_amount,
        });
    }

    Ok(schedule)
}
