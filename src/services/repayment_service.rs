use crate::domain::{LoanStatus, RepaymentStatus, TransactionKind};
use crate::repository::{
    AccountRepository, LoanRepository, NewLedgerEntry, Repayment, RepaymentRepository,
};
use crate::services::CoreError;
use anyhow::Result;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, Serialize)]
pub struct CollectionResult {
    pub repayment: Repayment,
    pub repayment_status: RepaymentStatus,
}

#[derive(Clone)]
pub struct RepaymentService<R: RepaymentRepository, L: LoanRepository, A: AccountRepository> {
    pub repayments: Arc<R>,
    pub loans: Arc<L>,
    pub accounts: Arc<A>,
}

impl<R: RepaymentRepository, L: LoanRepository, A: AccountRepository> RepaymentService<R, L, A> {
    pub fn new(repayments: Arc<R>, loans: Arc<L>, accounts: Arc<A>) -> Self {
        Self {
            repayments,
            loans,
            accounts,
        }
    }

    pub async fn schedule(&self, loan_no: &str) -> Result<Vec<Repayment>> {
        self.find_loan(loan_no).await?;
        self.repayments.list_for_loan(loan_no).await
    }

    /// Collects one installment: posts the due amount as a deposit on the
    /// loan's linked account and marks the installment paid. The plan flips
    /// to `completed` with the final installment.
    pub async fn collect(&self, loan_no: &str, installment: i32) -> Result<CollectionResult> {
        let loan = self.find_loan(loan_no).await?;
        if loan.status != LoanStatus::Approved {
            return Err(CoreError::conflict(format!(
                "loan `{}` is {}, not approved",
                loan_no, loan.status
            )));
        }

        let repayment = self
            .repayments
            .find_installment(loan_no, installment)
            .await?
            .ok_or_else(|| {
                CoreError::not_found(format!(
                    "installment {} of loan `{}` not found",
                    installment, loan_no
                ))
            })?;
        if repayment.paid {
            return Err(CoreError::conflict(format!(
                "installment {} of loan `{}` is already paid",
                installment, loan_no
            )));
        }

        self.accounts
            .post_entry(NewLedgerEntry {
                account_no: loan.account_no.clone(),
                kind: TransactionKind::Deposit,
                amount: repayment.due_amount,
                memo: format!("repayment of loan {}", loan_no),
                reference: format!("{}/{}", loan_no, installment),
            })
            .await?;

        self.repayments.mark_paid(loan_no, installment).await?;

        let repayment = self
            .repayments
            .find_installment(loan_no, installment)
            .await?
            .ok_or_else(|| CoreError::not_found("installment vanished during collection"))?;

        let outstanding = self.repayments.count_outstanding(loan_no).await?;
        let repayment_status = if outstanding == 0 {
            RepaymentStatus::Completed
        } else {
            RepaymentStatus::Ongoing
        };

        Ok(CollectionResult {
            repayment,
            repayment_status,
        })
    }

    async fn find_loan(&self, loan_no: &str) -> Result<crate::repository::Loan> {
        self.loans
            .find_by_loan_no(loan_no)
            .await?
            .ok_or_else(|| CoreError::not_found(format!("loan `{}` not found", loan_no)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{NewAccount, NewLoan, NewRepayment};
    use crate::services::account_service::mock::MockAccountRepository;
    use crate::services::loan_service::mock::{MockLoanRepository, MockRepaymentRepository};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    type TestService =
        RepaymentService<MockRepaymentRepository, MockLoanRepository, MockAccountRepository>;

    async fn service_with_approved_loan() -> TestService {
        let loans = Arc::new(MockLoanRepository::new());
        let repayments = Arc::new(loans.repayment_repo());
        let accounts = Arc::new(MockAccountRepository::new());

        accounts
            .insert_account(NewAccount {
                external_id: Uuid::new_v4(),
                account_no: "ACC-000001".to_string(),
                member_no: "MBR-000001".to_string(),
                balance: Decimal::ZERO,
            })
            .await
            .unwrap();

        let loan = loans
            .insert_loan(NewLoan {
                external_id: Uuid::new_v4(),
                loan_no: "LN-000001".to_string(),
                member_no: "MBR-000001".to_string(),
                account_no: "ACC-000001".to_string(),
                principal: dec!(200.00),
                interest_rate: dec!(10.00),
                term_months: 2,
            })
            .await
            .unwrap();
        loans
            .approve_pending(
                &loan.loan_no,
                chrono::Utc::now(),
                vec![
                    NewRepayment {
                        loan_no: "LN-000001".to_string(),
                        installment: 1,
                        due_date: NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
                        due_amount: dec!(110.00),
                    },
                    NewRepayment {
                        loan_no: "LN-000001".to_string(),
                        installment: 2,
                        due_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
                        due_amount: dec!(110.00),
                    },
                ],
            )
            .await
            .unwrap();

        RepaymentService::new(repayments, loans, accounts)
    }

    #[tokio::test]
    async fn test_collect_posts_deposit_and_marks_paid() {
        let service = service_with_approved_loan().await;

        let result = service.collect("LN-000001", 1).await.unwrap();
        assert!(result.repayment.paid);
        assert!(result.repayment.paid_at.is_some());
        assert_eq!(result.repayment_status, RepaymentStatus::Ongoing);

        // Ledger received the due amount
        let account = service
            .accounts
            .find_by_account_no("ACC-000001")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(account.balance, dec!(110.00));

        let entries = service.accounts.list_entries("ACC-000001").await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].reference, "LN-000001/1");
    }

    #[tokio::test]
    async fn test_final_collection_completes_plan() {
        let service = service_with_approved_loan().await;

        service.collect("LN-000001", 1).await.unwrap();
        let result = service.collect("LN-000001", 2).await.unwrap();

        assert_eq!(result.repayment_status, RepaymentStatus::Completed);
    }

    #[tokio::test]
    async fn test_collect_twice_is_conflict() {
        let service = service_with_approved_loan().await;

        service.collect("LN-000001", 1).await.unwrap();
        let err = service.collect("LN-000001", 1).await.unwrap_err();

        assert!(matches!(
            err.downcast_ref::<CoreError>(),
            Some(CoreError::Conflict(_))
        ));

        // No double deposit
        let account = service
            .accounts
            .find_by_account_no("ACC-000001")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(account.balance, dec!(110.00));
    }

    #[tokio::test]
    async fn test_collect_on_pending_loan_is_conflict() {
        let service = service_with_approved_loan().await;
        let loans = service.loans.clone();

        let pending = loans
            .insert_loan(NewLoan {
                external_id: Uuid::new_v4(),
                loan_no: "LN-000002".to_string(),
                member_no: "MBR-000001".to_string(),
                account_no: "ACC-000001".to_string(),
                principal: dec!(100.00),
                interest_rate: dec!(5.00),
                term_months: 1,
            })
            .await
            .unwrap();

        let err = service.collect(&pending.loan_no, 1).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CoreError>(),
            Some(CoreError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_collect_unknown_installment_is_not_found() {
        let service = service_with_approved_loan().await;
        let err = service.collect("LN-000001", 9).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CoreError>(),
            Some(CoreError::NotFound(_))
        ));
    }
}
