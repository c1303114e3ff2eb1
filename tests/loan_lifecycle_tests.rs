use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use coopcredit::domain::{LoanStatus, RepaymentStatus, TransactionKind};
use coopcredit::repository::{
    Account, AccountRepository, DueRepayment, LedgerEntry, Loan, LoanRepository, Member,
    MemberRepository, MemberUpdate, NewAccount, NewLedgerEntry, NewLoan, NewMember, NewRepayment,
    Repayment, RepaymentRepository, SequenceRepository,
};
use coopcredit::services::account_service::{AccountService, OpenAccountRequest, PostingRequest};
use coopcredit::services::id_service::IdService;
use coopcredit::services::loan_service::{ApplyLoanRequest, LoanService};
use coopcredit::services::member_service::{EnrollMemberRequest, MemberService};
use coopcredit::services::repayment_service::RepaymentService;
use coopcredit::services::CoreError;

struct InMemoryMembers {
    members: Mutex<Vec<Member>>,
}

#[async_trait]
impl MemberRepository for InMemoryMembers {
    async fn insert_member(&self, new_member: NewMember) -> Result<Member> {
        let mut members = self.members.lock().unwrap();
        let member = Member {
            member_id: (members.len() + 1) as i64,
            external_id: new_member.external_id,
            member_no: new_member.member_no,
            full_name: new_member.full_name,
            phone: new_member.phone,
            address: new_member.address,
            branch: new_member.branch,
            active: true,
            enrolled_at: Utc::now(),
            updated_at: Utc::now(),
        };
        members.push(member.clone());
        Ok(member)
    }

    async fn find_by_member_no(&self, member_no: &str) -> Result<Option<Member>> {
        let members = self.members.lock().unwrap();
        Ok(members.iter().find(|m| m.member_no == member_no).cloned())
    }

    async fn list_members(&self, branch: Option<&str>) -> Result<Vec<Member>> {
        let members = self.members.lock().unwrap();
        Ok(members
            .iter()
            .filter(|m| branch.is_none() || m.branch.as_deref() == branch)
            .cloned()
            .collect())
    }

    async fn update_member(&self, member_no: &str, update: MemberUpdate) -> Result<Option<Member>> {
        let mut members = self.members.lock().unwrap();
        let Some(member) = members.iter_mut().find(|m| m.member_no == member_no) else {
            return Ok(None);
        };
        if let Some(full_name) = update.full_name {
            member.full_name = full_name;
        }
        if let Some(phone) = update.phone {
            member.phone = Some(phone);
        }
        if let Some(address) = update.address {
            member.address = Some(address);
        }
        if let Some(branch) = update.branch {
            member.branch = Some(branch);
        }
        member.updated_at = Utc::now();
        Ok(Some(member.clone()))
    }

    async fn set_active(&self, member_no: &str, active: bool) -> Result<bool> {
        let mut members = self.members.lock().unwrap();
        match members.iter_mut().find(|m| m.member_no == member_no) {
            Some(member) => {
                member.active = active;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

struct InMemoryAccounts {
    accounts: Mutex<Vec<Account>>,
    entries: Mutex<Vec<LedgerEntry>>,
}

#[async_trait]
impl AccountRepository for InMemoryAccounts {
    async fn insert_account(&self, new_account: NewAccount) -> Result<Account> {
        let mut accounts = self.accounts.lock().unwrap();
        let account = Account {
            account_id: (accounts.len() + 1) as i64,
            external_id: new_account.external_id,
            account_no: new_account.account_no,
            member_no: new_account.member_no,
            balance: new_account.balance,
            opened_at: Utc::now(),
            updated_at: Utc::now(),
        };
        accounts.push(account.clone());
        Ok(account)
    }

    async fn find_by_account_no(&self, account_no: &str) -> Result<Option<Account>> {
        let accounts = self.accounts.lock().unwrap();
        Ok(accounts.iter().find(|a| a.account_no == account_no).cloned())
    }

    async fn list_for_member(&self, member_no: &str) -> Result<Vec<Account>> {
        let accounts = self.accounts.lock().unwrap();
        Ok(accounts
            .iter()
            .filter(|a| a.member_no == member_no)
            .cloned()
            .collect())
    }

    async fn post_entry(&self, entry: NewLedgerEntry) -> Result<LedgerEntry> {
        let mut accounts = self.accounts.lock().unwrap();
        let account = accounts
            .iter_mut()
            .find(|a| a.account_no == entry.account_no)
            .ok_or_else(|| anyhow!("account not found"))?;

        let new_balance = match entry.kind {
            TransactionKind::Deposit => account.balance + entry.amount,
            TransactionKind::Withdrawal => {
                if entry.amount > account.balance {
                    return Err(CoreError::invalid(format!(
                        "insufficient balance: {}",
                        account.balance
                    )));
                }
                account.balance - entry.amount
            }
        };
        account.balance = new_balance;
        account.updated_at = Utc::now();

        let mut entries = self.entries.lock().unwrap();
        let record = LedgerEntry {
            entry_id: (entries.len() + 1) as i64,
            external_id: Uuid::new_v4(),
            account_no: entry.account_no,
            kind: entry.kind,
            amount: entry.amount,
            balance_after: new_balance,
            memo: entry.memo,
            reference: entry.reference,
            posted_at: Utc::now(),
        };
        entries.push(record.clone());
        Ok(record)
    }

    async fn list_entries(&self, account_no: &str) -> Result<Vec<LedgerEntry>> {
        let entries = self.entries.lock().unwrap();
        Ok(entries
            .iter()
            .filter(|e| e.account_no == account_no)
            .cloned()
            .collect())
    }
}

struct InMemoryLoans {
    loans: Mutex<Vec<Loan>>,
    schedule: Arc<Mutex<Vec<Repayment>>>,
}

#[async_trait]
impl LoanRepository for InMemoryLoans {
    async fn insert_loan(&self, new_loan: NewLoan) -> Result<Loan> {
        let mut loans = self.loans.lock().unwrap();
        let loan = Loan {
            loan_id: (loans.len() + 1) as i64,
            external_id: new_loan.external_id,
            loan_no: new_loan.loan_no,
            member_no: new_loan.member_no,
            account_no: new_loan.account_no,
            principal: new_loan.principal,
            interest_rate: new_loan.interest_rate,
            term_months: new_loan.term_months,
            status: LoanStatus::Pending,
            applied_at: Utc::now(),
            approved_at: None,
            updated_at: Utc::now(),
        };
        loans.push(loan.clone());
        Ok(loan)
    }

    async fn find_by_loan_no(&self, loan_no: &str) -> Result<Option<Loan>> {
        let loans = self.loans.lock().unwrap();
        Ok(loans.iter().find(|l| l.loan_no == loan_no).cloned())
    }

    async fn list_loans(&self, status: Option<LoanStatus>) -> Result<Vec<Loan>> {
        let loans = self.loans.lock().unwrap();
        Ok(loans
            .iter()
            .filter(|l| status.is_none() || Some(l.status) == status)
            .cloned()
            .collect())
    }

    async fn list_for_member(&self, member_no: &str) -> Result<Vec<Loan>> {
        let loans = self.loans.lock().unwrap();
        Ok(loans
            .iter()
            .filter(|l| l.member_no == member_no)
            .cloned()
            .collect())
    }

    async fn approve_pending(
        &self,
        loan_no: &str,
        approved_at: chrono::DateTime<Utc>,
        schedule: Vec<NewRepayment>,
    ) -> Result<bool> {
        let mut loans = self.loans.lock().unwrap();
        let Some(loan) = loans.iter_mut().find(|l| l.loan_no == loan_no) else {
            return Ok(false);
        };
        if loan.status != LoanStatus::Pending {
            return Ok(false);
        }
        loan.status = LoanStatus::Approved;
        loan.approved_at = Some(approved_at);
        loan.updated_at = Utc::now();

        let mut repayments = self.schedule.lock().unwrap();
        for new_repayment in schedule {
            let id = (repayments.len() + 1) as i64;
            repayments.push(Repayment {
                repayment_id: id,
                loan_no: new_repayment.loan_no,
                installment: new_repayment.installment,
                due_date: new_repayment.due_date,
                due_amount: new_repayment.due_amount,
                paid: false,
                paid_at: None,
            });
        }
        Ok(true)
    }

    async fn cancel_pending(&self, loan_no: &str) -> Result<bool> {
        let mut loans = self.loans.lock().unwrap();
        let Some(loan) = loans.iter_mut().find(|l| l.loan_no == loan_no) else {
            return Ok(false);
        };
        if loan.status != LoanStatus::Pending {
            return Ok(false);
        }
        loan.status = LoanStatus::Cancelled;
        loan.updated_at = Utc::now();
        Ok(true)
    }
}

struct InMemoryRepayments {
    repayments: Arc<Mutex<Vec<Repayment>>>,
}

#[async_trait]
impl RepaymentRepository for InMemoryRepayments {
    async fn list_for_loan(&self, loan_no: &str) -> Result<Vec<Repayment>> {
        let repayments = self.repayments.lock().unwrap();
        Ok(repayments
            .iter()
            .filter(|r| r.loan_no == loan_no)
            .cloned()
            .collect())
    }

    async fn find_installment(&self, loan_no: &str, installment: i32) -> Result<Option<Repayment>> {
        let repayments = self.repayments.lock().unwrap();
        Ok(repayments
            .iter()
            .find(|r| r.loan_no == loan_no && r.installment == installment)
            .cloned())
    }

    async fn mark_paid(&self, loan_no: &str, installment: i32) -> Result<bool> {
        let mut repayments = self.repayments.lock().unwrap();
        match repayments
            .iter_mut()
            .find(|r| r.loan_no == loan_no && r.installment == installment)
        {
            Some(repayment) => {
                repayment.paid = true;
                repayment.paid_at = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn count_outstanding(&self, loan_no: &str) -> Result<i64> {
        let repayments = self.repayments.lock().unwrap();
        Ok(repayments
            .iter()
            .filter(|r| r.loan_no == loan_no && !r.paid)
            .count() as i64)
    }

    async fn due_in_range(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<DueRepayment>> {
        let repayments = self.repayments.lock().unwrap();
        Ok(repayments
            .iter()
            .filter(|r| r.due_date >= from && r.due_date < to)
            .map(|r| DueRepayment {
                due_amount: r.due_amount,
                interest_rate: dec!(10),
            })
            .collect())
    }
}

struct InMemorySequences {
    counters: Mutex<HashMap<String, i64>>,
}

#[async_trait]
impl SequenceRepository for InMemorySequences {
    async fn next_value(&self, name: &str) -> Result<i64> {
        let mut counters = self.counters.lock().unwrap();
        let value = counters.entry(name.to_string()).or_insert(0);
        *value += 1;
        Ok(*value)
    }
}

struct Fixture {
    members: MemberService<InMemoryMembers, InMemorySequences>,
    accounts: AccountService<InMemoryAccounts, InMemoryMembers, InMemorySequences>,
    loans: LoanService<
        InMemoryLoans,
        InMemoryRepayments,
        InMemoryMembers,
        InMemoryAccounts,
        InMemorySequences,
    >,
    repayments: RepaymentService<InMemoryRepayments, InMemoryLoans, InMemoryAccounts>,
}

fn fixture() -> Fixture {
    let member_repo = Arc::new(InMemoryMembers {
        members: Mutex::new(Vec::new()),
    });
    let account_repo = Arc::new(InMemoryAccounts {
        accounts: Mutex::new(Vec::new()),
        entries: Mutex::new(Vec::new()),
    });
    let schedule = Arc::new(Mutex::new(Vec::new()));
    let loan_repo = Arc::new(InMemoryLoans {
        loans: Mutex::new(Vec::new()),
        schedule: schedule.clone(),
    });
    let repayment_repo = Arc::new(InMemoryRepayments {
        repayments: schedule,
    });
    let sequence_repo = Arc::new(InMemorySequences {
        counters: Mutex::new(HashMap::new()),
    });

    Fixture {
        members: MemberService::new(
            member_repo.clone(),
            IdService::new(sequence_repo.clone()),
        ),
        accounts: AccountService::new(
            account_repo.clone(),
            member_repo.clone(),
            IdService::new(sequence_repo.clone()),
        ),
        loans: LoanService::new(
            loan_repo.clone(),
            repayment_repo.clone(),
            member_repo,
            account_repo.clone(),
            IdService::new(sequence_repo),
        ),
        repayments: RepaymentService::new(repayment_repo, loan_repo, account_repo),
    }
}

#[tokio::test]
async fn full_loan_lifecycle() {
    let f = fixture();

    let member = f
        .members
        .enroll(EnrollMemberRequest {
            full_name: "Chidinma Obi".to_string(),
            phone: Some("08030000001".to_string()),
            address: None,
            branch: Some("west".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(member.member_no, "MBR-000001");

    let account = f
        .accounts
        .open(OpenAccountRequest {
            member_no: member.member_no.clone(),
        })
        .await
        .unwrap();
    assert_eq!(account.account_no, "ACC-000001");
    assert_eq!(account.balance, Decimal::ZERO);

    let entry = f
        .accounts
        .deposit(
            &account.account_no,
            PostingRequest {
                amount: dec!(500),
                memo: Some("opening deposit".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(entry.balance_after, dec!(500));

    let loan = f
        .loans
        .apply(ApplyLoanRequest {
            member_no: member.member_no.clone(),
            account_no: account.account_no.clone(),
            principal: dec!(1200),
            interest_rate: dec!(10),
            term_months: 12,
        })
        .await
        .unwrap();
    assert_eq!(loan.loan_no, "LN-000001");
    assert_eq!(loan.status, LoanStatus::Pending);

    // Collecting before approval is rejected
    let err = f.repayments.collect(&loan.loan_no, 1).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<CoreError>(),
        Some(CoreError::Conflict(_))
    ));

    let approved = f.loans.approve(&loan.loan_no).await.unwrap();
    assert_eq!(approved.status, LoanStatus::Approved);
    assert!(approved.approved_at.is_some());

    // 1200 at 10% over 12 months is 110.00 per installment
    let schedule = f.repayments.schedule(&loan.loan_no).await.unwrap();
    assert_eq!(schedule.len(), 12);
    assert!(schedule.iter().all(|r| r.due_amount == dec!(110.00)));

    for installment in 1..=11 {
        let result = f
            .repayments
            .collect(&loan.loan_no, installment)
            .await
            .unwrap();
        assert_eq!(result.repayment_status, RepaymentStatus::Ongoing);
        assert!(result.repayment.paid);
    }

    let last = f.repayments.collect(&loan.loan_no, 12).await.unwrap();
    assert_eq!(last.repayment_status, RepaymentStatus::Completed);

    // Double collection is rejected
    let err = f.repayments.collect(&loan.loan_no, 12).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<CoreError>(),
        Some(CoreError::Conflict(_))
    ));

    // All twelve repayments landed on the linked account
    let account = f.accounts.get(&account.account_no).await.unwrap();
    assert_eq!(account.balance, dec!(500) + dec!(1320.00));

    let detail = f.loans.detail(&loan.loan_no).await.unwrap();
    assert_eq!(detail.repayment_status, RepaymentStatus::Completed);
}

#[tokio::test]
async fn approving_twice_is_rejected() {
    let f = fixture();

    let member = f
        .members
        .enroll(EnrollMemberRequest {
            full_name: "Emeka Ude".to_string(),
            phone: None,
            address: None,
            branch: None,
        })
        .await
        .unwrap();
    let account = f
        .accounts
        .open(OpenAccountRequest {
            member_no: member.member_no.clone(),
        })
        .await
        .unwrap();
    let loan = f
        .loans
        .apply(ApplyLoanRequest {
            member_no: member.member_no,
            account_no: account.account_no,
            principal: dec!(300),
            interest_rate: dec!(5),
            term_months: 3,
        })
        .await
        .unwrap();

    f.loans.approve(&loan.loan_no).await.unwrap();

    let err = f.loans.approve(&loan.loan_no).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<CoreError>(),
        Some(CoreError::Conflict(_))
    ));

    // Terminal states also reject cancellation
    let err = f.loans.cancel(&loan.loan_no).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<CoreError>(),
        Some(CoreError::Conflict(_))
    ));
}

#[tokio::test]
async fn overdraw_is_rejected_without_a_ledger_row() {
    let f = fixture();

    let member = f
        .members
        .enroll(EnrollMemberRequest {
            full_name: "Funke Ajayi".to_string(),
            phone: None,
            address: None,
            branch: None,
        })
        .await
        .unwrap();
    let account = f
        .accounts
        .open(OpenAccountRequest {
            member_no: member.member_no,
        })
        .await
        .unwrap();

    f.accounts
        .deposit(
            &account.account_no,
            PostingRequest {
                amount: dec!(100),
                memo: None,
            },
        )
        .await
        .unwrap();

    let err = f
        .accounts
        .withdraw(
            &account.account_no,
            PostingRequest {
                amount: dec!(100.01),
                memo: None,
            },
        )
        .await
        .unwrap_err();
    match err.downcast_ref::<CoreError>() {
        Some(CoreError::Invalid(msg)) => assert!(msg.contains("100")),
        other => panic!("unexpected error: {:?}", other),
    }

    let statement = f.accounts.statement(&account.account_no).await.unwrap();
    assert_eq!(statement.len(), 1);
}

#[tokio::test]
async fn repository_overdraw_is_a_client_error() {
    // Posting straight through the repository, as a raced withdrawal that
    // passed the service pre-check would, must still surface as Invalid.
    let repo = InMemoryAccounts {
        accounts: Mutex::new(Vec::new()),
        entries: Mutex::new(Vec::new()),
    };
    repo.insert_account(NewAccount {
        external_id: Uuid::new_v4(),
        account_no: "ACC-000001".to_string(),
        member_no: "MBR-000001".to_string(),
        balance: dec!(20),
    })
    .await
    .unwrap();

    let err = repo
        .post_entry(NewLedgerEntry {
            account_no: "ACC-000001".to_string(),
            kind: TransactionKind::Withdrawal,
            amount: dec!(20.01),
            memo: String::new(),
            reference: String::new(),
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<CoreError>(),
        Some(CoreError::Invalid(_))
    ));
}

#[tokio::test]
async fn business_numbers_are_monotonic() {
    let f = fixture();

    let first = f
        .members
        .enroll(EnrollMemberRequest {
            full_name: "First".to_string(),
            phone: None,
            address: None,
            branch: None,
        })
        .await
        .unwrap();
    let second = f
        .members
        .enroll(EnrollMemberRequest {
            full_name: "Second".to_string(),
            phone: None,
            address: None,
            branch: None,
        })
        .await
        .unwrap();

    assert_eq!(first.member_no, "MBR-000001");
    assert_eq!(second.member_no, "MBR-000002");
}
