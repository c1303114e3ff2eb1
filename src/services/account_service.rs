use crate::domain::TransactionKind;
use crate::repository::{
    Account, AccountRepository, LedgerEntry, MemberRepository, NewAccount, NewLedgerEntry,
    SequenceRepository,
};
use crate::services::id_service::IdService;
use crate::services::CoreError;
use anyhow::Result;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAccountRequest {
    pub member_no: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostingRequest {
    pub amount: Decimal,
    pub memo: Option<String>,
}

#[derive(Clone)]
pub struct AccountService<A: AccountRepository, M: MemberRepository, S: SequenceRepository> {
    pub accounts: Arc<A>,
    pub members: Arc<M>,
    pub ids: IdService<S>,
}

impl<A: AccountRepository, M: MemberRepository, S: SequenceRepository> AccountService<A, M, S> {
    pub fn new(accounts: Arc<A>, members: Arc<M>, ids: IdService<S>) -> Self {
        Self {
            accounts,
            members,
            ids,
        }
    }

    pub async fn open(&self, req: OpenAccountRequest) -> Result<Account> {
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

        let account_no = self.ids.next_account_no().await?;
        self.accounts
            .insert_account(NewAccount {
                external_id: Uuid::new_v4(),
                account_no,
                member_no: member.member_no,
                balance: Decimal::ZERO,
            })
            .await
    }

    pub async fn get(&self, account_no: &str) -> Result<Account> {
        self.accounts
            .find_by_account_no(account_no)
            .await?
            .ok_or_else(|| CoreError::not_found(format!("account `{}` not found", account_no)))
    }

    pub async fn list_for_member(&self, member_no: &str) -> Result<Vec<Account>> {
        self.accounts.list_for_member(member_no).await
    }

    pub async fn deposit(&self, account_no: &str, req: PostingRequest) -> Result<LedgerEntry> {
        self.post(account_no, TransactionKind::Deposit, req).await
    }

    pub async fn withdraw(&self, account_no: &str, req: PostingRequest) -> Result<LedgerEntry> {
        self.post(account_no, TransactionKind::Withdrawal, req).await
    }

    pub async fn statement(&self, account_no: &str) -> Result<Vec<LedgerEntry>> {
        // Surface a 404 rather than an empty statement for unknown accounts
        self.get(account_no).await?;
        self.accounts.list_entries(account_no).await
    }

    async fn post(
        &self,
        account_no: &str,
        kind: TransactionKind,
        req: PostingRequest,
    ) -> Result<LedgerEntry> {
        if req.amount <= Decimal::ZERO {
            return Err(CoreError::invalid("amount must be positive"));
        }

        let account = self.get(account_no).await?;
        if kind == TransactionKind::Withdrawal && req.amount > account.balance {
            return Err(CoreError::invalid(format!(
                "insufficient balance: {}",
                account.balance
            )));
        }

        let reference = self.ids.next_reference().await?;
        self.accounts
            .post_entry(NewLedgerEntry {
                account_no: account.account_no,
                kind,
                amount: req.amount,
                memo: req.memo.unwrap_or_default(),
                reference,
            })
            .await
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use crate::repository::{Member, MemberUpdate, NewMember};
    use anyhow::anyhow;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::Mutex;

    pub struct MockAccountRepository {
        pub accounts: Mutex<Vec<Account>>,
        pub entries: Mutex<Vec<LedgerEntry>>,
    }

    impl MockAccountRepository {
        pub fn new() -> Self {
            Self {
                accounts: Mutex::new(Vec::new()),
                entries: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl AccountRepository for MockAccountRepository {
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

            let balance_after = match entry.kind {
                TransactionKind::Deposit => account.balance + entry.amount,
                TransactionKind::Withdrawal => {
                    if entry.amount > account.balance {
                        return Err(anyhow!("insufficient balance: {}", account.balance));
                    }
                    account.balance - entry.amount
                }
            };
            account.balance = balance_after;

            let mut entries = self.entries.lock().unwrap();
            let ledger_entry = LedgerEntry {
                entry_id: (entries.len() + 1) as i64,
                external_id: Uuid::new_v4(),
                account_no: entry.account_no,
                kind: entry.kind,
                amount: entry.amount,
                balance_after,
                memo: entry.memo,
                reference: entry.reference,
                posted_at: Utc::now(),
            };
            entries.push(ledger_entry.clone());
            Ok(ledger_entry)
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

    pub struct MockMemberRepository {
        pub members: Mutex<Vec<Member>>,
    }

    impl MockMemberRepository {
        pub fn with_member(member_no: &str, active: bool) -> Self {
            let member = Member {
                member_id: 1,
                external_id: Uuid::new_v4(),
                member_no: member_no.to_string(),
                full_name: "Amina Yusuf".to_string(),
                phone: None,
                address: None,
                branch: None,
                active,
                enrolled_at: Utc::now(),
                updated_at: Utc::now(),
            };
            Self {
                members: Mutex::new(vec![member]),
            }
        }
    }

    #[async_trait]
    impl MemberRepository for MockMemberRepository {
        async fn insert_member(&self, _new_member: NewMember) -> Result<Member> {
            unimplemented!()
        }

        async fn find_by_member_no(&self, member_no: &str) -> Result<Option<Member>> {
            let members = self.members.lock().unwrap();
            Ok(members.iter().find(|m| m.member_no == member_no).cloned())
        }

        async fn list_members(&self, _branch: Option<&str>) -> Result<Vec<Member>> {
            Ok(Vec::new())
        }

        async fn update_member(
            &self,
            _member_no: &str,
            _update: MemberUpdate,
        ) -> Result<Option<Member>> {
            Ok(None)
        }

        async fn set_active(&self, _member_no: &str, _active: bool) -> Result<bool> {
            Ok(false)
        }
    }

    pub struct MockSequenceRepository {
        pub counters: Mutex<HashMap<String, i64>>,
    }

    impl MockSequenceRepository {
        pub fn new() -> Self {
            Self {
                counters: Mutex::new(HashMap::new()),
            }
        }
    }

    #[async_trait]
    impl SequenceRepository for MockSequenceRepository {
        async fn next_value(&self, name: &str) -> Result<i64> {
            let mut counters = self.counters.lock().unwrap();
            let value = counters.entry(name.to_string()).or_insert(0);
            *value += 1;
            Ok(*value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::{MockAccountRepository, MockMemberRepository, MockSequenceRepository};
    use super::*;
    use rust_decimal_macros::dec;

    fn service(
        member_active: bool,
    ) -> AccountService<MockAccountRepository, MockMemberRepository, MockSequenceRepository> {
        AccountService::new(
            Arc::new(MockAccountRepository::new()),
            Arc::new(MockMemberRepository::with_member("MBR-000001", member_active)),
            IdService::new(Arc::new(MockSequenceRepository::new())),
        )
    }

    #[tokio::test]
    async fn test_open_account_for_active_member() {
        let service = service(true);
        let account = service
            .open(OpenAccountRequest {
                member_no: "MBR-000001".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(account.account_no, "ACC-000001");
        assert_eq!(account.balance, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_open_account_rejects_inactive_member() {
        let service = service(false);
        let err = service
            .open(OpenAccountRequest {
                member_no: "MBR-000001".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<CoreError>(),
            Some(CoreError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_deposit_then_withdraw_updates_balance() {
        let service = service(true);
        let account = service
            .open(OpenAccountRequest {
                member_no: "MBR-000001".to_string(),
            })
            .await
            .unwrap();

        let deposit = service
            .deposit(
                &account.account_no,
                PostingRequest {
                    amount: dec!(150.00),
                    memo: Some("initial savings".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(deposit.balance_after, dec!(150.00));

        let withdrawal = service
            .withdraw(
                &account.account_no,
                PostingRequest {
                    amount: dec!(40.00),
                    memo: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(withdrawal.balance_after, dec!(110.00));

        let statement = service.statement(&account.account_no).await.unwrap();
        assert_eq!(statement.len(), 2);

        // Stored balance equals the sum of ledger entries
        let fetched = service.get(&account.account_no).await.unwrap();
        assert_eq!(fetched.balance, dec!(110.00));
    }

    #[tokio::test]
    async fn test_withdraw_rejects_overdraw() {
        let service = service(true);
        let account = service
            .open(OpenAccountRequest {
                member_no: "MBR-000001".to_string(),
            })
            .await
            .unwrap();

        service
            .deposit(
                &account.account_no,
                PostingRequest {
                    amount: dec!(25.00),
                    memo: None,
                },
            )
            .await
            .unwrap();

        let err = service
            .withdraw(
                &account.account_no,
                PostingRequest {
                    amount: dec!(100.00),
                    memo: None,
                },
            )
            .await
            .unwrap_err();

        assert!(err.to_string().contains("25.00"));

        // No ledger row was written for the rejected withdrawal
        let statement = service.statement(&account.account_no).await.unwrap();
        assert_eq!(statement.len(), 1);
    }

    #[tokio::test]
    async fn test_non_positive_amounts_rejected() {
        let service = service(true);
        let account = service
            .open(OpenAccountRequest {
                member_no: "MBR-000001".to_string(),
            })
            .await
            .unwrap();

        for amount in [Decimal::ZERO, dec!(-5.00)] {
            let err = service
                .deposit(
                    &account.account_no,
                    PostingRequest {
                        amount,
                        memo: None,
                    },
                )
                .await
                .unwrap_err();
            assert!(matches!(
                err.downcast_ref::<CoreError>(),
                Some(CoreError::Invalid(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_statement_for_unknown_account_is_not_found() {
        let service = service(true);
        let err = service.statement("ACC-424242").await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CoreError>(),
            Some(CoreError::NotFound(_))
        ));
    }
}
