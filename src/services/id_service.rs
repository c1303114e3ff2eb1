use crate::repository::SequenceRepository;
use anyhow::Result;
use std::sync::Arc;

/// Allocates formatted business identifiers from monotonic counters. One
/// counter per entity, so identifiers are unique and strictly increasing
/// even under concurrent requests.
#[derive(Clone)]
pub struct IdService<S: SequenceRepository> {
    pub repo: Arc<S>,
}

impl<S: SequenceRepository> IdService<S> {
    pub fn new(repo: Arc<S>) -> Self {
        Self { repo }
    }

    pub async fn next_member_no(&self) -> Result<String> {
        let value = self.repo.next_value("member").await?;
        Ok(format!("MBR-{:06}", value))
    }

    pub async fn next_account_no(&self) -> Result<String> {
        let value = self.repo.next_value("account").await?;
        Ok(format!("ACC-{:06}", value))
    }

    pub async fn next_loan_no(&self) -> Result<String> {
        let value = self.repo.next_value("loan").await?;
        Ok(format!("LN-{:06}", value))
    }

    pub async fn next_reference(&self) -> Result<String> {
        let value = self.repo.next_value("transaction").await?;
        Ok(format!("TXN-{:08}", value))
    }
}
