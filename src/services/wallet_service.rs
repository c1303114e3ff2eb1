use crate::repository::{Wallet, WalletRepository};
use crate::services::CoreError;
use anyhow::Result;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Clone, Deserialize)]
pub struct WalletMovementRequest {
    pub amount: Decimal,
}

#[derive(Clone)]
pub struct WalletService<W: WalletRepository> {
    pub repo: Arc<W>,
}

impl<W: WalletRepository> WalletService<W> {
    pub fn new(repo: Arc<W>) -> Self {
        Self { repo }
    }

    pub async fn get(&self, staff_id: i64) -> Result<Wallet> {
        match self.repo.find_for_staff(staff_id).await? {
            Some(wallet) => Ok(wallet),
            // A zero delta creates the row without moving any money.
            None => self.repo.apply_delta(staff_id, Decimal::ZERO).await,
        }
    }

    pub async fn top_up(&self, staff_id: i64, req: WalletMovementRequest) -> Result<Wallet> {
        if req.amount <= Decimal::ZERO {
            return Err(CoreError::invalid("top-up amount must be positive"));
        }
        self.repo.apply_delta(staff_id, req.amount).await
    }

    pub async fn withdraw(&self, staff_id: i64, req: WalletMovementRequest) -> Result<Wallet> {
        if req.amount <= Decimal::ZERO {
            return Err(CoreError::invalid("withdrawal amount must be positive"));
        }
        let wallet = self.get(staff_id).await?;
        if wallet.balance < req.amount {
            return Err(CoreError::invalid(format!(
                "insufficient wallet balance: {}",
                wallet.balance
            )));
        }
        self.repo.apply_delta(staff_id, -req.amount).await
    }
}
