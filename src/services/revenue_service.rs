use crate::repository::{
    ExpenseRepository, NewRevenueSnapshot, RepaymentRepository, RevenueRepository, RevenueSnapshot,
};
use crate::services::CoreError;
use anyhow::Result;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::sync::Arc;

#[derive(Clone)]
pub struct RevenueService<R: RepaymentRepository, E: ExpenseRepository, V: RevenueRepository> {
    pub repayments: Arc<R>,
    pub expenses: Arc<E>,
    pub snapshots: Arc<V>,
}

impl<R: RepaymentRepository, E: ExpenseRepository, V: RevenueRepository> RevenueService<R, E, V> {
    pub fn new(repayments: Arc<R>, expenses: Arc<E>, snapshots: Arc<V>) -> Self {
        Self {
            repayments,
            expenses,
            snapshots,
        }
    }

    /// Walks the twelve month windows of `year`, sums the interest portion
    /// (`due_amount × interest%`) of repayments due in each window, nets out
    /// the window's expenses, and stores one snapshot per month. Always
    /// returns twelve rows, zeros included.
    pub async fn compute_year(&self, year: i32) -> Result<Vec<RevenueSnapshot>> {
        let mut snapshots = Vec::with_capacity(12);

        for month in 1..=12u32 {
            let (from, to) = month_window(year, month)?;

            let due = self.repayments.due_in_range(from, to).await?;
            let interest_revenue: Decimal = due
                .iter()
                .map(|d| d.due_amount * d.interest_rate / Decimal::ONE_HUNDRED)
                .sum::<Decimal>()
                .round_dp(2);

            let expense_total = self.expenses.total_in_range(from, to).await?;
            let net_revenue = interest_revenue - expense_total;

            let snapshot = self
                .snapshots
                .upsert_snapshot(NewRevenueSnapshot {
                    year,
                    month: month as i32,
                    interest_revenue,
                    expense_total,
                    net_revenue,
                })
                .await?;
            snapshots.push(snapshot);
        }

        Ok(snapshots)
    }

    pub async fn snapshots_for_year(&self, year: i32) -> Result<Vec<RevenueSnapshot>> {
        self.snapshots.list_for_year(year).await
    }
}

fn month_window(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate)> {
    let from = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| CoreError::invalid(format!("invalid month {}-{}", year, month)))?;
    let to = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(|| CoreError::invalid(format!("invalid month {}-{}", year, month)))?;
    Ok((from, to))
}
