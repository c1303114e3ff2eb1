use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of a loan. Transitions are centralized in
/// [`LoanStatus::can_transition`]; nothing else may change a loan's status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "PascalCase")]
pub enum LoanStatus {
    Pending,
    Approved,
    Cancelled,
}

impl LoanStatus {
    /// Allowed transitions: Pending -> Approved | Cancelled.
    /// Approved and Cancelled are terminal.
    pub fn can_transition(self, to: LoanStatus) -> bool {
        matches!(
            (self, to),
            (LoanStatus::Pending, LoanStatus::Approved)
                | (LoanStatus::Pending, LoanStatus::Cancelled)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Pending => "Pending",
            LoanStatus::Approved => "Approved",
            LoanStatus::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Repayment plan state for a loan: ongoing until every installment is paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RepaymentStatus {
    Ongoing,
    Completed,
}

impl fmt::Display for RepaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepaymentStatus::Ongoing => f.write_str("ongoing"),
            RepaymentStatus::Completed => f.write_str("completed"),
        }
    }
}

/// Direction of a ledger entry against a savings account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "PascalCase")]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionKind::Deposit => f.write_str("Deposit"),
            TransactionKind::Withdrawal => f.write_str("Withdrawal"),
        }
    }
}

/// Organizational role of a staff record. All roles live in the shared
/// staff table and differ only by this field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "PascalCase")]
pub enum StaffRole {
    Manager,
    Agent,
    Branch,
}

impl StaffRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            StaffRole::Manager => "Manager",
            StaffRole::Agent => "Agent",
            StaffRole::Branch => "Branch",
        }
    }
}

impl std::str::FromStr for StaffRole {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Manager" => Ok(StaffRole::Manager),
            "Agent" => Ok(StaffRole::Agent),
            "Branch" => Ok(StaffRole::Branch),
            other => Err(anyhow::anyhow!("unknown staff role: `{}`", other)),
        }
    }
}

impl fmt::Display for StaffRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
