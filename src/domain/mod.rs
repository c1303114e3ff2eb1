pub mod ids;
pub mod staff;
pub mod status;

pub use ids::{AccountNumber, MemberNumber};
pub use staff::Password;
pub use status::{LoanStatus, RepaymentStatus, StaffRole, TransactionKind};
