pub mod accounts;
pub mod auth;
pub mod expenses;
pub mod health;
pub mod loans;
pub mod members;
pub mod reports;
pub mod wallets;
