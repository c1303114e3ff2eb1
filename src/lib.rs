pub mod api;
pub mod domain;
pub mod handler;
pub mod repository;
pub mod services;
pub mod tenant;

// re-exports for ease
pub use repository::*;
pub use services::*;
