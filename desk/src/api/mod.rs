//! JSON API handlers.

pub mod components;
pub mod error;
pub mod reports;
pub mod requests;
pub mod users;

pub use error::AppError;
