//! HTTP adapter: handlers, error mapping, and shared state.

pub mod attestations;
pub mod auth;
pub mod catalogue;
pub mod error;
pub mod health;
pub mod requests;
pub mod state;
pub mod users;

pub use error::{ApiError, ApiResult};
