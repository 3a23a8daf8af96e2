//! HTTP inbound adapter exposing REST endpoints.

pub mod error;
pub mod health;
pub mod identity;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

pub use crate::domain::ApiResult;
