//! HTTP inbound adapter exposing REST endpoints.
//!
//! [`vet`] serves the veterinary assistant and [`adventure`] the
//! outdoor-adventure API; the remaining modules are shared by both.

pub mod adventure;
pub mod error;
pub mod health;
pub mod schemas;
pub mod session;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod validation;
pub mod vet;

pub use error::ApiResult;
