//! Backend library shared by the `vet-bot` and `adventure-api` services.
//!
//! The crate follows a hexagonal layout: [`domain`] holds the business rules
//! and ports, [`inbound`] adapts HTTP requests onto them, [`outbound`]
//! implements the ports, and [`server`] composes everything into runnable
//! Actix apps.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;
#[cfg(test)]
mod test_support;

pub use domain::TraceId;
