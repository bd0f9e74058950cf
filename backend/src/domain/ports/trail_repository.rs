//! Port for trail persistence.
use async_trait::async_trait;

use crate::domain::{Trail, TrailId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by trail repository adapters.
    pub enum TrailPersistenceError {
        /// Repository could not be reached.
        Connection { message: String } => "trail repository connection failed: {message}" => unavailable,
        /// Query or mutation failed during execution.
        Query { message: String } => "trail repository query failed: {message}" => internal,
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TrailRepository: Send + Sync {
    /// All trails, newest first.
    async fn list(&self) -> Result<Vec<Trail>, TrailPersistenceError>;

    /// Fetch one trail.
    async fn find(&self, id: &TrailId) -> Result<Option<Trail>, TrailPersistenceError>;

    /// Insert or replace a trail.
    async fn upsert(&self, trail: &Trail) -> Result<(), TrailPersistenceError>;

    /// Remove a trail; `false` when it did not exist.
    async fn delete(&self, id: &TrailId) -> Result<bool, TrailPersistenceError>;
}
