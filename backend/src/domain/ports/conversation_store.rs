//! Port for conversation history and feedback.
use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::vet::{ConversationRecord, Feedback};

use super::define_port_error;

define_port_error! {
    /// Errors raised by conversation store adapters.
    pub enum ConversationStoreError {
        /// Store could not be reached.
        Unavailable { message: String } => "conversation store unavailable: {message}" => unavailable,
    }
}

/// A window onto one session's history.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryPage {
    /// Records in the window, oldest first.
    pub records: Vec<ConversationRecord>,
    /// Records held for the session.
    pub total: usize,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Append a record to its session.
    async fn save(&self, record: ConversationRecord) -> Result<(), ConversationStoreError>;

    /// Records `[offset, offset + limit)` of a session; the whole remainder
    /// when `limit` is `None`.
    async fn history(
        &self,
        session_id: Uuid,
        offset: usize,
        limit: Option<usize>,
    ) -> Result<HistoryPage, ConversationStoreError>;

    /// Forget a session.
    async fn clear(&self, session_id: Uuid) -> Result<(), ConversationStoreError>;

    /// Number of sessions held.
    async fn session_count(&self) -> Result<usize, ConversationStoreError>;

    /// Keep owner feedback.
    async fn save_feedback(&self, feedback: Feedback) -> Result<(), ConversationStoreError>;

    /// Number of feedback entries kept.
    async fn feedback_count(&self) -> Result<usize, ConversationStoreError>;
}
