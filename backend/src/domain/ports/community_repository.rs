//! Port for community posts, likes and comments.
use async_trait::async_trait;

use crate::domain::{Comment, CommunityPost, PostId, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by community repository adapters.
    pub enum CommunityPersistenceError {
        /// Repository could not be reached.
        Connection { message: String } => "community repository connection failed: {message}" => unavailable,
        /// Query or mutation failed during execution.
        Query { message: String } => "community repository query failed: {message}" => internal,
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommunityRepository: Send + Sync {
    /// All posts, newest first.
    async fn list_posts(&self) -> Result<Vec<CommunityPost>, CommunityPersistenceError>;

    /// Fetch one post.
    async fn find_post(
        &self,
        id: &PostId,
    ) -> Result<Option<CommunityPost>, CommunityPersistenceError>;

    /// Store a new post.
    async fn insert_post(&self, post: &CommunityPost) -> Result<(), CommunityPersistenceError>;

    /// Like the post for `user`, or remove an existing like. Returns
    /// whether the post is liked afterwards.
    async fn toggle_like(
        &self,
        post: &PostId,
        user: &UserId,
    ) -> Result<bool, CommunityPersistenceError>;

    /// Number of likes on a post.
    async fn like_count(&self, post: &PostId) -> Result<usize, CommunityPersistenceError>;

    /// Comments on a post, oldest first.
    async fn comments(&self, post: &PostId) -> Result<Vec<Comment>, CommunityPersistenceError>;

    /// Store a new comment.
    async fn insert_comment(&self, comment: &Comment) -> Result<(), CommunityPersistenceError>;
}
