//! Community posts, likes and comments.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use mockable::Clock;
use pagination::{PageRequest, Paginated};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::ports::{CommunityRepository, UserRepository};
use super::{CommentId, Error, PostId, User, UserId};

crate::domain::vocabulary::closed_vocabulary! {
    /// Kind of community post.
    pub enum PostType {
        /// A shared photo; earns the author points.
        Photo => "photo",
        /// A trip report.
        Story => "story",
        /// Advice for others.
        Tip => "tip",
        /// A question to the community.
        Question => "question",
    }
}

/// Longest post or comment body.
pub const CONTENT_MAX: usize = 2000;

/// Validation failures for community content.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommunityValidationError {
    /// Body was blank.
    #[error("content must not be empty")]
    EmptyContent,
    /// Body exceeded [`CONTENT_MAX`].
    #[error("content must be at most {CONTENT_MAX} characters")]
    ContentTooLong,
}

/// Non-empty post or comment body of at most [`CONTENT_MAX`] characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PostContent(String);

impl PostContent {
    /// Validate a body.
    ///
    /// # Errors
    /// Returns [`CommunityValidationError`] for blank or long bodies.
    pub fn new(raw: impl Into<String>) -> Result<Self, CommunityValidationError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(CommunityValidationError::EmptyContent);
        }
        if raw.chars().count() > CONTENT_MAX {
            return Err(CommunityValidationError::ContentTooLong);
        }
        Ok(Self(raw))
    }

    /// Borrow the text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A stored community post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityPost {
    pub id: PostId,
    pub user_id: UserId,
    #[serde(rename = "type")]
    pub post_type: PostType,
    pub content: String,
    pub image_url: Option<String>,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields of a post being created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub post_type: PostType,
    pub content: PostContent,
    pub image_url: Option<String>,
    pub location: Option<String>,
}

/// A post joined with its author and counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    #[serde(flatten)]
    pub post: CommunityPost,
    /// Author display name; `None` when the author no longer exists.
    pub user_name: Option<String>,
    pub user_avatar: Option<String>,
    pub likes_count: usize,
    /// Number of comments.
    pub comments: usize,
}

/// A comment on a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,
    pub post_id: PostId,
    pub user_id: UserId,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Result of toggling a like.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeOutcome {
    pub liked: bool,
    pub likes_count: usize,
}

/// Community use-cases.
#[derive(Clone)]
pub struct CommunityService {
    users: Arc<dyn UserRepository>,
    posts: Arc<dyn CommunityRepository>,
    clock: Arc<dyn Clock>,
}

impl CommunityService {
    /// Create the service.
    pub fn new(
        users: Arc<dyn UserRepository>,
        posts: Arc<dyn CommunityRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            posts,
            clock,
        }
    }

    /// One page of posts, newest first.
    ///
    /// # Errors
    /// Propagates repository failures.
    pub async fn list(&self, page: PageRequest) -> Result<Paginated<PostView>, Error> {
        let posts = self.posts.list_posts().await?;
        let window = page.paginate(&posts);
        let mut items = Vec::with_capacity(window.items.len());
        for post in window.items {
            items.push(self.view(post).await?);
        }
        Ok(Paginated {
            items,
            pagination: window.pagination,
        })
    }

    async fn view(&self, post: CommunityPost) -> Result<PostView, Error> {
        let author = self.users.find_by_id(&post.user_id).await?;
        let likes_count = self.posts.like_count(&post.id).await?;
        let comments = self.posts.comments(&post.id).await?.len();
        let (user_name, user_avatar) = author
            .map(|user| (Some(user.name), user.avatar_url))
            .unwrap_or_default();
        Ok(PostView {
            post,
            user_name,
            user_avatar,
            likes_count,
            comments,
        })
    }

    /// Publish a post as `author`. Photo posts award the author points.
    ///
    /// # Errors
    /// Returns `unauthorized` when the author no longer exists.
    pub async fn create(&self, author: &UserId, draft: NewPost) -> Result<PostId, Error> {
        let mut user = self.existing_user(author).await?;
        let now = self.clock.utc();
        let post = CommunityPost {
            id: PostId::random(),
            user_id: author.clone(),
            post_type: draft.post_type,
            content: draft.content.0,
            image_url: draft.image_url,
            location: draft.location,
            created_at: now,
        };
        self.posts.insert_post(&post).await?;
        if post.post_type == PostType::Photo {
            user.stats.record_photo_shared();
            user.updated_at = now;
            self.users.upsert(&user).await?;
            info!(user_id = %user.id, points = user.stats.points, "awarded photo points");
        }
        Ok(post.id)
    }

    /// Toggle `user`'s like on a post.
    ///
    /// # Errors
    /// Returns `not_found` for unknown posts.
    pub async fn toggle_like(&self, post: &PostId, user: &UserId) -> Result<LikeOutcome, Error> {
        self.existing_post(post).await?;
        let liked = self.posts.toggle_like(post, user).await?;
        let likes_count = self.posts.like_count(post).await?;
        Ok(LikeOutcome { liked, likes_count })
    }

    /// Comment on a post as `author`.
    ///
    /// # Errors
    /// Returns `not_found` for unknown posts.
    pub async fn add_comment(
        &self,
        post: &PostId,
        author: &UserId,
        content: PostContent,
    ) -> Result<Comment, Error> {
        self.existing_post(post).await?;
        let comment = Comment {
            id: CommentId::random(),
            post_id: post.clone(),
            user_id: author.clone(),
            content: content.0,
            created_at: self.clock.utc(),
        };
        self.posts.insert_comment(&comment).await?;
        Ok(comment)
    }

    /// Comments on a post, oldest first.
    ///
    /// # Errors
    /// Returns `not_found` for unknown posts.
    pub async fn comments(&self, post: &PostId) -> Result<Vec<Comment>, Error> {
        self.existing_post(post).await?;
        Ok(self.posts.comments(post).await?)
    }

    async fn existing_post(&self, id: &PostId) -> Result<CommunityPost, Error> {
        self.posts
            .find_post(id)
            .await?
            .ok_or_else(|| Error::not_found("Post not found"))
    }

    async fn existing_user(&self, id: &UserId) -> Result<User, Error> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::unauthorized("Session user no longer exists"))
    }
}
