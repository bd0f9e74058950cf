//! `CommunityRepository` over process-local collections.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::ports::{CommunityPersistenceError, CommunityRepository};
use crate::domain::{Comment, CommunityPost, PostId, UserId};

#[derive(Debug, Default)]
struct CommunityTables {
    posts: HashMap<PostId, CommunityPost>,
    likes: HashSet<(PostId, UserId)>,
    comments: Vec<Comment>,
}

/// Posts, likes and comments held in memory.
#[derive(Debug, Default)]
pub struct InMemoryCommunityRepository {
    tables: RwLock<CommunityTables>,
}

#[async_trait]
impl CommunityRepository for InMemoryCommunityRepository {
    async fn list_posts(&self) -> Result<Vec<CommunityPost>, CommunityPersistenceError> {
        let mut posts: Vec<CommunityPost> =
            self.tables.read().await.posts.values().cloned().collect();
        posts.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(posts)
    }

    async fn find_post(
        &self,
        id: &PostId,
    ) -> Result<Option<CommunityPost>, CommunityPersistenceError> {
        Ok(self.tables.read().await.posts.get(id).cloned())
    }

    async fn insert_post(&self, post: &CommunityPost) -> Result<(), CommunityPersistenceError> {
        self.tables
            .write()
            .await
            .posts
            .insert(post.id.clone(), post.clone());
        Ok(())
    }

    async fn toggle_like(
        &self,
        post: &PostId,
        user: &UserId,
    ) -> Result<bool, CommunityPersistenceError> {
        let mut tables = self.tables.write().await;
        let key = (post.clone(), user.clone());
        if tables.likes.remove(&key) {
            return Ok(false);
        }
        tables.likes.insert(key);
        Ok(true)
    }

    async fn like_count(&self, post: &PostId) -> Result<usize, CommunityPersistenceError> {
        Ok(self
            .tables
            .read()
            .await
            .likes
            .iter()
            .filter(|(liked, _)| liked == post)
            .count())
    }

    async fn comments(&self, post: &PostId) -> Result<Vec<Comment>, CommunityPersistenceError> {
        let mut comments: Vec<Comment> = self
            .tables
            .read()
            .await
            .comments
            .iter()
            .filter(|comment| &comment.post_id == post)
            .cloned()
            .collect();
        comments.sort_by_key(|comment| comment.created_at);
        Ok(comments)
    }

    async fn insert_comment(&self, comment: &Comment) -> Result<(), CommunityPersistenceError> {
        self.tables.write().await.comments.push(comment.clone());
        Ok(())
    }
}
