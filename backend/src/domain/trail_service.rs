//! Trail catalogue use-cases. Mutations are reserved for administrators.

use std::sync::Arc;

use mockable::Clock;
use tracing::info;

use super::ports::{TrailRepository, UserRepository};
use super::{Error, Trail, TrailDraft, TrailFilter, TrailId, UserId};

/// Trail use-cases.
#[derive(Clone)]
pub struct TrailService {
    trails: Arc<dyn TrailRepository>,
    users: Arc<dyn UserRepository>,
    clock: Arc<dyn Clock>,
}

impl TrailService {
    /// Create the service.
    pub fn new(
        trails: Arc<dyn TrailRepository>,
        users: Arc<dyn UserRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            trails,
            users,
            clock,
        }
    }

    /// Trails passing `filter`, newest first.
    ///
    /// # Errors
    /// Propagates repository failures.
    pub async fn list(&self, filter: &TrailFilter) -> Result<Vec<Trail>, Error> {
        let trails = self.trails.list().await?;
        Ok(trails.into_iter().filter(|t| filter.matches(t)).collect())
    }

    /// Number of trails.
    ///
    /// # Errors
    /// Propagates repository failures.
    pub async fn count(&self) -> Result<usize, Error> {
        Ok(self.trails.list().await?.len())
    }

    /// One trail.
    ///
    /// # Errors
    /// Returns `not_found` for unknown ids.
    pub async fn get(&self, id: &TrailId) -> Result<Trail, Error> {
        self.trails
            .find(id)
            .await?
            .ok_or_else(|| Error::not_found("Trail not found"))
    }

    /// Publish a trail.
    ///
    /// # Errors
    /// Returns `forbidden` unless `actor` is an administrator.
    pub async fn create(&self, actor: &UserId, draft: TrailDraft) -> Result<TrailId, Error> {
        self.require_admin(actor).await?;
        let trail = Trail::from_draft(TrailId::random(), draft, self.clock.utc());
        self.trails.upsert(&trail).await?;
        info!(trail_id = %trail.id, actor_id = %actor, "trail created");
        Ok(trail.id)
    }

    /// Replace a trail's fields.
    ///
    /// # Errors
    /// `forbidden` for non-administrators, `not_found` for unknown ids.
    pub async fn update(
        &self,
        actor: &UserId,
        id: &TrailId,
        draft: TrailDraft,
    ) -> Result<(), Error> {
        self.require_admin(actor).await?;
        let mut trail = self.get(id).await?;
        trail.replace_with(draft, self.clock.utc());
        self.trails.upsert(&trail).await?;
        info!(trail_id = %id, actor_id = %actor, "trail updated");
        Ok(())
    }

    /// Remove a trail.
    ///
    /// # Errors
    /// `forbidden` for non-administrators, `not_found` for unknown ids.
    pub async fn delete(&self, actor: &UserId, id: &TrailId) -> Result<(), Error> {
        self.require_admin(actor).await?;
        if !self.trails.delete(id).await? {
            return Err(Error::not_found("Trail not found"));
        }
        info!(trail_id = %id, actor_id = %actor, "trail deleted");
        Ok(())
    }

    async fn require_admin(&self, actor: &UserId) -> Result<(), Error> {
        match self.users.find_by_id(actor).await? {
            Some(user) if user.is_admin => Ok(()),
            Some(_) => Err(Error::forbidden("Admin access required")),
            None => Err(Error::unauthorized("Authentication required")),
        }
    }
}
