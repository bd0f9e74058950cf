//! Profile use-cases: listing, lookup and guarded updates.

use std::sync::Arc;

use mockable::Clock;
use tracing::info;

use super::ports::UserRepository;
use super::{Error, ProfileUpdate, User, UserId};

/// Profile use-cases.
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
    clock: Arc<dyn Clock>,
}

impl UserService {
    /// Create the service.
    pub fn new(users: Arc<dyn UserRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { users, clock }
    }

    /// All users, newest first.
    ///
    /// # Errors
    /// Propagates repository failures.
    pub async fn list(&self) -> Result<Vec<User>, Error> {
        Ok(self.users.list().await?)
    }

    /// One user.
    ///
    /// # Errors
    /// Returns `not_found` for unknown ids.
    pub async fn get(&self, id: &UserId) -> Result<User, Error> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found("User not found"))
    }

    /// Apply `update` to `target` on behalf of `actor`.
    ///
    /// # Errors
    /// `unauthorized` when the actor is unknown, `forbidden` when the actor
    /// may not edit the target, `not_found` for an unknown target and
    /// `conflict` when the new email belongs to someone else.
    pub async fn update(
        &self,
        actor: &UserId,
        target: &UserId,
        update: ProfileUpdate,
    ) -> Result<User, Error> {
        let actor = self
            .users
            .find_by_id(actor)
            .await?
            .ok_or_else(|| Error::unauthorized("Authentication required"))?;
        let mut user = self.get(target).await?;
        if !user.editable_by(&actor) {
            return Err(Error::forbidden("You can only edit your own profile"));
        }
        if let Some(email) = update.email() {
            let holder = self.users.find_by_email(email).await?;
            if holder.is_some_and(|other| other.id != user.id) {
                return Err(Error::conflict("Email already in use"));
            }
        }
        user.apply(update, self.clock.utc());
        self.users.upsert(&user).await?;
        info!(user_id = %user.id, actor_id = %actor.id, "profile updated");
        Ok(user)
    }
}
