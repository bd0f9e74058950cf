//! `UserRepository` over a process-local map.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{EmailAddress, User, UserId};

/// Users held in memory.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserRepository {
    /// Repository preloaded with `users`.
    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        Self {
            users: RwLock::new(users.into_iter().map(|u| (u.id.clone(), u)).collect()),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn list(&self) -> Result<Vec<User>, UserPersistenceError> {
        let mut users: Vec<User> = self.users.read().await.values().cloned().collect();
        users.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(users)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|user| &user.email == email)
            .cloned())
    }

    async fn upsert(&self, user: &User) -> Result<(), UserPersistenceError> {
        self.users
            .write()
            .await
            .insert(user.id.clone(), user.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, Utc};
    use rstest::rstest;

    fn user(id: &str, email: &str, age_days: i64) -> User {
        User::new(
            UserId::new(id).expect("id"),
            id.to_owned(),
            EmailAddress::new(email).expect("email"),
            Utc::now() - TimeDelta::days(age_days),
        )
    }

    #[rstest]
    #[tokio::test]
    async fn lists_newest_first() {
        let repo = InMemoryUserRepository::with_users([
            user("old", "old@example.com", 10),
            user("new", "new@example.com", 1),
        ]);
        let ids: Vec<_> = repo
            .list()
            .await
            .expect("list")
            .into_iter()
            .map(|u| u.id.to_string())
            .collect();
        assert_eq!(ids, vec!["new", "old"]);
    }

    #[rstest]
    #[tokio::test]
    async fn email_lookup_ignores_case() {
        let repo = InMemoryUserRepository::with_users([user("u", "Mixed@Example.com", 0)]);
        let found = repo
            .find_by_email(&EmailAddress::new("mixed@example.COM").expect("email"))
            .await
            .expect("lookup");
        assert_eq!(found.map(|u| u.id.to_string()), Some("u".to_owned()));
    }

    #[rstest]
    #[tokio::test]
    async fn upsert_replaces() {
        let repo = InMemoryUserRepository::default();
        let mut stored = user("u", "u@example.com", 0);
        repo.upsert(&stored).await.expect("insert");
        stored.name = "Renamed".to_owned();
        repo.upsert(&stored).await.expect("replace");
        assert_eq!(repo.list().await.expect("list").len(), 1);
        let found = repo.find_by_id(&stored.id).await.expect("find");
        assert_eq!(found.map(|u| u.name), Some("Renamed".to_owned()));
    }
}
