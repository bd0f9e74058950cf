//! `TrailRepository` over a process-local map.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::ports::{TrailPersistenceError, TrailRepository};
use crate::domain::{Trail, TrailId};

/// Trails held in memory.
#[derive(Debug, Default)]
pub struct InMemoryTrailRepository {
    trails: RwLock<HashMap<TrailId, Trail>>,
}

impl InMemoryTrailRepository {
    /// Repository preloaded with `trails`.
    pub fn with_trails(trails: impl IntoIterator<Item = Trail>) -> Self {
        Self {
            trails: RwLock::new(trails.into_iter().map(|t| (t.id.clone(), t)).collect()),
        }
    }
}

#[async_trait]
impl TrailRepository for InMemoryTrailRepository {
    async fn list(&self) -> Result<Vec<Trail>, TrailPersistenceError> {
        let mut trails: Vec<Trail> = self.trails.read().await.values().cloned().collect();
        trails.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(trails)
    }

    async fn find(&self, id: &TrailId) -> Result<Option<Trail>, TrailPersistenceError> {
        Ok(self.trails.read().await.get(id).cloned())
    }

    async fn upsert(&self, trail: &Trail) -> Result<(), TrailPersistenceError> {
        self.trails
            .write()
            .await
            .insert(trail.id.clone(), trail.clone());
        Ok(())
    }

    async fn delete(&self, id: &TrailId) -> Result<bool, TrailPersistenceError> {
        Ok(self.trails.write().await.remove(id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outbound::memory::seed;
    use chrono::Utc;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn delete_reports_presence() {
        let repo = InMemoryTrailRepository::with_trails(seed::trails(Utc::now()).expect("seed"));
        let id = TrailId::new("trail-1").expect("id");
        assert!(repo.delete(&id).await.expect("delete"));
        assert!(!repo.delete(&id).await.expect("delete again"));
        assert!(repo.find(&id).await.expect("find").is_none());
    }
}
