//! Platform-wide counters and session presence.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;
use serde::Serialize;

use super::ports::{CommunityRepository, TrailRepository, UserRepository};
use super::{Error, UserId};

/// How long a session counts as online after its last request.
pub const PRESENCE_WINDOW_SECS: i64 = 5 * 60;

/// Tracks when each signed-in user was last seen.
pub struct PresenceTracker {
    seen: Mutex<HashMap<UserId, DateTime<Utc>>>,
    clock: Arc<dyn Clock>,
}

impl PresenceTracker {
    /// Create an empty tracker.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            seen: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// Record activity for `user`.
    pub fn touch(&self, user: &UserId) {
        let now = self.clock.utc();
        if let Ok(mut seen) = self.seen.lock() {
            seen.insert(user.clone(), now);
        }
    }

    /// Users seen within [`PRESENCE_WINDOW_SECS`]; stale entries are dropped.
    pub fn online(&self) -> usize {
        let cutoff = self.clock.utc() - TimeDelta::seconds(PRESENCE_WINDOW_SECS);
        self.seen.lock().map_or(0, |mut seen| {
            seen.retain(|_, last| *last >= cutoff);
            seen.len()
        })
    }
}

/// Figures served by `GET /api/stats`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformStats {
    pub total_users: usize,
    pub total_trails: usize,
    pub total_posts: usize,
    pub online_users: usize,
}

/// Computes [`PlatformStats`].
#[derive(Clone)]
pub struct PlatformService {
    users: Arc<dyn UserRepository>,
    trails: Arc<dyn TrailRepository>,
    posts: Arc<dyn CommunityRepository>,
    presence: Arc<PresenceTracker>,
}

impl PlatformService {
    /// Create the service.
    pub fn new(
        users: Arc<dyn UserRepository>,
        trails: Arc<dyn TrailRepository>,
        posts: Arc<dyn CommunityRepository>,
        presence: Arc<PresenceTracker>,
    ) -> Self {
        Self {
            users,
            trails,
            posts,
            presence,
        }
    }

    /// Current figures. An authenticated caller counts as online.
    ///
    /// # Errors
    /// Propagates repository failures.
    pub async fn stats(&self, caller: Option<&UserId>) -> Result<PlatformStats, Error> {
        if let Some(user) = caller {
            self.presence.touch(user);
        }
        let online = self.presence.online();
        Ok(PlatformStats {
            total_users: self.users.list().await?.len(),
            total_trails: self.trails.list().await?.len(),
            total_posts: self.posts.list_posts().await?.len(),
            online_users: if caller.is_some() { online.max(1) } else { online },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MutableClock;
    use chrono::TimeZone;
    use rstest::{fixture, rstest};

    #[fixture]
    fn clock() -> Arc<MutableClock> {
        let start = Utc
            .with_ymd_and_hms(2026, 6, 23, 18, 0, 0)
            .single()
            .expect("valid time");
        Arc::new(MutableClock::new(start))
    }

    fn id(raw: &str) -> UserId {
        UserId::new(raw).expect("id")
    }

    #[rstest]
    fn presence_expires_after_window(clock: Arc<MutableClock>) {
        let tracker = PresenceTracker::new(clock.clone());
        tracker.touch(&id("user-1"));
        clock.advance_seconds(60);
        tracker.touch(&id("user-2"));
        assert_eq!(tracker.online(), 2);

        clock.advance_seconds(PRESENCE_WINDOW_SECS - 30);
        assert_eq!(tracker.online(), 1);

        clock.advance_seconds(60);
        assert_eq!(tracker.online(), 0);
    }

    #[rstest]
    fn touching_again_refreshes(clock: Arc<MutableClock>) {
        let tracker = PresenceTracker::new(clock.clone());
        tracker.touch(&id("user-1"));
        clock.advance_seconds(PRESENCE_WINDOW_SECS - 1);
        tracker.touch(&id("user-1"));
        clock.advance_seconds(PRESENCE_WINDOW_SECS - 1);
        assert_eq!(tracker.online(), 1);
    }
}
