//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain services and ports, and remain testable without I/O.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use mockable::Clock;
use tokio::sync::Notify;
use url::Url;

use crate::domain::ports::{
    CommunityRepository, ConversationStore, LoginService, ModelInfoSource, SystemProbe,
    TrailRepository, TrainingProcess, UploadStore, UserRepository,
};
use crate::domain::vet::{
    BotPorts, CataloguePacing, MedicineCatalogue, TrainingService, UsageTracker, VeterinaryBot,
};
use crate::domain::{
    CommunityService, PlatformService, PresenceTracker, TrailService, UserService,
};

/// Parameter object bundling the adventure API's ports.
#[derive(Clone)]
pub struct AdventurePorts {
    pub login: Arc<dyn LoginService>,
    pub users: Arc<dyn UserRepository>,
    pub trails: Arc<dyn TrailRepository>,
    pub community: Arc<dyn CommunityRepository>,
    pub uploads: Arc<dyn UploadStore>,
}

/// Dependency bundle for the adventure API handlers.
#[derive(Clone)]
pub struct AdventureState {
    pub login: Arc<dyn LoginService>,
    pub users: UserService,
    pub trails: TrailService,
    pub community: CommunityService,
    pub platform: PlatformService,
    pub presence: Arc<PresenceTracker>,
    pub uploads: Arc<dyn UploadStore>,
    /// Base URL prefixed to stored upload links.
    pub public_base_url: Url,
    pub clock: Arc<dyn Clock>,
}

/// `url` with a trailing `/` on its path so relative joins append to it
/// instead of replacing its last segment.
#[must_use]
pub fn directory_url(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

impl AdventureState {
    /// Wire the adventure services over `ports`. Upload links are joined
    /// onto `public_base_url` as a directory.
    pub fn new(ports: AdventurePorts, public_base_url: Url, clock: Arc<dyn Clock>) -> Self {
        let AdventurePorts {
            login,
            users,
            trails,
            community,
            uploads,
        } = ports;
        let presence = Arc::new(PresenceTracker::new(Arc::clone(&clock)));
        Self {
            login,
            users: UserService::new(Arc::clone(&users), Arc::clone(&clock)),
            trails: TrailService::new(
                Arc::clone(&trails),
                Arc::clone(&users),
                Arc::clone(&clock),
            ),
            community: CommunityService::new(
                Arc::clone(&users),
                Arc::clone(&community),
                Arc::clone(&clock),
            ),
            platform: PlatformService::new(users, trails, community, Arc::clone(&presence)),
            presence,
            uploads,
            public_base_url: directory_url(public_base_url),
            clock,
        }
    }
}

/// Facts about the running process reported by health and index endpoints.
#[derive(Debug, Clone)]
pub struct ServiceInfo {
    pub name: &'static str,
    pub version: &'static str,
    /// `development` or `production`.
    pub environment: &'static str,
    pub started: DateTime<Utc>,
}

/// Parameter object bundling the veterinary service's ports.
#[derive(Clone)]
pub struct VetPorts {
    pub bot: BotPorts,
    pub conversations: Arc<dyn ConversationStore>,
    pub training: Arc<dyn TrainingProcess>,
    pub system: Arc<dyn SystemProbe>,
    pub model_info: Arc<dyn ModelInfoSource>,
}

/// Dependency bundle for the veterinary bot handlers.
#[derive(Clone)]
pub struct VetState {
    pub bot: Arc<VeterinaryBot>,
    pub conversations: Arc<dyn ConversationStore>,
    pub catalogue: MedicineCatalogue,
    pub training: TrainingService,
    pub usage: Arc<UsageTracker>,
    pub system: Arc<dyn SystemProbe>,
    pub model_info: Arc<dyn ModelInfoSource>,
    pub clock: Arc<dyn Clock>,
    pub info: ServiceInfo,
    /// Notified when an administrator asks for a restart.
    pub restart: Arc<Notify>,
}

impl VetState {
    /// Wire the veterinary services over `ports`.
    pub fn new(
        ports: VetPorts,
        pacing: CataloguePacing,
        info: ServiceInfo,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let VetPorts {
            bot,
            conversations,
            training,
            system,
            model_info,
        } = ports;
        let usage = Arc::new(UsageTracker::default());
        let catalogue = MedicineCatalogue::new(
            Arc::clone(&bot.medications),
            Arc::clone(&bot.ai),
            Arc::clone(&usage),
            Arc::clone(&clock),
            pacing,
        );
        Self {
            bot: Arc::new(VeterinaryBot::new(bot, Arc::clone(&clock))),
            conversations,
            catalogue,
            training: TrainingService::new(training, Arc::clone(&clock)),
            usage,
            system,
            model_info,
            clock,
            info,
            restart: Arc::new(Notify::new()),
        }
    }

    /// Time since the service started.
    #[must_use]
    pub fn uptime(&self) -> std::time::Duration {
        (self.clock.utc() - self.info.started)
            .to_std()
            .unwrap_or_default()
    }
}
