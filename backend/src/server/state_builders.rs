//! Composition root: wire outbound adapters into the HTTP states.

use std::sync::Arc;

use mockable::Clock;
use tracing::info;

use crate::domain::ports::{AiProvider, UploadStoreError, UserRepository};
use crate::domain::vet::{BotPorts, CataloguePacing};
use crate::domain::{EmailAddress, UserValidationError};
use crate::inbound::http::state::{AdventurePorts, AdventureState, ServiceInfo, VetPorts, VetState};
use crate::outbound::files::{CapStdModelInfoSource, CapStdUploadStore};
use crate::outbound::memory::seed::{self, ADMIN_EMAIL, SeedError};
use crate::outbound::memory::{
    InMemoryCommunityRepository, InMemoryConversationStore, InMemoryLoginService,
    InMemoryMedicationStore, InMemoryTrailRepository, InMemoryUserRepository,
};
use crate::outbound::providers::{
    LocalAiProvider, LocalAiSettings, TemplateAiProvider, TemplateKnowledgeSource,
    TemplateTranslator,
};
use crate::outbound::system::SysinfoSystemProbe;
use crate::outbound::training::ScriptTrainingProcess;

use super::config::{AdventureConfig, AiProviderKind, VetBotConfig};

/// Name reported by the veterinary service.
pub const VET_SERVICE_NAME: &str = "AI Veterinary Bot Service";
/// Version reported by the veterinary service.
pub const VET_SERVICE_VERSION: &str = "1.0.0";

/// Failures while assembling a service before it binds.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("seed fixtures are invalid: {0}")]
    Seed(#[from] SeedError),
    #[error("administrator email is invalid: {0}")]
    AdminEmail(#[from] UserValidationError),
    #[error(transparent)]
    Uploads(#[from] UploadStoreError),
}

fn ai_provider(config: &VetBotConfig) -> Arc<dyn AiProvider> {
    match config.ai_provider {
        AiProviderKind::Template => Arc::new(TemplateAiProvider::default()),
        AiProviderKind::Local => Arc::new(LocalAiProvider::spawn(LocalAiSettings::new(
            config.model.python.clone(),
            config.model.inference_script.clone(),
            config.model.model_path.clone(),
        ))),
    }
}

/// Wire the veterinary service. Must run inside a Tokio runtime when the
/// local provider is selected, since its worker task starts immediately.
pub fn build_vet_state(config: &VetBotConfig, clock: Arc<dyn Clock>) -> VetState {
    let ai = ai_provider(config);
    info!(provider = ai.name(), "AI provider selected");
    VetState::new(
        VetPorts {
            bot: BotPorts {
                ai,
                translator: Arc::new(TemplateTranslator::default()),
                knowledge: Arc::new(TemplateKnowledgeSource::default()),
                medications: Arc::new(InMemoryMedicationStore::new(Arc::clone(&clock))),
            },
            conversations: Arc::new(InMemoryConversationStore::default()),
            training: Arc::new(ScriptTrainingProcess::new(
                config.model.python.clone(),
                config.model.training_dir.clone(),
            )),
            system: Arc::new(SysinfoSystemProbe::default()),
            model_info: Arc::new(CapStdModelInfoSource::new(config.model.model_dir.clone())),
        },
        CataloguePacing::default(),
        ServiceInfo {
            name: VET_SERVICE_NAME,
            version: VET_SERVICE_VERSION,
            environment: config.mode.environment(),
            started: clock.utc(),
        },
        clock,
    )
}

/// Wire the adventure API over seeded in-memory stores.
///
/// # Errors
/// Fails when the upload directory cannot be opened or the fixtures do not
/// validate.
pub async fn build_adventure_state(
    config: &AdventureConfig,
    clock: Arc<dyn Clock>,
) -> Result<AdventureState, StartupError> {
    let now = clock.utc();
    let users: Arc<dyn UserRepository> =
        Arc::new(InMemoryUserRepository::with_users(seed::users(now)?));
    let trails = Arc::new(InMemoryTrailRepository::with_trails(seed::trails(now)?));
    let login = InMemoryLoginService::new(Arc::clone(&users));
    login
        .set_password(&EmailAddress::new(ADMIN_EMAIL)?, &config.admin_password)
        .await;
    let uploads = CapStdUploadStore::open(&config.upload_dir)?;
    info!(upload_dir = %config.upload_dir.display(), "adventure stores seeded");
    Ok(AdventureState::new(
        AdventurePorts {
            login: Arc::new(login),
            users,
            trails,
            community: Arc::new(InMemoryCommunityRepository::default()),
            uploads: Arc::new(uploads),
        },
        config.public_base_url.clone(),
        clock,
    ))
}
