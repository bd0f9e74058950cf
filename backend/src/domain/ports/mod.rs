//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Each trait exposes a typed error declared with `define_port_error!` so
//! adapters map their failures into predictable variants.

mod macros;
pub(crate) use macros::define_port_error;

mod community_repository;
mod conversation_store;
mod login_service;
mod medication_store;
mod providers;
mod system_probe;
mod training_process;
mod trail_repository;
mod upload_store;
mod user_repository;

#[cfg(test)]
pub use community_repository::MockCommunityRepository;
pub use community_repository::{CommunityPersistenceError, CommunityRepository};
#[cfg(test)]
pub use conversation_store::MockConversationStore;
pub use conversation_store::{ConversationStore, ConversationStoreError, HistoryPage};
#[cfg(test)]
pub use login_service::MockLoginService;
pub use login_service::LoginService;
#[cfg(test)]
pub use medication_store::MockMedicationStore;
pub use medication_store::{MedicationStore, MedicationStoreError};
#[cfg(test)]
pub use providers::{MockAiProvider, MockKnowledgeSource, MockTranslator};
pub use providers::{AiProvider, KnowledgeSource, ProviderError, Translator};
#[cfg(test)]
pub use system_probe::{MockModelInfoSource, MockSystemProbe};
pub use system_probe::{
    CapacityStats, CpuStats, ModelArtifacts, ModelInfoSource, ProcessMemory, SystemProbe,
    SystemStats,
};
#[cfg(test)]
pub use training_process::MockTrainingProcess;
pub use training_process::{StageOutcome, TrainingProcess, TrainingProcessError, TrainingStage};
#[cfg(test)]
pub use trail_repository::MockTrailRepository;
pub use trail_repository::{TrailPersistenceError, TrailRepository};
#[cfg(test)]
pub use upload_store::MockUploadStore;
pub use upload_store::{UploadStore, UploadStoreError};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
