//! Veterinary assistant: chat pipeline, medicine catalogue, usage counters
//! and model training.

mod bot;
mod catalogue;
mod chat;
pub mod guidance;
mod knowledge;
mod medication;
mod model_info;
mod training;
mod usage;

pub use self::bot::{BotPorts, BotStats, SESSION_HISTORY_MAX, VeterinaryBot};
pub use self::catalogue::{
    CATALOGUE_SOURCE, COMMON_MEDICATIONS, CataloguePacing, CatalogueStats, GENERATE_MAX,
    GenerationRequest, MedicineCatalogue, MedicineFilter, MedicineSearch,
};
pub use self::chat::{
    ChatQuery, ChatReply, ChatRequest, ChatValidationError, ConversationRecord,
    FEEDBACK_MAX_CHARS, Feedback, PREVIOUS_QUERIES_MAX, PetContext, QUERY_MAX_CHARS, Rating,
    TRANSLATION_MAX_CHARS, validate_translation_text,
};
pub use self::knowledge::{
    AiAnswer, GENERAL_SUBJECT, KnowledgeSnippet, Translation, TranslationJob, VetPrompt,
};
pub use self::medication::{
    GENERAL_SPECIES, Medication, MedicationStats, UNKNOWN_CATEGORY, medication_slug,
    species_overview_id,
};
pub use self::model_info::ModelInfo;
pub use self::training::{
    COLLECTION_PROGRESS, DEFAULT_TOTAL_EPOCHS, TrainingPhase, TrainingService, TrainingState,
    TrainingStatus,
};
pub use self::usage::{UsageSnapshot, UsageTracker, format_clock};
