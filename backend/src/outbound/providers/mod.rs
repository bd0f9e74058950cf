//! Adapters implementing the AI, translation and knowledge ports.

mod local_ai;
mod template;

pub use local_ai::{LOCAL_PROVIDER_NAME, LocalAiProvider, LocalAiSettings};
pub use template::{TemplateAiProvider, TemplateKnowledgeSource, TemplateTranslator};
