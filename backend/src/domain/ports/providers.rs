//! Ports for the AI, translation and knowledge providers behind the
//! veterinary bot.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::vet::{AiAnswer, KnowledgeSnippet, Translation, TranslationJob, VetPrompt};
use crate::domain::{Language, TranslationContext};

use super::define_port_error;

define_port_error! {
    /// Failures shared by provider adapters.
    pub enum ProviderError {
        /// The provider could not be reached or started.
        Unavailable { message: String } => "provider unavailable: {message}" => unavailable,
        /// The provider took longer than allowed.
        Timeout { seconds: u64 } => "provider timed out after {seconds}s" => unavailable,
        /// The local model has not been trained yet.
        ModelMissing { path: String } => "model not found at {path}. Please train the model first" => unavailable,
        /// The provider answered with something unusable.
        Protocol { message: String } => "provider protocol error: {message}" => internal,
    }
}

/// Generates veterinary answers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AiProvider: Send + Sync {
    /// Display name reported to clients.
    fn name(&self) -> &str;

    /// Free-form completion.
    async fn generate_response<'a>(
        &self,
        prompt: &str,
        context: Option<&'a str>,
    ) -> Result<String, ProviderError>;

    /// Medication suggestion for a set of symptoms.
    async fn generate_medication_recommendation(
        &self,
        symptoms: &[String],
        species: &str,
    ) -> Result<String, ProviderError>;

    /// Structured veterinary answer.
    async fn generate_veterinary_response(
        &self,
        prompt: &VetPrompt,
    ) -> Result<AiAnswer, ProviderError>;

    /// Provider counters.
    async fn stats(&self) -> Value;

    /// Release held resources.
    async fn shutdown(&self) {}
}

/// Translates between the supported languages.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate with full metadata.
    async fn translate_text(&self, job: &TranslationJob) -> Result<Translation, ProviderError>;

    /// Best guess of the language of `text`.
    async fn detect_language(&self, text: &str) -> Result<Language, ProviderError>;

    /// Provider counters.
    async fn stats(&self) -> Value;

    /// Translate into `to`, returning just the text.
    async fn translate(&self, text: &str, to: Language) -> Result<String, ProviderError> {
        let job = TranslationJob {
            text: text.to_owned(),
            from: None,
            to,
            context: TranslationContext::General,
        };
        Ok(self.translate_text(&job).await?.translated_text)
    }

    /// Translate several texts, preserving order.
    async fn translate_batch(
        &self,
        texts: &[String],
        to: Language,
    ) -> Result<Vec<String>, ProviderError> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.translate(text, to).await?);
        }
        Ok(out)
    }
}

/// Gathers reference material for a question.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KnowledgeSource: Send + Sync {
    /// General veterinary information.
    async fn scrape_veterinary_info(
        &self,
        query: &str,
    ) -> Result<Vec<KnowledgeSnippet>, ProviderError>;

    /// Information about one medication.
    async fn scrape_medication_info(
        &self,
        name: &str,
    ) -> Result<Vec<KnowledgeSnippet>, ProviderError>;

    /// Encyclopaedia search.
    async fn search_wikipedia(
        &self,
        query: &str,
        species: &str,
    ) -> Result<Vec<KnowledgeSnippet>, ProviderError>;

    /// Veterinary site search.
    async fn search_veterinary_sites(
        &self,
        query: &str,
        species: &str,
    ) -> Result<Vec<KnowledgeSnippet>, ProviderError>;

    /// Provider counters.
    async fn stats(&self) -> Value;
}
