//! Values exchanged with AI, translation and knowledge providers.

use serde::{Deserialize, Serialize};

use crate::domain::{Language, TranslationContext, Urgency};

/// Subject passed to a provider for non-chat prompts.
pub const GENERAL_SUBJECT: &str = "general";

/// A prompt for a veterinary answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VetPrompt {
    /// English question.
    pub query: String,
    /// Species wire name, or [`GENERAL_SUBJECT`].
    pub species: String,
    /// Answer language.
    pub language: Language,
    /// Background assembled by the bot.
    pub context: String,
}

impl VetPrompt {
    /// Build a prompt.
    #[must_use]
    pub fn new(
        query: impl Into<String>,
        species: impl Into<String>,
        context: impl Into<String>,
        language: Language,
    ) -> Self {
        Self {
            query: query.into(),
            species: species.into(),
            language,
            context: context.into(),
        }
    }
}

/// A provider's answer to a [`VetPrompt`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiAnswer {
    /// Answer text.
    pub answer: String,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
    /// Urgency the provider assigned.
    pub urgency: Urgency,
    /// Provider's explanation.
    pub reasoning: String,
    /// Provider display name.
    pub provider: String,
}

/// Result of translating a text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Translation {
    /// Translated text.
    pub translated_text: String,
    /// Source language.
    pub from_language: Language,
    /// Target language.
    pub to_language: Language,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
    /// Translating service name.
    pub service: String,
}

/// A translation job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationJob {
    /// Text to translate.
    pub text: String,
    /// Source language; detected when absent.
    pub from: Option<Language>,
    /// Target language.
    pub to: Language,
    /// Register.
    pub context: TranslationContext,
}

/// A fragment of reference material gathered for a question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeSnippet {
    /// Source title.
    pub title: String,
    /// Extracted text.
    pub content: String,
    /// Where it came from.
    pub url: Option<String>,
    /// Source reliability in `[0, 1]`.
    pub reliability: f64,
}
