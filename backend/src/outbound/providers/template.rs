//! Stub providers answering from string templates.
//!
//! They perform no network or model work; each counts its calls so the
//! stats endpoints have something to report.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;
use url::Url;

use crate::domain::ports::{AiProvider, KnowledgeSource, ProviderError, Translator};
use crate::domain::vet::{AiAnswer, KnowledgeSnippet, Translation, TranslationJob, VetPrompt};
use crate::domain::{Language, Species, Urgency};

const TEMPLATE_CONFIDENCE: f64 = 0.8;
const TRANSLATION_CONFIDENCE: f64 = 0.9;
const PREVIEW_CHARS: usize = 50;

fn preview(text: &str) -> String {
    text.chars().take(PREVIEW_CHARS).collect()
}

fn species_wire_names() -> Vec<&'static str> {
    Species::ALL.iter().map(|s| s.as_str()).collect()
}

/// Answers every prompt with a templated echo.
#[derive(Debug, Default)]
pub struct TemplateAiProvider {
    responses: AtomicU64,
}

impl TemplateAiProvider {
    pub const NAME: &'static str = "Template AI Provider";
}

#[async_trait]
impl AiProvider for TemplateAiProvider {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn generate_response<'a>(
        &self,
        prompt: &str,
        _context: Option<&'a str>,
    ) -> Result<String, ProviderError> {
        debug!(prompt = %preview(prompt), "template completion");
        self.responses.fetch_add(1, Ordering::Relaxed);
        Ok(format!("AI Response: {prompt}"))
    }

    async fn generate_medication_recommendation(
        &self,
        symptoms: &[String],
        species: &str,
    ) -> Result<String, ProviderError> {
        self.responses.fetch_add(1, Ordering::Relaxed);
        Ok(format!(
            "Medication recommendation for {species}: {}",
            symptoms.join(", ")
        ))
    }

    async fn generate_veterinary_response(
        &self,
        prompt: &VetPrompt,
    ) -> Result<AiAnswer, ProviderError> {
        debug!(species = %prompt.species, query = %preview(&prompt.query), "template answer");
        self.responses.fetch_add(1, Ordering::Relaxed);
        Ok(AiAnswer {
            answer: format!("Veterinary advice for {}: {}", prompt.species, prompt.query),
            confidence: TEMPLATE_CONFIDENCE,
            urgency: Urgency::Medium,
            reasoning: "Based on general veterinary knowledge".to_owned(),
            provider: Self::NAME.to_owned(),
        })
    }

    async fn stats(&self) -> Value {
        json!({
            "provider": Self::NAME,
            "totalResponses": self.responses.load(Ordering::Relaxed),
            "averageConfidence": TEMPLATE_CONFIDENCE,
            "speciesSupported": species_wire_names(),
        })
    }
}

/// Prefixes text with `Translated: ` and assumes English input.
#[derive(Debug, Default)]
pub struct TemplateTranslator {
    translations: AtomicU64,
}

impl TemplateTranslator {
    pub const SERVICE: &'static str = "Template Translator";
}

#[async_trait]
impl Translator for TemplateTranslator {
    async fn translate_text(&self, job: &TranslationJob) -> Result<Translation, ProviderError> {
        let from = match job.from {
            Some(language) => language,
            None => self.detect_language(&job.text).await?,
        };
        debug!(%from, to = %job.to, text = %preview(&job.text), "template translation");
        self.translations.fetch_add(1, Ordering::Relaxed);
        Ok(Translation {
            translated_text: format!("Translated: {}", job.text),
            from_language: from,
            to_language: job.to,
            confidence: TRANSLATION_CONFIDENCE,
            service: Self::SERVICE.to_owned(),
        })
    }

    async fn detect_language(&self, _text: &str) -> Result<Language, ProviderError> {
        Ok(Language::English)
    }

    async fn stats(&self) -> Value {
        let languages: Vec<&str> = Language::ALL.iter().map(|l| l.as_str()).collect();
        json!({
            "service": Self::SERVICE,
            "totalTranslations": self.translations.load(Ordering::Relaxed),
            "languagesSupported": languages,
            "averageConfidence": TRANSLATION_CONFIDENCE,
        })
    }
}

const WIKIPEDIA_SEARCH: &str = "https://en.wikipedia.org/w/index.php";
const VET_SITE_SEARCH: &str = "https://www.merckvetmanual.com/search";

/// Returns one templated snippet per lookup.
#[derive(Debug, Default)]
pub struct TemplateKnowledgeSource {
    scrapes: AtomicU64,
}

impl TemplateKnowledgeSource {
    fn snippet(
        &self,
        title: String,
        content: String,
        search: Option<(&str, &str, &str)>,
        reliability: f64,
    ) -> Vec<KnowledgeSnippet> {
        self.scrapes.fetch_add(1, Ordering::Relaxed);
        let url = search
            .and_then(|(base, key, query)| Url::parse_with_params(base, &[(key, query)]).ok())
            .map(String::from);
        vec![KnowledgeSnippet {
            title,
            content,
            url,
            reliability,
        }]
    }
}

#[async_trait]
impl KnowledgeSource for TemplateKnowledgeSource {
    async fn scrape_veterinary_info(
        &self,
        query: &str,
    ) -> Result<Vec<KnowledgeSnippet>, ProviderError> {
        Ok(self.snippet(
            "Veterinary information".to_owned(),
            format!("Scraped info for: {query}"),
            None,
            0.6,
        ))
    }

    async fn scrape_medication_info(
        &self,
        name: &str,
    ) -> Result<Vec<KnowledgeSnippet>, ProviderError> {
        Ok(self.snippet(
            name.to_owned(),
            format!("Medication info for: {name}"),
            None,
            0.75,
        ))
    }

    async fn search_wikipedia(
        &self,
        query: &str,
        species: &str,
    ) -> Result<Vec<KnowledgeSnippet>, ProviderError> {
        Ok(self.snippet(
            format!("Wikipedia: {species}"),
            format!("Wikipedia info for {species}: {query}"),
            Some((WIKIPEDIA_SEARCH, "search", query)),
            0.7,
        ))
    }

    async fn search_veterinary_sites(
        &self,
        query: &str,
        species: &str,
    ) -> Result<Vec<KnowledgeSnippet>, ProviderError> {
        Ok(self.snippet(
            format!("Veterinary sites: {species}"),
            format!("Veterinary site info for {species}: {query}"),
            Some((VET_SITE_SEARCH, "query", query)),
            0.85,
        ))
    }

    async fn stats(&self) -> Value {
        json!({
            "totalScrapes": self.scrapes.load(Ordering::Relaxed),
            "sitesAccessed": ["wikipedia", "veterinary_sites"],
            "averageResponseTime": 1000,
        })
    }
}
