//! The veterinary question-answering pipeline.
//!
//! A question is normalised to English, enriched with gathered reference
//! material and matching medications, answered by the configured
//! [`AiProvider`], and translated back. Provider failures while
//! translating or answering degrade to a canned fallback reply instead of
//! an error.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::guidance::{self, KNOWLEDGE_LIMIT, REPLY_SOURCES};
use super::{
    ChatReply, ChatRequest, ConversationRecord, Feedback, KnowledgeSnippet, Medication,
    Translation, TranslationJob, VetPrompt,
};
use crate::domain::ports::{AiProvider, KnowledgeSource, MedicationStore, ProviderError, Translator};
use crate::domain::{Error, Language, Species, TranslationContext, Urgency};

/// Exchanges kept per session in the bot's own history.
pub const SESSION_HISTORY_MAX: usize = 20;

const FALLBACK_REASONING: &str = "Fallback response due to technical difficulties";

/// Providers the bot depends on.
#[derive(Clone)]
pub struct BotPorts {
    pub ai: Arc<dyn AiProvider>,
    pub translator: Arc<dyn Translator>,
    pub knowledge: Arc<dyn KnowledgeSource>,
    pub medications: Arc<dyn MedicationStore>,
}

/// Counters served by the analytics endpoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BotStats {
    pub conversation_sessions: usize,
    pub total_conversations: usize,
    pub feedback_received: u64,
    pub web_scraper_stats: Value,
    pub translator_stats: Value,
    pub ai_provider_stats: Value,
    /// Seconds since the bot was created.
    pub uptime: i64,
}

#[derive(Default)]
struct History {
    sessions: HashMap<Uuid, VecDeque<ConversationRecord>>,
    feedback: u64,
}

/// Answers veterinary questions.
pub struct VeterinaryBot {
    ports: BotPorts,
    clock: Arc<dyn Clock>,
    started: DateTime<Utc>,
    history: Mutex<History>,
}

impl VeterinaryBot {
    /// Create a bot.
    pub fn new(ports: BotPorts, clock: Arc<dyn Clock>) -> Self {
        let started = clock.utc();
        info!(provider = ports.ai.name(), "veterinary bot initialised");
        Self {
            ports,
            clock,
            started,
            history: Mutex::new(History::default()),
        }
    }

    /// Name of the answering provider.
    #[must_use]
    pub fn provider_name(&self) -> &str {
        self.ports.ai.name()
    }

    /// Answer a question. Never fails: provider errors yield the fallback
    /// reply.
    pub async fn ask(&self, request: &ChatRequest) -> ChatReply {
        let started = Instant::now();
        let conversation_id = Uuid::new_v4();
        info!(
            session_id = %request.session_id,
            species = %request.species,
            language = ?request.language,
            "processing veterinary query"
        );

        let mut reply = match self.answer(request, conversation_id).await {
            Ok(reply) => reply,
            Err(err) => {
                error!(session_id = %request.session_id, error = %err, "falling back after provider failure");
                fallback_reply(request, conversation_id)
            }
        };
        reply.processing_time_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        self.remember(ConversationRecord::from_exchange(
            request,
            &reply,
            self.clock.utc(),
        ));
        info!(
            session_id = %reply.session_id,
            elapsed_ms = reply.processing_time_ms,
            confidence = reply.confidence,
            "veterinary query answered"
        );
        reply
    }

    async fn answer(
        &self,
        request: &ChatRequest,
        conversation_id: Uuid,
    ) -> Result<ChatReply, ProviderError> {
        let language = match request.language {
            Some(language) => language,
            None => self.ports.translator.detect_language(request.query.as_str()).await?,
        };

        let english_query = if language.needs_translation() {
            self.translate_medical(request.query.as_str(), language, Language::English)
                .await?
        } else {
            request.query.as_str().to_owned()
        };

        let knowledge = self.gather_knowledge(&english_query, request.species).await;
        let medications = self.related_medications(&english_query).await;
        let context = guidance::build_prompt_context(
            &english_query,
            request.species,
            &knowledge,
            &medications,
            &request.context,
        );

        let prompt = VetPrompt::new(english_query, request.species.as_str(), context, language);
        let answer = self.ports.ai.generate_veterinary_response(&prompt).await?;

        let text = if language.needs_translation() {
            self.translate_medical(&answer.answer, Language::English, language)
                .await?
        } else {
            answer.answer
        };

        let recommendations = self
            .localise(
                guidance::recommendations_for(answer.urgency),
                language,
                TranslationContext::Medical,
            )
            .await?;
        let follow_up_questions = self
            .localise(
                guidance::follow_up_questions(),
                language,
                TranslationContext::General,
            )
            .await?;

        Ok(ChatReply {
            conversation_id,
            session_id: request.session_id,
            answer: text,
            confidence: answer.confidence,
            language,
            urgency: answer.urgency,
            recommendations,
            follow_up_questions,
            sources: knowledge
                .iter()
                .filter_map(|snippet| snippet.url.clone())
                .take(REPLY_SOURCES)
                .collect(),
            provider: answer.provider,
            reasoning: answer.reasoning,
            total_sources: knowledge.len(),
            processing_time_ms: 0,
        })
    }

    async fn translate_medical(
        &self,
        text: &str,
        from: Language,
        to: Language,
    ) -> Result<String, ProviderError> {
        let job = TranslationJob {
            text: text.to_owned(),
            from: Some(from),
            to,
            context: TranslationContext::Medical,
        };
        Ok(self.ports.translator.translate_text(&job).await?.translated_text)
    }

    async fn localise(
        &self,
        texts: Vec<String>,
        to: Language,
        context: TranslationContext,
    ) -> Result<Vec<String>, ProviderError> {
        if !to.needs_translation() {
            return Ok(texts);
        }
        let jobs = texts.into_iter().map(|text| TranslationJob {
            text,
            from: Some(Language::English),
            to,
            context,
        });
        let translations =
            futures_util::future::try_join_all(jobs.map(|job| async move {
                self.ports.translator.translate_text(&job).await
            }))
            .await?;
        Ok(translations.into_iter().map(|t| t.translated_text).collect())
    }

    async fn gather_knowledge(&self, query: &str, species: Species) -> Vec<KnowledgeSnippet> {
        let species = species.as_str();
        let (wikipedia, sites) = tokio::join!(
            self.ports.knowledge.search_wikipedia(query, species),
            self.ports.knowledge.search_veterinary_sites(query, species),
        );
        match (wikipedia, sites) {
            (Ok(mut found), Ok(more)) => {
                found.extend(more);
                found.sort_by(|a, b| b.reliability.total_cmp(&a.reliability));
                found.truncate(KNOWLEDGE_LIMIT);
                info!(sources = found.len(), "gathered veterinary knowledge");
                found
            }
            (Err(err), _) | (_, Err(err)) => {
                warn!(error = %err, "knowledge gathering failed");
                Vec::new()
            }
        }
    }

    async fn related_medications(&self, query: &str) -> Vec<Medication> {
        if !guidance::mentions_medication(query) {
            return Vec::new();
        }
        match self.ports.medications.search(query).await {
            Ok(found) => {
                info!(medications = found.len(), "found related medications");
                found
            }
            Err(err) => {
                warn!(error = %err, "medication search failed");
                Vec::new()
            }
        }
    }

    fn remember(&self, record: ConversationRecord) {
        let Ok(mut history) = self.history.lock() else {
            warn!("conversation history lock poisoned");
            return;
        };
        let session = history.sessions.entry(record.session_id).or_default();
        session.push_back(record);
        while session.len() > SESSION_HISTORY_MAX {
            session.pop_front();
        }
    }

    /// Translate arbitrary text, detecting the source language when absent.
    ///
    /// # Errors
    /// Returns `service_unavailable` when the translator fails.
    pub async fn translate(
        &self,
        text: &str,
        from: Option<Language>,
        to: Language,
        context: TranslationContext,
    ) -> Result<Translation, Error> {
        let unavailable = |err: ProviderError| {
            error!(error = %err, "translation failed");
            Error::service_unavailable("Translation service unavailable")
        };
        let from = match from {
            Some(language) => language,
            None => self
                .ports
                .translator
                .detect_language(text)
                .await
                .map_err(unavailable)?,
        };
        let job = TranslationJob {
            text: text.to_owned(),
            from: Some(from),
            to,
            context,
        };
        self.ports
            .translator
            .translate_text(&job)
            .await
            .map_err(unavailable)
    }

    /// Starter questions for a species in `language`.
    ///
    /// # Errors
    /// Returns `service_unavailable` when translation fails.
    pub async fn suggested_questions(
        &self,
        species: Species,
        language: Language,
    ) -> Result<Vec<String>, Error> {
        self.localise(
            guidance::suggested_questions(species),
            language,
            TranslationContext::General,
        )
        .await
        .map_err(|err| {
            error!(error = %err, "suggestion translation failed");
            Error::service_unavailable("Translation service unavailable")
        })
    }

    /// Log and count owner feedback.
    pub fn learn_from_feedback(&self, feedback: &Feedback) {
        info!(
            conversation_id = %feedback.conversation_id,
            rating = feedback.rating.stars(),
            helpful = feedback.helpful,
            comment = feedback.comment.as_deref().unwrap_or_default(),
            "feedback received"
        );
        if let Ok(mut history) = self.history.lock() {
            history.feedback += 1;
        }
    }

    /// Exchanges held for a session, oldest first.
    #[must_use]
    pub fn session_history(&self, session_id: Uuid) -> Vec<ConversationRecord> {
        self.history
            .lock()
            .ok()
            .and_then(|history| {
                history
                    .sessions
                    .get(&session_id)
                    .map(|records| records.iter().cloned().collect())
            })
            .unwrap_or_default()
    }

    /// Sessions held in the bot's history.
    #[must_use]
    pub fn session_count(&self) -> usize {
        self.history.lock().map_or(0, |h| h.sessions.len())
    }

    /// Pipeline and provider counters.
    pub async fn stats(&self) -> BotStats {
        let (sessions, total, feedback) = self.history.lock().map_or((0, 0, 0), |history| {
            (
                history.sessions.len(),
                history.sessions.values().map(VecDeque::len).sum(),
                history.feedback,
            )
        });
        let (web_scraper_stats, translator_stats, ai_provider_stats) = tokio::join!(
            self.ports.knowledge.stats(),
            self.ports.translator.stats(),
            self.ports.ai.stats(),
        );
        BotStats {
            conversation_sessions: sessions,
            total_conversations: total,
            feedback_received: feedback,
            web_scraper_stats,
            translator_stats,
            ai_provider_stats,
            uptime: (self.clock.utc() - self.started).num_seconds(),
        }
    }

    /// Release provider resources.
    pub async fn shutdown(&self) {
        self.ports.ai.shutdown().await;
    }
}

fn fallback_reply(request: &ChatRequest, conversation_id: Uuid) -> ChatReply {
    ChatReply {
        conversation_id,
        session_id: request.session_id,
        answer: guidance::fallback_answer(request.species),
        confidence: guidance::FALLBACK_CONFIDENCE,
        language: request.language.unwrap_or_default(),
        urgency: Urgency::Medium,
        recommendations: guidance::fallback_recommendations(),
        follow_up_questions: guidance::fallback_follow_ups(),
        sources: Vec::new(),
        provider: guidance::FALLBACK_PROVIDER.to_owned(),
        reasoning: FALLBACK_REASONING.to_owned(),
        total_sources: 0,
        processing_time_ms: 0,
    }
}
