//! Chat endpoints: questions, feedback, history, translation, suggestions.
//!
//! ```text
//! POST /api/v1/chat/ask {"query":"My dog is limping","species":"dog"}
//! GET  /api/v1/chat/history/{sessionId}?limit=10&offset=0
//! ```

use actix_web::{HttpResponse, get, post, web};
use pagination::{PageLimits, PageMeta};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::{Acknowledgement, Envelope};
use crate::domain::vet::{
    ChatQuery, ChatReply, ChatRequest, ChatValidationError, ConversationRecord, Feedback,
    PetContext, Rating, guidance, validate_translation_text,
};
use crate::domain::{Error, Language, Species, TranslationContext, Urgency};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{
    ConversationRecordSchema, ErrorSchema, LanguageSchema, PetContextSchema, SpeciesSchema,
    TranslationContextSchema, UrgencySchema,
};
use crate::inbound::http::state::VetState;
use crate::inbound::http::validation::{
    FieldName, field_error, missing_field_error, parse_optional_vocabulary, parse_page,
    parse_uuid, parse_vocabulary,
};

const HISTORY_LIMITS: PageLimits = PageLimits::new(10, 100);

fn chat_error(err: &ChatValidationError) -> Error {
    field_error(err.field(), err)
}

fn required<T>(value: Option<T>, field: &'static str) -> ApiResult<T> {
    value.ok_or_else(|| missing_field_error(FieldName::new(field)))
}

/// Question for the assistant.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AskRequest {
    #[schema(example = "My dog has been scratching a lot")]
    pub query: Option<String>,
    #[schema(value_type = SpeciesSchema)]
    pub species: Option<String>,
    #[schema(value_type = Option<LanguageSchema>)]
    pub language: Option<String>,
    /// Existing session; a new one is opened when absent.
    pub session_id: Option<String>,
    #[schema(value_type = Option<PetContextSchema>)]
    pub context: Option<PetContext>,
}

impl AskRequest {
    fn into_request(self) -> ApiResult<ChatRequest> {
        let query = ChatQuery::new(required(self.query, "query")?).map_err(|e| chat_error(&e))?;
        let species: Species =
            parse_vocabulary(&required(self.species, "species")?, FieldName::new("species"))?;
        let language =
            parse_optional_vocabulary(self.language.as_deref(), FieldName::new("language"))?;
        let session_id = self
            .session_id
            .map(|raw| parse_uuid(&raw, FieldName::new("sessionId")))
            .transpose()?
            .unwrap_or_else(Uuid::new_v4);
        let context = self
            .context
            .unwrap_or_default()
            .validate()
            .map_err(|e| chat_error(&e))?;
        Ok(ChatRequest {
            query,
            species,
            language,
            session_id,
            context,
        })
    }
}

/// Provenance of an answer.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnswerMetadata {
    /// Milliseconds spent answering.
    pub processing_time: u64,
    #[schema(example = "Template AI")]
    pub ai_provider: String,
    pub reasoning: String,
    /// Sources consulted, before truncation.
    pub total_sources: usize,
}

/// The assistant's answer.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AskResponse {
    pub conversation_id: Uuid,
    pub session_id: Uuid,
    pub answer: String,
    pub confidence: f64,
    #[schema(value_type = LanguageSchema)]
    pub language: Language,
    #[schema(value_type = UrgencySchema)]
    pub urgency: Urgency,
    pub recommendations: Vec<String>,
    pub follow_up: Vec<String>,
    /// At most three source URLs.
    pub sources: Vec<String>,
    pub metadata: AnswerMetadata,
}

impl From<ChatReply> for AskResponse {
    fn from(reply: ChatReply) -> Self {
        Self {
            conversation_id: reply.conversation_id,
            session_id: reply.session_id,
            answer: reply.answer,
            confidence: reply.confidence,
            language: reply.language,
            urgency: reply.urgency,
            recommendations: reply.recommendations,
            follow_up: reply.follow_up_questions,
            sources: reply.sources,
            metadata: AnswerMetadata {
                processing_time: reply.processing_time_ms,
                ai_provider: reply.provider,
                reasoning: reply.reasoning,
                total_sources: reply.total_sources,
            },
        }
    }
}

/// Canned advice served when an answer could not be completed.
#[derive(Debug, Serialize, ToSchema)]
pub struct FallbackAdvice {
    pub answer: String,
    pub confidence: f64,
    #[schema(value_type = UrgencySchema)]
    pub urgency: Urgency,
    pub recommendations: Vec<&'static str>,
}

/// Body of a failed `ask`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AskFailure {
    pub success: bool,
    #[schema(example = "Internal server error")]
    pub error: &'static str,
    #[schema(example = "Failed to generate AI response")]
    pub message: &'static str,
    pub conversation_id: Uuid,
    pub fallback: FallbackAdvice,
}

impl AskFailure {
    fn new(conversation_id: Uuid, species: Species) -> Self {
        Self {
            success: false,
            error: "Internal server error",
            message: "Failed to generate AI response",
            conversation_id,
            fallback: FallbackAdvice {
                answer: guidance::failure_answer(species),
                confidence: 0.0,
                urgency: Urgency::Medium,
                recommendations: guidance::FAILURE_RECOMMENDATIONS.to_vec(),
            },
        }
    }
}

/// Ask the assistant a question.
#[utoipa::path(
    post,
    path = "/api/v1/chat/ask",
    request_body = AskRequest,
    responses(
        (status = 200, description = "Answer", body = Envelope<AskResponse>),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 500, description = "Answer could not be recorded", body = AskFailure)
    ),
    tags = ["chat"],
    operation_id = "ask"
)]
#[post("/ask")]
pub async fn ask(
    state: web::Data<VetState>,
    payload: web::Json<AskRequest>,
) -> ApiResult<HttpResponse> {
    let request = payload.into_inner().into_request()?;
    let reply = state.bot.ask(&request).await;
    let record = ConversationRecord::from_exchange(&request, &reply, state.clock.utc());
    if let Err(err) = state.conversations.save(record).await {
        error!(
            session_id = %request.session_id,
            conversation_id = %reply.conversation_id,
            error = %err,
            "failed to record conversation"
        );
        return Ok(HttpResponse::InternalServerError()
            .json(AskFailure::new(reply.conversation_id, request.species)));
    }
    info!(
        session_id = %reply.session_id,
        confidence = reply.confidence,
        elapsed_ms = reply.processing_time_ms,
        "chat answered"
    );
    Ok(HttpResponse::Ok().json(Envelope::ok(AskResponse::from(reply))))
}

/// Owner's verdict on an answer.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRequest {
    pub conversation_id: Option<String>,
    #[schema(minimum = 1, maximum = 5)]
    pub rating: Option<i64>,
    /// Optional comment of at most 500 characters.
    pub feedback: Option<String>,
    pub helpful: Option<bool>,
}

impl FeedbackRequest {
    fn into_feedback(self, now: chrono::DateTime<chrono::Utc>) -> ApiResult<Feedback> {
        let conversation_id = parse_uuid(
            &required(self.conversation_id, "conversationId")?,
            FieldName::new("conversationId"),
        )?;
        let rating = Rating::new(required(self.rating, "rating")?).map_err(|e| chat_error(&e))?;
        let helpful = required(self.helpful, "helpful")?;
        Feedback::new(conversation_id, rating, self.feedback, helpful, now)
            .map_err(|e| chat_error(&e))
    }
}

/// Rate an answer.
#[utoipa::path(
    post,
    path = "/api/v1/chat/feedback",
    request_body = FeedbackRequest,
    responses(
        (status = 200, description = "Feedback stored", body = Acknowledgement),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 503, description = "Store unavailable", body = ErrorSchema)
    ),
    tags = ["chat"],
    operation_id = "submitFeedback"
)]
#[post("/feedback")]
pub async fn feedback(
    state: web::Data<VetState>,
    payload: web::Json<FeedbackRequest>,
) -> ApiResult<web::Json<Acknowledgement>> {
    let received = payload.into_inner().into_feedback(state.clock.utc())?;
    state.conversations.save_feedback(received.clone()).await?;
    state.bot.learn_from_feedback(&received);
    Ok(web::Json(Acknowledgement::new("Feedback received successfully")))
}

/// `limit`/`offset` over a session's history.
#[derive(Debug, Deserialize, IntoParams)]
pub struct HistoryQuery {
    /// Defaults to 10.
    pub limit: Option<String>,
    /// Defaults to 0.
    pub offset: Option<String>,
}

/// One window of a session's history.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    pub session_id: Uuid,
    #[schema(value_type = Vec<ConversationRecordSchema>)]
    pub conversations: Vec<ConversationRecord>,
    #[schema(value_type = crate::inbound::http::schemas::PageMetaSchema)]
    pub pagination: PageMeta,
}

/// Conversation history of a session.
#[utoipa::path(
    get,
    path = "/api/v1/chat/history/{sessionId}",
    params(("sessionId" = String, Path, description = "Session UUID"), HistoryQuery),
    responses(
        (status = 200, description = "History window", body = Envelope<HistoryResponse>),
        (status = 400, description = "Invalid session id or window", body = ErrorSchema)
    ),
    tags = ["chat"],
    operation_id = "conversationHistory"
)]
#[get("/history/{session_id}")]
pub async fn history(
    state: web::Data<VetState>,
    path: web::Path<String>,
    query: web::Query<HistoryQuery>,
) -> ApiResult<web::Json<Envelope<HistoryResponse>>> {
    let raw = path.into_inner();
    let session_id = Uuid::parse_str(&raw).map_err(|_| {
        Error::invalid_request("Invalid session ID format")
            .with_details(json!({ "field": "sessionId", "value": raw }))
    })?;
    let page = parse_page(query.limit.as_deref(), query.offset.as_deref(), HISTORY_LIMITS)?;
    let window = state
        .conversations
        .history(session_id, page.offset(), Some(page.limit()))
        .await?;
    Ok(web::Json(Envelope::ok(HistoryResponse {
        session_id,
        conversations: window.records,
        pagination: PageMeta {
            limit: page.limit(),
            offset: page.offset(),
            total: window.total,
        },
    })))
}

/// Text to translate.
#[derive(Debug, Deserialize, ToSchema)]
pub struct TranslateRequest {
    /// At most 1000 characters.
    pub text: Option<String>,
    /// Detected when absent.
    #[schema(value_type = Option<LanguageSchema>)]
    pub from: Option<String>,
    #[schema(value_type = LanguageSchema)]
    pub to: Option<String>,
    /// Defaults to `medical`.
    #[schema(value_type = Option<TranslationContextSchema>)]
    pub context: Option<String>,
}

/// A finished translation.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TranslateResponse {
    pub original_text: String,
    pub translated_text: String,
    #[schema(value_type = LanguageSchema)]
    pub from_language: Language,
    #[schema(value_type = LanguageSchema)]
    pub to_language: Language,
    pub confidence: f64,
    pub service: String,
}

/// Translate text between the supported languages.
#[utoipa::path(
    post,
    path = "/api/v1/chat/translate",
    request_body = TranslateRequest,
    responses(
        (status = 200, description = "Translation", body = Envelope<TranslateResponse>),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 503, description = "Translator unavailable", body = ErrorSchema)
    ),
    tags = ["chat"],
    operation_id = "translate"
)]
#[post("/translate")]
pub async fn translate(
    state: web::Data<VetState>,
    payload: web::Json<TranslateRequest>,
) -> ApiResult<web::Json<Envelope<TranslateResponse>>> {
    let TranslateRequest {
        text,
        from,
        to,
        context,
    } = payload.into_inner();
    let text = required(text, "text")?;
    validate_translation_text(&text).map_err(|e| chat_error(&e))?;
    let from: Option<Language> =
        parse_optional_vocabulary(from.as_deref(), FieldName::new("from"))?;
    let to: Language = parse_vocabulary(&required(to, "to")?, FieldName::new("to"))?;
    let context: TranslationContext =
        parse_optional_vocabulary(context.as_deref(), FieldName::new("context"))?
            .unwrap_or_default();

    let translation = state.bot.translate(&text, from, to, context).await?;
    state.usage.record_translation();
    Ok(web::Json(Envelope::ok(TranslateResponse {
        original_text: text,
        translated_text: translation.translated_text,
        from_language: translation.from_language,
        to_language: translation.to_language,
        confidence: translation.confidence,
        service: translation.service,
    })))
}

/// Language of the suggestions.
#[derive(Debug, Deserialize, IntoParams)]
pub struct SuggestionsQuery {
    /// Defaults to `en`.
    #[param(value_type = Option<LanguageSchema>)]
    pub language: Option<String>,
}

/// Starter questions for a species.
#[derive(Debug, Serialize, ToSchema)]
pub struct SuggestionsResponse {
    #[schema(value_type = SpeciesSchema)]
    pub species: Species,
    #[schema(value_type = LanguageSchema)]
    pub language: Language,
    pub suggestions: Vec<String>,
}

/// Suggested first questions.
#[utoipa::path(
    get,
    path = "/api/v1/chat/suggestions/{species}",
    params(("species" = SpeciesSchema, Path, description = "Species"), SuggestionsQuery),
    responses(
        (status = 200, description = "Suggestions", body = Envelope<SuggestionsResponse>),
        (status = 400, description = "Unknown species or language", body = ErrorSchema)
    ),
    tags = ["chat"],
    operation_id = "suggestedQuestions"
)]
#[get("/suggestions/{species}")]
pub async fn suggestions(
    state: web::Data<VetState>,
    path: web::Path<String>,
    query: web::Query<SuggestionsQuery>,
) -> ApiResult<web::Json<Envelope<SuggestionsResponse>>> {
    let species: Species = parse_vocabulary(&path.into_inner(), FieldName::new("species"))?;
    let language: Language =
        parse_optional_vocabulary(query.language.as_deref(), FieldName::new("language"))?
            .unwrap_or_default();
    let questions = state.bot.suggested_questions(species, language).await?;
    Ok(web::Json(Envelope::ok(SuggestionsResponse {
        species,
        language,
        suggestions: questions,
    })))
}
