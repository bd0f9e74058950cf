//! Chat requests, replies and the records kept per session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Language, Species, Urgency};

/// Longest question accepted from an owner.
pub const QUERY_MAX_CHARS: usize = 1000;
/// Most previous questions a client may send as context.
pub const PREVIOUS_QUERIES_MAX: usize = 5;
/// Longest free-text feedback comment.
pub const FEEDBACK_MAX_CHARS: usize = 500;
/// Longest text accepted for translation.
pub const TRANSLATION_MAX_CHARS: usize = 1000;

/// Validation failures for chat input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChatValidationError {
    /// The question was blank.
    #[error("query must not be empty")]
    EmptyQuery,
    /// The question exceeded [`QUERY_MAX_CHARS`].
    #[error("query must be at most {QUERY_MAX_CHARS} characters")]
    QueryTooLong,
    /// Too many previous questions were supplied.
    #[error("context.previousQueries may contain at most {PREVIOUS_QUERIES_MAX} entries")]
    TooManyPreviousQueries,
    /// Rating was outside 1..=5.
    #[error("rating must be between 1 and 5")]
    RatingOutOfRange,
    /// Feedback comment exceeded [`FEEDBACK_MAX_CHARS`].
    #[error("feedback must be at most {FEEDBACK_MAX_CHARS} characters")]
    FeedbackTooLong,
    /// Text to translate was blank.
    #[error("text must not be empty")]
    EmptyText,
    /// Text to translate exceeded [`TRANSLATION_MAX_CHARS`].
    #[error("text must be at most {TRANSLATION_MAX_CHARS} characters")]
    TextTooLong,
}

impl ChatValidationError {
    /// Name of the offending request field.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::EmptyQuery | Self::QueryTooLong => "query",
            Self::TooManyPreviousQueries => "context.previousQueries",
            Self::RatingOutOfRange => "rating",
            Self::FeedbackTooLong => "feedback",
            Self::EmptyText | Self::TextTooLong => "text",
        }
    }
}

/// An owner's question, between 1 and [`QUERY_MAX_CHARS`] characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ChatQuery(String);

impl ChatQuery {
    /// Validate a question.
    ///
    /// # Errors
    /// Returns [`ChatValidationError::EmptyQuery`] or
    /// [`ChatValidationError::QueryTooLong`].
    pub fn new(raw: impl Into<String>) -> Result<Self, ChatValidationError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(ChatValidationError::EmptyQuery);
        }
        if raw.chars().count() > QUERY_MAX_CHARS {
            return Err(ChatValidationError::QueryTooLong);
        }
        Ok(Self(raw))
    }

    /// Borrow the question text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Optional facts about the pet that sharpen the answer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PetContext {
    /// Earlier questions in this conversation.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub previous_queries: Vec<String>,
    /// Age as the owner describes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pet_age: Option<String>,
    /// Breed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pet_breed: Option<String>,
    /// Observed symptoms.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub symptoms: Vec<String>,
}

impl PetContext {
    /// Validate list bounds.
    ///
    /// # Errors
    /// Returns [`ChatValidationError::TooManyPreviousQueries`].
    pub fn validate(self) -> Result<Self, ChatValidationError> {
        if self.previous_queries.len() > PREVIOUS_QUERIES_MAX {
            return Err(ChatValidationError::TooManyPreviousQueries);
        }
        Ok(self)
    }
}

/// A validated question for the bot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    /// The question.
    pub query: ChatQuery,
    /// Species the question concerns.
    pub species: Species,
    /// Requested answer language; detected when absent.
    pub language: Option<Language>,
    /// Conversation session.
    pub session_id: Uuid,
    /// Extra facts about the pet.
    pub context: PetContext,
}

/// The bot's answer to a [`ChatRequest`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    /// Identifier of this exchange.
    pub conversation_id: Uuid,
    /// Conversation session.
    pub session_id: Uuid,
    /// Answer text in the working language.
    pub answer: String,
    /// Provider confidence in `[0, 1]`.
    pub confidence: f64,
    /// Language of the answer.
    pub language: Language,
    /// How soon to seek care.
    pub urgency: Urgency,
    /// Suggested next steps.
    pub recommendations: Vec<String>,
    /// Questions the owner may want to answer next.
    pub follow_up_questions: Vec<String>,
    /// Source URLs consulted.
    pub sources: Vec<String>,
    /// Name of the answering provider.
    pub provider: String,
    /// Provider's explanation.
    pub reasoning: String,
    /// Snippets gathered before answering.
    pub total_sources: usize,
    /// Wall time spent answering.
    pub processing_time_ms: u64,
}

/// One stored question and answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationRecord {
    /// Identifier of this exchange.
    pub id: Uuid,
    /// Conversation session.
    pub session_id: Uuid,
    /// Question as asked.
    pub query: String,
    /// Answer as given.
    pub response: String,
    /// Species concerned.
    pub species: Species,
    /// Answer language.
    pub language: Language,
    /// Provider confidence.
    pub confidence: f64,
    /// Source URLs.
    pub sources: Vec<String>,
    /// Urgency classification.
    pub urgency: Urgency,
    /// When the answer was produced.
    pub timestamp: DateTime<Utc>,
    /// Wall time spent answering.
    pub processing_time_ms: u64,
    /// Context the owner supplied.
    #[serde(default)]
    pub user_context: PetContext,
}

impl ConversationRecord {
    /// Record of a finished exchange.
    #[must_use]
    pub fn from_exchange(request: &ChatRequest, reply: &ChatReply, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: reply.conversation_id,
            session_id: reply.session_id,
            query: request.query.as_str().to_owned(),
            response: reply.answer.clone(),
            species: request.species,
            language: reply.language,
            confidence: reply.confidence,
            sources: reply.sources.clone(),
            urgency: reply.urgency,
            timestamp,
            processing_time_ms: reply.processing_time_ms,
            user_context: request.context.clone(),
        }
    }
}

/// A 1 to 5 star rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    /// Validate a star rating.
    ///
    /// # Errors
    /// Returns [`ChatValidationError::RatingOutOfRange`] outside 1..=5.
    pub fn new(stars: i64) -> Result<Self, ChatValidationError> {
        u8::try_from(stars)
            .ok()
            .filter(|value| (1..=5).contains(value))
            .map(Self)
            .ok_or(ChatValidationError::RatingOutOfRange)
    }

    /// Number of stars.
    #[must_use]
    pub const fn stars(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Rating {
    type Error = ChatValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(i64::from(value))
    }
}

impl From<Rating> for u8 {
    fn from(value: Rating) -> Self {
        value.0
    }
}

/// An owner's verdict on an answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    /// Exchange being rated.
    pub conversation_id: Uuid,
    /// Stars awarded.
    pub rating: Rating,
    /// Optional comment.
    pub comment: Option<String>,
    /// Whether the answer helped.
    pub helpful: bool,
    /// When feedback was received.
    pub timestamp: DateTime<Utc>,
}

impl Feedback {
    /// Validate and timestamp feedback.
    ///
    /// # Errors
    /// Returns [`ChatValidationError::FeedbackTooLong`] for long comments.
    pub fn new(
        conversation_id: Uuid,
        rating: Rating,
        comment: Option<String>,
        helpful: bool,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, ChatValidationError> {
        if comment
            .as_deref()
            .is_some_and(|text| text.chars().count() > FEEDBACK_MAX_CHARS)
        {
            return Err(ChatValidationError::FeedbackTooLong);
        }
        Ok(Self {
            conversation_id,
            rating,
            comment,
            helpful,
            timestamp,
        })
    }
}

/// Validate text submitted for translation.
///
/// # Errors
/// Returns [`ChatValidationError::EmptyText`] or
/// [`ChatValidationError::TextTooLong`].
pub fn validate_translation_text(text: &str) -> Result<(), ChatValidationError> {
    if text.trim().is_empty() {
        return Err(ChatValidationError::EmptyText);
    }
    if text.chars().count() > TRANSLATION_MAX_CHARS {
        return Err(ChatValidationError::TextTooLong);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", ChatValidationError::EmptyQuery)]
    #[case("   ", ChatValidationError::EmptyQuery)]
    fn blank_queries_are_rejected(#[case] raw: &str, #[case] expected: ChatValidationError) {
        assert_eq!(ChatQuery::new(raw), Err(expected));
    }

    #[rstest]
    fn query_length_is_counted_in_characters() {
        let at_limit = "ā".repeat(QUERY_MAX_CHARS);
        assert!(ChatQuery::new(at_limit).is_ok());
        let over = "a".repeat(QUERY_MAX_CHARS + 1);
        assert_eq!(ChatQuery::new(over), Err(ChatValidationError::QueryTooLong));
    }

    #[rstest]
    #[case(0, false)]
    #[case(1, true)]
    #[case(5, true)]
    #[case(6, false)]
    #[case(-3, false)]
    fn rating_bounds(#[case] stars: i64, #[case] ok: bool) {
        assert_eq!(Rating::new(stars).is_ok(), ok);
    }

    #[rstest]
    fn context_caps_previous_queries() {
        let context = PetContext {
            previous_queries: vec!["q".to_owned(); PREVIOUS_QUERIES_MAX + 1],
            ..PetContext::default()
        };
        let err = context.validate().expect_err("too many");
        assert_eq!(err.field(), "context.previousQueries");
    }

    #[rstest]
    fn feedback_comment_is_bounded() {
        let rating = Rating::new(4).expect("rating");
        let result = Feedback::new(
            Uuid::nil(),
            rating,
            Some("x".repeat(FEEDBACK_MAX_CHARS + 1)),
            true,
            Utc::now(),
        );
        assert_eq!(result, Err(ChatValidationError::FeedbackTooLong));
    }

    #[rstest]
    fn context_deserialises_camel_case() {
        let context: PetContext = serde_json::from_str(
            r#"{"petAge":"3 years","symptoms":["cough"],"previousQueries":["hi"]}"#,
        )
        .expect("deserialise");
        assert_eq!(context.pet_age.as_deref(), Some("3 years"));
        assert_eq!(context.symptoms, vec!["cough"]);
    }
}
