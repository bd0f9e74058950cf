//! OpenAPI schema definitions for domain types.
//!
//! Domain types remain framework-agnostic by not deriving `ToSchema`. This
//! module mirrors the ones that appear in request and response bodies so
//! the generated documents stay accurate.

use utoipa::ToSchema;

/// Stable machine-readable error codes returned in API error responses.
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    #[schema(rename = "unauthorized")]
    Unauthorized,
    #[schema(rename = "forbidden")]
    Forbidden,
    #[schema(rename = "not_found")]
    NotFound,
    #[schema(rename = "conflict")]
    Conflict,
    #[schema(rename = "too_many_requests")]
    TooManyRequests,
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    #[schema(rename = "internal_error")]
    InternalError,
}

/// Error envelope returned by every failing endpoint.
#[derive(ToSchema)]
#[schema(as = crate::domain::Error)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Always `false`.
    success: bool,
    /// Human category such as `Validation Error`.
    #[schema(example = "Validation Error")]
    error: String,
    code: ErrorCodeSchema,
    #[schema(example = "species must be one of: dog|cat|bird")]
    message: String,
    timestamp: chrono::DateTime<chrono::Utc>,
    /// Correlation identifier, echoed in the `trace-id` header.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    /// Offending field and value for validation failures.
    details: Option<serde_json::Value>,
}

/// Animal species understood by the veterinary assistant.
#[derive(ToSchema)]
#[schema(as = crate::domain::Species)]
pub enum SpeciesSchema {
    #[schema(rename = "dog")]
    Dog,
    #[schema(rename = "cat")]
    Cat,
    #[schema(rename = "bird")]
    Bird,
    #[schema(rename = "rabbit")]
    Rabbit,
    #[schema(rename = "hamster")]
    Hamster,
    #[schema(rename = "guinea_pig")]
    GuineaPig,
    #[schema(rename = "fish")]
    Fish,
    #[schema(rename = "reptile")]
    Reptile,
}

/// Conversation language.
#[derive(ToSchema)]
#[schema(as = crate::domain::Language)]
pub enum LanguageSchema {
    #[schema(rename = "en")]
    English,
    #[schema(rename = "lv")]
    Latvian,
    #[schema(rename = "ru")]
    Russian,
}

/// How soon an animal should see a veterinarian.
#[derive(ToSchema)]
#[schema(as = crate::domain::Urgency)]
pub enum UrgencySchema {
    #[schema(rename = "low")]
    Low,
    #[schema(rename = "medium")]
    Medium,
    #[schema(rename = "high")]
    High,
    #[schema(rename = "emergency")]
    Emergency,
}

/// Trail difficulty grade.
#[derive(ToSchema)]
#[schema(as = crate::domain::Difficulty)]
pub enum DifficultySchema {
    #[schema(rename = "easy")]
    Easy,
    #[schema(rename = "moderate")]
    Moderate,
    #[schema(rename = "hard")]
    Hard,
    #[schema(rename = "expert")]
    Expert,
}

/// Kind of community post.
#[derive(ToSchema)]
#[schema(as = crate::domain::PostType)]
pub enum PostTypeSchema {
    #[schema(rename = "photo")]
    Photo,
    #[schema(rename = "story")]
    Story,
    #[schema(rename = "tip")]
    Tip,
    #[schema(rename = "question")]
    Question,
}

/// Trilingual text.
#[derive(ToSchema)]
#[schema(as = crate::domain::LocalizedText)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct LocalizedTextSchema {
    #[schema(example = "Gauja National Park Trail")]
    en: String,
    #[schema(example = "Gaujas Nacionālā parka taka")]
    lv: String,
    ru: String,
}

/// Operator contact details for a trail.
#[derive(ToSchema)]
#[schema(as = crate::domain::TrailContact)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct TrailContactSchema {
    phone: Option<String>,
    email: Option<String>,
    website: Option<String>,
}

/// Gamification counters of a user.
#[derive(ToSchema)]
#[schema(as = crate::domain::UserStats)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct UserStatsSchema {
    trails_completed: u32,
    photos_shared: u32,
    points: u32,
    #[schema(minimum = 1)]
    level: u32,
}

/// A published trail. Pricing fields are inlined.
#[derive(ToSchema)]
#[schema(as = crate::domain::Trail)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct TrailSchema {
    #[schema(example = "trail-1")]
    id: String,
    name: LocalizedTextSchema,
    description: LocalizedTextSchema,
    #[schema(example = "Vidzeme")]
    region: String,
    difficulty: DifficultySchema,
    #[schema(example = "12 km")]
    distance: Option<String>,
    duration: Option<String>,
    elevation: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    image_url: Option<String>,
    features: Vec<String>,
    accessibility: Option<String>,
    best_time_to_visit: Option<String>,
    #[schema(example = "good")]
    trail_condition: String,
    parking_available: bool,
    guided_tours_available: bool,
    free_entry: bool,
    adult_price: f64,
    child_price: f64,
    contact: TrailContactSchema,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

/// A community post joined with its author and counters.
#[derive(ToSchema)]
#[schema(as = crate::domain::PostView)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct PostViewSchema {
    id: String,
    user_id: String,
    #[schema(rename = "type")]
    post_type: PostTypeSchema,
    content: String,
    image_url: Option<String>,
    location: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
    #[schema(example = "Anna Bērziņa")]
    user_name: Option<String>,
    user_avatar: Option<String>,
    likes_count: usize,
    /// Number of comments.
    comments: usize,
}

/// `limit`/`offset` window of a paginated list.
#[derive(ToSchema)]
#[schema(as = pagination::PageMeta)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct PageMetaSchema {
    #[schema(example = 20)]
    limit: usize,
    offset: usize,
    total: usize,
}

/// One page of community posts.
#[derive(ToSchema)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct PostPageSchema {
    items: Vec<PostViewSchema>,
    pagination: PageMetaSchema,
}

/// A comment on a post.
#[derive(ToSchema)]
#[schema(as = crate::domain::Comment)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct CommentSchema {
    id: String,
    post_id: String,
    user_id: String,
    content: String,
    created_at: chrono::DateTime<chrono::Utc>,
}

/// Result of toggling a like.
#[derive(ToSchema)]
#[schema(as = crate::domain::LikeOutcome)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct LikeOutcomeSchema {
    liked: bool,
    likes_count: usize,
}

/// Platform-wide counters.
#[derive(ToSchema)]
#[schema(as = crate::domain::PlatformStats)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct PlatformStatsSchema {
    total_users: usize,
    total_trails: usize,
    total_posts: usize,
    /// Users seen in the last five minutes.
    online_users: usize,
}

/// Register used when translating text.
#[derive(ToSchema)]
#[schema(as = crate::domain::TranslationContext)]
pub enum TranslationContextSchema {
    #[schema(rename = "medical")]
    Medical,
    #[schema(rename = "general")]
    General,
}

/// Facts about the pet supplied with a question.
#[derive(ToSchema)]
#[schema(as = crate::domain::vet::PetContext)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct PetContextSchema {
    /// At most five earlier questions.
    previous_queries: Option<Vec<String>>,
    #[schema(example = "4 years")]
    pet_age: Option<String>,
    #[schema(example = "Labrador")]
    pet_breed: Option<String>,
    symptoms: Option<Vec<String>>,
}

/// One stored question and answer.
#[derive(ToSchema)]
#[schema(as = crate::domain::vet::ConversationRecord)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ConversationRecordSchema {
    id: uuid::Uuid,
    session_id: uuid::Uuid,
    query: String,
    response: String,
    species: SpeciesSchema,
    language: LanguageSchema,
    confidence: f64,
    sources: Vec<String>,
    urgency: UrgencySchema,
    timestamp: chrono::DateTime<chrono::Utc>,
    processing_time_ms: u64,
    user_context: PetContextSchema,
}

/// A medication known to the service.
#[derive(ToSchema)]
#[schema(as = crate::domain::vet::Medication)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct MedicationSchema {
    #[schema(example = "amoxicillin")]
    id: String,
    #[schema(example = "Amoxicillin")]
    name: String,
    description: String,
    #[schema(example = "general")]
    category: Option<String>,
    /// Species wire names, or `general`.
    species: Vec<String>,
    dosage: Option<String>,
    side_effects: Vec<String>,
    #[schema(example = "Local AI + Database")]
    source: String,
    confidence: f64,
    last_updated: chrono::DateTime<chrono::Utc>,
}

/// Phase of the training pipeline.
#[derive(ToSchema)]
#[schema(as = crate::domain::vet::TrainingPhase)]
pub enum TrainingPhaseSchema {
    #[schema(rename = "idle")]
    Idle,
    #[schema(rename = "collecting_data")]
    CollectingData,
    #[schema(rename = "training")]
    Training,
    #[schema(rename = "completed")]
    Completed,
    #[schema(rename = "error")]
    Error,
}

/// Training progress snapshot.
#[derive(ToSchema)]
#[schema(as = crate::domain::vet::TrainingStatus)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct TrainingStatusSchema {
    is_training: bool,
    #[schema(minimum = 0.0, maximum = 100.0)]
    progress: f64,
    current_epoch: u32,
    #[schema(example = 3)]
    total_epochs: u32,
    current_loss: f64,
    best_loss: Option<f64>,
    #[schema(example = "00:12:31")]
    training_time: String,
    #[schema(example = "Calculating...")]
    estimated_time_remaining: String,
    dataset_size: u64,
    #[schema(example = "0 MB")]
    model_size: String,
    status: TrainingPhaseSchema,
    last_updated: chrono::DateTime<chrono::Utc>,
    start_time: Option<chrono::DateTime<chrono::Utc>>,
}

/// Live request counters.
#[derive(ToSchema)]
#[schema(as = crate::domain::vet::UsageSnapshot)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct UsageSnapshotSchema {
    total_queries: u64,
    successful_responses: u64,
    /// Milliseconds.
    average_response_time: f64,
    active_sessions: usize,
    medications_generated: u64,
    translations_performed: u64,
    last_updated: chrono::DateTime<chrono::Utc>,
}
