//! Domain primitives, aggregates and services.
//!
//! Purpose: define strongly typed entities for the adventure API and the
//! veterinary bot, the services operating on them, and the ports through
//! which they reach stores and providers. Nothing here depends on the HTTP
//! framework, the filesystem or child processes.
//!
//! Public surface:
//! - Error (alias to `error::Error`): API error response payload.
//! - ErrorCode (alias to `error::ErrorCode`): stable error identifier.
//! - User, Trail, CommunityPost: adventure aggregates.
//! - `vet`: the veterinary assistant.
//! - `ports`: traits implemented by outbound adapters.

pub mod auth;
pub mod community;
pub mod error;
pub mod ids;
pub mod platform;
pub mod ports;
pub mod rate_limit;
pub mod trace_id;
pub mod trail;
pub mod trail_service;
pub mod upload;
pub mod user;
pub mod user_service;
pub mod vet;
pub mod vocabulary;

pub use self::auth::{
    LoginCredentials, LoginValidationError, PasswordDigest, constant_time_eq, secret_fingerprint,
};
pub use self::community::{
    CONTENT_MAX, Comment, CommunityPost, CommunityService, CommunityValidationError, LikeOutcome,
    NewPost, PostContent, PostType, PostView,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::ids::{CommentId, ID_MAX_LEN, IdValidationError, PostId, TrailId, UserId};
pub use self::platform::{PRESENCE_WINDOW_SECS, PlatformService, PlatformStats, PresenceTracker};
pub use self::rate_limit::{FixedWindowLimiter, RateDecision, RateLimitConfig};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::trail::{
    DEFAULT_TRAIL_CONDITION, Difficulty, LocalizedText, Pricing, Trail, TrailContact, TrailDraft,
    TrailFilter, TrailValidationError,
};
pub use self::trail_service::TrailService;
pub use self::upload::{
    IMAGE_EXTENSIONS, ImageExtension, MAX_UPLOAD_BYTES, UploadName, UploadValidationError,
    accept_image,
};
pub use self::user::{
    BIO_MAX, EmailAddress, NAME_MAX, PHOTO_POST_POINTS, POINTS_PER_LEVEL, ProfileUpdate,
    ProfileUpdateInput, User, UserStats, UserValidationError, validate_name,
};
pub use self::user_service::UserService;
pub use self::vocabulary::{Language, Species, TranslationContext, UnknownVariant, Urgency};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use lvhub::domain::{ApiResult, Error};
///
/// fn lookup(found: bool) -> ApiResult<&'static str> {
///     if found { Ok("trail-1") } else { Err(Error::not_found("Trail not found")) }
/// }
///
/// assert!(lookup(false).is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
