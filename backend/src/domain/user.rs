//! User profiles and their gamified statistics.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::UserId;

/// Maximum length of a user's name.
pub const NAME_MAX: usize = 100;
/// Maximum length of a user's biography.
pub const BIO_MAX: usize = 500;
/// Points needed to advance one level.
pub const POINTS_PER_LEVEL: u32 = 100;
/// Points awarded for sharing a photo post.
pub const PHOTO_POST_POINTS: u32 = 10;

/// Validation errors for user profile fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    /// Name was blank.
    #[error("name must not be empty")]
    EmptyName,
    /// Name exceeded [`NAME_MAX`].
    #[error("name must be at most {NAME_MAX} characters")]
    NameTooLong,
    /// Email did not look like `local@domain`.
    #[error("email must be a valid address")]
    InvalidEmail,
    /// Bio exceeded [`BIO_MAX`].
    #[error("bio must be at most {BIO_MAX} characters")]
    BioTooLong,
}

impl UserValidationError {
    /// Name of the offending profile field.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::EmptyName | Self::NameTooLong => "name",
            Self::InvalidEmail => "email",
            Self::BioTooLong => "bio",
        }
    }
}

static EMAIL_RE: OnceLock<Option<Regex>> = OnceLock::new();

fn email_regex() -> Option<&'static Regex> {
    EMAIL_RE
        .get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+$").ok())
        .as_ref()
}

/// Lower-cased email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and normalise an email address.
    ///
    /// # Errors
    /// Returns [`UserValidationError::InvalidEmail`] unless the input has one
    /// `@` with non-empty parts and no whitespace.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = raw.as_ref().trim();
        if !email_regex().is_some_and(|re| re.is_match(trimmed)) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(trimmed.to_lowercase()))
    }

    /// Borrow the normalised address.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

/// Validate a display name: trimmed, non-empty, at most [`NAME_MAX`] chars.
///
/// # Errors
/// Returns [`UserValidationError::EmptyName`] or
/// [`UserValidationError::NameTooLong`].
pub fn validate_name(raw: &str) -> Result<String, UserValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(UserValidationError::EmptyName);
    }
    if trimmed.chars().count() > NAME_MAX {
        return Err(UserValidationError::NameTooLong);
    }
    Ok(trimmed.to_owned())
}

fn validate_bio(raw: Option<String>) -> Result<Option<String>, UserValidationError> {
    match raw {
        Some(bio) if bio.chars().count() > BIO_MAX => Err(UserValidationError::BioTooLong),
        other => Ok(other),
    }
}

/// Activity counters shown on a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    /// Trails the user marked as completed.
    pub trails_completed: u32,
    /// Photo posts shared with the community.
    pub photos_shared: u32,
    /// Accumulated points.
    pub points: u32,
    /// Level derived from points; starts at 1.
    pub level: u32,
}

impl Default for UserStats {
    fn default() -> Self {
        Self {
            trails_completed: 0,
            photos_shared: 0,
            points: 0,
            level: 1,
        }
    }
}

impl UserStats {
    /// Credit a shared photo: one more photo and [`PHOTO_POST_POINTS`] points.
    pub fn record_photo_shared(&mut self) {
        self.photos_shared = self.photos_shared.saturating_add(1);
        self.points = self.points.saturating_add(PHOTO_POST_POINTS);
        self.level = self.points / POINTS_PER_LEVEL + 1;
    }
}

/// A registered platform user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Stable identifier.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Unique, lower-cased email.
    pub email: EmailAddress,
    /// Free-text home location.
    pub location: Option<String>,
    /// Country of residence.
    pub country: Option<String>,
    /// Short biography.
    pub bio: Option<String>,
    /// Comma-separated outdoor interests.
    pub interests: Option<String>,
    /// Avatar image URL.
    #[serde(rename = "avatar")]
    pub avatar_url: Option<String>,
    /// Administrators may manage trails and other users.
    pub is_admin: bool,
    /// Gamified counters.
    pub stats: UserStats,
    /// Registration time.
    #[serde(rename = "joinDate")]
    pub created_at: DateTime<Utc>,
    /// Last profile change.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a non-admin user with default statistics.
    #[must_use]
    pub fn new(id: UserId, name: String, email: EmailAddress, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name,
            email,
            location: None,
            country: None,
            bio: None,
            interests: None,
            avatar_url: None,
            is_admin: false,
            stats: UserStats::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a validated profile update.
    pub fn apply(&mut self, update: ProfileUpdate, now: DateTime<Utc>) {
        let ProfileUpdate {
            name,
            email,
            location,
            country,
            bio,
            interests,
            avatar_url,
        } = update;
        if let Some(name) = name {
            self.name = name;
        }
        if let Some(email) = email {
            self.email = email;
        }
        if location.is_some() {
            self.location = location;
        }
        if country.is_some() {
            self.country = country;
        }
        if bio.is_some() {
            self.bio = bio;
        }
        if interests.is_some() {
            self.interests = interests;
        }
        if avatar_url.is_some() {
            self.avatar_url = avatar_url;
        }
        self.updated_at = now;
    }

    /// Whether `actor` may edit this profile.
    #[must_use]
    pub fn editable_by(&self, actor: &Self) -> bool {
        actor.is_admin || actor.id == self.id
    }
}

/// Raw profile fields as supplied by a client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdateInput {
    /// New name.
    pub name: Option<String>,
    /// New email.
    pub email: Option<String>,
    /// New location.
    pub location: Option<String>,
    /// New country.
    pub country: Option<String>,
    /// New bio.
    pub bio: Option<String>,
    /// New interests.
    pub interests: Option<String>,
    /// New avatar URL.
    pub avatar_url: Option<String>,
}

/// A validated partial profile update. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    name: Option<String>,
    email: Option<EmailAddress>,
    location: Option<String>,
    country: Option<String>,
    bio: Option<String>,
    interests: Option<String>,
    avatar_url: Option<String>,
}

impl ProfileUpdate {
    /// Validate raw input.
    ///
    /// # Errors
    /// Returns the first [`UserValidationError`] encountered.
    pub fn try_from_input(input: ProfileUpdateInput) -> Result<Self, UserValidationError> {
        Ok(Self {
            name: input.name.as_deref().map(validate_name).transpose()?,
            email: input.email.map(EmailAddress::new).transpose()?,
            location: input.location,
            country: input.country,
            bio: validate_bio(input.bio)?,
            interests: input.interests,
            avatar_url: input.avatar_url,
        })
    }

    /// Requested email change, if any.
    #[must_use]
    pub fn email(&self) -> Option<&EmailAddress> {
        self.email.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::{fixture, rstest};

    #[fixture]
    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    #[fixture]
    fn user(now: DateTime<Utc>) -> User {
        User::new(
            UserId::new("user-1").expect("id"),
            "Anna Berzina".to_owned(),
            EmailAddress::new("Anna@Example.lv").expect("email"),
            now,
        )
    }

    #[rstest]
    fn email_is_lower_cased(user: User) {
        assert_eq!(user.email.as_str(), "anna@example.lv");
    }

    #[rstest]
    #[case("no-at-sign")]
    #[case("two@@signs")]
    #[case("@missing.local")]
    #[case("spaces in@x.lv")]
    fn rejects_malformed_email(#[case] raw: &str) {
        assert_eq!(EmailAddress::new(raw), Err(UserValidationError::InvalidEmail));
    }

    #[rstest]
    fn photo_share_awards_points_and_levels_up() {
        let mut stats = UserStats {
            points: 95,
            ..UserStats::default()
        };
        stats.record_photo_shared();
        assert_eq!(stats.photos_shared, 1);
        assert_eq!(stats.points, 105);
        assert_eq!(stats.level, 2);
    }

    #[rstest]
    fn apply_changes_only_supplied_fields(mut user: User, now: DateTime<Utc>) {
        let update = ProfileUpdate::try_from_input(ProfileUpdateInput {
            bio: Some("Hiker".to_owned()),
            ..ProfileUpdateInput::default()
        })
        .expect("valid update");
        let later = now + chrono::Duration::minutes(5);
        user.apply(update, later);
        assert_eq!(user.bio.as_deref(), Some("Hiker"));
        assert_eq!(user.name, "Anna Berzina");
        assert_eq!(user.updated_at, later);
    }

    #[rstest]
    #[case(ProfileUpdateInput { name: Some("  ".into()), ..ProfileUpdateInput::default() }, "name")]
    #[case(ProfileUpdateInput { bio: Some("x".repeat(BIO_MAX + 1)), ..ProfileUpdateInput::default() }, "bio")]
    #[case(ProfileUpdateInput { email: Some("nope".into()), ..ProfileUpdateInput::default() }, "email")]
    fn invalid_updates_name_field(#[case] input: ProfileUpdateInput, #[case] field: &str) {
        let err = ProfileUpdate::try_from_input(input).expect_err("invalid");
        assert_eq!(err.field(), field);
    }

    #[rstest]
    fn serialises_profile_shape(user: User) {
        let json = serde_json::to_value(&user).expect("serialise");
        assert_eq!(json["isAdmin"], false);
        assert_eq!(json["stats"]["level"], 1);
        assert!(json.get("joinDate").is_some());
    }

    #[rstest]
    fn only_owner_or_admin_may_edit(user: User, now: DateTime<Utc>) {
        let mut other = User::new(
            UserId::new("user-2").expect("id"),
            "Other".to_owned(),
            EmailAddress::new("other@example.lv").expect("email"),
            now,
        );
        assert!(user.editable_by(&user));
        assert!(!user.editable_by(&other));
        other.is_admin = true;
        assert!(user.editable_by(&other));
    }
}
