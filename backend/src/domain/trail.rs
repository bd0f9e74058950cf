//! Hiking trails with trilingual descriptions, visitor information and
//! pricing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::TrailId;
use super::vocabulary::closed_vocabulary;

closed_vocabulary! {
    /// Physical difficulty of a trail.
    pub enum Difficulty {
        /// Suitable for everyone.
        Easy => "easy",
        /// Some climbing or distance.
        Moderate => "moderate",
        /// Demanding terrain.
        Hard => "hard",
        /// Experienced hikers only.
        Expert => "expert",
    }
}

/// Condition reported for a newly created trail.
pub const DEFAULT_TRAIL_CONDITION: &str = "good";

/// Text in English, Latvian and Russian.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
    /// English text.
    pub en: String,
    /// Latvian text.
    pub lv: String,
    /// Russian text.
    pub ru: String,
}

impl LocalizedText {
    /// Build from the three translations.
    #[must_use]
    pub fn new(en: impl Into<String>, lv: impl Into<String>, ru: impl Into<String>) -> Self {
        Self {
            en: en.into(),
            lv: lv.into(),
            ru: ru.into(),
        }
    }
}

/// Ways to reach the trail operator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrailContact {
    /// Phone number.
    pub phone: Option<String>,
    /// Email address.
    pub email: Option<String>,
    /// Website URL.
    pub website: Option<String>,
}

/// Entry fees in euros.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pricing {
    /// Whether entry is free.
    pub free_entry: bool,
    /// Adult ticket price.
    pub adult_price: f64,
    /// Child ticket price.
    pub child_price: f64,
}

/// Validation failures for trail input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TrailValidationError {
    /// English name was blank.
    #[error("name.en must not be empty")]
    EmptyName,
    /// Region was blank.
    #[error("region must not be empty")]
    EmptyRegion,
    /// Latitude outside [-90, 90].
    #[error("latitude must be between -90 and 90")]
    LatitudeOutOfRange,
    /// Longitude outside [-180, 180].
    #[error("longitude must be between -180 and 180")]
    LongitudeOutOfRange,
    /// A price was negative or not finite.
    #[error("{field} must be a non-negative amount")]
    InvalidPrice {
        /// Offending price field.
        field: &'static str,
    },
}

impl TrailValidationError {
    /// Name of the offending input field.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::EmptyName => "name.en",
            Self::EmptyRegion => "region",
            Self::LatitudeOutOfRange => "latitude",
            Self::LongitudeOutOfRange => "longitude",
            Self::InvalidPrice { field } => field,
        }
    }
}

/// Client-supplied trail fields, validated by [`TrailDraft::validate`].
#[derive(Debug, Clone, PartialEq)]
pub struct TrailDraft {
    /// Trilingual name.
    pub name: LocalizedText,
    /// Trilingual description.
    pub description: LocalizedText,
    /// Region within Latvia.
    pub region: String,
    /// Physical difficulty.
    pub difficulty: Difficulty,
    /// Length, free text such as `12 km`.
    pub distance: Option<String>,
    /// Expected duration, free text.
    pub duration: Option<String>,
    /// Elevation gain, free text.
    pub elevation: Option<String>,
    /// Latitude of the trailhead.
    pub latitude: Option<f64>,
    /// Longitude of the trailhead.
    pub longitude: Option<f64>,
    /// Cover image URL.
    pub image_url: Option<String>,
    /// Notable features.
    pub features: Vec<String>,
    /// Accessibility notes.
    pub accessibility: Option<String>,
    /// Recommended season.
    pub best_time_to_visit: Option<String>,
    /// Current condition; defaults to [`DEFAULT_TRAIL_CONDITION`].
    pub trail_condition: Option<String>,
    /// Whether parking is available.
    pub parking_available: bool,
    /// Whether guided tours are offered.
    pub guided_tours_available: bool,
    /// Entry fees.
    pub pricing: Pricing,
    /// Operator contact details.
    pub contact: TrailContact,
}

impl TrailDraft {
    /// Check field invariants.
    ///
    /// # Errors
    /// Returns the first [`TrailValidationError`] found.
    pub fn validate(self) -> Result<Self, TrailValidationError> {
        if self.name.en.trim().is_empty() {
            return Err(TrailValidationError::EmptyName);
        }
        if self.region.trim().is_empty() {
            return Err(TrailValidationError::EmptyRegion);
        }
        if self.latitude.is_some_and(|lat| !(-90.0..=90.0).contains(&lat)) {
            return Err(TrailValidationError::LatitudeOutOfRange);
        }
        if self
            .longitude
            .is_some_and(|lon| !(-180.0..=180.0).contains(&lon))
        {
            return Err(TrailValidationError::LongitudeOutOfRange);
        }
        for (field, price) in [
            ("adultPrice", self.pricing.adult_price),
            ("childPrice", self.pricing.child_price),
        ] {
            if !price.is_finite() || price < 0.0 {
                return Err(TrailValidationError::InvalidPrice { field });
            }
        }
        Ok(self)
    }
}

/// A published trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trail {
    /// Stable identifier.
    pub id: TrailId,
    /// Trilingual name.
    pub name: LocalizedText,
    /// Trilingual description.
    pub description: LocalizedText,
    /// Region within Latvia.
    pub region: String,
    /// Physical difficulty.
    pub difficulty: Difficulty,
    /// Length.
    pub distance: Option<String>,
    /// Expected duration.
    pub duration: Option<String>,
    /// Elevation gain.
    pub elevation: Option<String>,
    /// Latitude of the trailhead.
    pub latitude: Option<f64>,
    /// Longitude of the trailhead.
    pub longitude: Option<f64>,
    /// Cover image URL.
    pub image_url: Option<String>,
    /// Notable features.
    pub features: Vec<String>,
    /// Accessibility notes.
    pub accessibility: Option<String>,
    /// Recommended season.
    pub best_time_to_visit: Option<String>,
    /// Current condition.
    pub trail_condition: String,
    /// Whether parking is available.
    pub parking_available: bool,
    /// Whether guided tours are offered.
    pub guided_tours_available: bool,
    /// Entry fees.
    #[serde(flatten)]
    pub pricing: Pricing,
    /// Operator contact details.
    pub contact: TrailContact,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl Trail {
    /// Publish a validated draft.
    #[must_use]
    pub fn from_draft(id: TrailId, draft: TrailDraft, now: DateTime<Utc>) -> Self {
        let mut trail = Self {
            id,
            name: LocalizedText::default(),
            description: LocalizedText::default(),
            region: String::new(),
            difficulty: Difficulty::Easy,
            distance: None,
            duration: None,
            elevation: None,
            latitude: None,
            longitude: None,
            image_url: None,
            features: Vec::new(),
            accessibility: None,
            best_time_to_visit: None,
            trail_condition: DEFAULT_TRAIL_CONDITION.to_owned(),
            parking_available: false,
            guided_tours_available: false,
            pricing: Pricing::default(),
            contact: TrailContact::default(),
            created_at: now,
            updated_at: now,
        };
        trail.replace_with(draft, now);
        trail
    }

    /// Replace every editable field with the draft's values.
    pub fn replace_with(&mut self, draft: TrailDraft, now: DateTime<Utc>) {
        let TrailDraft {
            name,
            description,
            region,
            difficulty,
            distance,
            duration,
            elevation,
            latitude,
            longitude,
            image_url,
            features,
            accessibility,
            best_time_to_visit,
            trail_condition,
            parking_available,
            guided_tours_available,
            pricing,
            contact,
        } = draft;
        self.name = name;
        self.description = description;
        self.region = region;
        self.difficulty = difficulty;
        self.distance = distance;
        self.duration = duration;
        self.elevation = elevation;
        self.latitude = latitude;
        self.longitude = longitude;
        self.image_url = image_url;
        self.features = features;
        self.accessibility = accessibility;
        self.best_time_to_visit = best_time_to_visit;
        self.trail_condition =
            trail_condition.unwrap_or_else(|| DEFAULT_TRAIL_CONDITION.to_owned());
        self.parking_available = parking_available;
        self.guided_tours_available = guided_tours_available;
        self.pricing = pricing;
        self.contact = contact;
        self.updated_at = now;
    }
}

/// Optional list filters for trails.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrailFilter {
    /// Only trails of this difficulty.
    pub difficulty: Option<Difficulty>,
    /// Only trails whose region matches, ignoring case.
    pub region: Option<String>,
}

impl TrailFilter {
    /// Whether `trail` passes the filter.
    #[must_use]
    pub fn matches(&self, trail: &Trail) -> bool {
        let difficulty_ok = self.difficulty.is_none_or(|d| d == trail.difficulty);
        let region_ok = self
            .region
            .as_deref()
            .is_none_or(|region| trail.region.to_lowercase() == region.trim().to_lowercase());
        difficulty_ok && region_ok
    }
}
