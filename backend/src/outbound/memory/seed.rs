//! Fixture records loaded into the in-memory stores at start-up.

use chrono::{DateTime, Utc};

use crate::domain::{
    Difficulty, EmailAddress, IdValidationError, LocalizedText, Pricing, Trail, TrailContact,
    TrailDraft, TrailId, User, UserId, UserValidationError,
};

/// Email of the seeded administrator.
pub const ADMIN_EMAIL: &str = "emalinovskis@me.com";

/// A fixture failed its own validation.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error(transparent)]
    Id(#[from] IdValidationError),
    #[error(transparent)]
    User(#[from] UserValidationError),
}

struct SeedUser {
    id: &'static str,
    name: &'static str,
    email: &'static str,
    location: &'static str,
    bio: &'static str,
    interests: &'static str,
    is_admin: bool,
}

const USERS: [SeedUser; 5] = [
    SeedUser {
        id: "admin-1",
        name: "Admin",
        email: ADMIN_EMAIL,
        location: "Riga",
        bio: "Platform administrator and adventure enthusiast",
        interests: "Hiking, Photography, Nature Conservation",
        is_admin: true,
    },
    SeedUser {
        id: "user-1",
        name: "Adventure Explorer",
        email: "explorer@example.com",
        location: "Riga",
        bio: "Love exploring Latvian nature",
        interests: "Hiking, Photography",
        is_admin: false,
    },
    SeedUser {
        id: "user-2",
        name: "Nature Lover",
        email: "nature@example.com",
        location: "Daugavpils",
        bio: "Passionate about wildlife",
        interests: "Wildlife, Camping",
        is_admin: false,
    },
    SeedUser {
        id: "user-3",
        name: "Trail Master",
        email: "trails@example.com",
        location: "Liepāja",
        bio: "Professional hiking guide",
        interests: "Guiding, Mountaineering",
        is_admin: false,
    },
    SeedUser {
        id: "user-4",
        name: "Photo Hunter",
        email: "photos@example.com",
        location: "Ventspils",
        bio: "Adventure photographer",
        interests: "Photography, Travel",
        is_admin: false,
    },
];

/// The administrator and four sample members.
///
/// # Errors
/// Only if a fixture stops satisfying the id or email rules.
pub fn users(now: DateTime<Utc>) -> Result<Vec<User>, SeedError> {
    USERS
        .iter()
        .map(|seed| {
            let mut user = User::new(
                UserId::new(seed.id)?,
                seed.name.to_owned(),
                EmailAddress::new(seed.email)?,
                now,
            );
            user.location = Some(seed.location.to_owned());
            user.country = Some("Latvia".to_owned());
            user.bio = Some(seed.bio.to_owned());
            user.interests = Some(seed.interests.to_owned());
            user.is_admin = seed.is_admin;
            Ok(user)
        })
        .collect()
}

/// The Gauja National Park trail.
///
/// # Errors
/// Only if the fixture id stops satisfying the id rules.
pub fn trails(now: DateTime<Utc>) -> Result<Vec<Trail>, SeedError> {
    let gauja = TrailDraft {
        name: LocalizedText::new(
            "Gauja National Park Trail",
            "Gaujas Nacionālā parka taka",
            "Тропа Национального парка Гауя",
        ),
        description: LocalizedText::new(
            "Beautiful trail through Latvia's oldest national park",
            "Skaista taka cauri Latvijas vecākajam nacionālajam parkam",
            "Красивая тропа через старейший национальный парк Латвии",
        ),
        region: "Gauja National Park".to_owned(),
        difficulty: Difficulty::Moderate,
        distance: Some("8.5 km".to_owned()),
        duration: Some("3-4 hours".to_owned()),
        elevation: Some("120m".to_owned()),
        latitude: Some(57.1316),
        longitude: Some(25.4016),
        image_url: Some(
            "https://images.unsplash.com/photo-1441974231531-c6227db76b6e?w=800&h=600&fit=crop"
                .to_owned(),
        ),
        features: ["Scenic views", "Wildlife", "Historical sites"]
            .map(str::to_owned)
            .to_vec(),
        accessibility: Some("Moderate difficulty, suitable for experienced hikers".to_owned()),
        best_time_to_visit: Some("May - October".to_owned()),
        trail_condition: Some("good".to_owned()),
        parking_available: true,
        guided_tours_available: true,
        pricing: Pricing {
            free_entry: true,
            adult_price: 0.0,
            child_price: 0.0,
        },
        contact: TrailContact {
            phone: Some("+371 64781624".to_owned()),
            email: None,
            website: Some("https://www.daba.gov.lv/public/lat/gaujas_np/".to_owned()),
        },
    };
    Ok(vec![Trail::from_draft(TrailId::new("trail-1")?, gauja, now)])
}
