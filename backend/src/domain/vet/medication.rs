//! Medication records and store statistics.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::Species;

/// Species tag matching every species.
pub const GENERAL_SPECIES: &str = "general";
/// Category counted for records without one.
pub const UNKNOWN_CATEGORY: &str = "unknown";

/// A medication known to the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Medication {
    /// Store key; see [`medication_slug`].
    pub id: String,
    /// Display name.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// Category such as `general` or `search-result`.
    pub category: Option<String>,
    /// Species wire names, or [`GENERAL_SPECIES`].
    pub species: Vec<String>,
    /// Dosage guidance.
    pub dosage: Option<String>,
    /// Known side effects.
    #[serde(default)]
    pub side_effects: Vec<String>,
    /// Where the record came from.
    pub source: String,
    /// Confidence of the generating provider.
    pub confidence: f64,
    /// Last refresh time.
    pub last_updated: DateTime<Utc>,
}

impl Medication {
    /// Whether the record applies to `species`.
    #[must_use]
    pub fn applies_to(&self, species: &str) -> bool {
        self.species
            .iter()
            .any(|tag| tag == species || tag == GENERAL_SPECIES)
    }

    /// Case-insensitive substring match on name or description.
    ///
    /// An empty query matches every record.
    #[must_use]
    pub fn matches_text(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        needle.is_empty()
            || self.name.to_lowercase().contains(&needle)
            || self.description.to_lowercase().contains(&needle)
    }

    /// Whether the record is in `category`.
    #[must_use]
    pub fn in_category(&self, category: &str) -> bool {
        self.category.as_deref() == Some(category)
    }
}

/// Store key derived from a display name: lower case, whitespace runs to `-`.
///
/// ```
/// use lvhub::domain::vet::medication_slug;
///
/// assert_eq!(medication_slug("Metacam  Oral"), "metacam-oral");
/// ```
#[must_use]
pub fn medication_slug(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

/// Key for the generated overview of a species.
#[must_use]
pub fn species_overview_id(species: Species) -> String {
    format!("{species}-general-medications")
}

/// Aggregate counts over the medication store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicationStats {
    /// Number of records.
    pub total: usize,
    /// Records per category.
    pub by_category: BTreeMap<String, usize>,
    /// Records per species tag.
    pub by_species: BTreeMap<String, usize>,
}

impl MedicationStats {
    /// Tally a set of records.
    #[must_use]
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a Medication>) -> Self {
        let mut stats = Self::default();
        for record in records {
            stats.total += 1;
            let category = record
                .category
                .clone()
                .unwrap_or_else(|| UNKNOWN_CATEGORY.to_owned());
            *stats.by_category.entry(category).or_default() += 1;
            for species in &record.species {
                *stats.by_species.entry(species.clone()).or_default() += 1;
            }
        }
        stats
    }
}
