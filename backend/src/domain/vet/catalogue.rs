//! Medicine catalogue backed by the medication store, filled on demand by
//! the configured [`AiProvider`].

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use mockable::Clock;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use super::usage::UsageTracker;
use super::{
    AiAnswer, GENERAL_SPECIES, Medication, MedicationStats, VetPrompt, medication_slug,
    species_overview_id,
};
use crate::domain::ports::{AiProvider, MedicationStore, ProviderError};
use crate::domain::{Error, Language, Species};

/// Medications described when the catalogue is empty.
pub const COMMON_MEDICATIONS: [&str; 15] = [
    "Amoxicillin",
    "Prednisone",
    "Metacam",
    "Rimadyl",
    "Tramadol",
    "Gabapentin",
    "Furosemide",
    "Enalapril",
    "Metronidazole",
    "Cephalexin",
    "Prednisolone",
    "Carprofen",
    "Buprenorphine",
    "Pimobendan",
    "Dexamethasone",
];

/// Upper bound for `generate` requests.
pub const GENERATE_MAX: usize = 20;
/// Label reported as the listing source.
pub const CATALOGUE_SOURCE: &str = "Local AI + Database";

const LOOKUP_SOURCE: &str = "Local AI Model";
const GENERATED_SOURCE: &str = "Local AI Generated";
const SEARCH_SOURCE: &str = "Local AI Search";
const DEFAULT_CATEGORY: &str = "general";
const LOOKUP_CATEGORY: &str = "medication";

/// Pauses between provider calls when producing several entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CataloguePacing {
    /// Between entries of the common list.
    pub list: Duration,
    /// Between entries of a `generate` request.
    pub generate: Duration,
}

impl Default for CataloguePacing {
    fn default() -> Self {
        Self {
            list: Duration::from_secs(1),
            generate: Duration::from_secs(2),
        }
    }
}

impl CataloguePacing {
    /// No pauses at all.
    #[must_use]
    pub const fn immediate() -> Self {
        Self {
            list: Duration::ZERO,
            generate: Duration::ZERO,
        }
    }
}

/// Filters for [`MedicineCatalogue::list`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MedicineFilter {
    pub species: Option<Species>,
    pub category: Option<String>,
    pub search: Option<String>,
    pub limit: usize,
}

/// Parameters for [`MedicineCatalogue::search`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MedicineSearch {
    pub query: String,
    pub species: Option<Species>,
    pub symptoms: Vec<String>,
    pub limit: usize,
}

/// Parameters for [`MedicineCatalogue::generate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub species: Species,
    /// Entries wanted, `1..=GENERATE_MAX`.
    pub count: usize,
    pub category: Option<String>,
}

/// Figures served by `GET /api/v1/medicines/stats`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogueStats {
    pub database: MedicationStats,
    pub ai: Value,
    pub integration: &'static str,
    pub last_updated: DateTime<Utc>,
}

static NAME_RE: OnceLock<Option<Regex>> = OnceLock::new();

/// Display name taken from the leading letters of an answer's first line.
fn parse_medicine_name(answer: &str, ordinal: usize) -> String {
    let pattern = NAME_RE.get_or_init(|| Regex::new(r"^([A-Za-z\s]+)").ok());
    answer
        .lines()
        .next()
        .zip(pattern.as_ref())
        .and_then(|(line, pattern)| pattern.captures(line))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_owned())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| format!("Medicine_{ordinal}"))
}

fn capitalise(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// Medicine catalogue use-cases.
#[derive(Clone)]
pub struct MedicineCatalogue {
    store: Arc<dyn MedicationStore>,
    ai: Arc<dyn AiProvider>,
    usage: Arc<UsageTracker>,
    clock: Arc<dyn Clock>,
    pacing: CataloguePacing,
}

impl MedicineCatalogue {
    /// Create the catalogue.
    pub fn new(
        store: Arc<dyn MedicationStore>,
        ai: Arc<dyn AiProvider>,
        usage: Arc<UsageTracker>,
        clock: Arc<dyn Clock>,
        pacing: CataloguePacing,
    ) -> Self {
        Self {
            store,
            ai,
            usage,
            clock,
            pacing,
        }
    }

    async fn ask_ai(
        &self,
        query: String,
        species: &str,
        purpose: &str,
    ) -> Result<AiAnswer, ProviderError> {
        let prompt = VetPrompt::new(query, species, purpose, Language::English);
        self.ai.generate_veterinary_response(&prompt).await
    }

    fn record(
        &self,
        (id, name): (String, String),
        answer: AiAnswer,
        category: &str,
        species: Vec<String>,
        source: &str,
    ) -> Medication {
        Medication {
            id,
            name,
            description: answer.answer,
            category: Some(category.to_owned()),
            species,
            dosage: None,
            side_effects: Vec::new(),
            source: source.to_owned(),
            confidence: answer.confidence,
            last_updated: self.clock.utc(),
        }
    }

    /// Describe one medication with the provider; `None` when it fails.
    async fn describe(&self, name: &str) -> Option<Medication> {
        let query = format!(
            "Tell me about {name} medication for animals. Include dosage, side effects, and what it treats."
        );
        match self.ask_ai(query, GENERAL_SPECIES, "medication_lookup").await {
            Ok(answer) => Some(self.record(
                (medication_slug(name), name.to_owned()),
                answer,
                LOOKUP_CATEGORY,
                vec![GENERAL_SPECIES.to_owned()],
                LOOKUP_SOURCE,
            )),
            Err(err) => {
                warn!(medication = name, error = %err, "medication lookup failed");
                None
            }
        }
    }

    async fn populate(&self) -> Result<Vec<Medication>, Error> {
        info!("medication store empty, generating the common list");
        let mut generated = Vec::with_capacity(COMMON_MEDICATIONS.len());
        for (index, name) in COMMON_MEDICATIONS.iter().enumerate() {
            if index > 0 && !self.pacing.list.is_zero() {
                tokio::time::sleep(self.pacing.list).await;
            }
            if let Some(mut medication) = self.describe(name).await {
                medication.category = Some(DEFAULT_CATEGORY.to_owned());
                self.store.save(medication.clone()).await?;
                generated.push(medication);
            }
        }
        self.usage.record_medications(generated.len());
        info!(count = generated.len(), "generated common medications");
        Ok(generated)
    }

    /// Search the store, filling it first when empty, then filter.
    ///
    /// # Errors
    /// Propagates store failures.
    pub async fn list(&self, filter: &MedicineFilter) -> Result<Vec<Medication>, Error> {
        let query = filter.search.as_deref().unwrap_or_default();
        let mut medicines = self.store.search(query).await?;
        if medicines.is_empty() {
            medicines = self.populate().await?;
        }
        Ok(medicines
            .into_iter()
            .filter(|m| filter.species.is_none_or(|s| m.applies_to(s.as_str())))
            .filter(|m| {
                filter
                    .category
                    .as_deref()
                    .is_none_or(|category| m.in_category(category))
            })
            .take(filter.limit)
            .collect())
    }

    /// One medicine, described and stored on first request.
    ///
    /// # Errors
    /// Returns `not_found` when the provider cannot describe it.
    pub async fn get(&self, id: &str) -> Result<Medication, Error> {
        if let Some(found) = self.store.get(id).await? {
            return Ok(found);
        }
        info!(medication_id = id, "medicine not stored, asking provider");
        let mut medication = self
            .describe(id)
            .await
            .ok_or_else(|| Error::not_found("Medicine not found"))?;
        id.clone_into(&mut medication.id);
        self.store.save(medication.clone()).await?;
        self.usage.record_medications(1);
        Ok(medication)
    }

    /// Medicines for a species; an overview is generated when none exist.
    ///
    /// # Errors
    /// Propagates store and provider failures.
    pub async fn for_species(&self, species: Species, limit: usize) -> Result<Vec<Medication>, Error> {
        let mut medicines = self.store.by_species(species.as_str()).await?;
        if medicines.is_empty() {
            info!(%species, "no medicines stored for species, generating overview");
            let query = format!(
                "List common medications used for {species}s, including their uses and dosages."
            );
            let answer = self
                .ask_ai(query, species.as_str(), "species_medications")
                .await?;
            let overview = self.record(
                (
                    species_overview_id(species),
                    format!("{} Medications", capitalise(species.as_str())),
                ),
                answer,
                "species-specific",
                vec![species.as_str().to_owned()],
                GENERATED_SOURCE,
            );
            self.store.save(overview.clone()).await?;
            self.usage.record_medications(1);
            medicines = vec![overview];
        }
        medicines.truncate(limit);
        Ok(medicines)
    }

    /// Store search, with one provider-written result when nothing matches.
    ///
    /// # Errors
    /// Propagates store and provider failures.
    pub async fn search(&self, search: &MedicineSearch) -> Result<Vec<Medication>, Error> {
        let mut medicines = self.store.search(&search.query).await?;
        if medicines.is_empty() && !search.query.trim().is_empty() {
            let target = search.species.map_or("animals", Species::as_str);
            let query = if search.symptoms.is_empty() {
                format!("Find medications related to: {} for {target}", search.query)
            } else {
                format!(
                    "What medications are used to treat {} in {target}? Query: {}",
                    search.symptoms.join(", "),
                    search.query
                )
            };
            let species = search.species.map_or(GENERAL_SPECIES, Species::as_str);
            let answer = self.ask_ai(query, species, "medication_search").await?;
            medicines = vec![self.record(
                (
                    format!("search-{}", self.clock.utc().timestamp_millis()),
                    format!("Search Results: {}", search.query),
                ),
                answer,
                "search-result",
                vec![species.to_owned()],
                SEARCH_SOURCE,
            )];
        }
        medicines.truncate(search.limit);
        Ok(medicines)
    }

    /// Ask the provider for `count` medicines; failed items are skipped.
    ///
    /// # Errors
    /// `invalid_request` when `count` is out of range; store failures
    /// propagate.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<Vec<Medication>, Error> {
        if !(1..=GENERATE_MAX).contains(&request.count) {
            return Err(Error::invalid_request(format!(
                "count must be between 1 and {GENERATE_MAX}"
            )));
        }
        let species = request.species;
        let category = request.category.as_deref().unwrap_or(DEFAULT_CATEGORY);
        info!(count = request.count, %species, category, "generating medicines");
        let mut generated = Vec::with_capacity(request.count);
        for ordinal in 1..=request.count {
            if ordinal > 1 && !self.pacing.generate.is_zero() {
                tokio::time::sleep(self.pacing.generate).await;
            }
            let query = request.category.as_deref().map_or_else(
                || format!("Tell me about a medication commonly used for {species}s. Include name, usage, dosage, and side effects."),
                |category| format!("Tell me about a {category} medication used for {species}s. Include name, usage, dosage, and side effects."),
            );
            let answer = match self
                .ask_ai(query, species.as_str(), "medication_generation")
                .await
            {
                Ok(answer) => answer,
                Err(err) => {
                    warn!(ordinal, error = %err, "failed to generate medicine");
                    continue;
                }
            };
            let name = parse_medicine_name(&answer.answer, ordinal);
            let medication = self.record(
                (medication_slug(&name), name),
                answer,
                category,
                vec![species.as_str().to_owned()],
                GENERATED_SOURCE,
            );
            self.store.save(medication.clone()).await?;
            generated.push(medication);
        }
        self.usage.record_medications(generated.len());
        Ok(generated)
    }

    /// Store and provider figures.
    ///
    /// # Errors
    /// Propagates store failures.
    pub async fn stats(&self) -> Result<CatalogueStats, Error> {
        Ok(CatalogueStats {
            database: self.store.stats().await?,
            ai: self.ai.stats().await,
            integration: CATALOGUE_SOURCE,
            last_updated: self.clock.utc(),
        })
    }
}

#[cfg(test)]
mod tests;
