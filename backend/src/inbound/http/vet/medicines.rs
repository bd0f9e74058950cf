//! Medicine catalogue endpoints.
//!
//! `/stats` and `/species/{species}` are registered ahead of `/{id}` so the
//! catch-all lookup does not shadow them.

use actix_web::{get, post, web};
use pagination::PageLimits;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

use super::Envelope;
use crate::domain::Species;
use crate::domain::vet::{
    CATALOGUE_SOURCE, CatalogueStats, GenerationRequest, Medication, MedicineFilter,
    MedicineSearch,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, MedicationSchema, SpeciesSchema};
use crate::inbound::http::state::VetState;
use crate::inbound::http::validation::{
    FieldName, missing_field_error, parse_optional_vocabulary, parse_page, parse_vocabulary,
};

const LIST_LIMITS: PageLimits = PageLimits::new(50, 500);
const SPECIES_LIMITS: PageLimits = PageLimits::new(20, 500);
const SEARCH_DEFAULT_LIMIT: usize = 10;
const GENERATE_DEFAULT_COUNT: usize = 10;
const NO_RESULTS: &str = "No results";

fn parse_limit(raw: Option<&str>, limits: PageLimits) -> ApiResult<usize> {
    Ok(parse_page(raw, None, limits)?.limit())
}

/// Medicines plus a free-form description of how they were found.
#[derive(Debug, Serialize, ToSchema)]
pub struct MedicineList {
    pub success: bool,
    #[schema(value_type = Vec<MedicationSchema>)]
    pub data: Vec<Medication>,
    pub metadata: Value,
}

impl MedicineList {
    fn new(data: Vec<Medication>, metadata: Value) -> Self {
        Self {
            success: true,
            data,
            metadata,
        }
    }
}

/// Filters for the medicine list.
#[derive(Debug, Deserialize, IntoParams)]
pub struct MedicineListQuery {
    #[param(value_type = Option<SpeciesSchema>)]
    pub species: Option<String>,
    pub category: Option<String>,
    /// Substring of the name or description.
    pub search: Option<String>,
    /// Defaults to 50.
    pub limit: Option<String>,
}

/// List medicines, generating the common list when the store is empty.
#[utoipa::path(
    get,
    path = "/api/v1/medicines",
    params(MedicineListQuery),
    responses(
        (status = 200, description = "Medicines", body = MedicineList),
        (status = 400, description = "Invalid filter", body = ErrorSchema)
    ),
    tags = ["medicines"],
    operation_id = "listMedicines"
)]
#[get("")]
pub async fn list_medicines(
    state: web::Data<VetState>,
    query: web::Query<MedicineListQuery>,
) -> ApiResult<web::Json<MedicineList>> {
    let MedicineListQuery {
        species,
        category,
        search,
        limit,
    } = query.into_inner();
    let filter = MedicineFilter {
        species: parse_optional_vocabulary(species.as_deref(), FieldName::new("species"))?,
        category: category.filter(|c| !c.trim().is_empty()),
        search: search.filter(|s| !s.trim().is_empty()),
        limit: parse_limit(limit.as_deref(), LIST_LIMITS)?,
    };
    let medicines = state.catalogue.list(&filter).await?;
    let metadata = serde_json::json!({
        "total": medicines.len(),
        "filters": {
            "species": filter.species,
            "category": filter.category,
            "search": filter.search,
        },
        "source": CATALOGUE_SOURCE,
    });
    Ok(web::Json(MedicineList::new(medicines, metadata)))
}

/// Store and provider figures.
#[utoipa::path(
    get,
    path = "/api/v1/medicines/stats",
    responses(
        (status = 200, description = "Catalogue figures", body = Object),
        (status = 503, description = "Store unavailable", body = ErrorSchema)
    ),
    tags = ["medicines"],
    operation_id = "medicineStats"
)]
#[get("/stats")]
pub async fn medicine_stats(
    state: web::Data<VetState>,
) -> ApiResult<web::Json<Envelope<CatalogueStats>>> {
    Ok(web::Json(Envelope::ok(state.catalogue.stats().await?)))
}

/// `limit` of a species lookup.
#[derive(Debug, Deserialize, IntoParams)]
pub struct SpeciesQuery {
    /// Defaults to 20.
    pub limit: Option<String>,
}

/// Medicines for one species.
#[utoipa::path(
    get,
    path = "/api/v1/medicines/species/{species}",
    params(("species" = SpeciesSchema, Path, description = "Species"), SpeciesQuery),
    responses(
        (status = 200, description = "Medicines", body = MedicineList),
        (status = 400, description = "Unknown species", body = ErrorSchema)
    ),
    tags = ["medicines"],
    operation_id = "medicinesForSpecies"
)]
#[get("/species/{species}")]
pub async fn medicines_for_species(
    state: web::Data<VetState>,
    path: web::Path<String>,
    query: web::Query<SpeciesQuery>,
) -> ApiResult<web::Json<MedicineList>> {
    let species: Species = parse_vocabulary(&path.into_inner(), FieldName::new("species"))?;
    let limit = parse_limit(query.limit.as_deref(), SPECIES_LIMITS)?;
    let medicines = state.catalogue.for_species(species, limit).await?;
    let metadata = serde_json::json!({
        "species": species,
        "total": medicines.len(),
        "source": CATALOGUE_SOURCE,
    });
    Ok(web::Json(MedicineList::new(medicines, metadata)))
}

/// Free-text medicine search.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SearchRequest {
    #[schema(example = "itching")]
    pub query: Option<String>,
    #[schema(value_type = Option<SpeciesSchema>)]
    pub species: Option<String>,
    #[serde(default)]
    pub symptoms: Vec<String>,
    /// Defaults to 10.
    pub limit: Option<usize>,
}

/// Search stored medicines; the provider answers when nothing matches.
#[utoipa::path(
    post,
    path = "/api/v1/medicines/search",
    request_body = SearchRequest,
    responses(
        (status = 200, description = "Matches", body = MedicineList),
        (status = 400, description = "Invalid request", body = ErrorSchema)
    ),
    tags = ["medicines"],
    operation_id = "searchMedicines"
)]
#[post("/search")]
pub async fn search_medicines(
    state: web::Data<VetState>,
    payload: web::Json<SearchRequest>,
) -> ApiResult<web::Json<MedicineList>> {
    let SearchRequest {
        query,
        species,
        symptoms,
        limit,
    } = payload.into_inner();
    let search = MedicineSearch {
        query: query.unwrap_or_default(),
        species: parse_optional_vocabulary(species.as_deref(), FieldName::new("species"))?,
        symptoms,
        limit: limit.unwrap_or(SEARCH_DEFAULT_LIMIT),
    };
    let medicines = state.catalogue.search(&search).await?;
    let source = medicines
        .first()
        .map_or_else(|| NO_RESULTS.to_owned(), |m| m.source.clone());
    let metadata = serde_json::json!({
        "query": search.query,
        "species": search.species,
        "symptoms": search.symptoms,
        "total": medicines.len(),
        "source": source,
    });
    Ok(web::Json(MedicineList::new(medicines, metadata)))
}

/// Request to generate medicine entries.
#[derive(Debug, Deserialize, ToSchema)]
pub struct GenerateRequest {
    #[schema(value_type = SpeciesSchema)]
    pub species: Option<String>,
    /// Between 1 and 20; defaults to 10.
    #[schema(minimum = 1, maximum = 20)]
    pub count: Option<usize>,
    pub category: Option<String>,
}

/// Generate medicine entries with the AI provider.
#[utoipa::path(
    post,
    path = "/api/v1/medicines/generate",
    request_body = GenerateRequest,
    responses(
        (status = 200, description = "Generated entries", body = MedicineList),
        (status = 400, description = "Invalid request", body = ErrorSchema)
    ),
    tags = ["medicines"],
    operation_id = "generateMedicines"
)]
#[post("/generate")]
pub async fn generate_medicines(
    state: web::Data<VetState>,
    payload: web::Json<GenerateRequest>,
) -> ApiResult<web::Json<MedicineList>> {
    let GenerateRequest {
        species,
        count,
        category,
    } = payload.into_inner();
    let raw_species = species.ok_or_else(|| missing_field_error(FieldName::new("species")))?;
    let request = GenerationRequest {
        species: parse_vocabulary(&raw_species, FieldName::new("species"))?,
        count: count.unwrap_or(GENERATE_DEFAULT_COUNT),
        category: category.filter(|c| !c.trim().is_empty()),
    };
    let medicines = state.catalogue.generate(&request).await?;
    let metadata = serde_json::json!({
        "generated": medicines.len(),
        "requested": request.count,
        "species": request.species,
        "category": request.category,
    });
    Ok(web::Json(MedicineList::new(medicines, metadata)))
}

/// One medicine, described by the provider on first request.
#[utoipa::path(
    get,
    path = "/api/v1/medicines/{id}",
    params(("id" = String, Path, description = "Medicine id, e.g. `amoxicillin`")),
    responses(
        (status = 200, description = "Medicine", body = Envelope<MedicationSchema>),
        (status = 404, description = "Unknown medicine", body = ErrorSchema)
    ),
    tags = ["medicines"],
    operation_id = "getMedicine"
)]
#[get("/{id}")]
pub async fn get_medicine(
    state: web::Data<VetState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Envelope<Medication>>> {
    let medicine = state.catalogue.get(&path.into_inner()).await?;
    Ok(web::Json(Envelope::ok(medicine)))
}
