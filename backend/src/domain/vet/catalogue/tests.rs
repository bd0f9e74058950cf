//! Tests for the medicine catalogue.

use super::*;
use crate::domain::ErrorCode;
use crate::domain::ports::{MockAiProvider, MockMedicationStore};
use crate::domain::Urgency;
use mockable::DefaultClock;
use rstest::rstest;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};

fn answer(text: &str) -> AiAnswer {
    AiAnswer {
        answer: text.to_owned(),
        confidence: 0.8,
        urgency: Urgency::Medium,
        reasoning: "mocked".to_owned(),
        provider: "Mock AI".to_owned(),
    }
}

fn echo_ai() -> MockAiProvider {
    let mut ai = MockAiProvider::new();
    ai.expect_generate_veterinary_response()
        .returning(|prompt| Ok(answer(&format!("About: {}", prompt.query))));
    ai
}

fn stored(id: &str, category: &str, species: &str) -> Medication {
    Medication {
        id: id.to_owned(),
        name: id.to_owned(),
        description: format!("{id} description"),
        category: Some(category.to_owned()),
        species: vec![species.to_owned()],
        dosage: None,
        side_effects: Vec::new(),
        source: "seed".to_owned(),
        confidence: 1.0,
        last_updated: Utc::now(),
    }
}

fn catalogue(store: MockMedicationStore, ai: MockAiProvider) -> (MedicineCatalogue, Arc<UsageTracker>) {
    let usage = Arc::new(UsageTracker::default());
    let catalogue = MedicineCatalogue::new(
        Arc::new(store),
        Arc::new(ai),
        Arc::clone(&usage),
        Arc::new(DefaultClock),
        CataloguePacing::immediate(),
    );
    (catalogue, usage)
}

#[rstest]
#[case("Amoxicillin is an antibiotic.\nDosage: 10mg/kg", 1, "Amoxicillin is an antibiotic")]
#[case("123 unknown", 4, "Medicine_4")]
#[case("", 2, "Medicine_2")]
fn medicine_names_come_from_first_line(#[case] text: &str, #[case] ordinal: usize, #[case] expected: &str) {
    assert_eq!(parse_medicine_name(text, ordinal), expected);
}

#[rstest]
#[tokio::test]
async fn empty_store_is_populated_with_common_list() {
    let mut store = MockMedicationStore::new();
    store.expect_search().returning(|_| Ok(Vec::new()));
    store
        .expect_save()
        .times(COMMON_MEDICATIONS.len())
        .returning(|m| Ok(m.id));
    let (catalogue, usage) = catalogue(store, echo_ai());

    let listed = catalogue
        .list(&MedicineFilter {
            species: Some(Species::Cat),
            limit: 5,
            ..MedicineFilter::default()
        })
        .await
        .expect("listed");

    assert_eq!(listed.len(), 5);
    assert_eq!(listed.first().map(|m| m.id.as_str()), Some("amoxicillin"));
    assert!(listed.iter().all(|m| m.in_category("general")));
    assert_eq!(
        usage.snapshot(0, Utc::now()).medications_generated,
        COMMON_MEDICATIONS.len() as u64
    );
}

#[rstest]
#[tokio::test]
async fn stored_medicines_are_filtered() {
    let mut store = MockMedicationStore::new();
    store.expect_search().returning(|_| {
        Ok(vec![
            stored("a", "antibiotic", "dog"),
            stored("b", "antibiotic", "cat"),
            stored("c", "analgesic", "general"),
            stored("d", "antibiotic", "general"),
        ])
    });
    store.expect_save().never();
    let mut ai = MockAiProvider::new();
    ai.expect_generate_veterinary_response().never();
    let (catalogue, _) = catalogue(store, ai);

    let listed = catalogue
        .list(&MedicineFilter {
            species: Some(Species::Dog),
            category: Some("antibiotic".to_owned()),
            search: None,
            limit: 50,
        })
        .await
        .expect("listed");
    let ids: Vec<_> = listed.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "d"]);
}

#[rstest]
#[tokio::test]
async fn unknown_medicine_is_described_and_kept() {
    let mut store = MockMedicationStore::new();
    store.expect_get().returning(|_| Ok(None));
    store
        .expect_save()
        .withf(|m| m.id == "Zylkene" && m.name == "Zylkene")
        .times(1)
        .returning(|m| Ok(m.id));
    let (catalogue, _) = catalogue(store, echo_ai());

    let found = catalogue.get("Zylkene").await.expect("found");
    assert!(found.description.contains("Zylkene medication"));
}

#[rstest]
#[tokio::test]
async fn provider_failure_means_not_found() {
    let mut store = MockMedicationStore::new();
    store.expect_get().returning(|_| Ok(None));
    store.expect_save().never();
    let mut ai = MockAiProvider::new();
    ai.expect_generate_veterinary_response()
        .returning(|_| Err(ProviderError::unavailable("offline")));
    let (catalogue, _) = catalogue(store, ai);

    let err = catalogue.get("mystery").await.expect_err("missing");
    assert_eq!(err.code(), ErrorCode::NotFound);
    assert_eq!(err.message(), "Medicine not found");
}

#[rstest]
#[tokio::test]
async fn species_without_medicines_gets_overview() {
    let mut store = MockMedicationStore::new();
    store.expect_by_species().returning(|_| Ok(Vec::new()));
    store.expect_save().times(1).returning(|m| Ok(m.id));
    let (catalogue, _) = catalogue(store, echo_ai());

    let found = catalogue
        .for_species(Species::GuineaPig, 20)
        .await
        .expect("overview");
    let overview = found.first().expect("one entry");
    assert_eq!(overview.id, "guinea_pig-general-medications");
    assert_eq!(overview.name, "Guinea_pig Medications");
    assert_eq!(overview.category.as_deref(), Some("species-specific"));
}

#[rstest]
#[case("", 0)]
#[case("itching", 1)]
#[tokio::test]
async fn search_falls_back_to_provider_for_real_queries(#[case] query: &str, #[case] results: usize) {
    let mut store = MockMedicationStore::new();
    store.expect_search().returning(|_| Ok(Vec::new()));
    let (catalogue, _) = catalogue(store, echo_ai());

    let found = catalogue
        .search(&MedicineSearch {
            query: query.to_owned(),
            species: None,
            symptoms: vec!["scratching".to_owned()],
            limit: 10,
        })
        .await
        .expect("searched");
    assert_eq!(found.len(), results);
    if let Some(result) = found.first() {
        assert_eq!(result.name, "Search Results: itching");
        assert!(result.description.contains("treat scratching in animals"));
        assert_eq!(result.species, vec!["general"]);
    }
}

#[rstest]
#[tokio::test]
async fn generation_skips_failed_items() {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);
    let mut ai = MockAiProvider::new();
    ai.expect_generate_veterinary_response().returning(move |_| {
        match seen.fetch_add(1, Ordering::SeqCst) {
            1 => Err(ProviderError::timeout(30u64)),
            n => Ok(answer(&format!("Drug{n} Tablets\nGive twice daily"))),
        }
    });
    let mut store = MockMedicationStore::new();
    store.expect_save().times(2).returning(|m| Ok(m.id));
    let (catalogue, _) = catalogue(store, ai);

    let generated = catalogue
        .generate(&GenerationRequest {
            species: Species::Dog,
            count: 3,
            category: Some("antiparasitic".to_owned()),
        })
        .await
        .expect("generated");

    assert_eq!(calls.load(Ordering::SeqCst), 3);
    let names: Vec<_> = generated.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["Drug", "Drug"]);
    assert!(generated.iter().all(|m| m.in_category("antiparasitic")));
}

#[rstest]
#[case(0)]
#[case(21)]
#[tokio::test]
async fn generation_count_is_bounded(#[case] count: usize) {
    let (catalogue, _) = catalogue(MockMedicationStore::new(), MockAiProvider::new());
    let err = catalogue
        .generate(&GenerationRequest {
            species: Species::Cat,
            count,
            category: None,
        })
        .await
        .expect_err("out of range");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn stats_report_store_and_provider() {
    let mut store = MockMedicationStore::new();
    store
        .expect_stats()
        .returning(|| Ok(MedicationStats::from_records(&[stored("a", "x", "dog")])));
    let mut ai = MockAiProvider::new();
    ai.expect_stats().returning(|| json!({"provider": "Mock AI"}));
    let (catalogue, _) = catalogue(store, ai);

    let stats = catalogue.stats().await.expect("stats");
    assert_eq!(stats.database.total, 1);
    assert_eq!(stats.integration, CATALOGUE_SOURCE);
    assert_eq!(stats.ai, json!({"provider": "Mock AI"}));
}
