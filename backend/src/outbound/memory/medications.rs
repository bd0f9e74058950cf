//! `MedicationStore` over a process-local map.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tokio::sync::RwLock;

use crate::domain::ports::{MedicationStore, MedicationStoreError};
use crate::domain::vet::{Medication, MedicationStats};

/// Medication records keyed by id.
pub struct InMemoryMedicationStore {
    records: RwLock<HashMap<String, Medication>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryMedicationStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            clock,
        }
    }

    async fn matching(&self, keep: impl Fn(&Medication) -> bool) -> Vec<Medication> {
        let mut found: Vec<Medication> = self
            .records
            .read()
            .await
            .values()
            .filter(|record| keep(record))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name));
        found
    }
}

#[async_trait]
impl MedicationStore for InMemoryMedicationStore {
    async fn save(&self, mut medication: Medication) -> Result<String, MedicationStoreError> {
        if medication.id.trim().is_empty() {
            medication.id = self.clock.utc().timestamp_millis().to_string();
        }
        let id = medication.id.clone();
        self.records.write().await.insert(id.clone(), medication);
        Ok(id)
    }

    async fn get(&self, id: &str) -> Result<Option<Medication>, MedicationStoreError> {
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn all(&self) -> Result<Vec<Medication>, MedicationStoreError> {
        Ok(self.matching(|_| true).await)
    }

    async fn delete(&self, id: &str) -> Result<bool, MedicationStoreError> {
        Ok(self.records.write().await.remove(id).is_some())
    }

    async fn search(&self, query: &str) -> Result<Vec<Medication>, MedicationStoreError> {
        Ok(self.matching(|record| record.matches_text(query)).await)
    }

    async fn by_species(&self, species: &str) -> Result<Vec<Medication>, MedicationStoreError> {
        Ok(self.matching(|record| record.applies_to(species)).await)
    }

    async fn stats(&self) -> Result<MedicationStats, MedicationStoreError> {
        Ok(MedicationStats::from_records(self.records.read().await.values()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MutableClock;
    use chrono::{TimeZone, Utc};
    use rstest::{fixture, rstest};

    fn medication(id: &str, name: &str, species: &[&str], category: &str) -> Medication {
        Medication {
            id: id.to_owned(),
            name: name.to_owned(),
            description: format!("{name} for pets"),
            category: Some(category.to_owned()),
            species: species.iter().map(|s| (*s).to_owned()).collect(),
            dosage: None,
            side_effects: Vec::new(),
            source: "test".to_owned(),
            confidence: 0.8,
            last_updated: Utc::now(),
        }
    }

    #[fixture]
    fn clock() -> Arc<MutableClock> {
        let start = Utc
            .with_ymd_and_hms(2026, 3, 1, 12, 0, 0)
            .single()
            .expect("valid time");
        Arc::new(MutableClock::new(start))
    }

    async fn stocked(clock: Arc<MutableClock>) -> InMemoryMedicationStore {
        let store = InMemoryMedicationStore::new(clock);
        for record in [
            medication("amoxicillin", "Amoxicillin", &["dog", "cat"], "general"),
            medication("metacam", "Metacam", &["dog"], "general"),
            medication("fipronil", "Fipronil", &["general"], "medication"),
        ] {
            store.save(record).await.expect("save");
        }
        store
    }

    #[rstest]
    #[tokio::test]
    async fn blank_id_takes_clock_millis(clock: Arc<MutableClock>) {
        let expected = clock.utc().timestamp_millis().to_string();
        let store = InMemoryMedicationStore::new(clock);
        let id = store
            .save(medication(" ", "Unnamed", &["cat"], "general"))
            .await
            .expect("save");
        assert_eq!(id, expected);
        assert!(store.get(&id).await.expect("get").is_some());
    }

    #[rstest]
    #[case("cat", vec!["Amoxicillin", "Fipronil"])]
    #[case("bird", vec!["Fipronil"])]
    #[tokio::test]
    async fn species_lookup_includes_general(
        clock: Arc<MutableClock>,
        #[case] species: &str,
        #[case] expected: Vec<&str>,
    ) {
        let store = stocked(clock).await;
        let names: Vec<_> = store
            .by_species(species)
            .await
            .expect("lookup")
            .into_iter()
            .map(|m| m.name)
            .collect();
        assert_eq!(names, expected);
    }

    #[rstest]
    #[tokio::test]
    async fn search_and_stats(clock: Arc<MutableClock>) {
        let store = stocked(clock).await;
        let hits = store.search("METACAM").await.expect("search");
        assert_eq!(hits.len(), 1);

        let stats = store.stats().await.expect("stats");
        assert_eq!(stats.total, 3);
        assert_eq!(stats.by_category.get("general"), Some(&2));
        assert_eq!(stats.by_species.get("dog"), Some(&2));

        assert!(store.delete("metacam").await.expect("delete"));
        assert_eq!(store.all().await.expect("all").len(), 2);
    }
}
