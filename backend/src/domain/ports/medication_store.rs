//! Port for the medication database.
use async_trait::async_trait;

use crate::domain::vet::{Medication, MedicationStats};

use super::define_port_error;

define_port_error! {
    /// Errors raised by medication store adapters.
    pub enum MedicationStoreError {
        /// Store could not be reached.
        Unavailable { message: String } => "medication store unavailable: {message}" => unavailable,
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MedicationStore: Send + Sync {
    /// Insert or replace a record, returning its id. A blank id is replaced
    /// with the current timestamp in milliseconds.
    async fn save(&self, medication: Medication) -> Result<String, MedicationStoreError>;

    /// Fetch one record.
    async fn get(&self, id: &str) -> Result<Option<Medication>, MedicationStoreError>;

    /// Every record.
    async fn all(&self) -> Result<Vec<Medication>, MedicationStoreError>;

    /// Remove a record; `false` when absent.
    async fn delete(&self, id: &str) -> Result<bool, MedicationStoreError>;

    /// Case-insensitive substring search on name or description.
    async fn search(&self, query: &str) -> Result<Vec<Medication>, MedicationStoreError>;

    /// Records applying to a species wire name.
    async fn by_species(&self, species: &str) -> Result<Vec<Medication>, MedicationStoreError>;

    /// Aggregate counts.
    async fn stats(&self) -> Result<MedicationStats, MedicationStoreError>;
}
