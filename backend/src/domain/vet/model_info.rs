//! Description of the trained model served to administrators.

use serde::Serialize;
use serde_json::{Value, json};

use super::training::{TrainingPhase, TrainingStatus};
use crate::domain::ports::ModelArtifacts;

const MODEL_NAME: &str = "VeterinaryAI-DialoGPT";
const MODEL_VERSION: &str = "1.0.0";
const LANGUAGES: [&str; 3] = ["English", "Latvian", "Russian"];
const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Body of `GET /api/v1/admin/model-info`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    pub name: &'static str,
    pub version: &'static str,
    /// Weights size such as `"12.5 MB"`, or `"Not trained"`.
    pub size: String,
    /// Parameter count from the model config, or `"Unknown"`.
    pub parameters: Value,
    /// Dataset size of the latest training run.
    pub training_data: u64,
    pub accuracy: Value,
    pub languages: [&'static str; 3],
    pub last_trained: Value,
    pub is_active: bool,
}

impl ModelInfo {
    /// Combine model artefacts, when present, with the training status.
    #[must_use]
    pub fn describe(artifacts: Option<&ModelArtifacts>, training: &TrainingStatus) -> Self {
        let base = Self {
            name: MODEL_NAME,
            version: MODEL_VERSION,
            size: "Not trained".to_owned(),
            parameters: json!("Unknown"),
            training_data: training.dataset_size,
            accuracy: json!(0),
            languages: LANGUAGES,
            last_trained: json!("Never"),
            is_active: false,
        };
        let Some(artifacts) = artifacts else {
            return base;
        };
        let field = |key: &str, default: Value| {
            artifacts
                .config
                .get(key)
                .filter(|value| !value.is_null())
                .cloned()
                .unwrap_or(default)
        };
        let megabytes = artifacts.weights_bytes as f64 / BYTES_PER_MB;
        Self {
            size: format!("{megabytes:.1} MB"),
            parameters: field("num_parameters", json!("Unknown")),
            accuracy: field("best_accuracy", json!(0)),
            last_trained: field("training_completed", json!("Unknown")),
            is_active: training.status == TrainingPhase::Completed,
            ..base
        }
    }
}
