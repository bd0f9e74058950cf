//! Ports reporting host resources and trained model artefacts.
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

/// CPU figures.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CpuStats {
    /// Load expressed as a percentage of available cores.
    pub usage: f64,
    /// Logical cores.
    pub cores: usize,
    /// One-minute load average.
    pub load_average: f64,
}

/// Used/total pair in megabytes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapacityStats {
    /// Megabytes in use.
    pub used: f64,
    /// Megabytes available in total.
    pub total: f64,
    /// `used / total` as a percentage.
    pub percentage: f64,
}

impl CapacityStats {
    /// Build from used and total megabytes.
    #[must_use]
    pub fn new(used: f64, total: f64) -> Self {
        let percentage = if total > 0.0 { used / total * 100.0 } else { 0.0 };
        Self {
            used,
            total,
            percentage,
        }
    }
}

/// Host resource snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SystemStats {
    pub cpu: CpuStats,
    pub memory: CapacityStats,
    pub disk: CapacityStats,
}

/// Memory used by this process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessMemory {
    /// Resident set size in kilobytes.
    pub resident_kb: u64,
    /// Virtual size in kilobytes.
    pub virtual_kb: u64,
}

/// Reads host resource usage. Figures that cannot be read are zero.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SystemProbe: Send + Sync {
    /// Host CPU, memory and disk figures.
    async fn system_stats(&self) -> SystemStats;

    /// Memory of the current process, when the platform exposes it.
    async fn process_memory(&self) -> Option<ProcessMemory>;
}

/// Files describing a trained model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelArtifacts {
    /// Parsed `config.json`.
    pub config: Value,
    /// Size of the weights file in bytes.
    pub weights_bytes: u64,
}

/// Reads the trained model directory.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ModelInfoSource: Send + Sync {
    /// Artefacts of the trained model; `None` when no model is present.
    async fn artifacts(&self) -> Option<ModelArtifacts>;
}
