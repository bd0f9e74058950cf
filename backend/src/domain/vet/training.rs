//! Model training state machine.
//!
//! Training runs in two stages: a data collector followed by the model
//! trainer. Both report progress on stdout; [`TrainingState`] folds those
//! lines into a [`TrainingStatus`] the admin API serves. Spawning the
//! stages is delegated to the [`TrainingProcess`] port.

use std::sync::{Arc, Mutex, MutexGuard, OnceLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use mockable::Clock;
use regex::Regex;
use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tracing::{error, info, warn};

use super::usage::format_clock;
use crate::domain::ports::{StageOutcome, TrainingProcess, TrainingStage};
use crate::domain::Error;

crate::domain::vocabulary::closed_vocabulary! {
    /// Coarse phase reported to administrators.
    pub enum TrainingPhase {
        /// Nothing running.
        Idle => "idle",
        /// Data collector running.
        CollectingData => "collecting_data",
        /// Model trainer running.
        Training => "training",
        /// Last run finished successfully.
        Completed => "completed",
        /// Last run failed.
        Error => "error",
    }
}

/// Epochs assumed until the trainer reports its own count.
pub const DEFAULT_TOTAL_EPOCHS: u32 = 3;
/// Progress reached when data collection finishes.
pub const COLLECTION_PROGRESS: f64 = 20.0;
const CALCULATING: &str = "Calculating...";
const EMPTY_MODEL_SIZE: &str = "0 MB";

/// Snapshot served by `GET /admin/training-status`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingStatus {
    pub is_training: bool,
    /// Percentage in `[0, 100]`.
    pub progress: f64,
    pub current_epoch: u32,
    pub total_epochs: u32,
    pub current_loss: f64,
    /// Lowest loss seen; `None` until the trainer reports one.
    pub best_loss: Option<f64>,
    /// Elapsed time as `HH:MM:SS`.
    pub training_time: String,
    pub estimated_time_remaining: String,
    pub dataset_size: u64,
    pub model_size: String,
    pub status: TrainingPhase,
    pub last_updated: DateTime<Utc>,
    pub start_time: Option<DateTime<Utc>>,
}

/// Mutable training state.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingState {
    run: u64,
    is_training: bool,
    progress: f64,
    current_epoch: u32,
    total_epochs: u32,
    current_loss: f64,
    best_loss: Option<f64>,
    training_time: String,
    estimated_time_remaining: String,
    dataset_size: u64,
    phase: TrainingPhase,
    start_time: Option<DateTime<Utc>>,
}

impl Default for TrainingState {
    fn default() -> Self {
        Self {
            run: 0,
            is_training: false,
            progress: 0.0,
            current_epoch: 0,
            total_epochs: DEFAULT_TOTAL_EPOCHS,
            current_loss: 0.0,
            best_loss: None,
            training_time: format_clock(Duration::ZERO),
            estimated_time_remaining: CALCULATING.to_owned(),
            dataset_size: 0,
            phase: TrainingPhase::Idle,
            start_time: None,
        }
    }
}

fn regex(cell: &'static OnceLock<Option<Regex>>, pattern: &str) -> Option<&'static Regex> {
    cell.get_or_init(|| Regex::new(pattern).ok()).as_ref()
}

static DATASET_RE: OnceLock<Option<Regex>> = OnceLock::new();
static EPOCH_RE: OnceLock<Option<Regex>> = OnceLock::new();
static LOSS_RE: OnceLock<Option<Regex>> = OnceLock::new();

impl TrainingState {
    /// Whether a run is in progress.
    #[must_use]
    pub const fn is_training(&self) -> bool {
        self.is_training
    }

    /// Identifier of the current run.
    #[must_use]
    pub const fn run(&self) -> u64 {
        self.run
    }

    /// Start a new run, returning its identifier; `None` when one is
    /// already running.
    pub fn begin(&mut self, now: DateTime<Utc>) -> Option<u64> {
        if self.is_training {
            return None;
        }
        *self = Self {
            run: self.run + 1,
            is_training: true,
            phase: TrainingPhase::CollectingData,
            start_time: Some(now),
            dataset_size: self.dataset_size,
            ..Self::default()
        };
        Some(self.run)
    }

    /// Fold one line of data collector output.
    pub fn observe_collector(&mut self, line: &str) {
        if let Some(size) = regex(&DATASET_RE, r"Dataset size: (\d+)")
            .and_then(|re| re.captures(line))
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok())
        {
            self.dataset_size = size;
        }
        let milestones = [
            ("Wikipedia", 5.0),
            ("PubMed", 10.0),
            ("Websites", 15.0),
            ("Training pairs generated", COLLECTION_PROGRESS),
        ];
        for (marker, progress) in milestones {
            if line.contains(marker) {
                self.progress = progress;
            }
        }
    }

    /// Fold one line of trainer output.
    pub fn observe_trainer(&mut self, line: &str) {
        if let Some(caps) =
            regex(&EPOCH_RE, r"Epoch (\d+)/(\d+)").and_then(|re| re.captures(line))
        {
            let current = caps.get(1).and_then(|m| m.as_str().parse::<u32>().ok());
            let total = caps.get(2).and_then(|m| m.as_str().parse::<u32>().ok());
            if let (Some(current), Some(total)) = (current, total) {
                if total > 0 {
                    self.current_epoch = current;
                    self.total_epochs = total;
                    self.progress = (f64::from(current) / f64::from(total))
                        .mul_add(100.0 - COLLECTION_PROGRESS, COLLECTION_PROGRESS);
                }
            }
        }
        if let Some(value) = regex(&LOSS_RE, r"Loss: ([\d.]+)")
            .and_then(|re| re.captures(line))
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<f64>().ok())
        {
            self.current_loss = value;
            self.best_loss = Some(self.best_loss.map_or(value, |best| best.min(value)));
        }
    }

    /// Record the end of a stage.
    pub fn finish_stage(&mut self, stage: TrainingStage, outcome: StageOutcome) {
        match (stage, outcome) {
            (TrainingStage::Collect, StageOutcome::Succeeded) => {
                self.phase = TrainingPhase::Training;
                self.progress = COLLECTION_PROGRESS;
            }
            (TrainingStage::Train, StageOutcome::Succeeded) => {
                self.is_training = false;
                self.phase = TrainingPhase::Completed;
                self.progress = 100.0;
            }
            (_, StageOutcome::Failed) => self.fail(),
            (_, StageOutcome::Stopped) => {}
        }
    }

    /// Mark the run failed.
    pub fn fail(&mut self) {
        self.is_training = false;
        self.phase = TrainingPhase::Error;
    }

    /// Stop the run; returns `false` when nothing was running.
    pub fn stop(&mut self) -> bool {
        if !self.is_training {
            return false;
        }
        self.is_training = false;
        self.phase = TrainingPhase::Idle;
        true
    }

    /// Snapshot at `now`; elapsed and remaining estimates only move while a
    /// run is in progress.
    pub fn status(&mut self, now: DateTime<Utc>) -> TrainingStatus {
        let elapsed = self
            .start_time
            .and_then(|start| (now - start).to_std().ok())
            .unwrap_or_default();
        if self.is_training {
            self.training_time = format_clock(elapsed);
        }
        if self.is_training && self.progress > 0.0 {
            let elapsed_ms = elapsed.as_secs_f64() * 1000.0;
            let remaining_ms = (elapsed_ms / self.progress).mul_add(100.0, -elapsed_ms).max(0.0);
            self.estimated_time_remaining = format_remaining(remaining_ms);
        }
        TrainingStatus {
            is_training: self.is_training,
            progress: self.progress,
            current_epoch: self.current_epoch,
            total_epochs: self.total_epochs,
            current_loss: self.current_loss,
            best_loss: self.best_loss,
            training_time: self.training_time.clone(),
            estimated_time_remaining: self.estimated_time_remaining.clone(),
            dataset_size: self.dataset_size,
            model_size: EMPTY_MODEL_SIZE.to_owned(),
            status: self.phase,
            last_updated: now,
            start_time: self.start_time,
        }
    }
}

fn format_remaining(remaining_ms: f64) -> String {
    let total_minutes = (remaining_ms / 60_000.0).floor();
    let hours = (total_minutes / 60.0).floor();
    let minutes = total_minutes - hours * 60.0;
    format!("{hours:.0}h {minutes:.0}m")
}

/// Run state plus the stop signal of the run in progress.
#[derive(Default)]
struct Control {
    state: TrainingState,
    stop_signal: Option<watch::Sender<bool>>,
}

/// Drives training runs through a [`TrainingProcess`].
#[derive(Clone)]
pub struct TrainingService {
    control: Arc<Mutex<Control>>,
    process: Arc<dyn TrainingProcess>,
    clock: Arc<dyn Clock>,
}

impl TrainingService {
    /// Create an idle service.
    pub fn new(process: Arc<dyn TrainingProcess>, clock: Arc<dyn Clock>) -> Self {
        Self {
            control: Arc::new(Mutex::new(Control::default())),
            process,
            clock,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Control>, Error> {
        self.control
            .lock()
            .map_err(|_| Error::internal("training state poisoned"))
    }

    /// Current status.
    ///
    /// # Errors
    /// Returns an internal error when the state lock is poisoned.
    pub fn status(&self) -> Result<TrainingStatus, Error> {
        let now = self.clock.utc();
        Ok(self.lock()?.state.status(now))
    }

    /// Start a run in the background and return the initial status.
    ///
    /// # Errors
    /// Returns `invalid_request` when a run is already in progress.
    pub fn start(&self) -> Result<TrainingStatus, Error> {
        let now = self.clock.utc();
        let (stop_signal, stop) = watch::channel(false);
        let (run, status) = {
            let mut control = self.lock()?;
            let run = control
                .state
                .begin(now)
                .ok_or_else(|| Error::invalid_request("Training is already in progress"))?;
            control.stop_signal = Some(stop_signal);
            (run, control.state.status(now))
        };
        info!(run, "starting model training");
        let service = self.clone();
        tokio::spawn(async move { service.drive(run, stop).await });
        Ok(status)
    }

    /// Stop the running run. Only that run's stage is killed; a run started
    /// afterwards carries its own signal.
    ///
    /// # Errors
    /// Returns `invalid_request` when no run is in progress.
    pub fn stop(&self) -> Result<TrainingStatus, Error> {
        let now = self.clock.utc();
        let (run, stop_signal, status) = {
            let mut control = self.lock()?;
            if !control.state.stop() {
                return Err(Error::invalid_request("No training in progress"));
            }
            (
                control.state.run(),
                control.stop_signal.take(),
                control.state.status(now),
            )
        };
        info!(run, "stopping model training");
        if let Some(stop_signal) = stop_signal {
            stop_signal.send_replace(true);
        }
        Ok(status)
    }

    async fn drive(&self, run: u64, stop: watch::Receiver<bool>) {
        for stage in [TrainingStage::Collect, TrainingStage::Train] {
            if !self.is_current(run) {
                return;
            }
            let outcome = self.run_stage(run, stage, stop.clone()).await;
            let Ok(mut control) = self.lock() else {
                error!(run, "training state poisoned");
                return;
            };
            if control.state.run() != run || !control.state.is_training() {
                return;
            }
            match outcome {
                StageOutcome::Succeeded => {
                    control.state.finish_stage(stage, outcome);
                    info!(run, ?stage, "training stage finished");
                }
                StageOutcome::Failed => {
                    control.state.finish_stage(stage, outcome);
                    control.stop_signal = None;
                    error!(run, ?stage, "training stage failed");
                    return;
                }
                StageOutcome::Stopped => {
                    control.state.stop();
                    control.stop_signal = None;
                    warn!(run, ?stage, "training stage stopped");
                    return;
                }
            }
        }
        if let Ok(mut control) = self.lock() {
            if control.state.run() == run {
                control.stop_signal = None;
            }
        }
    }

    /// Whether `run` is still the run in progress.
    fn is_current(&self, run: u64) -> bool {
        self.lock()
            .is_ok_and(|control| control.state.run() == run && control.state.is_training())
    }

    async fn run_stage(
        &self,
        run: u64,
        stage: TrainingStage,
        stop: watch::Receiver<bool>,
    ) -> StageOutcome {
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();
        let process = Arc::clone(&self.process);
        let handle = tokio::spawn(async move { process.run_stage(stage, tx, stop).await });

        while let Some(line) = rx.recv().await {
            info!(run, ?stage, output = %line, "training output");
            let Ok(mut control) = self.lock() else { break };
            let state = &mut control.state;
            if state.run() != run || !state.is_training() {
                continue;
            }
            match stage {
                TrainingStage::Collect => state.observe_collector(&line),
                TrainingStage::Train => state.observe_trainer(&line),
            }
        }

        match handle.await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(err)) => {
                error!(run, ?stage, error = %err, "training process could not run");
                StageOutcome::Failed
            }
            Err(err) => {
                error!(run, ?stage, error = %err, "training task aborted");
                StageOutcome::Failed
            }
        }
    }
}
