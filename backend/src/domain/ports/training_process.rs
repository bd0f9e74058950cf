//! Port for the external training scripts.
use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::watch;

use super::define_port_error;

define_port_error! {
    /// Errors raised when a training stage cannot be run.
    pub enum TrainingProcessError {
        /// The stage could not be spawned.
        Spawn { message: String } => "failed to start training stage: {message}",
        /// Waiting for or signalling the stage failed.
        Io { message: String } => "training stage i/o failed: {message}",
    }
}

/// The two stages of a training run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainingStage {
    /// Gather and prepare the dataset.
    Collect,
    /// Fine-tune the model.
    Train,
}

/// How a stage ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOutcome {
    /// Exited with status zero.
    Succeeded,
    /// Exited with a failure status.
    Failed,
    /// Killed because its run was stopped.
    Stopped,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TrainingProcess: Send + Sync {
    /// Run a stage to completion, forwarding each stdout line to `lines`.
    ///
    /// `stop` belongs to the stage's run. Once it reads `true` the stage must
    /// not start, and a stage already running is killed and reported as
    /// [`StageOutcome::Stopped`].
    async fn run_stage(
        &self,
        stage: TrainingStage,
        lines: UnboundedSender<String>,
        stop: watch::Receiver<bool>,
    ) -> Result<StageOutcome, TrainingProcessError>;
}
