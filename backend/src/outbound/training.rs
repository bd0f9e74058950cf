//! Runs the data collector and model trainer scripts as child processes.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::domain::ports::{StageOutcome, TrainingProcess, TrainingProcessError, TrainingStage};

const COLLECTOR_SCRIPT: &str = "data_collector.py";
const TRAINER_SCRIPT: &str = "model_trainer.py";

/// [`TrainingProcess`] spawning `{python} <script>` inside the training
/// directory.
pub struct ScriptTrainingProcess {
    python: String,
    training_dir: PathBuf,
}

impl ScriptTrainingProcess {
    pub fn new(python: impl Into<String>, training_dir: impl Into<PathBuf>) -> Self {
        Self {
            python: python.into(),
            training_dir: training_dir.into(),
        }
    }

    const fn script(stage: TrainingStage) -> &'static str {
        match stage {
            TrainingStage::Collect => COLLECTOR_SCRIPT,
            TrainingStage::Train => TRAINER_SCRIPT,
        }
    }
}

#[async_trait]
impl TrainingProcess for ScriptTrainingProcess {
    async fn run_stage(
        &self,
        stage: TrainingStage,
        lines: UnboundedSender<String>,
        mut stop: watch::Receiver<bool>,
    ) -> Result<StageOutcome, TrainingProcessError> {
        let script = Self::script(stage);
        if *stop.borrow_and_update() {
            info!(script, "run already stopped; stage not started");
            return Ok(StageOutcome::Stopped);
        }
        info!(script, dir = %self.training_dir.display(), "starting training stage");
        let mut child = Command::new(&self.python)
            .arg(script)
            .current_dir(&self.training_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|err| TrainingProcessError::spawn(format!("{script}: {err}")))?;

        if let Some(stdout) = child.stdout.take() {
            tokio::spawn(async move {
                let mut reader = BufReader::new(stdout).lines();
                while let Ok(Some(line)) = reader.next_line().await {
                    info!(script, output = %line, "training output");
                    if lines.send(line).is_err() {
                        break;
                    }
                }
            });
        }
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(async move {
                let mut reader = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = reader.next_line().await {
                    warn!(script, output = %line, "training error output");
                }
            });
        }

        let outcome = tokio::select! {
            status = child.wait() => {
                let status = status.map_err(|err| TrainingProcessError::io(err.to_string()))?;
                info!(script, code = ?status.code(), "training stage exited");
                if status.success() {
                    StageOutcome::Succeeded
                } else {
                    StageOutcome::Failed
                }
            }
            () = stopped(&mut stop) => {
                child
                    .kill()
                    .await
                    .map_err(|err| TrainingProcessError::io(err.to_string()))?;
                info!(script, "training stage stopped");
                StageOutcome::Stopped
            }
        };
        Ok(outcome)
    }
}

/// Resolves once the run's stop flag is raised. A dropped sender means the
/// run can no longer be stopped, so this then never resolves.
async fn stopped(stop: &mut watch::Receiver<bool>) {
    if stop.wait_for(|stopped| *stopped).await.is_err() {
        std::future::pending::<()>().await;
    }
}
