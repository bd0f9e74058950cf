//! Locally trained model served by a child inference process.
//!
//! The child speaks newline-delimited JSON: one request object per stdin
//! line, answered by the first stdout line that starts with `{`. A single
//! worker task owns the child and drains an unbounded queue, so requests
//! are answered one at a time in arrival order.

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::{mpsc, oneshot};
use tracing::{error, info, warn};

use crate::domain::ports::{AiProvider, ProviderError};
use crate::domain::vet::{AiAnswer, VetPrompt};
use crate::domain::{Language, Urgency};

/// Name reported for answers from the local model.
pub const LOCAL_PROVIDER_NAME: &str = "Local Veterinary AI";

const READY_MARKER: &str = "Model loaded successfully";
const DEFAULT_ANSWER: &str = "I apologize, but I encountered an issue generating a response.";
const DEFAULT_CONFIDENCE: f64 = 0.5;
const DEFAULT_REASONING: &str = "Generated using local trained model";

/// Where the inference script and model live, and how long to wait for them.
#[derive(Debug, Clone)]
pub struct LocalAiSettings {
    /// Interpreter used to run the script.
    pub python: String,
    /// Inference server script.
    pub script: PathBuf,
    /// Trained model directory passed to the script.
    pub model_path: PathBuf,
    /// Wait for the ready line.
    pub startup_timeout: Duration,
    /// Wait for each answer.
    pub request_timeout: Duration,
}

impl LocalAiSettings {
    /// Settings with the 30 second start-up and request timeouts.
    pub fn new(python: impl Into<String>, script: PathBuf, model_path: PathBuf) -> Self {
        Self {
            python: python.into(),
            script,
            model_path,
            startup_timeout: Duration::from_secs(30),
            request_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Serialize)]
struct InferenceRequest {
    query: String,
    species: String,
    language: Language,
    context: String,
}

#[derive(Debug, Default, Deserialize)]
struct InferenceReply {
    answer: Option<String>,
    confidence: Option<f64>,
    reasoning: Option<String>,
}

impl InferenceReply {
    fn into_answer(self) -> AiAnswer {
        let answer = self
            .answer
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| DEFAULT_ANSWER.to_owned());
        AiAnswer {
            urgency: Urgency::from_text(&answer),
            answer,
            confidence: self
                .confidence
                .filter(|c| *c > 0.0)
                .unwrap_or(DEFAULT_CONFIDENCE),
            reasoning: self
                .reasoning
                .filter(|text| !text.is_empty())
                .unwrap_or_else(|| DEFAULT_REASONING.to_owned()),
            provider: LOCAL_PROVIDER_NAME.to_owned(),
        }
    }
}

type Reply = oneshot::Sender<Result<AiAnswer, ProviderError>>;

enum WorkerCommand {
    Ask(InferenceRequest, Reply),
    Shutdown(oneshot::Sender<()>),
}

#[derive(Debug, Default)]
struct WorkerState {
    initialised: AtomicBool,
    processing: AtomicBool,
    closing: AtomicBool,
    queued: AtomicUsize,
    pid: AtomicU32,
}

/// Running inference child.
struct InferenceProcess {
    child: Child,
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
}

/// [`AiProvider`] backed by the local inference process.
///
/// The child is started on the first request and restarted lazily after it
/// exits.
pub struct LocalAiProvider {
    settings: LocalAiSettings,
    commands: mpsc::UnboundedSender<WorkerCommand>,
    state: Arc<WorkerState>,
}

impl LocalAiProvider {
    /// Spawn the worker task. Must be called inside a Tokio runtime.
    pub fn spawn(settings: LocalAiSettings) -> Self {
        let (commands, inbox) = mpsc::unbounded_channel();
        let state = Arc::new(WorkerState::default());
        let worker = Worker {
            settings: settings.clone(),
            state: Arc::clone(&state),
            process: None,
        };
        tokio::spawn(worker.run(inbox));
        info!(model = %settings.model_path.display(), "local AI provider created");
        Self {
            settings,
            commands,
            state,
        }
    }
}

#[async_trait]
impl AiProvider for LocalAiProvider {
    fn name(&self) -> &str {
        LOCAL_PROVIDER_NAME
    }

    async fn generate_response<'a>(
        &self,
        prompt: &str,
        context: Option<&'a str>,
    ) -> Result<String, ProviderError> {
        let prompt = VetPrompt::new(prompt, "general", context.unwrap_or(""), Language::English);
        Ok(self.generate_veterinary_response(&prompt).await?.answer)
    }

    async fn generate_medication_recommendation(
        &self,
        symptoms: &[String],
        species: &str,
    ) -> Result<String, ProviderError> {
        let query = format!(
            "What medication is appropriate for a {species} with these symptoms: {}?",
            symptoms.join(", ")
        );
        let prompt = VetPrompt::new(query, species, "medication_lookup", Language::English);
        Ok(self.generate_veterinary_response(&prompt).await?.answer)
    }

    async fn generate_veterinary_response(
        &self,
        prompt: &VetPrompt,
    ) -> Result<AiAnswer, ProviderError> {
        let request = InferenceRequest {
            query: prompt.query.clone(),
            species: prompt.species.clone(),
            language: prompt.language,
            context: prompt.context.clone(),
        };
        let (reply, answer) = oneshot::channel();
        self.state.queued.fetch_add(1, Ordering::SeqCst);
        if self.commands.send(WorkerCommand::Ask(request, reply)).is_err() {
            self.state.queued.fetch_sub(1, Ordering::SeqCst);
            return Err(ProviderError::unavailable("local AI provider has shut down"));
        }
        answer
            .await
            .map_err(|_| ProviderError::unavailable("local AI worker dropped the request"))?
    }

    async fn stats(&self) -> Value {
        let pid = self.state.pid.load(Ordering::SeqCst);
        json!({
            "isInitialized": self.state.initialised.load(Ordering::SeqCst),
            "queueLength": self.state.queued.load(Ordering::SeqCst),
            "isProcessing": self.state.processing.load(Ordering::SeqCst),
            "modelPath": self.settings.model_path.display().to_string(),
            "provider": LOCAL_PROVIDER_NAME,
            "processId": (pid != 0).then_some(pid),
        })
    }

    async fn shutdown(&self) {
        info!("shutting down local AI provider");
        self.state.closing.store(true, Ordering::SeqCst);
        let (ack, done) = oneshot::channel();
        if self.commands.send(WorkerCommand::Shutdown(ack)).is_ok() {
            let _ = done.await;
        }
    }
}

struct Worker {
    settings: LocalAiSettings,
    state: Arc<WorkerState>,
    process: Option<InferenceProcess>,
}

impl Worker {
    async fn run(mut self, mut inbox: mpsc::UnboundedReceiver<WorkerCommand>) {
        while let Some(command) = inbox.recv().await {
            match command {
                WorkerCommand::Ask(request, reply) => {
                    self.state.queued.fetch_sub(1, Ordering::SeqCst);
                    let result = if self.state.closing.load(Ordering::SeqCst) {
                        Err(ProviderError::unavailable("local AI provider is shutting down"))
                    } else {
                        self.state.processing.store(true, Ordering::SeqCst);
                        let result = self.answer(&request).await;
                        self.state.processing.store(false, Ordering::SeqCst);
                        result
                    };
                    if let Err(err) = &result {
                        warn!(error = %err, "local AI request failed");
                    }
                    let _ = reply.send(result);
                }
                WorkerCommand::Shutdown(ack) => {
                    self.discard_process().await;
                    let _ = ack.send(());
                    break;
                }
            }
        }
        info!("local AI worker stopped");
    }

    async fn answer(&mut self, request: &InferenceRequest) -> Result<AiAnswer, ProviderError> {
        let timeout = self.settings.request_timeout;
        let process = self.ensure_started().await?;
        let outcome = tokio::time::timeout(timeout, exchange(process, request)).await;
        match outcome {
            Ok(Ok(reply)) => Ok(reply.into_answer()),
            Ok(Err(err)) => {
                self.discard_process().await;
                Err(err)
            }
            Err(_) => {
                // The late answer would be read by the next request.
                self.discard_process().await;
                Err(ProviderError::timeout(timeout.as_secs()))
            }
        }
    }

    async fn ensure_started(&mut self) -> Result<&mut InferenceProcess, ProviderError> {
        let exited = match self.process.as_mut() {
            Some(process) => !matches!(process.child.try_wait(), Ok(None)),
            None => true,
        };
        if exited {
            if self.process.is_some() {
                warn!("inference process exited; restarting");
            }
            self.discard_process().await;
            let process = start(&self.settings).await?;
            self.state
                .pid
                .store(process.child.id().unwrap_or_default(), Ordering::SeqCst);
            self.state.initialised.store(true, Ordering::SeqCst);
            info!("local AI model ready for inference");
            self.process = Some(process);
        }
        self.process
            .as_mut()
            .ok_or_else(|| ProviderError::unavailable("inference process not available"))
    }

    async fn discard_process(&mut self) {
        if let Some(mut process) = self.process.take() {
            if let Err(err) = process.child.kill().await {
                warn!(error = %err, "failed to kill inference process");
            }
        }
        self.state.initialised.store(false, Ordering::SeqCst);
        self.state.pid.store(0, Ordering::SeqCst);
    }
}

async fn exchange(
    process: &mut InferenceProcess,
    request: &InferenceRequest,
) -> Result<InferenceReply, ProviderError> {
    let mut line = serde_json::to_string(request)
        .map_err(|err| ProviderError::protocol(err.to_string()))?;
    line.push('\n');
    process
        .stdin
        .write_all(line.as_bytes())
        .await
        .map_err(|err| ProviderError::unavailable(err.to_string()))?;
    process
        .stdin
        .flush()
        .await
        .map_err(|err| ProviderError::unavailable(err.to_string()))?;

    loop {
        let next = process
            .stdout
            .next_line()
            .await
            .map_err(|err| ProviderError::unavailable(err.to_string()))?;
        let Some(line) = next else {
            return Err(ProviderError::unavailable("inference process closed its output"));
        };
        let line = line.trim();
        if line.starts_with('{') {
            return serde_json::from_str(line).map_err(|err| {
                ProviderError::protocol(format!("failed to parse AI response: {err}"))
            });
        }
    }
}

async fn start(settings: &LocalAiSettings) -> Result<InferenceProcess, ProviderError> {
    let model_path = settings.model_path.display().to_string();
    if tokio::fs::metadata(&settings.model_path).await.is_err() {
        return Err(ProviderError::model_missing(model_path));
    }
    info!(script = %settings.script.display(), "starting local AI model");

    let mut command = Command::new(&settings.python);
    command
        .arg(&settings.script)
        .arg(&settings.model_path)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(dir) = settings.script.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        command.current_dir(dir);
    }
    let mut child = command
        .spawn()
        .map_err(|err| ProviderError::unavailable(format!("failed to start inference server: {err}")))?;

    let (Some(stdin), Some(stdout), Some(stderr)) =
        (child.stdin.take(), child.stdout.take(), child.stderr.take())
    else {
        return Err(ProviderError::unavailable("inference server stdio not captured"));
    };
    let mut stdout = BufReader::new(stdout).lines();
    let mut stderr = BufReader::new(stderr).lines();

    let mut stderr_open = true;
    let ready = tokio::time::timeout(settings.startup_timeout, async {
        loop {
            tokio::select! {
                line = stdout.next_line() => match line {
                    Ok(Some(line)) if line.contains(READY_MARKER) => return Ok(()),
                    Ok(Some(_)) => {}
                    Ok(None) | Err(_) => {
                        return Err(ProviderError::unavailable("inference server exited during start-up"));
                    }
                },
                line = stderr.next_line(), if stderr_open => match line {
                    Ok(Some(line)) => {
                        error!(output = %line, "inference server error");
                        return Err(ProviderError::unavailable(format!(
                            "failed to start inference server: {line}"
                        )));
                    }
                    Ok(None) | Err(_) => stderr_open = false,
                },
            }
        }
    })
    .await;

    match ready {
        Ok(Ok(())) => {}
        Ok(Err(err)) => return Err(err),
        Err(_) => {
            return Err(ProviderError::unavailable(
                "timeout waiting for inference server to start",
            ));
        }
    }

    tokio::spawn(async move {
        while let Ok(Some(line)) = stderr.next_line().await {
            warn!(output = %line, "inference server stderr");
        }
    });

    Ok(InferenceProcess {
        child,
        stdin,
        stdout,
    })
}
