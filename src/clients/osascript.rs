//! AppleScript execution through the `osascript` binary.

use std::future::Future;
use std::pin::Pin;
use std::process::Stdio;
use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::process::Command;

use crate::infra::runtime::limits::{LimitError, ScriptLimits};

pub const DEFAULT_OSASCRIPT: &str = "/usr/bin/osascript";

/// Every way a script run can fail. Any stdout produced by a failed run is
/// dropped.
#[derive(Debug, Error)]
pub enum AutomationError {
    #[error("AppleScript error: failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("AppleScript error: {detail}")]
    Failed { detail: String },
    #[error("AppleScript error: timed out after {0:?}")]
    TimedOut(Duration),
    #[error("AppleScript error: executor is shutting down")]
    Unavailable,
}

/// Something that can execute an AppleScript program and hand back its stdout.
#[async_trait::async_trait]
pub trait ScriptRunner: Send + Sync + 'static {
    async fn run(&self, script: &str) -> Result<String, AutomationError>;
}

/// Runs scripts as `<program> -e <script>`.
#[derive(Clone, Debug)]
pub struct OsaScript {
    program: String,
    limits: ScriptLimits,
}

impl OsaScript {
    pub fn new(program: impl Into<String>, limits: ScriptLimits) -> Self {
        Self { program: program.into(), limits }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    async fn spawn_and_collect(&self, script: &str) -> Result<String, AutomationError> {
        let output = Command::new(&self.program)
            .arg("-e")
            .arg(script)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| AutomationError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let detail = if stderr.is_empty() {
                format!("osascript exited with {}", output.status)
            } else {
                stderr
            };
            return Err(AutomationError::Failed { detail });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl Default for OsaScript {
    fn default() -> Self {
        Self::new(DEFAULT_OSASCRIPT, ScriptLimits::default())
    }
}

#[async_trait::async_trait]
impl ScriptRunner for OsaScript {
    async fn run(&self, script: &str) -> Result<String, AutomationError> {
        tracing::debug!(program = %self.program, bytes = script.len(), "osascript.run");
        let start = Instant::now();
        let res = match self.limits.run(self.spawn_and_collect(script)).await {
            Ok(inner) => inner,
            Err(LimitError::TimedOut(d)) => Err(AutomationError::TimedOut(d)),
            Err(LimitError::Closed) => Err(AutomationError::Unavailable),
        };
        let elapsed_ms = start.elapsed().as_millis() as f64;
        match &res {
            Ok(_) => {
                crate::infra::logging::log_metric("osascript", "automation_latency_ms", elapsed_ms)
            }
            Err(e) => {
                tracing::warn!(error = %e, elapsed_ms, "osascript failed");
                crate::infra::logging::log_metric("osascript", "automation_error_total", 1.0);
            }
        }
        res
    }
}

type RunFuture = Pin<Box<dyn Future<Output = Result<String, AutomationError>> + Send>>;

/// Closure-backed runner, handy for tests and for embedding the server with
/// a different automation backend.
#[derive(Clone)]
pub struct FnRunner {
    inner: Arc<dyn Fn(String) -> RunFuture + Send + Sync>,
}

impl FnRunner {
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<String, AutomationError>> + Send + 'static,
    {
        Self { inner: Arc::new(move |s| Box::pin(f(s))) }
    }
}

#[async_trait::async_trait]
impl ScriptRunner for FnRunner {
    async fn run(&self, script: &str) -> Result<String, AutomationError> {
        (self.inner)(script.to_owned()).await
    }
}
