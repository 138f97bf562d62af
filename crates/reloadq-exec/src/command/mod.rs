mod output;

use std::{fmt, process::Stdio};

use tokio::{process::Command, time::Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use reloadq_core::{ActionError, Phase};

use crate::ExecError;

/// One external command of a reload (program + arguments).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepCommand {
    /// Program to execute (e.g. `"nginx"`, `"/usr/sbin/nginx"`).
    pub program: String,
    /// Command-line arguments passed to the program.
    pub args: Vec<String>,
}

impl StepCommand {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Rules:
    /// - `program` is not empty or whitespace-only.
    pub fn validate(&self) -> Result<(), ExecError> {
        if self.program.trim().is_empty() {
            return Err(ExecError::InvalidConfig("command program is empty".into()));
        }
        Ok(())
    }
}

impl fmt::Display for StepCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Limits applied to a single step run.
#[derive(Debug, Clone, Copy)]
pub(crate) struct StepBudget {
    /// Shared deadline of the whole reload.
    pub(crate) deadline: Instant,
    /// Full reload budget, reported on timeout.
    pub(crate) timeout_ms: u64,
    /// Max length of captured output attached to a failure.
    pub(crate) max_diagnostics_len: usize,
}

/// Run `step` to completion, or until the deadline passes or `cancel` fires.
///
/// The child is spawned with `kill_on_drop`, so abandoning the wait kills it.
pub(crate) async fn run_step(
    phase: Phase,
    step: &StepCommand,
    budget: StepBudget,
    cancel: &CancellationToken,
) -> Result<(), ActionError> {
    trace!(phase = phase.as_str(), command = %step, "spawning subprocess");

    let mut cmd = Command::new(&step.program);
    cmd.args(&step.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let child = cmd
        .spawn()
        .map_err(|e| ActionError::failed(phase, format!("`{step}` spawn failed: {e}")))?;

    let output = tokio::select! {
        res = child.wait_with_output() => {
            res.map_err(|e| ActionError::failed(phase, format!("`{step}` wait failed: {e}")))?
        }
        _ = cancel.cancelled() => {
            debug!(phase = phase.as_str(), "cancellation requested; killing subprocess");
            return Err(ActionError::Canceled { phase });
        }
        _ = tokio::time::sleep_until(budget.deadline) => {
            debug!(phase = phase.as_str(), "deadline exceeded; killing subprocess");
            return Err(ActionError::Timeout { phase, timeout_ms: budget.timeout_ms });
        }
    };

    if output.status.success() {
        debug!(phase = phase.as_str(), command = %step, "subprocess exited successfully");
        return Ok(());
    }

    let reason = match output.status.code() {
        Some(code) => format!("`{step}` exited with code {code}"),
        None => format!("`{step}` terminated by signal"),
    };
    Err(ActionError::Failed {
        phase,
        reason,
        diagnostics: output::diagnostics(&output, budget.max_diagnostics_len),
    })
}
