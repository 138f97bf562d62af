use std::{fmt, time::Duration};

use async_trait::async_trait;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use reloadq_core::{ActionError, Phase, ReloadAction};

use crate::{
    ExecError,
    command::{StepBudget, StepCommand, run_step},
};

/// Budget shared by the validate and apply phases.
pub const DEFAULT_RELOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Max length of captured tool output attached to a failure.
const DEFAULT_MAX_DIAGNOSTICS_LEN: usize = 4096;

/// Configuration of a two-phase command reload.
#[derive(Debug, Clone)]
pub struct ReloaderConfig {
    /// Configuration test, e.g. `nginx -t`.
    pub validate: StepCommand,
    /// Activation, e.g. `nginx -s reload`. Runs only after `validate` succeeded.
    pub apply: StepCommand,
    /// Deadline for both phases together.
    pub timeout: Duration,
    /// Max length of captured output attached to a failure.
    pub max_diagnostics_len: usize,
}

impl ReloaderConfig {
    /// nginx defaults for the given binary.
    pub fn nginx(bin: impl Into<String>) -> Self {
        let bin = bin.into();
        Self {
            validate: StepCommand::new(bin.clone(), ["-t"]),
            apply: StepCommand::new(bin, ["-s", "reload"]),
            timeout: DEFAULT_RELOAD_TIMEOUT,
            max_diagnostics_len: DEFAULT_MAX_DIAGNOSTICS_LEN,
        }
    }

    /// Replace both commands and return updated config.
    pub fn with_commands(mut self, validate: StepCommand, apply: StepCommand) -> Self {
        self.validate = validate;
        self.apply = apply;
        self
    }

    /// Replace the shared timeout and return updated config.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn validate(&self) -> Result<(), ExecError> {
        self.validate.validate()?;
        self.apply.validate()?;
        if self.timeout.is_zero() {
            return Err(ExecError::InvalidConfig("reload timeout cannot be zero".into()));
        }
        Ok(())
    }
}

impl Default for ReloaderConfig {
    fn default() -> Self {
        Self::nginx("nginx")
    }
}

impl fmt::Display for ReloaderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ReloaderConfig(validate='{}', apply='{}', timeout={:?})",
            self.validate, self.apply, self.timeout,
        )
    }
}

/// [`ReloadAction`] that validates, then applies, through external commands.
#[derive(Debug, Clone)]
pub struct CommandReloader {
    cfg: ReloaderConfig,
}

impl CommandReloader {
    pub fn new(cfg: ReloaderConfig) -> Result<Self, ExecError> {
        cfg.validate()?;
        Ok(Self { cfg })
    }

    pub fn config(&self) -> &ReloaderConfig {
        &self.cfg
    }
}

#[async_trait]
impl ReloadAction for CommandReloader {
    fn name(&self) -> &'static str {
        "command"
    }

    async fn reload(&self, cancel: CancellationToken) -> Result<(), ActionError> {
        debug!(validate = %self.cfg.validate, apply = %self.cfg.apply, "reload starting");
        let budget = StepBudget {
            deadline: Instant::now() + self.cfg.timeout,
            timeout_ms: self.cfg.timeout.as_millis() as u64,
            max_diagnostics_len: self.cfg.max_diagnostics_len,
        };

        run_step(Phase::Validate, &self.cfg.validate, budget, &cancel).await?;
        debug!("configuration valid, applying");
        run_step(Phase::Apply, &self.cfg.apply, budget, &cancel).await
    }
}
