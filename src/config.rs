//! Configuración central de la aplicación.
//! Carga variables de entorno (.env una sola vez) y decide con qué runner se
//! ejecutan los jobs y con qué opciones.
//!
//! - `BDP_RUNNER`: `local` (por defecto), `threads` o `processes`.
//! - `BDP_TASK_TIMEOUT_MS`: plazo total del job; sin definir = sin plazo.
//! - `BDP_FAILURE_POLICY`: `fail-fast` (por defecto) o `best-effort`.
//! - Variables del pool (`BDP_MAX_PROCESSES`, ...) vía `PoolConfig`.
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use bdp_core::{FailurePolicy, RunOptions};
use bdp_pool::PoolConfig;
use once_cell::sync::Lazy;

use crate::errors::AppError;

static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenvy::dotenv(); // ignora error si no existe .env
});

/// Dónde se ejecutan las particiones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RunnerKind {
    /// En el hilo que llama.
    #[default]
    Local,
    /// `InProcessPool`.
    Threads,
    /// `ProcessPool` con `bdp-worker`.
    Processes,
}

impl FromStr for RunnerKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(RunnerKind::Local),
            "threads" => Ok(RunnerKind::Threads),
            "processes" => Ok(RunnerKind::Processes),
            other => Err(AppError::Config(format!("BDP_RUNNER must be local, threads or processes, got '{other}'"))),
        }
    }
}

impl fmt::Display for RunnerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
                        RunnerKind::Local => "local",
                        RunnerKind::Threads => "threads",
                        RunnerKind::Processes => "processes",
                    })
    }
}

fn parse_millis(raw: &str) -> Result<Duration, AppError> {
    raw.trim()
       .parse::<u64>()
       .map(Duration::from_millis)
       .map_err(|_| AppError::Config(format!("BDP_TASK_TIMEOUT_MS must be milliseconds, got '{raw}'")))
}

/// Configuración de la aplicación.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub runner: RunnerKind,
    pub failure_policy: FailurePolicy,
    pub task_timeout: Option<Duration>,
    pub pool: PoolConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self { runner: RunnerKind::default(),
               failure_policy: FailurePolicy::default(),
               task_timeout: None,
               pool: PoolConfig::default() }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Lazy::force(&DOTENV_LOADED);
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let runner = lookup("BDP_RUNNER").map(|v| v.parse::<RunnerKind>()).transpose()?.unwrap_or_default();
        let failure_policy = lookup("BDP_FAILURE_POLICY").map(|v| v.parse::<FailurePolicy>())
                                                         .transpose()
                                                         .map_err(|e| AppError::Config(format!("BDP_FAILURE_POLICY: {e}")))?
                                                         .unwrap_or_default();
        let task_timeout = lookup("BDP_TASK_TIMEOUT_MS").map(|v| parse_millis(&v)).transpose()?;
        let pool = PoolConfig::from_lookup(&lookup)?;
        Ok(Self { runner,
                  failure_policy,
                  task_timeout,
                  pool })
    }

    pub fn run_options(&self) -> RunOptions {
        let options = RunOptions::default().with_failure_policy(self.failure_policy);
        match self.task_timeout {
            Some(timeout) => options.with_timeout(timeout),
            None => options,
        }
    }
}
