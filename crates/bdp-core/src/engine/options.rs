use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Qué hacer cuando una partición falla.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Aborta el job con el primer error.
    #[default]
    FailFast,
    /// Termina el job con las particiones correctas y lista las fallidas.
    BestEffort,
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fail-fast" | "failfast" => Ok(FailurePolicy::FailFast),
            "best-effort" | "besteffort" => Ok(FailurePolicy::BestEffort),
            other => Err(format!("unknown failure policy '{other}'")),
        }
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailurePolicy::FailFast => f.write_str("fail-fast"),
            FailurePolicy::BestEffort => f.write_str("best-effort"),
        }
    }
}

/// Opciones de ejecución de un job.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions {
    pub failure_policy: FailurePolicy,
    /// Plazo total para que todas las particiones reporten. `None` espera
    /// indefinidamente.
    pub timeout: Option<Duration>,
}

impl RunOptions {
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}
