use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::errors::TaskError;

/// Partición que falló bajo `FailurePolicy::BestEffort`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartFailure {
    pub part: usize,
    pub error: TaskError,
}

/// Resultado final de un job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobOutput {
    pub run_id: Uuid,
    /// `post_process(fold de parciales correctos)`.
    pub value: Value,
    /// Particiones combinadas, en orden de llegada.
    pub completed: Vec<usize>,
    /// Particiones descartadas (sólo con best-effort).
    pub failed: Vec<PartFailure>,
    pub chain_fingerprint: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl JobOutput {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}
