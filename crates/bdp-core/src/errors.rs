//! Errores del core.
//!
//! Los errores que cruzan la frontera con los workers (`StageError`,
//! `CodecError`, `TaskError`) son serializables: un worker los devuelve dentro
//! de su `TaskReply` y el coordinador los reconstruye tal cual.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::stage::StageKind;

/// Un stage rechazó su entrada (tipo inesperado, overflow, contexto inválido...).
#[derive(Debug, Error, PartialEq, Eq, Clone, Serialize, Deserialize)]
#[error("stage '{stage}': {message}")]
pub struct StageError {
    pub stage: String,
    pub message: String,
}

impl StageError {
    pub fn new(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self { stage: stage.into(),
               message: message.into() }
    }
}

#[derive(Debug, Error, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub enum CodecError {
    #[error("chain version incompatible: expected {expected}, found {found}")]
    VersionMismatch { expected: String, found: String },
    #[error("unknown {kind} stage '{key}'")]
    UnknownStage { kind: StageKind, key: String },
    #[error("invalid params for {kind} stage '{key}': {message}")]
    InvalidParams { kind: StageKind, key: String, message: String },
    #[error("cannot encode {kind} stage '{key}': {message}")]
    Encode { kind: StageKind, key: String, message: String },
    #[error("malformed message: {0}")]
    Malformed(String),
}

/// Fallo de una partición, local o remota.
#[derive(Debug, Error, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub enum TaskError {
    #[error(transparent)]
    Stage(#[from] StageError),
    #[error(transparent)]
    Codec(#[from] CodecError),
    /// El pool no aceptó la tarea (backlog lleno, pool cerrado).
    #[error("task rejected: {0}")]
    Rejected(String),
    /// Fallo de comunicación con el worker (spawn, pipes, reply ilegible).
    #[error("transport: {0}")]
    Transport(String),
    /// El worker terminó de forma anómala.
    #[error("worker: {0}")]
    Worker(String),
    #[error("cancelled")]
    Cancelled,
}

/// Errores del pool de workers (canal asíncrono de errores y creación del pool).
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum PoolError {
    #[error("invalid pool configuration: {0}")]
    Config(String),
    #[error("cannot spawn worker: {0}")]
    Spawn(String),
    #[error("backlog full ({0} pending tasks)")]
    BacklogFull(usize),
    #[error("pool closed")]
    Closed,
    #[error("task {part} failed: {error}")]
    Task { part: usize, error: TaskError },
}

/// Errores de `Job::run`.
#[derive(Debug, Error, PartialEq, Clone)]
pub enum JobError {
    /// Runner factory inválida o partición imposible; nada fue despachado.
    #[error("configuration: {0}")]
    Configuration(String),
    #[error(transparent)]
    Codec(#[from] CodecError),
    /// Fallo en pre-process, combine o post-process (lado coordinador).
    #[error(transparent)]
    Stage(#[from] StageError),
    #[error("partition {part} failed: {error}")]
    PartFailed { part: usize, error: TaskError },
    #[error("timed out waiting for partitions {pending:?}")]
    Timeout { pending: Vec<usize> },
    #[error("runner dropped partitions {pending:?} without reporting them")]
    Disconnected { pending: Vec<usize> },
}

impl From<PoolError> for JobError {
    fn from(err: PoolError) -> Self {
        JobError::Configuration(err.to_string())
    }
}
