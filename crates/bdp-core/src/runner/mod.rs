//! Runners: ejecutan una partición de una chain.
//!
//! - `LocalRunner`: en el proceso actual, de forma síncrona.
//! - `DistributedRunner`: serializa la chain y la encola en un `WorkerPool`.
//!
//! El coordinador crea un único runner por job mediante un `RunnerFactory`,
//! le pide cada partición con un `PartSink` y libera sus recursos con
//! `cleanup` exactamente una vez.

pub mod distributed;
pub mod local;
pub mod pool;

use std::sync::mpsc::Sender;
use std::sync::Arc;

use serde_json::Value;

use crate::chain::Chain;
use crate::engine::CancelToken;
use crate::errors::{JobError, TaskError};

pub use distributed::{DistributedRunner, DistributedRunnerFactory};
pub use local::{execute_partition, LocalRunner, LocalRunnerFactory};
pub use pool::{ErrorHandler, TaskCallback, TaskMessage, TaskReply, WorkerPool};

/// Una partición lista para ejecutarse: `context` ya es el contexto de la
/// partición (salida del pre-process).
#[derive(Debug, Clone, PartialEq)]
pub struct PartTask {
    pub part: usize,
    pub parts: usize,
    pub context: Value,
}

/// Resultado reportado por un runner para una partición.
#[derive(Debug, Clone, PartialEq)]
pub struct PartOutcome {
    pub part: usize,
    pub result: Result<Value, TaskError>,
}

/// Canal de completado de particiones hacia el coordinador.
#[derive(Debug, Clone)]
pub struct PartSink {
    tx: Sender<PartOutcome>,
}

impl PartSink {
    pub fn new(tx: Sender<PartOutcome>) -> Self {
        Self { tx }
    }

    /// Reporta el resultado de `part`. Si el coordinador ya no escucha (job
    /// abortado) el resultado se descarta.
    pub fn complete(&self, part: usize, result: Result<Value, TaskError>) {
        let _ = self.tx.send(PartOutcome { part, result });
    }
}

/// Ejecutor de particiones.
pub trait Runner {
    /// Ejecuta (o despacha) una partición y reporta su resultado por `sink`,
    /// de forma síncrona o más tarde desde otro hilo.
    fn execute_part(&mut self, chain: &Arc<Chain>, task: PartTask, cancel: &CancelToken, sink: PartSink);

    /// Libera los recursos del runner. El coordinador la invoca una vez.
    fn cleanup(&mut self);
}

/// Crea el runner de un job.
pub trait RunnerFactory {
    type Runner: Runner;

    /// Falla con `JobError::Configuration` si el runner no puede crearse.
    fn create(&self) -> Result<Self::Runner, JobError>;
}
