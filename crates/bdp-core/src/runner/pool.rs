//! Contrato con el pool de workers externo.
//!
//! El core no gestiona procesos: sólo necesita `enqueue`, `exit` y un canal
//! asíncrono de errores. Todo lo que cruza hacia el worker es JSON.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::chain::ChainDescriptor;
use crate::errors::{PoolError, TaskError};

/// Mensaje de tarea enviado a un worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskMessage {
    pub chain: ChainDescriptor,
    pub context: Value,
    pub part: usize,
    pub parts: usize,
}

/// Respuesta de un worker: el acumulador de la partición o el error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum TaskReply {
    Ok { result: Value },
    Error { error: TaskError },
}

impl From<Result<Value, TaskError>> for TaskReply {
    fn from(result: Result<Value, TaskError>) -> Self {
        match result {
            Ok(result) => TaskReply::Ok { result },
            Err(error) => TaskReply::Error { error },
        }
    }
}

impl From<TaskReply> for Result<Value, TaskError> {
    fn from(reply: TaskReply) -> Self {
        match reply {
            TaskReply::Ok { result } => Ok(result),
            TaskReply::Error { error } => Err(error),
        }
    }
}

/// Callback de resultado de una tarea; se invoca una vez por `enqueue`.
pub type TaskCallback = Box<dyn FnOnce(Result<Value, TaskError>) + Send + 'static>;

/// Receptor de errores asíncronos del pool.
pub type ErrorHandler = Arc<dyn Fn(&PoolError) + Send + Sync + 'static>;

pub trait WorkerPool: Send + Sync {
    /// Encola una tarea. `on_result` recibe el resultado, también cuando la
    /// tarea se rechaza.
    fn enqueue(&self, message: TaskMessage, on_result: TaskCallback);

    /// Termina el pool; las tareas en curso pueden abortarse.
    fn exit(&self);

    /// Registra un receptor para errores del pool no ligados a un callback.
    fn on_error(&self, handler: ErrorHandler);
}
