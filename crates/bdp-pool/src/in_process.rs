//! Pool de hilos dentro del proceso.

use std::sync::{Arc, Mutex, PoisonError};

use bdp_core::runner::{ErrorHandler, TaskCallback};
use bdp_core::worker::{handle_json, parse_reply};
use bdp_core::{CancelToken, PoolError, StageRegistry, TaskError, TaskMessage, WorkerPool};
use log::debug;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::config::PoolConfig;
use crate::handlers::{Backlog, ErrorHandlers};

/// Ejecuta cada tarea en un hilo rayon. El mensaje se serializa y la
/// respuesta se parsea igual que con un worker externo, así que una chain que
/// funciona aquí también funciona en `ProcessPool`.
pub struct InProcessPool {
    workers: Mutex<Option<Arc<ThreadPool>>>,
    /// Se activa en `exit`; las tareas en curso lo ven entre items.
    cancel: CancelToken,
    registry: Arc<StageRegistry>,
    backlog: Backlog,
    handlers: ErrorHandlers,
}

impl InProcessPool {
    pub fn new(config: &PoolConfig, registry: StageRegistry) -> Result<Self, PoolError> {
        config.validate()?;
        let workers = ThreadPoolBuilder::new().num_threads(config.max_processes)
                                              .thread_name(|i| format!("bdp-worker-{i}"))
                                              .build()
                                              .map_err(|e| PoolError::Spawn(e.to_string()))?;
        Ok(Self { workers: Mutex::new(Some(Arc::new(workers))),
                  cancel: CancelToken::new(),
                  registry: Arc::new(registry),
                  backlog: Backlog::new(config.max_backlog),
                  handlers: ErrorHandlers::default() })
    }

    /// Pool con el registry de `bdp-stages`.
    pub fn with_library(config: &PoolConfig) -> Result<Self, PoolError> {
        Self::new(config, bdp_stages::registry())
    }

    pub fn pending(&self) -> usize {
        self.backlog.pending()
    }

    fn workers(&self) -> Option<Arc<ThreadPool>> {
        self.workers.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl WorkerPool for InProcessPool {
    fn enqueue(&self, message: TaskMessage, on_result: TaskCallback) {
        let Some(workers) = self.workers() else {
            self.handlers.reject(PoolError::Closed, on_result);
            return;
        };
        let slot = match self.backlog.acquire() {
            Ok(slot) => slot,
            Err(err) => {
                self.handlers.reject(err, on_result);
                return;
            }
        };
        let input = match serde_json::to_string(&message) {
            Ok(input) => input,
            Err(e) => {
                on_result(Err(TaskError::Transport(format!("cannot encode task: {e}"))));
                return;
            }
        };
        let registry = Arc::clone(&self.registry);
        let cancel = self.cancel.clone();
        let part = message.part;
        workers.spawn(move || {
                       // encolada antes de `exit` pero aún sin empezar
                       if cancel.is_cancelled() {
                           drop(slot);
                           on_result(Err(TaskError::Cancelled));
                           return;
                       }
                       let output = handle_json(&registry, &input, &cancel);
                       debug!("in-process worker finished partition {part}");
                       drop(slot);
                       on_result(parse_reply(&output));
                   });
    }

    fn exit(&self) {
        self.cancel.cancel();
        if self.workers.lock().unwrap_or_else(PoisonError::into_inner).take().is_some() {
            debug!("in-process pool closed ({} tasks pending)", self.backlog.pending());
        }
    }

    fn on_error(&self, handler: ErrorHandler) {
        self.handlers.register(handler);
    }
}
