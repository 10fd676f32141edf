//! Pool de procesos: un `bdp-worker` por tarea.
//!
//! Protocolo: el pool escribe el `TaskMessage` en JSON (una línea) en la
//! stdin del worker y la cierra; el worker responde con un `TaskReply` en
//! stdout y termina. Stderr se hereda para que los logs del worker lleguen a
//! la consola del coordinador.

use std::io::{Read, Write};
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use bdp_core::runner::{ErrorHandler, TaskCallback};
use bdp_core::worker::parse_reply;
use bdp_core::{PoolError, TaskError, TaskMessage, WorkerPool};
use dashmap::DashMap;
use log::{debug, warn};
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde_json::Value;

use crate::config::PoolConfig;
use crate::handlers::{Backlog, ErrorHandlers};

/// Procesos worker vivos, por id de tarea.
type Children = DashMap<u64, Child>;

pub struct ProcessPool {
    config: Arc<PoolConfig>,
    workers: Mutex<Option<Arc<ThreadPool>>>,
    children: Arc<Children>,
    next_id: AtomicU64,
    closed: Arc<AtomicBool>,
    backlog: Backlog,
    handlers: ErrorHandlers,
}

impl ProcessPool {
    /// Los hilos rayon sólo esperan a los procesos; `max_processes` acota
    /// cuántos workers viven a la vez.
    pub fn new(config: PoolConfig) -> Result<Self, PoolError> {
        config.validate()?;
        let workers = ThreadPoolBuilder::new().num_threads(config.max_processes)
                                              .thread_name(|i| format!("bdp-process-{i}"))
                                              .build()
                                              .map_err(|e| PoolError::Spawn(e.to_string()))?;
        Ok(Self { backlog: Backlog::new(config.max_backlog),
                  config: Arc::new(config),
                  workers: Mutex::new(Some(Arc::new(workers))),
                  children: Arc::new(DashMap::new()),
                  next_id: AtomicU64::new(0),
                  closed: Arc::new(AtomicBool::new(false)),
                  handlers: ErrorHandlers::default() })
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Procesos worker vivos en este momento.
    pub fn running(&self) -> usize {
        self.children.len()
    }

    fn workers(&self) -> Option<Arc<ThreadPool>> {
        self.workers.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

fn kill_all(children: &Children) {
    children.retain(|id, child| {
                if let Err(e) = child.kill() {
                    debug!("worker task {id} already gone: {e}");
                }
                let _ = child.wait();
                false
            });
}

/// Mata y espera sólo el worker de la tarea `id`; los demás siguen.
fn kill_one(children: &Children, id: u64) {
    if let Some((_, mut child)) = children.remove(&id) {
        if let Err(e) = child.kill() {
            debug!("worker task {id} already gone: {e}");
        }
        let _ = child.wait();
    }
}

fn run_worker(config: &PoolConfig,
              input: &str,
              id: u64,
              children: &Children,
              closed: &AtomicBool)
              -> Result<Value, TaskError> {
    if closed.load(Ordering::SeqCst) {
        return Err(TaskError::Cancelled);
    }
    let mut child = Command::new(&config.worker_program).args(&config.worker_args)
                                                        .stdin(Stdio::piped())
                                                        .stdout(Stdio::piped())
                                                        .stderr(Stdio::inherit())
                                                        .spawn()
                                                        .map_err(|e| {
                                                            TaskError::Transport(format!("cannot spawn {}: {e}",
                                                                                         config.worker_program
                                                                                               .display()))
                                                        })?;
    let pipes = (child.stdin.take(), child.stdout.take());
    children.insert(id, child);
    if closed.load(Ordering::SeqCst) {
        kill_one(children, id);
        return Err(TaskError::Cancelled);
    }
    let (Some(mut stdin), Some(mut stdout)) = pipes else {
        kill_one(children, id);
        return Err(TaskError::Transport("worker pipes unavailable".into()));
    };

    let written = stdin.write_all(input.as_bytes()).and_then(|()| stdin.write_all(b"\n"));
    drop(stdin);
    let mut output = String::new();
    let read = stdout.read_to_string(&mut output);

    // sin entrada: `exit` lo mató y ya lo esperó
    let Some((_, mut child)) = children.remove(&id) else {
        return Err(TaskError::Cancelled);
    };
    let status = child.wait()
                      .map_err(|e| TaskError::Transport(format!("cannot wait for worker: {e}")))?;
    if let Err(e) = written {
        warn!("worker task {id}: writing task failed: {e}");
    }
    read.map_err(|e| TaskError::Transport(format!("cannot read worker output: {e}")))?;

    match parse_reply(&output) {
        Err(TaskError::Transport(_)) if !status.success() => Err(TaskError::Worker(format!("worker exited with {status}"))),
        reply => reply,
    }
}

impl WorkerPool for ProcessPool {
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

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let part = message.part;
        let config = Arc::clone(&self.config);
        let children = Arc::clone(&self.children);
        let closed = Arc::clone(&self.closed);
        let handlers = self.handlers.clone();
        workers.spawn(move || {
                       let result = run_worker(&config, &input, id, &children, &closed);
                       if let Err(TaskError::Transport(msg)) = &result {
                           if msg.starts_with("cannot spawn") {
                               handlers.notify(&PoolError::Spawn(msg.clone()));
                           }
                       }
                       debug!("worker task {id} (partition {part}) finished, ok={}", result.is_ok());
                       drop(slot);
                       on_result(result);
                   });
    }

    fn exit(&self) {
        self.closed.store(true, Ordering::SeqCst);
        if self.workers.lock().unwrap_or_else(PoisonError::into_inner).take().is_some() {
            debug!("process pool closed, killing {} running workers", self.children.len());
        }
        kill_all(&self.children);
    }

    fn on_error(&self, handler: ErrorHandler) {
        self.handlers.register(handler);
    }
}
