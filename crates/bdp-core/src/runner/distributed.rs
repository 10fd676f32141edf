//! Runner respaldado por un `WorkerPool`.

use std::fmt;
use std::sync::Arc;

use log::{debug, error, warn};

use super::pool::{TaskMessage, WorkerPool};
use super::{PartSink, PartTask, Runner, RunnerFactory};
use crate::chain::{serialize, Chain};
use crate::engine::CancelToken;
use crate::errors::{JobError, PoolError, TaskError};

pub struct DistributedRunner<P: WorkerPool> {
    pool: Arc<P>,
    closed: bool,
}

impl<P: WorkerPool> DistributedRunner<P> {
    /// Envuelve un pool y registra el log de sus errores asíncronos.
    pub fn new(pool: P) -> Self {
        let pool = Arc::new(pool);
        pool.on_error(Arc::new(|err: &PoolError| error!("worker pool error: {err}")));
        Self { pool, closed: false }
    }

    pub fn pool(&self) -> &Arc<P> {
        &self.pool
    }
}

impl<P: WorkerPool> fmt::Debug for DistributedRunner<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DistributedRunner").field("closed", &self.closed).finish()
    }
}

impl<P: WorkerPool> Runner for DistributedRunner<P> {
    fn execute_part(&mut self, chain: &Arc<Chain>, task: PartTask, cancel: &CancelToken, sink: PartSink) {
        let part = task.part;
        if cancel.is_cancelled() {
            sink.complete(part, Err(TaskError::Cancelled));
            return;
        }
        if self.closed {
            sink.complete(part, Err(TaskError::Rejected("runner already cleaned up".into())));
            return;
        }
        let descriptor = match serialize(chain) {
            Ok(d) => d,
            Err(e) => {
                sink.complete(part, Err(TaskError::Codec(e)));
                return;
            }
        };
        debug!("enqueue partition {}/{} chain={}", part, task.parts, descriptor.fingerprint());
        let message = TaskMessage { chain: descriptor,
                                    context: task.context,
                                    part,
                                    parts: task.parts };
        self.pool.enqueue(message,
                          Box::new(move |result| {
                              if let Err(err) = &result {
                                  warn!("partition {part} failed on worker: {err}");
                              }
                              sink.complete(part, result);
                          }));
    }

    fn cleanup(&mut self) {
        if !self.closed {
            self.closed = true;
            self.pool.exit();
        }
    }
}

/// Crea un pool nuevo por job con `make_pool`.
pub struct DistributedRunnerFactory<F> {
    make_pool: F,
}

impl<F> DistributedRunnerFactory<F> {
    pub fn new(make_pool: F) -> Self {
        Self { make_pool }
    }
}

impl<F, P> RunnerFactory for DistributedRunnerFactory<F>
    where F: Fn() -> Result<P, PoolError>,
          P: WorkerPool
{
    type Runner = DistributedRunner<P>;

    fn create(&self) -> Result<DistributedRunner<P>, JobError> {
        let pool = (self.make_pool)().map_err(|e| JobError::Configuration(e.to_string()))?;
        Ok(DistributedRunner::new(pool))
    }
}
