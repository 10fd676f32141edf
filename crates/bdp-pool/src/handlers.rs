//! Estado compartido por los pools: receptores de errores y backlog.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use bdp_core::runner::{ErrorHandler, TaskCallback};
use bdp_core::{PoolError, TaskError};
use log::warn;

#[derive(Default, Clone)]
pub(crate) struct ErrorHandlers {
    inner: Arc<Mutex<Vec<ErrorHandler>>>,
}

impl ErrorHandlers {
    pub(crate) fn register(&self, handler: ErrorHandler) {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).push(handler);
    }

    pub(crate) fn notify(&self, err: &PoolError) {
        let handlers = self.inner.lock().unwrap_or_else(PoisonError::into_inner).clone();
        if handlers.is_empty() {
            warn!("worker pool error with no handler: {err}");
        }
        for handler in handlers {
            handler(err);
        }
    }

    /// Rechaza una tarea: avisa a los receptores y al callback.
    pub(crate) fn reject(&self, err: PoolError, on_result: TaskCallback) {
        self.notify(&err);
        on_result(Err(TaskError::Rejected(err.to_string())));
    }
}

/// Cuenta de tareas aceptadas y aún sin resultado.
#[derive(Debug, Clone)]
pub(crate) struct Backlog {
    pending: Arc<AtomicUsize>,
    limit: usize,
}

impl Backlog {
    /// `limit == 0` significa sin límite.
    pub(crate) fn new(limit: usize) -> Self {
        Self { pending: Arc::new(AtomicUsize::new(0)),
               limit }
    }

    /// Reserva un hueco; `Err` con la ocupación actual si está lleno.
    pub(crate) fn acquire(&self) -> Result<BacklogSlot, PoolError> {
        let pending = self.pending.fetch_add(1, Ordering::SeqCst);
        if self.limit > 0 && pending >= self.limit {
            self.pending.fetch_sub(1, Ordering::SeqCst);
            return Err(PoolError::BacklogFull(pending));
        }
        Ok(BacklogSlot { pending: Arc::clone(&self.pending) })
    }

    pub(crate) fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }
}

/// Libera su hueco al destruirse.
pub(crate) struct BacklogSlot {
    pending: Arc<AtomicUsize>,
}

impl Drop for BacklogSlot {
    fn drop(&mut self) {
        self.pending.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backlog_limit_and_release() {
        let backlog = Backlog::new(2);
        let a = backlog.acquire().unwrap();
        let _b = backlog.acquire().unwrap();
        assert_eq!(backlog.acquire().err(), Some(PoolError::BacklogFull(2)));
        drop(a);
        assert!(backlog.acquire().is_ok());
        assert_eq!(backlog.pending(), 1);
    }

    #[test]
    fn zero_limit_is_unbounded() {
        let backlog = Backlog::new(0);
        let slots: Vec<_> = (0..100).map(|_| backlog.acquire().unwrap()).collect();
        assert_eq!(backlog.pending(), slots.len());
    }
}
