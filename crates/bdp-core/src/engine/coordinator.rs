//! Despacho de particiones y agregación de resultados.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use log::{debug, info, warn};
use serde_json::Value;
use uuid::Uuid;

use super::{CancelToken, FailurePolicy, JobOutput, PartFailure, RunOptions};
use crate::chain::{serialize, Chain};
use crate::errors::JobError;
use crate::runner::{PartOutcome, PartSink, PartTask, Runner, RunnerFactory};

/// Garantiza un único `cleanup` del runner en cualquier salida del job.
struct RunnerGuard<R: Runner> {
    runner: R,
    released: bool,
}

impl<R: Runner> RunnerGuard<R> {
    fn new(runner: R) -> Self {
        Self { runner, released: false }
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.runner.cleanup();
        }
    }
}

impl<R: Runner> Drop for RunnerGuard<R> {
    fn drop(&mut self) {
        self.release();
    }
}

/// Registro de particiones reportadas. Un reporte repetido o fuera de rango
/// no cuenta.
struct CompletionTracker {
    done: Vec<bool>,
    arrival: Vec<usize>,
}

impl CompletionTracker {
    fn new(parts: usize) -> Self {
        Self { done: vec![false; parts],
               arrival: Vec::with_capacity(parts) }
    }

    /// `true` si es el primer reporte válido de `part`.
    fn mark(&mut self, part: usize) -> bool {
        match self.done.get_mut(part) {
            Some(slot) if !*slot => {
                *slot = true;
                self.arrival.push(part);
                true
            }
            _ => false,
        }
    }

    fn is_done(&self) -> bool {
        self.arrival.len() == self.done.len()
    }

    fn pending(&self) -> Vec<usize> {
        self.done.iter().enumerate().filter(|(_, d)| !**d).map(|(i, _)| i).collect()
    }
}

fn next_outcome(rx: &Receiver<PartOutcome>, deadline: Option<Instant>) -> Result<PartOutcome, RecvTimeoutError> {
    match deadline {
        Some(deadline) => rx.recv_timeout(deadline.saturating_duration_since(Instant::now())),
        None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
    }
}

/// Ejecuta `parts` particiones de `chain` con un runner creado por
/// `factory` y devuelve `post_process(fold(parciales), context)`.
///
/// Los parciales se combinan en orden de llegada empezando por
/// `reduce.start_value`. El runner se libera exactamente una vez, también si
/// el job falla o expira.
pub fn execute<F>(chain: &Arc<Chain>,
                  factory: &F,
                  context: &Value,
                  parts: usize,
                  options: &RunOptions)
                  -> Result<JobOutput, JobError>
    where F: RunnerFactory
{
    if parts == 0 {
        return Err(JobError::Configuration("part count must be at least 1".into()));
    }
    // una chain que no se puede serializar fallaría igual en cada worker
    let chain_fingerprint = serialize(chain)?.fingerprint();
    let mut guard = RunnerGuard::new(factory.create()?);

    let run_id = Uuid::new_v4();
    let started_at = Utc::now();
    info!("job {run_id}: dispatching {parts} partitions (chain={chain_fingerprint}, policy={})",
          options.failure_policy);

    let cancel = match options.timeout {
        Some(timeout) => CancelToken::with_deadline(Instant::now() + timeout),
        None => CancelToken::new(),
    };
    let (tx, rx) = mpsc::channel();
    let mut tracker = CompletionTracker::new(parts);

    for part in 0..parts {
        if cancel.is_expired() {
            cancel.cancel();
            return Err(JobError::Timeout { pending: tracker.pending() });
        }
        let part_context = match chain.pre_process.pre_process(context, part, parts) {
            Ok(c) => c,
            Err(e) => {
                cancel.cancel();
                return Err(JobError::Stage(e));
            }
        };
        guard.runner.execute_part(chain,
                                  PartTask { part,
                                             parts,
                                             context: part_context },
                                  &cancel,
                                  PartSink::new(tx.clone()));
    }
    // sin este drop un runner que pierde particiones bloquearía recv() para siempre
    drop(tx);

    let mut failed = Vec::new();
    let mut acc = chain.reduce.start_value.clone();

    while !tracker.is_done() {
        let outcome = match next_outcome(&rx, cancel.deadline()) {
            Ok(o) => o,
            Err(RecvTimeoutError::Timeout) => {
                cancel.cancel();
                return Err(JobError::Timeout { pending: tracker.pending() });
            }
            Err(RecvTimeoutError::Disconnected) => {
                cancel.cancel();
                return Err(JobError::Disconnected { pending: tracker.pending() });
            }
        };
        // un runner síncrono deja sus resultados en el canal aunque el plazo haya pasado
        if cancel.is_expired() {
            cancel.cancel();
            return Err(JobError::Timeout { pending: tracker.pending() });
        }

        if !tracker.mark(outcome.part) {
            warn!("job {run_id}: ignoring repeated or unknown report for partition {}", outcome.part);
            continue;
        }

        match outcome.result {
            Ok(partial) => {
                debug!("job {run_id}: partition {} done", outcome.part);
                acc = match chain.reduce.func.reduce(acc, partial, context, true) {
                    Ok(a) => a,
                    Err(e) => {
                        cancel.cancel();
                        return Err(JobError::Stage(e));
                    }
                };
            }
            Err(error) => match options.failure_policy {
                FailurePolicy::FailFast => {
                    cancel.cancel();
                    return Err(JobError::PartFailed { part: outcome.part,
                                                      error });
                }
                FailurePolicy::BestEffort => {
                    warn!("job {run_id}: partition {} failed, excluded from result: {error}", outcome.part);
                    failed.push(PartFailure { part: outcome.part,
                                              error });
                }
            },
        }
    }

    guard.release();
    let value = chain.post_process.post_process(acc, context)?;
    let completed: Vec<usize> = tracker.arrival
                                       .into_iter()
                                       .filter(|p| !failed.iter().any(|f: &PartFailure| f.part == *p))
                                       .collect();
    info!("job {run_id}: finished ({} ok, {} failed)", completed.len(), failed.len());

    Ok(JobOutput { run_id,
                   value,
                   completed,
                   failed,
                   chain_fingerprint,
                   started_at,
                   finished_at: Utc::now() })
}
