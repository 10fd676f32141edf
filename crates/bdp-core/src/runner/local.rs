//! Ejecución local (secuencial) de una partición.

use std::sync::Arc;

use log::debug;
use serde_json::Value;

use super::{PartSink, PartTask, Runner, RunnerFactory};
use crate::chain::Chain;
use crate::engine::CancelToken;
use crate::errors::{JobError, TaskError};

/// Ejecuta una partición: retrieve → filters (corto-circuito) → maps →
/// reduce con `combine = false`. Devuelve el acumulador de la partición.
///
/// Es el mismo algoritmo que corre un worker remoto sobre la chain
/// deserializada.
pub fn execute_partition(chain: &Chain,
                         context: &Value,
                         part: usize,
                         parts: usize,
                         cancel: &CancelToken)
                         -> Result<Value, TaskError> {
    let mut acc = chain.reduce.start_value.clone();
    let mut seen = 0usize;
    let mut kept = 0usize;

    'items: for item in chain.retrieve.retrieve(context, part, parts)? {
        if cancel.is_cancelled() {
            return Err(TaskError::Cancelled);
        }
        let mut item = item?;
        seen += 1;

        for filter in &chain.filter {
            if !filter.keep(&item, context)? {
                continue 'items;
            }
        }
        for map in &chain.map {
            item = map.transform(item, context)?;
        }
        acc = chain.reduce.func.reduce(acc, item, context, false)?;
        kept += 1;
    }

    debug!("partition {part}/{parts}: {kept} of {seen} items reduced");
    Ok(acc)
}

/// Runner de un solo proceso. No mantiene recursos.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalRunner;

impl Runner for LocalRunner {
    fn execute_part(&mut self, chain: &Arc<Chain>, task: PartTask, cancel: &CancelToken, sink: PartSink) {
        let result = execute_partition(chain, &task.context, task.part, task.parts, cancel);
        sink.complete(task.part, result);
    }

    fn cleanup(&mut self) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LocalRunnerFactory;

impl RunnerFactory for LocalRunnerFactory {
    type Runner = LocalRunner;

    fn create(&self) -> Result<LocalRunner, JobError> {
        Ok(LocalRunner)
    }
}
