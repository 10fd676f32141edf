//! Stages y runners de prueba para los tests unitarios del core.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use serde::ser::Error as _;
use serde::{Deserialize, Serialize, Serializer};

use serde_json::{json, Value};

use crate::chain::{Chain, ReduceStage};
use crate::engine::CancelToken;
use crate::errors::{JobError, StageError, TaskError};
use crate::runner::{execute_partition, PartSink, PartTask, Runner, RunnerFactory};
use crate::stage::{Filter, Items, Map, PreProcess, Reduce, Retrieve, TypedStage};
use crate::typed_stage;

typed_stage!(pub Chunk = "test.chunk");
typed_stage!(pub Numbers = "test.numbers");
typed_stage!(pub Total = "test.total");
typed_stage!(pub Even = "test.even");
typed_stage!(pub Square = "test.square");
typed_stage!(pub Offset { by: i64 } = "test.offset");
typed_stage!(
    /// Como `Numbers`, pero cada item tarda `ms` milisegundos en producirse.
    pub Sleepy { ms: u64 } = "test.sleepy"
);

/// Map identidad cuyos params no se pueden serializar.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Opaque;

impl Serialize for Opaque {
    fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
        Err(S::Error::custom("opaque params"))
    }
}

impl TypedStage for Opaque {
    const KEY: &'static str = "test.opaque";
}

impl Map for Opaque {
    fn transform(&self, item: Value, _context: &Value) -> Result<Value, StageError> {
        Ok(item)
    }
}

fn as_i64(stage: &str, v: &Value) -> Result<i64, StageError> {
    v.as_i64().ok_or_else(|| StageError::new(stage, format!("expected integer, found {v}")))
}

impl PreProcess for Chunk {
    fn pre_process(&self, context: &Value, part: usize, parts: usize) -> Result<Value, StageError> {
        let list = context["numbers"].as_array().cloned().unwrap_or_default();
        let size = list.len().div_ceil(parts).max(1);
        let chunk: Vec<Value> = list.into_iter().skip(size * part).take(size).collect();
        Ok(json!({ "numbers": chunk }))
    }
}

impl Retrieve for Numbers {
    fn retrieve<'a>(&'a self, context: &'a Value, _part: usize, _parts: usize) -> Result<Items<'a>, StageError> {
        let list = context["numbers"].as_array()
                                     .ok_or_else(|| StageError::new(Self::KEY, "missing numbers"))?;
        Ok(Box::new(list.iter().cloned().map(Ok)))
    }
}

impl Retrieve for Sleepy {
    fn retrieve<'a>(&'a self, context: &'a Value, _part: usize, _parts: usize) -> Result<Items<'a>, StageError> {
        let list = context["numbers"].as_array()
                                     .ok_or_else(|| StageError::new(Self::KEY, "missing numbers"))?;
        let pause = Duration::from_millis(self.ms);
        Ok(Box::new(list.iter().cloned().map(move |item| {
                                              thread::sleep(pause);
                                              Ok(item)
                                          })))
    }
}

impl Reduce for Total {
    fn reduce(&self, acc: Value, item: Value, _context: &Value, _combine: bool) -> Result<Value, StageError> {
        Ok(json!(as_i64(Self::KEY, &acc)? + as_i64(Self::KEY, &item)?))
    }
}

impl Filter for Even {
    fn keep(&self, item: &Value, _context: &Value) -> Result<bool, StageError> {
        Ok(as_i64(Self::KEY, item)? % 2 == 0)
    }
}

impl Map for Square {
    fn transform(&self, item: Value, _context: &Value) -> Result<Value, StageError> {
        let n = as_i64(Self::KEY, &item)?;
        Ok(json!(n * n))
    }
}

impl Map for Offset {
    fn transform(&self, item: Value, _context: &Value) -> Result<Value, StageError> {
        Ok(json!(as_i64(Self::KEY, &item)? + self.by))
    }
}

/// Suma de `context.numbers` troceado en particiones contiguas.
pub fn numbers_job() -> Chain {
    Chain { pre_process: Arc::new(Chunk),
            retrieve: Arc::new(Numbers),
            reduce: ReduceStage { func: Arc::new(Total),
                                  start_value: json!(0) },
            ..Chain::new() }
}

/// Comportamiento de reporte de `ScriptedRunner`.
#[derive(Debug, Clone)]
pub enum Scripted {
    /// Reporta todas las particiones al final, en el orden dado.
    Reorder(Vec<usize>),
    /// Reporta cada partición dos veces.
    Duplicate,
    /// Retiene los sinks sin reportar nunca.
    Hold,
    /// Descarta los sinks sin reportar.
    Drop,
    /// Falla la partición indicada.
    Fail(usize),
}

pub struct ScriptedRunner {
    script: Scripted,
    held: Vec<(usize, Result<Value, TaskError>, PartSink)>,
}

impl Runner for ScriptedRunner {
    fn execute_part(&mut self, chain: &Arc<Chain>, task: PartTask, cancel: &CancelToken, sink: PartSink) {
        let result = execute_partition(chain, &task.context, task.part, task.parts, cancel);
        match &self.script {
            Scripted::Reorder(order) => {
                self.held.push((task.part, result, sink));
                if self.held.len() == task.parts {
                    for p in order {
                        if let Some((part, result, sink)) = self.held.iter().find(|(part, _, _)| part == p) {
                            sink.complete(*part, result.clone());
                        }
                    }
                }
            }
            Scripted::Duplicate => {
                sink.complete(task.part, result.clone());
                sink.complete(task.part, result);
            }
            Scripted::Hold => self.held.push((task.part, result, sink)),
            Scripted::Drop => {}
            Scripted::Fail(p) if *p == task.part => {
                sink.complete(task.part, Err(TaskError::Worker("scripted failure".into())))
            }
            Scripted::Fail(_) => sink.complete(task.part, result),
        }
    }

    fn cleanup(&mut self) {}
}

pub struct ScriptedFactory {
    script: Scripted,
}

impl ScriptedFactory {
    pub fn new(script: Scripted) -> Self {
        Self { script }
    }
}

impl RunnerFactory for ScriptedFactory {
    type Runner = ScriptedRunner;

    fn create(&self) -> Result<ScriptedRunner, JobError> {
        Ok(ScriptedRunner { script: self.script.clone(),
                            held: Vec::new() })
    }
}

/// Cuenta los `cleanup` de los runners creados por `inner`.
pub struct CountingFactory<F> {
    inner: F,
    cleanups: Arc<AtomicUsize>,
}

impl<F> CountingFactory<F> {
    pub fn new(inner: F) -> Self {
        Self { inner,
               cleanups: Arc::new(AtomicUsize::new(0)) }
    }

    pub fn cleanups(&self) -> usize {
        self.cleanups.load(Ordering::SeqCst)
    }
}

pub struct CountingRunner<R> {
    inner: R,
    cleanups: Arc<AtomicUsize>,
}

impl<R: Runner> Runner for CountingRunner<R> {
    fn execute_part(&mut self, chain: &Arc<Chain>, task: PartTask, cancel: &CancelToken, sink: PartSink) {
        self.inner.execute_part(chain, task, cancel, sink)
    }

    fn cleanup(&mut self) {
        self.cleanups.fetch_add(1, Ordering::SeqCst);
        self.inner.cleanup();
    }
}

impl<F: RunnerFactory> RunnerFactory for CountingFactory<F> {
    type Runner = CountingRunner<F::Runner>;

    fn create(&self) -> Result<Self::Runner, JobError> {
        Ok(CountingRunner { inner: self.inner.create()?,
                            cleanups: Arc::clone(&self.cleanups) })
    }
}
