//! `Job`: construcción funcional de una `Chain`.
//!
//! Cada operación toma `&self` y devuelve un `Job` nuevo con un stage
//! reemplazado (o añadido, para filter/map). El receptor nunca cambia, así
//! que un job a medio construir puede reutilizarse como base de varias ramas.
//!
//! ```ignore
//! let base = Job::new().pre_process(ListChunk::default()).retrieve(ListItems::default());
//! let sum = base.reduce(Sum, 0);
//! let evens = base.filter(Even).map(Square).reduce(Sum, 0);
//! let out = evens.run(&LocalRunnerFactory, json!({"list": [1, 2, 3, 4]}), 2)?;
//! ```

use std::sync::Arc;

use serde_json::Value;

use crate::chain::{serialize, Chain, ChainDescriptor, ReduceStage};
use crate::engine::{self, JobOutput, RunOptions};
use crate::errors::{CodecError, JobError};
use crate::runner::RunnerFactory;
use crate::stage::{Filter, Map, PostProcess, PreProcess, Reduce, Retrieve};

#[derive(Debug, Clone, Default)]
pub struct Job {
    chain: Chain,
}

impl Job {
    /// Job con la chain por defecto.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_chain(chain: Chain) -> Self {
        Self { chain }
    }

    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    fn evolve(&self, change: impl FnOnce(&mut Chain)) -> Job {
        let mut chain = self.chain.clone();
        change(&mut chain);
        Job { chain }
    }

    /// Añade dependencias, conservando el orden y sin duplicados.
    pub fn requires<I, S>(&self, modules: I) -> Job
        where I: IntoIterator<Item = S>,
              S: Into<String>
    {
        self.evolve(|c| c.requires.extend(modules.into_iter().map(Into::into)))
    }

    pub fn pre_process(&self, stage: impl PreProcess + 'static) -> Job {
        self.evolve(|c| c.pre_process = Arc::new(stage))
    }

    pub fn retrieve(&self, stage: impl Retrieve + 'static) -> Job {
        self.evolve(|c| c.retrieve = Arc::new(stage))
    }

    /// Añade un filtro al final de la lista.
    pub fn filter(&self, stage: impl Filter + 'static) -> Job {
        self.evolve(|c| c.filter.push(Arc::new(stage)))
    }

    /// Añade un map al final de la lista.
    pub fn map(&self, stage: impl Map + 'static) -> Job {
        self.evolve(|c| c.map.push(Arc::new(stage)))
    }

    pub fn reduce(&self, stage: impl Reduce + 'static, start_value: impl Into<Value>) -> Job {
        let start_value = start_value.into();
        self.evolve(|c| {
                c.reduce = ReduceStage { func: Arc::new(stage),
                                         start_value }
            })
    }

    pub fn post_process(&self, stage: impl PostProcess + 'static) -> Job {
        self.evolve(|c| c.post_process = Arc::new(stage))
    }

    /// Forma serializada de la chain actual.
    pub fn descriptor(&self) -> Result<ChainDescriptor, CodecError> {
        serialize(&self.chain)
    }

    pub fn fingerprint(&self) -> Result<String, CodecError> {
        Ok(self.descriptor()?.fingerprint())
    }

    /// Ejecuta el job en `parts` particiones con las opciones por defecto
    /// (fail-fast, sin timeout).
    pub fn run<F: RunnerFactory>(&self, factory: &F, context: Value, parts: usize) -> Result<JobOutput, JobError> {
        self.run_with_options(factory, context, parts, &RunOptions::default())
    }

    pub fn run_with_options<F: RunnerFactory>(&self,
                                              factory: &F,
                                              context: Value,
                                              parts: usize,
                                              options: &RunOptions)
                                              -> Result<JobOutput, JobError> {
        let chain = Arc::new(self.chain.clone());
        engine::execute(&chain, factory, &context, parts, options)
    }

    /// Variante con callback: `callback` recibe el resultado exactamente una
    /// vez, también cuando el job falla.
    pub fn run_with<F, C>(&self, factory: &F, context: Value, parts: usize, options: &RunOptions, callback: C)
        where F: RunnerFactory,
              C: FnOnce(Result<JobOutput, JobError>)
    {
        callback(self.run_with_options(factory, context, parts, options));
    }
}
