//! bdp-core: chains particionables, runner local/distribuido y coordinador.
//!
//! Una `Chain` describe un pipeline de seis stages (pre-process, retrieve,
//! filter*, map*, reduce, post-process). Un `Job` la construye de forma
//! inmutable y la ejecuta en `parts` particiones sobre un `Runner`; el
//! coordinador combina los parciales en orden de llegada.
pub mod chain;
pub mod constants;
pub mod engine;
pub mod errors;
pub mod hashing;
pub mod job;
pub mod runner;
pub mod stage;
pub mod worker;

#[cfg(test)]
mod testing;

pub use chain::{Chain, ChainDescriptor};
pub use constants::CODEC_VERSION;
pub use engine::{CancelToken, FailurePolicy, JobOutput, PartFailure, RunOptions};
pub use errors::{CodecError, JobError, PoolError, StageError, TaskError};
pub use job::Job;
pub use runner::{DistributedRunner, DistributedRunnerFactory, LocalRunner, LocalRunnerFactory, Runner,
                 RunnerFactory, TaskMessage, WorkerPool};
pub use stage::{Filter, Items, Map, PostProcess, PreProcess, Reduce, Retrieve, Stage, StageKind, StageRegistry,
                TypedStage};

// `typed_stage!` se exporta en la raíz vía #[macro_export]
