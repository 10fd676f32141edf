//! bdp-pool: pools de workers para `DistributedRunner`.
//!
//! - `InProcessPool`: hilos rayon; cada tarea pasa por JSON igual que con un
//!   worker externo.
//! - `ProcessPool`: un proceso `bdp-worker` por tarea (mensaje por stdin,
//!   respuesta por stdout).
//!
//! Ambos limitan las tareas en curso con `max_backlog` y rechazan tareas
//! tras `exit`.

pub mod config;
mod handlers;
pub mod in_process;
pub mod process;

use bdp_core::{DistributedRunnerFactory, PoolError};

pub use config::{init_dotenv, PoolConfig};
pub use in_process::InProcessPool;
pub use process::ProcessPool;

/// Factory que crea un `InProcessPool` con los stages de `bdp-stages` por job.
pub fn in_process_factory(config: PoolConfig)
                          -> DistributedRunnerFactory<impl Fn() -> Result<InProcessPool, PoolError>> {
    DistributedRunnerFactory::new(move || InProcessPool::with_library(&config))
}

/// Factory que crea un `ProcessPool` por job.
pub fn process_factory(config: PoolConfig) -> DistributedRunnerFactory<impl Fn() -> Result<ProcessPool, PoolError>> {
    DistributedRunnerFactory::new(move || ProcessPool::new(config.clone()))
}
