//! bdp-rust: capa de aplicación sobre `bdp-core`.
//!
//! - `config`: `AppConfig` desde variables de entorno (.env incluido).
//! - `errors`: `AppError`, que agrupa errores de configuración, pool y job.
//! - `run_job`: ejecuta un `Job` con el runner elegido en la configuración.
//!
//! Lo usa el binario `bdp-demo`; otros clientes pueden usarlo igual.

pub mod config;
pub mod errors;

use bdp_core::{Job, JobOutput, LocalRunnerFactory};
use bdp_pool::{in_process_factory, process_factory};
use log::info;
use serde_json::Value;

pub use config::{AppConfig, RunnerKind};
pub use errors::AppError;

/// Ejecuta `job` en `parts` particiones con el runner y las opciones de
/// `config`.
pub fn run_job(config: &AppConfig, job: &Job, context: Value, parts: usize) -> Result<JobOutput, AppError> {
    let options = config.run_options();
    info!("running job on {} runner ({} parts)", config.runner, parts);
    let output = match config.runner {
        RunnerKind::Local => job.run_with_options(&LocalRunnerFactory, context, parts, &options)?,
        RunnerKind::Threads => {
            job.run_with_options(&in_process_factory(config.pool.clone()), context, parts, &options)?
        }
        RunnerKind::Processes => job.run_with_options(&process_factory(config.pool.clone()), context, parts, &options)?,
    };
    Ok(output)
}
