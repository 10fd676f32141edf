use bdp_core::{JobError, PoolError};
use thiserror::Error;

/// Errores de la capa de aplicación (configuración + ejecución de jobs).
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Error de configuración: {0}")]
    Config(String),
    #[error("Job fallido: {0}")]
    Job(#[from] JobError),
    #[error("Error del pool: {0}")]
    Pool(#[from] PoolError),
    #[error("Error en IO: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Código de salida de `bdp-demo`.
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Config(_) | AppError::Pool(PoolError::Config(_)) => 2,
            AppError::Job(_) => 3,
            AppError::Pool(_) => 4,
            AppError::Io(_) => 5,
        }
    }
}
