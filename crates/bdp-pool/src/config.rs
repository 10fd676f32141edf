//! Configuración de pools desde variables de entorno.
//!
//! - `BDP_MAX_PROCESSES`: tareas simultáneas (por defecto, núcleos disponibles).
//! - `BDP_MAX_BACKLOG`: tareas encoladas o en curso antes de rechazar (`0`, por defecto, = sin límite).
//! - `BDP_WORKER_BIN`: ejecutable del worker para `ProcessPool`.

use std::env;
use std::path::PathBuf;
use std::thread;

use bdp_core::PoolError;
use dotenvy::dotenv;
use once_cell::sync::Lazy;

static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv(); // sin .env no hay nada que cargar
});

/// Sin límite.
pub const DEFAULT_MAX_BACKLOG: usize = 0;
pub const DEFAULT_WORKER_BIN: &str = "bdp-worker";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    pub max_processes: usize,
    pub max_backlog: usize,
    pub worker_program: PathBuf,
    pub worker_args: Vec<String>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self { max_processes: thread::available_parallelism().map(usize::from).unwrap_or(1),
               max_backlog: DEFAULT_MAX_BACKLOG,
               worker_program: PathBuf::from(DEFAULT_WORKER_BIN),
               worker_args: Vec::new() }
    }
}

fn parse(name: &str, raw: Option<String>, default: usize) -> Result<usize, PoolError> {
    match raw {
        None => Ok(default),
        Some(v) => v.trim()
                    .parse()
                    .map_err(|_| PoolError::Config(format!("{name} must be a non-negative integer, got '{v}'"))),
    }
}

impl PoolConfig {
    pub fn from_env() -> Result<Self, PoolError> {
        Lazy::force(&DOTENV_LOADED);
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Igual que `from_env` pero leyendo de `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, PoolError> {
        let defaults = Self::default();
        let config = Self { max_processes: parse("BDP_MAX_PROCESSES", lookup("BDP_MAX_PROCESSES"), defaults.max_processes)?,
                            max_backlog: parse("BDP_MAX_BACKLOG", lookup("BDP_MAX_BACKLOG"), defaults.max_backlog)?,
                            worker_program: lookup("BDP_WORKER_BIN").map(PathBuf::from)
                                                                    .unwrap_or(defaults.worker_program),
                            worker_args: Vec::new() };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), PoolError> {
        if self.max_processes == 0 {
            return Err(PoolError::Config("max_processes must be at least 1".into()));
        }
        if self.worker_program.as_os_str().is_empty() {
            return Err(PoolError::Config("worker program is empty".into()));
        }
        Ok(())
    }

    pub fn with_max_processes(mut self, n: usize) -> Self {
        self.max_processes = n;
        self
    }

    pub fn with_max_backlog(mut self, n: usize) -> Self {
        self.max_backlog = n;
        self
    }

    pub fn with_worker(mut self, program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        self.worker_program = program.into();
        self.worker_args = args;
        self
    }
}

/// Fuerza la carga temprana de `.env`.
pub fn init_dotenv() {
    Lazy::force(&DOTENV_LOADED);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn unset_vars_use_defaults() {
        let config = PoolConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, PoolConfig::default());
        assert!(config.max_processes >= 1);
    }

    #[test]
    fn vars_override_defaults() {
        let config = PoolConfig::from_lookup(lookup(&[("BDP_MAX_PROCESSES", "3"),
                                                      ("BDP_MAX_BACKLOG", " 16 "),
                                                      ("BDP_WORKER_BIN", "/opt/bdp/worker")])).unwrap();
        assert_eq!(config.max_processes, 3);
        assert_eq!(config.max_backlog, 16);
        assert_eq!(config.worker_program, PathBuf::from("/opt/bdp/worker"));
    }

    #[test]
    fn invalid_values_are_config_errors() {
        let err = PoolConfig::from_lookup(lookup(&[("BDP_MAX_BACKLOG", "lots")])).unwrap_err();
        assert!(matches!(err, PoolError::Config(ref m) if m.contains("BDP_MAX_BACKLOG")));
        let err = PoolConfig::from_lookup(lookup(&[("BDP_MAX_PROCESSES", "0")])).unwrap_err();
        assert!(matches!(err, PoolError::Config(_)));
    }
}
