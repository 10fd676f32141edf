use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::StageError;

/// Secuencia perezosa y finita de items de una partición. El fin de la
/// secuencia es el `None` del iterador: no existe item centinela.
pub type Items<'a> = Box<dyn Iterator<Item = Result<Value, StageError>> + 'a>;

/// Posición de un stage dentro de la chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StageKind {
    PreProcess,
    Retrieve,
    Filter,
    Map,
    Reduce,
    PostProcess,
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StageKind::PreProcess => "pre-process",
            StageKind::Retrieve => "retrieve",
            StageKind::Filter => "filter",
            StageKind::Map => "map",
            StageKind::Reduce => "reduce",
            StageKind::PostProcess => "post-process",
        };
        f.write_str(name)
    }
}

/// Interfaz neutra común a todos los stages.
pub trait Stage: Send + Sync + fmt::Debug {
    /// Clave estable con la que el stage está registrado.
    fn key(&self) -> &str;

    /// Parámetros del stage; lo único que viaja al worker además de la clave.
    fn params(&self) -> Result<Value, serde_json::Error>;
}

/// Deriva el contexto de una partición a partir del contexto del job.
/// Debe ser función pura de sus argumentos.
pub trait PreProcess: Stage {
    fn pre_process(&self, context: &Value, part: usize, parts: usize) -> Result<Value, StageError>;
}

/// Produce los items de una partición.
pub trait Retrieve: Stage {
    fn retrieve<'a>(&'a self, context: &'a Value, part: usize, parts: usize) -> Result<Items<'a>, StageError>;
}

pub trait Filter: Stage {
    /// `false` descarta el item; los filtros siguientes ya no se evalúan.
    fn keep(&self, item: &Value, context: &Value) -> Result<bool, StageError>;
}

pub trait Map: Stage {
    fn transform(&self, item: Value, context: &Value) -> Result<Value, StageError>;
}

/// Fold de items (`combine = false`) y de resultados parciales
/// (`combine = true`).
///
/// Los parciales llegan en orden de finalización, no de índice: la
/// combinación debe ser asociativa y conmutativa para que el resultado sea
/// determinista.
pub trait Reduce: Stage {
    fn reduce(&self, acc: Value, item: Value, context: &Value, combine: bool) -> Result<Value, StageError>;
}

pub trait PostProcess: Stage {
    fn post_process(&self, acc: Value, context: &Value) -> Result<Value, StageError>;
}
