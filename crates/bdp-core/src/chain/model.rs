//! Modelo en memoria de una chain.
//!
//! Invariante: exactamente un pre-process, un retrieve, un reduce y un
//! post-process; cero o más filters y maps cuyo orden es significativo. El
//! tipo lo garantiza: los stages únicos son campos, los ordenados `Vec`.
//!
//! Los stages son inmutables y se comparten vía `Arc`; clonar una `Chain` es
//! barato y nunca comparte estado mutable.

use std::sync::Arc;

use indexmap::IndexSet;
use serde_json::{json, Value};

use crate::stage::builtin::{Append, Empty, Identity};
use crate::stage::{Filter, Map, PostProcess, PreProcess, Reduce, Retrieve};

/// Reduce + su valor inicial. El valor inicial arranca tanto cada
/// acumulador de partición como el acumulador global.
#[derive(Debug, Clone)]
pub struct ReduceStage {
    pub func: Arc<dyn Reduce>,
    pub start_value: Value,
}

#[derive(Debug, Clone)]
pub struct Chain {
    /// Dependencias que la lógica necesita en el worker (informativo).
    pub requires: IndexSet<String>,
    pub pre_process: Arc<dyn PreProcess>,
    pub retrieve: Arc<dyn Retrieve>,
    pub filter: Vec<Arc<dyn Filter>>,
    pub map: Vec<Arc<dyn Map>>,
    pub reduce: ReduceStage,
    pub post_process: Arc<dyn PostProcess>,
}

impl Chain {
    /// Chain por defecto: identidad, sin items, append desde `[]`, identidad.
    pub fn new() -> Self {
        Self { requires: IndexSet::new(),
               pre_process: Arc::new(Identity),
               retrieve: Arc::new(Empty),
               filter: Vec::new(),
               map: Vec::new(),
               reduce: ReduceStage { func: Arc::new(Append),
                                     start_value: json!([]) },
               post_process: Arc::new(Identity) }
    }
}

impl Default for Chain {
    fn default() -> Self {
        Self::new()
    }
}
