//! Pre-process `list.chunk`: partición contigua de una lista del contexto.
//!
//! La concatenación de los trozos en orden de índice reproduce la lista
//! original y ningún par de trozos se solapa, con ambas estrategias.

use std::ops::Range;

use bdp_core::{PreProcess, StageError, TypedStage};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkStrategy {
    /// Trozos de `ceil(len / parts)`; los últimos pueden ser más cortos o
    /// vacíos. `[1..10]` en 3 partes -> `[4, 4, 2]`.
    #[default]
    Ceil,
    /// Tamaños que difieren como mucho en uno. `[1..10]` en 3 -> `[4, 3, 3]`.
    Balanced,
}

/// Rango de índices de la partición `part` de una lista de `len` elementos.
pub fn chunk_bounds(len: usize, part: usize, parts: usize, strategy: ChunkStrategy) -> Range<usize> {
    let parts = parts.max(1);
    match strategy {
        ChunkStrategy::Ceil => {
            let size = len.div_ceil(parts).max(1);
            let start = size.saturating_mul(part).min(len);
            let end = size.saturating_mul(part + 1).min(len);
            start..end
        }
        ChunkStrategy::Balanced => {
            let base = len / parts;
            let extra = len % parts;
            let start = (base * part + part.min(extra)).min(len);
            let size = if part < extra { base + 1 } else { base };
            start..(start + size).min(len)
        }
    }
}

/// Reemplaza `context[field]` por el trozo de la partición; el resto del
/// contexto se conserva.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListChunk {
    pub field: String,
    pub strategy: ChunkStrategy,
}

impl Default for ListChunk {
    fn default() -> Self {
        Self { field: "list".into(),
               strategy: ChunkStrategy::Ceil }
    }
}

impl ListChunk {
    pub fn balanced() -> Self {
        Self { strategy: ChunkStrategy::Balanced,
               ..Self::default() }
    }

    pub fn on(field: impl Into<String>) -> Self {
        Self { field: field.into(),
               ..Self::default() }
    }
}

impl TypedStage for ListChunk {
    const KEY: &'static str = "list.chunk";
}

impl PreProcess for ListChunk {
    fn pre_process(&self, context: &Value, part: usize, parts: usize) -> Result<Value, StageError> {
        let mut out = match context {
            Value::Object(map) => map.clone(),
            other => return Err(StageError::new(Self::KEY, format!("context must be an object, found {other}"))),
        };
        let list = match out.get(&self.field) {
            Some(Value::Array(list)) => list,
            _ => return Err(StageError::new(Self::KEY, format!("context.{} must be an array", self.field))),
        };
        let chunk = list[chunk_bounds(list.len(), part, parts, self.strategy)].to_vec();
        out.insert(self.field.clone(), Value::Array(chunk));
        Ok(Value::Object(out))
    }
}
