//! Forma serializada de una chain.
//!
//! ```text
//! { "version", "requires",
//!   "preProcess": {"logic": {"key", "params"}}, "retrieve": {...},
//!   "filter": [...], "map": [...],
//!   "reduce": {"logic": {...}, "startValue": ...}, "postProcess": {...} }
//! ```
//!
//! Se crea al despachar una partición, la consume una vez el worker y se
//! descarta.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::hashing::hash_value;

/// Referencia a un stage registrado: clave + parámetros.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageRef {
    pub key: String,
    #[serde(default)]
    pub params: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageDescriptor {
    pub logic: StageRef,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReduceDescriptor {
    pub logic: StageRef,
    pub start_value: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainDescriptor {
    pub version: String,
    pub requires: Vec<String>,
    pub pre_process: StageDescriptor,
    pub retrieve: StageDescriptor,
    pub filter: Vec<StageDescriptor>,
    pub map: Vec<StageDescriptor>,
    pub reduce: ReduceDescriptor,
    pub post_process: StageDescriptor,
}

impl ChainDescriptor {
    /// Hash del JSON canónico del descriptor. Dos chains con los mismos
    /// stages, params y versión comparten fingerprint.
    pub fn fingerprint(&self) -> String {
        hash_value(&serde_json::to_value(self).unwrap_or_default())
    }
}

impl StageDescriptor {
    pub fn new(key: impl Into<String>, params: Value) -> Self {
        Self { logic: StageRef { key: key.into(),
                                 params } }
    }
}
