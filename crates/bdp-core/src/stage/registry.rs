//! `StageRegistry`: constructores de stages indexados por clave.
//!
//! El descriptor de una chain sólo lleva `{ key, params }` por stage. Tanto el
//! lado que despacha como el worker construyen el mismo registry, de modo que
//! ninguna lógica ejecutable viaja por el transporte.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use log::debug;
use serde_json::Value;

use super::builtin::{Append, Empty, Identity};
use super::typed::decode;
use super::{Filter, Map, PostProcess, PreProcess, Reduce, Retrieve, StageKind, TypedStage};
use crate::errors::CodecError;

type Ctor<T> = Box<dyn Fn(&Value) -> Result<Arc<T>, CodecError> + Send + Sync>;

struct Table<T: ?Sized> {
    kind: StageKind,
    ctors: HashMap<&'static str, Ctor<T>>,
}

impl<T: ?Sized> Table<T> {
    fn new(kind: StageKind) -> Self {
        Self { kind,
               ctors: HashMap::new() }
    }

    fn insert(&mut self, key: &'static str, ctor: Ctor<T>) {
        if self.ctors.insert(key, ctor).is_some() {
            debug!("stage registry: {} '{}' re-registered", self.kind, key);
        }
    }

    fn build(&self, key: &str, params: &Value) -> Result<Arc<T>, CodecError> {
        let ctor = self.ctors
                       .get(key)
                       .ok_or_else(|| CodecError::UnknownStage { kind: self.kind,
                                                                 key: key.to_string() })?;
        ctor(params)
    }

    fn keys(&self) -> Vec<&'static str> {
        let mut keys: Vec<_> = self.ctors.keys().copied().collect();
        keys.sort_unstable();
        keys
    }
}

/// Tabla de constructores, una por tipo de stage.
pub struct StageRegistry {
    pre_process: Table<dyn PreProcess>,
    retrieve: Table<dyn Retrieve>,
    filter: Table<dyn Filter>,
    map: Table<dyn Map>,
    reduce: Table<dyn Reduce>,
    post_process: Table<dyn PostProcess>,
}

macro_rules! register_fn {
    ($(#[$meta:meta])* $fn_name:ident, $field:ident, $tr:ident, $kind:expr) => {
        $(#[$meta])*
        pub fn $fn_name<S>(&mut self) -> &mut Self
            where S: TypedStage + $tr
        {
            self.$field.insert(S::KEY,
                               Box::new(|params: &Value| {
                                   let stage: S = decode($kind, params)?;
                                   Ok(Arc::new(stage) as Arc<dyn $tr>)
                               }));
            self
        }
    };
}

impl StageRegistry {
    /// Registry sin ningún stage, ni siquiera los defaults.
    pub fn empty() -> Self {
        Self { pre_process: Table::new(StageKind::PreProcess),
               retrieve: Table::new(StageKind::Retrieve),
               filter: Table::new(StageKind::Filter),
               map: Table::new(StageKind::Map),
               reduce: Table::new(StageKind::Reduce),
               post_process: Table::new(StageKind::PostProcess) }
    }

    /// Registry con los stages por defecto de una chain (`core.*`).
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register_pre_process::<Identity>()
                .register_retrieve::<Empty>()
                .register_reduce::<Append>()
                .register_post_process::<Identity>();
        registry
    }

    register_fn!(register_pre_process, pre_process, PreProcess, StageKind::PreProcess);
    register_fn!(register_retrieve, retrieve, Retrieve, StageKind::Retrieve);
    register_fn!(register_filter, filter, Filter, StageKind::Filter);
    register_fn!(register_map, map, Map, StageKind::Map);
    register_fn!(register_reduce, reduce, Reduce, StageKind::Reduce);
    register_fn!(register_post_process, post_process, PostProcess, StageKind::PostProcess);

    pub fn pre_process(&self, key: &str, params: &Value) -> Result<Arc<dyn PreProcess>, CodecError> {
        self.pre_process.build(key, params)
    }

    pub fn retrieve(&self, key: &str, params: &Value) -> Result<Arc<dyn Retrieve>, CodecError> {
        self.retrieve.build(key, params)
    }

    pub fn filter(&self, key: &str, params: &Value) -> Result<Arc<dyn Filter>, CodecError> {
        self.filter.build(key, params)
    }

    pub fn map(&self, key: &str, params: &Value) -> Result<Arc<dyn Map>, CodecError> {
        self.map.build(key, params)
    }

    pub fn reduce(&self, key: &str, params: &Value) -> Result<Arc<dyn Reduce>, CodecError> {
        self.reduce.build(key, params)
    }

    pub fn post_process(&self, key: &str, params: &Value) -> Result<Arc<dyn PostProcess>, CodecError> {
        self.post_process.build(key, params)
    }

    /// Claves registradas para un tipo de stage, ordenadas.
    pub fn keys(&self, kind: StageKind) -> Vec<&'static str> {
        match kind {
            StageKind::PreProcess => self.pre_process.keys(),
            StageKind::Retrieve => self.retrieve.keys(),
            StageKind::Filter => self.filter.keys(),
            StageKind::Map => self.map.keys(),
            StageKind::Reduce => self.reduce.keys(),
            StageKind::PostProcess => self.post_process.keys(),
        }
    }
}

impl Default for StageRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StageRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StageRegistry")
         .field("pre_process", &self.pre_process.keys())
         .field("retrieve", &self.retrieve.keys())
         .field("filter", &self.filter.keys())
         .field("map", &self.map.keys())
         .field("reduce", &self.reduce.keys())
         .field("post_process", &self.post_process.keys())
         .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::Stage;
    use serde_json::json;

    #[test]
    fn new_registry_contains_chain_defaults() {
        let registry = StageRegistry::new();
        assert_eq!(registry.keys(StageKind::PreProcess), vec!["core.identity"]);
        assert_eq!(registry.keys(StageKind::Retrieve), vec!["core.empty"]);
        assert_eq!(registry.keys(StageKind::Reduce), vec!["core.append"]);
        assert!(registry.keys(StageKind::Filter).is_empty());
        let reduce = registry.reduce("core.append", &Value::Null).expect("append");
        assert_eq!(reduce.key(), "core.append");
    }

    #[test]
    fn unknown_key_is_reported_with_kind() {
        let registry = StageRegistry::new();
        let err = registry.map("num.square", &Value::Null).unwrap_err();
        assert_eq!(err, CodecError::UnknownStage { kind: StageKind::Map,
                                                   key: "num.square".into() });
    }

    #[test]
    fn empty_registry_knows_nothing() {
        let registry = StageRegistry::empty();
        assert!(registry.pre_process("core.identity", &json!(null)).is_err());
    }
}
