//! Stages de una chain.
//!
//! Un stage es una unidad de lógica cerrada: un tipo Rust cuyos campos
//! serializados son sus únicos parámetros. Así puede reconstruirse en otro
//! proceso a partir de `{ key, params }` buscando `key` en un `StageRegistry`.
//! Este módulo define:
//! - Los traits por tipo de stage (`PreProcess`, `Retrieve`, `Filter`, `Map`,
//!   `Reduce`, `PostProcess`) sobre el trait neutro `Stage`.
//! - `TypedStage`: clave estable + params vía serde.
//! - `StageRegistry`: tabla de constructores por clave.
//! - Los stages por defecto de una chain vacía (`builtin`).

pub mod builtin;
pub mod definition;
pub mod macros;
pub mod registry;
pub mod typed;

pub use definition::{Filter, Items, Map, PostProcess, PreProcess, Reduce, Retrieve, Stage, StageKind};
pub use registry::StageRegistry;
pub use typed::TypedStage;
