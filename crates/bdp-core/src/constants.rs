//! Constantes del core.
//!
//! `CODEC_VERSION` viaja en cada `ChainDescriptor`. Un worker sólo acepta
//! descriptores emitidos por la misma versión del crate.

/// Versión del codec de chains. Se toma de la versión del crate: dos binarios
/// compilados desde versiones distintas de `bdp-core` no intercambian chains.
pub const CODEC_VERSION: &str = env!("CARGO_PKG_VERSION");
