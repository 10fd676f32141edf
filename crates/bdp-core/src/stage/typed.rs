use std::fmt;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use super::{Stage, StageKind};
use crate::errors::CodecError;

/// Stage con clave estática cuyos params son el propio valor serializado.
///
/// Implementadores sólo declaran `KEY`; el adaptador de abajo provee la
/// interfaz neutra `Stage`, y el registry reconstruye el valor con
/// `serde_json::from_value`.
pub trait TypedStage: Serialize + DeserializeOwned + Send + Sync + fmt::Debug + 'static {
    const KEY: &'static str;
}

impl<T> Stage for T where T: TypedStage
{
    fn key(&self) -> &str {
        T::KEY
    }

    fn params(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

/// Reconstruye un `TypedStage` desde sus params.
pub(crate) fn decode<S: TypedStage>(kind: StageKind, params: &Value) -> Result<S, CodecError> {
    serde_json::from_value(params.clone()).map_err(|e| CodecError::InvalidParams { kind,
                                                                                   key: S::KEY.to_string(),
                                                                                   message: e.to_string() })
}
