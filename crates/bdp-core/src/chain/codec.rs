//! Codec `Chain` <-> `ChainDescriptor`.
//!
//! `serialize` estampa `CODEC_VERSION` y renderiza cada stage como
//! `{ key, params }`. `unserialize` verifica la versión antes de tocar nada y
//! resuelve cada clave contra un `StageRegistry`.

use serde_json::Value;

use super::{Chain, ChainDescriptor, ReduceDescriptor, ReduceStage, StageDescriptor, StageRef};
use crate::constants::CODEC_VERSION;
use crate::errors::CodecError;
use crate::stage::{Stage, StageKind, StageRegistry};

fn render<S: Stage + ?Sized>(kind: StageKind, stage: &S) -> Result<StageDescriptor, CodecError> {
    let params = stage.params().map_err(|e| CodecError::Encode { kind,
                                                                 key: stage.key().to_string(),
                                                                 message: e.to_string() })?;
    Ok(StageDescriptor::new(stage.key(), params))
}

pub fn serialize(chain: &Chain) -> Result<ChainDescriptor, CodecError> {
    let filter = chain.filter
                      .iter()
                      .map(|f| render(StageKind::Filter, f.as_ref()))
                      .collect::<Result<Vec<_>, _>>()?;
    let map = chain.map
                   .iter()
                   .map(|m| render(StageKind::Map, m.as_ref()))
                   .collect::<Result<Vec<_>, _>>()?;
    let reduce = render(StageKind::Reduce, chain.reduce.func.as_ref())?;

    Ok(ChainDescriptor { version: CODEC_VERSION.to_string(),
                         requires: chain.requires.iter().cloned().collect(),
                         pre_process: render(StageKind::PreProcess, chain.pre_process.as_ref())?,
                         retrieve: render(StageKind::Retrieve, chain.retrieve.as_ref())?,
                         filter,
                         map,
                         reduce: ReduceDescriptor { logic: reduce.logic,
                                                    start_value: chain.reduce.start_value.clone() },
                         post_process: render(StageKind::PostProcess, chain.post_process.as_ref())? })
}

pub fn unserialize(descriptor: &ChainDescriptor, registry: &StageRegistry) -> Result<Chain, CodecError> {
    if descriptor.version != CODEC_VERSION {
        return Err(CodecError::VersionMismatch { expected: CODEC_VERSION.to_string(),
                                                 found: descriptor.version.clone() });
    }

    let StageRef { key, params } = &descriptor.pre_process.logic;
    let pre_process = registry.pre_process(key, params)?;
    let StageRef { key, params } = &descriptor.retrieve.logic;
    let retrieve = registry.retrieve(key, params)?;
    let filter = descriptor.filter
                           .iter()
                           .map(|d| registry.filter(&d.logic.key, &d.logic.params))
                           .collect::<Result<Vec<_>, _>>()?;
    let map = descriptor.map
                        .iter()
                        .map(|d| registry.map(&d.logic.key, &d.logic.params))
                        .collect::<Result<Vec<_>, _>>()?;
    let StageRef { key, params } = &descriptor.reduce.logic;
    let reduce = ReduceStage { func: registry.reduce(key, params)?,
                               start_value: descriptor.reduce.start_value.clone() };
    let StageRef { key, params } = &descriptor.post_process.logic;
    let post_process = registry.post_process(key, params)?;

    Ok(Chain { requires: descriptor.requires.iter().cloned().collect(),
               pre_process,
               retrieve,
               filter,
               map,
               reduce,
               post_process })
}

/// Decodifica un descriptor desde JSON neutro (mensaje de tarea ya parseado).
pub fn descriptor_from_value(value: Value) -> Result<ChainDescriptor, CodecError> {
    serde_json::from_value(value).map_err(|e| CodecError::Malformed(e.to_string()))
}
