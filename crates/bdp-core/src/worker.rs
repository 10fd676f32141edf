//! Lado worker: ejecuta un `TaskMessage` contra un `StageRegistry`.
//!
//! Lo usan los pools en proceso y el binario `bdp-worker`. La chain recibida
//! se reconstruye, se ejecuta con el mismo algoritmo que el runner local y se
//! descarta.

use log::debug;
use serde_json::Value;

use crate::chain::unserialize;
use crate::engine::CancelToken;
use crate::errors::{CodecError, TaskError};
use crate::runner::{execute_partition, TaskMessage, TaskReply};
use crate::stage::StageRegistry;

/// `cancel` es la señal del pool que aloja al worker; se consulta entre items.
pub fn handle_task(registry: &StageRegistry, message: &TaskMessage, cancel: &CancelToken) -> Result<Value, TaskError> {
    let chain = unserialize(&message.chain, registry)?;
    if !chain.requires.is_empty() {
        debug!("partition {} requires {:?}", message.part, chain.requires);
    }
    execute_partition(&chain, &message.context, message.part, message.parts, cancel)
}

/// Procesa un mensaje en texto JSON y devuelve la respuesta en texto JSON.
/// Un mensaje ilegible produce una respuesta de error, nunca un pánico.
pub fn handle_json(registry: &StageRegistry, input: &str, cancel: &CancelToken) -> String {
    let result = serde_json::from_str::<TaskMessage>(input)
        .map_err(|e| TaskError::Codec(CodecError::Malformed(e.to_string())))
        .and_then(|message| handle_task(registry, &message, cancel));
    render_reply(&TaskReply::from(result))
}

pub fn render_reply(reply: &TaskReply) -> String {
    serde_json::to_string(reply).unwrap_or_else(|e| {
        // p. ej. un acumulador con floats no finitos
        let fallback = TaskReply::Error { error: TaskError::Transport(format!("unencodable reply: {e}")) };
        serde_json::to_string(&fallback).unwrap_or_default()
    })
}

/// Interpreta la respuesta textual de un worker.
pub fn parse_reply(output: &str) -> Result<Value, TaskError> {
    let reply: TaskReply = serde_json::from_str(output.trim())
        .map_err(|e| TaskError::Transport(format!("unreadable reply: {e}")))?;
    reply.into()
}
