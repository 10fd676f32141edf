//! Coordinador de ejecución.
//!
//! Despacha las particiones de un job a un runner, recibe sus resultados en
//! orden de llegada, los combina con el reduce (`combine = true`), aplica el
//! post-process y entrega el resultado una sola vez.

pub mod cancel;
pub mod coordinator;
pub mod options;
pub mod output;

pub use cancel::CancelToken;
pub use coordinator::execute;
pub use options::{FailurePolicy, RunOptions};
pub use output::{JobOutput, PartFailure};
