//! bdp-stages: librería de stages registrables para chains.
//!
//! Este crate provee:
//! - `ListChunk` (pre-process): trocea `context.list` en particiones
//!   contiguas.
//! - `ListItems` / `RangeStride` (retrieve).
//! - Filtros, maps, reduces y post-processes numéricos de uso común.
//! - `register_all` para instalarlos en un `StageRegistry`. El worker y el
//!   lado que despacha deben registrar el mismo conjunto.

pub mod filter;
pub mod map;
mod num;
pub mod post;
pub mod preprocess;
pub mod reduce;
pub mod retrieve;

use bdp_core::StageRegistry;

pub use filter::{Even, GreaterThan, Odd};
pub use map::{Offset, Pluck, Scale, Square};
pub use post::{Mean, Sort};
pub use preprocess::{chunk_bounds, ChunkStrategy, ListChunk};
pub use reduce::{Count, Max, Min, Sum, SumCount};
pub use retrieve::{ListItems, RangeStride};

/// Registra todos los stages del crate.
pub fn register_all(registry: &mut StageRegistry) -> &mut StageRegistry {
    registry.register_pre_process::<ListChunk>()
            .register_retrieve::<ListItems>()
            .register_retrieve::<RangeStride>()
            .register_filter::<Even>()
            .register_filter::<Odd>()
            .register_filter::<GreaterThan>()
            .register_map::<Square>()
            .register_map::<Scale>()
            .register_map::<Offset>()
            .register_map::<Pluck>()
            .register_reduce::<Sum>()
            .register_reduce::<Count>()
            .register_reduce::<Max>()
            .register_reduce::<Min>()
            .register_reduce::<SumCount>()
            .register_post_process::<Sort>()
            .register_post_process::<Mean>()
}

/// Registry con los stages del core más los de este crate.
pub fn registry() -> StageRegistry {
    let mut registry = StageRegistry::new();
    register_all(&mut registry);
    registry
}
