//! Chain: los seis stages de un pipeline y su lista de dependencias, junto
//! con su forma serializada (`ChainDescriptor`) y el codec entre ambas.

pub mod codec;
pub mod descriptor;
pub mod model;

pub use codec::{serialize, unserialize};
pub use descriptor::{ChainDescriptor, ReduceDescriptor, StageDescriptor, StageRef};
pub use model::{Chain, ReduceStage};
