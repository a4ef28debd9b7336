// programs/pool_registry/src/instructions/mod.rs

pub mod initialize;
pub mod allocation;
pub mod governance;

pub use initialize::*;
pub use allocation::*;
pub use governance::*;
