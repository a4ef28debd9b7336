// programs/loss_distributor/src/instructions/mod.rs

pub mod initialize;
pub mod distribution;

pub use initialize::*;
pub use distribution::*;
