// programs/reward_distributor/src/instructions/mod.rs

pub mod initialize;
pub mod distribution;
pub mod claims;

pub use initialize::*;
pub use distribution::*;
pub use claims::*;
