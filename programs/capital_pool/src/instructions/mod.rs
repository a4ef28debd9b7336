// programs/capital_pool/src/instructions/mod.rs

pub mod initialize;
pub mod adapters;
pub mod deposits;
pub mod ledger;
pub mod payouts;

pub use initialize::*;
pub use adapters::*;
pub use deposits::*;
pub use ledger::*;
pub use payouts::*;
