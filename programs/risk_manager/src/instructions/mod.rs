// programs/risk_manager/src/instructions/mod.rs

pub mod initialize;
pub mod ledger;
pub mod capital;
pub mod allocation;
pub mod claims;
pub mod liquidation;
pub mod governance;
pub mod rewards;

pub use initialize::*;
pub use ledger::*;
pub use capital::*;
pub use allocation::*;
pub use claims::*;
pub use liquidation::*;
pub use governance::*;
pub use rewards::*;
