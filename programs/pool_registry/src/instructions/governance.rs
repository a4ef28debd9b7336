// programs/pool_registry/src/instructions/governance.rs

use anchor_lang::prelude::*;
use super::allocation::UpdatePool;
use crate::events::{FeeRecipientSet, PauseStateSet};
use crate::errors::RegistryError;

/// Pause or unpause a pool. Paused pools accept no new allocations.
pub fn set_pause_state(ctx: Context<UpdatePool>, pool_id: u64, is_paused: bool) -> Result<()> {
    let clock = Clock::get()?;
    let pool = &mut ctx.accounts.pool_state;

    pool.is_paused = is_paused;
    if is_paused {
        pool.paused_at = clock.unix_timestamp;
    }

    emit!(PauseStateSet {
        pool_id,
        is_paused,
        timestamp: clock.unix_timestamp,
    });

    Ok(())
}

pub fn set_fee_recipient(ctx: Context<UpdatePool>, pool_id: u64, fee_recipient: Pubkey) -> Result<()> {
    require!(fee_recipient != Pubkey::default(), RegistryError::InvalidAddress);

    ctx.accounts.pool_state.fee_recipient = fee_recipient;

    emit!(FeeRecipientSet {
        pool_id,
        fee_recipient,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
