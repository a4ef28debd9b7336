// programs/risk_manager/src/instructions/governance.rs

use anchor_lang::prelude::*;
use pool_registry::state::PoolState;
use crate::events::{IncidentReported, PoolFeeRecipientSet};
use crate::errors::RiskError;
use super::ledger::*;

#[derive(Accounts)]
#[instruction(pool_id: u64)]
pub struct GovernPool<'info> {
    pub ledger: Ledger<'info>,

    pub governance: Signer<'info>,

    #[account(
        mut,
        constraint = pool_state.pool_id == pool_id @ RiskError::InvalidPoolId
    )]
    pub pool_state: Box<Account<'info, PoolState>>,
}

/// Pause or unpause a pool (governance only)
pub fn report_incident(ctx: Context<GovernPool>, pool_id: u64, pause: bool) -> Result<()> {
    let ledger = &ctx.accounts.ledger;
    require_keys_eq!(
        ctx.accounts.governance.key(),
        ledger.risk_config.governance,
        RiskError::NotGovernance
    );

    ledger.cpi_set_pause_state(&ctx.accounts.pool_state.to_account_info(), pool_id, pause)?;

    emit!(IncidentReported {
        pool_id,
        is_paused: pause,
        reporter: ctx.accounts.governance.key(),
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}

pub fn set_pool_fee_recipient(
    ctx: Context<GovernPool>,
    pool_id: u64,
    fee_recipient: Pubkey,
) -> Result<()> {
    let ledger = &ctx.accounts.ledger;
    require_keys_eq!(
        ctx.accounts.governance.key(),
        ledger.risk_config.governance,
        RiskError::NotGovernance
    );
    require!(fee_recipient != Pubkey::default(), RiskError::InvalidAddress);

    ledger.cpi_set_fee_recipient(&ctx.accounts.pool_state.to_account_info(), pool_id, fee_recipient)?;

    emit!(PoolFeeRecipientSet {
        pool_id,
        fee_recipient,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
