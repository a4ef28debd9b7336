// programs/risk_manager/src/instructions/ledger.rs
//
// Shared plumbing for every orchestrated instruction:
// - `Ledger`: the leaf programs, their configs and the orchestrator PDA
// - CPI wrappers signed by the orchestrator PDA
// - Per-pool account groups passed through remaining_accounts
// - `settle_underwriter`: the realize-then-mutate step run before any
//   shares or pledge change
//
// Group layout, one group per pledge in position order:
//   [pool_state, loss_tracker, loss_checkpoint, pool_rewards, underwriter_rewards]

use anchor_lang::prelude::*;
use anchor_spl::token::Token;
use capital_pool::program::CapitalPool;
use capital_pool::state::{AdapterCapital, CapitalPoolConfig, WithdrawalReceipt};
use loss_distributor::program::LossDistributor;
use loss_distributor::state::{LossCheckpoint, PoolLossTracker};
use pool_registry::program::PoolRegistry;
use pool_registry::state::PoolState;
use reward_distributor::program::RewardDistributor;
use underwriting_core::seeds;
use crate::state::{RiskManagerConfig, UnderwriterPosition};
use crate::events::LossesRealized;
use crate::errors::RiskError;

pub const POOL_GROUP_LEN: usize = 5;

#[derive(Accounts)]
pub struct Ledger<'info> {
    #[account(
        seeds = [RiskManagerConfig::SEED_PREFIX],
        bump = risk_config.bump,
    )]
    pub risk_config: Box<Account<'info, RiskManagerConfig>>,

    /// CHECK: orchestrator PDA, signs every leaf CPI
    #[account(
        seeds = [seeds::ORCHESTRATOR],
        bump = risk_config.orchestrator_bump,
    )]
    pub orchestrator: UncheckedAccount<'info>,

    #[account(
        mut,
        seeds = [CapitalPoolConfig::SEED_PREFIX],
        seeds::program = capital_pool_program.key(),
        bump = capital_config.bump,
    )]
    pub capital_config: Box<Account<'info, CapitalPoolConfig>>,

    /// CHECK: seeds checked by pool_registry
    pub registry_config: UncheckedAccount<'info>,

    /// CHECK: seeds checked by loss_distributor
    pub loss_config: UncheckedAccount<'info>,

    /// CHECK: seeds checked by reward_distributor
    pub reward_config: UncheckedAccount<'info>,

    pub pool_registry_program: Program<'info, PoolRegistry>,
    pub capital_pool_program: Program<'info, CapitalPool>,
    pub loss_distributor_program: Program<'info, LossDistributor>,
    pub reward_distributor_program: Program<'info, RewardDistributor>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

// =============================================================================
// POOL ACCOUNT GROUPS
// =============================================================================

#[derive(Clone)]
pub struct PoolAccounts<'info> {
    pub pool_state: AccountInfo<'info>,
    pub loss_tracker: AccountInfo<'info>,
    pub loss_checkpoint: AccountInfo<'info>,
    pub pool_rewards: AccountInfo<'info>,
    pub underwriter_rewards: AccountInfo<'info>,
}

impl<'info> PoolAccounts<'info> {
    /// Load the group's pool and check it is `pool_id`
    pub fn load_pool(&self, pool_id: u64) -> Result<PoolState> {
        let pool = load_pool_state(&self.pool_state)?;
        require!(pool.pool_id == pool_id, RiskError::PoolAccountMismatch);
        Ok(pool)
    }

    /// Pending loss for `pledge` without advancing the checkpoint
    pub fn pending_loss(&self, underwriter: &Pubkey, pool_id: u64, pledge: u64) -> Result<u64> {
        require_keys_eq!(
            self.loss_tracker.key(),
            loss_distributor::loss_helpers::loss_tracker_address(pool_id),
            RiskError::PoolAccountMismatch
        );
        require_keys_eq!(
            self.loss_checkpoint.key(),
            loss_distributor::loss_helpers::loss_checkpoint_address(underwriter, pool_id),
            RiskError::PoolAccountMismatch
        );

        let tracker = match load_optional::<PoolLossTracker>(&self.loss_tracker, &loss_distributor::ID)? {
            Some(tracker) => tracker,
            None => return Ok(0),
        };
        let checkpoint = load_optional::<LossCheckpoint>(&self.loss_checkpoint, &loss_distributor::ID)?
            .map(|c| c.checkpoint)
            .unwrap_or(0);

        Ok(tracker
            .pending_for(checkpoint, pledge)
            .ok_or(RiskError::MathOverflow)?)
    }
}

/// Split remaining_accounts into exactly `count` pool groups
pub fn pool_groups<'info>(
    remaining: &[AccountInfo<'info>],
    count: usize,
) -> Result<Vec<PoolAccounts<'info>>> {
    require!(
        remaining.len() == count * POOL_GROUP_LEN,
        RiskError::InvalidRemainingAccounts
    );

    Ok(remaining
        .chunks(POOL_GROUP_LEN)
        .map(|group| PoolAccounts {
            pool_state: group[0].clone(),
            loss_tracker: group[1].clone(),
            loss_checkpoint: group[2].clone(),
            pool_rewards: group[3].clone(),
            underwriter_rewards: group[4].clone(),
        })
        .collect())
}

/// Deserialize a registry pool. Anything not owned by the registry is not a pool.
pub fn load_pool_state(info: &AccountInfo) -> Result<PoolState> {
    require_keys_eq!(*info.owner, pool_registry::ID, RiskError::InvalidPoolId);
    let data = info.try_borrow_data()?;
    PoolState::try_deserialize(&mut &data[..])
}

/// Uninitialized PDAs read as None
fn load_optional<T: AccountDeserialize>(info: &AccountInfo, owner: &Pubkey) -> Result<Option<T>> {
    if info.data_is_empty() {
        return Ok(None);
    }
    require_keys_eq!(*info.owner, *owner, RiskError::PoolAccountMismatch);
    let data = info.try_borrow_data()?;
    Ok(Some(T::try_deserialize(&mut &data[..])?))
}

/// Per-adapter capital of a pool, in the order the payout expects its accounts
pub fn adapter_capital(pool: &PoolState) -> Vec<AdapterCapital> {
    pool.adapter_allocations
        .iter()
        .map(|a| AdapterCapital {
            yield_choice: a.yield_choice,
            capital: a.capital,
        })
        .collect()
}

// =============================================================================
// CPI WRAPPERS
// =============================================================================

impl<'info> Ledger<'info> {
    pub fn cpi_update_capital_allocation(
        &self,
        pool_state: &AccountInfo<'info>,
        pool_id: u64,
        yield_choice: u8,
        amount: u64,
        is_allocation: bool,
    ) -> Result<()> {
        if amount == 0 {
            return Ok(());
        }
        let bump = [self.risk_config.orchestrator_bump];
        let orchestrator_seeds: &[&[u8]] = &[seeds::ORCHESTRATOR, &bump];
        let signer_seeds = &[orchestrator_seeds];

        let cpi_accounts = pool_registry::cpi::accounts::UpdatePool {
            registry_config: self.registry_config.to_account_info(),
            pool_state: pool_state.clone(),
            orchestrator: self.orchestrator.to_account_info(),
        };
        pool_registry::cpi::update_capital_allocation(
            CpiContext::new_with_signer(
                self.pool_registry_program.to_account_info(),
                cpi_accounts,
                signer_seeds,
            ),
            pool_id,
            yield_choice,
            amount,
            is_allocation,
        )
    }

    pub fn cpi_update_pending_withdrawal(
        &self,
        pool_state: &AccountInfo<'info>,
        pool_id: u64,
        amount: u64,
        is_request: bool,
    ) -> Result<()> {
        if amount == 0 {
            return Ok(());
        }
        let bump = [self.risk_config.orchestrator_bump];
        let orchestrator_seeds: &[&[u8]] = &[seeds::ORCHESTRATOR, &bump];
        let signer_seeds = &[orchestrator_seeds];

        let cpi_accounts = pool_registry::cpi::accounts::UpdatePool {
            registry_config: self.registry_config.to_account_info(),
            pool_state: pool_state.clone(),
            orchestrator: self.orchestrator.to_account_info(),
        };
        pool_registry::cpi::update_capital_pending_withdrawal(
            CpiContext::new_with_signer(
                self.pool_registry_program.to_account_info(),
                cpi_accounts,
                signer_seeds,
            ),
            pool_id,
            amount,
            is_request,
        )
    }

    pub fn cpi_update_coverage_sold(
        &self,
        pool_state: &AccountInfo<'info>,
        pool_id: u64,
        amount: u64,
        is_sale: bool,
    ) -> Result<()> {
        let bump = [self.risk_config.orchestrator_bump];
        let orchestrator_seeds: &[&[u8]] = &[seeds::ORCHESTRATOR, &bump];
        let signer_seeds = &[orchestrator_seeds];

        let cpi_accounts = pool_registry::cpi::accounts::UpdatePool {
            registry_config: self.registry_config.to_account_info(),
            pool_state: pool_state.clone(),
            orchestrator: self.orchestrator.to_account_info(),
        };
        pool_registry::cpi::update_coverage_sold(
            CpiContext::new_with_signer(
                self.pool_registry_program.to_account_info(),
                cpi_accounts,
                signer_seeds,
            ),
            pool_id,
            amount,
            is_sale,
        )
    }

    pub fn cpi_set_pause_state(
        &self,
        pool_state: &AccountInfo<'info>,
        pool_id: u64,
        is_paused: bool,
    ) -> Result<()> {
        let bump = [self.risk_config.orchestrator_bump];
        let orchestrator_seeds: &[&[u8]] = &[seeds::ORCHESTRATOR, &bump];
        let signer_seeds = &[orchestrator_seeds];

        let cpi_accounts = pool_registry::cpi::accounts::UpdatePool {
            registry_config: self.registry_config.to_account_info(),
            pool_state: pool_state.clone(),
            orchestrator: self.orchestrator.to_account_info(),
        };
        pool_registry::cpi::set_pause_state(
            CpiContext::new_with_signer(
                self.pool_registry_program.to_account_info(),
                cpi_accounts,
                signer_seeds,
            ),
            pool_id,
            is_paused,
        )
    }

    pub fn cpi_set_fee_recipient(
        &self,
        pool_state: &AccountInfo<'info>,
        pool_id: u64,
        fee_recipient: Pubkey,
    ) -> Result<()> {
        let bump = [self.risk_config.orchestrator_bump];
        let orchestrator_seeds: &[&[u8]] = &[seeds::ORCHESTRATOR, &bump];
        let signer_seeds = &[orchestrator_seeds];

        let cpi_accounts = pool_registry::cpi::accounts::UpdatePool {
            registry_config: self.registry_config.to_account_info(),
            pool_state: pool_state.clone(),
            orchestrator: self.orchestrator.to_account_info(),
        };
        pool_registry::cpi::set_fee_recipient(
            CpiContext::new_with_signer(
                self.pool_registry_program.to_account_info(),
                cpi_accounts,
                signer_seeds,
            ),
            pool_id,
            fee_recipient,
        )
    }

    pub fn cpi_distribute_loss(
        &self,
        payer: &AccountInfo<'info>,
        loss_tracker: &AccountInfo<'info>,
        pool_id: u64,
        loss_amount: u64,
        total_pledge: u64,
    ) -> Result<()> {
        let bump = [self.risk_config.orchestrator_bump];
        let orchestrator_seeds: &[&[u8]] = &[seeds::ORCHESTRATOR, &bump];
        let signer_seeds = &[orchestrator_seeds];

        let cpi_accounts = loss_distributor::cpi::accounts::DistributeLoss {
            loss_config: self.loss_config.to_account_info(),
            loss_tracker: loss_tracker.clone(),
            orchestrator: self.orchestrator.to_account_info(),
            payer: payer.clone(),
            system_program: self.system_program.to_account_info(),
        };
        loss_distributor::cpi::distribute_loss(
            CpiContext::new_with_signer(
                self.loss_distributor_program.to_account_info(),
                cpi_accounts,
                signer_seeds,
            ),
            pool_id,
            loss_amount,
            total_pledge,
        )
    }

    /// Returns the loss realized for `pledge`
    pub fn cpi_realize_losses(
        &self,
        payer: &AccountInfo<'info>,
        group: &PoolAccounts<'info>,
        underwriter: Pubkey,
        pool_id: u64,
        pledge: u64,
    ) -> Result<u64> {
        let bump = [self.risk_config.orchestrator_bump];
        let orchestrator_seeds: &[&[u8]] = &[seeds::ORCHESTRATOR, &bump];
        let signer_seeds = &[orchestrator_seeds];

        let cpi_accounts = loss_distributor::cpi::accounts::RealizeLosses {
            loss_config: self.loss_config.to_account_info(),
            loss_tracker: group.loss_tracker.clone(),
            loss_checkpoint: group.loss_checkpoint.clone(),
            orchestrator: self.orchestrator.to_account_info(),
            payer: payer.clone(),
            system_program: self.system_program.to_account_info(),
        };
        let loss = loss_distributor::cpi::realize_losses(
            CpiContext::new_with_signer(
                self.loss_distributor_program.to_account_info(),
                cpi_accounts,
                signer_seeds,
            ),
            underwriter,
            pool_id,
            pledge,
        )?
        .get();
        Ok(loss)
    }

    pub fn cpi_distribute_reward(
        &self,
        payer: &AccountInfo<'info>,
        pool_rewards: &AccountInfo<'info>,
        pool_id: u64,
        mint: Pubkey,
        amount: u64,
        total_pledge: u64,
    ) -> Result<()> {
        let bump = [self.risk_config.orchestrator_bump];
        let orchestrator_seeds: &[&[u8]] = &[seeds::ORCHESTRATOR, &bump];
        let signer_seeds = &[orchestrator_seeds];

        let cpi_accounts = reward_distributor::cpi::accounts::Distribute {
            reward_config: self.reward_config.to_account_info(),
            pool_rewards: pool_rewards.clone(),
            orchestrator: self.orchestrator.to_account_info(),
            payer: payer.clone(),
            system_program: self.system_program.to_account_info(),
        };
        reward_distributor::cpi::distribute(
            CpiContext::new_with_signer(
                self.reward_distributor_program.to_account_info(),
                cpi_accounts,
                signer_seeds,
            ),
            pool_id,
            mint,
            amount,
            total_pledge,
        )
    }

    /// Settle reward streams at the pledge in force before a change
    pub fn cpi_update_user_state(
        &self,
        payer: &AccountInfo<'info>,
        group: &PoolAccounts<'info>,
        underwriter: Pubkey,
        pool_id: u64,
        pledge: u64,
    ) -> Result<()> {
        let bump = [self.risk_config.orchestrator_bump];
        let orchestrator_seeds: &[&[u8]] = &[seeds::ORCHESTRATOR, &bump];
        let signer_seeds = &[orchestrator_seeds];

        let cpi_accounts = reward_distributor::cpi::accounts::UpdateUserState {
            reward_config: self.reward_config.to_account_info(),
            pool_rewards: group.pool_rewards.clone(),
            underwriter_rewards: group.underwriter_rewards.clone(),
            orchestrator: self.orchestrator.to_account_info(),
            payer: payer.clone(),
            system_program: self.system_program.to_account_info(),
        };
        reward_distributor::cpi::update_user_state(
            CpiContext::new_with_signer(
                self.reward_distributor_program.to_account_info(),
                cpi_accounts,
                signer_seeds,
            ),
            underwriter,
            pool_id,
            pledge,
        )
    }

    /// Returns the loss actually charged to the account
    pub fn cpi_apply_losses(
        &self,
        underwriter_account: &AccountInfo<'info>,
        underwriter: Pubkey,
        loss_amount: u64,
        is_withdrawal_realization: bool,
    ) -> Result<u64> {
        let bump = [self.risk_config.orchestrator_bump];
        let orchestrator_seeds: &[&[u8]] = &[seeds::ORCHESTRATOR, &bump];
        let signer_seeds = &[orchestrator_seeds];

        let cpi_accounts = capital_pool::cpi::accounts::ApplyLosses {
            config: self.capital_config.to_account_info(),
            underwriter_account: underwriter_account.clone(),
            orchestrator: self.orchestrator.to_account_info(),
        };
        let applied = capital_pool::cpi::apply_losses(
            CpiContext::new_with_signer(
                self.capital_pool_program.to_account_info(),
                cpi_accounts,
                signer_seeds,
            ),
            underwriter,
            loss_amount,
            is_withdrawal_realization,
        )?
        .get();
        Ok(applied)
    }

    pub fn cpi_request_withdrawal(
        &self,
        underwriter_account: &AccountInfo<'info>,
        underwriter: &AccountInfo<'info>,
        shares: u64,
    ) -> Result<u64> {
        let bump = [self.risk_config.orchestrator_bump];
        let orchestrator_seeds: &[&[u8]] = &[seeds::ORCHESTRATOR, &bump];
        let signer_seeds = &[orchestrator_seeds];

        let cpi_accounts = capital_pool::cpi::accounts::UpdateWithdrawalRequest {
            config: self.capital_config.to_account_info(),
            underwriter_account: underwriter_account.clone(),
            underwriter: underwriter.clone(),
            orchestrator: self.orchestrator.to_account_info(),
        };
        let value = capital_pool::cpi::request_withdrawal(
            CpiContext::new_with_signer(
                self.capital_pool_program.to_account_info(),
                cpi_accounts,
                signer_seeds,
            ),
            shares,
        )?
        .get();
        Ok(value)
    }

    pub fn cpi_cancel_withdrawal_request(
        &self,
        underwriter_account: &AccountInfo<'info>,
        underwriter: &AccountInfo<'info>,
    ) -> Result<u64> {
        let bump = [self.risk_config.orchestrator_bump];
        let orchestrator_seeds: &[&[u8]] = &[seeds::ORCHESTRATOR, &bump];
        let signer_seeds = &[orchestrator_seeds];

        let cpi_accounts = capital_pool::cpi::accounts::UpdateWithdrawalRequest {
            config: self.capital_config.to_account_info(),
            underwriter_account: underwriter_account.clone(),
            underwriter: underwriter.clone(),
            orchestrator: self.orchestrator.to_account_info(),
        };
        let shares = capital_pool::cpi::cancel_withdrawal_request(CpiContext::new_with_signer(
            self.capital_pool_program.to_account_info(),
            cpi_accounts,
            signer_seeds,
        ))?
        .get();
        Ok(shares)
    }

    pub fn cpi_execute_withdrawal(
        &self,
        accounts: capital_pool::cpi::accounts::ExecuteWithdrawal<'info>,
    ) -> Result<WithdrawalReceipt> {
        let bump = [self.risk_config.orchestrator_bump];
        let orchestrator_seeds: &[&[u8]] = &[seeds::ORCHESTRATOR, &bump];
        let signer_seeds = &[orchestrator_seeds];

        let receipt = capital_pool::cpi::execute_withdrawal(CpiContext::new_with_signer(
            self.capital_pool_program.to_account_info(),
            accounts,
            signer_seeds,
        ))?
        .get();
        Ok(receipt)
    }

    /// Returns the shares minted
    pub fn cpi_deposit(
        &self,
        accounts: capital_pool::cpi::accounts::Deposit<'info>,
        amount: u64,
        yield_choice: u8,
    ) -> Result<u64> {
        let bump = [self.risk_config.orchestrator_bump];
        let orchestrator_seeds: &[&[u8]] = &[seeds::ORCHESTRATOR, &bump];
        let signer_seeds = &[orchestrator_seeds];

        let shares = capital_pool::cpi::deposit(
            CpiContext::new_with_signer(
                self.capital_pool_program.to_account_info(),
                accounts,
                signer_seeds,
            ),
            amount,
            yield_choice,
        )?
        .get();
        Ok(shares)
    }

    /// `adapter_accounts` are the (yield_adapter, adapter_vault) pairs in
    /// `params.capital_per_adapter` order
    pub fn cpi_execute_payout(
        &self,
        accounts: capital_pool::cpi::accounts::ExecutePayout<'info>,
        adapter_accounts: Vec<AccountInfo<'info>>,
        params: capital_pool::instructions::PayoutParams,
    ) -> Result<()> {
        let bump = [self.risk_config.orchestrator_bump];
        let orchestrator_seeds: &[&[u8]] = &[seeds::ORCHESTRATOR, &bump];
        let signer_seeds = &[orchestrator_seeds];

        capital_pool::cpi::execute_payout(
            CpiContext::new_with_signer(
                self.capital_pool_program.to_account_info(),
                accounts,
                signer_seeds,
            )
            .with_remaining_accounts(adapter_accounts),
            params,
        )
    }

    /// Returns the amount paid
    pub fn cpi_claim_reward(
        &self,
        accounts: reward_distributor::cpi::accounts::Claim<'info>,
        underwriter: Pubkey,
        pool_id: u64,
        pledge: u64,
    ) -> Result<u64> {
        let bump = [self.risk_config.orchestrator_bump];
        let orchestrator_seeds: &[&[u8]] = &[seeds::ORCHESTRATOR, &bump];
        let signer_seeds = &[orchestrator_seeds];

        let amount = reward_distributor::cpi::claim(
            CpiContext::new_with_signer(
                self.reward_distributor_program.to_account_info(),
                accounts,
                signer_seeds,
            ),
            underwriter,
            pool_id,
            pledge,
        )?
        .get();
        Ok(amount)
    }
}

// =============================================================================
// SETTLEMENT
// =============================================================================

/// Realize pending losses on every pledge and charge the total to the
/// underwriter's shares in one call.
///
/// Per pledge: settle rewards at the current pledge, realize the loss,
/// then shrink the pledge and the pool's pledged total by it.
/// Returns the amount the capital pool actually charged.
pub fn settle_underwriter<'info>(
    ledger: &Ledger<'info>,
    payer: &AccountInfo<'info>,
    underwriter: Pubkey,
    underwriter_account: &AccountInfo<'info>,
    position: &mut UnderwriterPosition,
    groups: &[PoolAccounts<'info>],
    is_withdrawal_realization: bool,
) -> Result<u64> {
    require!(
        groups.len() == position.pledges.len(),
        RiskError::InvalidRemainingAccounts
    );

    let mut total_loss: u64 = 0;
    for (pledge, group) in position.pledges.iter_mut().zip(groups.iter()) {
        group.load_pool(pledge.pool_id)?;

        ledger.cpi_update_user_state(payer, group, underwriter, pledge.pool_id, pledge.pledge)?;
        let loss = ledger.cpi_realize_losses(payer, group, underwriter, pledge.pool_id, pledge.pledge)?;
        if loss == 0 {
            continue;
        }

        let reduction = loss.min(pledge.pledge);
        pledge.pledge -= reduction;
        ledger.cpi_update_capital_allocation(
            &group.pool_state,
            pledge.pool_id,
            pledge.yield_choice,
            reduction,
            false,
        )?;
        total_loss = total_loss.checked_add(loss).ok_or(RiskError::MathOverflow)?;
    }

    if total_loss == 0 && !is_withdrawal_realization {
        return Ok(0);
    }

    let applied = ledger.cpi_apply_losses(
        underwriter_account,
        underwriter,
        total_loss,
        is_withdrawal_realization,
    )?;

    emit!(LossesRealized {
        underwriter,
        pools: groups.len() as u8,
        total_loss,
        applied,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(applied)
}
