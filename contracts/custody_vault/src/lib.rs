#![no_std]

pub mod error;
mod events;
pub mod storage;

use error::Error;
use events::*;
use storage::{DataKey, WAITING_PERIOD, WITHDRAWAL_LIMIT};

use soroban_sdk::{contract, contractimpl, token, Address, BytesN, Env, Symbol};

#[contract]
pub struct CustodyVault;

#[contractimpl]
impl CustodyVault {
    // ============================================
    // INITIALIZATION
    // ============================================

    /// Initialize the vault
    ///
    /// The deployer authorizes initialization and hands control to the
    /// owner, expected to be a timelock contract. The withdrawal clock
    /// starts at the current ledger timestamp.
    ///
    /// # Errors
    /// - `AlreadyInitialized`: Contract already initialized
    pub fn initialize(
        env: Env,
        deployer: Address,
        owner: Address,
        sweeper: Address,
        token: Address,
    ) -> Result<(), Error> {
        if env.storage().instance().has(&DataKey::Initialized) {
            return Err(Error::AlreadyInitialized);
        }

        deployer.require_auth();

        env.storage().instance().set(&DataKey::Initialized, &true);
        env.storage().instance().set(&DataKey::Owner, &owner);
        env.storage().instance().set(&DataKey::Sweeper, &sweeper);
        env.storage().instance().set(&DataKey::Token, &token);
        env.storage()
            .instance()
            .set(&DataKey::LastWithdrawal, &env.ledger().timestamp());

        Ok(())
    }

    // ============================================
    // FUND MOVEMENT
    // ============================================

    /// Withdraw a limited amount to a recipient (owner only)
    ///
    /// At most `WITHDRAWAL_LIMIT` per call, and at most once per
    /// `WAITING_PERIOD`.
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `InvalidAmount`: Amount <= 0
    /// - `ExceedsWithdrawalLimit`: Amount above the per-call limit
    /// - `WaitingPeriodNotElapsed`: Called again too soon
    pub fn withdraw(env: Env, recipient: Address, amount: i128) -> Result<(), Error> {
        let owner: Address = env
            .storage()
            .instance()
            .get(&DataKey::Owner)
            .ok_or(Error::NotInitialized)?;
        owner.require_auth();

        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }
        if amount > WITHDRAWAL_LIMIT {
            return Err(Error::ExceedsWithdrawalLimit);
        }

        let last: u64 = env
            .storage()
            .instance()
            .get(&DataKey::LastWithdrawal)
            .unwrap_or(0);
        let now = env.ledger().timestamp();
        if now < last.saturating_add(WAITING_PERIOD) {
            return Err(Error::WaitingPeriodNotElapsed);
        }

        env.storage().instance().set(&DataKey::LastWithdrawal, &now);

        let token_addr: Address = env
            .storage()
            .instance()
            .get(&DataKey::Token)
            .ok_or(Error::NotInitialized)?;
        let token_client = token::Client::new(&env, &token_addr);
        token_client.transfer(&env.current_contract_address(), &recipient, &amount);

        env.events().publish(
            (Symbol::new(&env, "withdrawal"), recipient.clone()),
            WithdrawalEvent { recipient, amount },
        );

        Ok(())
    }

    /// Transfer the entire token balance to the sweeper (sweeper only)
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    pub fn sweep_funds(env: Env) -> Result<(), Error> {
        let sweeper: Address = env
            .storage()
            .instance()
            .get(&DataKey::Sweeper)
            .ok_or(Error::NotInitialized)?;
        sweeper.require_auth();

        let token_addr: Address = env
            .storage()
            .instance()
            .get(&DataKey::Token)
            .ok_or(Error::NotInitialized)?;
        let token_client = token::Client::new(&env, &token_addr);

        let amount = token_client.balance(&env.current_contract_address());
        if amount > 0 {
            token_client.transfer(&env.current_contract_address(), &sweeper, &amount);
        }

        env.events().publish(
            (Symbol::new(&env, "sweep"), sweeper.clone()),
            SweepEvent { sweeper, amount },
        );

        Ok(())
    }

    // ============================================
    // OWNERSHIP & UPGRADE
    // ============================================

    /// Replace the contract code (owner only)
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    pub fn upgrade(env: Env, new_wasm_hash: BytesN<32>) -> Result<(), Error> {
        let owner: Address = env
            .storage()
            .instance()
            .get(&DataKey::Owner)
            .ok_or(Error::NotInitialized)?;
        owner.require_auth();

        env.deployer()
            .update_current_contract_wasm(new_wasm_hash.clone());

        env.events().publish(
            (Symbol::new(&env, "upgraded"),),
            UpgradedEvent { new_wasm_hash },
        );

        Ok(())
    }

    /// Hand ownership to another address (owner only)
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    pub fn transfer_ownership(env: Env, new_owner: Address) -> Result<(), Error> {
        let owner: Address = env
            .storage()
            .instance()
            .get(&DataKey::Owner)
            .ok_or(Error::NotInitialized)?;
        owner.require_auth();

        env.storage().instance().set(&DataKey::Owner, &new_owner);

        env.events().publish(
            (Symbol::new(&env, "owner_changed"),),
            OwnershipTransferredEvent {
                old_owner: owner,
                new_owner,
            },
        );

        Ok(())
    }

    // ============================================
    // VIEW FUNCTIONS
    // ============================================

    /// Current owner
    pub fn get_owner(env: Env) -> Result<Address, Error> {
        env.storage()
            .instance()
            .get(&DataKey::Owner)
            .ok_or(Error::NotInitialized)
    }

    /// Sweep recipient
    pub fn get_sweeper(env: Env) -> Result<Address, Error> {
        env.storage()
            .instance()
            .get(&DataKey::Sweeper)
            .ok_or(Error::NotInitialized)
    }

    /// Token held by the vault
    pub fn get_token(env: Env) -> Result<Address, Error> {
        env.storage()
            .instance()
            .get(&DataKey::Token)
            .ok_or(Error::NotInitialized)
    }

    /// Timestamp of the last withdrawal (set at initialization)
    pub fn last_withdrawal_timestamp(env: Env) -> Result<u64, Error> {
        env.storage()
            .instance()
            .get(&DataKey::LastWithdrawal)
            .ok_or(Error::NotInitialized)
    }

    /// The vault's own token balance
    pub fn balance(env: Env) -> Result<i128, Error> {
        let token_addr: Address = env
            .storage()
            .instance()
            .get(&DataKey::Token)
            .ok_or(Error::NotInitialized)?;
        let token_client = token::Client::new(&env, &token_addr);
        Ok(token_client.balance(&env.current_contract_address()))
    }
}
