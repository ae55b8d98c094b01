#![no_std]

pub mod error;
mod events;
mod operation;
pub mod storage;

use error::Error;
use events::*;
use storage::{
    CallStep, DataKey, Operation, OperationState, OperationStatus, ScheduledOperation, MAX_DELAY,
    ROLE_ADMIN, ROLE_PROPOSER,
};

use soroban_sdk::{
    contract, contractimpl, Address, BytesN, Env, Symbol, TryFromVal, Val, Vec,
};

#[contract]
pub struct GovTimelock;

#[contractimpl]
impl GovTimelock {
    // ============================================
    // INITIALIZATION & ROLES
    // ============================================

    /// Initialize the timelock
    ///
    /// Grants the admin and proposer roles and stores the execution delay.
    ///
    /// # Errors
    /// - `AlreadyInitialized`: Contract already initialized
    /// - `DelayTooLong`: Delay exceeds MAX_DELAY
    pub fn initialize(
        env: Env,
        admin: Address,
        proposer: Address,
        delay: u64,
    ) -> Result<(), Error> {
        if env.storage().instance().has(&DataKey::Initialized) {
            return Err(Error::AlreadyInitialized);
        }

        admin.require_auth();

        if delay > MAX_DELAY {
            return Err(Error::DelayTooLong);
        }

        env.storage().instance().set(&DataKey::Initialized, &true);
        env.storage().instance().set(&DataKey::Delay, &delay);
        env.storage()
            .instance()
            .set(&DataKey::Role(ROLE_ADMIN, admin), &true);
        env.storage()
            .instance()
            .set(&DataKey::Role(ROLE_PROPOSER, proposer), &true);

        Ok(())
    }

    /// Grant a role to an account (admin only)
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `Unauthorized`: Caller does not hold the admin role
    pub fn grant_role(
        env: Env,
        caller: Address,
        role: Symbol,
        account: Address,
    ) -> Result<(), Error> {
        Self::check_initialized(&env)?;
        caller.require_auth();

        if !role_held(&env, ROLE_ADMIN, &caller) {
            return Err(Error::Unauthorized);
        }

        set_role(&env, role, account, true);
        Ok(())
    }

    /// Revoke a role from an account (admin only)
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `Unauthorized`: Caller does not hold the admin role
    pub fn revoke_role(
        env: Env,
        caller: Address,
        role: Symbol,
        account: Address,
    ) -> Result<(), Error> {
        Self::check_initialized(&env)?;
        caller.require_auth();

        if !role_held(&env, ROLE_ADMIN, &caller) {
            return Err(Error::Unauthorized);
        }

        set_role(&env, role, account, false);
        Ok(())
    }

    // ============================================
    // OPERATION LIFECYCLE
    // ============================================

    /// Schedule a batch for execution after the delay (proposer only)
    ///
    /// Returns the operation id. The batch becomes ready at
    /// `now + delay` and stays executable until executed or cancelled.
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `Unauthorized`: Proposer does not hold the proposer role
    /// - `InvalidOperation`: Empty batch
    /// - `OperationAlreadyScheduled`: Identical batch (same salt) already pending
    /// - `OperationAlreadyExecuted`: This batch's id was already executed
    /// - `OperationCancelled`: This batch's id was cancelled
    /// - `DelayOverflow`: now + delay overflows
    pub fn schedule(env: Env, proposer: Address, op: Operation) -> Result<BytesN<32>, Error> {
        Self::check_initialized(&env)?;

        proposer.require_auth();
        if !role_held(&env, ROLE_PROPOSER, &proposer) {
            return Err(Error::Unauthorized);
        }

        if op.steps.is_empty() {
            return Err(Error::InvalidOperation);
        }

        // an id is consumed for good; a new salt makes a new id
        let id = operation::hash(&env, &op);
        if let Some(existing) = env
            .storage()
            .instance()
            .get::<DataKey, ScheduledOperation>(&DataKey::Operation(id.clone()))
        {
            return Err(match existing.status {
                OperationStatus::Scheduled => Error::OperationAlreadyScheduled,
                OperationStatus::Executed => Error::OperationAlreadyExecuted,
                OperationStatus::Cancelled => Error::OperationCancelled,
            });
        }

        let delay: u64 = env
            .storage()
            .instance()
            .get(&DataKey::Delay)
            .ok_or(Error::NotInitialized)?;

        let now = env.ledger().timestamp();
        let ready_at = now.checked_add(delay).ok_or(Error::DelayOverflow)?;

        let record = ScheduledOperation {
            scheduled_at: now,
            ready_at,
            status: OperationStatus::Scheduled,
        };
        env.storage()
            .instance()
            .set(&DataKey::Operation(id.clone()), &record);

        env.events().publish(
            (Symbol::new(&env, "op_scheduled"), id.clone()),
            OperationScheduledEvent {
                id: id.clone(),
                proposer,
                steps: op.steps.len(),
                ready_at,
            },
        );

        Ok(id)
    }

    /// Execute a scheduled batch (callable by anyone)
    ///
    /// The batch must already be scheduled and past its ready timestamp;
    /// readiness is checked before any step runs and the record is marked
    /// executed first, so an operation can never observe itself as pending.
    /// Steps targeting the timelock itself are applied internally
    /// (`update_delay`, `grant_role`, `revoke_role`); every other step is a
    /// cross-contract invocation, and a failing step aborts the whole call.
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `OperationNotScheduled`: No record under this batch's id
    /// - `OperationNotReady`: Delay has not elapsed
    /// - `OperationAlreadyExecuted`: Batch already executed
    /// - `OperationCancelled`: Batch was cancelled
    /// - `InvalidOperation`: Malformed self-targeted step
    pub fn execute(env: Env, op: Operation) -> Result<(), Error> {
        Self::check_initialized(&env)?;

        let id = operation::hash(&env, &op);
        let mut record: ScheduledOperation = env
            .storage()
            .instance()
            .get(&DataKey::Operation(id.clone()))
            .ok_or(Error::OperationNotScheduled)?;

        match operation::state_of(&record, env.ledger().timestamp()) {
            OperationState::Ready => {}
            OperationState::Waiting => return Err(Error::OperationNotReady),
            OperationState::Executed => return Err(Error::OperationAlreadyExecuted),
            OperationState::Cancelled => return Err(Error::OperationCancelled),
            OperationState::Unset => return Err(Error::OperationNotScheduled),
        }

        record.status = OperationStatus::Executed;
        env.storage()
            .instance()
            .set(&DataKey::Operation(id.clone()), &record);

        let this = env.current_contract_address();
        for step in op.steps.iter() {
            if step.target == this {
                apply_self_step(&env, &step)?;
            } else {
                env.invoke_contract::<Val>(&step.target, &step.func, step.args.clone());
            }
        }

        env.events().publish(
            (Symbol::new(&env, "op_executed"), id.clone()),
            OperationExecutedEvent { id },
        );

        Ok(())
    }

    /// Cancel a scheduled batch (admin or proposer only)
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `Unauthorized`: Caller holds neither the admin nor the proposer role
    /// - `OperationNotScheduled`: No record under this id
    /// - `OperationAlreadyExecuted`: Batch already executed
    /// - `OperationCancelled`: Batch already cancelled
    pub fn cancel(env: Env, caller: Address, id: BytesN<32>) -> Result<(), Error> {
        Self::check_initialized(&env)?;

        caller.require_auth();
        if !role_held(&env, ROLE_ADMIN, &caller) && !role_held(&env, ROLE_PROPOSER, &caller) {
            return Err(Error::Unauthorized);
        }

        let mut record: ScheduledOperation = env
            .storage()
            .instance()
            .get(&DataKey::Operation(id.clone()))
            .ok_or(Error::OperationNotScheduled)?;

        match record.status {
            OperationStatus::Executed => return Err(Error::OperationAlreadyExecuted),
            OperationStatus::Cancelled => return Err(Error::OperationCancelled),
            OperationStatus::Scheduled => {}
        }

        record.status = OperationStatus::Cancelled;
        env.storage()
            .instance()
            .set(&DataKey::Operation(id.clone()), &record);

        env.events().publish(
            (Symbol::new(&env, "op_cancelled"), id.clone()),
            OperationCancelledEvent { id, caller },
        );

        Ok(())
    }

    // ============================================
    // VIEW FUNCTIONS
    // ============================================

    /// Current execution delay in seconds
    pub fn get_delay(env: Env) -> Result<u64, Error> {
        env.storage()
            .instance()
            .get(&DataKey::Delay)
            .ok_or(Error::NotInitialized)
    }

    /// Check whether an account holds a role
    pub fn has_role(env: Env, role: Symbol, account: Address) -> bool {
        role_held(&env, role, &account)
    }

    /// Identifier a batch would be scheduled under
    pub fn operation_id(env: Env, op: Operation) -> BytesN<32> {
        operation::hash(&env, &op)
    }

    /// Lifecycle state of an operation id at the current ledger time
    pub fn operation_state(env: Env, id: BytesN<32>) -> OperationState {
        match env
            .storage()
            .instance()
            .get::<DataKey, ScheduledOperation>(&DataKey::Operation(id))
        {
            Some(record) => operation::state_of(&record, env.ledger().timestamp()),
            None => OperationState::Unset,
        }
    }

    // ============================================
    // INTERNAL HELPERS
    // ============================================

    fn check_initialized(env: &Env) -> Result<(), Error> {
        if !env.storage().instance().has(&DataKey::Initialized) {
            return Err(Error::NotInitialized);
        }
        Ok(())
    }
}

fn role_held(env: &Env, role: Symbol, account: &Address) -> bool {
    env.storage()
        .instance()
        .get::<DataKey, bool>(&DataKey::Role(role, account.clone()))
        .unwrap_or(false)
}

fn set_role(env: &Env, role: Symbol, account: Address, grant: bool) {
    let key = DataKey::Role(role.clone(), account.clone());
    if grant {
        env.storage().instance().set(&key, &true);
        env.events().publish(
            (Symbol::new(env, "role_granted"), role.clone()),
            RoleGrantedEvent { role, account },
        );
    } else {
        env.storage().instance().remove(&key);
        env.events().publish(
            (Symbol::new(env, "role_revoked"), role.clone()),
            RoleRevokedEvent { role, account },
        );
    }
}

/// Apply a step targeting the timelock itself.
///
/// Soroban forbids reentrant self-invocation, so self-governance calls are
/// dispatched here instead of going through `invoke_contract`. These are the
/// only mutators reachable without an admin signature: the batch carrying
/// them already went through schedule-and-wait.
fn apply_self_step(env: &Env, step: &CallStep) -> Result<(), Error> {
    if step.func == Symbol::new(env, "update_delay") {
        let new_delay: u64 = decode_arg(env, &step.args, 0)?;
        if new_delay > MAX_DELAY {
            return Err(Error::DelayTooLong);
        }
        let old_delay: u64 = env.storage().instance().get(&DataKey::Delay).unwrap_or(0);
        env.storage().instance().set(&DataKey::Delay, &new_delay);
        env.events().publish(
            (Symbol::new(env, "delay_updated"),),
            DelayUpdatedEvent {
                old_delay,
                new_delay,
            },
        );
        Ok(())
    } else if step.func == Symbol::new(env, "grant_role") {
        let role: Symbol = decode_arg(env, &step.args, 0)?;
        let account: Address = decode_arg(env, &step.args, 1)?;
        set_role(env, role, account, true);
        Ok(())
    } else if step.func == Symbol::new(env, "revoke_role") {
        let role: Symbol = decode_arg(env, &step.args, 0)?;
        let account: Address = decode_arg(env, &step.args, 1)?;
        set_role(env, role, account, false);
        Ok(())
    } else {
        Err(Error::InvalidOperation)
    }
}

fn decode_arg<T: TryFromVal<Env, Val>>(env: &Env, args: &Vec<Val>, index: u32) -> Result<T, Error> {
    let val = args.get(index).ok_or(Error::InvalidOperation)?;
    T::try_from_val(env, &val).map_err(|_| Error::InvalidOperation)
}

#[cfg(test)]
mod test {
    use super::*;
    use soroban_sdk::{
        testutils::{Address as _, Ledger},
        vec, Address, Env, IntoVal,
    };

    const DELAY: u64 = 3600;

    struct Setup {
        env: Env,
        timelock_id: Address,
        admin: Address,
        proposer: Address,
    }

    fn setup() -> Setup {
        let env = Env::default();
        env.mock_all_auths();

        let timelock_id = env.register_contract(None, GovTimelock);
        let client = GovTimelockClient::new(&env, &timelock_id);

        let admin = Address::generate(&env);
        let proposer = Address::generate(&env);
        client.initialize(&admin, &proposer, &DELAY);

        Setup {
            env,
            timelock_id,
            admin,
            proposer,
        }
    }

    fn self_op(env: &Env, timelock: &Address, func: &str, args: Vec<Val>, salt: u8) -> Operation {
        Operation {
            steps: vec![
                env,
                CallStep {
                    target: timelock.clone(),
                    func: Symbol::new(env, func),
                    args,
                },
            ],
            salt: BytesN::from_array(env, &[salt; 32]),
        }
    }

    #[test]
    fn test_initialize_once() {
        let s = setup();
        let client = GovTimelockClient::new(&s.env, &s.timelock_id);

        let result = client.try_initialize(&s.admin, &s.proposer, &DELAY);
        assert_eq!(result, Err(Ok(Error::AlreadyInitialized)));
    }

    #[test]
    fn test_initialize_rejects_excessive_delay() {
        let env = Env::default();
        env.mock_all_auths();

        let timelock_id = env.register_contract(None, GovTimelock);
        let client = GovTimelockClient::new(&env, &timelock_id);

        let admin = Address::generate(&env);
        let proposer = Address::generate(&env);

        let result = client.try_initialize(&admin, &proposer, &(MAX_DELAY + 1));
        assert_eq!(result, Err(Ok(Error::DelayTooLong)));
    }

    #[test]
    fn test_schedule_requires_proposer_role() {
        let s = setup();
        let client = GovTimelockClient::new(&s.env, &s.timelock_id);

        let op = self_op(
            &s.env,
            &s.timelock_id,
            "update_delay",
            vec![&s.env, 0u64.into_val(&s.env)],
            1,
        );

        let outsider = Address::generate(&s.env);
        let result = client.try_schedule(&outsider, &op);
        assert_eq!(result, Err(Ok(Error::Unauthorized)));
    }

    #[test]
    fn test_schedule_rejects_empty_batch() {
        let s = setup();
        let client = GovTimelockClient::new(&s.env, &s.timelock_id);

        let op = Operation {
            steps: vec![&s.env],
            salt: BytesN::from_array(&s.env, &[0; 32]),
        };

        let result = client.try_schedule(&s.proposer, &op);
        assert_eq!(result, Err(Ok(Error::InvalidOperation)));
    }

    #[test]
    fn test_schedule_rejects_duplicate() {
        let s = setup();
        let client = GovTimelockClient::new(&s.env, &s.timelock_id);

        let op = self_op(
            &s.env,
            &s.timelock_id,
            "update_delay",
            vec![&s.env, 60u64.into_val(&s.env)],
            1,
        );

        client.schedule(&s.proposer, &op);
        let result = client.try_schedule(&s.proposer, &op);
        assert_eq!(result, Err(Ok(Error::OperationAlreadyScheduled)));

        // a different salt is a different operation
        let mut resalted = op.clone();
        resalted.salt = BytesN::from_array(&s.env, &[2; 32]);
        client.schedule(&s.proposer, &resalted);
    }

    #[test]
    fn test_schedule_consumed_ids() {
        let s = setup();
        let client = GovTimelockClient::new(&s.env, &s.timelock_id);

        let executed = self_op(
            &s.env,
            &s.timelock_id,
            "update_delay",
            vec![&s.env, 60u64.into_val(&s.env)],
            1,
        );
        client.schedule(&s.proposer, &executed);
        s.env.ledger().with_mut(|li| li.timestamp += DELAY);
        client.execute(&executed);

        let result = client.try_schedule(&s.proposer, &executed);
        assert_eq!(result, Err(Ok(Error::OperationAlreadyExecuted)));

        let cancelled = self_op(
            &s.env,
            &s.timelock_id,
            "update_delay",
            vec![&s.env, 60u64.into_val(&s.env)],
            2,
        );
        let id = client.schedule(&s.proposer, &cancelled);
        client.cancel(&s.proposer, &id);

        let result = client.try_schedule(&s.proposer, &cancelled);
        assert_eq!(result, Err(Ok(Error::OperationCancelled)));
    }

    #[test]
    fn test_schedule_delay_overflow() {
        let s = setup();
        let client = GovTimelockClient::new(&s.env, &s.timelock_id);

        s.env.ledger().with_mut(|li| li.timestamp = u64::MAX - 1);

        let op = self_op(
            &s.env,
            &s.timelock_id,
            "update_delay",
            vec![&s.env, 60u64.into_val(&s.env)],
            1,
        );

        let result = client.try_schedule(&s.proposer, &op);
        assert_eq!(result, Err(Ok(Error::DelayOverflow)));
    }

    #[test]
    fn test_execute_respects_delay() {
        let s = setup();
        let client = GovTimelockClient::new(&s.env, &s.timelock_id);

        let op = self_op(
            &s.env,
            &s.timelock_id,
            "update_delay",
            vec![&s.env, 60u64.into_val(&s.env)],
            1,
        );

        let id = client.schedule(&s.proposer, &op);
        assert_eq!(client.operation_state(&id), OperationState::Waiting);

        let result = client.try_execute(&op);
        assert_eq!(result, Err(Ok(Error::OperationNotReady)));

        s.env.ledger().with_mut(|li| li.timestamp += DELAY);
        assert_eq!(client.operation_state(&id), OperationState::Ready);

        client.execute(&op);
        assert_eq!(client.get_delay(), 60);
        assert_eq!(client.operation_state(&id), OperationState::Executed);

        let result = client.try_execute(&op);
        assert_eq!(result, Err(Ok(Error::OperationAlreadyExecuted)));
    }

    #[test]
    fn test_execute_unknown_operation() {
        let s = setup();
        let client = GovTimelockClient::new(&s.env, &s.timelock_id);

        let op = self_op(
            &s.env,
            &s.timelock_id,
            "update_delay",
            vec![&s.env, 60u64.into_val(&s.env)],
            9,
        );

        let result = client.try_execute(&op);
        assert_eq!(result, Err(Ok(Error::OperationNotScheduled)));
    }

    #[test]
    fn test_cancel() {
        let s = setup();
        let client = GovTimelockClient::new(&s.env, &s.timelock_id);

        let op = self_op(
            &s.env,
            &s.timelock_id,
            "update_delay",
            vec![&s.env, 60u64.into_val(&s.env)],
            1,
        );

        let id = client.schedule(&s.proposer, &op);

        let outsider = Address::generate(&s.env);
        let result = client.try_cancel(&outsider, &id);
        assert_eq!(result, Err(Ok(Error::Unauthorized)));

        client.cancel(&s.proposer, &id);
        assert_eq!(client.operation_state(&id), OperationState::Cancelled);

        s.env.ledger().with_mut(|li| li.timestamp += DELAY);
        let result = client.try_execute(&op);
        assert_eq!(result, Err(Ok(Error::OperationCancelled)));

        let result = client.try_cancel(&s.admin, &id);
        assert_eq!(result, Err(Ok(Error::OperationCancelled)));
    }

    #[test]
    fn test_role_management() {
        let s = setup();
        let client = GovTimelockClient::new(&s.env, &s.timelock_id);

        let newcomer = Address::generate(&s.env);
        assert!(!client.has_role(&ROLE_PROPOSER, &newcomer));

        let result = client.try_grant_role(&newcomer, &ROLE_PROPOSER, &newcomer);
        assert_eq!(result, Err(Ok(Error::Unauthorized)));

        client.grant_role(&s.admin, &ROLE_PROPOSER, &newcomer);
        assert!(client.has_role(&ROLE_PROPOSER, &newcomer));

        // newly granted proposer can schedule
        let op = self_op(
            &s.env,
            &s.timelock_id,
            "update_delay",
            vec![&s.env, 120u64.into_val(&s.env)],
            3,
        );
        client.schedule(&newcomer, &op);

        client.revoke_role(&s.admin, &ROLE_PROPOSER, &newcomer);
        assert!(!client.has_role(&ROLE_PROPOSER, &newcomer));
    }

    #[test]
    fn test_self_step_grants_role() {
        let s = setup();
        let client = GovTimelockClient::new(&s.env, &s.timelock_id);

        let newcomer = Address::generate(&s.env);
        let op = self_op(
            &s.env,
            &s.timelock_id,
            "grant_role",
            vec![
                &s.env,
                ROLE_PROPOSER.into_val(&s.env),
                newcomer.clone().into_val(&s.env),
            ],
            4,
        );

        client.schedule(&s.proposer, &op);
        s.env.ledger().with_mut(|li| li.timestamp += DELAY);
        client.execute(&op);

        assert!(client.has_role(&ROLE_PROPOSER, &newcomer));
    }

    #[test]
    fn test_self_step_unknown_function() {
        let s = setup();
        let client = GovTimelockClient::new(&s.env, &s.timelock_id);

        let op = self_op(&s.env, &s.timelock_id, "selfdestruct", vec![&s.env], 5);

        client.schedule(&s.proposer, &op);
        s.env.ledger().with_mut(|li| li.timestamp += DELAY);

        let result = client.try_execute(&op);
        assert_eq!(result, Err(Ok(Error::InvalidOperation)));
    }

    #[test]
    fn test_self_step_malformed_args() {
        let s = setup();
        let client = GovTimelockClient::new(&s.env, &s.timelock_id);

        // update_delay expects a u64, hand it an address
        let wrong_type = self_op(
            &s.env,
            &s.timelock_id,
            "update_delay",
            vec![&s.env, Address::generate(&s.env).into_val(&s.env)],
            7,
        );
        client.schedule(&s.proposer, &wrong_type);

        // grant_role with the account argument missing
        let missing_arg = self_op(
            &s.env,
            &s.timelock_id,
            "grant_role",
            vec![&s.env, ROLE_PROPOSER.into_val(&s.env)],
            8,
        );
        client.schedule(&s.proposer, &missing_arg);

        s.env.ledger().with_mut(|li| li.timestamp += DELAY);

        let result = client.try_execute(&wrong_type);
        assert_eq!(result, Err(Ok(Error::InvalidOperation)));
        assert_eq!(client.get_delay(), DELAY);

        let result = client.try_execute(&missing_arg);
        assert_eq!(result, Err(Ok(Error::InvalidOperation)));
    }

    #[test]
    fn test_self_step_delay_bound() {
        let s = setup();
        let client = GovTimelockClient::new(&s.env, &s.timelock_id);

        let op = self_op(
            &s.env,
            &s.timelock_id,
            "update_delay",
            vec![&s.env, (MAX_DELAY + 1).into_val(&s.env)],
            6,
        );

        client.schedule(&s.proposer, &op);
        s.env.ledger().with_mut(|li| li.timestamp += DELAY);

        let result = client.try_execute(&op);
        assert_eq!(result, Err(Ok(Error::DelayTooLong)));
        assert_eq!(client.get_delay(), DELAY);
    }

    #[test]
    fn test_operation_id_matches_schedule() {
        let s = setup();
        let client = GovTimelockClient::new(&s.env, &s.timelock_id);

        let op = self_op(
            &s.env,
            &s.timelock_id,
            "update_delay",
            vec![&s.env, 60u64.into_val(&s.env)],
            7,
        );

        let id = client.schedule(&s.proposer, &op);
        assert_eq!(client.operation_id(&op), id);
    }
}
