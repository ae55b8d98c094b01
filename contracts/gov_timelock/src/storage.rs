use soroban_sdk::{contracttype, symbol_short, Address, BytesN, Symbol, Val, Vec};

// Constants
/// Upper bound on the execution delay (14 days).
pub const MAX_DELAY: u64 = 14 * 24 * 60 * 60;

/// Role allowed to manage roles and cancel operations.
pub const ROLE_ADMIN: Symbol = symbol_short!("admin");
/// Role allowed to schedule operations.
pub const ROLE_PROPOSER: Symbol = symbol_short!("proposer");

#[contracttype]
#[derive(Clone, Debug)]
pub struct CallStep {
    /// Contract to invoke.
    pub target: Address,
    /// Function to call on the target.
    pub func: Symbol,
    /// Arguments, passed through unchanged.
    pub args: Vec<Val>,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct Operation {
    /// Calls executed in order; a failing call aborts the whole batch.
    pub steps: Vec<CallStep>,
    /// Disambiguates otherwise identical batches.
    pub salt: BytesN<32>,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum OperationStatus {
    /// Scheduled, waiting out the delay or ready to execute
    Scheduled = 0,
    /// Executed, terminal
    Executed = 1,
    /// Cancelled before execution, terminal
    Cancelled = 2,
}

/// Point-in-time view over a stored record and the ledger clock.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum OperationState {
    /// No record under this id
    Unset = 0,
    /// Scheduled, delay not yet elapsed
    Waiting = 1,
    /// Scheduled and past its ready timestamp
    Ready = 2,
    Executed = 3,
    Cancelled = 4,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct ScheduledOperation {
    /// Ledger timestamp at scheduling
    pub scheduled_at: u64,
    /// Earliest timestamp at which execution is allowed
    pub ready_at: u64,
    pub status: OperationStatus,
}

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Delay,
    Role(Symbol, Address),     // (role, account)
    Operation(BytesN<32>),     // operation id
    Initialized,
}
