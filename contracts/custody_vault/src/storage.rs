use soroban_sdk::contracttype;

// Constants
pub const SCALE: i128 = 10_000_000; // 7 decimals

/// Most a single owner withdrawal may move (1.0 token).
pub const WITHDRAWAL_LIMIT: i128 = 1 * SCALE;

/// Time between owner withdrawals (15 days).
pub const WAITING_PERIOD: u64 = 15 * 24 * 60 * 60;

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Owner,
    Sweeper,
    Token,
    LastWithdrawal,
    Initialized,
}
