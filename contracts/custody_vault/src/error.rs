use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    // Initialization errors
    AlreadyInitialized = 1,
    NotInitialized = 2,

    // Amount errors
    InvalidAmount = 40,
    ExceedsWithdrawalLimit = 41,

    // Timing errors
    WaitingPeriodNotElapsed = 50,
}
