use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    // ============================================
    // INITIALIZATION ERRORS (1-5)
    // ============================================
    /// Contract already initialized
    AlreadyInitialized = 1,
    /// Contract not initialized
    NotInitialized = 2,

    // ============================================
    // AUTHORIZATION ERRORS (10-15)
    // ============================================
    /// Caller does not hold the required role
    Unauthorized = 10,

    // ============================================
    // OPERATION LIFECYCLE ERRORS (20-29)
    // ============================================
    /// No operation scheduled under this id
    OperationNotScheduled = 20,
    /// An operation with this id is already scheduled
    OperationAlreadyScheduled = 21,
    /// Operation delay has not elapsed
    OperationNotReady = 22,
    /// Operation was already executed
    OperationAlreadyExecuted = 23,
    /// Operation was cancelled
    OperationCancelled = 24,
    /// Empty batch, or a self-targeted step with an unknown function
    /// or malformed arguments
    InvalidOperation = 25,

    // ============================================
    // DELAY ERRORS (30-39)
    // ============================================
    /// Delay exceeds MAX_DELAY
    DelayTooLong = 30,
    /// now + delay overflows
    DelayOverflow = 31,
}
