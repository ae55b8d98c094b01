use soroban_sdk::{xdr::ToXdr, Bytes, BytesN, Env};

use crate::storage::{Operation, OperationState, OperationStatus, ScheduledOperation};

/// Identifier of a batch: sha256 over its XDR serialization.
///
/// Commits to every step (target, function, arguments, order) and the salt,
/// so any change produces a different id.
pub fn hash(env: &Env, op: &Operation) -> BytesN<32> {
    let encoded: Bytes = op.clone().to_xdr(env);
    env.crypto().sha256(&encoded).to_bytes()
}

/// State of a stored record at ledger time `now`.
///
/// A scheduled record flips from Waiting to Ready once `ready_at` passes;
/// Executed and Cancelled are terminal.
pub fn state_of(record: &ScheduledOperation, now: u64) -> OperationState {
    match record.status {
        OperationStatus::Executed => OperationState::Executed,
        OperationStatus::Cancelled => OperationState::Cancelled,
        OperationStatus::Scheduled => {
            if now >= record.ready_at {
                OperationState::Ready
            } else {
                OperationState::Waiting
            }
        }
    }
}
