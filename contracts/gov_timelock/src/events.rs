use soroban_sdk::{contracttype, Address, BytesN, Symbol};

#[contracttype]
#[derive(Clone, Debug)]
pub struct OperationScheduledEvent {
    pub id: BytesN<32>,
    pub proposer: Address,
    pub steps: u32,
    pub ready_at: u64,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct OperationExecutedEvent {
    pub id: BytesN<32>,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct OperationCancelledEvent {
    pub id: BytesN<32>,
    pub caller: Address,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct RoleGrantedEvent {
    pub role: Symbol,
    pub account: Address,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct RoleRevokedEvent {
    pub role: Symbol,
    pub account: Address,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct DelayUpdatedEvent {
    pub old_delay: u64,
    pub new_delay: u64,
}
