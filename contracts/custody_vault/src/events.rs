use soroban_sdk::{contracttype, Address, BytesN};

#[contracttype]
#[derive(Clone, Debug)]
pub struct WithdrawalEvent {
    pub recipient: Address,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct SweepEvent {
    pub sweeper: Address,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct OwnershipTransferredEvent {
    pub old_owner: Address,
    pub new_owner: Address,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct UpgradedEvent {
    pub new_wasm_hash: BytesN<32>,
}
