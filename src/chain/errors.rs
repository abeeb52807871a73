use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeployError {
    #[error("constructor arguments were rejected: {0}")]
    Abi(#[from] ethers_core::abi::ethabi::Error),
    #[error("contract has no constructor but {0} arguments were provided")]
    UnexpectedArguments(usize),
    #[error("deployment ran out of gas (ceiling {gas_limit})")]
    OutOfGas { gas_limit: u64 },
    #[error("deployment reverted: {0}")]
    Reverted(String),
    #[error("deployment halted: {0}")]
    Halted(String),
    #[error("deployment transaction was rejected: {0}")]
    Rejected(String),
    #[error("deployment succeeded but produced no contract address")]
    NoAddress,
}

#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("contract has no function named `{0}`")]
    UnknownFunction(String),
    #[error("`{0}` mutates state, submit it as a transaction")]
    NotReadOnly(String),
    #[error("`{0}` is read-only, query it instead")]
    ReadOnly(String),
    #[error("call arguments were rejected: {0}")]
    Abi(#[from] ethers_core::abi::ethabi::Error),
    #[error("call ran out of gas (ceiling {gas_limit})")]
    OutOfGas { gas_limit: u64 },
    #[error("call reverted: {0}")]
    Reverted(String),
    #[error("call halted: {0}")]
    Halted(String),
    #[error("call transaction was rejected: {0}")]
    Rejected(String),
}
