use ethers_core::abi::{Abi, StateMutability, Token};
use revm::{
    db::{CacheDB, EmptyDB, InMemoryDB},
    primitives::{
        AccountInfo, Address, CreateScheme, ExecutionResult, Halt, Log, Output, TransactTo, TxEnv,
        U256,
    },
    EVM,
};

use self::errors::{DeployError, ExecutionError};
use crate::{compiler::ContractArtifact, constants};

pub mod errors;

/// An in-process chain with a lineup of funded dev accounts. Every instance
/// starts from empty state; dropping it tears the chain down.
pub struct TestChain {
    evm: EVM<InMemoryDB>,
    accounts: Vec<Address>,
}

/// A contract instance living on some [`TestChain`], addressed by where its
/// deployment landed and described by its ABI.
#[derive(Debug, Clone)]
pub struct DeployedContract {
    pub address: Address,
    pub abi: Abi,
}

/// Confirmation of an included state-mutating call.
#[derive(Debug)]
pub struct Receipt {
    pub gas_used: u64,
    pub logs: Vec<Log>,
}

impl TestChain {
    pub fn new() -> Self {
        let mut db = CacheDB::new(EmptyDB::default());
        let accounts = constants::DEV_ACCOUNTS.clone();
        for address in &accounts {
            db.insert_account_info(
                *address,
                AccountInfo {
                    balance: *constants::RICH_BALANCE,
                    ..Default::default()
                },
            );
        }

        let mut evm: EVM<InMemoryDB> = EVM::new();
        evm.env.cfg.chain_id = constants::CHAIN_ID;
        evm.database(db);
        Self { evm, accounts }
    }

    pub fn accounts(&self) -> &[Address] {
        &self.accounts
    }

    /// Deploys `artifact` with the given constructor arguments, signed off by
    /// `sender`, spending at most `gas_limit`. State is committed once the
    /// creation succeeds and the new instance's address is returned.
    pub fn deploy(
        &mut self,
        artifact: &ContractArtifact,
        ctor_args: &[Token],
        sender: Address,
        gas_limit: u64,
    ) -> Result<DeployedContract, DeployError> {
        let code = artifact.bytecode.to_vec();
        let init_data = match artifact.abi.constructor() {
            Some(constructor) => constructor.encode_input(code, ctor_args)?,
            None if ctor_args.is_empty() => code,
            None => return Err(DeployError::UnexpectedArguments(ctor_args.len())),
        };

        log::debug!("deploying {} bytes of init code from {sender}", init_data.len());
        self.evm.env.tx = TxEnv {
            caller: sender,
            transact_to: TransactTo::Create(CreateScheme::Create),
            data: init_data.into(),
            gas_limit,
            ..Default::default()
        };
        let result = self
            .evm
            .transact_commit()
            .map_err(|err| DeployError::Rejected(format!("{err:?}")))?;

        match result {
            ExecutionResult::Success {
                output: Output::Create(_, Some(address)),
                ..
            } => Ok(DeployedContract {
                address,
                abi: artifact.abi.clone(),
            }),
            ExecutionResult::Success { .. } => Err(DeployError::NoAddress),
            ExecutionResult::Revert { output, .. } => {
                Err(DeployError::Reverted(revert_message(&output)))
            }
            ExecutionResult::Halt {
                reason: Halt::OutOfGas(_),
                ..
            } => Err(DeployError::OutOfGas { gas_limit }),
            ExecutionResult::Halt { reason, .. } => {
                Err(DeployError::Halted(format!("{reason:?}")))
            }
        }
    }

    /// Read-only query against a deployed instance. The function must be
    /// `view` or `pure`; nothing is committed and the decoded return values
    /// come back directly.
    pub fn call(
        &mut self,
        contract: &DeployedContract,
        function_name: &str,
        args: &[Token],
    ) -> Result<Vec<Token>, ExecutionError> {
        let function = contract
            .abi
            .function(function_name)
            .map_err(|_| ExecutionError::UnknownFunction(function_name.to_string()))?;
        if !matches!(
            function.state_mutability,
            StateMutability::Pure | StateMutability::View
        ) {
            return Err(ExecutionError::NotReadOnly(function_name.to_string()));
        }
        let calldata = function.encode_input(args)?;

        self.evm.env.tx = TxEnv {
            caller: self.accounts[0],
            transact_to: TransactTo::Call(contract.address),
            data: calldata.into(),
            gas_limit: constants::BLOCK_GAS_LIMIT,
            ..Default::default()
        };
        let outcome = self
            .evm
            .transact_ref()
            .map_err(|err| ExecutionError::Rejected(format!("{err:?}")))?;

        match outcome.result {
            ExecutionResult::Success { output, .. } => {
                let data = match output {
                    Output::Call(data) => data,
                    Output::Create(data, _) => data,
                };
                Ok(function.decode_output(&data)?)
            }
            ExecutionResult::Revert { output, .. } => {
                Err(ExecutionError::Reverted(revert_message(&output)))
            }
            ExecutionResult::Halt {
                reason: Halt::OutOfGas(_),
                ..
            } => Err(ExecutionError::OutOfGas {
                gas_limit: constants::BLOCK_GAS_LIMIT,
            }),
            ExecutionResult::Halt { reason, .. } => {
                Err(ExecutionError::Halted(format!("{reason:?}")))
            }
        }
    }

    /// State-mutating call from `sender`, spending at most `gas_limit`. The
    /// function must not be `view` or `pure`. State is committed once the
    /// call succeeds and the receipt confirms inclusion.
    pub fn send(
        &mut self,
        contract: &DeployedContract,
        function_name: &str,
        args: &[Token],
        sender: Address,
        gas_limit: u64,
    ) -> Result<Receipt, ExecutionError> {
        let function = contract
            .abi
            .function(function_name)
            .map_err(|_| ExecutionError::UnknownFunction(function_name.to_string()))?;
        if matches!(
            function.state_mutability,
            StateMutability::Pure | StateMutability::View
        ) {
            return Err(ExecutionError::ReadOnly(function_name.to_string()));
        }
        let calldata = function.encode_input(args)?;

        log::debug!("sending {function_name} to {} from {sender}", contract.address);
        self.evm.env.tx = TxEnv {
            caller: sender,
            transact_to: TransactTo::Call(contract.address),
            data: calldata.into(),
            gas_limit,
            ..Default::default()
        };
        let result = self
            .evm
            .transact_commit()
            .map_err(|err| ExecutionError::Rejected(format!("{err:?}")))?;

        match result {
            ExecutionResult::Success { gas_used, logs, .. } => Ok(Receipt { gas_used, logs }),
            ExecutionResult::Revert { output, .. } => {
                Err(ExecutionError::Reverted(revert_message(&output)))
            }
            ExecutionResult::Halt {
                reason: Halt::OutOfGas(_),
                ..
            } => Err(ExecutionError::OutOfGas { gas_limit }),
            ExecutionResult::Halt { reason, .. } => {
                Err(ExecutionError::Halted(format!("{reason:?}")))
            }
        }
    }
}

impl Default for TestChain {
    fn default() -> Self {
        Self::new()
    }
}

fn revert_message(output: &[u8]) -> String {
    decode_revert_reason(output).unwrap_or_else(|| format!("0x{}", hex::encode(output)))
}

// Decodes the two solc revert payloads, Error(string) and Panic(uint256).
// Anything else is surfaced as raw hex by the caller.
fn decode_revert_reason(output: &[u8]) -> Option<String> {
    if output.len() < 4 {
        return None;
    }
    let selector = &output[..4];

    // Error(string)
    if selector == [0x08, 0xc3, 0x79, 0xa0] && output.len() >= 68 {
        let len = usize::try_from(U256::from_be_slice(&output[36..68])).ok()?;
        if output.len() >= 68 + len {
            return String::from_utf8(output[68..68 + len].to_vec()).ok();
        }
    }

    // Panic(uint256)
    if selector == [0x4e, 0x48, 0x7b, 0x71] && output.len() >= 36 {
        let code = U256::from_be_slice(&output[4..36]);
        return Some(format!("Panic({code})"));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers_core::abi::encode;

    const COUNTER_ABI: &str = r#"[
        {
            "type": "function",
            "name": "get",
            "inputs": [],
            "outputs": [{ "name": "", "type": "uint256" }],
            "stateMutability": "view"
        },
        {
            "type": "function",
            "name": "increment",
            "inputs": [{ "name": "by", "type": "uint256" }],
            "outputs": [],
            "stateMutability": "nonpayable"
        }
    ]"#;

    fn counter_fixture() -> DeployedContract {
        DeployedContract {
            address: Address::repeat_byte(0xcc),
            abi: serde_json::from_str(COUNTER_ABI).unwrap(),
        }
    }

    #[test]
    fn querying_a_mutating_function_is_rejected_before_dispatch() {
        let contract = counter_fixture();
        let mut chain = TestChain::new();
        let err = chain.call(&contract, "increment", &[]).unwrap_err();
        assert!(matches!(err, ExecutionError::NotReadOnly(name) if name == "increment"));
    }

    #[test]
    fn sending_a_read_only_function_is_rejected_before_dispatch() {
        let contract = counter_fixture();
        let mut chain = TestChain::new();
        let sender = chain.accounts()[0];
        let err = chain
            .send(&contract, "get", &[], sender, constants::BLOCK_GAS_LIMIT)
            .unwrap_err();
        assert!(matches!(err, ExecutionError::ReadOnly(name) if name == "get"));
    }

    #[test]
    fn unknown_functions_are_rejected_before_dispatch() {
        let contract = counter_fixture();
        let mut chain = TestChain::new();
        let err = chain.call(&contract, "decrement", &[]).unwrap_err();
        assert!(matches!(err, ExecutionError::UnknownFunction(name) if name == "decrement"));
    }

    #[test]
    fn mismatched_arguments_are_rejected_before_dispatch() {
        let contract = counter_fixture();
        let mut chain = TestChain::new();
        let sender = chain.accounts()[0];
        let err = chain
            .send(
                &contract,
                "increment",
                &[Token::Bool(true)],
                sender,
                constants::BLOCK_GAS_LIMIT,
            )
            .unwrap_err();
        assert!(matches!(err, ExecutionError::Abi(_)));
    }

    #[test]
    fn dev_accounts_are_distinct() {
        let chain = TestChain::new();
        let accounts = chain.accounts();
        assert_eq!(accounts.len(), constants::ACCOUNT_COUNT);
        for (i, a) in accounts.iter().enumerate() {
            for b in &accounts[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn error_string_reverts_decode_to_their_reason() {
        let mut payload = vec![0x08, 0xc3, 0x79, 0xa0];
        payload.extend(encode(&[Token::String("count overflow".into())]));
        assert_eq!(
            decode_revert_reason(&payload).as_deref(),
            Some("count overflow")
        );
    }

    #[test]
    fn panic_reverts_decode_to_their_code() {
        let mut payload = vec![0x4e, 0x48, 0x7b, 0x71];
        payload.extend([0u8; 31]);
        payload.push(0x11);
        assert_eq!(decode_revert_reason(&payload).as_deref(), Some("Panic(17)"));
    }

    #[test]
    fn opaque_reverts_fall_back_to_hex() {
        assert_eq!(decode_revert_reason(&[0xde, 0xad]), None);
        assert_eq!(revert_message(&[0xde, 0xad]), "0xdead");
    }
}
