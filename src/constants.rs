use once_cell::sync::Lazy;
use revm::primitives::{Address, U256};

pub const ROOT: &str = env!("CARGO_MANIFEST_DIR");

pub const CHAIN_ID: u64 = 1337;

pub const BLOCK_GAS_LIMIT: u64 = 30_000_000;

pub const ACCOUNT_COUNT: usize = 10;

// 10 ETH each, same as the usual dev-chain lineup
pub static RICH_BALANCE: Lazy<U256> = Lazy::new(|| U256::from(10u64).pow(U256::from(19)));

pub static DEV_ACCOUNTS: Lazy<Vec<Address>> = Lazy::new(|| {
    (1..=ACCOUNT_COUNT)
        .map(|index| Address::repeat_byte(index as u8))
        .collect()
});
