use std::{fs, path::PathBuf};

use ethers_core::abi::Token;
use inbox_playground::{chain::TestChain, compiler, constants};

fn main() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .init();

    let artifact = compiler::compile("test_contracts/inbox", "Inbox").unwrap();
    log::debug!("creation bytecode: 0x{}", hex::encode(&artifact.bytecode));

    // Export the artifact the way the compile step is meant to hand it off
    let export_path = PathBuf::from(constants::ROOT).join("target/Inbox.json");
    fs::create_dir_all(export_path.parent().unwrap()).unwrap();
    fs::write(&export_path, serde_json::to_string_pretty(&artifact).unwrap()).unwrap();
    log::info!("exported artifact to {}", export_path.display());

    let mut chain = TestChain::new();
    let sender = chain.accounts()[0];

    // Deploy the contract
    let inbox = chain
        .deploy(
            &artifact,
            &[Token::String("Hi there!".into())],
            sender,
            constants::BLOCK_GAS_LIMIT,
        )
        .unwrap();
    log::info!("deployed Inbox at {}", inbox.address);

    // Call message()
    let message = chain.call(&inbox, "message", &[]).unwrap();
    log::info!("initial message: {message:?}");

    // Call setMessage()
    let receipt = chain
        .send(
            &inbox,
            "setMessage",
            &[Token::String("bye".into())],
            sender,
            constants::BLOCK_GAS_LIMIT,
        )
        .unwrap();
    log::info!("setMessage confirmed, used {} gas", receipt.gas_used);

    let message = chain.call(&inbox, "message", &[]).unwrap();
    log::info!("message is now: {message:?}");
}
