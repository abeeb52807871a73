use std::path::PathBuf;

use ethers_core::{abi::Abi, types::Bytes};
use ethers_solc::{Artifact, Project, ProjectPathsConfig};
use serde::{Deserialize, Serialize};

use self::errors::CompileError;

pub mod errors;

const ROOT: &str = env!("CARGO_MANIFEST_DIR");

/// Output of a single compiler run. The ABI and the creation bytecode always
/// come from the same run; mixing them across runs is undefined on-chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractArtifact {
    pub abi: Abi,
    pub bytecode: Bytes,
}

/// Compiles the contract project at `project_dir` (relative to the crate
/// root, sources under `<project_dir>/src`) and extracts the contract named
/// `contract_name`. Recompiles on every call, nothing is cached or written
/// to disk.
pub fn compile(project_dir: &str, contract_name: &str) -> Result<ContractArtifact, CompileError> {
    let mut root = PathBuf::from(ROOT);
    root.push::<PathBuf>(project_dir.into());

    let project = Project::builder()
        .paths(
            ProjectPathsConfig::builder()
                .sources(root.join("src"))
                .build_with_root(&root),
        )
        .set_auto_detect(true)
        .ephemeral()
        .no_artifacts()
        .build()?;

    log::debug!("compiling {contract_name} from {}", root.display());
    let output = project.compile()?;
    if output.has_compiler_errors() {
        return Err(CompileError::Source(output.to_string()));
    }

    let artifact = output
        .find_first(contract_name)
        .ok_or_else(|| CompileError::MissingContract(contract_name.to_string()))?
        .clone();
    let (abi, bytecode, _deployed_bytecode) = artifact.into_parts();
    match (abi, bytecode) {
        (Some(abi), Some(bytecode)) if !bytecode.is_empty() => {
            Ok(ContractArtifact { abi, bytecode })
        }
        _ => Err(CompileError::IncompleteArtifact(contract_name.to_string())),
    }
}
