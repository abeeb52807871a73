use ethers_solc::error::SolcError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("compiler invocation failed: {0}")]
    Solc(#[from] SolcError),
    #[error("source failed to compile:\n{0}")]
    Source(String),
    #[error("no contract named `{0}` in the compilation output")]
    MissingContract(String),
    #[error("artifact for `{0}` is missing its ABI or bytecode")]
    IncompleteArtifact(String),
}
