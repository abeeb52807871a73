pub mod chain;
pub mod compiler;
pub mod constants;
