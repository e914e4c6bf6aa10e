//! CLI command implementations

pub mod generate;
pub mod import;

pub use generate::{GenerateArgs, GenerateCommand};
pub use import::{ImportArgs, ImportCommand};
