//! Command implementations for LOFT.

pub mod fetch;
pub mod generate;
pub mod index;
pub mod verify;

pub use fetch::FetchCommand;
pub use generate::{GenerateCommand, GenerateConfig, GenerateStats};
pub use index::{IndexCommand, IndexStats, PipelineState};
pub use verify::VerifyCommand;
