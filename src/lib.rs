// Clippy allows for the whole crate
#![allow(clippy::should_implement_trait)]

//! LOFT: Line OFfset Table
//!
//! This library builds byte-offset indexes of record boundaries in large
//! line-oriented files (VCF and friends), so records can later be reached
//! with a single seek instead of a re-scan.
//!
//! # Features
//!
//! - **Streaming I/O**: fixed-size chunks, memory independent of file size
//! - **Bounded buffering**: offset text is flushed before it can overrun
//! - **Random access**: load an index back and fetch records by number
//!
//! # Example
//!
//! ```rust,no_run
//! use loft::{commands::IndexCommand, OffsetIndex};
//!
//! // Index a VCF file
//! let stats = IndexCommand::new().run("calls.vcf", "calls.vcf.offsets").unwrap();
//! println!("{}", stats);
//!
//! // Load it back
//! let index = OffsetIndex::from_path("calls.vcf.offsets").unwrap();
//! assert_eq!(index.len() as u64, stats.offsets);
//! ```

pub mod commands;
pub mod config;
pub mod error;
pub mod index;
pub mod streaming;

// Re-export commonly used types
pub use config::IndexConfig;
pub use error::{LoftError, Result};
pub use index::OffsetIndex;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::commands::{FetchCommand, IndexCommand, IndexStats, VerifyCommand};
    pub use crate::config::IndexConfig;
    pub use crate::error::{LoftError, Result};
    pub use crate::index::OffsetIndex;
}
