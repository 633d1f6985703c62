// Public modules
pub mod code_audit;
pub mod config;
pub mod error;
pub mod model;
pub mod paths;
pub mod refactor;

// Re-export common types for convenience
pub use error::{Error, ErrorCode, Result};
