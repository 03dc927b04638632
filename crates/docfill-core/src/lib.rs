pub mod config;
pub mod error;
pub mod field;
pub mod fill;
pub mod oracle;
pub mod session;

// Re-export common error type
pub use error::{DocfillError, Result};
