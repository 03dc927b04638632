//! Semantic oracle implementations.
//!
//! - [`LlmOracle`]: prompts a language model through a [`CompletionBackend`]
//!   ([`GeminiBackend`] or [`OpenAiBackend`])
//! - [`OfflineOracle`]: deterministic pattern-based stand-in, no network

pub mod backend;
pub mod factory;
pub mod gemini_backend;
pub mod llm_oracle;
pub mod offline_oracle;
pub mod openai_backend;
pub mod prompts;
pub mod response;

pub use backend::{CompletionBackend, is_quota_error};
pub use factory::{OracleSettings, build_oracle};
pub use gemini_backend::GeminiBackend;
pub use llm_oracle::LlmOracle;
pub use offline_oracle::OfflineOracle;
pub use openai_backend::OpenAiBackend;
