//! # Admin Agent
//!
//! Backend of the admin back-office AI assistant of a teacher-training
//! institute.
//!
//! This library provides:
//! - An HTTP API guarded by the admin session cookie
//! - A bounded tool-calling conversation loop
//! - Integration with OpenRouter for LLM access
//! - Web search and canvas (long-form content) tools
//!
//! ## Architecture
//!
//! The assistant follows the "tools in a loop" pattern:
//! 1. Receive the admin's chat history and chosen model via the API
//! 2. Prepend the system prompt and declare the available tools
//! 3. Call the LLM, execute any requested tool calls in order
//! 4. Feed results back to the LLM, at most five times, until it answers
//!
//! ## Example
//!
//! ```rust,ignore
//! use admin_agent::{api, config::Config};
//!
//! let config = Config::from_env()?;
//! api::serve(config).await?;
//! ```

pub mod agent;
pub mod api;
pub mod canvas_store;
pub mod config;
pub mod llm;
pub mod tools;

#[cfg(test)]
mod testing;

pub use config::Config;
