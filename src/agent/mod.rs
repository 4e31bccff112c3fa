//! Agent module - the admin assistant's conversation loop.
//!
//! The agent follows a "tools in a loop" pattern:
//! 1. Prepend the system prompt to the admin's chat history
//! 2. Call the LLM with the registered tools declared
//! 3. If the LLM requests tool calls, execute them in order and feed the results back
//! 4. Repeat until the LLM answers in plain text or the turn budget runs out

mod agent_loop;
mod prompt;

pub use agent_loop::{Agent, AgentReply, MAX_TURNS, TURN_LIMIT_MESSAGE};
pub use prompt::build_system_prompt;
