//! Support tools backed by the record store
//!
//! The three action tools the agent can route a turn to. Every tool turns a
//! free-text utterance into one textual response: clarification requests,
//! domain refusals, and backend failures are all returned as strings, never
//! raised into the agent loop.

mod create_ticket;
mod search_user;
mod ticket_status;

pub use create_ticket::CreateTicketTool;
pub use search_user::{SearchUserTool, UserLookup};
pub use ticket_status::TicketStatusTool;

use async_trait::async_trait;

/// Denial returned when a tool refuses to act for a nonexistent user
pub const USER_MISSING_DENIAL: &str = "Sorry, this user does not exist in our database.";

/// A tool the agent can invoke with the raw user utterance
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name, used by the router to address it
    fn name(&self) -> &str;

    /// Natural-language usage description; the router's sole signal for
    /// deciding when to invoke this tool
    fn description(&self) -> &str;

    /// Handle an utterance and return the textual result
    async fn call(&self, input: &str) -> String;
}
