//! Agent assembly
//!
//! Composes the conversation LLM, the support tools, an optional
//! document-retrieval tool, a system prompt, and conversational memory
//! into a single `run(input) -> reply` entry point.
//!
//! Routing is one model decision per turn: the tool descriptions are the
//! sole signal for when a tool applies. A chosen tool is invoked with the
//! raw utterance, and its textual result is handed back to the model as an
//! observation to phrase the final short reply.

use std::sync::Arc;

use chrono::Local;
use tracing::{debug, warn};

use support_sdk::llm::{ChatMessage, LlmClient};
use support_sdk::vectorstore::VectorStoreClient;
use support_sdk::Result;

use crate::rag::DocumentQaTool;
use crate::tools::Tool;

/// Default number of documents retrieved per knowledge-base query
pub const DEFAULT_RETRIEVAL_DEPTH: usize = 3;

/// The support assistant's base instructions, dated for the current turn
pub fn default_system_prompt() -> String {
    format!(
        "You are a helpful customer support assistant.\n\
         1. You help answer questions about our services with the knowledge base.\n\
         \n\
         IMPORTANT: If you can't find any proper answer for the user's query, remind the customer that we can create a support ticket too.\n\
         \n\
         2. You process customer inquiries: you create support tickets in the database (when a ticket is created, let the customer know that \"The ticket has been created and the support team will work on that\") and help the customer check the status of their tickets (when asked for ticket status, output only the status and reason of each ticket, in the form Reason: <the reason>, Status: <status of ticket>).\n\
         \n\
         Today is: {}\n\
         \n\
         Important Rules\n\
         Never guess answers. Never make anything up. Always use the tools when needed.\n\
         Keep all responses short (under 50 tokens).",
        Local::now().format("%Y-%m-%d")
    )
}

/// Routing decision for a single turn
#[derive(Debug, Clone, PartialEq, Eq)]
enum Route {
    /// Invoke the named tool with the raw utterance
    Tool(String),
    /// Reply directly with this text
    Answer(String),
}

/// Parse the router model's reply into a routing decision.
///
/// Anything that is not a recognizable `TOOL:`/`ANSWER:` line degrades to
/// a direct answer with the reply text as-is.
fn parse_route(output: &str) -> Route {
    let trimmed = output.trim();

    if let Some(rest) = strip_prefix_ci(trimmed, "TOOL:") {
        let name = rest.lines().next().unwrap_or("").trim();
        if !name.is_empty() {
            return Route::Tool(name.to_string());
        }
    }

    if let Some(rest) = strip_prefix_ci(trimmed, "ANSWER:") {
        return Route::Answer(rest.trim().to_string());
    }

    Route::Answer(trimmed.to_string())
}

/// Case-insensitive prefix strip
fn strip_prefix_ci<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let candidate = text.get(..prefix.len())?;
    if candidate.eq_ignore_ascii_case(prefix) {
        Some(&text[prefix.len()..])
    } else {
        None
    }
}

/// Builder assembling a `SupportAgent`
pub struct AgentBuilder {
    llm: Arc<LlmClient>,
    tools: Vec<Arc<dyn Tool>>,
    vectorstore: Option<Arc<VectorStoreClient>>,
    system_prompt: String,
    retrieval_depth: usize,
}

impl AgentBuilder {
    /// Create a builder around the conversation LLM
    pub fn new(llm: Arc<LlmClient>) -> Self {
        Self {
            llm,
            tools: Vec::new(),
            vectorstore: None,
            system_prompt: default_system_prompt(),
            retrieval_depth: DEFAULT_RETRIEVAL_DEPTH,
        }
    }

    /// Register a tool; order is preserved
    pub fn tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.push(tool);
        self
    }

    /// Attach an optional vector store; when present, a document-QA tool
    /// is appended to the tool list
    pub fn vectorstore(mut self, store: Option<Arc<VectorStoreClient>>) -> Self {
        self.vectorstore = store;
        self
    }

    /// Override the system prompt
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Number of documents the retrieval tool fetches per query
    pub fn retrieval_depth(mut self, k: usize) -> Self {
        self.retrieval_depth = k;
        self
    }

    /// Assemble the agent
    pub fn build(self) -> SupportAgent {
        let mut tools = self.tools;

        if let Some(store) = self.vectorstore {
            tools.push(Arc::new(DocumentQaTool::new(
                self.llm.clone(),
                store,
                self.retrieval_depth,
            )));
        }

        SupportAgent {
            llm: self.llm,
            tools,
            system_prompt: self.system_prompt,
            memory: Vec::new(),
        }
    }
}

/// The assembled conversational agent
pub struct SupportAgent {
    llm: Arc<LlmClient>,
    tools: Vec<Arc<dyn Tool>>,
    system_prompt: String,

    /// Conversation so far, serialized into every prompt. This is the only
    /// state carried across turns.
    memory: Vec<ChatMessage>,
}

impl SupportAgent {
    /// Handle one user turn and return the reply
    pub async fn run(&mut self, input: &str) -> Result<String> {
        let route = self.route(input).await?;

        let reply = match route {
            Route::Tool(name) => {
                let tool = self
                    .tools
                    .iter()
                    .find(|t| t.name().eq_ignore_ascii_case(&name))
                    .cloned();

                match tool {
                    Some(tool) => {
                        debug!("Turn routed to tool {}", tool.name());
                        let observation = tool.call(input).await;
                        self.finalize(input, tool.name(), &observation).await
                    }
                    None => {
                        warn!("Router chose unknown tool {:?}", name);
                        self.direct_answer(input).await?
                    }
                }
            }
            Route::Answer(text) => text,
        };

        self.memory.push(ChatMessage::user(input));
        self.memory.push(ChatMessage::assistant(reply.clone()));

        Ok(reply)
    }

    /// Names of the registered tools, in registration order
    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// Ask the model to pick a tool or answer directly
    async fn route(&self, input: &str) -> Result<Route> {
        let mut instructions = String::from("Available tools:\n");
        for tool in &self.tools {
            instructions.push_str(&format!("{}: {}\n", tool.name(), tool.description()));
        }
        instructions.push_str(
            "\nDecide whether the user's latest message needs one of the tools.\n\
             Reply with a single line \"TOOL: <tool name>\" to invoke a tool, or\n\
             \"ANSWER: <your reply>\" to answer directly. Never invent tool results.",
        );

        let mut messages = vec![ChatMessage::system(format!(
            "{}\n\n{}",
            self.system_prompt, instructions
        ))];
        messages.extend(self.memory.iter().cloned());
        messages.push(ChatMessage::user(input));

        let output = self.llm.chat(messages, None).await?;
        Ok(parse_route(&output))
    }

    /// Phrase the final reply from a tool observation. Falls back to the
    /// raw observation when the model call fails: the tool result is
    /// already user-readable.
    async fn finalize(&self, input: &str, tool_name: &str, observation: &str) -> String {
        let mut messages = vec![ChatMessage::system(self.system_prompt.clone())];
        messages.extend(self.memory.iter().cloned());
        messages.push(ChatMessage::user(input));
        messages.push(ChatMessage::system(format!(
            "Tool {} returned:\n{}\n\nWrite the final reply to the customer using only this result.",
            tool_name, observation
        )));

        match self.llm.chat(messages, None).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Finalizing reply failed, returning tool output: {}", e);
                observation.to_string()
            }
        }
    }

    /// Answer without any tool context
    async fn direct_answer(&self, input: &str) -> Result<String> {
        let mut messages = vec![ChatMessage::system(self.system_prompt.clone())];
        messages.extend(self.memory.iter().cloned());
        messages.push(ChatMessage::user(input));

        self.llm.chat(messages, None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_route_tool() {
        assert_eq!(
            parse_route("TOOL: SearchUser"),
            Route::Tool("SearchUser".to_string())
        );
        assert_eq!(
            parse_route("tool: CreateTicket\nbecause the user asked"),
            Route::Tool("CreateTicket".to_string())
        );
    }

    #[test]
    fn test_parse_route_answer() {
        assert_eq!(
            parse_route("ANSWER: Happy to help!"),
            Route::Answer("Happy to help!".to_string())
        );
    }

    #[test]
    fn test_parse_route_degrades_to_answer() {
        assert_eq!(
            parse_route("I think the user wants a ticket"),
            Route::Answer("I think the user wants a ticket".to_string())
        );
        assert_eq!(parse_route("TOOL:"), Route::Answer("TOOL:".to_string()));
    }

    #[test]
    fn test_system_prompt_carries_current_date() {
        let today = Local::now().format("%Y-%m-%d").to_string();
        assert!(default_system_prompt().contains(&today));
    }
}
