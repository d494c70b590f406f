//! Process-wide dependency context
//!
//! The clients are built exactly once, up front, from the configuration
//! providers, and handed to the components that need them. Optional
//! integrations (field parser, vector store) degrade to disabled with a
//! logged warning; a missing conversation LLM is a hard startup error.

use std::sync::Arc;

use tracing::{info, warn};

use support_sdk::airtable::AirtableClient;
use support_sdk::config::{
    AirtableConfig, ConfigProvider, LlmConfig, VectorStoreConfig, DEFAULT_PROVIDER,
};
use support_sdk::llm::LlmClient;
use support_sdk::vectorstore::VectorStoreClient;
use support_sdk::Result;

use crate::agent::{AgentBuilder, SupportAgent};
use crate::extractor::FieldExtractor;
use crate::tools::{CreateTicketTool, SearchUserTool, TicketStatusTool};

/// The assembled client handles of the process
pub struct AppContext {
    /// Conversation LLM (required)
    pub llm: Arc<LlmClient>,

    /// Field-extraction parser; None disables model-assisted extraction
    pub parser: Option<Arc<LlmClient>>,

    /// Record backend holding the Users and Tickets tables
    pub backend: Arc<AirtableClient>,

    /// Vector store; None disables document retrieval
    pub vectorstore: Option<Arc<VectorStoreClient>>,
}

impl AppContext {
    /// Build the context from the default (environment) provider
    pub fn from_env() -> Result<Self> {
        Self::from_provider(&**DEFAULT_PROVIDER)
    }

    /// Build the context from a configuration provider
    pub fn from_provider<P: ConfigProvider + ?Sized>(provider: &P) -> Result<Self> {
        // The conversation LLM is the one integration this assistant cannot
        // run without; the error propagates to a startup failure
        let llm_config = LlmConfig::from_provider(provider)?;
        let has_parser = llm_config.parser_model.is_some();
        let llm = Arc::new(LlmClient::new_with_config(llm_config));

        let parser = if has_parser {
            Some(llm.clone())
        } else {
            warn!("No parser model configured; field extraction falls back to heuristics");
            None
        };

        let backend = match AirtableConfig::from_provider(provider) {
            Ok(config) => Arc::new(AirtableClient::new_with_config(config)),
            Err(e) => {
                warn!("Record backend not fully configured ({}); tool calls will fail until it is", e);
                Arc::new(AirtableClient::new_with_config(AirtableConfig::default()))
            }
        };

        let vectorstore = match VectorStoreConfig::from_provider(provider) {
            Ok(config) => Some(Arc::new(VectorStoreClient::new_with_config(config))),
            Err(e) => {
                warn!("Vector store not configured ({}); document retrieval disabled", e);
                None
            }
        };

        Ok(Self {
            llm,
            parser,
            backend,
            vectorstore,
        })
    }

    /// Assemble the conversational agent over this context: the three
    /// support tools in fixed order, plus document QA when available.
    pub fn assemble_agent(&self) -> SupportAgent {
        let extractor = Arc::new(FieldExtractor::new(self.parser.clone()));

        let search = Arc::new(SearchUserTool::new(self.backend.clone(), extractor.clone()));
        let create = Arc::new(CreateTicketTool::new(
            self.backend.clone(),
            extractor.clone(),
            search.clone(),
        ));
        let status = Arc::new(TicketStatusTool::new(
            self.backend.clone(),
            extractor,
            search.clone(),
        ));

        let agent = AgentBuilder::new(self.llm.clone())
            .tool(search)
            .tool(create)
            .tool(status)
            .vectorstore(self.vectorstore.clone())
            .build();

        info!("Agent assembled with tools: {}", agent.tool_names().join(", "));
        agent
    }
}
