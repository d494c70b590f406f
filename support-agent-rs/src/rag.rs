//! Document question-answering tool
//!
//! Wraps the vector store as an ordinary tool so the router can invoke it
//! like any other: embed the query, fetch the most similar documents, and
//! answer from them. Registered only when a vector store is configured.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use support_sdk::llm::LlmClient;
use support_sdk::vectorstore::VectorStoreClient;

use crate::tools::Tool;

/// Tool answering questions from the embedded knowledge base
pub struct DocumentQaTool {
    llm: Arc<LlmClient>,
    store: Arc<VectorStoreClient>,
    k: usize,
}

impl DocumentQaTool {
    /// Create the tool with retrieval depth `k`
    pub fn new(llm: Arc<LlmClient>, store: Arc<VectorStoreClient>, k: usize) -> Self {
        Self { llm, store, k }
    }
}

#[async_trait]
impl Tool for DocumentQaTool {
    fn name(&self) -> &str {
        "DocumentQA"
    }

    fn description(&self) -> &str {
        "Use this tool to answer questions using enterprise documents. Only use if the question relates to stored knowledge or company data."
    }

    async fn call(&self, input: &str) -> String {
        let embedding = match self.llm.embed_text(input, None).await {
            Ok(embedding) => embedding,
            Err(e) => {
                warn!("Query embedding failed: {}", e);
                return "The knowledge base is not reachable right now.".to_string();
            }
        };

        let documents = match self.store.match_documents(&embedding, self.k).await {
            Ok(documents) => documents,
            Err(e) => {
                warn!("Similarity search failed: {}", e);
                return "The knowledge base is not reachable right now.".to_string();
            }
        };

        if documents.is_empty() {
            return "I could not find anything relevant in the knowledge base.".to_string();
        }

        debug!("Retrieved {} document(s) for the query", documents.len());

        let mut prompt = String::from(
            "Answer the customer's question using only the documents below. \
             If they do not contain the answer, say so.\n\n",
        );
        for (i, document) in documents.iter().enumerate() {
            prompt.push_str(&format!("Document {}:\n{}\n\n", i + 1, document.content));
        }
        prompt.push_str(&format!("Question: {}", input));

        match self.llm.simple_completion(&prompt, None).await {
            Ok(answer) => answer,
            Err(e) => {
                warn!("Document QA completion failed: {}", e);
                "I could not produce an answer from the knowledge base.".to_string()
            }
        }
    }
}
