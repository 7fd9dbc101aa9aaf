//! Grounded answer generation.

use super::context::{format_context, snippet};
use super::{AnswerResult, SourceRef};
use crate::config::{Prompts, RagSettings};
use crate::error::{Result, SvarError};
use crate::index::{IndexGateway, IndexHandle};
use crate::openai::{create_client, ensure_api_key};
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    CreateChatCompletionResponse,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// RAG engine for question answering.
pub struct RagEngine {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    gateway: Arc<IndexGateway>,
    prompts: Prompts,
    settings: RagSettings,
}

impl RagEngine {
    /// Create a new RAG engine.
    pub fn new(gateway: Arc<IndexGateway>, settings: RagSettings) -> Self {
        Self {
            client: create_client(),
            gateway,
            prompts: Prompts::default(),
            settings,
        }
    }

    /// Answer a question against the corpus behind `handle`.
    ///
    /// Retrieves the top chunks, assembles a bounded context, and asks the
    /// model to answer only from it. Every retrieved chunk comes back as a
    /// cited source in retrieval order.
    #[instrument(skip(self, handle), fields(question = %question))]
    pub async fn answer(&self, handle: &IndexHandle, question: &str) -> Result<AnswerResult> {
        // Fail on a missing credential before touching the network.
        ensure_api_key()?;

        let retrieved = self
            .gateway
            .search(handle, question, self.settings.max_context_chunks)
            .await?;

        let sources: Vec<SourceRef> = retrieved
            .iter()
            .map(|chunk| SourceRef {
                source: chunk.source.clone(),
                snippet: snippet(&chunk.content, self.settings.snippet_chars),
            })
            .collect();

        if retrieved.is_empty() {
            return Ok(AnswerResult {
                text: "I couldn't find any relevant information for this question.".to_string(),
                sources,
            });
        }

        let context = format_context(
            &retrieved,
            self.settings.chunk_char_cap,
            self.settings.max_context_chars,
        );

        let mut vars = HashMap::new();
        vars.insert("question".to_string(), question.to_string());
        vars.insert("context".to_string(), context);
        let user_prompt = Prompts::render(&self.prompts.rag.user, &vars);

        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(self.prompts.rag.system.clone())
                .build()
                .map_err(|e| SvarError::Rag(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user_prompt)
                .build()
                .map_err(|e| SvarError::Rag(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.settings.model)
            .messages(messages)
            .temperature(0.2)
            .build()
            .map_err(|e| SvarError::Rag(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| SvarError::OpenAI(format!("Failed to generate answer: {}", e)))?;

        let text = extract_message_text(&response);
        debug!("Generated answer with {} sources", sources.len());
        info!("Answered question with {} retrieved chunks", retrieved.len());

        Ok(AnswerResult { text, sources })
    }
}

/// Pull plain text out of a chat completion.
///
/// Falls back to serializing the whole response when the first choice
/// carries no text content, so an unexpected shape degrades lossily
/// instead of erroring.
fn extract_message_text(response: &CreateChatCompletionResponse) -> String {
    match response
        .choices
        .first()
        .and_then(|choice| choice.message.content.clone())
    {
        Some(text) => text,
        None => serde_json::to_string(response).unwrap_or_default(),
    }
}
