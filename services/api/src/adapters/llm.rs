//! services/api/src/adapters/llm.rs
//!
//! This module contains the adapter for the chat language model.
//! It implements the `LanguageModelService` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use study_buddy_core::{
    domain::{ChatRole, ChatTurn},
    ports::{CoreError, CoreResult, LanguageModelService},
};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `LanguageModelService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiChatAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiChatAdapter {
    /// Creates a new `OpenAiChatAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }

    /// Sends an assembled message list and extracts the first choice's text.
    async fn send(&self, messages: Vec<ChatCompletionRequestMessage>) -> CoreResult<String> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .n(1)
            .build()
            .map_err(|e| CoreError::Model(e.to_string()))?;

        // Call the API and manually map the error if it occurs, which respects the orphan rule.
        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| CoreError::Model(e.to_string()))?;

        // Extract the text content from the first choice in the response.
        if let Some(choice) = response.choices.into_iter().next() {
            if let Some(content) = choice.message.content {
                Ok(content)
            } else {
                Err(CoreError::Model(
                    "Chat model response contained no text content.".to_string(),
                ))
            }
        } else {
            Err(CoreError::Model(
                "Chat model returned no choices in its response.".to_string(),
            ))
        }
    }
}

fn system_message(content: &str) -> CoreResult<ChatCompletionRequestMessage> {
    Ok(ChatCompletionRequestSystemMessageArgs::default()
        .content(content)
        .build()
        .map_err(|e| CoreError::Model(e.to_string()))?
        .into())
}

fn user_message(content: &str) -> CoreResult<ChatCompletionRequestMessage> {
    Ok(ChatCompletionRequestUserMessageArgs::default()
        .content(content)
        .build()
        .map_err(|e| CoreError::Model(e.to_string()))?
        .into())
}

fn assistant_message(content: &str) -> CoreResult<ChatCompletionRequestMessage> {
    Ok(ChatCompletionRequestAssistantMessageArgs::default()
        .content(content)
        .build()
        .map_err(|e| CoreError::Model(e.to_string()))?
        .into())
}

//=========================================================================================
// `LanguageModelService` Trait Implementation
//=========================================================================================

#[async_trait]
impl LanguageModelService for OpenAiChatAdapter {
    async fn complete(&self, system: &str, user: &str) -> CoreResult<String> {
        let messages = vec![system_message(system)?, user_message(user)?];
        self.send(messages).await
    }

    async fn complete_chat(
        &self,
        system: &str,
        history: &[ChatTurn],
        user: &str,
    ) -> CoreResult<String> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(system_message(system)?);
        for turn in history {
            let message = match turn.role {
                ChatRole::Human => user_message(&turn.content)?,
                ChatRole::Ai => assistant_message(&turn.content)?,
            };
            messages.push(message);
        }
        messages.push(user_message(user)?);
        self.send(messages).await
    }
}
