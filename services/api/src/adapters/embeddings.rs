//! services/api/src/adapters/embeddings.rs
//!
//! This module contains the adapter for the embedding model.
//! It implements the `EmbeddingService` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig, error::OpenAIError, types::embeddings::CreateEmbeddingRequestArgs, Client,
};
use async_trait::async_trait;
use futures::future::try_join_all;
use study_buddy_core::ports::{CoreError, CoreResult, EmbeddingService};

/// Chunks sent per embedding request. Keeps large documents well under the
/// provider's per-request input limits.
const EMBED_BATCH_SIZE: usize = 64;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `EmbeddingService` using an OpenAI-compatible API.
#[derive(Clone)]
pub struct OpenAiEmbeddingAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiEmbeddingAdapter {
    /// Creates a new `OpenAiEmbeddingAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

//=========================================================================================
// `EmbeddingService` Trait Implementation
//=========================================================================================

#[async_trait]
impl EmbeddingService for OpenAiEmbeddingAdapter {
    async fn embed(&self, text: &str) -> CoreResult<Vec<f32>> {
        let request = CreateEmbeddingRequestArgs::default()
            .model(&self.model)
            .input(text)
            .build()
            .map_err(|e| CoreError::Model(e.to_string()))?;

        let response = self
            .client
            .embeddings()
            .create(request)
            .await
            .map_err(|e: OpenAIError| CoreError::Model(e.to_string()))?;

        response
            .data
            .into_iter()
            .next()
            .map(|e| e.embedding)
            .ok_or_else(|| CoreError::Model("Embedding response contained no data.".to_string()))
    }

    async fn embed_batch(&self, texts: &[String]) -> CoreResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let requests = texts
            .chunks(EMBED_BATCH_SIZE)
            .map(|batch| {
                CreateEmbeddingRequestArgs::default()
                    .model(&self.model)
                    .input(batch.to_vec())
                    .build()
                    .map_err(|e| CoreError::Model(e.to_string()))
            })
            .collect::<CoreResult<Vec<_>>>()?;

        let api = self.client.embeddings();
        let responses = try_join_all(requests.into_iter().map(|request| api.create(request)))
            .await
            .map_err(|e: OpenAIError| CoreError::Model(e.to_string()))?;

        // `try_join_all` preserves batch order; within a batch the provider may
        // reorder entries, so sort by the returned index before flattening.
        let mut vectors = Vec::with_capacity(texts.len());
        for mut response in responses {
            response.data.sort_by_key(|e| e.index);
            vectors.extend(response.data.into_iter().map(|e| e.embedding));
        }

        if vectors.len() != texts.len() {
            return Err(CoreError::Model(format!(
                "Embedding response returned {} vectors for {} inputs.",
                vectors.len(),
                texts.len()
            )));
        }
        Ok(vectors)
    }
}
