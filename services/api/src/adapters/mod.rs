pub mod db;
pub mod embeddings;
pub mod index_store;
pub mod llm;

pub use db::DbAdapter;
pub use embeddings::OpenAiEmbeddingAdapter;
pub use index_store::FsIndexStore;
pub use llm::OpenAiChatAdapter;
