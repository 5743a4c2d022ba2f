pub mod client;
pub mod completion;
pub mod config;
pub mod embedding;
pub mod search;

pub use client::ClientCell;
pub use completion::MistralCompletion;
pub use config::Config;
pub use embedding::TextEmbedding;
pub use search::{InMemoryFragmentStore, QdrantFragmentStore};
