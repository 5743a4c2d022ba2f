mod completion;
mod embedding;
mod search;

pub use completion::{CompletionOptions, CompletionService, DeltaStream};
pub use embedding::EmbeddingService;
pub use search::{FragmentIndex, FragmentSearch, ScopeIndex};
