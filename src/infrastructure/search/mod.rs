mod in_memory;
mod qdrant;

pub use in_memory::InMemoryFragmentStore;
pub use qdrant::QdrantFragmentStore;
