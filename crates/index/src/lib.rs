//! Knowledge base retrieval
//!
//! Loads a text corpus, splits it into overlapping chunks, embeds them into an
//! in-memory index on first use and answers top-k similarity queries. When the
//! index cannot be built or queried, falls back to a lexical term count.

mod chunker;
mod corpus;
mod retriever;
mod vector;

pub use chunker::{ChunkerConfig, TextChunker};
pub use corpus::{CorpusDocument, load_corpus};
pub use retriever::{ChunkMetadata, IndexedRetriever, KnowledgeRetriever, RetrievalError, RetrievedChunk, lexical_search};
pub use vector::VectorIndex;
