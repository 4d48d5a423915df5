//! Karir Docs - reference document folder, chunking, and hybrid retrieval
//! (BM25 keyword ranking fused with embedding similarity)

pub mod bm25;
pub mod chunk;
pub mod error;
pub mod retriever;
pub mod store;
pub mod vector;

pub use bm25::Bm25Index;
pub use error::{DocsError, DocsResult};
pub use retriever::{Hit, Retriever};
pub use store::{DocStore, Document, StoredFile};
pub use vector::VectorIndex;
