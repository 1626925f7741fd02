// ---------------------------------------------------------------------------
// parastore — per-tenant semantic paragraph store
// ---------------------------------------------------------------------------
//
// Maps free-text paragraphs, grouped into user-defined categories, to dense
// f32 embeddings and supports similarity search, random sampling,
// incremental append, full replace, and point deletion with index rebuild.
// Each (user, category) pair owns two co-located artifacts: a JSON metadata
// ledger and a gzipped vector index, kept in lockstep by the store.
// ---------------------------------------------------------------------------

pub mod codec;
pub mod embedding;
pub mod error;
pub mod index;
pub mod ledger;
pub mod namespace;
pub mod persistence;
pub mod store;

pub use codec::VectorBatch;
pub use embedding::Embedder;
pub use error::StoreError;
pub use index::CategoryIndex;
pub use ledger::ParagraphRecord;
pub use store::{
	DeleteOutcome, IngestMode, IngestOutcome, ParagraphStore, ParagraphSummary, SearchHit,
	StoreConfig,
};
