use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
	#[error("dimension mismatch: expected {expected}, got {actual}")]
	DimensionMismatch { expected: usize, actual: usize },
	#[error("empty batch: ingestion requires at least one paragraph")]
	EmptyBatch,
	#[error("batch length mismatch: {texts} texts but {vectors} vectors")]
	BatchLengthMismatch { texts: usize, vectors: usize },
	#[error("invalid k: search requires k > 0")]
	InvalidK,
	#[error("category '{category}' is corrupt: {records} ledger records but {vectors} index vectors")]
	CorruptCategory {
		category: String,
		records: usize,
		vectors: usize,
	},
	#[error("embedding failed: {0}")]
	Embedding(String),
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	#[error("serialization error: {0}")]
	Serialization(String),
	#[error("storage corruption: {0}")]
	Corruption(String),
}
