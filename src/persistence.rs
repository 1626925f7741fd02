// ---------------------------------------------------------------------------
// On-disk artifacts — ledger JSON + gzipped index envelope
// ---------------------------------------------------------------------------
//
// Each category owns two co-located artifacts under the user's directory:
//
//   <category>.json   plain JSON array of ParagraphRecord, ledger order
//   <category>.index  gzipped JSON envelope:
//                       { "version": 1, "dimension": d, "vectors": [b64...] }
//                     where each vector is base64 of f32 little-endian bytes
//
// The two files are written index-then-ledger inside one logical operation
// with no transactional guard; a crash between the writes leaves a size
// divergence that the store reports as CorruptCategory on the next load.
// ---------------------------------------------------------------------------

use std::io::Read;
use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use flate2::read::{GzDecoder, GzEncoder};
use flate2::Compression;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::StoreError;
use crate::index::CategoryIndex;
use crate::ledger::ParagraphRecord;

const INDEX_FORMAT_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum PersistenceError {
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	#[error("corruption: {0}")]
	Corruption(String),
	#[error("serialization: {0}")]
	Serialization(String),
}

impl From<PersistenceError> for StoreError {
	fn from(e: PersistenceError) -> Self {
		match e {
			PersistenceError::Io(io) => StoreError::Io(io),
			PersistenceError::Corruption(msg) => StoreError::Corruption(msg),
			PersistenceError::Serialization(msg) => StoreError::Serialization(msg),
		}
	}
}

// ---------------------------------------------------------------------------
// Vector encode / decode
// ---------------------------------------------------------------------------

/// Encode an f32 slice as base64 of little-endian bytes.
pub fn encode_vector(vector: &[f32]) -> String {
	let bytes: Vec<u8> = vector.iter().flat_map(|f| f.to_le_bytes()).collect();
	STANDARD.encode(&bytes)
}

/// Decode a base64-encoded f32 LE byte string back to `Vec<f32>`.
pub fn decode_vector(encoded: &str) -> Result<Vec<f32>, PersistenceError> {
	let bytes = STANDARD
		.decode(encoded)
		.map_err(|e| PersistenceError::Corruption(format!("invalid base64: {}", e)))?;
	if bytes.len() % 4 != 0 {
		return Err(PersistenceError::Corruption("invalid vector length".into()));
	}
	let mut result = Vec::with_capacity(bytes.len() / 4);
	for chunk in bytes.chunks_exact(4) {
		result.push(f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]));
	}
	Ok(result)
}

// ---------------------------------------------------------------------------
// Gzip compress / decompress
// ---------------------------------------------------------------------------

/// Gzip-compress a byte slice (level 6).
pub fn compress(data: &[u8]) -> Result<Vec<u8>, PersistenceError> {
	let mut encoder = GzEncoder::new(data, Compression::new(6));
	let mut compressed = Vec::new();
	encoder
		.read_to_end(&mut compressed)
		.map_err(PersistenceError::Io)?;
	Ok(compressed)
}

/// Gunzip-decompress a byte slice.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>, PersistenceError> {
	let mut decoder = GzDecoder::new(data);
	let mut decompressed = Vec::new();
	decoder
		.read_to_end(&mut decompressed)
		.map_err(PersistenceError::Io)?;
	Ok(decompressed)
}

/// Check for gzip magic bytes (0x1f, 0x8b).
pub fn is_gzipped(data: &[u8]) -> bool {
	data.len() >= 2 && data[0] == 0x1f && data[1] == 0x8b
}

// ---------------------------------------------------------------------------
// Index artifact
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
struct IndexFileV1 {
	version: u32,
	dimension: usize,
	vectors: Vec<String>,
}

/// Write the index artifact: gzipped JSON envelope with base64 rows.
pub fn save_index(path: &Path, index: &CategoryIndex) -> Result<(), PersistenceError> {
	let file = IndexFileV1 {
		version: INDEX_FORMAT_VERSION,
		dimension: index.dimension(),
		vectors: index.vectors().iter().map(|v| encode_vector(v)).collect(),
	};

	let json = serde_json::to_string(&file)
		.map_err(|e| PersistenceError::Serialization(format!("failed to serialize index: {}", e)))?;
	let compressed = compress(json.as_bytes())?;
	std::fs::write(path, &compressed).map_err(PersistenceError::Io)?;
	Ok(())
}

/// Read an index artifact. Returns `Ok(None)` when the file does not exist.
pub fn load_index(path: &Path) -> Result<Option<CategoryIndex>, PersistenceError> {
	let raw = match std::fs::read(path) {
		Ok(bytes) => bytes,
		Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
		Err(e) => return Err(PersistenceError::Io(e)),
	};

	let json_bytes = if is_gzipped(&raw) { decompress(&raw)? } else { raw };
	let json_str = std::str::from_utf8(&json_bytes)
		.map_err(|e| PersistenceError::Corruption(format!("invalid UTF-8 in index: {}", e)))?;

	let file: IndexFileV1 = serde_json::from_str(json_str)
		.map_err(|e| PersistenceError::Corruption(format!("invalid index JSON: {}", e)))?;

	if file.version != INDEX_FORMAT_VERSION {
		return Err(PersistenceError::Corruption(format!(
			"unsupported index version: {}",
			file.version
		)));
	}

	let mut vectors = Vec::with_capacity(file.vectors.len());
	for encoded in &file.vectors {
		let vector = decode_vector(encoded)?;
		if vector.len() != file.dimension {
			return Err(PersistenceError::Corruption(format!(
				"index row has {} values, expected {}",
				vector.len(),
				file.dimension
			)));
		}
		vectors.push(vector);
	}

	Ok(Some(CategoryIndex::from_parts(file.dimension, vectors)))
}

// ---------------------------------------------------------------------------
// Ledger artifact
// ---------------------------------------------------------------------------

/// Write the ledger artifact as a plain JSON array in ledger order.
pub fn save_ledger(path: &Path, records: &[ParagraphRecord]) -> Result<(), PersistenceError> {
	let json = serde_json::to_string(records)
		.map_err(|e| PersistenceError::Serialization(format!("failed to serialize ledger: {}", e)))?;
	std::fs::write(path, json.as_bytes()).map_err(PersistenceError::Io)?;
	Ok(())
}

/// Read a ledger artifact. An absent file is an empty ledger, not an error.
pub fn load_ledger(path: &Path) -> Result<Vec<ParagraphRecord>, PersistenceError> {
	let raw = match std::fs::read(path) {
		Ok(bytes) => bytes,
		Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
		Err(e) => return Err(PersistenceError::Io(e)),
	};

	let json_str = std::str::from_utf8(&raw)
		.map_err(|e| PersistenceError::Corruption(format!("invalid UTF-8 in ledger: {}", e)))?;
	serde_json::from_str(json_str)
		.map_err(|e| PersistenceError::Corruption(format!("invalid ledger JSON: {}", e)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
