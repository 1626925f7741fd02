// ---------------------------------------------------------------------------
// ParagraphStore — per-tenant category orchestrator
// ---------------------------------------------------------------------------
//
// Composes the metadata ledger and the category index so callers never see
// them out of step: both artifacts are loaded together, checked for size
// agreement, and written back within one logical operation. Write paths
// (ingest, delete) hold an exclusive per-(user, category) lock; read paths
// stay lock-free.
// ---------------------------------------------------------------------------

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::codec::VectorBatch;
use crate::embedding::Embedder;
use crate::error::StoreError;
use crate::index::CategoryIndex;
use crate::ledger::{self, ParagraphRecord};
use crate::namespace::Namespace;
use crate::persistence;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for a `ParagraphStore`.
pub struct StoreConfig {
	/// Root directory; each user gets a subdirectory under it.
	pub root: PathBuf,
	/// Fixed seed for quiz sampling. `None` seeds from entropy.
	pub sample_seed: Option<u64>,
}

impl StoreConfig {
	pub fn new(root: impl Into<PathBuf>) -> Self {
		Self {
			root: root.into(),
			sample_seed: None,
		}
	}
}

// ---------------------------------------------------------------------------
// Operation results
// ---------------------------------------------------------------------------

/// Whether an ingestion batch is applied from scratch or on top of the
/// category's existing content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestMode {
	Append,
	Replace,
}

/// Result of an ingest call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
	/// This many paragraphs were newly ingested.
	Added(usize),
	/// Append mode found every input text already stored; nothing written.
	Unchanged,
}

/// Result of a delete call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
	/// The record was removed and the index rebuilt over the survivors.
	Removed { remaining: usize },
	/// The last record was removed; the category's artifacts are gone.
	CategoryRemoved,
	/// No record with that id (or no such category).
	NotFound,
}

/// One search result: stored content plus `1 - squared_l2` similarity.
/// The transform is preserved from the original system verbatim; it is not
/// bounded to [0, 1] and can be negative for distant vectors.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
	pub content: String,
	pub similarity: f32,
}

/// `{id, content}` projection of a ledger record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParagraphSummary {
	pub id: String,
	pub content: String,
}

// ---------------------------------------------------------------------------
// ParagraphStore
// ---------------------------------------------------------------------------

/// Per-tenant semantic paragraph store.
pub struct ParagraphStore {
	config: StoreConfig,
	embedder: Box<dyn Embedder + Send + Sync>,
	locks: Mutex<HashMap<(String, String), Arc<Mutex<()>>>>,
}

impl ParagraphStore {
	/// The embedder is injected here and used only on the deletion path,
	/// where surviving paragraphs must be re-embedded for the rebuild.
	pub fn new(config: StoreConfig, embedder: Box<dyn Embedder + Send + Sync>) -> Self {
		Self {
			config,
			embedder,
			locks: Mutex::new(HashMap::new()),
		}
	}

	// -- Namespace -----------------------------------------------------------

	/// Idempotent: create the user's storage root if absent.
	pub fn ensure_user(&self, user_id: &str) -> Result<(), StoreError> {
		self.namespace(user_id).ensure_exists()
	}

	/// Category names with a READY state for this user, sorted.
	pub fn list_categories(&self, user_id: &str) -> Result<Vec<String>, StoreError> {
		self.namespace(user_id).categories()
	}

	fn namespace(&self, user_id: &str) -> Namespace {
		Namespace::new(&self.config.root, user_id)
	}

	fn category_lock(&self, user_id: &str, category: &str) -> Arc<Mutex<()>> {
		let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
		locks
			.entry((user_id.to_string(), category.to_string()))
			.or_default()
			.clone()
	}

	// -- Category loading ----------------------------------------------------

	/// Load a category's index and ledger together. `None` means ABSENT.
	/// Any size divergence between the two artifacts is `CorruptCategory`.
	fn load_category(
		&self,
		ns: &Namespace,
		category: &str,
	) -> Result<Option<(CategoryIndex, Vec<ParagraphRecord>)>, StoreError> {
		let index = persistence::load_index(&ns.index_path(category))?;
		let records = persistence::load_ledger(&ns.ledger_path(category))?;

		match index {
			Some(index) => {
				if index.len() != records.len() {
					return Err(StoreError::CorruptCategory {
						category: category.to_string(),
						records: records.len(),
						vectors: index.len(),
					});
				}
				debug!(
					category,
					records = records.len(),
					dimension = index.dimension(),
					"loaded category"
				);
				Ok(Some((index, records)))
			}
			// An empty leftover ledger without an index is treated as
			// ABSENT; earlier systems left one behind on last-delete.
			None if records.is_empty() => Ok(None),
			None => Err(StoreError::CorruptCategory {
				category: category.to_string(),
				records: records.len(),
				vectors: 0,
			}),
		}
	}

	fn persist_category(
		&self,
		ns: &Namespace,
		category: &str,
		index: &CategoryIndex,
		records: &[ParagraphRecord],
	) -> Result<(), StoreError> {
		// Index first, ledger second; same ordering every time so a crash
		// between the two is detectable as a size divergence on load.
		persistence::save_index(&ns.index_path(category), index)?;
		persistence::save_ledger(&ns.ledger_path(category), records)?;
		Ok(())
	}

	// -- Ingest --------------------------------------------------------------

	/// Ingest a batch of paragraphs with their precomputed embeddings.
	///
	/// `Replace` overwrites the category; `Append` extends it (and behaves
	/// like `Replace` when the category is absent). Append mode returns
	/// `Unchanged` without writing when every trimmed input text is already
	/// stored — a best-effort content-equality probe, not per-paragraph
	/// identity, so a batch with any novel text is ingested in full.
	pub fn ingest(
		&self,
		user_id: &str,
		category: &str,
		texts: &[String],
		embeddings: Vec<Vec<f32>>,
		lang_prefix: &str,
		mode: IngestMode,
	) -> Result<IngestOutcome, StoreError> {
		if texts.len() != embeddings.len() {
			return Err(StoreError::BatchLengthMismatch {
				texts: texts.len(),
				vectors: embeddings.len(),
			});
		}
		let batch = VectorBatch::new(embeddings)?;

		let ns = self.namespace(user_id);
		ns.ensure_exists()?;

		let lock = self.category_lock(user_id, category);
		let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());

		let existing = if mode == IngestMode::Append {
			self.load_category(&ns, category)?
		} else {
			None
		};

		let (index, records) = match existing {
			Some((mut index, mut records)) => {
				if ledger::all_texts_present(&records, texts) {
					info!(user_id, category, "append skipped: all texts already stored");
					return Ok(IngestOutcome::Unchanged);
				}
				index.add(batch)?;
				records.extend(ledger::records_for_batch(
					texts,
					category,
					records.len(),
					lang_prefix,
				));
				(index, records)
			}
			None => (
				CategoryIndex::from_batch(batch),
				ledger::records_for_batch(texts, category, 0, lang_prefix),
			),
		};

		self.persist_category(&ns, category, &index, &records)?;
		info!(
			user_id,
			category,
			added = texts.len(),
			total = records.len(),
			"ingested paragraphs"
		);
		Ok(IngestOutcome::Added(texts.len()))
	}

	// -- Search --------------------------------------------------------------

	/// k-NN search over a category. Returns up to `k` hits ordered by
	/// descending similarity (ascending distance); an absent category
	/// yields an empty result, not an error.
	pub fn search(
		&self,
		user_id: &str,
		category: &str,
		query: &[f32],
		k: usize,
	) -> Result<Vec<SearchHit>, StoreError> {
		if k == 0 {
			return Err(StoreError::InvalidK);
		}

		let ns = self.namespace(user_id);
		let (index, records) = match self.load_category(&ns, category)? {
			Some(loaded) => loaded,
			None => return Ok(Vec::new()),
		};

		let hits = index.search(query, k)?;
		Ok(hits
			.into_iter()
			.map(|(pos, distance)| SearchHit {
				content: records[pos].content.clone(),
				similarity: 1.0 - distance,
			})
			.collect())
	}

	// -- Sampling ------------------------------------------------------------

	/// Uniformly sample `min(n, size)` paragraph contents without
	/// replacement. `None` when the category is absent.
	pub fn sample_for_quiz(
		&self,
		user_id: &str,
		category: &str,
		n: usize,
	) -> Result<Option<Vec<String>>, StoreError> {
		let ns = self.namespace(user_id);
		let (_, records) = match self.load_category(&ns, category)? {
			Some(loaded) => loaded,
			None => return Ok(None),
		};

		let mut rng = match self.config.sample_seed {
			Some(seed) => StdRng::seed_from_u64(seed),
			None => StdRng::from_entropy(),
		};
		let sample_size = n.min(records.len());
		let sampled = records
			.choose_multiple(&mut rng, sample_size)
			.map(|r| r.content.clone())
			.collect();
		Ok(Some(sampled))
	}

	// -- Listing -------------------------------------------------------------

	/// Full `{id, content}` projection of the ledger in stored order.
	pub fn list_paragraphs(
		&self,
		user_id: &str,
		category: &str,
	) -> Result<Vec<ParagraphSummary>, StoreError> {
		let ns = self.namespace(user_id);
		let (_, records) = match self.load_category(&ns, category)? {
			Some(loaded) => loaded,
			None => return Ok(Vec::new()),
		};
		Ok(records
			.into_iter()
			.map(|r| ParagraphSummary {
				id: r.id,
				content: r.content,
			})
			.collect())
	}

	/// Record ids in stored order.
	pub fn paragraph_ids(
		&self,
		user_id: &str,
		category: &str,
	) -> Result<Vec<String>, StoreError> {
		let ns = self.namespace(user_id);
		let (_, records) = match self.load_category(&ns, category)? {
			Some(loaded) => loaded,
			None => return Ok(Vec::new()),
		};
		Ok(records.into_iter().map(|r| r.id).collect())
	}

	// -- Deletion ------------------------------------------------------------

	/// Remove one paragraph by id. Survivors are re-embedded through the
	/// injected embedder and the index rebuilt from scratch — the dominant
	/// cost of this path is O(n) embedding-model calls. Removing the last
	/// record deletes both artifacts, returning the category to ABSENT.
	pub fn delete_paragraph(
		&self,
		user_id: &str,
		category: &str,
		paragraph_id: &str,
	) -> Result<DeleteOutcome, StoreError> {
		let ns = self.namespace(user_id);

		let lock = self.category_lock(user_id, category);
		let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());

		let (mut index, mut records) = match self.load_category(&ns, category)? {
			Some(loaded) => loaded,
			None => {
				warn!(user_id, category, "no index or metadata found for category");
				return Ok(DeleteOutcome::NotFound);
			}
		};

		if ledger::remove_by_id(&mut records, paragraph_id).is_none() {
			warn!(user_id, category, paragraph_id, "paragraph id not found");
			return Ok(DeleteOutcome::NotFound);
		}

		if records.is_empty() {
			std::fs::remove_file(ns.index_path(category))?;
			std::fs::remove_file(ns.ledger_path(category))?;
			info!(user_id, category, "last paragraph deleted, category removed");
			return Ok(DeleteOutcome::CategoryRemoved);
		}

		let contents: Vec<String> = records.iter().map(|r| r.content.clone()).collect();
		let embeddings = self.embedder.embed(&contents)?;
		if embeddings.len() != contents.len() {
			return Err(StoreError::Embedding(format!(
				"embedder returned {} vectors for {} texts",
				embeddings.len(),
				contents.len()
			)));
		}
		index.rebuild_from(VectorBatch::new(embeddings)?);

		self.persist_category(&ns, category, &index, &records)?;
		info!(
			user_id,
			category,
			paragraph_id,
			remaining = records.len(),
			"paragraph deleted, index rebuilt"
		);
		Ok(DeleteOutcome::Removed {
			remaining: records.len(),
		})
	}
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
