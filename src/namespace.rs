// ---------------------------------------------------------------------------
// User namespace — per-user directory isolation
// ---------------------------------------------------------------------------
//
// A namespace maps an opaque caller-supplied user id to its own directory
// under the store root; every category artifact for that user lives there.
// Category names are used verbatim as file stems: case-sensitive, no
// escaping guarantees.
// ---------------------------------------------------------------------------

use std::path::{Path, PathBuf};

use crate::error::StoreError;

const INDEX_EXT: &str = "index";
const LEDGER_EXT: &str = "json";

/// Path resolver for one user's slice of the store.
#[derive(Debug, Clone)]
pub struct Namespace {
	dir: PathBuf,
}

impl Namespace {
	pub fn new(root: &Path, user_id: &str) -> Self {
		Self {
			dir: root.join(user_id),
		}
	}

	/// Idempotent: create the user's directory if absent.
	pub fn ensure_exists(&self) -> Result<(), StoreError> {
		std::fs::create_dir_all(&self.dir)?;
		Ok(())
	}

	pub fn dir(&self) -> &Path {
		&self.dir
	}

	pub fn index_path(&self, category: &str) -> PathBuf {
		self.dir.join(format!("{}.{}", category, INDEX_EXT))
	}

	pub fn ledger_path(&self, category: &str) -> PathBuf {
		self.dir.join(format!("{}.{}", category, LEDGER_EXT))
	}

	/// Category names with a READY index, derived from storage enumeration.
	/// An absent user directory yields an empty list. Sorted for stable
	/// output.
	pub fn categories(&self) -> Result<Vec<String>, StoreError> {
		let entries = match std::fs::read_dir(&self.dir) {
			Ok(entries) => entries,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
			Err(e) => return Err(StoreError::Io(e)),
		};

		let mut categories = Vec::new();
		for entry in entries {
			let path = entry?.path();
			if path.extension().and_then(|e| e.to_str()) == Some(INDEX_EXT) {
				if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
					categories.push(stem.to_string());
				}
			}
		}
		categories.sort();
		Ok(categories)
	}
}
