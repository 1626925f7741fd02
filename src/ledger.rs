// ---------------------------------------------------------------------------
// Metadata ledger — ordered paragraph records per (user, category)
// ---------------------------------------------------------------------------
//
// The ledger is the side table of a category index: record position i
// corresponds to index row i. It is persisted as a plain JSON array (see
// persistence.rs); the serde field names below keep the on-disk artifact
// compatible with existing metadata files.
// ---------------------------------------------------------------------------

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One stored paragraph. Immutable after creation except for wholesale
/// removal; identity is `id`, `ordinal` records the insertion position at
/// ingestion time and is not kept contiguous across deletions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParagraphRecord {
	pub id: String,
	pub content: String,
	#[serde(rename = "page")]
	pub category: String,
	#[serde(rename = "index")]
	pub ordinal: usize,
	pub lang_prefix: String,
}

impl ParagraphRecord {
	/// Create a record with a fresh UUID. Content is trimmed here so that
	/// stored content and dedup probes agree on whitespace.
	pub fn new(content: &str, category: &str, ordinal: usize, lang_prefix: &str) -> Self {
		Self {
			id: Uuid::new_v4().to_string(),
			content: content.trim().to_string(),
			category: category.to_string(),
			ordinal,
			lang_prefix: lang_prefix.to_string(),
		}
	}
}

/// Build records for an ingestion batch, assigning ordinals starting at
/// `first_ordinal` (0 for replace mode, the existing ledger length for
/// append mode).
pub fn records_for_batch(
	texts: &[String],
	category: &str,
	first_ordinal: usize,
	lang_prefix: &str,
) -> Vec<ParagraphRecord> {
	texts
		.iter()
		.enumerate()
		.map(|(i, text)| ParagraphRecord::new(text, category, first_ordinal + i, lang_prefix))
		.collect()
}

/// Remove the record with the given id, preserving the order of the rest.
/// Returns the position it held, or `None` if the id is absent.
pub fn remove_by_id(records: &mut Vec<ParagraphRecord>, id: &str) -> Option<usize> {
	let pos = records.iter().position(|r| r.id == id)?;
	records.remove(pos);
	Some(pos)
}

/// True when every trimmed input text is already present as stored content.
/// This is the append-mode "nothing new" probe: content equality only, so a
/// batch with at least one novel text is ingested in full.
pub fn all_texts_present(records: &[ParagraphRecord], texts: &[String]) -> bool {
	if records.is_empty() || texts.is_empty() {
		return false;
	}
	let stored: HashSet<&str> = records.iter().map(|r| r.content.as_str()).collect();
	texts.iter().all(|t| stored.contains(t.trim()))
}

#[cfg(test)]
mod tests {
	use super::*;

	fn sample_records() -> Vec<ParagraphRecord> {
		records_for_batch(
			&["alpha".to_string(), "beta".to_string(), "gamma".to_string()],
			"topic",
			0,
			"en",
		)
	}

	#[test]
	fn records_trim_content_and_number_ordinals() {
		let records = records_for_batch(
			&["  padded  ".to_string(), "plain".to_string()],
			"topic",
			5,
			"en",
		);
		assert_eq!(records[0].content, "padded");
		assert_eq!(records[0].ordinal, 5);
		assert_eq!(records[1].ordinal, 6);
		assert_eq!(records[0].category, "topic");
		assert_ne!(records[0].id, records[1].id);
	}

	#[test]
	fn remove_by_id_keeps_order() {
		let mut records = sample_records();
		let target = records[1].id.clone();

		assert_eq!(remove_by_id(&mut records, &target), Some(1));
		assert_eq!(records.len(), 2);
		assert_eq!(records[0].content, "alpha");
		assert_eq!(records[1].content, "gamma");
	}

	#[test]
	fn remove_by_id_missing_is_none() {
		let mut records = sample_records();
		assert_eq!(remove_by_id(&mut records, "no-such-id"), None);
		assert_eq!(records.len(), 3);
	}

	#[test]
	fn all_texts_present_matches_trimmed_content() {
		let records = sample_records();
		assert!(all_texts_present(
			&records,
			&["  alpha ".to_string(), "beta".to_string()]
		));
		assert!(!all_texts_present(
			&records,
			&["alpha".to_string(), "delta".to_string()]
		));
		assert!(!all_texts_present(&[], &["alpha".to_string()]));
	}

	#[test]
	fn record_json_uses_original_field_names() {
		let record = ParagraphRecord::new("text", "topic", 3, "en");
		let json = serde_json::to_value(&record).unwrap();
		assert_eq!(json["page"], "topic");
		assert_eq!(json["index"], 3);
		assert_eq!(json["lang_prefix"], "en");
		assert!(json.get("category").is_none());
	}
}
