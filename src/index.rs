// ---------------------------------------------------------------------------
// Category index — exhaustive k-NN over squared L2 distance
// ---------------------------------------------------------------------------
//
// One flat index per (user, category). Supports append and full rebuild
// only; point deletion is handled one level up by rebuilding from the
// surviving vectors. Correctness-first exact scan: O(n * d) per query.
// ---------------------------------------------------------------------------

use crate::codec::VectorBatch;
use crate::error::StoreError;

/// Squared Euclidean distance. Accumulates in f64, returns the index's
/// native f32. Callers guarantee equal lengths.
pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
	let mut sum: f64 = 0.0;
	for i in 0..a.len() {
		let diff = a[i] as f64 - b[i] as f64;
		sum += diff * diff;
	}
	sum as f32
}

/// An ordered sequence of vectors with a fixed dimension, position-aligned
/// with the category's metadata ledger.
#[derive(Debug, Clone)]
pub struct CategoryIndex {
	dimension: usize,
	vectors: Vec<Vec<f32>>,
}

impl CategoryIndex {
	/// Empty index at a fixed dimension.
	pub fn new(dimension: usize) -> Self {
		Self {
			dimension,
			vectors: Vec::new(),
		}
	}

	/// Index seeded from a first batch; the batch fixes the dimension.
	pub fn from_batch(batch: VectorBatch) -> Self {
		Self {
			dimension: batch.dimension(),
			vectors: batch.into_vectors(),
		}
	}

	/// Reconstruct from already-validated rows (persistence path).
	pub(crate) fn from_parts(dimension: usize, vectors: Vec<Vec<f32>>) -> Self {
		Self { dimension, vectors }
	}

	pub fn dimension(&self) -> usize {
		self.dimension
	}

	pub fn len(&self) -> usize {
		self.vectors.len()
	}

	pub fn is_empty(&self) -> bool {
		self.vectors.is_empty()
	}

	pub fn vectors(&self) -> &[Vec<f32>] {
		&self.vectors
	}

	/// Append rows. Row i of the batch lands at position `len() + i`,
	/// matching the ledger records appended in the same logical operation.
	pub fn add(&mut self, batch: VectorBatch) -> Result<(), StoreError> {
		if batch.dimension() != self.dimension {
			return Err(StoreError::DimensionMismatch {
				expected: self.dimension,
				actual: batch.dimension(),
			});
		}
		self.vectors.extend(batch.into_vectors());
		Ok(())
	}

	/// Discard all rows and replace with the given set. Used after a
	/// deletion so positions realign with the shortened ledger.
	pub fn rebuild_from(&mut self, batch: VectorBatch) {
		self.dimension = batch.dimension();
		self.vectors = batch.into_vectors();
	}

	/// Exhaustive k-NN: returns `(position, squared_l2)` pairs sorted by
	/// ascending distance, at most `min(k, len)` of them. The sort is
	/// stable, so exact-distance ties keep insertion order.
	pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(usize, f32)>, StoreError> {
		if query.len() != self.dimension {
			return Err(StoreError::DimensionMismatch {
				expected: self.dimension,
				actual: query.len(),
			});
		}

		let mut hits: Vec<(usize, f32)> = self
			.vectors
			.iter()
			.enumerate()
			.map(|(pos, v)| (pos, squared_l2(query, v)))
			.collect();

		hits.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
		hits.truncate(k);
		Ok(hits)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn batch(rows: &[&[f32]]) -> VectorBatch {
		VectorBatch::new(rows.iter().map(|r| r.to_vec()).collect()).unwrap()
	}

	#[test]
	fn squared_l2_basic() {
		assert_eq!(squared_l2(&[0.0, 0.0], &[3.0, 4.0]), 25.0);
		assert_eq!(squared_l2(&[1.0, 1.0], &[1.0, 1.0]), 0.0);
	}

	#[test]
	fn search_sorted_ascending() {
		let mut index = CategoryIndex::new(2);
		index
			.add(batch(&[&[5.0, 0.0], &[1.0, 0.0], &[3.0, 0.0]]))
			.unwrap();

		let hits = index.search(&[0.0, 0.0], 10).unwrap();
		assert_eq!(hits.len(), 3);
		assert_eq!(hits[0], (1, 1.0));
		assert_eq!(hits[1], (2, 9.0));
		assert_eq!(hits[2], (0, 25.0));
	}

	#[test]
	fn search_truncates_to_k() {
		let index = CategoryIndex::from_batch(batch(&[&[1.0], &[2.0], &[3.0]]));
		let hits = index.search(&[0.0], 2).unwrap();
		assert_eq!(hits.len(), 2);
	}

	#[test]
	fn search_k_larger_than_index_returns_all() {
		let index = CategoryIndex::from_batch(batch(&[&[1.0], &[2.0]]));
		let hits = index.search(&[0.0], 100).unwrap();
		assert_eq!(hits.len(), 2);
	}

	#[test]
	fn search_ties_keep_insertion_order() {
		// Two vectors equidistant from the query.
		let index = CategoryIndex::from_batch(batch(&[&[1.0, 0.0], &[0.0, 1.0], &[-1.0, 0.0]]));
		let hits = index.search(&[0.0, 0.0], 3).unwrap();
		assert_eq!(hits[0].0, 0);
		assert_eq!(hits[1].0, 1);
		assert_eq!(hits[2].0, 2);
	}

	#[test]
	fn search_wrong_dimension_rejected() {
		let index = CategoryIndex::new(3);
		let result = index.search(&[1.0, 2.0], 1);
		assert!(matches!(
			result,
			Err(StoreError::DimensionMismatch {
				expected: 3,
				actual: 2
			})
		));
	}

	#[test]
	fn add_wrong_dimension_rejected() {
		let mut index = CategoryIndex::new(2);
		let result = index.add(batch(&[&[1.0, 2.0, 3.0]]));
		assert!(matches!(result, Err(StoreError::DimensionMismatch { .. })));
		assert!(index.is_empty());
	}

	#[test]
	fn rebuild_replaces_all_rows() {
		let mut index = CategoryIndex::from_batch(batch(&[&[1.0], &[2.0], &[3.0]]));
		assert_eq!(index.len(), 3);

		index.rebuild_from(batch(&[&[9.0]]));
		assert_eq!(index.len(), 1);
		assert_eq!(index.vectors()[0], vec![9.0]);
	}

	#[test]
	fn search_empty_index_returns_nothing() {
		let index = CategoryIndex::new(4);
		let hits = index.search(&[0.0, 0.0, 0.0, 0.0], 5).unwrap();
		assert!(hits.is_empty());
	}
}
