// ---------------------------------------------------------------------------
// Vector codec — dimension-validated embedding batches
// ---------------------------------------------------------------------------
//
// All vectors entering an index pass through `VectorBatch`, which enforces
// that every vector in a batch has the same length. The index's internal
// representation is f32 throughout; callers hand us f32 and we keep it.
// ---------------------------------------------------------------------------

use crate::error::StoreError;

/// A non-empty batch of embedding vectors sharing one dimension.
#[derive(Debug, Clone)]
pub struct VectorBatch {
	vectors: Vec<Vec<f32>>,
	dimension: usize,
}

impl VectorBatch {
	/// Validate and wrap a batch. Fails with `DimensionMismatch` if any
	/// vector's length differs from the first, or `EmptyBatch` if the batch
	/// contains no vectors.
	pub fn new(vectors: Vec<Vec<f32>>) -> Result<Self, StoreError> {
		let dimension = match vectors.first() {
			Some(v) => v.len(),
			None => return Err(StoreError::EmptyBatch),
		};
		if dimension == 0 {
			return Err(StoreError::DimensionMismatch {
				expected: 1,
				actual: 0,
			});
		}
		for v in &vectors {
			if v.len() != dimension {
				return Err(StoreError::DimensionMismatch {
					expected: dimension,
					actual: v.len(),
				});
			}
		}
		Ok(Self { vectors, dimension })
	}

	/// Validate against a dimension already established by an existing index.
	pub fn with_dimension(vectors: Vec<Vec<f32>>, expected: usize) -> Result<Self, StoreError> {
		let batch = Self::new(vectors)?;
		if batch.dimension != expected {
			return Err(StoreError::DimensionMismatch {
				expected,
				actual: batch.dimension,
			});
		}
		Ok(batch)
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

	pub fn as_slice(&self) -> &[Vec<f32>] {
		&self.vectors
	}

	pub fn into_vectors(self) -> Vec<Vec<f32>> {
		self.vectors
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn uniform_batch_accepted() {
		let batch = VectorBatch::new(vec![vec![1.0, 0.0], vec![0.0, 1.0]]).unwrap();
		assert_eq!(batch.dimension(), 2);
		assert_eq!(batch.len(), 2);
	}

	#[test]
	fn ragged_batch_rejected() {
		let result = VectorBatch::new(vec![vec![1.0, 0.0], vec![0.0]]);
		assert!(matches!(
			result,
			Err(StoreError::DimensionMismatch {
				expected: 2,
				actual: 1
			})
		));
	}

	#[test]
	fn empty_batch_rejected() {
		assert!(matches!(
			VectorBatch::new(Vec::new()),
			Err(StoreError::EmptyBatch)
		));
	}

	#[test]
	fn zero_dimension_rejected() {
		let result = VectorBatch::new(vec![Vec::new()]);
		assert!(matches!(result, Err(StoreError::DimensionMismatch { .. })));
	}

	#[test]
	fn with_dimension_enforces_established_width() {
		let ok = VectorBatch::with_dimension(vec![vec![1.0, 2.0, 3.0]], 3);
		assert!(ok.is_ok());

		let result = VectorBatch::with_dimension(vec![vec![1.0, 2.0]], 3);
		assert!(matches!(
			result,
			Err(StoreError::DimensionMismatch {
				expected: 3,
				actual: 2
			})
		));
	}
}
