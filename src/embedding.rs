// ---------------------------------------------------------------------------
// Embedder — seam for the external embedding model
// ---------------------------------------------------------------------------

use crate::error::StoreError;

/// External collaborator that turns text into fixed-dimension f32 vectors.
///
/// Implementations must return one vector per input text, in input order,
/// all sharing one dimension within a call. The store only invokes this on
/// the deletion path, where surviving paragraphs are re-embedded before the
/// index rebuild; ingest and search take caller-supplied vectors.
pub trait Embedder {
	fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, StoreError>;

	fn embed_one(&self, text: &str) -> Result<Vec<f32>, StoreError> {
		let texts = [text.to_string()];
		let mut vectors = self.embed(&texts)?;
		vectors
			.pop()
			.ok_or_else(|| StoreError::Embedding("embedder returned no vector".into()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	struct ConstantEmbedder;

	impl Embedder for ConstantEmbedder {
		fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, StoreError> {
			Ok(texts.iter().map(|_| vec![1.0, 2.0]).collect())
		}
	}

	struct SilentEmbedder;

	impl Embedder for SilentEmbedder {
		fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, StoreError> {
			Ok(Vec::new())
		}
	}

	#[test]
	fn embed_one_delegates_to_embed() {
		let vector = ConstantEmbedder.embed_one("query").unwrap();
		assert_eq!(vector, vec![1.0, 2.0]);
	}

	#[test]
	fn embed_one_with_no_vector_is_an_error() {
		let result = SilentEmbedder.embed_one("query");
		assert!(matches!(result, Err(StoreError::Embedding(_))));
	}
}
