//! Similarity computation and pooling for embeddings.

use crate::Embedding;
use crate::error::{EmbeddingError, Result};

/// Compute the cosine similarity between two embeddings.
///
/// Returns a value between -1.0 and 1.0, where:
/// - 1.0 means identical direction
/// - 0.0 means orthogonal vectors
/// - -1.0 means opposite vectors
///
/// Fails with [`EmbeddingError::UndefinedSimilarity`] when either vector has
/// zero or non-finite magnitude instead of producing NaN.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    check_dimensions(a, b)?;

    let mut dot = 0.0_f64;
    let mut norm_a = 0.0_f64;
    let mut norm_b = 0.0_f64;

    for (&x, &y) in a.iter().zip(b.iter()) {
        let x = f64::from(x);
        let y = f64::from(y);
        dot = x.mul_add(y, dot);
        norm_a = x.mul_add(x, norm_a);
        norm_b = y.mul_add(y, norm_b);
    }

    if norm_a == 0.0 || norm_b == 0.0 || !norm_a.is_finite() || !norm_b.is_finite() {
        return Err(EmbeddingError::UndefinedSimilarity);
    }

    let similarity = dot / (norm_a.sqrt() * norm_b.sqrt());
    if !similarity.is_finite() {
        return Err(EmbeddingError::UndefinedSimilarity);
    }
    Ok(similarity.clamp(-1.0, 1.0) as f32)
}

/// Element-wise mean of a non-empty set of equal-length vectors.
///
/// `v[i] = (1/N) * sum_k input_k[i]`. The result does not depend on the order
/// in which the vectors are supplied beyond floating-point rounding. Sums are
/// kept in `f64` so finite inputs near `f32::MAX` pool to a finite mean.
pub fn mean_pool<'a, I>(vectors: I) -> Result<Embedding>
where
    I: IntoIterator<Item = &'a [f32]>,
{
    let mut vectors = vectors.into_iter();
    let first = vectors.next().ok_or(EmbeddingError::EmptyPool)?;
    let dim = first.len();

    let mut sums: Vec<f64> = first.iter().copied().map(f64::from).collect();
    let mut count = 1usize;

    for vector in vectors {
        if vector.len() != dim {
            return Err(EmbeddingError::DimensionMismatch {
                expected: dim,
                actual: vector.len(),
            });
        }
        for (acc, &value) in sums.iter_mut().zip(vector) {
            *acc += f64::from(value);
        }
        count += 1;
    }

    let n = count as f64;
    Ok(sums.into_iter().map(|sum| (sum / n) as f32).collect())
}

fn check_dimensions(a: &[f32], b: &[f32]) -> Result<()> {
    if a.len() != b.len() {
        return Err(EmbeddingError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }
    if a.is_empty() {
        return Err(EmbeddingError::DimensionMismatch {
            expected: 1,
            actual: 0,
        });
    }
    Ok(())
}
