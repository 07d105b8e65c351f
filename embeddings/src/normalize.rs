//! Reduction of raw model output to one vector per input text.
//!
//! Every recognized layout ends in the same place: a single `D`-length
//! [`Embedding`] plus the number of observations that were pooled to produce
//! it. Multi-row layouts are mean pooled (see [`mean_pool`]).

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::Embedding;
use crate::error::{EmbeddingError, Result};
use crate::output::{BatchItem, RawModelOutput};
use crate::similarity::mean_pool;

/// A pooled embedding and the number of rows that went into it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedOutput {
    /// The pooled embedding.
    pub vector: Embedding,

    /// Tokens (or batch rows) averaged to produce `vector`.
    pub token_count: usize,
}

impl NormalizedOutput {
    /// Dimension of the pooled embedding.
    pub fn dimension(&self) -> usize {
        self.vector.len()
    }
}

/// Normalize a raw model output into a single pooled vector.
pub fn normalize(raw: &RawModelOutput) -> Result<NormalizedOutput> {
    let normalized = match raw {
        RawModelOutput::Nested(batch) => normalize_nested(batch)?,
        RawModelOutput::Tensor { data, dims } => normalize_tensor(data, dims)?,
    };

    if normalized.vector.is_empty() {
        return Err(EmbeddingError::UnsupportedOutputFormat(
            "embedding dimension is zero".to_string(),
        ));
    }
    if let Some(index) = normalized.vector.iter().position(|value| !value.is_finite()) {
        return Err(EmbeddingError::UnsupportedOutputFormat(format!(
            "embedding contains a non-finite value at index {index}"
        )));
    }

    debug!(
        shape = %raw.shape_label(),
        token_count = normalized.token_count,
        dimension = normalized.dimension(),
        "normalized model output"
    );

    Ok(normalized)
}

fn normalize_nested(batch: &[BatchItem]) -> Result<NormalizedOutput> {
    let first = batch.first().ok_or_else(|| {
        EmbeddingError::UnsupportedOutputFormat("nested output has no batch items".to_string())
    })?;

    match first {
        BatchItem::Tokens(tokens) => Ok(NormalizedOutput {
            vector: mean_pool(tokens.iter().map(Vec::as_slice))?,
            token_count: tokens.len(),
        }),
        BatchItem::Pooled(vector) => Ok(NormalizedOutput {
            vector: vector.clone(),
            token_count: 1,
        }),
    }
}

fn normalize_tensor(data: &[f32], dims: &[usize]) -> Result<NormalizedOutput> {
    let expected = dims
        .iter()
        .try_fold(1usize, |acc, &d| acc.checked_mul(d))
        .ok_or_else(|| {
            EmbeddingError::UnsupportedOutputFormat(format!("dims {dims:?} overflow"))
        })?;

    if data.len() != expected {
        return Err(EmbeddingError::UnsupportedOutputFormat(format!(
            "buffer holds {} values but dims {dims:?} describe {expected}",
            data.len()
        )));
    }

    match *dims {
        [batch, seq_len, dim] => {
            if dim == 0 {
                return Err(EmbeddingError::UnsupportedOutputFormat(format!(
                    "dims {dims:?} have zero width"
                )));
            }
            if batch == 0 {
                return Err(EmbeddingError::EmptyPool);
            }
            // Only the first batch item is pooled; it occupies the first
            // seq_len * dim values of the buffer.
            let vector = mean_pool(data.chunks_exact(dim).take(seq_len))?;
            Ok(NormalizedOutput {
                vector,
                token_count: seq_len,
            })
        }
        [batch, dim] => {
            if dim == 0 {
                return Err(EmbeddingError::UnsupportedOutputFormat(format!(
                    "dims {dims:?} have zero width"
                )));
            }
            if batch == 0 {
                return Err(EmbeddingError::EmptyPool);
            }
            let mut sums = vec![0.0f64; dim];
            for b in 0..batch {
                for (j, acc) in sums.iter_mut().enumerate() {
                    *acc += f64::from(data[b * dim + j]);
                }
            }
            let n = batch as f64;
            let vector = sums.into_iter().map(|sum| (sum / n) as f32).collect();
            Ok(NormalizedOutput {
                vector,
                token_count: batch,
            })
        }
        _ => Err(EmbeddingError::UnsupportedOutputFormat(format!(
            "expected 2 or 3 dims, got {}",
            dims.len()
        ))),
    }
}
