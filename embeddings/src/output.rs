//! Raw output shapes produced by embedding runtimes.
//!
//! Different runtimes hand back the same semantic data in different layouts:
//! either nested arrays (`[batch][token][dim]` or `[batch][dim]`) or a flat
//! row-major buffer accompanied by its shape. [`RawModelOutput`] enumerates
//! exactly those layouts; anything else is rejected at the boundary.

use serde::{Deserialize, Serialize};

use crate::error::{EmbeddingError, Result};

/// Output of one model invocation, before pooling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawModelOutput {
    /// Nested arrays indexed by batch item first.
    Nested(Vec<BatchItem>),

    /// Flat row-major buffer plus its shape descriptor.
    Tensor { data: Vec<f32>, dims: Vec<usize> },
}

/// First-level element of a nested output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BatchItem {
    /// One vector per token, to be mean pooled.
    Tokens(Vec<Vec<f32>>),

    /// An already pooled sentence vector.
    Pooled(Vec<f32>),
}

impl RawModelOutput {
    /// Nested output holding a single batch item of per-token vectors.
    pub fn tokens(tokens: Vec<Vec<f32>>) -> Self {
        Self::Nested(vec![BatchItem::Tokens(tokens)])
    }

    /// Nested output holding a single pre-pooled vector.
    pub fn pooled(vector: Vec<f32>) -> Self {
        Self::Nested(vec![BatchItem::Pooled(vector)])
    }

    /// Flat buffer output.
    pub fn tensor(data: Vec<f32>, dims: Vec<usize>) -> Self {
        Self::Tensor { data, dims }
    }

    /// Parse a runtime response body.
    ///
    /// Bodies that are neither an array nor an object carrying `data` and
    /// `dims` fail with [`EmbeddingError::UnsupportedOutputFormat`].
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        let kind = json_kind(&value);
        serde_json::from_value(value).map_err(|err| {
            EmbeddingError::UnsupportedOutputFormat(format!("{kind} body: {err}"))
        })
    }

    /// Parse a raw response body.
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_slice(body)
            .map_err(|err| EmbeddingError::InvalidResponse(format!("body is not JSON: {err}")))?;
        Self::from_json(value)
    }

    /// Short label for logs.
    pub fn shape_label(&self) -> String {
        match self {
            Self::Nested(batch) => match batch.first() {
                Some(BatchItem::Tokens(tokens)) => format!("nested[{}][{}]", batch.len(), tokens.len()),
                Some(BatchItem::Pooled(_)) => format!("nested[{}]", batch.len()),
                None => "nested[0]".to_string(),
            },
            Self::Tensor { dims, .. } => format!("tensor{dims:?}"),
        }
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_parse_token_matrix() {
        let raw = RawModelOutput::from_json(json!([[[1.0, 0.0], [0.0, 1.0]]])).unwrap();
        assert_eq!(raw, RawModelOutput::tokens(vec![vec![1.0, 0.0], vec![0.0, 1.0]]));
    }

    #[test]
    fn test_parse_pooled_vector() {
        let raw = RawModelOutput::from_json(json!([[0.25, 0.5, 0.75]])).unwrap();
        assert_eq!(raw, RawModelOutput::pooled(vec![0.25, 0.5, 0.75]));
    }

    #[test]
    fn test_parse_tensor_with_integer_values() {
        let raw = RawModelOutput::from_json(json!({
            "data": [1, 1, 1, 3, 3, 3],
            "dims": [2, 3],
            "type": "float32"
        }))
        .unwrap();
        assert_eq!(raw, RawModelOutput::tensor(vec![1.0, 1.0, 1.0, 3.0, 3.0, 3.0], vec![2, 3]));
    }

    #[test]
    fn test_unrecognized_bodies_are_rejected() {
        for body in [
            json!({"embedding": [1.0, 2.0]}),
            json!({"data": [1.0, 2.0]}),
            json!("hello"),
            json!(null),
            json!([["a", "b"]]),
        ] {
            let err = RawModelOutput::from_json(body).unwrap_err();
            assert!(matches!(err, EmbeddingError::UnsupportedOutputFormat(_)));
        }
    }

    #[test]
    fn test_non_json_body_is_invalid_response() {
        let err = RawModelOutput::from_slice(b"<html>oops</html>").unwrap_err();
        assert!(matches!(err, EmbeddingError::InvalidResponse(_)));
    }

    #[test]
    fn test_shape_label() {
        assert_eq!(RawModelOutput::tensor(vec![0.0; 8], vec![1, 2, 4]).shape_label(), "tensor[1, 2, 4]");
        assert_eq!(RawModelOutput::tokens(vec![vec![0.0], vec![1.0]]).shape_label(), "nested[1][2]");
    }
}
