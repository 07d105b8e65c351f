//! Human-readable rendering of comparison outcomes.

use textsim_compare::{ComparisonOutcome, DisplayConfig, NormalizedOutput};

/// Render an outcome as a short multi-line report.
pub(crate) fn summary(outcome: &ComparisonOutcome, display: &DisplayConfig) -> String {
    let mut out = String::new();
    push_side(&mut out, "user", &outcome.user, display);
    push_side(&mut out, "expected", &outcome.expected, display);
    out.push_str(&format!(
        "similarity: {:.prec$}\n",
        outcome.similarity,
        prec = display.precision
    ));
    out
}

fn push_side(out: &mut String, label: &str, side: &NormalizedOutput, display: &DisplayConfig) {
    out.push_str(&format!(
        "{label}: {} tokens, {} dims {}\n",
        side.token_count,
        side.dimension(),
        preview(&side.vector, display)
    ));
}

fn preview(vector: &[f32], display: &DisplayConfig) -> String {
    let shown: Vec<String> = vector
        .iter()
        .take(display.preview_len)
        .map(|value| format!("{value:.prec$}", prec = display.precision))
        .collect();
    if vector.len() > display.preview_len {
        format!("[{}, ...]", shown.join(", "))
    } else {
        format!("[{}]", shown.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    #[test]
    fn test_summary() {
        let outcome = ComparisonOutcome {
            request_id: Uuid::nil(),
            user: NormalizedOutput {
                vector: vec![0.5, -0.25, 1.0],
                token_count: 7,
            },
            expected: NormalizedOutput {
                vector: vec![0.5, 0.125, 1.0],
                token_count: 1,
            },
            similarity: 0.93456,
            completed_at: Utc::now(),
        };
        let display = DisplayConfig {
            preview_len: 2,
            precision: 3,
        };

        assert_eq!(
            summary(&outcome, &display),
            "user: 7 tokens, 3 dims [0.500, -0.250, ...]\n\
             expected: 1 tokens, 3 dims [0.500, 0.125, ...]\n\
             similarity: 0.935\n"
        );
    }

    #[test]
    fn test_preview_fits() {
        let display = DisplayConfig::default();
        assert_eq!(preview(&[1.0, 2.0], &display), "[1.0000, 2.0000]");
    }
}
