//! Result extraction from engine stdout.
//!
//! The engine may print log lines before its single result line, so the
//! scan runs backwards: the last line that starts with `{` or `[` is the
//! candidate, and it alone decides the outcome. Only when no line qualifies
//! is the whole output tried as one document. Pretty-printed output is
//! rejected, since its opening `{` line is the candidate. Pure functions
//! only; nothing here touches a process.

use serde_json::Value;

/// Longest raw-output excerpt attached to an extraction error.
pub const EXCERPT_LIMIT: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractError {
    #[error("engine produced no output")]
    Empty,

    #[error("no parseable JSON document in engine output ({reason})")]
    NoDocument { reason: String, excerpt: String },
}

impl ExtractError {
    /// Bounded excerpt of the raw output.
    pub fn excerpt(&self) -> &str {
        match self {
            Self::Empty => "",
            Self::NoDocument { excerpt, .. } => excerpt,
        }
    }
}

/// Locate and parse the result document in `stdout`.
pub fn extract_message(stdout: &[u8]) -> Result<Value, ExtractError> {
    let text = String::from_utf8_lossy(stdout);
    let body = text.trim();
    if body.is_empty() {
        return Err(ExtractError::Empty);
    }

    let candidate = text
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| line.starts_with('{') || line.starts_with('['));

    if let Some(line) = candidate {
        return serde_json::from_str(line).map_err(|e| ExtractError::NoDocument {
            reason: format!("last JSON-like line: {e}"),
            excerpt: excerpt(body, EXCERPT_LIMIT),
        });
    }

    serde_json::from_str(body).map_err(|e| ExtractError::NoDocument {
        reason: format!("no JSON-like line; whole output: {e}"),
        excerpt: excerpt(body, EXCERPT_LIMIT),
    })
}

/// First `limit` characters of `text`, marked when truncated.
pub fn excerpt(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        None => text.to_string(),
        Some((cut, _)) => format!(
            "{}... [truncated, {} bytes total]",
            &text[..cut],
            text.len()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn with_log_lines(n: usize, last: &str) -> String {
        let mut out = String::new();
        for i in 0..n {
            out.push_str(&format!("[engine] step {i} complete\n"));
        }
        out.push_str(last);
        out.push('\n');
        out
    }

    #[test]
    fn log_lines_before_result_are_ignored() {
        for n in [0, 1, 5] {
            let stdout = with_log_lines(n, r#"{"status":"ok","decisionId":"d-1"}"#);
            let value = extract_message(stdout.as_bytes()).unwrap();
            assert_eq!(value, json!({"status": "ok", "decisionId": "d-1"}), "n={n}");
        }
    }

    #[test]
    fn last_json_line_wins_over_earlier_json_line() {
        let stdout = b"{\"note\":\"starting\"}\n{\"status\":\"ok\",\"decisionId\":\"abc\"}";
        let value = extract_message(stdout).unwrap();
        assert_eq!(value["decisionId"], "abc");
        assert!(value.get("note").is_none());
    }

    #[test]
    fn trailing_blank_lines_and_crlf_are_tolerated() {
        let stdout = b"booting\r\n  {\"status\":\"ok\"}  \r\n\r\n\n";
        assert_eq!(extract_message(stdout).unwrap(), json!({"status": "ok"}));
    }

    #[test]
    fn array_result_line_is_accepted() {
        let stdout = b"log\n[1,2,3]\n";
        assert_eq!(extract_message(stdout).unwrap(), json!([1, 2, 3]));
    }

    #[test]
    fn pretty_printed_document_is_malformed() {
        let stdout = b"{\n  \"status\": \"ok\",\n  \"decisionId\": \"p-7\"\n}\n";
        let err = extract_message(stdout).unwrap_err();
        match err {
            ExtractError::NoDocument { reason, excerpt } => {
                assert!(reason.contains("last JSON-like line"));
                assert!(excerpt.contains("p-7"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn broken_candidate_is_not_rescued_by_whole_body() {
        // The whole output parses, but the candidate line alone does not.
        let err = extract_message(b"{\n\"status\":\"ok\"\n}\n").unwrap_err();
        assert!(matches!(err, ExtractError::NoDocument { .. }));
    }

    #[test]
    fn scalar_document_parses_via_whole_body() {
        assert_eq!(extract_message(b" 42 \n").unwrap(), json!(42));
    }

    #[test]
    fn log_noise_without_json_is_malformed() {
        let err = extract_message(b"starting engine\nfatal: no market\n").unwrap_err();
        match &err {
            ExtractError::NoDocument { reason, excerpt } => {
                assert!(reason.contains("no JSON-like line"));
                assert!(excerpt.contains("fatal: no market"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn broken_candidate_with_noise_is_malformed() {
        let err = extract_message(b"log line\n{\"status\": \"ok\"\n").unwrap_err();
        match err {
            ExtractError::NoDocument { reason, .. } => {
                assert!(reason.contains("last JSON-like line"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_output_is_malformed() {
        assert_eq!(extract_message(b"").unwrap_err(), ExtractError::Empty);
        assert_eq!(extract_message(b" \n\t\n").unwrap_err(), ExtractError::Empty);
    }

    #[test]
    fn invalid_utf8_in_log_lines_is_tolerated() {
        let mut stdout = vec![0xff, 0xfe, b'\n'];
        stdout.extend_from_slice(br#"{"status":"ok"}"#);
        assert_eq!(extract_message(&stdout).unwrap(), json!({"status": "ok"}));
    }

    #[test]
    fn excerpt_is_bounded_on_char_boundary() {
        let text = "é".repeat(EXCERPT_LIMIT + 10);
        let cut = excerpt(&text, EXCERPT_LIMIT);
        assert!(cut.starts_with(&"é".repeat(EXCERPT_LIMIT)));
        assert!(cut.contains("truncated"));
        assert_eq!(excerpt("short", EXCERPT_LIMIT), "short");
    }

    #[test]
    fn malformed_excerpt_is_bounded() {
        let noise = "n".repeat(EXCERPT_LIMIT * 4);
        let err = extract_message(noise.as_bytes()).unwrap_err();
        assert!(err.excerpt().len() < EXCERPT_LIMIT + 64);
    }
}
