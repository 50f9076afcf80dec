use serde::Serialize;

/// Error codes a tool can hand back in place of its normal payload.
///
/// Gateway failures (`http_error_<status>`, `request_failed`) pass through with
/// their own code; see [`error_obj`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    NoResults,
    SearchFailed,
    GetLawFailed,
    AnalysisFailed,
    InvalidParams,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoResults => "no_results",
            Self::SearchFailed => "search_failed",
            Self::GetLawFailed => "get_law_failed",
            Self::AnalysisFailed => "analysis_failed",
            Self::InvalidParams => "invalid_params",
        }
    }
}

pub fn error_obj(code: &str, message: impl ToString) -> serde_json::Value {
    #[derive(Serialize)]
    struct ErrorObject<'a> {
        error: &'a str,
        message: String,
    }

    let message = message.to_string();
    match serde_json::to_value(ErrorObject {
        error: code,
        message: message.clone(),
    }) {
        Ok(v) => v,
        Err(_) => serde_json::json!({ "error": code, "message": message }),
    }
}

/// `{"error": kind, "message": msg}` as compact JSON.
pub fn error_json(kind: ErrorKind, message: impl ToString) -> String {
    error_obj(kind.as_str(), message).to_string()
}

/// Pretty JSON (2-space indent, non-ASCII left as-is). Serialization failures
/// fall back to an error object tagged with `on_error`.
pub fn to_pretty_json<T: Serialize>(value: &T, on_error: ErrorKind) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| error_json(on_error, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_json_has_exactly_two_fields() {
        let s = error_json(ErrorKind::AnalysisFailed, "bad item");
        let v: serde_json::Value = serde_json::from_str(&s).unwrap();
        assert_eq!(v["error"], "analysis_failed");
        assert_eq!(v["message"], "bad item");
        assert_eq!(v.as_object().map(|o| o.len()), Some(2));
    }

    #[test]
    fn pretty_json_keeps_japanese_unescaped() {
        let s = to_pretty_json(&serde_json::json!({"t": "道路交通法"}), ErrorKind::SearchFailed);
        assert!(s.contains("道路交通法"));
        assert!(s.contains("\n  \"t\""));
    }
}
