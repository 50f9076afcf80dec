use crate::{Error, Result, SearchKind};
use serde::{Deserialize, Serialize};

/// Snippet size requested for keyword hits.
pub const SENTENCE_TEXT_SIZE: u32 = 300;
pub const DEFAULT_LIMIT: u32 = 10;

/// A fully-formed GET request against one gateway endpoint.
///
/// Query params keep insertion order; absent values are never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiRequest {
    pub endpoint: SearchKind,
    pub path_segment: Option<String>,
    pub params: Vec<(String, String)>,
}

impl ApiRequest {
    pub fn new(endpoint: SearchKind) -> Self {
        Self {
            endpoint,
            path_segment: None,
            params: Vec::new(),
        }
    }

    pub fn with_path_segment(mut self, segment: impl Into<String>) -> Self {
        self.path_segment = Some(segment.into());
        self
    }

    pub fn param(mut self, key: &str, value: impl ToString) -> Self {
        self.params.push((key.to_string(), value.to_string()));
        self
    }

    /// `None` and empty strings are omitted.
    pub fn opt_param(self, key: &str, value: Option<&str>) -> Self {
        match value.map(str::trim).filter(|v| !v.is_empty()) {
            Some(v) => self.param(key, v),
            None => self,
        }
    }

    /// Comma-joined; `None` or an empty list is omitted.
    pub fn list_param(self, key: &str, values: Option<&[String]>) -> Self {
        match values.filter(|v| !v.is_empty()) {
            Some(v) => self.param(key, v.join(",")),
            None => self,
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn url(&self, base: &str) -> Result<url::Url> {
        let mut s = format!(
            "{}/{}",
            base.trim().trim_end_matches('/'),
            self.endpoint.as_str()
        );
        if let Some(seg) = self.path_segment.as_deref() {
            s.push('/');
            s.push_str(&encode_path_segment(seg));
        }
        let mut u = url::Url::parse(&s).map_err(|e| Error::InvalidParams(e.to_string()))?;
        if !self.params.is_empty() {
            u.query_pairs_mut().extend_pairs(self.params.iter());
        }
        Ok(u)
    }
}

/// Percent-encodes everything except RFC 3986 unreserved characters.
pub fn encode_path_segment(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char)
            }
            _ => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeywordSearchParams {
    pub keywords: Vec<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub law_type: Option<Vec<String>>,
    pub category: Option<Vec<String>>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

impl KeywordSearchParams {
    pub fn to_request(&self) -> ApiRequest {
        ApiRequest::new(SearchKind::Keyword)
            .param("keyword", self.keywords.join(" "))
            .param("limit", self.limit.unwrap_or(DEFAULT_LIMIT))
            .param("offset", self.offset.unwrap_or(0))
            .param("sentence_text_size", SENTENCE_TEXT_SIZE)
            .list_param("law_type", self.law_type.as_deref())
            .list_param("category", self.category.as_deref())
            .opt_param("promulgation_date_from", self.date_from.as_deref())
            .opt_param("promulgation_date_to", self.date_to.as_deref())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TitleSearchParams {
    pub title_keywords: Vec<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub law_type: Option<Vec<String>>,
    pub category: Option<Vec<String>>,
    pub include_repealed: bool,
}

impl TitleSearchParams {
    pub fn to_request(&self) -> ApiRequest {
        let req = ApiRequest::new(SearchKind::Laws)
            .param("law_title", self.title_keywords.join(" "))
            .param("limit", self.limit.unwrap_or(DEFAULT_LIMIT));
        let req = match self.offset {
            Some(o) => req.param("offset", o),
            None => req,
        };
        let req = req
            .list_param("law_type", self.law_type.as_deref())
            .list_param("category", self.category.as_deref());
        if self.include_repealed {
            req
        } else {
            // The API spells "not repealed" as the literal status `None`.
            req.param("repeal_status", "None")
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LawDataParams {
    pub law_id: String,
    pub target_date: Option<String>,
}

impl LawDataParams {
    pub fn to_request(&self) -> ApiRequest {
        ApiRequest::new(SearchKind::LawData)
            .with_path_segment(self.law_id.clone())
            .param("law_full_text_format", "json")
            .opt_param("asof", self.target_date.as_deref())
    }
}
