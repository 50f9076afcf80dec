use crate::lenient;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchKind {
    Keyword,
    Laws,
    LawData,
}

impl SearchKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Keyword => "keyword",
            Self::Laws => "laws",
            Self::LawData => "law_data",
        }
    }
}

/// Normalized result of one gateway call.
///
/// `has_error == true` implies `items` is empty and both counts are zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultEnvelope {
    pub search_type: SearchKind,
    pub total_count: u64,
    pub returned_count: u64,
    pub has_error: bool,
    pub error_message: String,
    pub items: Vec<ResultItem>,
    pub search_hints: SearchHints,
}

impl ResultEnvelope {
    pub fn empty(kind: SearchKind) -> Self {
        Self {
            search_type: kind,
            total_count: 0,
            returned_count: 0,
            has_error: false,
            error_message: String::new(),
            items: Vec::new(),
            search_hints: SearchHints::default(),
        }
    }

    pub fn error(kind: SearchKind, message: impl Into<String>) -> Self {
        Self {
            has_error: true,
            error_message: message.into(),
            ..Self::empty(kind)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchHints {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_more: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_offset: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResultItem {
    Keyword(KeywordHit),
    Law(LawListing),
    LawData(LawDocument),
}

impl ResultItem {
    pub fn law_id(&self) -> Option<&str> {
        match self {
            Self::Keyword(h) => h.law_id.as_deref(),
            Self::Law(l) => l.law_id.as_deref(),
            Self::LawData(d) => d.law_id.as_deref(),
        }
    }

    pub fn law_title(&self) -> Option<&str> {
        match self {
            Self::Keyword(h) => h.law_title.as_deref(),
            Self::Law(l) => l.law_title.as_deref(),
            Self::LawData(d) => d.law_title.as_deref(),
        }
    }
}

/// One sentence-level keyword match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordHit {
    pub law_id: Option<String>,
    pub law_title: Option<String>,
    pub law_num: Option<String>,
    pub position: Option<String>,
    /// Snippet with inline markup removed.
    pub text: String,
    /// Snippet as the gateway returned it (highlight tags intact).
    pub raw_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LawListing {
    pub law_id: Option<String>,
    pub law_title: Option<String>,
    pub law_num: Option<String>,
    pub law_type: Option<String>,
    pub promulgation_date: Option<String>,
    pub last_amendment_date: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LawDocument {
    pub law_id: Option<String>,
    pub law_title: Option<String>,
    pub law_num: Option<String>,
    pub law_full_text: serde_json::Value,
    pub has_attachments: bool,
}

/// Node of the law full-text tree (`law_full_text` with format=json).
#[derive(Debug, Clone, PartialEq)]
pub enum LawNode {
    Element(LawElement),
    Text(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LawElement {
    pub tag: String,
    pub attr: BTreeMap<String, String>,
    pub children: Vec<LawNode>,
}

impl LawNode {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    pub fn element(tag: &str, attr: &[(&str, &str)], children: Vec<LawNode>) -> Self {
        Self::Element(LawElement {
            tag: tag.to_string(),
            attr: attr
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            children,
        })
    }

    /// Lenient conversion from the gateway's JSON tree.
    ///
    /// Objects become elements (missing `tag` is `""`, non-array `children` are
    /// dropped, scalar attribute values are stringified); strings become text;
    /// anything else becomes empty text.
    pub fn from_json(v: &serde_json::Value) -> Self {
        match v {
            serde_json::Value::String(s) => Self::Text(s.clone()),
            serde_json::Value::Object(m) => {
                let tag = m
                    .get("tag")
                    .and_then(|t| t.as_str())
                    .unwrap_or_default()
                    .to_string();
                let mut attr = BTreeMap::new();
                if let Some(serde_json::Value::Object(a)) = m.get("attr") {
                    for (k, v) in a {
                        let s = match v {
                            serde_json::Value::String(s) => s.clone(),
                            serde_json::Value::Number(n) => n.to_string(),
                            serde_json::Value::Bool(b) => b.to_string(),
                            _ => continue,
                        };
                        attr.insert(k.clone(), s);
                    }
                }
                let children = match m.get("children") {
                    Some(serde_json::Value::Array(xs)) => xs.iter().map(Self::from_json).collect(),
                    _ => Vec::new(),
                };
                Self::Element(LawElement {
                    tag,
                    attr,
                    children,
                })
            }
            _ => Self::Text(String::new()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    /// As numbered in the source, e.g. `"3"` or `"3_2"`.
    pub article_num: String,
    pub article_text: String,
    pub char_count: usize,
}

/// Output of `get_law_content`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LawContent {
    pub law_id: Option<String>,
    pub law_title: Option<String>,
    pub law_num: Option<String>,
    pub promulgation_date: Option<String>,
    pub last_amendment: Option<String>,
    #[serde(flatten)]
    pub body: LawBody,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LawBody {
    Articles {
        articles: Vec<ArticleRecord>,
        article_count: usize,
    },
    FullText {
        law_full_text: serde_json::Value,
    },
}

/// One previously-normalized item fed back by the agent for analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub law_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub law_title: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub position: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub text: Option<String>,
}

impl From<&KeywordHit> for SearchHit {
    fn from(h: &KeywordHit) -> Self {
        Self {
            law_id: h.law_id.clone(),
            law_title: h.law_title.clone(),
            position: h.position.clone(),
            text: Some(h.text.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub original_query: String,
    pub total_results: usize,
    pub law_distribution: BTreeMap<String, LawTally>,
    pub relevance_indicators: Vec<RelevanceIndicator>,
    pub undefined_terms: Vec<UndefinedTerm>,
    pub referenced_laws: Vec<ReferencedLaw>,
    pub suggested_actions: Vec<SuggestedAction>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LawTally {
    pub title: String,
    pub count: usize,
    pub positions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelevanceIndicator {
    pub law_title: Option<String>,
    pub matching_words: Vec<String>,
    /// In `[0, 1]`.
    pub match_ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UndefinedTerm {
    pub term: String,
    pub law_title: Option<String>,
    pub context: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferencedLaw {
    pub from_law: Option<String>,
    pub to_law: String,
    pub context: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum SuggestedAction {
    GetFullLaw {
        reason: String,
        law_id: String,
        law_title: String,
    },
    NarrowSearch {
        reason: String,
        suggestion: String,
    },
    SearchDefinition {
        reason: String,
        suggestion: String,
    },
    SearchReferencedLaw {
        reason: String,
        target_law: String,
    },
    SearchAgeDefinitions {
        reason: String,
        suggestion: String,
    },
}

impl SuggestedAction {
    pub fn tag(&self) -> &'static str {
        match self {
            Self::GetFullLaw { .. } => "get_full_law",
            Self::NarrowSearch { .. } => "narrow_search",
            Self::SearchDefinition { .. } => "search_definition",
            Self::SearchReferencedLaw { .. } => "search_referenced_law",
            Self::SearchAgeDefinitions { .. } => "search_age_definitions",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TermMatch {
    Exact,
    Partial,
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TermExpansion {
    pub term: String,
    pub legal_terms: Vec<String>,
    pub matched: TermMatch,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgeCategoryMatch {
    pub category: String,
    pub min_age: u32,
    /// `None` means no upper bound.
    pub max_age: Option<u32>,
    pub laws: Vec<String>,
}
