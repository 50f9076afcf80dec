//! The tool surface shared by the MCP server and `lawpipe call`.
//!
//! Every tool returns a JSON string. Internal failures never escape as errors;
//! they come back as `{"error": kind, "message": msg}`.

use crate::envelope::{error_json, error_obj, to_pretty_json, ErrorKind};
use crate::guidance::SEARCH_GUIDANCE;
use lawpipe_core::{
    GatewayResponse, KeywordSearchParams, LawBody, LawContent, LawDataParams, LawsGateway,
    ResultEnvelope, SearchKind, TitleSearchParams,
};
use lawpipe_local::{
    extract_articles_from_payload, normalize::LawHeader, terms, Analyzer, EgovGateway, Normalizer,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const ZERO_HIT_SUGGESTIONS: [&str; 3] = [
    "キーワードを減らして検索",
    "類義語や関連語で検索",
    "法令名で直接検索",
];

pub const TOOL_NAMES: [&str; 8] = [
    "search_laws_by_keyword",
    "smart_search_laws",
    "search_laws_by_title",
    "get_law_content",
    "get_search_guidance",
    "analyze_search_results",
    "translate_legal_terms",
    "lookup_age_category",
];

#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "stdio", derive(schemars::JsonSchema))]
#[serde(default)]
pub struct KeywordSearchArgs {
    /// Keywords searched in law bodies. All must match (joined with a space).
    pub keywords: Vec<String>,
    /// Max hits to return. Default: 10.
    pub limit: Option<u32>,
    /// Start position for paging. Default: 0.
    pub offset: Option<u32>,
    /// Law type filter, e.g. "Act", "CabinetOrder".
    pub law_type: Option<Vec<String>>,
    /// Category filter.
    pub category: Option<Vec<String>>,
    /// Promulgated on or after (YYYY-MM-DD).
    pub date_from: Option<String>,
    /// Promulgated on or before (YYYY-MM-DD).
    pub date_to: Option<String>,
}

impl From<KeywordSearchArgs> for KeywordSearchParams {
    fn from(a: KeywordSearchArgs) -> Self {
        Self {
            keywords: a.keywords,
            limit: a.limit,
            offset: a.offset,
            law_type: a.law_type,
            category: a.category,
            date_from: a.date_from,
            date_to: a.date_to,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "stdio", derive(schemars::JsonSchema))]
#[serde(default)]
pub struct SmartSearchArgs {
    /// Everyday wording, e.g. "チャイルドシート". Expanded into statutory terms.
    pub query: String,
    /// Employment type of the person asking, e.g. "パート". Only adds a recommendation.
    pub employment_type: Option<String>,
    /// Max hits to return. Default: 10.
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "stdio", derive(schemars::JsonSchema))]
#[serde(default)]
pub struct TitleSearchArgs {
    /// Words that must appear in the law title.
    pub title_keywords: Vec<String>,
    /// Max laws to return. Default: 10.
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub law_type: Option<Vec<String>>,
    pub category: Option<Vec<String>>,
    /// Include repealed laws. Default: false.
    pub include_repealed: bool,
}

impl From<TitleSearchArgs> for TitleSearchParams {
    fn from(a: TitleSearchArgs) -> Self {
        Self {
            title_keywords: a.title_keywords,
            limit: a.limit,
            offset: a.offset,
            law_type: a.law_type,
            category: a.category,
            include_repealed: a.include_repealed,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "stdio", derive(schemars::JsonSchema))]
#[serde(default)]
pub struct LawContentArgs {
    /// Law identifier, e.g. "335AC0000000105".
    pub law_id: String,
    /// Return structured articles instead of the raw tree. Default: true.
    pub extract_articles: Option<bool>,
    /// Point-in-time version (YYYY-MM-DD).
    pub target_date: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "stdio", derive(schemars::JsonSchema))]
pub struct GuidanceArgs {}

#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "stdio", derive(schemars::JsonSchema))]
#[serde(default)]
pub struct AnalyzeArgs {
    /// Items from a previous keyword search (`items` of its result).
    pub search_results: Vec<serde_json::Value>,
    /// The user's question as asked.
    pub original_query: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "stdio", derive(schemars::JsonSchema))]
#[serde(default)]
pub struct TranslateTermsArgs {
    /// Everyday words to map onto statutory wording.
    pub terms: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "stdio", derive(schemars::JsonSchema))]
#[serde(default)]
pub struct AgeCategoryArgs {
    /// Age in full years.
    pub age: Option<u32>,
}

#[derive(Serialize)]
struct TermsOutput {
    expansions: Vec<lawpipe_core::TermExpansion>,
}

#[derive(Serialize)]
struct AgeOutput {
    age: u32,
    categories: Vec<lawpipe_core::AgeCategoryMatch>,
    summary: &'static str,
}

#[derive(Serialize)]
struct SmartSearchOutput {
    query: String,
    expanded_terms: Vec<String>,
    recommendations: Vec<String>,
    results: ResultEnvelope,
}

pub struct LawTools {
    gateway: Arc<dyn LawsGateway>,
    normalizer: Normalizer,
    analyzer: Analyzer,
}

impl LawTools {
    pub fn new(gateway: Arc<dyn LawsGateway>) -> lawpipe_core::Result<Self> {
        Ok(Self {
            gateway,
            normalizer: Normalizer::new()?,
            analyzer: Analyzer::new()?,
        })
    }

    /// e-Gov gateway configured from `LAWPIPE_API_BASE` / `LAWPIPE_TIMEOUT_MS`.
    pub fn from_env() -> lawpipe_core::Result<Self> {
        let client = EgovGateway::default_client()?;
        Self::new(Arc::new(EgovGateway::from_env(client)))
    }

    pub fn gateway_name(&self) -> &'static str {
        self.gateway.name()
    }

    async fn keyword_envelope(
        &self,
        params: &KeywordSearchParams,
    ) -> lawpipe_core::Result<ResultEnvelope> {
        let resp = self.gateway.call(&params.to_request()).await;
        let mut env = self.normalizer.normalize(&resp, SearchKind::Keyword)?;
        if env.total_count == 0 {
            env.search_hints.suggestions =
                Some(ZERO_HIT_SUGGESTIONS.iter().map(|s| s.to_string()).collect());
        }
        Ok(env)
    }

    pub async fn search_laws_by_keyword(&self, args: KeywordSearchArgs) -> String {
        let params = KeywordSearchParams::from(args);
        tracing::info!(tool = "search_laws_by_keyword", keywords = ?params.keywords, "tool call");
        match self.keyword_envelope(&params).await {
            Ok(env) => to_pretty_json(&env, ErrorKind::SearchFailed),
            Err(e) => error_json(ErrorKind::SearchFailed, e),
        }
    }

    /// Keyword search over the query plus its statutory equivalents.
    pub async fn smart_search_laws(&self, args: SmartSearchArgs) -> String {
        if args.query.trim().is_empty() {
            return error_json(ErrorKind::InvalidParams, "query must be non-empty");
        }
        let (expansion, expanded_terms) = terms::expand_query(&args.query);
        tracing::info!(tool = "smart_search_laws", terms = ?expanded_terms, "tool call");

        let mut recommendations = Vec::new();
        if let Some(kind) = args.employment_type.as_deref().map(str::trim) {
            if !kind.is_empty() {
                recommendations.push(format!("{kind}に関連する法律をさらに検索"));
            }
        }
        if expansion.legal_terms.len() > 1 {
            recommendations.push(format!("「{}」で追加検索", expansion.legal_terms[0]));
        }

        let params = KeywordSearchParams {
            keywords: expanded_terms.clone(),
            limit: args.limit,
            ..Default::default()
        };
        match self.keyword_envelope(&params).await {
            Ok(results) => to_pretty_json(
                &SmartSearchOutput {
                    query: expansion.term,
                    expanded_terms,
                    recommendations,
                    results,
                },
                ErrorKind::SearchFailed,
            ),
            Err(e) => error_json(ErrorKind::SearchFailed, e),
        }
    }

    pub async fn search_laws_by_title(&self, args: TitleSearchArgs) -> String {
        let params = TitleSearchParams::from(args);
        tracing::info!(tool = "search_laws_by_title", title = ?params.title_keywords, "tool call");
        let resp = self.gateway.call(&params.to_request()).await;
        match self.normalizer.normalize(&resp, SearchKind::Laws) {
            Ok(env) => to_pretty_json(&env, ErrorKind::SearchFailed),
            Err(e) => error_json(ErrorKind::SearchFailed, e),
        }
    }

    pub async fn get_law_content(&self, args: LawContentArgs) -> String {
        let law_id = args.law_id.trim().to_string();
        if law_id.is_empty() {
            return error_json(ErrorKind::InvalidParams, "law_id must be non-empty");
        }
        let extract = args.extract_articles.unwrap_or(true);
        tracing::info!(tool = "get_law_content", %law_id, extract, "tool call");

        let params = LawDataParams {
            law_id,
            target_date: args.target_date,
        };
        let payload = match law_payload(self.gateway.call(&params.to_request()).await) {
            Ok(v) => v,
            Err(s) => return s,
        };

        let header = match LawHeader::from_payload(&payload) {
            Ok(h) => h,
            Err(e) => return error_json(ErrorKind::GetLawFailed, e),
        };
        let body = if extract {
            let articles = extract_articles_from_payload(&payload);
            LawBody::Articles {
                article_count: articles.len(),
                articles,
            }
        } else {
            LawBody::FullText {
                law_full_text: payload
                    .get("law_full_text")
                    .cloned()
                    .unwrap_or_else(|| serde_json::json!({})),
            }
        };
        let content = LawContent {
            law_id: header.law_id(),
            law_title: header.law_title(),
            law_num: header.law_num(),
            promulgation_date: header.promulgation_date(),
            last_amendment: header.last_amendment(),
            body,
        };
        to_pretty_json(&content, ErrorKind::GetLawFailed)
    }

    pub fn get_search_guidance(&self) -> String {
        SEARCH_GUIDANCE.to_string()
    }

    pub fn analyze_search_results(&self, args: AnalyzeArgs) -> String {
        tracing::info!(
            tool = "analyze_search_results",
            items = args.search_results.len(),
            "tool call"
        );
        match self
            .analyzer
            .analyze_values(&args.search_results, &args.original_query)
        {
            Ok(report) => to_pretty_json(&report, ErrorKind::AnalysisFailed),
            Err(e) => error_json(ErrorKind::AnalysisFailed, e),
        }
    }

    pub fn translate_legal_terms(&self, args: TranslateTermsArgs) -> String {
        let out = TermsOutput {
            expansions: args.terms.iter().map(|t| terms::translate(t)).collect(),
        };
        to_pretty_json(&out, ErrorKind::InvalidParams)
    }

    pub fn lookup_age_category(&self, args: AgeCategoryArgs) -> String {
        let Some(age) = args.age else {
            return error_json(ErrorKind::InvalidParams, "age is required");
        };
        let out = AgeOutput {
            age,
            categories: terms::age_categories(age),
            summary: terms::age_summary(age),
        };
        to_pretty_json(&out, ErrorKind::InvalidParams)
    }

    /// Dispatch by tool name with JSON arguments (`null` means defaults).
    pub async fn call(&self, tool: &str, args: serde_json::Value) -> String {
        match tool {
            "search_laws_by_keyword" => match parse(args) {
                Ok(a) => self.search_laws_by_keyword(a).await,
                Err(e) => e,
            },
            "smart_search_laws" => match parse(args) {
                Ok(a) => self.smart_search_laws(a).await,
                Err(e) => e,
            },
            "search_laws_by_title" => match parse(args) {
                Ok(a) => self.search_laws_by_title(a).await,
                Err(e) => e,
            },
            "get_law_content" => match parse(args) {
                Ok(a) => self.get_law_content(a).await,
                Err(e) => e,
            },
            "get_search_guidance" => self.get_search_guidance(),
            "analyze_search_results" => match parse(args) {
                Ok(a) => self.analyze_search_results(a),
                Err(e) => e,
            },
            "translate_legal_terms" => match parse(args) {
                Ok(a) => self.translate_legal_terms(a),
                Err(e) => e,
            },
            "lookup_age_category" => match parse(args) {
                Ok(a) => self.lookup_age_category(a),
                Err(e) => e,
            },
            other => error_json(
                ErrorKind::InvalidParams,
                format!("unknown tool {other:?}; expected one of {}", TOOL_NAMES.join(", ")),
            ),
        }
    }
}

fn parse<T: DeserializeOwned + Default>(args: serde_json::Value) -> Result<T, String> {
    if args.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(args).map_err(|e| error_json(ErrorKind::InvalidParams, e))
}

/// The `law_data` body, or the already-rendered error string.
fn law_payload(resp: GatewayResponse) -> Result<serde_json::Value, String> {
    if let Some(f) = resp.error_marker() {
        return Err(error_obj(&f.code, f.display_message()).to_string());
    }
    match resp {
        GatewayResponse::Data(v) => Ok(v),
        GatewayResponse::NoResults => Err(error_json(
            ErrorKind::NoResults,
            "no law matched the identifier",
        )),
        GatewayResponse::Failed(f) => Err(error_obj(&f.code, f.display_message()).to_string()),
    }
}
