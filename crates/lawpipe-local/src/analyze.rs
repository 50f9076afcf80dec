//! Heuristics over keyword hits: where the results concentrate, which query words
//! they share, which age terms they lean on without defining, and which other laws
//! they point at. The output is advisory; none of it is legal interpretation.

use lawpipe_core::{
    AnalysisReport, Error, LawTally, ReferencedLaw, RelevanceIndicator, Result, SearchHit,
    SuggestedAction, UndefinedTerm,
};
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Only the top hits get per-item analysis; the distribution counts all of them.
pub const DETAIL_LIMIT: usize = 10;
pub const AGE_TERMS: [&str; 5] = ["幼児", "児童", "未成年", "少年", "成年"];
const DEFINES: &str = "定める";
const AGE_QUERY_MARKERS: [&str; 3] = ["歳", "年齢", "何歳"];
const CONTEXT_CHARS: usize = 100;
const MAX_REFERENCE_ACTIONS: usize = 3;
const SPREAD_THRESHOLD: usize = 5;
const UNKNOWN_LAW_ID: &str = "unknown";
const UNKNOWN_LAW_TITLE: &str = "不明";

#[derive(Debug, Clone)]
pub struct Analyzer {
    query_word: Regex,
    law_ref: Regex,
}

fn context(text: &str) -> String {
    text.chars().take(CONTEXT_CHARS).collect()
}

impl Analyzer {
    pub fn new() -> Result<Self> {
        let query_word =
            Regex::new(r"[一-龥ぁ-んァ-ヶー]+").map_err(|e| Error::Analysis(e.to_string()))?;
        let law_ref = Regex::new(r"([一-龥]+法)(?:第[一-九十百千万]+条)?")
            .map_err(|e| Error::Analysis(e.to_string()))?;
        Ok(Self {
            query_word,
            law_ref,
        })
    }

    /// Runs of kanji/kana in the lower-cased query.
    pub fn query_words(&self, query: &str) -> BTreeSet<String> {
        let lower = query.to_lowercase();
        self.query_word
            .find_iter(&lower)
            .map(|m| m.as_str().to_string())
            .collect()
    }

    /// Law names (`…法`) mentioned in `text`, in order of appearance.
    pub fn law_references(&self, text: &str) -> Vec<String> {
        self.law_ref
            .captures_iter(text)
            .filter_map(|c| c.get(1).map(|m| m.as_str().to_string()))
            .collect()
    }

    /// Converts agent-supplied JSON items; any malformed item fails the whole call.
    pub fn analyze_values(
        &self,
        items: &[serde_json::Value],
        original_query: &str,
    ) -> Result<AnalysisReport> {
        let hits = items
            .iter()
            .enumerate()
            .map(|(i, v)| {
                serde_json::from_value::<SearchHit>(v.clone())
                    .map_err(|e| Error::Analysis(format!("search_results[{i}]: {e}")))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(self.analyze(&hits, original_query))
    }

    pub fn analyze(&self, hits: &[SearchHit], original_query: &str) -> AnalysisReport {
        let law_distribution = distribution(hits);
        let query_words = self.query_words(original_query);

        let mut relevance_indicators = Vec::new();
        let mut undefined_terms = Vec::new();
        let mut references = Vec::new();

        for hit in hits.iter().take(DETAIL_LIMIT) {
            let text = hit.text.as_deref().unwrap_or_default().to_lowercase();

            let matching_words: Vec<String> = query_words
                .iter()
                .filter(|w| text.contains(w.as_str()))
                .cloned()
                .collect();
            if !matching_words.is_empty() {
                let match_ratio = if query_words.is_empty() {
                    0.0
                } else {
                    matching_words.len() as f64 / query_words.len() as f64
                };
                relevance_indicators.push(RelevanceIndicator {
                    law_title: hit.law_title.clone(),
                    matching_words,
                    match_ratio,
                });
            }

            if text.contains(DEFINES) {
                for term in AGE_TERMS.iter().filter(|t| text.contains(**t)) {
                    undefined_terms.push(UndefinedTerm {
                        term: term.to_string(),
                        law_title: hit.law_title.clone(),
                        context: context(&text),
                    });
                }
            }

            for name in self.law_references(&text) {
                if hit.law_title.as_deref() != Some(name.as_str()) {
                    references.push(ReferencedLaw {
                        from_law: hit.law_title.clone(),
                        to_law: name,
                        context: context(&text),
                    });
                }
            }
        }

        let referenced_laws = dedup_last_wins(references);
        let suggested_actions = suggest(
            &law_distribution,
            &undefined_terms,
            &referenced_laws,
            original_query,
        );

        AnalysisReport {
            original_query: original_query.to_string(),
            total_results: hits.len(),
            law_distribution,
            relevance_indicators,
            undefined_terms,
            referenced_laws,
            suggested_actions,
        }
    }
}

fn distribution(hits: &[SearchHit]) -> BTreeMap<String, LawTally> {
    let mut out: BTreeMap<String, LawTally> = BTreeMap::new();
    for hit in hits {
        let id = hit.law_id.as_deref().unwrap_or(UNKNOWN_LAW_ID);
        let tally = out.entry(id.to_string()).or_insert_with(|| LawTally {
            title: hit
                .law_title
                .clone()
                .unwrap_or_else(|| UNKNOWN_LAW_TITLE.to_string()),
            count: 0,
            positions: Vec::new(),
        });
        tally.count += 1;
        tally
            .positions
            .push(hit.position.clone().unwrap_or_default());
    }
    out
}

/// One entry per target law. A repeated target overwrites the earlier record but
/// keeps the slot where that target first appeared.
fn dedup_last_wins(refs: Vec<ReferencedLaw>) -> Vec<ReferencedLaw> {
    let mut out: Vec<ReferencedLaw> = Vec::new();
    let mut slot: HashMap<String, usize> = HashMap::new();
    for r in refs {
        match slot.get(&r.to_law) {
            Some(&i) => out[i] = r,
            None => {
                slot.insert(r.to_law.clone(), out.len());
                out.push(r);
            }
        }
    }
    out
}

fn suggest(
    distribution: &BTreeMap<String, LawTally>,
    undefined_terms: &[UndefinedTerm],
    referenced_laws: &[ReferencedLaw],
    original_query: &str,
) -> Vec<SuggestedAction> {
    let mut out = Vec::new();

    if distribution.len() == 1 {
        if let Some((law_id, tally)) = distribution.iter().next() {
            out.push(SuggestedAction::GetFullLaw {
                reason: "検索結果が単一の法令に集中している".to_string(),
                law_id: law_id.clone(),
                law_title: tally.title.clone(),
            });
        }
    } else if distribution.len() > SPREAD_THRESHOLD {
        out.push(SuggestedAction::NarrowSearch {
            reason: "検索結果が複数の法令に分散している".to_string(),
            suggestion: "より具体的なキーワードで絞り込み".to_string(),
        });
    }

    for t in undefined_terms {
        out.push(SuggestedAction::SearchDefinition {
            reason: format!("'{}'の定義が必要", t.term),
            suggestion: format!("'{} 定義'で検索", t.term),
        });
    }

    for r in referenced_laws.iter().take(MAX_REFERENCE_ACTIONS) {
        out.push(SuggestedAction::SearchReferencedLaw {
            reason: format!("他の法令（{}）が参照されている", r.to_law),
            target_law: r.to_law.clone(),
        });
    }

    if AGE_QUERY_MARKERS.iter().any(|m| original_query.contains(m)) {
        out.push(SuggestedAction::SearchAgeDefinitions {
            reason: "年齢に関する質問".to_string(),
            suggestion: "年齢区分の定義を確認（幼児、児童等）".to_string(),
        });
    }

    out
}
