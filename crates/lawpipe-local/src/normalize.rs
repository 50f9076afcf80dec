//! Maps the three raw gateway payload shapes onto one `ResultEnvelope`.
//!
//! Missing or null fields are defaulted here and nowhere else; downstream code sees
//! typed items only.

use lawpipe_core::{
    lenient, Error, GatewayResponse, KeywordHit, LawDocument, LawListing, ResultEnvelope,
    ResultItem, Result, SearchKind,
};
use regex::Regex;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
struct RawLawInfo {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    law_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    law_num: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    law_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    promulgation_date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawRevisionInfo {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    law_title: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    amendment_promulgate_date: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    category: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawSentence {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    position: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawKeywordItem {
    #[serde(default)]
    law_info: Option<RawLawInfo>,
    #[serde(default)]
    revision_info: Option<RawRevisionInfo>,
    #[serde(default)]
    sentences: Option<Vec<RawSentence>>,
}

#[derive(Debug, Deserialize)]
struct RawKeywordPayload {
    #[serde(default, deserialize_with = "lenient::count")]
    total_count: u64,
    #[serde(default, deserialize_with = "lenient::count")]
    sentence_count: u64,
    #[serde(default, deserialize_with = "lenient::count")]
    next_offset: u64,
    #[serde(default)]
    items: Option<Vec<RawKeywordItem>>,
}

#[derive(Debug, Deserialize)]
struct RawLawEntry {
    #[serde(default)]
    law_info: Option<RawLawInfo>,
    #[serde(default)]
    revision_info: Option<RawRevisionInfo>,
}

#[derive(Debug, Deserialize)]
struct RawLawsPayload {
    #[serde(default, deserialize_with = "lenient::count")]
    total_count: u64,
    #[serde(default, deserialize_with = "lenient::count")]
    count: u64,
    #[serde(default)]
    laws: Option<Vec<RawLawEntry>>,
}

/// Identifying fields shared by `law_data` payloads and `get_law_content` output.
#[derive(Debug, Default, Deserialize)]
pub struct LawHeader {
    #[serde(default)]
    law_info: Option<RawLawInfo>,
    #[serde(default)]
    revision_info: Option<RawRevisionInfo>,
}

impl LawHeader {
    pub fn from_payload(v: &serde_json::Value) -> Result<Self> {
        Self::deserialize(v).map_err(|e| Error::Gateway(format!("malformed law_data payload: {e}")))
    }

    fn info(&self) -> Option<&RawLawInfo> {
        self.law_info.as_ref()
    }

    fn revision(&self) -> Option<&RawRevisionInfo> {
        self.revision_info.as_ref()
    }

    pub fn law_id(&self) -> Option<String> {
        self.info().and_then(|i| i.law_id.clone())
    }

    pub fn law_num(&self) -> Option<String> {
        self.info().and_then(|i| i.law_num.clone())
    }

    pub fn promulgation_date(&self) -> Option<String> {
        self.info().and_then(|i| i.promulgation_date.clone())
    }

    pub fn law_title(&self) -> Option<String> {
        self.revision().and_then(|r| r.law_title.clone())
    }

    pub fn last_amendment(&self) -> Option<String> {
        self.revision()
            .and_then(|r| r.amendment_promulgate_date.clone())
    }
}

/// `null`, `false`, zero and empty strings/arrays/objects are falsy.
fn truthy(v: Option<&serde_json::Value>) -> bool {
    match v {
        None | Some(serde_json::Value::Null) => false,
        Some(serde_json::Value::Bool(b)) => *b,
        Some(serde_json::Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(serde_json::Value::String(s)) => !s.is_empty(),
        Some(serde_json::Value::Array(a)) => !a.is_empty(),
        Some(serde_json::Value::Object(o)) => !o.is_empty(),
    }
}

#[derive(Debug, Clone)]
pub struct Normalizer {
    markup: Regex,
}

impl Normalizer {
    pub fn new() -> Result<Self> {
        let markup = Regex::new(r"<[^>]+>").map_err(|e| Error::Gateway(e.to_string()))?;
        Ok(Self { markup })
    }

    /// Removes every `<...>` tag (highlight markup in keyword snippets).
    pub fn strip_markup(&self, s: &str) -> String {
        self.markup.replace_all(s, "").into_owned()
    }

    pub fn normalize(&self, resp: &GatewayResponse, kind: SearchKind) -> Result<ResultEnvelope> {
        if let Some(f) = resp.error_marker() {
            return Ok(ResultEnvelope::error(kind, f.display_message()));
        }
        let payload = match resp {
            GatewayResponse::Data(v) => v,
            // Zero matches is a valid (empty) answer.
            _ => return Ok(ResultEnvelope::empty(kind)),
        };
        match kind {
            SearchKind::Keyword => self.keyword(payload),
            SearchKind::Laws => Self::laws(payload),
            SearchKind::LawData => Self::law_data(payload),
        }
    }

    fn keyword(&self, payload: &serde_json::Value) -> Result<ResultEnvelope> {
        let raw = RawKeywordPayload::deserialize(payload)
            .map_err(|e| Error::Gateway(format!("malformed keyword payload: {e}")))?;

        let mut env = ResultEnvelope::empty(SearchKind::Keyword);
        env.total_count = raw.total_count;

        for item in raw.items.unwrap_or_default() {
            let info = item.law_info.unwrap_or_default();
            let rev = item.revision_info.unwrap_or_default();
            for s in item.sentences.unwrap_or_default() {
                let raw_text = s.text.unwrap_or_default();
                env.items.push(ResultItem::Keyword(KeywordHit {
                    law_id: info.law_id.clone(),
                    law_title: rev.law_title.clone(),
                    law_num: info.law_num.clone(),
                    position: s.position,
                    text: self.strip_markup(&raw_text),
                    raw_text,
                }));
            }
        }
        // Counts matched sentences on the server side, not what this page carries.
        env.returned_count = raw.sentence_count;

        if env.total_count > env.returned_count {
            env.search_hints.has_more = Some(true);
            env.search_hints.next_offset = Some(raw.next_offset);
        }
        Ok(env)
    }

    fn laws(payload: &serde_json::Value) -> Result<ResultEnvelope> {
        let raw = RawLawsPayload::deserialize(payload)
            .map_err(|e| Error::Gateway(format!("malformed laws payload: {e}")))?;

        let mut env = ResultEnvelope::empty(SearchKind::Laws);
        env.total_count = raw.total_count;
        env.returned_count = raw.count;
        env.items = raw
            .laws
            .unwrap_or_default()
            .into_iter()
            .map(|law| {
                let info = law.law_info.unwrap_or_default();
                let rev = law.revision_info.unwrap_or_default();
                ResultItem::Law(LawListing {
                    law_id: info.law_id,
                    law_title: rev.law_title,
                    law_num: info.law_num,
                    law_type: info.law_type,
                    promulgation_date: info.promulgation_date,
                    last_amendment_date: rev.amendment_promulgate_date,
                    category: rev.category,
                })
            })
            .collect();
        Ok(env)
    }

    fn law_data(payload: &serde_json::Value) -> Result<ResultEnvelope> {
        let header = LawHeader::from_payload(payload)?;
        let mut env = ResultEnvelope::empty(SearchKind::LawData);
        env.total_count = 1;
        env.returned_count = 1;
        env.items = vec![ResultItem::LawData(LawDocument {
            law_id: header.law_id(),
            law_title: header.law_title(),
            law_num: header.law_num(),
            law_full_text: payload
                .get("law_full_text")
                .cloned()
                .unwrap_or_else(|| serde_json::json!({})),
            has_attachments: truthy(payload.get("attached_files_info")),
        })];
        Ok(env)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lawpipe_core::GatewayFailure;
    use proptest::prelude::*;
    use serde_json::json;

    fn n() -> Normalizer {
        Normalizer::new().unwrap()
    }

    fn keyword_payload() -> serde_json::Value {
        json!({
            "total_count": 5,
            "sentence_count": 3,
            "next_offset": 10,
            "items": [
                {
                    "law_info": {"law_id": "335AC0000000105", "law_num": "昭和三十五年法律第百五号"},
                    "revision_info": {"law_title": "道路交通法"},
                    "sentences": [
                        {"position": "mainprovision", "text": "<span>幼児</span>を乗車させる"},
                        {"position": "mainprovision", "text": "座席ベルトを<b>装着</b>"}
                    ]
                },
                {
                    "law_info": {"law_id": "322AC0000000164"},
                    "revision_info": {"law_title": "児童福祉法"},
                    "sentences": [{"position": 4, "text": "plain"}]
                }
            ]
        })
    }

    #[test]
    fn keyword_hits_are_flattened_per_sentence() {
        let env = n()
            .normalize(&GatewayResponse::Data(keyword_payload()), SearchKind::Keyword)
            .unwrap();
        assert!(!env.has_error);
        assert_eq!(env.total_count, 5);
        assert_eq!(env.returned_count, 3);
        assert_eq!(env.items.len(), 3);

        let ResultItem::Keyword(first) = &env.items[0] else {
            panic!("expected keyword hit");
        };
        assert_eq!(first.law_id.as_deref(), Some("335AC0000000105"));
        assert_eq!(first.law_title.as_deref(), Some("道路交通法"));
        assert_eq!(first.text, "幼児を乗車させる");
        assert_eq!(first.raw_text, "<span>幼児</span>を乗車させる");

        let ResultItem::Keyword(second) = &env.items[1] else {
            panic!("expected keyword hit");
        };
        assert_eq!(second.law_num, first.law_num);
        assert_eq!(second.text, "座席ベルトを装着");

        let ResultItem::Keyword(third) = &env.items[2] else {
            panic!("expected keyword hit");
        };
        assert_eq!(third.position.as_deref(), Some("4"));
        assert_eq!(third.law_num, None);
    }

    #[test]
    fn keyword_pagination_hint_only_when_more_remain() {
        let env = n()
            .normalize(&GatewayResponse::Data(keyword_payload()), SearchKind::Keyword)
            .unwrap();
        assert_eq!(env.search_hints.has_more, Some(true));
        assert_eq!(env.search_hints.next_offset, Some(10));

        let mut p = keyword_payload();
        p["total_count"] = json!(3);
        let env = n()
            .normalize(&GatewayResponse::Data(p), SearchKind::Keyword)
            .unwrap();
        assert_eq!(env.search_hints.has_more, None);
        assert_eq!(env.search_hints.next_offset, None);
    }

    #[test]
    fn keyword_returned_count_comes_from_sentence_count() {
        let payload = json!({
            "total_count": 2,
            "sentence_count": 40,
            "items": [{
                "law_info": {"law_id": "X1"},
                "sentences": [{"position": "mainprovision", "text": "一文"}]
            }]
        });
        let env = n()
            .normalize(&GatewayResponse::Data(payload), SearchKind::Keyword)
            .unwrap();
        assert_eq!(env.items.len(), 1);
        assert_eq!(env.returned_count, 40);
        assert_eq!(env.search_hints.has_more, None);

        let env = n()
            .normalize(
                &GatewayResponse::Data(json!({"total_count": 4, "items": []})),
                SearchKind::Keyword,
            )
            .unwrap();
        assert_eq!(env.returned_count, 0);
        assert_eq!(env.search_hints.has_more, Some(true));
    }

    #[test]
    fn error_markers_always_yield_empty_error_envelopes() {
        let cases = [
            GatewayResponse::Failed(GatewayFailure::http(500, Some("down".into()))),
            GatewayResponse::Failed(GatewayFailure::http(502, None)),
            GatewayResponse::Data(json!({"error": "request_failed", "message": "timed out", "items": [1]})),
        ];
        for kind in [SearchKind::Keyword, SearchKind::Laws, SearchKind::LawData] {
            for c in &cases {
                let env = n().normalize(c, kind).unwrap();
                assert!(env.has_error);
                assert!(env.items.is_empty());
                assert_eq!(env.total_count, 0);
                assert_eq!(env.returned_count, 0);
                assert_eq!(env.search_type, kind);
            }
        }
        let env = n().normalize(&cases[1], SearchKind::Laws).unwrap();
        assert_eq!(env.error_message, "http_error_502");
        let env = n().normalize(&cases[2], SearchKind::Laws).unwrap();
        assert_eq!(env.error_message, "timed out");
    }

    #[test]
    fn no_results_is_an_empty_non_error_envelope() {
        let env = n()
            .normalize(&GatewayResponse::NoResults, SearchKind::Keyword)
            .unwrap();
        assert!(!env.has_error);
        assert_eq!(env.total_count, 0);
        assert!(env.items.is_empty());
    }

    #[test]
    fn laws_listing_uses_distinct_counts() {
        let payload = json!({
            "total_count": 120,
            "count": 1,
            "laws": [{
                "law_info": {
                    "law_id": "335AC0000000105",
                    "law_num": "昭和三十五年法律第百五号",
                    "law_type": "Act",
                    "promulgation_date": "1960-06-25"
                },
                "revision_info": {
                    "law_title": "道路交通法",
                    "amendment_promulgate_date": "2024-06-21",
                    "category": "警察"
                }
            }]
        });
        let env = n()
            .normalize(&GatewayResponse::Data(payload), SearchKind::Laws)
            .unwrap();
        assert_eq!(env.total_count, 120);
        assert_eq!(env.returned_count, 1);
        let ResultItem::Law(l) = &env.items[0] else {
            panic!("expected listing");
        };
        assert_eq!(l.law_type.as_deref(), Some("Act"));
        assert_eq!(l.last_amendment_date.as_deref(), Some("2024-06-21"));
        assert_eq!(l.category.as_deref(), Some("警察"));
    }

    #[test]
    fn law_data_is_always_a_single_item() {
        let payload = json!({
            "law_info": {"law_id": "X1"},
            "revision_info": {"law_title": "テスト法"},
            "law_full_text": {"tag": "Law", "children": ["本文"]},
            "attached_files_info": {"image_data": []}
        });
        let env = n()
            .normalize(&GatewayResponse::Data(payload), SearchKind::LawData)
            .unwrap();
        assert_eq!((env.total_count, env.returned_count), (1, 1));
        let ResultItem::LawData(d) = &env.items[0] else {
            panic!("expected law data");
        };
        assert!(d.has_attachments);
        assert_eq!(d.law_full_text["children"][0], "本文");

        let env = n()
            .normalize(
                &GatewayResponse::Data(json!({"attached_files_info": null})),
                SearchKind::LawData,
            )
            .unwrap();
        let ResultItem::LawData(d) = &env.items[0] else {
            panic!("expected law data");
        };
        assert!(!d.has_attachments);
        assert_eq!(d.law_full_text, json!({}));
        assert_eq!(d.law_id, None);
    }

    #[test]
    fn malformed_payload_is_an_error_not_a_panic() {
        let r = n().normalize(
            &GatewayResponse::Data(json!({"items": "nope"})),
            SearchKind::Keyword,
        );
        assert!(r.is_err());
    }

    proptest! {
        #[test]
        fn stripped_text_never_contains_tags(s in "[a-z<>/ 幼児]{0,40}") {
            let out = n().strip_markup(&s);
            let re = Regex::new(r"<[^>]+>").unwrap();
            prop_assert!(!re.is_match(&out));
        }
    }
}
