//! Colloquial → statutory vocabulary, plus the age brackets statutes use.
//!
//! Laws rarely say "シートベルト" or "子供"; keyword search only hits when the
//! query uses the statutory wording. Entries are checked in table order.

use lawpipe_core::{AgeCategoryMatch, TermExpansion, TermMatch};

type Entry = (&'static str, &'static [&'static str]);

pub const TERM_DICTIONARY: &[Entry] = &[
    // traffic
    ("シートベルト", &["座席ベルト", "安全ベルト"]),
    ("チャイルドシート", &["幼児用補助装置", "乳児用補助装置"]),
    ("車", &["自動車", "車両", "軽車両"]),
    ("バイク", &["自動二輪車", "原動機付自転車", "二輪自動車"]),
    ("自転車", &["自転車", "軽車両"]),
    ("免許", &["運転免許", "運転免許証"]),
    ("飲酒運転", &["酒気帯び運転", "酒酔い運転"]),
    // people, age
    ("子供", &["児童", "幼児", "乳児", "少年", "未成年者"]),
    ("赤ちゃん", &["乳児", "乳幼児"]),
    ("幼児", &["幼児"]),
    ("児童", &["児童", "学童"]),
    ("未成年", &["未成年者", "年少者"]),
    ("お年寄り", &["高齢者", "老人", "老齢者"]),
    ("障害者", &["障害者", "身体障害者", "知的障害者", "精神障害者"]),
    // employment
    ("会社", &["事業者", "使用者", "事業主"]),
    ("社員", &["労働者", "従業員", "被用者"]),
    ("パート", &["短時間労働者", "パートタイム労働者"]),
    ("アルバイト", &["短時間労働者", "有期雇用労働者"]),
    ("派遣", &["派遣労働者", "派遣労働"]),
    ("クビ", &["解雇", "雇止め"]),
    ("残業", &["時間外労働", "時間外勤務"]),
    ("有給", &["年次有給休暇", "有給休暇"]),
    ("育休", &["育児休業", "育児休暇"]),
    ("産休", &["産前産後休業", "産前休暇", "産後休暇"]),
    // tax
    ("税金", &["租税", "税", "国税", "地方税"]),
    ("所得税", &["所得税"]),
    ("住民税", &["地方税", "住民税", "市町村民税", "道府県民税"]),
    ("消費税", &["消費税"]),
    ("控除", &["控除", "所得控除", "税額控除"]),
    ("確定申告", &["確定申告", "申告納税"]),
    ("年末調整", &["年末調整"]),
    ("相続", &["相続", "遺産"]),
    ("贈与", &["贈与"]),
    // social insurance
    ("健康保険", &["健康保険", "医療保険"]),
    ("年金", &["年金", "厚生年金", "国民年金"]),
    ("失業保険", &["雇用保険", "失業等給付"]),
    ("労災", &["労働者災害補償保険", "労災保険"]),
    ("介護保険", &["介護保険"]),
    ("生活保護", &["生活保護", "被保護者"]),
    // housing
    ("家", &["住宅", "建築物", "建物"]),
    ("マンション", &["共同住宅", "集合住宅", "区分所有建物"]),
    ("アパート", &["共同住宅", "賃貸住宅"]),
    ("賃貸", &["賃貸借", "借家", "借地"]),
    ("敷金", &["敷金", "保証金"]),
    ("礼金", &["権利金"]),
    ("ローン", &["住宅ローン", "借入金", "貸付金"]),
    // family
    ("結婚", &["婚姻", "結婚"]),
    ("離婚", &["離婚"]),
    ("養子", &["養子", "養子縁組"]),
    ("親権", &["親権"]),
    ("扶養", &["扶養", "扶養義務"]),
    ("遺言", &["遺言", "遺言書"]),
    // procedure
    ("届出", &["届出", "届け出", "届"]),
    ("申請", &["申請", "請求"]),
    ("届け", &["届", "届出"]),
    ("パスポート", &["旅券"]),
    ("住民票", &["住民票", "住民基本台帳"]),
    ("戸籍", &["戸籍"]),
    ("マイナンバー", &["個人番号", "番号法"]),
];

#[derive(Debug, Clone, Copy)]
pub struct AgeCategory {
    pub name: &'static str,
    pub min_age: u32,
    /// Inclusive. `None` is open-ended.
    pub max_age: Option<u32>,
    pub laws: &'static [&'static str],
}

impl AgeCategory {
    pub fn contains(&self, age: u32) -> bool {
        age >= self.min_age && self.max_age.map_or(true, |max| age <= max)
    }
}

pub const AGE_CATEGORIES: &[AgeCategory] = &[
    AgeCategory { name: "乳児", min_age: 0, max_age: Some(0), laws: &["児童福祉法"] },
    AgeCategory { name: "幼児", min_age: 1, max_age: Some(5), laws: &["児童福祉法", "学校教育法"] },
    AgeCategory { name: "児童", min_age: 6, max_age: Some(17), laws: &["児童福祉法", "労働基準法"] },
    AgeCategory { name: "未成年者", min_age: 0, max_age: Some(17), laws: &["民法"] },
    AgeCategory { name: "成年", min_age: 18, max_age: None, laws: &["民法"] },
    AgeCategory { name: "年少者", min_age: 0, max_age: Some(17), laws: &["労働基準法"] },
    AgeCategory { name: "高齢者", min_age: 65, max_age: None, laws: &["高齢者雇用安定法", "介護保険法"] },
    AgeCategory { name: "後期高齢者", min_age: 75, max_age: None, laws: &["高齢者医療確保法"] },
];

fn owned(xs: &[&str]) -> Vec<String> {
    xs.iter().map(|s| s.to_string()).collect()
}

/// Exact entry first; otherwise every entry whose key contains or is contained
/// in `term` (deduplicated, table order); otherwise the term itself.
pub fn translate(term: &str) -> TermExpansion {
    let term = term.trim();
    if let Some((_, legal)) = TERM_DICTIONARY.iter().find(|(k, _)| *k == term) {
        return TermExpansion {
            term: term.to_string(),
            legal_terms: owned(legal),
            matched: TermMatch::Exact,
        };
    }

    let mut legal_terms: Vec<String> = Vec::new();
    // An empty term is a substring of every key.
    if !term.is_empty() {
        for (key, values) in TERM_DICTIONARY {
            if term.contains(key) || key.contains(term) {
                for v in *values {
                    if !legal_terms.iter().any(|x| x == v) {
                        legal_terms.push(v.to_string());
                    }
                }
            }
        }
    }

    if legal_terms.is_empty() {
        TermExpansion {
            term: term.to_string(),
            legal_terms: vec![term.to_string()],
            matched: TermMatch::None,
        }
    } else {
        TermExpansion {
            term: term.to_string(),
            legal_terms,
            matched: TermMatch::Partial,
        }
    }
}

/// Search terms for a free-form query: the query itself, then its statutory
/// equivalents, without repeats.
pub fn expand_query(query: &str) -> (TermExpansion, Vec<String>) {
    let t = translate(query);
    let mut terms = vec![t.term.clone()];
    for x in &t.legal_terms {
        if !terms.contains(x) {
            terms.push(x.clone());
        }
    }
    (t, terms)
}

/// One-line legal standing for an age.
pub fn age_summary(age: u32) -> &'static str {
    if age < 18 {
        "未成年者として、労働基準法による保護や民法上の制限があります。"
    } else if age >= 65 {
        "高齢者として、介護保険法や高齢者雇用安定法の適用があります。"
    } else {
        "成年として、一般的な法律が適用されます。"
    }
}

pub fn age_categories(age: u32) -> Vec<AgeCategoryMatch> {
    AGE_CATEGORIES
        .iter()
        .filter(|c| c.contains(age))
        .map(|c| AgeCategoryMatch {
            category: c.name.to_string(),
            min_age: c.min_age,
            max_age: c.max_age,
            laws: owned(c.laws),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn exact_entry_wins_over_partial() {
        let t = translate("車");
        assert_eq!(t.matched, TermMatch::Exact);
        assert_eq!(t.legal_terms, vec!["自動車", "車両", "軽車両"]);
    }

    #[test]
    fn partial_matches_both_directions_deduplicated() {
        // "チャイルドシートの義務" contains a key.
        let t = translate("チャイルドシートの義務");
        assert_eq!(t.matched, TermMatch::Partial);
        assert_eq!(t.legal_terms, vec!["幼児用補助装置", "乳児用補助装置"]);

        // "自動車" contains the key "車" but not "自転車".
        let t = translate("自動車");
        assert_eq!(t.matched, TermMatch::Partial);
        assert_eq!(t.legal_terms, vec!["自動車", "車両", "軽車両"]);

        // "届" is inside both "届出" and "届け"; shared outputs appear once.
        let t = translate("届");
        assert_eq!(t.legal_terms, vec!["届出", "届け出", "届"]);
    }

    #[test]
    fn unknown_and_empty_terms_pass_through() {
        let t = translate("量子コンピュータ");
        assert_eq!(t.matched, TermMatch::None);
        assert_eq!(t.legal_terms, vec!["量子コンピュータ"]);

        let t = translate("  ");
        assert_eq!(t.matched, TermMatch::None);
        assert_eq!(t.legal_terms, vec![""]);
    }

    #[test]
    fn six_year_old_is_a_child_and_a_minor() {
        let names: Vec<String> = age_categories(6).into_iter().map(|c| c.category).collect();
        assert_eq!(names, vec!["児童", "未成年者", "年少者"]);
    }

    #[test]
    fn open_ended_brackets() {
        let names: Vec<String> = age_categories(80).into_iter().map(|c| c.category).collect();
        assert_eq!(names, vec!["成年", "高齢者", "後期高齢者"]);
        let m = &age_categories(18)[0];
        assert_eq!(m.category, "成年");
        assert_eq!(m.max_age, None);
    }

    #[test]
    fn newborn_is_an_infant() {
        let names: Vec<String> = age_categories(0).into_iter().map(|c| c.category).collect();
        assert_eq!(names, vec!["乳児", "未成年者", "年少者"]);
    }

    #[test]
    fn expansion_puts_the_query_first_without_repeats() {
        let (t, terms) = expand_query(" チャイルドシート ");
        assert_eq!(t.matched, TermMatch::Exact);
        assert_eq!(terms, vec!["チャイルドシート", "幼児用補助装置", "乳児用補助装置"]);

        // "自転車" maps onto itself first.
        let (_, terms) = expand_query("自転車");
        assert_eq!(terms, vec!["自転車", "軽車両"]);

        let (t, terms) = expand_query("量子コンピュータ");
        assert_eq!(t.matched, TermMatch::None);
        assert_eq!(terms, vec!["量子コンピュータ"]);
    }

    #[test]
    fn summary_boundaries() {
        assert!(age_summary(17).starts_with("未成年者"));
        assert!(age_summary(18).starts_with("成年"));
        assert!(age_summary(64).starts_with("成年"));
        assert!(age_summary(65).starts_with("高齢者"));
    }

    proptest! {
        #[test]
        fn translation_is_never_empty(term in "[ぁ-んァ-ヶ一-龥a-z ]{0,8}") {
            let t = translate(&term);
            prop_assert!(!t.legal_terms.is_empty());
            let mut seen = std::collections::HashSet::new();
            for x in &t.legal_terms {
                prop_assert!(seen.insert(x.clone()), "duplicate {}", x);
            }
        }

        #[test]
        fn age_matches_contain_the_age(age in 0u32..130) {
            for m in age_categories(age) {
                prop_assert!(m.min_age <= age);
                prop_assert!(m.max_age.map_or(true, |max| age <= max));
            }
        }
    }
}
