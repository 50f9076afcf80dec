use lawpipe_core::{ArticleRecord, LawNode};

const ARTICLE_TAG: &str = "Article";
const ARTICLE_NUM_ATTR: &str = "Num";

/// Collects every `Article` element in document (pre-order) order.
///
/// Descent continues below an emitted article, so nested articles are reported
/// too. Articles without a number or without any text are skipped.
pub fn extract_articles(root: &LawNode) -> Vec<ArticleRecord> {
    let mut out = Vec::new();
    walk(root, &mut out);
    out
}

/// Same as [`extract_articles`], starting at `law_full_text` of a `law_data` payload.
pub fn extract_articles_from_payload(payload: &serde_json::Value) -> Vec<ArticleRecord> {
    match payload.get("law_full_text") {
        Some(tree) => extract_articles(&LawNode::from_json(tree)),
        None => Vec::new(),
    }
}

fn walk(node: &LawNode, out: &mut Vec<ArticleRecord>) {
    let LawNode::Element(el) = node else {
        return;
    };
    if el.tag == ARTICLE_TAG {
        let num = el.attr.get(ARTICLE_NUM_ATTR).cloned().unwrap_or_default();
        let text = plain_text(node);
        if !num.is_empty() && !text.is_empty() {
            out.push(ArticleRecord {
                article_num: num,
                char_count: text.chars().count(),
                article_text: text,
            });
        }
    }
    for child in &el.children {
        walk(child, out);
    }
}

/// Concatenation of all descendant text leaves, in document order.
pub fn plain_text(node: &LawNode) -> String {
    let mut buf = String::new();
    push_text(node, &mut buf);
    buf
}

fn push_text(node: &LawNode, buf: &mut String) {
    match node {
        LawNode::Text(s) => buf.push_str(s),
        LawNode::Element(el) => {
            for child in &el.children {
                push_text(child, buf);
            }
        }
    }
}
