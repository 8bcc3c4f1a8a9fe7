use ego_tree::NodeRef;
use report_core::JobResult;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;

/// Message used when a reply carries no structured error at all.
pub const UNCLASSIFIED_MESSAGE: &str = "Arbitrary Uncaught Exception";

/// Classifies print endpoint reply text. Total: every input maps to a variant.
pub fn classify(text: &str) -> JobResult {
    classify_inner(None, text)
}

/// Like [`classify`], with the HTTP status leading the debug text of unclassified errors.
pub fn classify_reply(status: u16, text: &str) -> JobResult {
    classify_inner(Some(status), text)
}

fn classify_inner(status: Option<u16>, text: &str) -> JobResult {
    if let Ok(parsed) = serde_json::from_str::<Value>(text) {
        if let Some(result) = classify_structured(&parsed) {
            return result;
        }
    }
    classify_document(status, text)
}

/// Structured replies: `{success, notify?, message, data?}`.
fn classify_structured(parsed: &Value) -> Option<JobResult> {
    let object = parsed.as_object()?;
    match object.get("success") {
        Some(Value::Bool(true)) => {
            if object.get("notify") == Some(&Value::Bool(true)) {
                Some(JobResult::Notify {
                    message: text_of(object.get("message")).unwrap_or_default(),
                    sticky: false,
                })
            } else {
                Some(JobResult::Proceed)
            }
        }
        Some(Value::Bool(false)) => Some(user_error(parsed)),
        _ => None,
    }
}

/// Server-rendered pages: the error may still be embedded as JSON in the body.
fn classify_document(status: Option<u16>, text: &str) -> JobResult {
    let document = Html::parse_document(text);
    let nodes = body_nodes(&document);

    let candidate = nodes.get(1).or_else(|| nodes.first());
    if let Some(parsed) = candidate.and_then(|text| serde_json::from_str::<Value>(text).ok()) {
        return user_error(&parsed);
    }

    let debug_text = status
        .map(|code| code.to_string())
        .into_iter()
        .chain(nodes.into_iter().take(2))
        .collect::<Vec<_>>()
        .join("\n");

    JobResult::UnclassifiedServerError {
        message: UNCLASSIFIED_MESSAGE.to_string(),
        debug_text,
    }
}

/// Text content of the body's element children, or of all its child nodes
/// when it has no elements (bare text or comments).
fn body_nodes(document: &Html) -> Vec<String> {
    let Some(body) = Selector::parse("body")
        .ok()
        .and_then(|selector| document.select(&selector).next())
    else {
        return Vec::new();
    };

    let elements = body
        .children()
        .filter_map(ElementRef::wrap)
        .map(|element| element.text().collect::<String>())
        .collect::<Vec<_>>();
    if !elements.is_empty() {
        return elements;
    }

    body.children().map(node_text).collect()
}

fn node_text(node: NodeRef<'_, Node>) -> String {
    match node.value() {
        Node::Text(text) => String::from(&**text),
        Node::Comment(comment) => String::from(&**comment),
        _ => ElementRef::wrap(node)
            .map(|element| element.text().collect())
            .unwrap_or_default(),
    }
}

fn user_error(parsed: &Value) -> JobResult {
    JobResult::UserError {
        message: text_of(parsed.get("message")).unwrap_or_default(),
        traceback: text_of(parsed.pointer("/data/debug")),
    }
}

fn text_of(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}
