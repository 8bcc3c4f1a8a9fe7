use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};
use url::form_urlencoded;

use crate::ReportAction;

/// Output format requested from the report controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeliveryKind {
    Pdf,
    Text,
    Html,
}

impl DeliveryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryKind::Pdf => "pdf",
            DeliveryKind::Text => "text",
            DeliveryKind::Html => "html",
        }
    }
}

impl fmt::Display for DeliveryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeliveryKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pdf" => Ok(DeliveryKind::Pdf),
            "text" => Ok(DeliveryKind::Text),
            "html" => Ok(DeliveryKind::Html),
            other => Err(format!("unsupported delivery kind {other:?}")),
        }
    }
}

/// Builds the report fetch path: `/report/<kind>/<name>[/<ids>][?options=..&context=..]`.
///
/// Wizard options take precedence: when present the options and the action
/// context travel as a query string and the record ids are not appended.
/// Otherwise the active ids become a comma-joined path segment and, for html,
/// the session context is passed as a query parameter.
pub fn build_report_url(
    action: &ReportAction,
    kind: DeliveryKind,
    session_context: &Map<String, Value>,
) -> String {
    let mut url = format!("/report/{}/{}", kind.as_str(), action.report_name);

    if let Some(options) = action.wizard_options() {
        let options = encode_json(&Value::Object(options.clone()));
        let context = encode_json(&serialize_context(action));
        url.push_str(&format!("?options={options}&context={context}"));
        return url;
    }

    if !action.context.active_ids.is_empty() {
        let ids = action
            .context
            .active_ids
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        url.push('/');
        url.push_str(&ids);
    }

    if kind == DeliveryKind::Html {
        let context = encode_json(&Value::Object(session_context.clone()));
        url.push_str(&format!("?context={context}"));
    }

    url
}

fn serialize_context(action: &ReportAction) -> Value {
    // ActionContext only holds plain JSON data.
    serde_json::to_value(&action.context).unwrap_or_else(|_| Value::Object(Map::new()))
}

fn encode_json(value: &Value) -> String {
    form_urlencoded::byte_serialize(value.to_string().as_bytes()).collect()
}
