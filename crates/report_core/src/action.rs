use std::fmt;
use std::str::FromStr;

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Database id of a record, printer or printer bin.
pub type RecordId = i64;

/// Report rendering engine named by an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum ReportType {
    #[serde(rename = "qweb-pdf")]
    Pdf,
    #[serde(rename = "qweb-text")]
    Text,
    #[serde(rename = "qweb-html")]
    Html,
    #[serde(other)]
    Other,
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportType::Pdf => write!(f, "qweb-pdf"),
            ReportType::Text => write!(f, "qweb-text"),
            ReportType::Html => write!(f, "qweb-html"),
            ReportType::Other => write!(f, "other"),
        }
    }
}

impl FromStr for ReportType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "qweb-pdf" => Ok(ReportType::Pdf),
            "qweb-text" => Ok(ReportType::Text),
            "qweb-html" => Ok(ReportType::Html),
            other => Err(format!("unsupported report type {other:?}")),
        }
    }
}

/// Context carried by a report action.
///
/// Keys the dispatcher reads are typed; everything else is kept verbatim in
/// `extra` so the context can be forwarded to the server unchanged.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ActionContext {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub active_ids: Vec<RecordId>,
    #[serde(
        default,
        deserialize_with = "unset_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub printer_id: Option<RecordId>,
    #[serde(
        default,
        deserialize_with = "unset_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub printer_bin: Option<RecordId>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub download_only: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// The server writes `false` for an unset relational field.
fn unset_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        Value::Null | Value::Bool(false) => Ok(None),
        value => serde_json::from_value(value).map(Some).map_err(D::Error::custom),
    }
}

/// A user request to render a report.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReportAction {
    pub report_name: String,
    pub report_type: ReportType,
    #[serde(default)]
    pub context: ActionContext,
    /// Wizard options; when non-empty they travel as a query string.
    #[serde(default, deserialize_with = "unset_as_none")]
    pub data: Option<Map<String, Value>>,
    #[serde(default)]
    pub close_on_report_download: bool,
}

impl ReportAction {
    pub fn new(report_name: impl Into<String>, report_type: ReportType) -> Self {
        Self {
            report_name: report_name.into(),
            report_type,
            context: ActionContext::default(),
            data: None,
            close_on_report_download: false,
        }
    }

    pub fn with_context(mut self, context: ActionContext) -> Self {
        self.context = context;
        self
    }

    pub fn with_data(mut self, data: Map<String, Value>) -> Self {
        self.data = Some(data);
        self
    }

    pub fn closing_on_download(mut self) -> Self {
        self.close_on_report_download = true;
        self
    }

    /// Wizard options, if any were supplied.
    pub fn wizard_options(&self) -> Option<&Map<String, Value>> {
        self.data.as_ref().filter(|data| !data.is_empty())
    }
}
