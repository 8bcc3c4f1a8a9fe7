use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::{ActionContext, RecordId};

/// What the print backend needs to locate and route a rendered report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintJobPayload {
    pub url: String,
    pub report_kind: String,
    pub printer_id: Option<RecordId>,
    pub printer_bin: Option<RecordId>,
}

impl PrintJobPayload {
    /// Builds the payload for an already constructed report URL.
    ///
    /// The report kind is `qweb-` followed by the delivery segment of the path
    /// (`/report/<kind>/...`).
    pub fn new(url: impl Into<String>, context: &ActionContext) -> Self {
        let url = url.into();
        let segment = url.split('/').nth(2).unwrap_or_default();
        Self {
            report_kind: format!("qweb-{segment}"),
            url,
            printer_id: context.printer_id,
            printer_bin: context.printer_bin,
        }
    }

    /// Positional JSON array `[url, kind, printer, bin]` expected by the backend.
    pub fn to_data_json(&self) -> String {
        json!([self.url, self.report_kind, self.printer_id, self.printer_bin]).to_string()
    }

    pub fn envelope(&self, csrf_token: &str, session_context: &Map<String, Value>) -> RequestEnvelope {
        RequestEnvelope {
            csrf_token: csrf_token.to_string(),
            data: self.to_data_json(),
            context: Value::Object(session_context.clone()).to_string(),
        }
    }
}

/// Form body shared by the check and print endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestEnvelope {
    pub csrf_token: String,
    pub data: String,
    pub context: String,
}

impl RequestEnvelope {
    pub fn form_pairs(&self) -> [(&'static str, &str); 3] {
        [
            ("csrf_token", self.csrf_token.as_str()),
            ("data", self.data.as_str()),
            ("context", self.context.as_str()),
        ]
    }
}

/// Classified outcome of a print submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobResult {
    /// Accepted; the server asked for an informational message.
    Notify { message: String, sticky: bool },
    /// The server reported a domain error.
    UserError {
        message: String,
        traceback: Option<String>,
    },
    /// The server failed in a way only raw response text can describe.
    UnclassifiedServerError { message: String, debug_text: String },
    /// Accepted with nothing to show.
    Proceed,
}

impl JobResult {
    pub fn is_success(&self) -> bool {
        matches!(self, JobResult::Notify { .. } | JobResult::Proceed)
    }
}
