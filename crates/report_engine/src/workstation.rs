use std::io;
use std::sync::Arc;

use report_core::RecordId;
use report_logging::{report_info, report_warn};
use serde_json::json;

use crate::{HttpTransport, PreferenceStore, SessionContext, TransportError};

/// Preference key holding this machine's workstation id.
pub const WORKSTATION_PREFERENCE_KEY: &str = "printnode_base.workstation_id";
/// Session context key the backend reads to pick workstation printers.
pub const WORKSTATION_CONTEXT_KEY: &str = "printnode_workstation_id";

const WORKSTATION_MODEL: &str = "printnode.workstation";

/// Carries the locally stored workstation id into the session context.
pub struct WorkstationResolver {
    transport: Arc<dyn HttpTransport>,
    session: Arc<dyn SessionContext>,
    preferences: Arc<dyn PreferenceStore>,
    route: String,
}

impl WorkstationResolver {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        session: Arc<dyn SessionContext>,
        preferences: Arc<dyn PreferenceStore>,
        route: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            session,
            preferences,
            route: route.into(),
        }
    }

    /// The stored id, unvalidated.
    pub fn stored(&self) -> Option<String> {
        self.preferences.get(WORKSTATION_PREFERENCE_KEY)
    }

    /// Validates the stored id against the backend and, if the workstation
    /// exists, puts it in the session context.
    pub async fn resolve(&self) -> Result<Option<RecordId>, TransportError> {
        if !self.session.company_enabled() {
            return Ok(None);
        }
        let Some(raw) = self.stored() else {
            return Ok(None);
        };
        let Some(id) = leading_record_id(&raw) else {
            report_warn!("ignoring stored workstation id {:?}", raw);
            return Ok(None);
        };

        let params = json!({
            "model": WORKSTATION_MODEL,
            "method": "search_count",
            "args": [[["id", "=", id]]],
            "kwargs": {},
        });
        let count = self.transport.rpc(&self.route, params).await?;
        if count.as_u64().unwrap_or(0) == 0 {
            report_warn!("workstation with id {} was not found", id);
            return Ok(None);
        }

        self.session.update_context(WORKSTATION_CONTEXT_KEY, json!(id));
        report_info!("workstation {} set in session context", id);
        Ok(Some(id))
    }

    /// Stores or clears the workstation choice and mirrors it in the session context.
    pub fn select(&self, id: Option<RecordId>) -> io::Result<()> {
        match id {
            Some(id) => {
                self.preferences
                    .set(WORKSTATION_PREFERENCE_KEY, &id.to_string())?;
                self.session.update_context(WORKSTATION_CONTEXT_KEY, json!(id));
            }
            None => {
                self.preferences.remove(WORKSTATION_PREFERENCE_KEY)?;
                self.session.remove_from_context(WORKSTATION_CONTEXT_KEY);
            }
        }
        Ok(())
    }
}

/// Reads the integer at the start of `raw`, ignoring anything after it.
fn leading_record_id(raw: &str) -> Option<RecordId> {
    let trimmed = raw.trim_start();
    let digits_start = usize::from(trimmed.starts_with(['-', '+']));
    let digits_end = trimmed[digits_start..]
        .find(|c: char| !c.is_ascii_digit())
        .map_or(trimmed.len(), |offset| digits_start + offset);
    trimmed[..digits_end].parse().ok()
}
