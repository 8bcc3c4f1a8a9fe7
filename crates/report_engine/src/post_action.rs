use std::sync::Arc;

use report_core::ReportAction;
use report_logging::report_debug;

use crate::{ActionTrigger, OnClose};

/// Runs the continuation of a successfully submitted job.
pub struct PostActionRunner {
    trigger: Arc<dyn ActionTrigger>,
}

impl PostActionRunner {
    pub fn new(trigger: Arc<dyn ActionTrigger>) -> Self {
        Self { trigger }
    }

    /// Closes the current view (handing it `on_close`) when the action asks for
    /// it, otherwise calls `on_close` directly. Never both.
    pub fn run(&self, action: &ReportAction, on_close: Option<OnClose>) {
        if action.close_on_report_download {
            report_debug!("closing current view after {}", action.report_name);
            self.trigger.close_current_view(on_close);
        } else if let Some(on_close) = on_close {
            on_close();
        }
    }
}
