use std::sync::Arc;

use report_core::{JobResult, PrintJobPayload, ReportAction};
use report_logging::{report_debug, report_info, report_warn};
use serde_json::Value;

use crate::classify::classify_reply;
use crate::{
    BlockGuard, BlockingScope, DispatchError, HttpTransport, JobFailure, Notification,
    NotificationLevel, Notifier, Routes, SessionContext,
};

/// Two-phase submission: ask the backend whether it will take the job, then send it.
pub struct PrintJobSubmitter {
    transport: Arc<dyn HttpTransport>,
    blocking: Arc<dyn BlockingScope>,
    notifier: Arc<dyn Notifier>,
    session: Arc<dyn SessionContext>,
    routes: Routes,
}

impl PrintJobSubmitter {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        blocking: Arc<dyn BlockingScope>,
        notifier: Arc<dyn Notifier>,
        session: Arc<dyn SessionContext>,
        routes: Routes,
    ) -> Self {
        Self {
            transport,
            blocking,
            notifier,
            session,
            routes,
        }
    }

    /// Returns whether the job was accepted. A declined check is `Ok(false)`,
    /// not an error. The blocking scope is released before any error is returned.
    pub async fn submit(&self, action: &ReportAction, url: &str) -> Result<bool, DispatchError> {
        let guard = BlockGuard::acquire(self.blocking.as_ref());

        let payload = PrintJobPayload::new(url, &action.context);
        let envelope = payload.envelope(&self.session.csrf_token(), &self.session.user_context());
        report_debug!(
            "submitting {} kind={} printer={:?} bin={:?}",
            payload.url,
            payload.report_kind,
            payload.printer_id,
            payload.printer_bin
        );

        let check = self.transport.post_json(&self.routes.check, &envelope).await?;
        if check != Value::Bool(true) {
            report_info!("print check declined report={}", action.report_name);
            guard.release();
            return Ok(false);
        }

        let reply = self.transport.post_text(&self.routes.print, &envelope).await?;
        guard.release();

        let result = classify_reply(reply.status, &reply.body);
        report_debug!("print reply status={} classified={:?}", reply.status, result);
        match result {
            JobResult::Notify { message, sticky } => {
                self.notifier.notify(Notification {
                    message,
                    title: None,
                    sticky,
                    level: NotificationLevel::Info,
                });
                Ok(true)
            }
            JobResult::Proceed => Ok(true),
            JobResult::UserError { message, traceback } => {
                report_warn!("print rejected report={}: {}", action.report_name, message);
                Err(JobFailure::User { message, traceback }.into())
            }
            JobResult::UnclassifiedServerError {
                message,
                debug_text,
            } => {
                report_warn!(
                    "print failed report={} status={} without structured error",
                    action.report_name,
                    reply.status
                );
                Err(JobFailure::Unclassified {
                    message,
                    debug_text,
                }
                .into())
            }
        }
    }
}
