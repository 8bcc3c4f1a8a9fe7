use std::fmt;
use std::sync::Arc;

use report_core::{build_report_url, DeliveryKind, ReportAction, ReportType};
use report_logging::{report_debug, report_info};

use crate::{
    ActionTrigger, BlockingScope, CapabilityChecker, DialogService, DispatchError,
    HttpTransport, Notifier, OnClose, PostActionRunner, PrintJobSubmitter, Routes,
    SessionContext,
};

/// Caller supplied options for one dispatch.
#[derive(Default)]
pub struct DispatchOptions {
    /// Force the download path.
    pub download: bool,
    pub on_close: Option<OnClose>,
}

impl fmt::Debug for DispatchOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchOptions")
            .field("download", &self.download)
            .field("on_close", &self.on_close.is_some())
            .finish()
    }
}

/// The collaborators a [`Dispatcher`] is driven through.
#[derive(Clone)]
pub struct Services {
    pub transport: Arc<dyn HttpTransport>,
    pub blocking: Arc<dyn BlockingScope>,
    pub notifier: Arc<dyn Notifier>,
    pub dialog: Arc<dyn DialogService>,
    pub actions: Arc<dyn ActionTrigger>,
    pub session: Arc<dyn SessionContext>,
}

/// Decides between printing and the default download for a report action.
pub struct Dispatcher {
    capability: Arc<CapabilityChecker>,
    submitter: PrintJobSubmitter,
    post_action: PostActionRunner,
    session: Arc<dyn SessionContext>,
    dialog: Arc<dyn DialogService>,
}

impl Dispatcher {
    pub fn new(services: Services, routes: Routes) -> Self {
        let capability = Arc::new(CapabilityChecker::new(
            services.transport.clone(),
            services.notifier.clone(),
            routes.capability.clone(),
        ));
        Self::with_capability_checker(services, routes, capability)
    }

    /// Uses an existing checker, so its cached state is shared with other owners.
    pub fn with_capability_checker(
        services: Services,
        routes: Routes,
        capability: Arc<CapabilityChecker>,
    ) -> Self {
        Self {
            capability,
            submitter: PrintJobSubmitter::new(
                services.transport,
                services.blocking,
                services.notifier,
                services.session.clone(),
                routes,
            ),
            post_action: PostActionRunner::new(services.actions),
            session: services.session,
            dialog: services.dialog,
        }
    }

    pub fn capability(&self) -> &Arc<CapabilityChecker> {
        &self.capability
    }

    /// `Ok(None)` means nothing was submitted and the host should fall back to
    /// its default download. `Ok(Some(accepted))` reports whether the backend
    /// took the job.
    pub async fn dispatch(
        &self,
        action: &ReportAction,
        options: DispatchOptions,
    ) -> Result<Option<bool>, DispatchError> {
        let download_only = options.download || action.context.download_only;
        if download_only {
            report_debug!("download requested for {}", action.report_name);
            return Ok(None);
        }

        let kind = match action.report_type {
            ReportType::Pdf => DeliveryKind::Pdf,
            ReportType::Text => DeliveryKind::Text,
            ReportType::Html | ReportType::Other => return Ok(None),
        };

        // A targeted printer is honoured even when printing is off for the user.
        if !self.session.printing_enabled() && action.context.printer_id.is_none() {
            report_debug!("printing not enabled; {} left to download", action.report_name);
            return Ok(None);
        }

        if kind == DeliveryKind::Pdf {
            let state = self.capability.check_state().await?;
            if !state.can_print() {
                report_info!("renderer state {} cannot print {}", state, action.report_name);
                return Ok(None);
            }
        }

        let url = build_report_url(action, kind, &self.session.user_context());
        let accepted = self.submitter.submit(action, &url).await?;
        if accepted {
            self.post_action.run(action, options.on_close);
        }
        Ok(Some(accepted))
    }

    /// Shows a dispatch error through the dialog collaborator.
    pub fn present(&self, err: &DispatchError) {
        present_error(self.dialog.as_ref(), err);
    }
}

pub fn present_error(dialog: &dyn DialogService, err: &DispatchError) {
    match err {
        DispatchError::Job(failure) => dialog.show_error(failure.message(), failure.details()),
        DispatchError::Transport(transport) => dialog.show_error(&transport.to_string(), None),
    }
}
