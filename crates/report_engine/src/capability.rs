use std::sync::{Arc, RwLock};

use report_core::CapabilityState;
use report_logging::{report_debug, report_info};
use serde_json::json;
use tokio::sync::OnceCell;

use crate::{HttpTransport, Notification, NotificationLevel, Notifier, TransportError};

const NOTIFICATION_TITLE: &str = "Report";

/// Single-flight, memoized lookup of the PDF renderer state.
///
/// The first caller issues the lookup; concurrent callers wait on the same
/// in-flight call and every later caller gets the stored value. A failed
/// lookup is not stored, so the next caller tries again.
pub struct CapabilityChecker {
    transport: Arc<dyn HttpTransport>,
    notifier: Arc<dyn Notifier>,
    route: String,
    cell: RwLock<Arc<OnceCell<CapabilityState>>>,
}

impl CapabilityChecker {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        notifier: Arc<dyn Notifier>,
        route: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            notifier,
            route: route.into(),
            cell: RwLock::new(Arc::new(OnceCell::new())),
        }
    }

    pub async fn check_state(&self) -> Result<CapabilityState, TransportError> {
        let cell = self.current_cell();
        let state = cell.get_or_try_init(|| self.lookup()).await?;
        Ok(*state)
    }

    /// The resolved state, if a lookup already completed.
    pub fn cached(&self) -> Option<CapabilityState> {
        self.current_cell().get().copied()
    }

    /// Forgets the resolved state; the next caller issues a fresh lookup.
    pub fn reset(&self) {
        let mut cell = match self.cell.write() {
            Ok(cell) => cell,
            Err(poisoned) => poisoned.into_inner(),
        };
        *cell = Arc::new(OnceCell::new());
    }

    fn current_cell(&self) -> Arc<OnceCell<CapabilityState>> {
        match self.cell.read() {
            Ok(cell) => Arc::clone(&cell),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    async fn lookup(&self) -> Result<CapabilityState, TransportError> {
        report_debug!("capability lookup issued route={}", self.route);
        let reply = self.transport.rpc(&self.route, json!({})).await?;
        let state = reply
            .as_str()
            .map(CapabilityState::from_token)
            .unwrap_or(CapabilityState::Unknown);
        report_info!("capability state resolved: {}", state);

        if let Some(message) = state.user_message() {
            self.notifier.notify(Notification {
                message: message.to_string(),
                title: Some(NOTIFICATION_TITLE.to_string()),
                sticky: true,
                level: NotificationLevel::Warning,
            });
        }
        Ok(state)
    }
}

impl std::fmt::Debug for CapabilityChecker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilityChecker")
            .field("route", &self.route)
            .field("cached", &self.cached())
            .finish_non_exhaustive()
    }
}
