use std::sync::atomic::{AtomicUsize, Ordering};

use report_engine::{
    ActionTrigger, BlockingScope, DialogService, Notification, NotificationLevel, Notifier,
    OnClose,
};
use report_logging::{report_debug, report_info, report_warn};

/// Terminal stand-ins for the UI collaborators.
#[derive(Debug, Default)]
pub struct ConsoleBlocking {
    depth: AtomicUsize,
}

impl BlockingScope for ConsoleBlocking {
    fn block(&self) {
        let depth = self.depth.fetch_add(1, Ordering::SeqCst) + 1;
        report_debug!("busy (depth {})", depth);
    }

    fn unblock(&self) {
        let previous = self.depth.fetch_sub(1, Ordering::SeqCst);
        if previous == 0 {
            self.depth.store(0, Ordering::SeqCst);
            report_warn!("unblock without matching block");
            return;
        }
        report_debug!("idle (depth {})", previous - 1);
    }
}

#[derive(Debug, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        let tag = match notification.level {
            NotificationLevel::Info => "info",
            NotificationLevel::Warning => "warning",
        };
        match notification.title {
            Some(title) => println!("[{tag}] {title}: {}", notification.message),
            None => println!("[{tag}] {}", notification.message),
        }
    }
}

#[derive(Debug, Default)]
pub struct ConsoleDialog;

impl DialogService for ConsoleDialog {
    fn show_error(&self, message: &str, traceback: Option<&str>) {
        eprintln!("error: {message}");
        if let Some(traceback) = traceback.filter(|text| !text.is_empty()) {
            eprintln!("{traceback}");
        }
    }
}

#[derive(Debug, Default)]
pub struct ConsoleActions;

impl ActionTrigger for ConsoleActions {
    fn close_current_view(&self, on_close: Option<OnClose>) {
        report_info!("closing current view");
        if let Some(on_close) = on_close {
            on_close();
        }
    }
}
