//! Collaborators the dispatch workflow is driven through.
//!
//! Hosts provide implementations; the engine never reaches for ambient state.
use std::fmt;
use std::io;
use std::sync::Mutex;

use serde_json::{Map, Value};

/// UI-wide "operation in progress" indicator.
pub trait BlockingScope: Send + Sync {
    fn block(&self);
    fn unblock(&self);
}

/// Holds a [`BlockingScope`] until released or dropped, so every exit path unblocks once.
pub struct BlockGuard<'a> {
    scope: &'a dyn BlockingScope,
}

impl<'a> BlockGuard<'a> {
    pub fn acquire(scope: &'a dyn BlockingScope) -> Self {
        scope.block();
        Self { scope }
    }

    pub fn release(self) {
        drop(self);
    }
}

impl Drop for BlockGuard<'_> {
    fn drop(&mut self) {
        self.scope.unblock();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub title: Option<String>,
    pub sticky: bool,
    pub level: NotificationLevel,
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

pub trait DialogService: Send + Sync {
    fn show_error(&self, message: &str, traceback: Option<&str>);
}

/// Continuation run once the current view is closed or the report was handled.
pub type OnClose = Box<dyn FnOnce() + Send>;

pub trait ActionTrigger: Send + Sync {
    /// Closes the current view, then runs `on_close`.
    fn close_current_view(&self, on_close: Option<OnClose>);
}

/// Session and user level state of the client.
pub trait SessionContext: Send + Sync {
    fn user_context(&self) -> Map<String, Value>;
    fn csrf_token(&self) -> String;
    /// Direct printing enabled for the current user.
    fn printing_enabled(&self) -> bool;
    /// Direct printing enabled for the current company.
    fn company_enabled(&self) -> bool;
    fn update_context(&self, key: &str, value: Value);
    fn remove_from_context(&self, key: &str);
}

/// Per-workstation key/value preferences.
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> io::Result<()>;
    fn remove(&self, key: &str) -> io::Result<()>;
}

/// Session state held in memory, for hosts without a richer session object.
pub struct InMemorySession {
    context: Mutex<Map<String, Value>>,
    csrf_token: String,
    printing_enabled: bool,
    company_enabled: bool,
}

impl InMemorySession {
    pub fn new(csrf_token: impl Into<String>) -> Self {
        Self {
            context: Mutex::new(Map::new()),
            csrf_token: csrf_token.into(),
            printing_enabled: false,
            company_enabled: false,
        }
    }

    pub fn with_context(self, context: Map<String, Value>) -> Self {
        Self {
            context: Mutex::new(context),
            ..self
        }
    }

    pub fn with_printing_enabled(self, enabled: bool) -> Self {
        Self {
            printing_enabled: enabled,
            ..self
        }
    }

    pub fn with_company_enabled(self, enabled: bool) -> Self {
        Self {
            company_enabled: enabled,
            ..self
        }
    }
}

impl fmt::Debug for InMemorySession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemorySession")
            .field("context", &self.user_context())
            .field("printing_enabled", &self.printing_enabled)
            .field("company_enabled", &self.company_enabled)
            .finish_non_exhaustive()
    }
}

impl SessionContext for InMemorySession {
    fn user_context(&self) -> Map<String, Value> {
        match self.context.lock() {
            Ok(context) => context.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn csrf_token(&self) -> String {
        self.csrf_token.clone()
    }

    fn printing_enabled(&self) -> bool {
        self.printing_enabled
    }

    fn company_enabled(&self) -> bool {
        self.company_enabled
    }

    fn update_context(&self, key: &str, value: Value) {
        let mut context = match self.context.lock() {
            Ok(context) => context,
            Err(poisoned) => poisoned.into_inner(),
        };
        context.insert(key.to_string(), value);
    }

    fn remove_from_context(&self, key: &str) {
        let mut context = match self.context.lock() {
            Ok(context) => context,
            Err(poisoned) => poisoned.into_inner(),
        };
        context.remove(key);
    }
}
