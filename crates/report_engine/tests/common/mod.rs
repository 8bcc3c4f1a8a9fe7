#![allow(dead_code)]

use std::collections::HashMap;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use report_core::RequestEnvelope;
use report_engine::{
    ActionTrigger, BlockingScope, DialogService, HttpTransport, InMemorySession, Notification,
    Notifier, OnClose, PreferenceStore, Routes, Services, TextReply, TransportError,
    TransportFailure,
};
use serde_json::{json, Value};

pub fn init_logging() {
    report_logging::initialize_for_tests();
}

#[derive(Default)]
pub struct RecordingBlocker {
    events: Mutex<Vec<&'static str>>,
}

impl RecordingBlocker {
    pub fn events(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().clone()
    }
}

impl BlockingScope for RecordingBlocker {
    fn block(&self) {
        self.events.lock().unwrap().push("block");
    }

    fn unblock(&self) {
        self.events.lock().unwrap().push("unblock");
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    notifications: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn take(&self) -> Vec<Notification> {
        self.notifications.lock().unwrap().drain(..).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.notifications.lock().unwrap().push(notification);
    }
}

#[derive(Default)]
pub struct RecordingDialog {
    shown: Mutex<Vec<(String, Option<String>)>>,
}

impl RecordingDialog {
    pub fn shown(&self) -> Vec<(String, Option<String>)> {
        self.shown.lock().unwrap().clone()
    }
}

impl DialogService for RecordingDialog {
    fn show_error(&self, message: &str, traceback: Option<&str>) {
        self.shown
            .lock()
            .unwrap()
            .push((message.to_string(), traceback.map(str::to_string)));
    }
}

#[derive(Default)]
pub struct RecordingTrigger {
    closes: AtomicUsize,
}

impl RecordingTrigger {
    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

impl ActionTrigger for RecordingTrigger {
    fn close_current_view(&self, on_close: Option<OnClose>) {
        self.closes.fetch_add(1, Ordering::SeqCst);
        if let Some(on_close) = on_close {
            on_close();
        }
    }
}

#[derive(Default)]
pub struct MemoryPreferences {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryPreferences {
    pub fn with(key: &str, value: &str) -> Self {
        let store = Self::default();
        store
            .values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        store
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> io::Result<()> {
        self.values.lock().unwrap().remove(key);
        Ok(())
    }
}

/// Transport answering from fixed replies and recording every call.
pub struct ScriptedTransport {
    routes: Routes,
    pub capability: Value,
    pub workstation_count: Value,
    pub check: Result<Value, TransportError>,
    pub print: Result<TextReply, TransportError>,
    pub rpc_delay: Duration,
    pub fail_rpc: bool,
    calls: Mutex<Vec<String>>,
    envelopes: Mutex<Vec<RequestEnvelope>>,
    rpc_params: Mutex<Vec<Value>>,
    rpc_count: AtomicUsize,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self {
            routes: Routes::default(),
            capability: json!("ok"),
            workstation_count: json!(1),
            check: Ok(json!(true)),
            print: Ok(TextReply {
                status: 200,
                body: r#"{"success": true}"#.to_string(),
            }),
            rpc_delay: Duration::ZERO,
            fail_rpc: false,
            calls: Mutex::new(Vec::new()),
            envelopes: Mutex::new(Vec::new()),
            rpc_params: Mutex::new(Vec::new()),
            rpc_count: AtomicUsize::new(0),
        }
    }

    pub fn with_capability(mut self, state: &str) -> Self {
        self.capability = json!(state);
        self
    }

    pub fn with_check(mut self, check: Value) -> Self {
        self.check = Ok(check);
        self
    }

    pub fn with_print_body(mut self, status: u16, body: &str) -> Self {
        self.print = Ok(TextReply {
            status,
            body: body.to_string(),
        });
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn envelopes(&self) -> Vec<RequestEnvelope> {
        self.envelopes.lock().unwrap().clone()
    }

    pub fn rpc_params(&self) -> Vec<Value> {
        self.rpc_params.lock().unwrap().clone()
    }

    pub fn rpc_count(&self) -> usize {
        self.rpc_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl HttpTransport for ScriptedTransport {
    async fn rpc(&self, route: &str, params: Value) -> Result<Value, TransportError> {
        self.rpc_count.fetch_add(1, Ordering::SeqCst);
        self.calls.lock().unwrap().push(route.to_string());
        self.rpc_params.lock().unwrap().push(params);
        if !self.rpc_delay.is_zero() {
            tokio::time::sleep(self.rpc_delay).await;
        }
        if self.fail_rpc {
            return Err(TransportError::new(TransportFailure::Network, "connection refused"));
        }
        if route == self.routes.workstation_lookup {
            Ok(self.workstation_count.clone())
        } else {
            Ok(self.capability.clone())
        }
    }

    async fn post_json(
        &self,
        route: &str,
        envelope: &RequestEnvelope,
    ) -> Result<Value, TransportError> {
        self.calls.lock().unwrap().push(route.to_string());
        self.envelopes.lock().unwrap().push(envelope.clone());
        self.check.clone()
    }

    async fn post_text(
        &self,
        route: &str,
        envelope: &RequestEnvelope,
    ) -> Result<TextReply, TransportError> {
        self.calls.lock().unwrap().push(route.to_string());
        self.envelopes.lock().unwrap().push(envelope.clone());
        self.print.clone()
    }
}

pub struct Fakes {
    pub transport: Arc<ScriptedTransport>,
    pub blocker: Arc<RecordingBlocker>,
    pub notifier: Arc<RecordingNotifier>,
    pub dialog: Arc<RecordingDialog>,
    pub trigger: Arc<RecordingTrigger>,
    pub session: Arc<InMemorySession>,
}

impl Fakes {
    pub fn new(transport: ScriptedTransport, session: InMemorySession) -> Self {
        Self {
            transport: Arc::new(transport),
            blocker: Arc::new(RecordingBlocker::default()),
            notifier: Arc::new(RecordingNotifier::default()),
            dialog: Arc::new(RecordingDialog::default()),
            trigger: Arc::new(RecordingTrigger::default()),
            session: Arc::new(session),
        }
    }

    pub fn services(&self) -> Services {
        Services {
            transport: self.transport.clone(),
            blocking: self.blocker.clone(),
            notifier: self.notifier.clone(),
            dialog: self.dialog.clone(),
            actions: self.trigger.clone(),
            session: self.session.clone(),
        }
    }
}

pub fn session() -> InMemorySession {
    InMemorySession::new("csrf-token").with_printing_enabled(true)
}
