//! Report engine: print dispatch workflow, transport and response classification.
mod capability;
mod classify;
mod decode;
mod dispatch;
mod post_action;
mod services;
mod submit;
mod transport;
mod types;
mod workstation;

pub use capability::CapabilityChecker;
pub use classify::{classify, classify_reply, UNCLASSIFIED_MESSAGE};
pub use decode::{decode_body, DecodeError, DecodedBody};
pub use dispatch::{present_error, DispatchOptions, Dispatcher, Services};
pub use post_action::PostActionRunner;
pub use services::{
    ActionTrigger, BlockGuard, BlockingScope, DialogService, InMemorySession, Notification,
    NotificationLevel, Notifier, OnClose, PreferenceStore, SessionContext,
};
pub use submit::PrintJobSubmitter;
pub use transport::{HttpTransport, ReqwestTransport, Routes, TransportSettings};
pub use types::{DispatchError, JobFailure, TextReply, TransportError, TransportFailure};
pub use workstation::{WorkstationResolver, WORKSTATION_CONTEXT_KEY, WORKSTATION_PREFERENCE_KEY};
