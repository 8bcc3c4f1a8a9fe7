//! Report core: pure data model and URL construction for report dispatch.
mod action;
mod capability;
mod job;
mod report_url;

pub use action::{ActionContext, RecordId, ReportAction, ReportType};
pub use capability::CapabilityState;
pub use job::{JobResult, PrintJobPayload, RequestEnvelope};
pub use report_url::{build_report_url, DeliveryKind};
