//! Lifecycle events and the injected event sink.

use std::sync::Arc;

use crate::contract::FileDescriptor;
use crate::validate::FileError;

/// Callback every lifecycle notification flows through. Exactly one call per
/// emission; no batching, no internal subscriber list.
pub type EventSink = Arc<dyn Fn(UploadEvent) + Send + Sync>;

/// Everything the uploader tells its caller about.
#[derive(Debug, Clone, PartialEq)]
pub enum UploadEvent {
    /// Validation failed; nothing was sent.
    Errors(Vec<FileError>),
    /// Validation passed; carries the full selection.
    Start(Vec<FileDescriptor>),
    /// A batch is about to be collated and sent.
    Before(Vec<FileDescriptor>),
    /// Integer percent of a batch's bytes on the wire.
    Progress(u32),
    /// A request completed; carries the response payload.
    Success(serde_json::Value),
    /// A request failed; carries the failure payload.
    Fail(serde_json::Value),
    /// `cancel_upload` ran; all retained handles were aborted.
    Cancelled,
}

impl UploadEvent {
    /// Stable wire name for logging and caller-side routing.
    pub fn name(&self) -> &'static str {
        match self {
            UploadEvent::Errors(_) => "lu:errors",
            UploadEvent::Start(_) => "lu:start",
            UploadEvent::Before(_) => "lu:before",
            UploadEvent::Progress(_) => "lu:progress",
            UploadEvent::Success(_) => "lu:success",
            UploadEvent::Fail(_) => "lu:fail",
            UploadEvent::Cancelled => "lu:cancelled",
        }
    }
}
