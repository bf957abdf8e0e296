//! Host-boundary contracts for the upload pipeline.
//!
//! This module defines the traits the orchestrator depends on and the plain
//! data types that cross the boundary to a concrete transport. The traits are
//! annotated for `mockall` so tests can substitute deterministic
//! implementations via constructor injection instead of patching globals.
//!
//! - Implement [`Transport`] to plug in a new way of sending a collated
//!   multipart payload (HTTP client, in-memory fake, etc.).
//! - A [`TransportHandle`] represents one in-flight request and only needs to
//!   know how to abort itself.
//! - [`TransportSignal`]s flow back from the transport and are translated
//!   into lifecycle events by the orchestrator; the transport never talks to
//!   the event sink directly.

use std::sync::Arc;

use async_trait::async_trait;

use crate::form::FormPayload;

/// Uniform boxed error for transport seams.
pub type TransportError = Box<dyn std::error::Error + Send + Sync>;

/// A file picked for upload, as handed over by the host application.
///
/// `size` is carried separately from `data` because validation runs on the
/// declared size, while only concrete transports read the bytes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FileDescriptor {
    pub name: String,
    pub content_type: String,
    pub size: u64,
    pub data: Vec<u8>,
}

impl FileDescriptor {
    /// Build a descriptor from in-memory bytes, deriving `size` from them.
    pub fn new(
        name: impl Into<String>,
        content_type: impl Into<String>,
        data: Vec<u8>,
    ) -> Self {
        let size = data.len() as u64;
        Self {
            name: name.into(),
            content_type: content_type.into(),
            size,
            data,
        }
    }
}

/// Everything a transport needs to perform one upload request.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadRequest {
    /// Target URL; requests are always POST.
    pub url: String,
    /// Headers in the order they were configured.
    pub headers: Vec<(String, String)>,
    /// The collated (and possibly hook-rewritten) multipart payload.
    pub body: FormPayload,
}

/// Signals a transport reports back while a request is in flight.
#[derive(Debug, Clone)]
pub enum TransportSignal {
    /// Bytes-on-the-wire progress. `length_computable` mirrors whether the
    /// transport actually knows the total; when it does not, the signal is
    /// dropped rather than guessed at.
    Progress {
        length_computable: bool,
        loaded: f64,
        total: f64,
    },
    /// The request completed with a success status; payload is the response
    /// body (parsed JSON where possible).
    Success(serde_json::Value),
    /// The request failed at the transport level or with an error status.
    Fail(serde_json::Value),
}

/// Callback a transport invokes for every [`TransportSignal`].
pub type SignalSink = Arc<dyn Fn(TransportSignal) + Send + Sync>;

/// One live, abortable request.
pub trait TransportHandle: Send + Sync {
    /// Abort the in-flight request. Aborting is silent: no signal is
    /// reported for the torn-down request.
    fn abort(&self);
}

/// Sends collated payloads. `dispatch` returns as soon as the request is on
/// its way; completion and progress are reported through the signal sink.
#[cfg_attr(any(test, feature = "test-export-mocks"), mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Begin sending `request`, reporting lifecycle signals to `signals`.
    /// Returns a handle that can abort the request while it is in flight.
    async fn dispatch(
        &self,
        request: UploadRequest,
        signals: SignalSink,
    ) -> Result<Box<dyn TransportHandle>, TransportError>;
}
