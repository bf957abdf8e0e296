//! The upload orchestrator: validate → plan → collate → hook → dispatch,
//! emitting a lifecycle event at every boundary.
//!
//! [`LiteUploader`] owns no networking of its own. It is constructed from
//! four injected collaborators: resolved [`UploadOptions`], a file-source
//! accessor, an event sink, and a [`Transport`]. Tests drive it with a mock
//! transport and a collecting sink; production code pairs it with
//! [`crate::client::HttpTransport`].
//!
//! # Event sequence
//! A successful run emits `start`, then per batch `before`, then whatever
//! `progress`/`success`/`fail` the transport's signals translate to.
//! Validation failures emit a single `errors` event and stop before any
//! request is built. An empty selection emits nothing at all.

use std::sync::{Arc, Mutex};

use futures::future::join_all;
use tracing::{debug, error, info, warn};

use crate::batch;
use crate::config::{ParamValue, UploadOptions};
use crate::contract::{
    FileDescriptor, SignalSink, Transport, TransportHandle, TransportSignal, UploadRequest,
};
use crate::events::{EventSink, UploadEvent};
use crate::form;
use crate::validate;

/// Zero-argument accessor returning the current file selection. Read fresh
/// on every upload invocation, never cached.
pub type FileSource = Arc<dyn Fn() -> Vec<FileDescriptor> + Send + Sync>;

pub struct LiteUploader {
    options: UploadOptions,
    file_source: FileSource,
    event_sink: EventSink,
    transport: Arc<dyn Transport>,
    /// Handles for the in-flight upload, append-only until the next
    /// invocation restarts the collection.
    handles: Mutex<Vec<Box<dyn TransportHandle>>>,
}

impl LiteUploader {
    pub fn new(
        options: UploadOptions,
        file_source: FileSource,
        event_sink: EventSink,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            options,
            file_source,
            event_sink,
            transport,
            handles: Mutex::new(Vec::new()),
        }
    }

    pub fn options(&self) -> &UploadOptions {
        &self.options
    }

    /// Number of transport handles retained for the current upload.
    pub fn handle_count(&self) -> usize {
        self.handles.lock().unwrap().len()
    }

    /// Merge an extra form field into the configured params, overwriting on
    /// key collision.
    pub fn add_param(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        self.options.params.insert(key, value);
    }

    /// Read the selection from the injected accessor and upload it.
    pub async fn start_upload(&self) {
        let files = (self.file_source)();
        self.start_upload_with_files(files).await;
    }

    /// Upload a selection supplied directly, bypassing the accessor.
    pub async fn start_upload_with_files(&self, files: Vec<FileDescriptor>) {
        if files.is_empty() {
            debug!("empty file selection, nothing to upload");
            return;
        }

        // A new invocation restarts the handle collection.
        self.handles.lock().unwrap().clear();

        if let Some(errors) = validate::validate_options(&self.options) {
            warn!(count = errors.len(), "option validation failed");
            self.emit(UploadEvent::Errors(errors));
            return;
        }
        if let Some(errors) = validate::validate_files(&self.options.rules, &files) {
            warn!(count = errors.len(), "file validation failed");
            self.emit(UploadEvent::Errors(errors));
            return;
        }

        info!(files = files.len(), "starting upload");
        self.emit(UploadEvent::Start(files.clone()));

        let batches = batch::plan(files, self.options.single_file_uploads);
        // Batches are driven concurrently: one batch's send does not wait
        // for another's pre-flight hook to settle.
        join_all(batches.into_iter().map(|b| self.upload_batch(b))).await;
    }

    /// Abort every retained handle, then emit exactly one `cancelled` event.
    /// The collection itself is left alone.
    pub fn cancel_upload(&self) {
        {
            let handles = self.handles.lock().unwrap();
            info!(handles = handles.len(), "cancelling upload");
            for handle in handles.iter() {
                handle.abort();
            }
        }
        self.emit(UploadEvent::Cancelled);
    }

    /// Pre-upload step for one batch: `before` event, collation, the one
    /// true suspension point (the pre-flight hook), then dispatch.
    async fn upload_batch(&self, files: Vec<FileDescriptor>) {
        self.emit(UploadEvent::Before(files.clone()));

        let reference = self.options.reference.as_deref().unwrap_or_default();
        let payload = form::collate(&self.options.params, reference, &files);

        let payload = match (self.options.before_request)(files, payload).await {
            Ok(resolved) => resolved,
            Err(e) => {
                // A rejected hook vetoes this batch's send. The rejection is
                // not surfaced as an event, matching the original contract.
                warn!(error = %e, "before_request rejected, batch not sent");
                return;
            }
        };

        let request = UploadRequest {
            url: self.options.script.clone().unwrap_or_default(),
            headers: self.options.headers.clone(),
            body: payload,
        };

        debug!(url = %request.url, parts = request.body.len(), "dispatching batch");
        match self.transport.dispatch(request, self.signal_sink()).await {
            Ok(handle) => self.handles.lock().unwrap().push(handle),
            Err(e) => {
                error!(error = %e, "transport dispatch failed");
                self.emit(UploadEvent::Fail(serde_json::Value::String(e.to_string())));
            }
        }
    }

    /// Translate transport signals into lifecycle events. Progress without a
    /// computable total emits nothing.
    fn signal_sink(&self) -> SignalSink {
        let event_sink = Arc::clone(&self.event_sink);
        Arc::new(move |signal| match signal {
            TransportSignal::Progress {
                length_computable,
                loaded,
                total,
            } => {
                if length_computable && total > 0.0 {
                    let percent = (loaded / total * 100.0).floor() as u32;
                    event_sink(UploadEvent::Progress(percent));
                }
            }
            TransportSignal::Success(payload) => event_sink(UploadEvent::Success(payload)),
            TransportSignal::Fail(payload) => event_sink(UploadEvent::Fail(payload)),
        })
    }

    fn emit(&self, event: UploadEvent) {
        debug!(event = event.name(), "emitting");
        (self.event_sink)(event);
    }
}
