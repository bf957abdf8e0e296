#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use lite_uploader::config::UploadOptions;
use lite_uploader::contract::{FileDescriptor, TransportHandle};
use lite_uploader::events::{EventSink, UploadEvent};
use lite_uploader::uploader::FileSource;

/// Event sink that records every emission for later assertions.
pub fn collecting_sink() -> (EventSink, Arc<Mutex<Vec<UploadEvent>>>) {
    let events: Arc<Mutex<Vec<UploadEvent>>> = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&events);
    let sink: EventSink = Arc::new(move |event| recorded.lock().unwrap().push(event));
    (sink, events)
}

/// File source returning a fixed selection.
pub fn fixed_source(files: Vec<FileDescriptor>) -> FileSource {
    Arc::new(move || files.clone())
}

/// Transport handle that counts aborts across all handles of a test.
pub struct CountingHandle {
    aborts: Arc<AtomicUsize>,
}

impl CountingHandle {
    pub fn new(aborts: Arc<AtomicUsize>) -> Self {
        Self { aborts }
    }
}

impl TransportHandle for CountingHandle {
    fn abort(&self) {
        self.aborts.fetch_add(1, Ordering::SeqCst);
    }
}

/// Descriptor with a declared size but no backing bytes; validation and
/// orchestration never read the data.
pub fn file_with(name: &str, content_type: &str, size: u64) -> FileDescriptor {
    FileDescriptor {
        name: name.to_string(),
        content_type: content_type.to_string(),
        size,
        data: Vec::new(),
    }
}

/// Options that pass option validation.
pub fn valid_options() -> UploadOptions {
    UploadOptions {
        script: Some("https://example.com/upload".to_string()),
        reference: Some("attachments".to_string()),
        ..Default::default()
    }
}
