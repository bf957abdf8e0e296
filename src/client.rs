//! Default HTTP transport on top of `reqwest`.
//!
//! Each dispatched request runs as an abortable background task. File parts
//! stream their bytes in fixed-size chunks so byte-level progress can be
//! signalled against the summed size of the batch's files; response and
//! transport errors come back as `Fail` signals rather than `Err` returns,
//! keeping the dispatch contract non-blocking.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::{abortable, AbortHandle};
use futures::stream;
use tracing::{debug, error, info};

use crate::contract::{
    SignalSink, Transport, TransportError, TransportHandle, TransportSignal, UploadRequest,
};
use crate::form::FormPart;

/// Chunk size for streamed file parts. Small enough for useful progress
/// granularity, large enough to keep per-chunk overhead negligible.
const STREAM_CHUNK_SIZE: usize = 64 * 1024;

/// `Transport` implementation backed by a shared [`reqwest::Client`].
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a preconfigured client (timeouts, proxies, TLS settings).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

struct HttpHandle {
    abort_handle: AbortHandle,
}

impl TransportHandle for HttpHandle {
    fn abort(&self) {
        self.abort_handle.abort();
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn dispatch(
        &self,
        request: UploadRequest,
        signals: SignalSink,
    ) -> Result<Box<dyn TransportHandle>, TransportError> {
        let client = self.client.clone();
        let (task, abort_handle) = abortable(send_request(client, request, signals));
        tokio::spawn(task);
        Ok(Box::new(HttpHandle { abort_handle }))
    }
}

async fn send_request(client: reqwest::Client, request: UploadRequest, signals: SignalSink) {
    let total: u64 = request
        .body
        .parts()
        .iter()
        .filter_map(|(_, part)| match part {
            FormPart::File(file) => Some(file.size),
            FormPart::Field(_) => None,
        })
        .sum();
    let sent = Arc::new(AtomicU64::new(0));

    let mut form = reqwest::multipart::Form::new();
    for (name, part) in request.body.into_parts() {
        match part {
            FormPart::Field(value) => {
                form = form.text(name, value);
            }
            FormPart::File(file) => {
                let body = reqwest::Body::wrap_stream(progress_stream(
                    file.data,
                    total,
                    Arc::clone(&sent),
                    Arc::clone(&signals),
                ));
                let mut file_part = reqwest::multipart::Part::stream_with_length(body, file.size)
                    .file_name(file.name.clone());
                if !file.content_type.is_empty() {
                    file_part = match file_part.mime_str(&file.content_type) {
                        Ok(p) => p,
                        Err(e) => {
                            error!(file = %file.name, error = %e, "invalid content type");
                            signals(TransportSignal::Fail(serde_json::json!({
                                "error": e.to_string(),
                            })));
                            return;
                        }
                    };
                }
                form = form.part(name, file_part);
            }
        }
    }

    let mut builder = client.post(&request.url).multipart(form);
    for (key, value) in &request.headers {
        builder = builder.header(key.as_str(), value.as_str());
    }

    debug!(url = %request.url, "sending multipart request");
    match builder.send().await {
        Ok(response) if response.status().is_success() => {
            info!(url = %request.url, status = %response.status(), "upload succeeded");
            signals(TransportSignal::Success(response_payload(response).await));
        }
        Ok(response) => {
            error!(url = %request.url, status = %response.status(), "upload failed");
            signals(TransportSignal::Fail(response_payload(response).await));
        }
        Err(e) => {
            error!(url = %request.url, error = %e, "request error");
            signals(TransportSignal::Fail(serde_json::json!({
                "error": e.to_string(),
            })));
        }
    }
}

/// Stream a file's bytes in chunks, signalling cumulative progress across
/// the whole batch as each chunk is pulled onto the wire.
fn progress_stream(
    data: Vec<u8>,
    total: u64,
    sent: Arc<AtomicU64>,
    signals: SignalSink,
) -> impl futures::Stream<Item = Result<Vec<u8>, std::io::Error>> + Send {
    let chunks: Vec<Vec<u8>> = data.chunks(STREAM_CHUNK_SIZE).map(<[u8]>::to_vec).collect();
    stream::iter(chunks.into_iter().map(move |chunk| {
        let loaded = sent.fetch_add(chunk.len() as u64, Ordering::Relaxed) + chunk.len() as u64;
        signals(TransportSignal::Progress {
            length_computable: total > 0,
            loaded: loaded as f64,
            total: total as f64,
        });
        Ok(chunk)
    }))
}

/// Parse the response body as JSON where possible, falling back to a small
/// object carrying the status and raw text.
async fn response_payload(response: reqwest::Response) -> serde_json::Value {
    let status = response.status().as_u16();
    let text = response.text().await.unwrap_or_default();
    serde_json::from_str(&text).unwrap_or_else(|_| {
        serde_json::json!({
            "status": status,
            "body": text,
        })
    })
}
