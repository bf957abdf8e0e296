//! Upload configuration: option resolution, rules and the pre-flight hook.

use std::fmt;
use std::sync::Arc;

use futures::future::{self, BoxFuture, FutureExt};

use crate::contract::{FileDescriptor, TransportError};
use crate::form::FormPayload;

/// Error a [`BeforeRequestHook`] rejects with. The orchestrator swallows it
/// after logging, so implementors only need a message.
pub type BeforeRequestError = TransportError;

/// Async pre-flight hook invoked with `(batch, payload)` before each request.
/// Resolving yields the payload to send (possibly rewritten); rejecting
/// vetoes the send for that batch.
pub type BeforeRequestHook = Arc<
    dyn Fn(
            Vec<FileDescriptor>,
            FormPayload,
        ) -> BoxFuture<'static, Result<FormPayload, BeforeRequestError>>
        + Send
        + Sync,
>;

/// The identity hook: resolves to the payload argument unchanged.
pub fn default_before_request() -> BeforeRequestHook {
    Arc::new(|_files, payload| future::ready(Ok(payload)).boxed())
}

/// Per-file constraints checked before any request is built.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UploadRules {
    /// Comma-separated MIME patterns, e.g. `"image/jpeg,video/*"`.
    pub allowed_file_types: Option<String>,
    /// Maximum file size in bytes; files strictly larger fail.
    pub max_size: Option<u64>,
}

/// A string-or-number parameter value, matching what multipart form fields
/// accept from callers.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Text(String),
    Number(i64),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Text(s) => f.write_str(s),
            ParamValue::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::Text(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        ParamValue::Text(s)
    }
}

impl From<i64> for ParamValue {
    fn from(n: i64) -> Self {
        ParamValue::Number(n)
    }
}

/// An insertion-ordered string map. Form fields must be appended in the
/// order the caller declared them, so a plain hash map will not do.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParamMap {
    entries: Vec<(String, ParamValue)>,
}

impl ParamMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite. Overwriting keeps the key's original position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for ParamMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = ParamMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

/// Resolved upload configuration. `Default` fills every documented default,
/// so callers set only what they need:
///
/// ```
/// use lite_uploader::config::UploadOptions;
///
/// let options = UploadOptions {
///     script: Some("https://example.com/upload".into()),
///     reference: Some("attachments".into()),
///     ..Default::default()
/// };
/// assert!(!options.single_file_uploads);
/// ```
#[derive(Clone)]
pub struct UploadOptions {
    /// Endpoint URL the upload is POSTed to.
    pub script: Option<String>,
    /// Form field name the batch's files are attached under.
    pub reference: Option<String>,
    /// Request headers, applied in order.
    pub headers: Vec<(String, String)>,
    /// Extra form fields appended before the files.
    pub params: ParamMap,
    pub rules: UploadRules,
    /// When true, every file goes out as its own request.
    pub single_file_uploads: bool,
    pub before_request: BeforeRequestHook,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            script: None,
            reference: None,
            headers: Vec::new(),
            params: ParamMap::new(),
            rules: UploadRules::default(),
            single_file_uploads: false,
            before_request: default_before_request(),
        }
    }
}

impl fmt::Debug for UploadOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadOptions")
            .field("script", &self.script)
            .field("reference", &self.reference)
            .field("headers", &self.headers)
            .field("params", &self.params)
            .field("rules", &self.rules)
            .field("single_file_uploads", &self.single_file_uploads)
            .field("before_request", &"<hook>")
            .finish()
    }
}
