//! Multipart payload collation.

use crate::config::ParamMap;
use crate::contract::FileDescriptor;

/// One appended part: either a plain text field or a file.
#[derive(Debug, Clone, PartialEq)]
pub enum FormPart {
    Field(String),
    File(FileDescriptor),
}

/// An ordered multipart form payload. Append-only; iteration yields parts in
/// the order they were appended, which is the order they go on the wire.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FormPayload {
    parts: Vec<(String, FormPart)>,
}

impl FormPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_field(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.parts.push((name.into(), FormPart::Field(value.into())));
    }

    pub fn append_file(&mut self, name: impl Into<String>, file: FileDescriptor) {
        self.parts.push((name.into(), FormPart::File(file)));
    }

    pub fn parts(&self) -> &[(String, FormPart)] {
        &self.parts
    }

    pub fn into_parts(self) -> Vec<(String, FormPart)> {
        self.parts
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

/// Collate the payload for one batch: every extra param in insertion order,
/// then every file under the `reference` field name, in batch order.
pub fn collate(params: &ParamMap, reference: &str, batch: &[FileDescriptor]) -> FormPayload {
    let mut payload = FormPayload::new();
    for (key, value) in params.iter() {
        payload.append_field(key, value.to_string());
    }
    for file in batch {
        payload.append_file(reference, file.clone());
    }
    payload
}
