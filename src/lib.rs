#![doc = "lite-uploader: validated, batched multipart uploads with lifecycle events."]

//! A thin orchestration layer over a pluggable transport: validates a file
//! selection against configurable rules, plans one or more upload batches,
//! collates multipart payloads, and emits lifecycle events the caller can
//! drive feedback from. Networking lives behind the [`contract::Transport`]
//! trait; [`client::HttpTransport`] is the bundled reqwest-backed default.

pub mod batch;
pub mod client;
pub mod config;
pub mod contract;
pub mod events;
pub mod form;
pub mod uploader;
pub mod validate;

pub use config::UploadOptions;
pub use contract::FileDescriptor;
pub use events::UploadEvent;
pub use uploader::LiteUploader;
