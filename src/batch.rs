//! Batch planning: one request for the whole selection, or one per file.

use crate::contract::FileDescriptor;

/// Split a selection into upload batches. With `single_file_uploads` every
/// file becomes its own single-element batch; otherwise the whole selection
/// is one batch. Selection order is preserved either way.
pub fn plan(files: Vec<FileDescriptor>, single_file_uploads: bool) -> Vec<Vec<FileDescriptor>> {
    if single_file_uploads {
        files.into_iter().map(|file| vec![file]).collect()
    } else {
        vec![files]
    }
}
