//! Uploaded files of one session, each in its own slot.

use super::context::FileContext;
use crate::error::{Result, SweeperError};
use crate::upload::UploadedFile;
use serde::Serialize;
use std::fmt;

/// Position of a file in its session's upload order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct FileId(usize);

impl FileId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One uploaded file: either ready for processing or failed to load.
#[derive(Debug)]
pub struct FileSlot {
    id: FileId,
    name: String,
    state: Result<FileContext>,
}

impl FileSlot {
    pub fn id(&self) -> FileId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn context(&self) -> Option<&FileContext> {
        self.state.as_ref().ok()
    }

    pub fn context_mut(&mut self) -> Option<&mut FileContext> {
        self.state.as_mut().ok()
    }

    /// Why the file could not be loaded, if it failed.
    pub fn error(&self) -> Option<&SweeperError> {
        self.state.as_ref().err()
    }

    pub(crate) fn into_parts(self) -> (FileId, String, Result<FileContext>) {
        (self.id, self.name, self.state)
    }

}

fn not_loaded(name: &str, err: &SweeperError) -> SweeperError {
    SweeperError::Other(format!("{name} was not loaded: {err}"))
}

/// Files uploaded in one session, in upload order.
#[derive(Debug, Default)]
pub struct Session {
    slots: Vec<FileSlot>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add files to the session, detecting and parsing each one.
    ///
    /// A file that fails keeps its error in its slot; the rest still load.
    pub fn upload(&mut self, files: impl IntoIterator<Item = UploadedFile>) -> Vec<FileId> {
        let mut ids = Vec::new();

        for file in files {
            let id = FileId::new(self.slots.len());
            let state = FileContext::from_upload(id, &file);
            if let Err(err) = &state {
                tracing::warn!(file = file.name(), %id, "Upload rejected: {err}");
            }
            self.slots.push(FileSlot {
                id,
                name: file.name().to_owned(),
                state,
            });
            ids.push(id);
        }

        ids
    }

    pub fn slot(&self, id: FileId) -> Result<&FileSlot> {
        self.slots
            .get(id.index())
            .ok_or(SweeperError::UnknownFile(id))
    }

    pub fn get(&self, id: FileId) -> Result<&FileContext> {
        let slot = self.slot(id)?;
        slot.state
            .as_ref()
            .map_err(|err| not_loaded(&slot.name, err))
    }

    pub fn get_mut(&mut self, id: FileId) -> Result<&mut FileContext> {
        let slot = self
            .slots
            .get_mut(id.index())
            .ok_or(SweeperError::UnknownFile(id))?;
        match &mut slot.state {
            Ok(context) => Ok(context),
            Err(err) => Err(not_loaded(&slot.name, err)),
        }
    }

    pub fn files(&self) -> impl Iterator<Item = &FileSlot> {
        self.slots.iter()
    }

    /// Files that loaded, in upload order.
    pub fn contexts_mut(&mut self) -> impl Iterator<Item = &mut FileContext> {
        self.slots.iter_mut().filter_map(FileSlot::context_mut)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub(crate) fn into_slots(self) -> Vec<FileSlot> {
        self.slots
    }
}
