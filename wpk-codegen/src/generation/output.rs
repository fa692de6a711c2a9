use std::path::Path;

use wpkernel_core::{File, GeneratedFile};

/// Files queued by builder helpers.
///
/// Queuing a path twice replaces the earlier file.
#[derive(Debug, Clone, Default)]
pub struct BuilderOutput {
    files: Vec<File>,
}

impl BuilderOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue(&mut self, file: File) {
        match self.files.iter_mut().find(|queued| queued.path() == file.path()) {
            Some(queued) => *queued = file,
            None => self.files.push(file),
        }
    }

    pub fn queue_generated(&mut self, file: &impl GeneratedFile) {
        self.queue(file.to_file());
    }

    pub fn get(&self, path: impl AsRef<Path>) -> Option<&File> {
        self.files.iter().find(|file| file.path() == path.as_ref())
    }

    pub fn files(&self) -> &[File] {
        &self.files
    }

    pub fn into_files(self) -> Vec<File> {
        self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
