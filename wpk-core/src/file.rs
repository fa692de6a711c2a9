use std::path::{Path, PathBuf};

use eyre::Result;

/// File-system collaborator used by the writer.
///
/// Generation never touches the disk directly; every side effect goes through
/// an implementation of this trait so the pipeline can run against an
/// in-memory double in tests.
pub trait FileSystem: Send + Sync {
    /// Create `path` and all of its parents.
    fn ensure_directory(&self, path: &Path) -> Result<()>;

    /// Write `contents` to `path`, replacing any previous content.
    fn write_file(&self, path: &Path, contents: &str) -> Result<()>;

    /// Read a file, returning `None` when it does not exist.
    fn read_file(&self, path: &Path) -> Result<Option<String>>;

    /// Check whether a file exists.
    fn exists(&self, path: &Path) -> bool;

    /// Formatting hook for PHP sources.
    fn format_php(&self, _path: &Path, contents: String) -> Result<String> {
        Ok(contents)
    }

    /// Formatting hook for TypeScript sources.
    fn format_ts(&self, _path: &Path, contents: String) -> Result<String> {
        Ok(contents)
    }
}

/// [`FileSystem`] backed by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskFileSystem;

impl FileSystem for DiskFileSystem {
    fn ensure_directory(&self, path: &Path) -> Result<()> {
        std::fs::create_dir_all(path)?;
        Ok(())
    }

    fn write_file(&self, path: &Path, contents: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            self.ensure_directory(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn read_file(&self, path: &Path) -> Result<Option<String>> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}

#[cfg(any(test, feature = "testing"))]
pub use memory::MemoryFileSystem;

#[cfg(any(test, feature = "testing"))]
mod memory {
    use std::{
        collections::{BTreeMap, BTreeSet},
        path::{Path, PathBuf},
        sync::{Mutex, PoisonError},
    };

    use eyre::Result;

    use super::FileSystem;

    /// In-memory [`FileSystem`] double.
    #[derive(Debug, Default)]
    pub struct MemoryFileSystem {
        files: Mutex<BTreeMap<PathBuf, String>>,
        directories: Mutex<BTreeSet<PathBuf>>,
        formatted: Mutex<Vec<PathBuf>>,
    }

    impl MemoryFileSystem {
        pub fn new() -> Self {
            Self::default()
        }

        /// Snapshot of every written file, sorted by path.
        pub fn files(&self) -> BTreeMap<PathBuf, String> {
            self.files
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }

        pub fn get(&self, path: impl AsRef<Path>) -> Option<String> {
            self.files
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .get(path.as_ref())
                .cloned()
        }

        pub fn directories(&self) -> BTreeSet<PathBuf> {
            self.directories
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }

        /// Paths passed through a formatting hook, in call order.
        pub fn formatted(&self) -> Vec<PathBuf> {
            self.formatted
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }
    }

    impl FileSystem for MemoryFileSystem {
        fn ensure_directory(&self, path: &Path) -> Result<()> {
            self.directories
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(path.to_path_buf());
            Ok(())
        }

        fn write_file(&self, path: &Path, contents: &str) -> Result<()> {
            self.files
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(path.to_path_buf(), contents.to_string());
            Ok(())
        }

        fn read_file(&self, path: &Path) -> Result<Option<String>> {
            Ok(self.get(path))
        }

        fn exists(&self, path: &Path) -> bool {
            self.files
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .contains_key(path)
        }

        fn format_php(&self, path: &Path, contents: String) -> Result<String> {
            self.formatted
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(path.to_path_buf());
            Ok(contents)
        }

        fn format_ts(&self, path: &Path, contents: String) -> Result<String> {
            self.formatted
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(path.to_path_buf());
            Ok(contents)
        }
    }
}

/// One output of a builder: a relative path plus rendered text.
pub trait GeneratedFile {
    /// Relative to the plugin root.
    fn path(&self) -> PathBuf;

    fn rules(&self) -> FileRules {
        FileRules::default()
    }

    fn render(&self) -> String;

    /// Render into a queued [`File`].
    fn to_file(&self) -> File {
        File::new(self.path(), self.render()).with_rules(self.rules())
    }
}

/// Outcome of [`File::write`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteResult {
    Written,
    /// The target existed and the rules say not to touch it.
    Skipped,
}

/// Rendered output waiting in a builder queue.
#[derive(Debug, Clone, PartialEq)]
pub struct File {
    path: PathBuf,
    content: String,
    rules: FileRules,
}

impl File {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            rules: FileRules::default(),
        }
    }

    /// Replace the write rules.
    pub fn with_rules(mut self, rules: FileRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn rules(&self) -> &FileRules {
        &self.rules
    }

    /// Lowercased, used to pick a formatter.
    pub fn extension(&self) -> Option<String> {
        self.path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
    }

    /// Write `content` (the body plus any header) to `base/path`.
    pub fn write(&self, fs: &dyn FileSystem, base: &Path, content: &str) -> Result<WriteResult> {
        let target = base.join(&self.path);
        match self.rules.overwrite {
            Overwrite::Always => {
                fs.write_file(&target, content)?;
                Ok(WriteResult::Written)
            }
            Overwrite::IfMissing => {
                if fs.exists(&target) {
                    Ok(WriteResult::Skipped)
                } else {
                    fs.write_file(&target, content)?;
                    Ok(WriteResult::Written)
                }
            }
        }
    }
}

/// How the writer treats a queued file.
#[derive(Debug, Clone, PartialEq)]
pub struct FileRules {
    pub overwrite: Overwrite,
    /// Prepended on write; after `<?php` for PHP sources.
    pub header: Option<&'static str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overwrite {
    Always,
    /// Leave an existing file alone, for files the plugin author owns.
    IfMissing,
}

impl Default for FileRules {
    fn default() -> Self {
        Self {
            overwrite: Overwrite::Always,
            header: None,
        }
    }
}
