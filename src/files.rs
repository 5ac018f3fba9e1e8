//! Drop surface: turn paths into upload-ready files.
//!
//! Only PDF and plain-text files are accepted; anything else is rejected
//! here so the upload orchestrator never sees it. Directories are walked
//! recursively and contribute their accepted files in name order. The
//! order of the given paths is preserved.

use std::path::{Path, PathBuf};

use anyhow::Result;
use docqa_core::models::DroppedFile;
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use tracing::debug;
use walkdir::WalkDir;

/// Accepted file patterns and the MIME type each is uploaded as.
const ACCEPT: &[(&str, &str)] = &[("*.pdf", "application/pdf"), ("*.txt", "text/plain")];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejected {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct DropSelection {
    pub accepted: Vec<DroppedFile>,
    pub rejected: Vec<Rejected>,
}

pub struct DropSurface {
    accept: GlobSet,
}

impl DropSurface {
    pub fn new() -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        for (pattern, _) in ACCEPT {
            builder.add(GlobBuilder::new(pattern).case_insensitive(true).build()?);
        }
        Ok(Self {
            accept: builder.build()?,
        })
    }

    /// MIME type for an accepted file name, or `None` if it is not accepted.
    pub fn content_type(&self, name: &str) -> Option<&'static str> {
        self.accept
            .matches(name)
            .first()
            .map(|&idx| ACCEPT[idx].1)
    }

    pub fn collect(&self, paths: &[PathBuf]) -> DropSelection {
        let mut selection = DropSelection::default();
        for path in paths {
            if path.is_dir() {
                let walker = WalkDir::new(path).sort_by_file_name();
                for entry in walker {
                    match entry {
                        Ok(entry) if entry.file_type().is_file() => {
                            // Unaccepted files inside a directory are skipped silently.
                            if self.content_type(&file_name(entry.path())).is_some() {
                                self.accept_file(entry.path(), &mut selection);
                            }
                        }
                        Ok(_) => {}
                        Err(e) => selection.rejected.push(Rejected {
                            path: e.path().map(Path::to_path_buf).unwrap_or_else(|| path.clone()),
                            reason: e.to_string(),
                        }),
                    }
                }
            } else {
                self.accept_file(path, &mut selection);
            }
        }
        selection
    }

    fn accept_file(&self, path: &Path, selection: &mut DropSelection) {
        let name = file_name(path);
        let content_type = match self.content_type(&name) {
            Some(ct) => ct,
            None => {
                selection.rejected.push(Rejected {
                    path: path.to_path_buf(),
                    reason: "unsupported file type (accepts .pdf and .txt)".to_string(),
                });
                return;
            }
        };
        match std::fs::read(path) {
            Ok(bytes) => {
                debug!(file = %name, bytes = bytes.len(), "accepted");
                selection
                    .accepted
                    .push(DroppedFile::new(name, content_type, bytes));
            }
            Err(e) => selection.rejected.push(Rejected {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }),
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}
