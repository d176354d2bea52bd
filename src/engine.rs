//! The contract a static analysis engine has to satisfy to be driven by an
//! [`AnalysisSession`](crate::session::AnalysisSession).
//!
//! Engines are stateful: they keep symbol information for every file they
//! have scanned until that file is invalidated. The session relies on that
//! to keep each revalidation incremental.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// A single finding reported against one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub kind: String,
    pub message: String,
    pub file: PathBuf,
    pub line: usize,
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}\n{}:{}",
            self.kind,
            self.message,
            self.file.display(),
            self.line
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to scan {path}: {reason}")]
    Scan { path: PathBuf, reason: String },

    #[error("failed to load stubs from {path}: {reason}")]
    Stub { path: PathBuf, reason: String },

    #[error("analysis did not produce a verdict: {0}")]
    Analyze(String),

    #[error("failed to start analyzer {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

pub trait AnalysisEngine {
    /// Discard everything known about `path`.
    fn invalidate(&mut self, path: &Path);

    fn schedule_for_analysis(&mut self, path: &Path);

    /// Build symbol information for files scheduled since the last scan.
    /// Files that are already known must not be scanned again.
    fn scan_scheduled(&mut self) -> Result<(), EngineError>;

    /// Load declarations that live outside the project sources.
    fn visit_stubs_and_autoload_files(&mut self) -> Result<(), EngineError>;

    fn analyze_scheduled(&mut self) -> Result<(), EngineError>;

    fn issues_for(&self, path: &Path) -> Vec<Issue>;
}

impl<E: AnalysisEngine + ?Sized> AnalysisEngine for Box<E> {
    fn invalidate(&mut self, path: &Path) {
        (**self).invalidate(path)
    }

    fn schedule_for_analysis(&mut self, path: &Path) {
        (**self).schedule_for_analysis(path)
    }

    fn scan_scheduled(&mut self) -> Result<(), EngineError> {
        (**self).scan_scheduled()
    }

    fn visit_stubs_and_autoload_files(&mut self) -> Result<(), EngineError> {
        (**self).visit_stubs_and_autoload_files()
    }

    fn analyze_scheduled(&mut self) -> Result<(), EngineError> {
        (**self).analyze_scheduled()
    }

    fn issues_for(&self, path: &Path) -> Vec<Issue> {
        (**self).issues_for(path)
    }
}
