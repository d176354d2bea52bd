//! Immutable per-mutant execution records.
//!
//! An [`ExecutionResult`] is never edited in place. A reclassified result is
//! a new record produced by [`ExecutionResult::rebuild`], which starts from a
//! full copy and only overrides the fields that are named.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use crate::mutants::DetectionStatus;

/// Source text that is only read from disk when first asked for. Clones
/// share the materialized value.
#[derive(Clone)]
pub struct LazyCode {
    path: Option<PathBuf>,
    cell: Arc<OnceLock<String>>,
}

impl LazyCode {
    pub fn ready(code: impl Into<String>) -> Self {
        Self {
            path: None,
            cell: Arc::new(OnceLock::from(code.into())),
        }
    }

    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            cell: Arc::new(OnceLock::new()),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_materialized(&self) -> bool {
        self.cell.get().is_some()
    }

    pub fn get(&self) -> std::io::Result<&str> {
        if let Some(code) = self.cell.get() {
            return Ok(code);
        }
        let code = match &self.path {
            Some(path) => fs::read_to_string(path)?,
            None => String::new(),
        };
        Ok(self.cell.get_or_init(|| code))
    }
}

impl PartialEq for LazyCode {
    fn eq(&self, other: &Self) -> bool {
        match (&self.path, &other.path) {
            (Some(a), Some(b)) => a == b,
            (None, None) => self.cell.get() == other.cell.get(),
            _ => false,
        }
    }
}

impl fmt::Debug for LazyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.path, self.cell.get()) {
            (_, Some(code)) => f.debug_tuple("LazyCode").field(code).finish(),
            (Some(path), None) => f.debug_tuple("LazyCode").field(path).finish(),
            (None, None) => f.write_str("LazyCode(<empty>)"),
        }
    }
}

/// Outcome of judging one mutant.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionResult {
    status: DetectionStatus,
    command_line: String,
    output: String,
    diff: String,
    hash: String,
    mutator_name: String,
    original_file_path: PathBuf,
    original_start_line: usize,
    original_end_line: usize,
    original_start_byte: usize,
    original_end_byte: usize,
    original_code: LazyCode,
    mutated_code: LazyCode,
    tests: Vec<String>,
}

impl ExecutionResult {
    pub fn builder() -> ExecutionResultBuilder {
        ExecutionResultBuilder {
            result: ExecutionResult {
                status: DetectionStatus::Skipped,
                command_line: String::new(),
                output: String::new(),
                diff: String::new(),
                hash: String::new(),
                mutator_name: String::new(),
                original_file_path: PathBuf::new(),
                original_start_line: 0,
                original_end_line: 0,
                original_start_byte: 0,
                original_end_byte: 0,
                original_code: LazyCode::ready(""),
                mutated_code: LazyCode::ready(""),
                tests: Vec::new(),
            },
        }
    }

    /// Start a new record that copies every field of this one.
    pub fn rebuild(&self) -> ExecutionResultBuilder {
        ExecutionResultBuilder {
            result: self.clone(),
        }
    }

    pub fn status(&self) -> DetectionStatus {
        self.status
    }

    pub fn command_line(&self) -> &str {
        &self.command_line
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn diff(&self) -> &str {
        &self.diff
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn mutator_name(&self) -> &str {
        &self.mutator_name
    }

    pub fn original_file_path(&self) -> &Path {
        &self.original_file_path
    }

    pub fn original_start_line(&self) -> usize {
        self.original_start_line
    }

    pub fn original_end_line(&self) -> usize {
        self.original_end_line
    }

    pub fn original_start_byte(&self) -> usize {
        self.original_start_byte
    }

    pub fn original_end_byte(&self) -> usize {
        self.original_end_byte
    }

    pub fn original_code(&self) -> &LazyCode {
        &self.original_code
    }

    pub fn mutated_code(&self) -> &LazyCode {
        &self.mutated_code
    }

    pub fn tests(&self) -> &[String] {
        &self.tests
    }

    pub fn killed_by_static_analysis(&self) -> bool {
        self.status == DetectionStatus::Killed
            && self.command_line == crate::factory::STATIC_ANALYSIS_COMMAND_LINE
    }
}

pub struct ExecutionResultBuilder {
    result: ExecutionResult,
}

impl ExecutionResultBuilder {
    pub fn status(mut self, status: DetectionStatus) -> Self {
        self.result.status = status;
        self
    }

    pub fn command_line(mut self, command_line: impl Into<String>) -> Self {
        self.result.command_line = command_line.into();
        self
    }

    pub fn output(mut self, output: impl Into<String>) -> Self {
        self.result.output = output.into();
        self
    }

    pub fn diff(mut self, diff: impl Into<String>) -> Self {
        self.result.diff = diff.into();
        self
    }

    pub fn hash(mut self, hash: impl Into<String>) -> Self {
        self.result.hash = hash.into();
        self
    }

    pub fn mutator_name(mut self, name: impl Into<String>) -> Self {
        self.result.mutator_name = name.into();
        self
    }

    pub fn original_file_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.result.original_file_path = path.into();
        self
    }

    pub fn original_lines(mut self, start: usize, end: usize) -> Self {
        self.result.original_start_line = start;
        self.result.original_end_line = end;
        self
    }

    pub fn original_bytes(mut self, start: usize, end: usize) -> Self {
        self.result.original_start_byte = start;
        self.result.original_end_byte = end;
        self
    }

    pub fn original_code(mut self, code: LazyCode) -> Self {
        self.result.original_code = code;
        self
    }

    pub fn mutated_code(mut self, code: LazyCode) -> Self {
        self.result.mutated_code = code;
        self
    }

    pub fn tests(mut self, tests: Vec<String>) -> Self {
        self.result.tests = tests;
        self
    }

    pub fn build(self) -> ExecutionResult {
        self.result
    }
}
