use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// Where and how a source file was altered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mutation {
    pub line: usize,
    pub end_line: usize,
    #[serde(default)]
    pub column: usize,
    pub start_byte: usize,
    pub end_byte: usize,
    pub operator: String,
    pub original: String,
    pub replacement: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionStatus {
    Escaped,
    Killed,
    Error,
    TimedOut,
    Ignored,
    NotCovered,
    Skipped,
}

impl DetectionStatus {
    /// Counts towards the mutation score as detected.
    pub fn is_detected(self) -> bool {
        matches!(self, Self::Killed | Self::Error | Self::TimedOut)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Escaped => "escaped",
            Self::Killed => "killed",
            Self::Error => "error",
            Self::TimedOut => "timed out",
            Self::Ignored => "ignored",
            Self::NotCovered => "not covered",
            Self::Skipped => "skipped",
        }
    }
}

/// One altered copy of a source file. The mutated path is unique per trial
/// and only lives as long as the judgment of this mutant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mutant {
    mutated_path: PathBuf,
    original_path: PathBuf,
    mutation: Mutation,
}

impl Mutant {
    pub fn new(
        mutated_path: impl Into<PathBuf>,
        original_path: impl Into<PathBuf>,
        mutation: Mutation,
    ) -> Self {
        Self {
            mutated_path: mutated_path.into(),
            original_path: original_path.into(),
            mutation,
        }
    }

    pub fn mutated_path(&self) -> &Path {
        &self.mutated_path
    }

    pub fn original_path(&self) -> &Path {
        &self.original_path
    }

    pub fn mutation(&self) -> &Mutation {
        &self.mutation
    }

    /// Stable identity of the mutation, independent of the transient
    /// mutated file path.
    pub fn hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.original_path.to_string_lossy().as_bytes());
        hasher.update(b"\0");
        hasher.update(self.mutation.operator.as_bytes());
        hasher.update(b"\0");
        hasher.update(self.mutation.start_byte.to_le_bytes());
        hasher.update(self.mutation.end_byte.to_le_bytes());
        hasher.update(self.mutation.replacement.as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// A finished dynamic test run against one mutant.
#[derive(Debug, Clone, PartialEq)]
pub struct MutantProcess {
    pub mutant: Mutant,
    pub command_line: String,
    /// `None` when the test process never ran.
    pub exit_code: Option<i32>,
    pub timed_out: bool,
    pub ignored: bool,
    pub output: String,
    pub tests: Vec<String>,
}

impl MutantProcess {
    pub fn mutant(&self) -> &Mutant {
        &self.mutant
    }
}

/// Serialized form of a mutant process as handed over by the test pipeline.
/// The mutated file itself is not part of the record; it is rebuilt from the
/// original source and the mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessRecord {
    pub original_path: PathBuf,
    pub mutation: Mutation,
    pub command_line: String,
    pub exit_code: Option<i32>,
    #[serde(default)]
    pub timed_out: bool,
    #[serde(default)]
    pub ignored: bool,
    #[serde(default)]
    pub output: String,
    #[serde(default)]
    pub tests: Vec<String>,
}

impl ProcessRecord {
    pub fn into_process(self, mutated_path: impl Into<PathBuf>) -> MutantProcess {
        MutantProcess {
            mutant: Mutant::new(mutated_path, self.original_path, self.mutation),
            command_line: self.command_line,
            exit_code: self.exit_code,
            timed_out: self.timed_out,
            ignored: self.ignored,
            output: self.output,
            tests: self.tests,
        }
    }
}
