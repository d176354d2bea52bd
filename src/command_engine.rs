//! [`AnalysisEngine`] backed by an external analyzer executable.
//!
//! The analyzer is run once per analysis over the scheduled files and is
//! expected to print diagnostics as `file:line[:column]: kind: message`, the
//! format shared by mypy, compilers and most linters.

use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::config::AnalyzerConfig;
use crate::engine::{AnalysisEngine, EngineError, Issue};

struct StagedStubs {
    _dir: tempfile::TempDir,
    files: Vec<PathBuf>,
}

pub struct CommandEngine {
    config: AnalyzerConfig,
    working_dir: PathBuf,
    scheduled: BTreeSet<PathBuf>,
    scanned: HashMap<PathBuf, String>,
    issues: HashMap<PathBuf, Vec<Issue>>,
    stubs: Option<StagedStubs>,
}

impl CommandEngine {
    pub fn new(config: AnalyzerConfig) -> Self {
        let working_dir = config.working_dir();
        Self {
            config,
            working_dir,
            scheduled: BTreeSet::new(),
            scanned: HashMap::new(),
            issues: HashMap::new(),
            stubs: None,
        }
    }

    pub fn is_scanned(&self, path: &Path) -> bool {
        self.scanned.contains_key(path)
    }

    pub fn staged_stubs(&self) -> &[PathBuf] {
        self.stubs.as_ref().map(|s| s.files.as_slice()).unwrap_or(&[])
    }

    fn reported_as(&self, reported: &Path, scheduled: &Path) -> bool {
        reported == scheduled || self.working_dir.join(reported) == scheduled
    }
}

impl AnalysisEngine for CommandEngine {
    fn invalidate(&mut self, path: &Path) {
        self.scheduled.remove(path);
        self.scanned.remove(path);
        self.issues.remove(path);
    }

    fn schedule_for_analysis(&mut self, path: &Path) {
        self.scheduled.insert(path.to_path_buf());
    }

    fn scan_scheduled(&mut self) -> Result<(), EngineError> {
        for path in &self.scheduled {
            if self.scanned.contains_key(path) {
                continue;
            }
            let source = fs::read_to_string(path).map_err(|e| EngineError::Scan {
                path: path.clone(),
                reason: e.to_string(),
            })?;
            debug!(path = %path.display(), bytes = source.len(), "scanned");
            self.scanned.insert(path.clone(), source);
        }
        Ok(())
    }

    fn visit_stubs_and_autoload_files(&mut self) -> Result<(), EngineError> {
        let dir = tempfile::Builder::new()
            .prefix("revalidator-stubs-")
            .tempdir()
            .map_err(|e| EngineError::Stub {
                path: std::env::temp_dir(),
                reason: e.to_string(),
            })?;

        let mut files = Vec::with_capacity(self.config.stubs.len());
        for (i, stub) in self.config.stubs.iter().enumerate() {
            let stub_err = |e: std::io::Error| EngineError::Stub {
                path: stub.clone(),
                reason: e.to_string(),
            };
            let slot = dir.path().join(i.to_string());
            fs::create_dir_all(&slot).map_err(stub_err)?;
            let staged = slot.join(stub.file_name().unwrap_or_default());
            fs::copy(stub, &staged).map_err(stub_err)?;
            files.push(staged);
        }

        debug!(count = files.len(), "staged stubs");
        self.stubs = Some(StagedStubs { _dir: dir, files });
        Ok(())
    }

    fn analyze_scheduled(&mut self) -> Result<(), EngineError> {
        if self.scheduled.is_empty() {
            return Ok(());
        }

        let output = Command::new(&self.config.program)
            .args(&self.config.args)
            .args(self.staged_stubs())
            .args(&self.scheduled)
            .current_dir(&self.working_dir)
            .output()
            .map_err(|source| EngineError::Spawn {
                program: self.config.program.clone(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let reported: Vec<Issue> = stdout
            .lines()
            .chain(stderr.lines())
            .filter_map(parse_issue_line)
            .collect();

        if !output.status.success() && reported.is_empty() {
            return Err(EngineError::Analyze(format!(
                "{} exited with {}\n{}\n{}",
                self.config.program,
                output.status,
                stdout.trim(),
                stderr.trim()
            )));
        }

        let scheduled = std::mem::take(&mut self.scheduled);
        for path in scheduled {
            let found: Vec<Issue> = reported
                .iter()
                .filter(|issue| self.reported_as(&issue.file, &path))
                .filter(|issue| !self.config.ignore_kinds.contains(&issue.kind))
                .map(|issue| Issue {
                    file: path.clone(),
                    ..issue.clone()
                })
                .collect();
            debug!(path = %path.display(), issues = found.len(), "analyzed");
            self.issues.insert(path, found);
        }
        Ok(())
    }

    fn issues_for(&self, path: &Path) -> Vec<Issue> {
        self.issues.get(path).cloned().unwrap_or_default()
    }
}

/// Parse one `file:line[:column]: kind: message` diagnostic.
pub fn parse_issue_line(line: &str) -> Option<Issue> {
    let (location, rest) = line.split_once(": ")?;
    let (file, line_no) = split_location(location)?;
    let (kind, message) = rest.split_once(": ")?;
    let kind = kind.trim();
    if kind.is_empty() || kind.contains(char::is_whitespace) {
        return None;
    }
    Some(Issue {
        kind: kind.to_string(),
        message: message.trim().to_string(),
        file: PathBuf::from(file),
        line: line_no,
    })
}

fn split_location(location: &str) -> Option<(&str, usize)> {
    let (head, last) = location.rsplit_once(':')?;
    let last: usize = last.parse().ok()?;
    if head.is_empty() {
        return None;
    }
    match head.rsplit_once(':') {
        Some((file, line)) if !file.is_empty() => match line.parse::<usize>() {
            Ok(line) => Some((file, line)),
            Err(_) => Some((head, last)),
        },
        _ => Some((head, last)),
    }
}
