use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::mutants::DetectionStatus;
use crate::result::ExecutionResult;

#[derive(Debug, Serialize, Deserialize)]
pub struct RunResult {
    pub score: f64,
    pub total: usize,
    pub killed: usize,
    /// Killed by static analysis after escaping the tests. Included in
    /// `killed`.
    pub statically_killed: usize,
    pub escaped: usize,
    pub errors: usize,
    pub timed_out: usize,
    pub not_covered: usize,
    pub skipped: usize,
    pub ignored: usize,
    pub duration_ms: u64,
    pub mutants: Vec<JudgedMutant>,
}

/// An escaped mutant, or one that static analysis overturned.
#[derive(Debug, Serialize, Deserialize)]
pub struct JudgedMutant {
    pub ref_id: String,
    pub file: String,
    pub line: usize,
    pub mutator: String,
    pub status: DetectionStatus,
    pub statically_killed: bool,
    pub hash: String,
    pub diff: String,
    pub output: String,
}

impl RunResult {
    pub fn from_results(results: &[ExecutionResult], duration_ms: u64) -> Self {
        let count = |status: DetectionStatus| results.iter().filter(|r| r.status() == status).count();

        let total = results.len();
        let skipped = count(DetectionStatus::Skipped);
        let ignored = count(DetectionStatus::Ignored);
        let detected = results.iter().filter(|r| r.status().is_detected()).count();
        let considered = total - skipped - ignored;
        let score = if considered > 0 {
            detected as f64 / considered as f64
        } else {
            1.0
        };

        let mutants: Vec<JudgedMutant> = results
            .iter()
            .filter(|r| r.status() == DetectionStatus::Escaped || r.killed_by_static_analysis())
            .enumerate()
            .map(|(i, r)| JudgedMutant {
                ref_id: format!("m{}", i + 1),
                file: r.original_file_path().display().to_string(),
                line: r.original_start_line(),
                mutator: r.mutator_name().to_string(),
                status: r.status(),
                statically_killed: r.killed_by_static_analysis(),
                hash: r.hash().to_string(),
                diff: r.diff().to_string(),
                output: r.output().to_string(),
            })
            .collect();

        RunResult {
            score,
            total,
            killed: count(DetectionStatus::Killed),
            statically_killed: mutants.iter().filter(|m| m.statically_killed).count(),
            escaped: count(DetectionStatus::Escaped),
            errors: count(DetectionStatus::Error),
            timed_out: count(DetectionStatus::TimedOut),
            not_covered: count(DetectionStatus::NotCovered),
            skipped,
            ignored,
            duration_ms,
            mutants,
        }
    }
}

fn state_path() -> PathBuf {
    let dir = dirs_or_cwd();
    dir.join(".revalidator-state.json")
}

fn dirs_or_cwd() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

pub fn save_last_run(result: &RunResult) {
    save_to_path(result, &state_path());
}

pub fn load_last_run() -> Option<RunResult> {
    load_from_path(&state_path())
}

pub fn save_to_path(result: &RunResult, path: &Path) {
    if let Ok(json) = serde_json::to_string(result) {
        if let Err(e) = std::fs::write(path, json) {
            tracing::warn!(path = %path.display(), error = %e, "could not save run state");
        }
    }
}

pub fn load_from_path(path: &Path) -> Option<RunResult> {
    let data = std::fs::read_to_string(path).ok()?;
    serde_json::from_str(&data).ok()
}
