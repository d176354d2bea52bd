//! Single-mutant revalidation against a long-lived analysis engine.
//!
//! A session is strictly sequential: every query runs the full
//! invalidate, scan, analyze, collect, invalidate cycle before returning, and
//! `format_last_issues` reflects only the most recent query. Workers that
//! judge mutants in parallel each need their own session.

use tracing::{debug, warn};

use crate::engine::{AnalysisEngine, EngineError, Issue};
use crate::mutants::Mutant;

/// Asks whether an escaped mutant still stands once static analysis has had
/// a look at it.
pub trait RevalidationQuery {
    /// `true` when the analyzer found nothing wrong with the mutated file.
    fn is_still_valid(&mut self, mutant: &Mutant) -> Result<bool, EngineError>;

    /// Issues collected by the last call to `is_still_valid`.
    fn format_last_issues(&self) -> String;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StubState {
    NotVisited,
    Visited,
}

pub struct AnalysisSession<E> {
    engine: E,
    stubs: StubState,
    last_issues: Vec<Issue>,
}

impl<E: AnalysisEngine> AnalysisSession<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            stubs: StubState::NotVisited,
            last_issues: Vec::new(),
        }
    }

    pub fn stub_state(&self) -> StubState {
        self.stubs
    }

    pub fn last_issues(&self) -> &[Issue] {
        &self.last_issues
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn into_engine(self) -> E {
        self.engine
    }

    fn scan_and_analyze(&mut self, mutant: &Mutant) -> Result<Vec<Issue>, EngineError> {
        let path = mutant.mutated_path();

        self.engine.schedule_for_analysis(path);
        self.engine.scan_scheduled()?;

        if self.stubs == StubState::NotVisited {
            debug!("visiting stubs and autoload files");
            self.engine.visit_stubs_and_autoload_files()?;
            self.stubs = StubState::Visited;
        }

        self.engine.analyze_scheduled()?;
        Ok(self.engine.issues_for(path))
    }
}

impl<E: AnalysisEngine> RevalidationQuery for AnalysisSession<E> {
    fn is_still_valid(&mut self, mutant: &Mutant) -> Result<bool, EngineError> {
        let mutated = mutant.mutated_path();
        debug!(
            original = %mutant.original_path().display(),
            mutated = %mutated.display(),
            "revalidating mutant"
        );

        self.last_issues.clear();

        // Stale symbols of the original file would clash with the mutant's.
        self.engine.invalidate(mutant.original_path());

        let collected = self.scan_and_analyze(mutant);

        // The mutant's declarations must not leak into the next mutant.
        self.engine.invalidate(mutated);

        match collected {
            Ok(issues) => {
                debug!(issues = issues.len(), "analysis finished");
                self.last_issues = issues;
                Ok(self.last_issues.is_empty())
            }
            Err(e) => {
                warn!(mutated = %mutated.display(), error = %e, "analysis failed");
                Err(e)
            }
        }
    }

    fn format_last_issues(&self) -> String {
        self.last_issues
            .iter()
            .map(Issue::to_string)
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}
