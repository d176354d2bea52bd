use tracing::info;

use crate::error::Result;
use crate::mutants::{DetectionStatus, MutantProcess};
use crate::result::{ExecutionResult, LazyCode};
use crate::session::RevalidationQuery;

/// Command line recorded on results that static analysis overturned.
pub const STATIC_ANALYSIS_COMMAND_LINE: &str = "Static Analysis";

/// Output fragments that mean the mutant never got as far as running tests.
const ERROR_MARKERS: &[&str] = &[
    "SyntaxError",
    "IndentationError",
    "ImportError",
    "ModuleNotFoundError",
    "Parse error",
];

pub trait ResultFactory {
    fn create_from_process(&mut self, process: &MutantProcess) -> Result<ExecutionResult>;
}

impl<F: ResultFactory + ?Sized> ResultFactory for Box<F> {
    fn create_from_process(&mut self, process: &MutantProcess) -> Result<ExecutionResult> {
        (**self).create_from_process(process)
    }
}

/// Builds results straight from the dynamic test run.
#[derive(Debug, Default)]
pub struct ProcessResultFactory;

impl ProcessResultFactory {
    pub fn new() -> Self {
        Self
    }
}

pub fn classify(process: &MutantProcess) -> DetectionStatus {
    if process.ignored {
        return DetectionStatus::Ignored;
    }
    let Some(code) = process.exit_code else {
        return if process.tests.is_empty() {
            DetectionStatus::NotCovered
        } else {
            DetectionStatus::Skipped
        };
    };
    if process.timed_out {
        DetectionStatus::TimedOut
    } else if code == 0 {
        DetectionStatus::Escaped
    } else if ERROR_MARKERS.iter().any(|m| process.output.contains(m)) {
        DetectionStatus::Error
    } else {
        DetectionStatus::Killed
    }
}

impl ResultFactory for ProcessResultFactory {
    fn create_from_process(&mut self, process: &MutantProcess) -> Result<ExecutionResult> {
        let mutant = process.mutant();
        let mutation = mutant.mutation();

        let original_code = LazyCode::from_file(mutant.original_path());
        let mutated_code = LazyCode::from_file(mutant.mutated_path());
        let diff = generate_diff(original_code.get()?, mutated_code.get()?);

        Ok(ExecutionResult::builder()
            .status(classify(process))
            .command_line(process.command_line.as_str())
            .output(process.output.as_str())
            .diff(diff)
            .hash(mutant.hash())
            .mutator_name(mutation.operator.as_str())
            .original_file_path(mutant.original_path())
            .original_lines(mutation.line, mutation.end_line)
            .original_bytes(mutation.start_byte, mutation.end_byte)
            .original_code(original_code)
            .mutated_code(mutated_code)
            .tests(process.tests.clone())
            .build())
    }
}

/// Second opinion for escaped mutants: a mutant the analyzer rejects could
/// never have shipped, so it counts as killed.
pub struct RevalidatingResultFactory<Q> {
    next: Box<dyn ResultFactory>,
    query: Q,
}

impl<Q: RevalidationQuery> RevalidatingResultFactory<Q> {
    pub fn new(next: Box<dyn ResultFactory>, query: Q) -> Self {
        Self { next, query }
    }

    pub fn query(&self) -> &Q {
        &self.query
    }
}

impl<Q: RevalidationQuery> ResultFactory for RevalidatingResultFactory<Q> {
    fn create_from_process(&mut self, process: &MutantProcess) -> Result<ExecutionResult> {
        let result = self.next.create_from_process(process)?;

        if result.status() != DetectionStatus::Escaped {
            return Ok(result);
        }

        if self.query.is_still_valid(process.mutant())? {
            return Ok(result);
        }

        info!(
            file = %result.original_file_path().display(),
            line = result.original_start_line(),
            mutator = result.mutator_name(),
            "escaped mutant rejected by static analysis"
        );

        Ok(result
            .rebuild()
            .status(DetectionStatus::Killed)
            .command_line(STATIC_ANALYSIS_COMMAND_LINE)
            .output(self.query.format_last_issues())
            .build())
    }
}

pub fn generate_diff(original: &str, mutated: &str) -> String {
    use similar::TextDiff;
    let diff = TextDiff::from_lines(original, mutated);
    let mut output = String::new();
    for change in diff.iter_all_changes() {
        match change.tag() {
            similar::ChangeTag::Delete => {
                output.push_str(&format!("- {}", change));
            }
            similar::ChangeTag::Insert => {
                output.push_str(&format!("+ {}", change));
            }
            _ => {}
        }
    }
    output
}
