use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, error};

use crate::container::Container;
use crate::error::{Error, Result};
use crate::mutants::{Mutation, ProcessRecord};
use crate::result::ExecutionResult;

/// Scratch directory holding the mutated files of one judging run.
pub struct Workspace {
    dir: tempfile::TempDir,
}

pub fn prepare_workspace(session_id: &str) -> Result<Workspace> {
    let dir = tempfile::Builder::new()
        .prefix(&format!("revalidator-{}-", session_id))
        .tempdir()?;
    Ok(Workspace { dir })
}

impl Workspace {
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write the mutated source for `record` to a path unique to this trial.
    /// The file name of the original is kept so analyzers that key on the
    /// extension still recognise it.
    pub fn materialize(&self, index: usize, record: &ProcessRecord) -> Result<PathBuf> {
        let source = fs::read_to_string(&record.original_path)?;
        let mutated = apply_mutation(&source, &record.mutation).ok_or_else(|| {
            Error::InvalidRecord {
                path: record.original_path.clone(),
                reason: format!(
                    "byte span {}..{} does not fit a {} byte source",
                    record.mutation.start_byte,
                    record.mutation.end_byte,
                    source.len()
                ),
            }
        })?;

        let slot = self.dir.path().join(format!("m{}", index + 1));
        fs::create_dir_all(&slot)?;
        let path = slot.join(record.original_path.file_name().unwrap_or_default());
        fs::write(&path, mutated)?;
        Ok(path)
    }
}

/// `None` when the mutation's span is out of range or splits a character.
pub fn apply_mutation(source: &str, mutation: &Mutation) -> Option<String> {
    let before = source.get(..mutation.start_byte)?;
    let after = source.get(mutation.end_byte..)?;
    if mutation.start_byte > mutation.end_byte {
        return None;
    }
    let mut result = String::with_capacity(source.len());
    result.push_str(before);
    result.push_str(&mutation.replacement);
    result.push_str(after);
    Some(result)
}

pub fn load_records(path: &Path) -> Result<Vec<ProcessRecord>> {
    let data = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

/// Push every record through the container's result factory, in order.
/// The first failure stops the run: a mutant whose judgment could not be
/// completed is not counted either way.
pub fn judge(
    container: &mut Container,
    workspace: &Workspace,
    records: Vec<ProcessRecord>,
) -> Result<Vec<ExecutionResult>> {
    let mut results = Vec::with_capacity(records.len());

    for (index, record) in records.into_iter().enumerate() {
        let original = record.original_path.clone();
        let mutated_path = workspace.materialize(index, &record)?;
        let process = record.into_process(&mutated_path);

        let outcome = container.result_factory().create_from_process(&process);

        // The mutated file only exists for the duration of its judgment.
        let _ = fs::remove_file(&mutated_path);

        let result = outcome.inspect_err(|e| {
            error!(index, original = %original.display(), error = %e, "could not judge mutant");
        })?;
        debug!(index, status = result.status().as_str(), "judged");
        results.push(result);
    }

    Ok(results)
}
