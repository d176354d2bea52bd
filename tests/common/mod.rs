#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use revalidator::mutants::{DetectionStatus, Mutant, MutantProcess, Mutation};
use revalidator::result::{ExecutionResult, LazyCode};
use revalidator::{AnalysisEngine, EngineError, Error, Issue, ResultFactory, RevalidationQuery};

/// Content that the fake engine refuses to scan.
pub const UNPARSEABLE: &str = "<<<unparseable";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Invalidate(PathBuf),
    Schedule(PathBuf),
    Scan,
    VisitStubs,
    Analyze,
    IssuesFor(PathBuf),
}

struct Rule {
    needle: String,
    kind: String,
    message: String,
}

/// Small stand-in for a real analyzer. It keeps a symbol table of declared
/// classes per scanned file, learns extra declarations from a stub file when
/// stubs are visited, and reports:
/// - `DuplicateClass` when a scheduled file declares a class already known
///   from another file or the stubs,
/// - `UndefinedClass` for `new`/`extends`/`implements` of an unknown class,
/// - any scripted rule whose needle appears on a line.
#[derive(Default)]
pub struct FakeEngine {
    calls: RefCell<Vec<Call>>,
    project_files: Vec<PathBuf>,
    project_indexed: bool,
    stub_file: Option<PathBuf>,
    rules: Vec<Rule>,
    scheduled: BTreeSet<PathBuf>,
    sources: BTreeMap<PathBuf, String>,
    symbols: BTreeMap<PathBuf, Vec<String>>,
    stub_symbols: BTreeSet<String>,
    issues: BTreeMap<PathBuf, Vec<Issue>>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_project_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.project_files.push(path.into());
        self
    }

    pub fn with_stub_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.stub_file = Some(path.into());
        self
    }

    pub fn with_rule(mut self, needle: &str, kind: &str, message: &str) -> Self {
        self.rules.push(Rule {
            needle: needle.to_string(),
            kind: kind.to_string(),
            message: message.to_string(),
        });
        self
    }

    pub fn knows(&self, path: &Path) -> bool {
        self.symbols.contains_key(path)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn count(&self, call: &Call) -> usize {
        self.calls.borrow().iter().filter(|c| *c == call).count()
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }

    fn scan_file(&mut self, path: &Path) -> Result<(), EngineError> {
        let source = std::fs::read_to_string(path).map_err(|e| EngineError::Scan {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        if source.contains(UNPARSEABLE) {
            return Err(EngineError::Scan {
                path: path.to_path_buf(),
                reason: "syntax error, unexpected '<<'".to_string(),
            });
        }
        self.symbols.insert(path.to_path_buf(), declared_classes(&source));
        self.sources.insert(path.to_path_buf(), source);
        Ok(())
    }

    fn is_declared(&self, name: &str) -> bool {
        self.stub_symbols.contains(name) || self.symbols.values().any(|s| s.iter().any(|c| c == name))
    }

    fn analyze_file(&self, path: &Path) -> Vec<Issue> {
        let Some(source) = self.sources.get(path) else {
            return Vec::new();
        };
        let mut issues = Vec::new();
        for (i, line) in source.lines().enumerate() {
            let line_no = i + 1;
            let issue = |kind: &str, message: String| Issue {
                kind: kind.to_string(),
                message,
                file: path.to_path_buf(),
                line: line_no,
            };

            for name in words_after(line, &["class ", "interface "]) {
                let elsewhere = self.stub_symbols.contains(&name)
                    || self
                        .symbols
                        .iter()
                        .any(|(other, names)| other != path && names.contains(&name));
                if elsewhere {
                    issues.push(issue(
                        "DuplicateClass",
                        format!("Class {} has already been defined", name),
                    ));
                }
            }

            for name in words_after(line, &["new ", "extends ", "implements "]) {
                if !self.is_declared(&name) {
                    issues.push(issue(
                        "UndefinedClass",
                        format!("Class, interface or enum named {} does not exist", name),
                    ));
                }
            }

            for rule in &self.rules {
                if line.contains(&rule.needle) {
                    issues.push(issue(&rule.kind, rule.message.clone()));
                }
            }
        }
        issues
    }
}

impl AnalysisEngine for FakeEngine {
    fn invalidate(&mut self, path: &Path) {
        self.record(Call::Invalidate(path.to_path_buf()));
        self.scheduled.remove(path);
        self.sources.remove(path);
        self.symbols.remove(path);
        self.issues.remove(path);
    }

    fn schedule_for_analysis(&mut self, path: &Path) {
        self.record(Call::Schedule(path.to_path_buf()));
        self.scheduled.insert(path.to_path_buf());
    }

    fn scan_scheduled(&mut self) -> Result<(), EngineError> {
        self.record(Call::Scan);
        if !self.project_indexed {
            self.project_indexed = true;
            for path in self.project_files.clone() {
                self.scan_file(&path)?;
            }
        }
        for path in self.scheduled.clone() {
            if !self.sources.contains_key(&path) {
                self.scan_file(&path)?;
            }
        }
        Ok(())
    }

    fn visit_stubs_and_autoload_files(&mut self) -> Result<(), EngineError> {
        self.record(Call::VisitStubs);
        if let Some(stub) = &self.stub_file {
            let source = std::fs::read_to_string(stub).map_err(|e| EngineError::Stub {
                path: stub.clone(),
                reason: e.to_string(),
            })?;
            self.stub_symbols.extend(declared_classes(&source));
        }
        Ok(())
    }

    fn analyze_scheduled(&mut self) -> Result<(), EngineError> {
        self.record(Call::Analyze);
        for path in std::mem::take(&mut self.scheduled) {
            let found = self.analyze_file(&path);
            self.issues.insert(path, found);
        }
        Ok(())
    }

    fn issues_for(&self, path: &Path) -> Vec<Issue> {
        self.record(Call::IssuesFor(path.to_path_buf()));
        self.issues.get(path).cloned().unwrap_or_default()
    }
}

fn declared_classes(source: &str) -> Vec<String> {
    source
        .lines()
        .flat_map(|line| words_after(line, &["class ", "interface "]))
        .collect()
}

/// Class names following any of `keywords`, namespace stripped.
fn words_after(line: &str, keywords: &[&str]) -> Vec<String> {
    let mut names = Vec::new();
    for keyword in keywords {
        let mut rest = line;
        while let Some(pos) = rest.find(keyword) {
            let at_word_start = pos == 0
                || !rest[..pos]
                    .chars()
                    .next_back()
                    .is_some_and(|c| c.is_alphanumeric() || c == '_');
            rest = &rest[pos + keyword.len()..];
            if !at_word_start {
                continue;
            }
            let token: String = rest
                .chars()
                .take_while(|c| c.is_alphanumeric() || *c == '_' || *c == '\\')
                .collect();
            if let Some(name) = token.rsplit('\\').next().filter(|n| !n.is_empty()) {
                names.push(name.to_string());
            }
        }
    }
    names
}

// --- mutants ---

pub fn mutation() -> Mutation {
    Mutation {
        line: 1,
        end_line: 10,
        column: 1,
        start_byte: 2,
        end_byte: 8,
        operator: "Plus".to_string(),
        original: "+".to_string(),
        replacement: "-".to_string(),
    }
}

pub fn write_mutant(dir: &Path, name: &str, code: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, code).unwrap();
    path
}

pub fn make_mutant(mutated: &Path, original: impl Into<PathBuf>) -> Mutant {
    Mutant::new(mutated, original, mutation())
}

pub fn make_process(mutant: Mutant) -> MutantProcess {
    MutantProcess {
        mutant,
        command_line: "echo hi".to_string(),
        exit_code: Some(0),
        timed_out: false,
        ignored: false,
        output: String::new(),
        tests: vec![],
    }
}

pub fn baseline_result(status: DetectionStatus) -> ExecutionResult {
    ExecutionResult::builder()
        .status(status)
        .command_line("echo hi")
        .output("output")
        .diff("diff")
        .hash("a-hash")
        .mutator_name("AssignmentEqual")
        .original_file_path("/tmp/my-file")
        .original_lines(1, 10)
        .original_bytes(2, 8)
        .original_code(LazyCode::ready("code"))
        .mutated_code(LazyCode::ready("mutated code"))
        .tests(vec!["HelloWorldTest::testAdd".to_string()])
        .build()
}

// --- collaborator doubles for the decorator ---

/// Returns a fixed result, or fails, and counts how often it was asked.
pub struct FixedFactory {
    result: Option<ExecutionResult>,
    pub calls: Rc<Cell<usize>>,
    pub seen: Rc<RefCell<Vec<MutantProcess>>>,
}

impl FixedFactory {
    pub fn returning(result: ExecutionResult) -> Self {
        Self {
            result: Some(result),
            calls: Rc::default(),
            seen: Rc::default(),
        }
    }

    pub fn failing() -> Self {
        Self {
            result: None,
            calls: Rc::default(),
            seen: Rc::default(),
        }
    }
}

impl ResultFactory for FixedFactory {
    fn create_from_process(&mut self, process: &MutantProcess) -> revalidator::Result<ExecutionResult> {
        self.calls.set(self.calls.get() + 1);
        self.seen.borrow_mut().push(process.clone());
        match &self.result {
            Some(result) => Ok(result.clone()),
            None => Err(Error::Config("next factory failed".to_string())),
        }
    }
}

pub enum Verdict {
    Valid,
    Invalid(&'static str),
    Broken,
}

/// Answers every query the same way and counts the calls.
pub struct ScriptedQuery {
    verdict: Verdict,
    pub calls: Rc<Cell<usize>>,
}

impl ScriptedQuery {
    pub fn new(verdict: Verdict) -> Self {
        Self {
            verdict,
            calls: Rc::default(),
        }
    }
}

impl RevalidationQuery for ScriptedQuery {
    fn is_still_valid(&mut self, mutant: &Mutant) -> Result<bool, EngineError> {
        self.calls.set(self.calls.get() + 1);
        match self.verdict {
            Verdict::Valid => Ok(true),
            Verdict::Invalid(_) => Ok(false),
            Verdict::Broken => Err(EngineError::Scan {
                path: mutant.mutated_path().to_path_buf(),
                reason: "unparseable".to_string(),
            }),
        }
    }

    fn format_last_issues(&self) -> String {
        match self.verdict {
            Verdict::Invalid(issues) => issues.to_string(),
            _ => String::new(),
        }
    }
}
