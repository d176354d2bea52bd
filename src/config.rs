use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Looked up in the current directory when `--analyzer-config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "revalidator.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub analyzer: AnalyzerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzerConfig {
    /// Analyzer executable. Mutated files are appended to its arguments.
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
    /// Relative to the config file. Defaults to the config file's directory.
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
    /// Declarations outside the project sources, loaded once per session.
    #[serde(default)]
    pub stubs: Vec<PathBuf>,
    /// Diagnostic kinds that do not count as issues, e.g. `note`.
    #[serde(default)]
    pub ignore_kinds: Vec<String>,
}

impl AnalyzerConfig {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
            stubs: Vec::new(),
            ignore_kinds: Vec::new(),
        }
    }

    pub fn working_dir(&self) -> PathBuf {
        self.working_dir
            .clone()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }
}

impl Config {
    pub fn parse(text: &str, path: &Path) -> Result<Self> {
        let mut config: Config = toml::from_str(text).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;

        if config.analyzer.program.trim().is_empty() {
            return Err(Error::Config(format!(
                "{}: analyzer.program must not be empty",
                path.display()
            )));
        }

        let base = path.parent().unwrap_or(Path::new(".")).to_path_buf();
        let analyzer = &mut config.analyzer;
        analyzer.working_dir = Some(match analyzer.working_dir.take() {
            Some(dir) => base.join(dir),
            None => base.clone(),
        });
        for stub in &mut analyzer.stubs {
            *stub = base.join(&*stub);
        }

        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::parse(&text, path)
    }

    /// Use the explicit path if one was passed, otherwise the default file in
    /// `cwd`.
    pub fn discover(explicit: Option<&str>, cwd: &Path) -> Result<Self> {
        let path = match explicit {
            Some(p) => {
                let p = Path::new(p);
                if p.is_absolute() { p.to_path_buf() } else { cwd.join(p) }
            }
            None => cwd.join(DEFAULT_CONFIG_FILE),
        };
        if !path.exists() {
            return Err(Error::Config(format!(
                "no analyzer configuration at {}. Pass --analyzer-config <path> or create {}.",
                path.display(),
                DEFAULT_CONFIG_FILE
            )));
        }
        Self::load(&path)
    }
}
