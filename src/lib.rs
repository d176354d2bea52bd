pub mod cli;
pub mod command_engine;
pub mod config;
pub mod container;
pub mod engine;
pub mod error;
pub mod factory;
pub mod mutants;
pub mod output;
pub mod result;
pub mod runner;
pub mod session;
pub mod state;
pub mod telemetry;

pub use engine::{AnalysisEngine, EngineError, Issue};
pub use error::{Error, Result};
pub use factory::{ProcessResultFactory, ResultFactory, RevalidatingResultFactory};
pub use session::{AnalysisSession, RevalidationQuery, StubState};
