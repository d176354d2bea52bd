use revalidator::cli;
use revalidator::command_engine::CommandEngine;
use revalidator::config::Config;
use revalidator::container::{self, Container};
use revalidator::output;
use revalidator::runner;
use revalidator::state;
use revalidator::telemetry;
use revalidator::{AnalysisSession, Error};

use std::path::PathBuf;
use std::process;
use std::time::Instant;

use clap::{Parser, Subcommand};

/// Taken out of the argument list before clap sees it.
const CONFIG_FLAG: &str = "analyzer-config";

#[derive(Parser)]
#[command(
    name = "revalidator",
    version,
    about = "Re-judge escaped mutants with static analysis",
    after_help = "Use --analyzer-config <path> to point at the analyzer configuration (default: ./revalidator.toml)."
)]
struct Cli {
    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    log_json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Judge the mutant processes recorded by the test pipeline
    Judge {
        /// JSON file with one record per mutant process
        records: PathBuf,
        /// Output JSON instead of human-readable text
        #[arg(long)]
        json: bool,
        /// Exit code only, no output
        #[arg(short, long)]
        quiet: bool,
        /// Session ID naming the scratch directory (default: auto-generated)
        #[arg(long)]
        session: Option<String>,
    },
    /// Show details for an escaped or statically killed mutant by ref
    Show {
        /// Mutant ref (e.g. @m1 or m1)
        #[arg(name = "ref")]
        mutant_ref: String,
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
    /// Summary of last run
    Status {
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let (args, config_path) = match cli::extract_argument(cli::arguments(), CONFIG_FLAG) {
        Ok(extracted) => extracted,
        Err(e) => {
            output::print_error(&e.to_string());
            process::exit(2);
        }
    };

    let cli = Cli::parse_from(args);
    telemetry::init_tracing(cli.log_json, tracing::Level::WARN);

    let exit_code = match cli.command {
        Commands::Judge {
            records,
            json,
            quiet,
            session,
        } => cmd_judge(records, config_path, json, quiet, session),
        Commands::Show { mutant_ref, json } => cmd_show(mutant_ref, json),
        Commands::Status { json } => cmd_status(json),
    };

    process::exit(exit_code);
}

fn generate_session_id() -> String {
    format!("{:08x}", fastrand::u32(..))
}

fn exit_code_for(e: &Error) -> i32 {
    match e {
        Error::MissingArgumentValue { .. }
        | Error::Config(_)
        | Error::ConfigParse { .. }
        | Error::InvalidRecord { .. } => 2,
        Error::Engine(_) | Error::Io(_) | Error::Json(_) => 3,
    }
}

fn cmd_judge(
    records_path: PathBuf,
    config_path: Option<String>,
    json_mode: bool,
    quiet: bool,
    session: Option<String>,
) -> i32 {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    let config = match Config::discover(config_path.as_deref(), &cwd) {
        Ok(c) => c,
        Err(e) => {
            output::print_error(&e.to_string());
            return exit_code_for(&e);
        }
    };

    let records = match runner::load_records(&records_path) {
        Ok(r) => r,
        Err(e) => {
            output::print_error(&format!(
                "Failed to read mutant records from {}: {}",
                records_path.display(),
                e
            ));
            return 2;
        }
    };

    let session_id = session.unwrap_or_else(generate_session_id);
    let workspace = match runner::prepare_workspace(&session_id) {
        Ok(w) => w,
        Err(e) => {
            output::print_error(&format!("Failed to set up scratch directory: {}", e));
            return 3;
        }
    };

    let analysis = AnalysisSession::new(CommandEngine::new(config.analyzer));
    let mut container = container::bootstrap(Container::new(), analysis);

    let start = Instant::now();
    let results = match runner::judge(&mut container, &workspace, records) {
        Ok(r) => r,
        Err(e) => {
            output::print_error(&format!(
                "Judgment aborted, results are incomplete: {}",
                e
            ));
            return exit_code_for(&e);
        }
    };
    let duration_ms = start.elapsed().as_millis() as u64;

    let run_result = state::RunResult::from_results(&results, duration_ms);
    state::save_last_run(&run_result);

    let exit_code = if run_result.escaped > 0 { 1 } else { 0 };
    if quiet {
        return exit_code;
    }

    if json_mode {
        match serde_json::to_string(&run_result) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                output::print_error(&e.to_string());
                return 3;
            }
        }
    } else if run_result.total == 0 {
        output::print_success("No mutants to judge.");
    } else {
        output::print_run_result(&run_result, &records_path);
    }

    exit_code
}

fn cmd_show(mutant_ref: String, json_mode: bool) -> i32 {
    let ref_id = mutant_ref.trim_start_matches('@');

    let last_run = match state::load_last_run() {
        Some(r) => r,
        None => {
            output::print_error("No previous run found. Run `revalidator judge` first.");
            return 2;
        }
    };

    let mutant = last_run.mutants.iter().find(|m| m.ref_id == ref_id);
    match mutant {
        Some(m) => {
            if json_mode {
                match serde_json::to_string(m) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        output::print_error(&e.to_string());
                        return 3;
                    }
                }
            } else {
                output::print_mutant_detail(m);
            }
            0
        }
        None => {
            let valid: Vec<_> = last_run.mutants.iter().map(|m| format!("@{}", m.ref_id)).collect();
            output::print_error(&format!(
                "Mutant @{} not found. Valid refs: {}",
                ref_id,
                valid.join(", ")
            ));
            2
        }
    }
}

fn cmd_status(json_mode: bool) -> i32 {
    match state::load_last_run() {
        Some(result) => {
            if json_mode {
                match serde_json::to_string(&result) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        output::print_error(&e.to_string());
                        return 3;
                    }
                }
            } else {
                output::print_status(&result);
            }
            0
        }
        None => {
            output::print_error("No previous run found. Run `revalidator judge` first.");
            2
        }
    }
}
