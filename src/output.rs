use console::Style;
use crate::state::{JudgedMutant, RunResult};
use std::path::Path;

pub fn print_error(msg: &str) {
    let style = Style::new().red().bold();
    eprintln!("{} {}", style.apply_to("✗"), msg);
}

pub fn print_success(msg: &str) {
    let style = Style::new().green().bold();
    println!("{} {}", style.apply_to("✓"), msg);
}

pub fn print_run_result(result: &RunResult, records: &Path) {
    let score_pct = result.score * 100.0;

    if result.escaped == 0 {
        let style = Style::new().green().bold();
        println!(
            "{} {}: {} mutants, none escaped ({:.1}% MSI) in {:.1}s",
            style.apply_to("✓"),
            records.display(),
            result.total,
            score_pct,
            result.duration_ms as f64 / 1000.0,
        );
    } else {
        let style = Style::new().yellow().bold();
        println!(
            "{} {}: {} escaped / {} mutants ({:.1}% MSI) in {:.1}s",
            style.apply_to("!"),
            records.display(),
            result.escaped,
            result.total,
            score_pct,
            result.duration_ms as f64 / 1000.0,
        );
    }

    let dim = Style::new().dim();
    if result.statically_killed > 0 {
        println!(
            "  {} {} escaped mutants killed by static analysis",
            dim.apply_to("·"),
            result.statically_killed
        );
    }
    if result.timed_out > 0 {
        println!("  {} {} mutants timed out", dim.apply_to("·"), result.timed_out);
    }
    if result.errors > 0 {
        println!("  {} {} mutants errored", dim.apply_to("·"), result.errors);
    }
    if result.not_covered > 0 {
        println!("  {} {} mutants not covered by tests", dim.apply_to("·"), result.not_covered);
    }

    if result.mutants.is_empty() {
        return;
    }

    println!();
    for m in &result.mutants {
        print_mutant_line(m);
    }
}

fn print_mutant_line(m: &JudgedMutant) {
    let ref_style = Style::new().cyan().bold();
    let loc_style = Style::new().dim();
    let verdict = if m.statically_killed {
        Style::new().green().apply_to("killed by static analysis")
    } else {
        Style::new().yellow().apply_to("escaped")
    };

    println!(
        "  {} {}:{} {} {}",
        ref_style.apply_to(format!("@{}", m.ref_id)),
        m.file,
        m.line,
        loc_style.apply_to(format!("[{}]", m.mutator)),
        verdict,
    );
}

pub fn print_mutant_detail(m: &JudgedMutant) {
    let ref_style = Style::new().cyan().bold();
    let dim = Style::new().dim();

    println!(
        "{} {}:{} [{}] {}",
        ref_style.apply_to(format!("@{}", m.ref_id)),
        m.file,
        m.line,
        m.mutator,
        m.status.as_str(),
    );
    println!();

    for line in m.diff.lines() {
        if line.starts_with('-') {
            let del_style = Style::new().red();
            println!("  {}", del_style.apply_to(line));
        } else if line.starts_with('+') {
            let add_style = Style::new().green();
            println!("  {}", add_style.apply_to(line));
        }
    }

    if m.statically_killed && !m.output.is_empty() {
        println!();
        for line in m.output.lines() {
            println!("  {}", dim.apply_to(line));
        }
    }
}

pub fn print_status(result: &RunResult) {
    println!(
        "Last run: {} mutants, {} killed ({} by static analysis), {} escaped ({:.1}% MSI)",
        result.total,
        result.killed,
        result.statically_killed,
        result.escaped,
        result.score * 100.0,
    );

    if !result.mutants.is_empty() {
        println!();
        for m in &result.mutants {
            print_mutant_line(m);
        }
        println!();
        println!("Use `revalidator show @m1` for details on a specific mutant.");
    }
}
