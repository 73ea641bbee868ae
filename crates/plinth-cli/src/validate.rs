//! Validate command implementation for Plinth CLI.
//!
//! Loads a model document, runs the default validators and prints every
//! problem found.

use plinth_core::{ExtensionModel, Problem, ValidationConfig, default_validators, validate_all};

use crate::colors;

/// Validate a model document.
///
/// Fails when errors were reported, or warnings when `deny_warnings` is set.
pub fn execute(model_path: &str, runtime: bool, deny_warnings: bool) -> anyhow::Result<()> {
    let model = ExtensionModel::load(model_path)?;

    let config = if runtime {
        ValidationConfig::all_phases()
    } else {
        ValidationConfig::default()
    };

    println!(
        "{}Validating{} extension '{}' ({})",
        colors::BOLD,
        colors::RESET,
        model.name,
        model_path
    );

    let reporter = validate_all(&model, &default_validators(&config));

    for problem in reporter.errors() {
        print_problem("error", colors::RED, problem);
    }
    for problem in reporter.warnings() {
        print_problem("warning", colors::YELLOW, problem);
    }

    let errors = reporter.errors().len();
    let warnings = reporter.warnings().len();

    if errors > 0 {
        anyhow::bail!("validation failed with {} error(s), {} warning(s)", errors, warnings);
    }
    if deny_warnings && warnings > 0 {
        anyhow::bail!("validation failed with {} warning(s) (--deny-warnings)", warnings);
    }

    println!(
        "{}OK{} {} warning(s)",
        colors::GREEN,
        colors::RESET,
        warnings
    );
    Ok(())
}

fn print_problem(level: &str, color: &str, problem: &Problem) {
    println!(
        "{}{}{}: {}{}{}: {}",
        color,
        level,
        colors::RESET,
        colors::CYAN,
        problem.component,
        colors::RESET,
        problem.message
    );
}
