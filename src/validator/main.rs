//! Standalone validator for rules files.
//!
//! Checks a rules JSON file for empty names, empty filter, channel or target
//! lists, missing `chance` options and duplicate rule names per guild.

use std::process::ExitCode;

use clap::Parser;

use nero_bot::filters::KnownFilters;
use nero_bot::rules::MemoryRuleStore;

/// Rules file validator.
#[derive(Parser, Debug)]
#[command(name = "validate_rules")]
#[command(about = "Validates filter rule files for the Nero chat bot")]
#[command(version)]
struct Args {
    /// Path to the JSON rules file to validate.
    #[arg(short, long, default_value = "rules.json")]
    file: String,

    /// Generate an example rules file at the specified path.
    #[arg(long)]
    generate_example: Option<String>,

    /// Show detailed information for each rule.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Some(output_path) = args.generate_example {
        return generate_example(&output_path);
    }

    validate_rules(&args.file, args.verbose)
}

fn generate_example(output_path: &str) -> ExitCode {
    let example = MemoryRuleStore::example();

    match example.save_to_file(output_path) {
        Ok(()) => {
            println!("✓ Example rules written to: {output_path}");
            println!("\nThe file contains {} example rules.", example.len());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("✗ Failed to write example file: {e}");
            ExitCode::FAILURE
        }
    }
}

fn validate_rules(path: &str, verbose: bool) -> ExitCode {
    println!("Validating: {path}\n");

    let store = match MemoryRuleStore::load_from_file(path) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("✗ Failed to load rules: {e}");
            return ExitCode::FAILURE;
        }
    };

    let filters = KnownFilters::default();
    let mut errors = 0;
    let mut warnings = 0;

    for (guild, rule, result) in store.validate_all() {
        if verbose {
            let channels = if rule.is_global() {
                "every channel".to_owned()
            } else {
                rule.locations.join(", ")
            };
            let targets = if rule.targets_everyone() {
                "everyone".to_owned()
            } else {
                rule.targets.join(", ")
            };
            println!(
                "[{guild}] {} -> {} in {channels} for {targets}",
                rule.rule_name,
                rule.filter_names.join(", ")
            );
        }

        if let Err(e) = result {
            errors += 1;
            println!("  ✗ Error: {e}");
            continue;
        }

        for filter in rule.filter_names.iter().filter(|f| !filters.is_known(f)) {
            warnings += 1;
            println!(
                "  ⚠ Warning: rule '{}' uses unknown filter '{filter}' (known: {})",
                rule.rule_name,
                filters.names().join(", ")
            );
        }

        match rule.options.chance() {
            Some(chance) if !(0.0..=1.0).contains(&chance) => {
                warnings += 1;
                println!(
                    "  ⚠ Warning: rule '{}' has chance {chance} outside 0..=1",
                    rule.rule_name
                );
            }
            _ if verbose => println!("  ✓ OK"),
            _ => {}
        }
    }

    println!();

    let total = store.len();

    if errors == 0 {
        println!(
            "✓ All {total} rules in {} guild(s) are valid!",
            store.rules.len()
        );
        if warnings > 0 {
            println!("  ({warnings} warning(s))");
        }
        ExitCode::SUCCESS
    } else {
        println!("✗ Validation failed: {errors} error(s) in {total} rules");
        println!("  Valid: {}/{total}", total - errors);
        ExitCode::FAILURE
    }
}
