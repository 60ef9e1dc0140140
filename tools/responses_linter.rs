/// Responses Linter — validates a responses file before it is shipped.
///
/// Usage: responses_linter <file.ron|file.json>

use clap::Parser;
use mommy::{Responses, ResponseType, Template};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::process;

#[derive(Debug, Parser)]
#[command(name = "responses_linter", about = "Validate a responses file")]
struct Args {
    /// responses file to check
    file: PathBuf,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let responses = match Responses::load(&args.file) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("ERROR: Failed to load responses file: {}", e);
            process::exit(1);
        }
    };

    println!(
        "Loaded {} moods and {} variables",
        responses.moods.len(),
        responses.vars.len()
    );

    let (errors, warnings) = lint_responses(&responses);

    println!("\n=== Responses Lint Report ===\n");

    if errors.is_empty() && warnings.is_empty() {
        println!("All checks passed!");
    }

    for warning in &warnings {
        println!("WARNING: {}", warning);
    }

    for error in &errors {
        println!("ERROR: {}", error);
    }

    println!(
        "\nSummary: {} errors, {} warnings",
        errors.len(),
        warnings.len()
    );

    if !errors.is_empty() {
        process::exit(1);
    }
}

fn lint_responses(responses: &Responses) -> (Vec<String>, Vec<String>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let mut referenced = BTreeSet::new();

    let mut moods: Vec<_> = responses.moods.iter().collect();
    moods.sort_by(|a, b| a.0.cmp(b.0));

    for (name, mood) in moods {
        for response in ResponseType::ALL {
            let templates = mood.templates(response);
            if templates.is_empty() {
                errors.push(format!("Mood '{}' has no {} templates", name, response));
            }

            for raw in templates {
                for key in Template::compile(raw).keys() {
                    referenced.insert(key.as_str().to_string());
                    // Unknown keys render as an empty string at generation time.
                    if !responses.vars.contains_key(key) {
                        warnings.push(format!(
                            "Mood '{}' {} template {:?} references unknown variable '{}'",
                            name, response, raw, key
                        ));
                    }
                }
            }
        }
    }

    let mut vars: Vec<_> = responses.vars.iter().collect();
    vars.sort_by(|a, b| a.0.cmp(b.0));

    for (key, var) in vars {
        if var.defaults.is_empty() {
            errors.push(format!("Variable '{}' has no default values", key));
        }
        if key.as_str() == "mood" {
            for mood in &var.defaults {
                if !responses.moods.contains_key(mood.as_str()) {
                    errors.push(format!(
                        "Variable 'mood' defaults to '{}' which is not a defined mood",
                        mood
                    ));
                }
            }
        } else if !referenced.contains(key.as_str()) {
            warnings.push(format!("Variable '{}' is never used by any template", key));
        }
    }

    (errors, warnings)
}
