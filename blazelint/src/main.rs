use blazelint_lib::blaze_lint::lint_stylesheet;
use blazelint_lib::rules::Severity;
use clap::Parser;
use rayon::prelude::*;
use std::fs;

const BLAZELINT_INTRO: &str = r#"
        ____  __                 __    _       __
       / __ )/ /___ _____  ___  / /   (_)___  / /_
      / __  / / __ `/_  / / _ \/ /   / / __ \/ __/
     / /_/ / / /_/ / / /_/  __/ /___/ / / / / /_
    /_____/_/\__,_/ /___/\___/_____/_/_/ /_/\__/

    BlazeLint - Accessibility linting for CSS & SCSS
"#;

#[derive(Parser)]
#[command(name = "BlazeLint")]
#[command(about = "Lint CSS/SCSS stylesheets for accessibility issues")]
struct Args {
    /// Stylesheet files to lint.
    files: Vec<String>,

    /// Report findings as errors instead of warnings.
    #[arg(long)]
    error: bool,

    /// Suppress the banner.
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    env_logger::init();

    let args: Args = Args::parse();
    if !args.quiet {
        println!("{}", BLAZELINT_INTRO);
    }
    if args.files.is_empty() {
        eprintln!("No input files given");
        std::process::exit(1);
    }

    let severity = if args.error {
        Severity::Error
    } else {
        Severity::Warning
    };

    // each file is an independent tree; lint them in parallel
    let failed = args
        .files
        .par_iter()
        .map(|file| lint_file(file, severity))
        .reduce(|| false, |a, b| a || b);

    if failed {
        std::process::exit(1);
    }
}

/// Lint one file and print its findings. Returns true if the file produced
/// issues or could not be read.
fn lint_file(file: &str, severity: Severity) -> bool {
    let source = match fs::read_to_string(file) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error reading stylesheet {}: {}", file, e);
            return true;
        }
    };

    match lint_stylesheet(&source, severity) {
        Ok(issues) => {
            for issue in &issues {
                println!("{}:{}", file, issue);
            }
            !issues.is_empty()
        }
        Err(e) => {
            eprintln!("Error linting {}: {}", file, e);
            true
        }
    }
}
