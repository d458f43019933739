use std::fs;
use std::path::{Path, PathBuf};

use argh::FromArgs;
use beatsequence::batch::report::{
    SUMMARY_FILE, load_config, read_match_dir, render_summary, summarize, write_match_file,
};
use beatsequence::batch::{analyse, interval_sets};
use beatsequence::{AnalysisConfig, Sequence};

/// Pair every metric rearrangement of each sequence with a distinct complex match
#[derive(FromArgs)]
struct Args {
    /// analysis config file (YAML)
    #[argh(option)]
    config: Option<String>,

    /// directory for the match files
    #[argh(option, default = "String::from(\"outputsequences\")")]
    output_dir: String,

    /// take the first unused match per metric form instead of solving the whole set
    #[argh(switch)]
    quick: bool,

    /// stop a sequence's analysis after this many search steps
    #[argh(option)]
    budget: Option<u64>,

    /// analyse every interval set of 5 to 9 intervals up to 4 that sums to 12
    #[argh(switch)]
    all_sets: bool,

    /// join all match files of the output directory into the summary file
    #[argh(switch)]
    summary: bool,

    /// log search progress
    #[argh(switch, short = 'v')]
    verbose: bool,

    /// sequences as digit strings
    #[argh(positional)]
    sequences: Vec<String>,
}

fn main() {
    let args: Args = argh::from_env();

    let level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let mut config = match &args.config {
        Some(path) => match load_config(Path::new(path)) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        },
        None => AnalysisConfig::default(),
    };
    if args.quick {
        config.exhaustive = false;
    }
    if args.budget.is_some() {
        config.budget = args.budget;
    }

    let mut definitions = args.sequences.clone();
    if args.all_sets {
        eprintln!("calculating possible combinations");
        definitions.extend(
            interval_sets(5..=9, 4, 12)
                .iter()
                .map(|set| set.iter().map(|i| i.to_string()).collect::<String>()),
        );
    }
    if definitions.is_empty() && !args.summary {
        eprintln!("Nothing to analyse: give sequences, --all-sets or --summary");
        std::process::exit(1);
    }

    let output_dir = PathBuf::from(&args.output_dir);
    if let Err(e) = fs::create_dir_all(&output_dir) {
        eprintln!("Error creating {}: {e}", output_dir.display());
        std::process::exit(1);
    }

    for definition in &definitions {
        let sequence: Sequence = match definition.parse() {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Error in '{definition}': {e}");
                std::process::exit(1);
            }
        };
        eprintln!("Checking: {sequence}");

        let assignments = match analyse(&sequence, &config) {
            Ok(a) => a,
            Err(e) => {
                eprintln!("Error analysing {sequence}: {e}");
                std::process::exit(1);
            }
        };
        eprintln!("{} matches found for {sequence}", assignments.len());

        match write_match_file(&output_dir, &sequence, &assignments) {
            Ok(path) => println!("{}", path.display()),
            Err(e) => {
                eprintln!("{e}");
                std::process::exit(1);
            }
        }
    }

    if args.summary {
        let all = match read_match_dir(&output_dir) {
            Ok(a) => a,
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        };
        let summary_path = output_dir.join(SUMMARY_FILE);
        match fs::write(&summary_path, render_summary(&summarize(&all))) {
            Ok(_) => println!("{}", summary_path.display()),
            Err(e) => {
                eprintln!("Error writing {}: {e}", summary_path.display());
                std::process::exit(1);
            }
        }
    }
}
