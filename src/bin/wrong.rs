use std::fs;
use std::path::{Path, PathBuf};

use argh::FromArgs;
use beatsequence::batch::report::{VARIANTS_FILE, load_config, parse_summary, render_variants};
use beatsequence::batch::wrong_versions;
use beatsequence::{AnalysisConfig, Sequence};

/// Write a wrong version of every metric and complex sequence of a summary file
#[derive(FromArgs)]
struct Args {
    /// output file (defaults to wrongversions.txt next to the input)
    #[argh(option)]
    output: Option<String>,

    /// analysis config file (YAML), read for its seed
    #[argh(option)]
    config: Option<String>,

    /// seed for the random joins and splits, overriding the config file
    #[argh(option)]
    seed: Option<u64>,

    /// log every variant found
    #[argh(switch, short = 'v')]
    verbose: bool,

    /// summary file written by `beatsequence --summary`
    #[argh(positional)]
    input: String,
}

fn parse_all(definitions: &[String]) -> Result<Vec<Sequence>, String> {
    definitions
        .iter()
        .map(|d| d.parse::<Sequence>().map_err(|e| format!("'{d}': {e}")))
        .collect()
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
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    let input_path = &args.input;
    let content = match fs::read_to_string(input_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error reading {input_path}: {e}");
            std::process::exit(1);
        }
    };

    let summary = match parse_summary(&content) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error parsing {input_path}: {e}");
            std::process::exit(1);
        }
    };

    let (metric, complex) = match (parse_all(&summary.metric), parse_all(&summary.complex)) {
        (Ok(m), Ok(c)) => (m, c),
        (Err(e), _) | (_, Err(e)) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let (metric_variants, complex_variants) = match wrong_versions(&metric, &complex, &config) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Error creating wrong versions: {e}");
            std::process::exit(1);
        }
    };
    eprintln!(
        "{} metric and {} complex wrong versions",
        metric_variants.len(),
        complex_variants.len()
    );

    let output_path = match &args.output {
        Some(o) => PathBuf::from(o),
        None => Path::new(input_path)
            .parent()
            .unwrap_or(Path::new("."))
            .join(VARIANTS_FILE),
    };
    match fs::write(&output_path, render_variants(&metric_variants, &complex_variants)) {
        Ok(_) => println!("{}", output_path.display()),
        Err(e) => {
            eprintln!("Error writing {}: {e}", output_path.display());
            std::process::exit(1);
        }
    }
}
