use log::{info, warn};

use clap::Parser;
use snafu::prelude::*;
use snafu::ErrorCompat;
use std::path::Path;
use text_diff::print_diff;

use tally_pipes::*;

mod args;

fn run(args: &args::Args) -> PipeResult<()> {
    let config = config_reader::read_config(&args.config)?;
    let mut jobs = config.jobs();
    let opts = config.tally_options();
    info!("pipeline: {} jobs from {}", jobs.len(), args.config);

    let mut engine = RecordedEngine::new();
    if args.print_as_csv || config.print_as_csv {
        let mut logger = CsvVoteLogger::new(std::io::stdout());
        run_tallies(&mut jobs, &mut engine, Some(&mut logger), &opts)?;
    } else {
        run_tallies(&mut jobs, &mut engine, None, &opts)?;
    }

    apply_removals(&mut jobs)?;

    let out_dir = args.out_dir.clone().unwrap_or_else(|| ".".to_string());
    let out_dir = Path::new(&out_dir);
    let paths: Vec<String> = config.jobs.iter().map(|jc| jc.output.clone()).collect();
    write_results(&jobs, &paths, out_dir)?;

    // The reference results, if provided for comparison
    if let Some(reference) = &args.reference {
        let first = paths
            .first()
            .whatever_context("no outputs to check against the reference")?;
        let file_name = Path::new(first)
            .file_name()
            .whatever_context(format!("output path {:?} has no file name", first))?;
        check_reference(&out_dir.join(file_name), reference)?;
    }

    Ok(())
}

fn check_reference(written: &Path, reference: &str) -> PipeResult<()> {
    let current = config_reader::read_results_json(written)?;
    let expected = config_reader::read_results_json(Path::new(reference))?;
    if current != expected {
        warn!("Found differences with the reference file");
        let current_s = serde_json::to_string_pretty(&current)
            .whatever_context("failed to render the written results")?;
        let expected_s = serde_json::to_string_pretty(&expected)
            .whatever_context("failed to render the reference")?;
        print_diff(expected_s.as_str(), current_s.as_str(), "\n");
        whatever!("Difference detected between the written results and the reference");
    }
    info!("check_reference: {:?} matches the reference", written);
    Ok(())
}

fn main() {
    let args = args::Args::parse();

    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::init();
    }

    if let Err(e) = run(&args) {
        eprintln!("An error occured {}", e);
        if let Some(bt) = ErrorCompat::backtrace(&e) {
            eprintln!("trace: {}", bt);
        }
        std::process::exit(1);
    }
}
