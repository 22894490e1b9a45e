mod report;

use std::error::Error;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use planar_truss::{solve_request, ErrorReport, TrussLayout, TrussRequest};
use report::render_report;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Parsed command-line arguments.
#[derive(Debug, Default)]
struct Args {
    /// Layout file; the built-in reference truss when absent.
    layout: Option<PathBuf>,
    /// Request file; standard input when absent.
    request: Option<PathBuf>,
    /// Print a text table instead of JSON.
    report: bool,
}

/// Usage line printed for `--help` and argument errors.
const USAGE: &str = "usage: planar-truss [--layout <file>] [--report] [<request.json>]";

/// Interpret the process arguments.
fn parse_args(mut raw: impl Iterator<Item = String>) -> Result<Args, String> {
    let mut args = Args::default();
    while let Some(arg) = raw.next() {
        match arg.as_str() {
            "--layout" => {
                let path = raw.next().ok_or("--layout needs a file")?;
                args.layout = Some(PathBuf::from(path));
            }
            "--report" => args.report = true,
            "-h" | "--help" => return Err(USAGE.to_string()),
            flag if flag.starts_with('-') => return Err(format!("unknown option {flag}\n{USAGE}")),
            path if args.request.is_none() => args.request = Some(PathBuf::from(path)),
            _ => return Err(USAGE.to_string()),
        }
    }
    Ok(args)
}

fn main() -> ExitCode {
    // Diagnostics go to stderr so stdout only ever carries the result.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::from(2);
        }
    };

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(problem) => {
            eprintln!("{problem}");
            ExitCode::from(2)
        }
    }
}

/// Solve one request; `Ok(false)` means the analysis itself was rejected.
fn run(args: &Args) -> Result<bool, Box<dyn Error>> {
    // The layout fixes the shape of the truss: which joints exist, how they are
    // connected and where the supports sit. See
    // https://en.wikipedia.org/wiki/Truss
    let layout = match &args.layout {
        Some(path) => TrussLayout::from_file(path)?,
        None => TrussLayout::reference(),
    };

    // The request carries the numbers: dimensions, loads and material.
    let payload = match &args.request {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    // Run the direct stiffness method for the configured truss. Any failure is
    // reported as a structured error so callers can tell the kinds apart.
    // https://en.wikipedia.org/wiki/Direct_stiffness_method
    let outcome = TrussRequest::from_json(&payload)
        .and_then(|request| solve_request(&layout, &request));

    match outcome {
        Ok(response) if args.report => {
            print!("{}", render_report(&response));
            Ok(true)
        }
        Ok(response) => {
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(true)
        }
        Err(failure) => {
            error!(kind = failure.kind(), "{failure}");
            println!("{}", serde_json::to_string(&ErrorReport::from(&failure))?);
            Ok(false)
        }
    }
}
