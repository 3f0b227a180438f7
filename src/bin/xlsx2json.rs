//! xlsx2json command-line tool.
//!
//! Converts every spreadsheet in the input directory into a JSON file in the
//! output directory.

use std::path::PathBuf;
use std::process;

use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use xlsx2json::{batch, BatchConfig, ConverterBuilder, OutputStyle, XlsxToJsonError};

const INPUT_DIR_ENV: &str = "XLSX2JSON_INPUT_DIR";
const OUTPUT_DIR_ENV: &str = "XLSX2JSON_OUTPUT_DIR";

/// Exit status when some files were skipped.
const EXIT_PARTIAL: i32 = 2;

#[derive(Debug)]
struct Options {
    input_dir: PathBuf,
    output_dir: PathBuf,
    style: OutputStyle,
    indent: Option<usize>,
}

fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("xlsx2json");

    let options = match parse_args(args.get(1..).unwrap_or_default()) {
        Ok(Some(options)) => options,
        Ok(None) => {
            print_usage(program);
            return;
        }
        Err(msg) => {
            eprintln!("Error: {}", msg);
            print_usage(program);
            process::exit(1);
        }
    };

    match run(&options) {
        Ok(true) => {}
        Ok(false) => process::exit(EXIT_PARTIAL),
        Err(e) => {
            error!(error = %e, "Batch conversion failed");
            process::exit(1);
        }
    }
}

fn run(options: &Options) -> Result<bool, XlsxToJsonError> {
    let mut builder = ConverterBuilder::new().with_output_style(options.style);
    if let Some(indent) = options.indent {
        builder = builder.with_indent(indent);
    }
    let converter = builder.build()?;

    let config = BatchConfig::new(&options.input_dir, &options.output_dir);
    let report = batch::run(&converter, &config)?;

    info!(
        converted = report.converted.len(),
        skipped = report.skipped.len(),
        "Done"
    );
    Ok(report.is_clean())
}

/// Returns `Ok(None)` when help was requested.
fn parse_args(args: &[String]) -> Result<Option<Options>, String> {
    let mut options = Options {
        input_dir: env_or_default(INPUT_DIR_ENV),
        output_dir: env_or_default(OUTPUT_DIR_ENV),
        style: OutputStyle::Pretty,
        indent: None,
    };

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--input-dir" => {
                options.input_dir = PathBuf::from(value_of(args, i)?);
                i += 2;
            }
            "--output-dir" => {
                options.output_dir = PathBuf::from(value_of(args, i)?);
                i += 2;
            }
            "--indent" => {
                let raw = value_of(args, i)?;
                let indent = raw
                    .parse::<usize>()
                    .map_err(|_| format!("Invalid indent: {}", raw))?;
                options.indent = Some(indent);
                i += 2;
            }
            "--compact" => {
                options.style = OutputStyle::Compact;
                i += 1;
            }
            "-h" | "--help" => return Ok(None),
            other => return Err(format!("Unknown option: {}", other)),
        }
    }

    Ok(Some(options))
}

fn value_of(args: &[String], i: usize) -> Result<&str, String> {
    args.get(i + 1)
        .map(String::as_str)
        .ok_or_else(|| format!("{} requires a value", args[i]))
}

fn env_or_default(key: &str) -> PathBuf {
    std::env::var_os(key)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(batch::DEFAULT_CONFIG_DIR))
}

fn print_usage(program: &str) {
    eprintln!("Usage: {} [options]", program);
    eprintln!("\nOptions:");
    eprintln!("  --input-dir <dir>    Directory containing .xlsx files (env: {})", INPUT_DIR_ENV);
    eprintln!("  --output-dir <dir>   Directory for .json output (env: {})", OUTPUT_DIR_ENV);
    eprintln!("  --compact            Write single-line JSON");
    eprintln!("  --indent <n>         Indent width for pretty output (default: 4)");
    eprintln!("  -h, --help           Show this help");
    eprintln!("\nDefault directory: {}", batch::DEFAULT_CONFIG_DIR);
}
