//! Slate interpreter CLI.
//!
//! Exit codes:
//! - 0–9: program-controlled (EXIT or fall-through)
//! - 10: missing/unknown parameter
//! - 11: input file cannot be opened
//! - 12: output stream failure
//! - 31: source is not well-formed XML
//! - 32: source violates the document grammar
//! - 52–58: runtime error classes

mod streams;

use slate_common::Program;
use streams::{LineInput, StreamOutput};
use std::fs;
use std::io::{self, BufReader, Read};
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    process::exit(run(&std::env::args().skip(1).collect::<Vec<_>>()));
}

fn run(args: &[String]) -> i32 {
    let mut source_path: Option<String> = None;
    let mut input_path: Option<String> = None;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--help" | "-h" => {
                print_usage();
                return 0;
            }
            "--source" => match iter.next() {
                Some(path) => source_path = Some(path.clone()),
                None => return usage_error("--source requires a file"),
            },
            "--input" => match iter.next() {
                Some(path) => input_path = Some(path.clone()),
                None => return usage_error("--input requires a file"),
            },
            other => {
                if let Some(path) = other.strip_prefix("--source=") {
                    source_path = Some(path.to_string());
                } else if let Some(path) = other.strip_prefix("--input=") {
                    input_path = Some(path.to_string());
                } else {
                    return usage_error(&format!("unknown argument '{other}'"));
                }
            }
        }
    }

    // Both streams cannot come from stdin at once.
    if source_path.is_none() && input_path.is_none() {
        return usage_error("at least one of --source and --input is required");
    }

    let source = match read_source(source_path.as_deref()) {
        Ok(text) => text,
        Err(code) => return code,
    };

    let program = match slate_loader::parse_program(&source) {
        Ok(program) => program,
        Err(err) => {
            eprintln!("error: {err}");
            return err.exit_code();
        }
    };

    match input_path {
        Some(path) => match fs::File::open(&path) {
            Ok(file) => execute(&program, &mut LineInput::new(BufReader::new(file))),
            Err(err) => {
                eprintln!("error: cannot open '{path}': {err}");
                11
            }
        },
        None => execute(&program, &mut LineInput::new(io::stdin().lock())),
    }
}

fn read_source(path: Option<&str>) -> Result<String, i32> {
    match path {
        Some(path) => fs::read_to_string(path).map_err(|err| {
            eprintln!("error: cannot open '{path}': {err}");
            11
        }),
        None => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text).map_err(|err| {
                eprintln!("error: cannot read stdin: {err}");
                11
            })?;
            Ok(text)
        }
    }
}

fn execute(program: &Program, input: &mut dyn slate_vm::Input) -> i32 {
    let mut output = StreamOutput::new(io::stdout());
    let mut diag = StreamOutput::new(io::stderr());

    match slate_vm::run(program, input, &mut output, &mut diag) {
        Ok(code) => {
            if output.failed() || diag.failed() {
                eprintln!("error: output stream failure");
                return 12;
            }
            code
        }
        Err(err) => {
            eprintln!("error: {err}");
            err.exit_code()
        }
    }
}

fn usage_error(message: &str) -> i32 {
    eprintln!("error: {message}");
    eprintln!();
    print_usage();
    10
}

fn print_usage() {
    eprintln!("Usage: slate [--source FILE] [--input FILE]");
    eprintln!();
    eprintln!("Interprets a Slate XML program.");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --source FILE   Program document (defaults to stdin)");
    eprintln!("  --input FILE    Input lines for READ (defaults to stdin)");
    eprintln!("  -h, --help      Show this help");
    eprintln!();
    eprintln!("At least one of --source and --input must name a file.");
}
