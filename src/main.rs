use std::{
    env,
    fs::{read_to_string, write},
    path::PathBuf,
    process,
    time::Instant,
};

use log::{info, LevelFilter};
use simple_logger::SimpleLogger;

use corepython::{compile, format_error};

const USAGE: &str = "usage: corepython <input.py> [-o <output.wasm>] [--verbose]";

struct Options {
    input: PathBuf,
    output: PathBuf,
    verbose: bool,
}

fn parse_args(args: &[String]) -> Result<Options, String> {
    let mut input = None;
    let mut output = None;
    let mut verbose = false;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-o" | "--output" => match iter.next() {
                Some(path) => output = Some(PathBuf::from(path)),
                None => return Err(format!("missing path after `{}`", arg)),
            },
            "-v" | "--verbose" => verbose = true,
            "-h" | "--help" => return Err(USAGE.to_string()),
            flag if flag.starts_with('-') => return Err(format!("unknown option `{}`", flag)),
            path => {
                if input.is_some() {
                    return Err(format!("unexpected argument `{}`", path));
                }
                input = Some(PathBuf::from(path));
            }
        }
    }

    let input = input.ok_or_else(|| USAGE.to_string())?;
    let output = output.unwrap_or_else(|| input.with_extension("wasm"));

    Ok(Options {
        input,
        output,
        verbose,
    })
}

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();

    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("{}", message);
            process::exit(2);
        }
    };

    let level = if options.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    if let Err(error) = SimpleLogger::new().with_level(level).env().init() {
        eprintln!("Failed to initialise logger: {}", error);
    }

    let start = Instant::now();

    info!("Reading {}", options.input.display());
    let source = match read_to_string(&options.input) {
        Ok(source) => source,
        Err(error) => {
            eprintln!("Failed to read {}: {}", options.input.display(), error);
            process::exit(2);
        }
    };

    let bytes = match compile(&source) {
        Ok(bytes) => bytes,
        Err(error) => {
            let file_name = options.input.to_string_lossy();
            eprint!("{}", format_error(&error, &source, &file_name));
            process::exit(1);
        }
    };

    info!("Writing WebAssembly to {}", options.output.display());
    if let Err(error) = write(&options.output, &bytes) {
        eprintln!("Failed to write {}: {}", options.output.display(), error);
        process::exit(2);
    }

    info!("Compiled {} bytes in {:?}", bytes.len(), start.elapsed());
}
