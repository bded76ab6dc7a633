//! docchunk CLI.
//!
//! Chunks one `.docx` file, or every `.docx` under a directory, into one
//! JSON array per document.
//!
//! Usage:
//!   docchunk `<input>` [options]
//!
//! Options:
//!   --out-dir `<dir>`      Output directory (default: data)
//!   --chunk-size `<words>` Soft word budget per chunk (default: 200)
//!   --title `<title>`      Override the document title
//!   --format `<format>`    Output format: json-pretty (default), json
//!   --fold-accents       Fold Vietnamese diacritics in chunk titles
//!   --stats              Print a per-file summary after processing

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Arg, Command};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};
use walkdir::WalkDir;

use docchunk::{chunk_file, render_chunks, ChunkConfig, ChunkStats, OutputFormat};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let matches = Command::new("docchunk")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Structural chunker for DOCX documents")
        .arg(
            Arg::new("input")
                .help("Input .docx file or a directory of .docx files")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("out-dir")
                .long("out-dir")
                .value_name("DIR")
                .help("Output directory, one <stem>.json per document")
                .default_value("data"),
        )
        .arg(
            Arg::new("chunk-size")
                .long("chunk-size")
                .value_name("WORDS")
                .help("Soft word budget per chunk")
                .default_value("200"),
        )
        .arg(
            Arg::new("title")
                .long("title")
                .value_name("TITLE")
                .help("Override the document title"),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .value_name("FORMAT")
                .help("Output format: json-pretty, json")
                .default_value("json-pretty"),
        )
        .arg(
            Arg::new("fold-accents")
                .long("fold-accents")
                .help("Fold Vietnamese diacritics in chunk titles")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("stats")
                .long("stats")
                .help("Print a per-file summary after processing")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let input = PathBuf::from(matches.get_one::<String>("input").map(String::as_str).unwrap_or(""));
    let out_dir = PathBuf::from(
        matches
            .get_one::<String>("out-dir")
            .map(String::as_str)
            .unwrap_or("data"),
    );

    let chunk_size = match matches
        .get_one::<String>("chunk-size")
        .map(String::as_str)
        .unwrap_or("200")
        .parse::<usize>()
    {
        Ok(size) if size > 0 => size,
        _ => {
            eprintln!("Error: --chunk-size must be a positive word count");
            std::process::exit(2);
        }
    };

    let format = match matches
        .get_one::<String>("format")
        .map(String::as_str)
        .unwrap_or("json-pretty")
        .parse::<OutputFormat>()
    {
        Ok(format) => format,
        Err(err) => {
            eprintln!("Error: {}", err);
            std::process::exit(2);
        }
    };

    let config = ChunkConfig {
        chunk_size,
        document_title: matches.get_one::<String>("title").cloned(),
        fold_accents: matches.get_flag("fold-accents"),
    };
    let show_stats = matches.get_flag("stats");

    let inputs = collect_inputs(&input);
    if inputs.is_empty() {
        eprintln!("Error: no .docx files found under '{}'", input.display());
        std::process::exit(1);
    }

    if let Err(err) = fs::create_dir_all(&out_dir) {
        eprintln!("Error: cannot create '{}': {}", out_dir.display(), err);
        std::process::exit(1);
    }

    let color_choice = if atty::is(atty::Stream::Stdout) {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    let mut stdout = StandardStream::stdout(color_choice);

    let mut failures = 0usize;
    for path in &inputs {
        match run_one(path, &out_dir, &config, format, show_stats) {
            Ok(count) => report(&mut stdout, path, Color::Green, &format!("{} chunks", count)),
            Err(err) => {
                failures += 1;
                report(&mut stdout, path, Color::Red, &err);
            }
        }
    }

    if failures > 0 {
        eprintln!("{} of {} documents failed", failures, inputs.len());
        std::process::exit(1);
    }
}

fn collect_inputs(input: &Path) -> Vec<PathBuf> {
    if input.is_file() {
        return vec![input.to_path_buf()];
    }
    let mut found: Vec<PathBuf> = WalkDir::new(input)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.extension()
                .map_or(false, |ext| ext.eq_ignore_ascii_case("docx"))
        })
        .collect();
    found.sort();
    found
}

fn run_one(
    path: &Path,
    out_dir: &Path,
    config: &ChunkConfig,
    format: OutputFormat,
    show_stats: bool,
) -> Result<usize, String> {
    let chunks = chunk_file(path, config).map_err(|err| err.to_string())?;
    let rendered = render_chunks(&chunks, format).map_err(|err| err.to_string())?;

    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    let out_path = out_dir.join(format!("{}.json", stem));
    fs::write(&out_path, rendered).map_err(|err| err.to_string())?;

    if show_stats {
        let stats = ChunkStats::collect(&chunks);
        println!(
            "  {} chunks, {} words, {} pages, processed at {}",
            stats.chunk_count, stats.word_count, stats.page_count, stats.processed_at
        );
    }
    Ok(chunks.len())
}

fn report(stdout: &mut StandardStream, path: &Path, color: Color, message: &str) {
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(color)));
    let _ = write!(stdout, "{}", path.display());
    let _ = stdout.reset();
    let _ = writeln!(stdout, " ... {}", message);
}
