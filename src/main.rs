use std::fs;
use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use slidestream::{Config, SlideParser};

#[derive(Parser)]
#[command(name = "slidestream")]
#[command(about = "Replay slide markup as a token stream and print the parsed slides as JSON")]
struct Cli {
    /// Input markup file
    input: PathBuf,

    /// Output JSON file (defaults to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Characters added to the stream per step
    #[arg(long, default_value_t = 16)]
    chunk_size: usize,

    /// Parser config (TOML); defaults are used if the file does not exist
    #[arg(short, long, default_value = "slidestream.toml")]
    config: PathBuf,

    /// Keep generating marks on the final slides
    #[arg(long)]
    keep_generating: bool,

    /// Print compact instead of pretty JSON
    #[arg(long)]
    compact: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> slidestream::Result<()> {
    let markup = fs::read_to_string(&cli.input)?;
    let config = Config::load(&cli.config)?;
    let mut parser = SlideParser::with_config(config);

    // Replay the file the way a completion arrives: the full text so far, growing
    let step = cli.chunk_size.max(1);
    let boundaries: Vec<usize> = markup
        .char_indices()
        .map(|(i, _)| i)
        .skip(step)
        .step_by(step)
        .chain(std::iter::once(markup.len()))
        .collect();
    for end in boundaries {
        let completed = parser.parse_chunk(&markup[..end]);
        for slide in &completed {
            tracing::info!(id = %slide.id, nodes = slide.content.len(), "slide completed");
        }
    }

    parser.finalize();
    if !cli.keep_generating {
        parser.clear_all_generating_marks();
    }

    let slides = parser.get_all_slides();
    let json = if cli.compact {
        serde_json::to_string(slides)?
    } else {
        serde_json::to_string_pretty(slides)?
    };

    match &cli.output {
        Some(path) => fs::write(path, json)?,
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", json)?;
        }
    }
    eprintln!("Parsed {} slides from {}", slides.len(), cli.input.display());
    Ok(())
}
