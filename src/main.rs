use anyhow::{Context, Result};
use clap::Parser;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use persona_vibes::export::write_all;
use persona_vibes::{Lexicon, Pipeline, PipelineConfig, RunOptions};

/// Persona Vibes - influencer persona profile and content blueprint builder
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Input posts: a JSON array or JSON Lines file
    input: PathBuf,

    /// Output directory for generated files (default: "out")
    #[arg(short, long, default_value = "out")]
    output_dir: PathBuf,

    /// Influencer handle recorded in the profile
    #[arg(long)]
    handle: Option<String>,

    /// Language normalized text is brought into
    #[arg(long, default_value = "it")]
    target_lang: String,

    /// Platform list override (repeatable)
    #[arg(long = "platform")]
    platforms: Vec<String>,

    /// Language list override (repeatable)
    #[arg(long = "language")]
    languages: Vec<String>,

    /// Lexicon JSON (overrides PERSONA_LEXICON environment variable)
    #[arg(long, env = "PERSONA_LEXICON")]
    lexicon: Option<PathBuf>,

    /// Also write persona.md
    #[arg(long)]
    markdown: bool,
}

/// Accepts a top-level JSON array, or one JSON object per line.
fn read_records(path: &Path) -> Result<Vec<Value>> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    if raw.trim_start().starts_with('[') {
        return serde_json::from_str(&raw).with_context(|| format!("parse JSON array {}", path.display()));
    }
    raw.lines()
        .enumerate()
        .filter(|(_, l)| !l.trim().is_empty())
        .map(|(i, l)| serde_json::from_str(l).with_context(|| format!("parse {} line {}", path.display(), i + 1)))
        .collect()
}

fn non_empty(v: Vec<String>) -> Option<Vec<String>> {
    if v.is_empty() {
        None
    } else {
        Some(v)
    }
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(false)
        .with_line_number(true)
        .init();

    info!("Starting persona_vibes");

    let args = Args::parse();

    let lexicon = match &args.lexicon {
        Some(path) => {
            debug!("Loading lexicon from: {}", path.display());
            Lexicon::from_path(path).with_context(|| format!("load lexicon {}", path.display()))?
        }
        None => {
            debug!("Using built-in lexicon");
            Lexicon::default()
        }
    };

    let records = read_records(&args.input)?;
    info!("Input loaded - records={}, path={}", records.len(), args.input.display());

    let config = PipelineConfig {
        target_language: args.target_lang.clone(),
        lexicon,
        ..PipelineConfig::default()
    };
    let options = RunOptions {
        handle: args.handle.clone().unwrap_or_else(|| "unknown".to_string()),
        platforms: non_empty(args.platforms.clone()),
        languages: non_empty(args.languages.clone()),
    };

    let result = Pipeline::new(config).run(&records, &options)?;

    let persist_start = std::time::Instant::now();
    write_all(&args.output_dir, &result, args.markdown)?;
    info!(
        "Output persisted - duration={:.2}s, directory={}",
        persist_start.elapsed().as_secs_f32(),
        args.output_dir.display()
    );
    Ok(())
}
