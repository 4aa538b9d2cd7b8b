use std::io::{self, BufRead};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use prakrit_parser_lib::output::result_to_bracketed;
use prakrit_parser_lib::{AnalysisRequest, AnalysisResult, Analyzer, Config, Dialect};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "prakrit-parser", about = "Prakrit morphological analyser")]
struct Cli {
    /// Words to analyse (Devanagari, IAST or Harvard-Kyoto). If omitted, reads from stdin.
    words: Vec<String>,

    /// Dialect hint: general, maharashtri, shauraseni, magadhi or ardha_magadhi.
    #[arg(long)]
    dialect: Option<Dialect>,

    /// Show top N analyses per word.
    #[arg(short = 'n', long = "top", default_value = "1")]
    top: usize,

    /// Show every analysis per word.
    #[arg(long, conflicts_with = "top")]
    all: bool,

    /// Output in bracketed {root:class} format.
    #[arg(long)]
    bracketed: bool,

    /// Pretty-print JSON output.
    #[arg(long)]
    pretty: bool,

    /// TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => {
            let config = Config::load_toml(path)
                .with_context(|| format!("failed to load config from {}", path.display()))?;
            debug!(path = %path.display(), endpoint = ?config.lookup.endpoint, "loaded config");
            config
        }
        None => Config::default(),
    };
    let analyzer = Analyzer::from_config(&config).context("failed to set up analyser")?;

    if cli.words.is_empty() {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let line = line.context("failed to read stdin")?;
            let words: Vec<&str> = line.split_whitespace().collect();
            process_words(&words, &analyzer, &cli)?;
        }
    } else {
        let words: Vec<&str> = cli.words.iter().flat_map(|w| w.split_whitespace()).collect();
        process_words(&words, &analyzer, &cli)?;
    }
    Ok(())
}

fn process_words(words: &[&str], analyzer: &Analyzer, cli: &Cli) -> Result<()> {
    let requests: Vec<AnalysisRequest> = words
        .iter()
        .map(|w| {
            let request = AnalysisRequest::new(*w);
            match cli.dialect {
                Some(d) => request.with_dialect(d),
                None => request,
            }
        })
        .collect();
    debug!(words = requests.len(), dialect = ?cli.dialect, "analysing");

    for result in analyzer.analyze_batch(&requests) {
        if cli.bracketed {
            println!("{}", result_to_bracketed(&result));
            continue;
        }
        let trimmed = trim_result(result, cli);
        let json = if cli.pretty {
            serde_json::to_string_pretty(&trimmed)
        } else {
            serde_json::to_string(&trimmed)
        };
        println!("{}", json.context("JSON serialization failed")?);
    }
    Ok(())
}

fn trim_result(mut result: AnalysisResult, cli: &Cli) -> AnalysisResult {
    if !cli.all {
        result.analyses.truncate(cli.top);
    }
    result
}
