use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{debug, error, info};

use tech_similarity_graph::{PipelineConfig, PipelineError, SimilarityPipeline, TextCorpus};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Cbor,
}

/// Similarity graph of technology descriptions
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Corpus file: JSON array of records (with --column) or one text per line
    #[arg(short, long)]
    input: PathBuf,

    /// Record field holding the description text
    #[arg(short, long)]
    column: Option<String>,

    /// TOML file with run parameters; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Similarity threshold in [0.0, 1.0]
    #[arg(short, long)]
    threshold: Option<f64>,

    /// Keep only texts containing this keyword and their neighbours
    #[arg(short, long)]
    keyword: Option<String>,

    /// Number of rows in the ranked pair table
    #[arg(long)]
    top_n: Option<usize>,

    /// Layout seed
    #[arg(long)]
    seed: Option<u64>,

    /// Layout iterations
    #[arg(long)]
    iterations: Option<usize>,

    #[arg(short, long, value_enum, default_value = "json")]
    format: Format,

    /// Output file (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl Args {
    fn pipeline_config(&self) -> Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => {
                debug!("Using config file from --config argument: {}", path.display());
                PipelineConfig::load(path).map_err(PipelineError::from)?
            }
            None => PipelineConfig::default(),
        };
        if let Some(threshold) = self.threshold {
            config.threshold = threshold;
        }
        if let Some(keyword) = &self.keyword {
            config.keyword = keyword.clone();
        }
        if let Some(top_n) = self.top_n {
            config.top_n = top_n;
        }
        if let Some(seed) = self.seed {
            config.layout.seed = seed;
        }
        if let Some(iterations) = self.iterations {
            config.layout.iterations = iterations;
        }
        config.validate()?;
        Ok(config)
    }
}

fn report_failure(err: &PipelineError) {
    error!("{}", err);
    if let Some(hint) = err.hint() {
        error!("hint: {}", hint);
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let started = Instant::now();

    let config = args.pipeline_config()?;
    let corpus = TextCorpus::load(&args.input, args.column.as_deref())
        .map_err(PipelineError::from)
        .with_context(|| format!("loading {}", args.input.display()))?;
    info!("Corpus loaded - rows={}, input={}", corpus.len(), args.input.display());

    let output = match SimilarityPipeline::new(corpus).and_then(|p| p.run(&config)) {
        Ok(output) => output,
        Err(err) => {
            report_failure(&err);
            std::process::exit(1);
        }
    };
    let report = output.into_report(config);

    let bytes = match args.format {
        Format::Json => report.to_json()?.into_bytes(),
        Format::Cbor => report.to_cbor()?,
    };
    match &args.output {
        Some(path) => std::fs::write(path, &bytes)
            .with_context(|| format!("writing {}", path.display()))?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&bytes)?;
            if matches!(args.format, Format::Json) {
                writeln!(stdout)?;
            }
        }
    }

    info!(
        "Done - nodes={}, edges={}, ranked={}, elapsed={:.2}ms",
        report.graph.nodes.len(),
        report.graph.edges.len(),
        report.ranked.len(),
        started.elapsed().as_secs_f64() * 1000.0
    );
    Ok(())
}
