use anyhow::Context;
use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use electoral_explorer::exploration::{ExplorationConfig, explore};
use electoral_explorer::processor::dataset::Dataset;
use electoral_explorer::render::JsonRenderer;
use log::{error, info};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(author, version, about)]
struct Args {
    /// Input file (CSV with a header row)
    infile: PathBuf,
    /// Directory for chart and report JSON files
    #[arg(short, long, default_value = "out")]
    out_dir: PathBuf,
    /// Exploration settings (JSON)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Ages at or above this are left out of the trimmed box plot
    #[arg(long)]
    max_age: Option<i64>,
    /// Number of age histogram bins
    #[arg(long)]
    bins: Option<usize>,
    /// Produce compact JSON files
    #[arg(long)]
    compact: bool,
    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,
}

fn load_config(args: &Args) -> anyhow::Result<ExplorationConfig> {
    let mut config = match &args.config {
        Some(path) => ExplorationConfig::from_json_file(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => ExplorationConfig::default(),
    };
    if let Some(max_age) = args.max_age {
        config.max_age = max_age;
    }
    if let Some(bins) = args.bins {
        config.age_bins = bins;
    }
    Ok(config)
}

fn process(args: &Args) -> anyhow::Result<()> {
    let config = load_config(args)?;
    let dataset = Dataset::load_csv(&args.infile)
        .with_context(|| format!("loading {}", args.infile.display()))?;
    let mut renderer = JsonRenderer::new(&args.out_dir, args.compact)?;
    let report = explore(&dataset, &config, &mut renderer)?;
    let path = renderer.write_json("report", &report)?;
    info!(
        "{} files written, report: {}",
        renderer.written().len(),
        path.display()
    );
    Ok(())
}

fn main() {
    let args = Args::parse();
    pretty_env_logger::formatted_timed_builder()
        .filter_level(args.verbose.log_level_filter())
        .init();
    if let Err(e) = process(&args) {
        error!("{e:#}");
        process::exit(1);
    }
}
