//! Command-line entry point: analyse and cluster the audio files in a folder.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, error, info, warn};

use audiocluster::analysis::{DescriptorExtractor, SymphoniaDecoder};
use audiocluster::app_dirs;
use audiocluster::config::{AnalysisConfig, ConfigError, ValidatedConfig};
use audiocluster::logging;
use audiocluster::pipeline::{AnalysisOutcome, CollectEvent, PipelineError, analyze_folder};
use audiocluster::plot::{
    PlotOptions, RenderError, format_cluster_summary, format_loadings, render_scatter,
};

#[derive(Debug, Parser)]
#[command(name = "audiocluster", version)]
#[command(about = "Analyze and cluster audio files in a folder.")]
struct Args {
    /// Folder containing audio files
    #[arg(default_value = "./public/audio")]
    folder: PathBuf,

    /// Number of clusters (default 3)
    #[arg(long, allow_negative_numbers = true)]
    clusters: Option<i64>,

    /// Seed for cluster initialisation (default 42)
    #[arg(long)]
    seed: Option<u64>,

    /// Where to write the scatter plot (default analysis_result.png)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// TOML config file; CLI flags override its values
    #[arg(long, env = "AUDIOCLUSTER_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

fn main() -> ExitCode {
    let args = Args::parse();
    if let Err(err) = logging::init() {
        logging::init_stderr_only();
        warn!("Log file disabled: {err}");
    }
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), CliError> {
    let config = resolve_config(args)?;
    debug!(?config, "Resolved configuration");

    println!("Scanning folder: {}...", args.folder.display());
    let extractor = DescriptorExtractor::new(SymphoniaDecoder, config.extraction.clone());
    let outcome = analyze_folder(&args.folder, &extractor, &config.grouping, &mut report)?;
    let result = match outcome {
        AnalysisOutcome::NoAudioFiles => {
            println!("No audio files found.");
            return Ok(());
        }
        AnalysisOutcome::NoFeaturesExtracted { failed } => {
            info!(failed, "No file could be analysed");
            println!("Could not extract features from any files.");
            return Ok(());
        }
        AnalysisOutcome::Completed(result) => result,
    };

    println!("\nFeature Loadings (Correlations with axes):");
    print!("{}", format_loadings(result.projection()));
    render_scatter(&result, &config.output, &PlotOptions::default())?;
    println!(
        "\nAnalysis complete. Visualization saved to {}",
        config.output.display()
    );
    println!("\nCluster Summary:");
    print!("{}", format_cluster_summary(&result));
    Ok(())
}

/// Config file (explicit or default location), then CLI overrides, then validation.
fn resolve_config(args: &Args) -> Result<ValidatedConfig, CliError> {
    let mut config = match &args.config {
        Some(path) => AnalysisConfig::load(path)?,
        None => match default_config_file() {
            Some(path) => {
                info!(path = %path.display(), "Using config file");
                AnalysisConfig::load(&path)?
            }
            None => AnalysisConfig::default(),
        },
    };
    if let Some(clusters) = args.clusters {
        config.clusters = clusters;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(output) = &args.output {
        config.output = output.clone();
    }
    Ok(config.validate()?)
}

fn default_config_file() -> Option<PathBuf> {
    match app_dirs::default_config_file() {
        Ok(path) if path.is_file() => Some(path),
        Ok(_) => None,
        Err(err) => {
            debug!("No default config location: {err}");
            None
        }
    }
}

fn report(event: &CollectEvent<'_>) {
    match event {
        CollectEvent::Discovered { total } => {
            println!("Found {total} audio files. Analyzing...");
        }
        CollectEvent::FileStarted { index, total, path } => {
            debug!(index, total, path = %path.display(), "Analyzing file");
            println!("Analyzing {}...", display_name(path));
        }
        CollectEvent::FileSucceeded { path, descriptor } => {
            debug!(
                path = %path.display(),
                tempo = descriptor.tempo,
                "File analysed"
            );
        }
        CollectEvent::FileFailed { path, error } => {
            warn!(path = %path.display(), %error, "Skipping file");
            println!("Error analyzing {}: {error}", path.display());
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
