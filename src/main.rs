//! # Uglify Parallel - Main Entry Point
//!
//! Questo è il punto di ingresso principale dell'applicazione.
//!
//! ## Flusso di esecuzione:
//! 1. Parsa gli argomenti CLI
//! 2. Configura il logging (INFO o DEBUG a seconda del flag verbose, stderr)
//! 3. Carica la configurazione da file e applica gli override da CLI
//! 4. Costruisce la lista di job (manifest JSON o directory di sorgenti)
//! 5. Verifica il minifier e avvia il coordinatore
//!
//! ## Esempio di utilizzo:
//! ```bash
//! uglify-parallel --jobs jobs.json --limit 8 --source-map "{dest}.map" --report min
//! uglify-parallel --src-dir src --out-dir dist --banner "/*! app */"
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use uglify_parallel::{
    job, json_output::JsonMessage, CommandMinifier, Config, Coordinator, NameHook, ReportMode,
};

#[derive(Parser)]
#[command(name = "uglify-parallel")]
#[command(about = "Minify JavaScript files in parallel across a pool of workers")]
struct Args {
    /// JSON manifest: [{ "src": [...], "dest": "..." }, ...]
    #[arg(short, long, conflicts_with = "src_dir")]
    jobs: Option<PathBuf>,

    /// Minify every .js file under this directory
    #[arg(long, requires = "out_dir")]
    src_dir: Option<PathBuf>,

    /// Output directory used with --src-dir
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Suffix of outputs discovered with --src-dir
    #[arg(long, default_value = ".min.js")]
    suffix: String,

    /// JSON configuration file (defaults to the per-user config if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Maximum number of parallel workers
    #[arg(short, long)]
    limit: Option<usize>,

    /// Text prepended to outputs without a source map
    #[arg(long)]
    banner: Option<String>,

    /// Text appended to every output
    #[arg(long)]
    footer: Option<String>,

    /// Source map output name; supports {dest}, {dir}, {name}, {stem}
    #[arg(long)]
    source_map: Option<String>,

    /// Incoming source map name; supports {src}, {dir}, {name}, {stem}
    #[arg(long)]
    source_map_in: Option<String>,

    /// sourceMappingURL written into outputs; supports {dest}, {dir}, {name}, {stem}
    #[arg(long)]
    source_mapping_url: Option<String>,

    /// Size report: none | min | gzip
    #[arg(short, long)]
    report: Option<ReportMode>,

    /// Keep readable formatting
    #[arg(short, long)]
    beautify: bool,

    /// Disable compression
    #[arg(long)]
    no_compress: bool,

    /// Disable identifier mangling
    #[arg(long)]
    no_mangle: bool,

    /// Enable minifier warnings
    #[arg(long)]
    warnings: bool,

    /// Path of the terser / uglifyjs executable
    #[arg(long)]
    minifier: Option<PathBuf>,

    /// Output progress and status as JSON lines on stdout
    #[arg(long)]
    json: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging; stdout is reserved for JSON events
    let default_level = if args.verbose { "debug" } else { "info" };
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let json_mode = args.json;
    if let Err(e) = run(args).await {
        if json_mode {
            JsonMessage::error(&*e).emit();
        }
        error!("{:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

async fn run(args: Args) -> Result<()> {
    let mut config = load_config(args.config.as_ref()).await?;
    apply_overrides(&mut config, &args);

    let jobs = match (&args.jobs, &args.src_dir, &args.out_dir) {
        (Some(manifest), _, _) => job::load_manifest(manifest)
            .await
            .with_context(|| format!("Failed to load job manifest {}", manifest.display()))?,
        (None, Some(src_dir), Some(out_dir)) => job::discover_jobs(src_dir, out_dir, &args.suffix)?,
        _ => return Err(anyhow::anyhow!("Either --jobs or --src-dir/--out-dir is required")),
    };

    let minifier = CommandMinifier::check_dependencies(config.minifier.as_deref())?;
    info!(
        "Using {} at {}",
        minifier.tool().kind.tool_name(),
        minifier.tool().path.display()
    );

    let coordinator = Coordinator::new(config, Arc::new(minifier))?;
    let summary = coordinator
        .run(jobs, || info!("All workers finished"))
        .await?;

    info!("=== Minification Complete ===");
    info!("Workers: {}", summary.workers);
    info!("{}", summary.stats.format_summary());

    Ok(())
}

async fn load_config(explicit: Option<&PathBuf>) -> Result<Config> {
    let path = match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(anyhow::anyhow!("Config file does not exist: {}", path.display()));
            }
            path.clone()
        }
        None => match Config::default_path() {
            Some(path) => path,
            None => return Ok(Config::default()),
        },
    };

    Config::from_file(&path)
        .await
        .with_context(|| format!("Failed to load config {}", path.display()))
}

fn apply_overrides(config: &mut Config, args: &Args) {
    if let Some(limit) = args.limit {
        config.limit = limit;
    }
    if let Some(ref banner) = args.banner {
        config.banner = banner.clone();
    }
    if let Some(ref footer) = args.footer {
        config.footer = footer.clone();
    }
    if let Some(ref value) = args.source_map {
        config.source_map = NameHook::parse(value);
    }
    if let Some(ref value) = args.source_map_in {
        config.source_map_in = NameHook::parse(value);
    }
    if let Some(ref value) = args.source_mapping_url {
        config.source_mapping_url = NameHook::parse(value);
    }
    if let Some(report) = args.report {
        config.report = report;
    }
    if args.beautify {
        config.beautify = true;
    }
    if args.no_compress {
        config.compress = serde_json::Value::Bool(false);
    }
    if args.no_mangle {
        config.mangle = serde_json::Value::Bool(false);
    }
    if args.warnings {
        config.warnings = true;
    }
    if let Some(ref minifier) = args.minifier {
        config.minifier = Some(minifier.clone());
    }
    if args.json {
        config.json_output = true;
    }
}
