//! # Worker Executor Module
//!
//! Esegue tutti i job di uno shard in ordine, uno alla volta.
//!
//! ## Pipeline per job:
//! 1. Filtra le sorgenti inesistenti (warning); nessuna sorgente = job saltato
//! 2. Risolve i nomi dinamici delle source map in un `JobOptions` del job
//! 3. Invoca il minifier
//! 4. Passa il risultato all'`ArtifactAssembler`
//!
//! Un job saltato non interrompe lo shard. Un generatore di nomi fallito,
//! `sourceMapIn` dinamico con più sorgenti o un errore del minifier
//! interrompono lo shard e vengono propagati al coordinatore.

use crate::assembler::{ArtifactAssembler, ArtifactReport};
use crate::config::Config;
use crate::error::{JobOutcome, MinifyError};
use crate::file_manager::FileManager;
use crate::job::{Job, JobOptions};
use crate::minifier::{Minifier, MinifyOptions};
use crate::parallel::partition::Shard;
use crate::parallel::progress_tracker::ProgressTracker;
use crate::progress::RunStats;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

/// Outcome of a fully processed shard
#[derive(Debug, Clone, Default)]
pub struct ShardSummary {
    pub written: Vec<ArtifactReport>,
    pub skipped: Vec<PathBuf>,
    /// Statistics for this shard only
    pub stats: RunStats,
}

/// Runs the jobs of one shard
pub struct WorkerExecutor {
    config: Arc<Config>,
    minifier: Arc<dyn Minifier>,
    tracker: ProgressTracker,
}

impl WorkerExecutor {
    pub fn new(config: Arc<Config>, minifier: Arc<dyn Minifier>, tracker: ProgressTracker) -> Self {
        Self {
            config,
            minifier,
            tracker,
        }
    }

    /// Process every job of `shard` in order, stopping at the first fatal error
    pub async fn execute(&self, shard: Shard) -> Result<ShardSummary, MinifyError> {
        debug!("Shard {} starting with {} jobs", shard.index, shard.jobs.len());

        let mut summary = ShardSummary::default();

        for job in &shard.jobs {
            match self.process_job(job).await? {
                JobOutcome::Written(report) => {
                    self.tracker.record_written(shard.index, &report);
                    summary.stats.add_written(
                        report.original_size,
                        report.minified_size,
                        report.source_map.is_some(),
                    );
                    summary.written.push(report);
                }
                JobOutcome::Skipped { destination } => {
                    self.tracker.record_skipped(shard.index, &destination);
                    summary.stats.add_skipped();
                    summary.skipped.push(destination);
                }
            }
        }

        debug!(
            "Shard {} finished: {} written, {} skipped",
            shard.index,
            summary.written.len(),
            summary.skipped.len()
        );
        Ok(summary)
    }

    /// Process a single job
    pub async fn process_job(&self, job: &Job) -> Result<JobOutcome, MinifyError> {
        let sources = FileManager::existing_sources(&job.sources).await;

        if sources.is_empty() {
            warn!(
                "Destination ({}) not written because src files were empty.",
                job.destination.display()
            );
            return Ok(JobOutcome::Skipped {
                destination: job.destination.clone(),
            });
        }

        let job_options = resolve_job_options(&self.config, job, &sources)?;
        let options = MinifyOptions::for_job(&self.config, &job_options);

        let result = match self
            .minifier
            .minify(&sources, &job.destination, &options)
            .await
        {
            Ok(result) => result,
            Err(diagnostic) => {
                warn!(
                    "Uglifying source \"{}\" failed.",
                    MinifyError::join_sources(&sources)
                );
                return Err(MinifyError::Minify {
                    sources,
                    line: diagnostic.line,
                    message: diagnostic.message,
                });
            }
        };

        let report = ArtifactAssembler::new(&self.config)
            .assemble(job, &job_options, result)
            .await?;

        Ok(JobOutcome::Written(report))
    }
}

/// Resolve source map names for one job without touching the shared config.
///
/// Per-job values from the manifest take precedence over configured hooks.
pub fn resolve_job_options(
    config: &Config,
    job: &Job,
    sources: &[PathBuf],
) -> Result<JobOptions, MinifyError> {
    let source_map_input = match job.source_map_input {
        Some(ref path) => Some(path.clone()),
        None => {
            if config.source_map_in.is_dynamic() && sources.len() != 1 {
                return Err(MinifyError::SourceMapInMultipleSources {
                    destination: job.destination.clone(),
                });
            }
            None
        }
    };

    let source_map_output = match job.source_map_output {
        Some(ref path) => Some(path.clone()),
        None => config
            .source_map
            .resolve(&job.destination)
            .map_err(MinifyError::SourceMapName)?
            .map(PathBuf::from),
    };

    let source_map_input = match source_map_input {
        Some(path) => Some(path),
        None => match sources.first() {
            Some(first) => config
                .source_map_in
                .resolve(first)
                .map_err(MinifyError::SourceMapInName)?
                .map(PathBuf::from),
            None => None,
        },
    };

    let source_mapping_url = match job.source_mapping_url {
        Some(ref url) => Some(url.clone()),
        None => config
            .source_mapping_url
            .resolve(&job.destination)
            .map_err(MinifyError::SourceMappingUrl)?,
    };

    Ok(JobOptions {
        source_map_output,
        source_map_input,
        source_mapping_url,
    })
}
