//! # Completion Coordinator Module
//!
//! Orchestratore dell'esecuzione parallela.
//!
//! ## Flusso di esecuzione:
//! 1. **Partizionamento**: round-robin dei job in N = min(limit, job) shard
//! 2. **Avvio**: un task tokio indipendente per ogni shard
//! 3. **Completamento**: ogni shard decrementa `CompletionState` quando termina
//! 4. **Fine**: l'ultimo shard invoca la callback `on_done`, una sola volta
//!
//! ## Gestione errori:
//! - Il primo errore fatale di uno shard viene restituito subito al chiamante
//! - La callback `on_done` non viene invocata se l'esecuzione è fallita
//! - Gli shard ancora in corso non vengono interrotti: scrivono solo le proprie
//!   destinazioni e la configurazione è in sola lettura
//!
//! ## Esempio:
//! ```ignore
//! let coordinator = Coordinator::new(config, Arc::new(minifier))?;
//! let summary = coordinator.run(jobs, || println!("all done")).await?;
//! ```

use crate::assembler::ArtifactReport;
use crate::config::Config;
use crate::error::MinifyError;
use crate::job::Job;
use crate::json_output::{JsonConfig, JsonMessage};
use crate::minifier::Minifier;
use crate::parallel::completion::CompletionState;
use crate::parallel::partition::partition;
use crate::parallel::progress_tracker::ProgressTracker;
use crate::parallel::worker::WorkerExecutor;
use crate::progress::RunStats;
use futures::stream::{FuturesUnordered, StreamExt};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// Aggregated result of a successful run
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Number of shards that were spawned
    pub workers: usize,
    pub artifacts: Vec<ArtifactReport>,
    pub skipped: Vec<PathBuf>,
    pub stats: RunStats,
}

pub struct Coordinator {
    config: Arc<Config>,
    minifier: Arc<dyn Minifier>,
}

impl Coordinator {
    /// Normalize and validate `config`, then freeze it for the run
    pub fn new(config: Config, minifier: Arc<dyn Minifier>) -> Result<Self, MinifyError> {
        let config = config.normalize();
        config.validate()?;

        Ok(Self {
            config: Arc::new(config),
            minifier,
        })
    }

    /// Run every job and invoke `on_done` once all shards have finished
    pub async fn run<F>(&self, jobs: Vec<Job>, on_done: F) -> Result<RunSummary, MinifyError>
    where
        F: FnOnce() + Send + 'static,
    {
        let start_time = Instant::now();
        let total_jobs = jobs.len();
        let shards = partition(jobs, self.config.limit);
        let workers = shards.len();

        if self.config.json_output {
            JsonMessage::start(total_jobs, workers, JsonConfig::from(self.config.as_ref())).emit();
        }

        if shards.is_empty() {
            info!("No jobs to process");
            if self.config.json_output {
                JsonMessage::complete(&RunStats::new(), start_time.elapsed().as_secs_f64()).emit();
            }
            on_done();
            return Ok(RunSummary::default());
        }

        info!("Processing {} jobs with {} workers", total_jobs, workers);

        let tracker = ProgressTracker::new(total_jobs, self.config.json_output);
        let completion = CompletionState::new(workers, on_done);
        let mut pending = FuturesUnordered::new();

        for shard in shards {
            let index = shard.index;
            let executor = WorkerExecutor::new(self.config.clone(), self.minifier.clone(), tracker.clone());
            let completion_clone = completion.clone();

            debug!("Spawning shard {} with {} jobs", index, shard.jobs.len());
            let handle = tokio::spawn(async move {
                let result = executor.execute(shard).await;
                if let Err(ref e) = result {
                    if e.is_fatal() {
                        completion_clone.abort();
                    }
                }
                completion_clone.complete_one();
                result
            });

            pending.push(async move { (index, handle.await) });
        }

        let mut summary = RunSummary {
            workers,
            ..Default::default()
        };

        while let Some((index, joined)) = pending.next().await {
            match joined {
                Ok(Ok(shard_summary)) => {
                    summary.artifacts.extend(shard_summary.written);
                    summary.skipped.extend(shard_summary.skipped);
                    summary.stats.merge(&shard_summary.stats);
                }
                Ok(Err(e)) => {
                    error!("Shard {} aborted the run: {}", index, e);
                    tracker.abandon();
                    return Err(e);
                }
                Err(join_error) => {
                    completion.abort();
                    tracker.abandon();
                    return Err(MinifyError::WorkerPanicked {
                        shard: index,
                        reason: join_error.to_string(),
                    });
                }
            }
        }

        debug_assert_eq!(completion.outstanding(), 0);

        debug_assert_eq!(tracker.jobs_finished() as usize, summary.stats.jobs_finished());
        tracker.finish(&summary.stats.format_summary());

        if self.config.json_output {
            JsonMessage::complete(&summary.stats, start_time.elapsed().as_secs_f64()).emit();
        }

        Ok(summary)
    }
}
