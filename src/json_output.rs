//! # JSON Output Module
//!
//! Questo modulo gestisce l'output strutturato in JSON per l'integrazione con
//! altri processi (build tool, editor, CI).
//!
//! ## Tipi di messaggi:
//! - `start`: Inizio esecuzione (numero job, worker effettivi)
//! - `job_complete`: Artefatti scritti per un job
//! - `job_skipped`: Job saltato per sorgenti mancanti
//! - `complete`: Fine esecuzione con statistiche finali
//! - `error`: Errore fatale che ha interrotto l'esecuzione
//!
//! Un messaggio per riga su stdout; i log `tracing` vanno su stderr.

use crate::assembler::ArtifactReport;
use crate::config::Config;
use crate::progress::RunStats;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Tipo di messaggio JSON
#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum JsonMessage {
    #[serde(rename = "start")]
    Start {
        total_jobs: usize,
        workers: usize,
        config: JsonConfig,
    },

    #[serde(rename = "job_complete")]
    JobComplete {
        shard: usize,
        destination: PathBuf,
        source_map: Option<PathBuf>,
        original_size: u64,
        minified_size: u64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        gzipped_size: Option<u64>,
        reduction_percent: f64,
    },

    #[serde(rename = "job_skipped")]
    JobSkipped { shard: usize, destination: PathBuf },

    #[serde(rename = "complete")]
    Complete {
        jobs_written: usize,
        jobs_skipped: usize,
        source_maps_written: usize,
        total_original_size: u64,
        total_minified_size: u64,
        average_reduction: f64,
        duration_seconds: f64,
    },

    #[serde(rename = "error")]
    Error {
        message: String,
        details: Option<String>,
    },
}

/// Configurazione riassunta per l'output JSON
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct JsonConfig {
    pub limit: usize,
    pub beautify: bool,
    pub report: bool,
    pub source_map: bool,
}

impl JsonMessage {
    /// Emette il messaggio JSON su stdout
    pub fn emit(&self) {
        if let Ok(json) = serde_json::to_string(self) {
            println!("{}", json);
        }
    }

    pub fn start(total_jobs: usize, workers: usize, config: JsonConfig) -> Self {
        Self::Start {
            total_jobs,
            workers,
            config,
        }
    }

    pub fn job_complete(shard: usize, report: &ArtifactReport) -> Self {
        Self::JobComplete {
            shard,
            destination: report.destination.clone(),
            source_map: report.source_map.clone(),
            original_size: report.original_size,
            minified_size: report.minified_size,
            gzipped_size: report.gzipped_size,
            reduction_percent: report.reduction_percent(),
        }
    }

    pub fn job_skipped(shard: usize, destination: PathBuf) -> Self {
        Self::JobSkipped { shard, destination }
    }

    pub fn complete(stats: &RunStats, duration_seconds: f64) -> Self {
        Self::Complete {
            jobs_written: stats.jobs_written,
            jobs_skipped: stats.jobs_skipped,
            source_maps_written: stats.source_maps_written,
            total_original_size: stats.total_original_size,
            total_minified_size: stats.total_minified_size,
            average_reduction: stats.overall_reduction_percent(),
            duration_seconds,
        }
    }

    /// Crea un messaggio di errore, con la catena delle cause nei dettagli
    pub fn error(err: &(dyn std::error::Error + 'static)) -> Self {
        let mut causes = Vec::new();
        let mut current = err.source();
        while let Some(cause) = current {
            causes.push(cause.to_string());
            current = cause.source();
        }

        Self::Error {
            message: err.to_string(),
            details: if causes.is_empty() {
                None
            } else {
                Some(causes.join(": "))
            },
        }
    }
}

impl From<&Config> for JsonConfig {
    fn from(config: &Config) -> Self {
        Self {
            limit: config.limit,
            beautify: config.beautify,
            report: config.report.is_enabled(),
            source_map: !config.source_map.is_off(),
        }
    }
}
