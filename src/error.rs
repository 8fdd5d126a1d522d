//! # Error Types Module
//!
//! Questo modulo definisce tutti i tipi di errore dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce `MinifyError` enum per gli errori che abortiscono l'intera esecuzione
//! - Definisce `JobOutcome` per distinguere un job scritto da un job saltato
//! - Mantiene la catena degli errori originali (`source`) dei generatori di nomi
//!
//! ## Categorie di errori:
//! - `Io` / `Json`: Errori di I/O e di parsing manifest/config
//! - `SourceMapName` / `SourceMapInName` / `SourceMappingUrl`: Generatore di nomi fallito
//! - `SourceMapInMultipleSources`: `sourceMapIn` dinamico con più sorgenti
//! - `Minify`: Il minifier ha fallito (sorgenti e, se nota, la riga)
//! - `MissingDependency`: Eseguibile del minifier non trovato
//! - `Validation`: Configurazione non valida
//! - `WorkerPanicked`: Un worker è terminato senza riportare un risultato
//!
//! Un file sorgente mancante NON è un errore: il job viene saltato
//! (`JobOutcome::Skipped`) e l'esecuzione continua.

use crate::assembler::ArtifactReport;
use std::path::PathBuf;

/// Boxed error coming from a user-supplied naming hook
pub type HookError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that abort the whole run
#[derive(thiserror::Error, Debug)]
pub enum MinifyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("SourceMapName failed.")]
    SourceMapName(#[source] HookError),

    #[error("SourceMapInName failed.")]
    SourceMapInName(#[source] HookError),

    #[error("SourceMappingURL failed.")]
    SourceMappingUrl(#[source] HookError),

    #[error("Cannot generate `sourceMapIn` for multiple source files (destination: {})", destination.display())]
    SourceMapInMultipleSources { destination: PathBuf },

    #[error("{}", format_minify_failure(sources, *line, message))]
    Minify {
        sources: Vec<PathBuf>,
        line: Option<u32>,
        message: String,
    },

    #[error("Dependency missing: {0}")]
    MissingDependency(String),

    #[error("Configuration validation error: {0}")]
    Validation(String),

    #[error("Worker for shard {shard} stopped unexpectedly: {reason}")]
    WorkerPanicked { shard: usize, reason: String },
}

impl MinifyError {
    /// Every variant aborts the run.
    ///
    /// A job whose sources are all missing is not an error: it surfaces as
    /// `JobOutcome::Skipped` and the shard carries on.
    pub fn is_fatal(&self) -> bool {
        true
    }

    /// Joins source paths the way they appear in diagnostics
    pub fn join_sources(sources: &[PathBuf]) -> String {
        sources
            .iter()
            .map(|s| s.display().to_string())
            .collect::<Vec<_>>()
            .join(",")
    }
}

fn format_minify_failure(sources: &[PathBuf], line: Option<u32>, message: &str) -> String {
    let mut text = String::from("Uglification failed.");
    if !message.is_empty() {
        text.push('\n');
        text.push_str(message);
        text.push('.');
    }
    text.push_str(" \n");
    if let Some(line) = line {
        text.push_str(&format!("Line {} ", line));
    }
    text.push_str(&format!("in {}\n", MinifyError::join_sources(sources)));
    text
}

/// Result of processing a single job
#[derive(Debug, Clone)]
pub enum JobOutcome {
    /// Artifacts were written
    Written(ArtifactReport),
    /// Every source was missing, nothing was written
    Skipped { destination: PathBuf },
}
