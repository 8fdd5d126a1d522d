//! # Progress Tracking and Statistics Module
//!
//! Questo modulo gestisce il progress tracking e le statistiche di minificazione.
//!
//! ## Componenti principali:
//! - `ProgressManager`: Barra di progresso `indicatif`, un tick per job terminato
//! - `RunStats`: Statistiche cumulative dell'esecuzione
//!
//! ## Statistiche tracciate:
//! - **jobs_written**: Job che hanno prodotto una destinazione
//! - **jobs_skipped**: Job saltati perché tutte le sorgenti mancavano
//! - **source_maps_written**: Source map scritte
//! - **total_original_size** / **total_minified_size**: Byte prima e dopo
//!
//! ## Visual feedback:
//! ```text
//! ⠋ [00:00:04] [========================>---------------] 30/50 (60%) [OK] app.min.js
//! ```

use crate::file_manager::FileManager;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::time::Duration;

/// Manages progress reporting for a run
#[derive(Clone)]
pub struct ProgressManager {
    bar: ProgressBar,
}

impl ProgressManager {
    /// Create a new progress manager; `hidden` suppresses all drawing
    pub fn new(total_jobs: u64, hidden: bool) -> Self {
        if hidden {
            return Self {
                bar: ProgressBar::hidden(),
            };
        }

        let bar = ProgressBar::new(total_jobs);

        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Update progress with a message
    pub fn update(&self, message: &str) {
        self.bar.inc(1);
        self.bar.set_message(message.to_string());
    }

    /// Finish with a final message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }

    /// Drop the bar from the terminal without a summary
    pub fn abandon(&self) {
        self.bar.abandon();
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }
}

/// Statistics for one run
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct RunStats {
    pub jobs_written: usize,
    pub jobs_skipped: usize,
    pub source_maps_written: usize,
    pub total_original_size: u64,
    pub total_minified_size: u64,
}

impl RunStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_written(&mut self, original_size: u64, minified_size: u64, with_map: bool) {
        self.jobs_written += 1;
        self.total_original_size += original_size;
        self.total_minified_size += minified_size;
        if with_map {
            self.source_maps_written += 1;
        }
    }

    pub fn add_skipped(&mut self) {
        self.jobs_skipped += 1;
    }

    pub fn merge(&mut self, other: &RunStats) {
        self.jobs_written += other.jobs_written;
        self.jobs_skipped += other.jobs_skipped;
        self.source_maps_written += other.source_maps_written;
        self.total_original_size += other.total_original_size;
        self.total_minified_size += other.total_minified_size;
    }

    pub fn jobs_finished(&self) -> usize {
        self.jobs_written + self.jobs_skipped
    }

    pub fn overall_reduction_percent(&self) -> f64 {
        FileManager::calculate_reduction(self.total_original_size, self.total_minified_size)
    }

    pub fn format_summary(&self) -> String {
        format!(
            "Written: {} | Skipped: {} | Source maps: {} | {} → {} ({:.2}%)",
            self.jobs_written,
            self.jobs_skipped,
            self.source_maps_written,
            FileManager::format_size(self.total_original_size),
            FileManager::format_size(self.total_minified_size),
            self.overall_reduction_percent()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_stats_accumulate() {
        let mut stats = RunStats::new();
        stats.add_written(1000, 400, true);
        stats.add_written(1000, 600, false);
        stats.add_skipped();

        assert_eq!(stats.jobs_finished(), 3);
        assert_eq!(stats.source_maps_written, 1);
        assert_eq!(stats.overall_reduction_percent(), 50.0);
        assert!(stats.format_summary().starts_with("Written: 2 | Skipped: 1"));
    }

    #[test]
    fn test_run_stats_merge() {
        let mut a = RunStats::new();
        a.add_written(10, 5, false);
        let mut b = RunStats::new();
        b.add_skipped();
        b.add_written(20, 5, true);

        a.merge(&b);
        assert_eq!(a.jobs_written, 2);
        assert_eq!(a.jobs_skipped, 1);
        assert_eq!(a.total_minified_size, 10);
    }

    #[test]
    fn test_hidden_progress_still_counts() {
        let progress = ProgressManager::new(3, true);
        progress.update("one");
        progress.update("two");
        assert_eq!(progress.position(), 2);
    }
}
