//! # Progress Tracking Module
//!
//! Tracker condiviso da tutti gli shard: barra di progresso ed eventi JSON.
//! Le statistiche restano locali a ogni shard e vengono unite dal coordinatore.

use crate::assembler::ArtifactReport;
use crate::json_output::JsonMessage;
use crate::progress::ProgressManager;
use std::path::Path;

#[derive(Clone)]
pub struct ProgressTracker {
    pub total_jobs: usize,
    json_output: bool,
    progress_manager: ProgressManager,
}

impl ProgressTracker {
    /// Crea un nuovo tracker; in modalità JSON la barra è nascosta
    pub fn new(total_jobs: usize, json_output: bool) -> Self {
        Self {
            total_jobs,
            json_output,
            progress_manager: ProgressManager::new(total_jobs as u64, json_output),
        }
    }

    /// Registra un job scritto
    pub fn record_written(&self, shard: usize, report: &ArtifactReport) {
        if self.json_output {
            JsonMessage::job_complete(shard, report).emit();
        }

        self.progress_manager
            .update(&format!("[OK] {}", file_label(&report.destination)));
    }

    /// Registra un job saltato
    pub fn record_skipped(&self, shard: usize, destination: &Path) {
        if self.json_output {
            JsonMessage::job_skipped(shard, destination.to_path_buf()).emit();
        }

        self.progress_manager
            .update(&format!("[SKIP] {}", file_label(destination)));
    }

    /// Job terminati finora, da qualunque shard
    pub fn jobs_finished(&self) -> u64 {
        self.progress_manager.position()
    }

    pub fn finish(&self, summary: &str) {
        self.progress_manager.finish(summary);
    }

    pub fn abandon(&self) {
        self.progress_manager.abandon();
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[tokio::test]
    async fn test_tracker_counts_from_many_tasks() {
        let tracker = ProgressTracker::new(20, true);

        let mut handles = Vec::new();
        for i in 0..20 {
            let tracker = tracker.clone();
            handles.push(tokio::spawn(async move {
                let dest = PathBuf::from(format!("out{}.js", i));
                if i % 4 == 0 {
                    tracker.record_skipped(i % 3, &dest);
                } else {
                    let report = ArtifactReport {
                        destination: dest,
                        source_map: None,
                        original_size: 100,
                        minified_size: 40,
                        gzipped_size: None,
                    };
                    tracker.record_written(i % 3, &report);
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(tracker.jobs_finished(), 20);
    }
}
