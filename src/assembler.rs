//! # Artifact Assembler Module
//!
//! Trasforma il risultato del minifier per un job negli artefatti finali su disco.
//!
//! ## Regole di composizione:
//! - Contenuto = output minificato + footer
//! - Il banner viene anteposto SOLO se il job non produce una source map
//!   (in quel caso il minifier lo ha già emesso come preamble)
//! - La source map viene scritta solo se il nome è risolto E il minifier l'ha prodotta
//! - Un avviso di creazione per ogni file scritto
//! - Con `report` attivo, una riga di confronto dimensioni per la destinazione
//!   (con `report = gzip` anche la dimensione compressa dell'output finale)

use crate::config::{Config, ReportMode};
use crate::error::MinifyError;
use crate::file_manager::FileManager;
use crate::job::{Job, JobOptions};
use crate::minifier::MinifyOutput;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

/// What was written for one job
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtifactReport {
    pub destination: PathBuf,
    pub source_map: Option<PathBuf>,
    pub original_size: u64,
    pub minified_size: u64,
    /// Gzipped size of the written destination, only with `report = gzip`
    pub gzipped_size: Option<u64>,
}

impl ArtifactReport {
    pub fn reduction_percent(&self) -> f64 {
        FileManager::calculate_reduction(self.original_size, self.minified_size)
    }

    /// Size comparison line logged when `report` is enabled
    pub fn size_line(&self) -> String {
        let mut line = format!(
            "Original: {} bytes → Minified: {} bytes",
            self.original_size, self.minified_size
        );
        if let Some(gzipped) = self.gzipped_size {
            line.push_str(&format!(" → Gzipped: {} bytes", gzipped));
        }
        line.push_str(&format!(" ({:.1}% reduction)", self.reduction_percent()));
        line
    }
}

/// Apply banner/footer framing to minified content
pub fn frame_output(min: &str, banner: &str, footer: &str, produces_source_map: bool) -> String {
    let mut output = String::with_capacity(banner.len() + min.len() + footer.len());
    if !produces_source_map {
        output.push_str(banner);
    }
    output.push_str(min);
    output.push_str(footer);
    output
}

pub struct ArtifactAssembler<'a> {
    config: &'a Config,
}

impl<'a> ArtifactAssembler<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Write destination and optional source map for one job
    pub async fn assemble(
        &self,
        job: &Job,
        job_options: &JobOptions,
        result: MinifyOutput,
    ) -> Result<ArtifactReport, MinifyError> {
        let map_target = match (&job_options.source_map_output, result.source_map) {
            (Some(path), Some(content)) => Some((path.clone(), content)),
            _ => None,
        };

        let output = frame_output(
            &result.min,
            &self.config.banner,
            &self.config.footer,
            job_options.produces_source_map(),
        );

        FileManager::write_file(&job.destination, &output).await?;

        let source_map = match map_target {
            Some((path, content)) => {
                FileManager::write_file(&path, &content).await?;
                info!("File {} created (source map).", path.display());
                Some(path)
            }
            None => None,
        };

        info!("File {} created.", job.destination.display());

        let gzipped_size = match self.config.report {
            ReportMode::Gzip => Some(FileManager::gzip_size(&output)?),
            ReportMode::None | ReportMode::Min => None,
        };

        let report = ArtifactReport {
            destination: job.destination.clone(),
            source_map,
            original_size: result.max.original_size(),
            minified_size: output.len() as u64,
            gzipped_size,
        };

        if self.config.report.is_enabled() {
            info!("{}", report.size_line());
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::minifier::SizeStats;
    use tempfile::TempDir;

    fn output(min: &str, map: Option<&str>) -> MinifyOutput {
        MinifyOutput {
            min: min.to_string(),
            source_map: map.map(str::to_string),
            max: SizeStats {
                original: "var answer = 42;\n".to_string(),
            },
        }
    }

    #[test]
    fn test_frame_output() {
        assert_eq!(frame_output("a()", "/*b*/", "//f", false), "/*b*/a()//f");
        assert_eq!(frame_output("a()", "/*b*/", "//f", true), "a()//f");
    }

    #[tokio::test]
    async fn test_banner_without_source_map() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            banner: "/*! banner */\n".to_string(),
            footer: "\n//footer".to_string(),
            report: ReportMode::Min,
            ..Default::default()
        };
        let job = Job::new(["a.js"], temp_dir.path().join("out/a.min.js"));

        let report = ArtifactAssembler::new(&config)
            .assemble(&job, &JobOptions::default(), output("var a=42;", None))
            .await
            .unwrap();

        let written = std::fs::read_to_string(&job.destination).unwrap();
        assert_eq!(written, "/*! banner */\nvar a=42;\n//footer");
        assert_eq!(report.source_map, None);
        assert_eq!(report.minified_size, written.len() as u64);
        assert_eq!(report.original_size, 17);
        assert_eq!(report.gzipped_size, None);
    }

    #[test]
    fn test_size_line_in_bytes() {
        let report = ArtifactReport {
            destination: PathBuf::from("a.min.js"),
            source_map: None,
            original_size: 200,
            minified_size: 50,
            gzipped_size: None,
        };
        assert_eq!(report.size_line(), "Original: 200 bytes → Minified: 50 bytes (75.0% reduction)");

        let report = ArtifactReport {
            gzipped_size: Some(40),
            ..report
        };
        assert_eq!(
            report.size_line(),
            "Original: 200 bytes → Minified: 50 bytes → Gzipped: 40 bytes (75.0% reduction)"
        );
    }

    #[tokio::test]
    async fn test_gzip_report_measures_final_output() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            banner: "/*! banner */\n".to_string(),
            report: ReportMode::Gzip,
            ..Default::default()
        };
        let job = Job::new(["a.js"], temp_dir.path().join("a.min.js"));
        let min = "var a=42;".repeat(50);

        let report = ArtifactAssembler::new(&config)
            .assemble(&job, &JobOptions::default(), output(&min, None))
            .await
            .unwrap();

        let written = std::fs::read_to_string(&job.destination).unwrap();
        assert_eq!(report.gzipped_size, Some(FileManager::gzip_size(&written).unwrap()));
        assert!(report.gzipped_size.unwrap() < report.minified_size);
    }

    #[tokio::test]
    async fn test_source_map_suppresses_banner() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            banner: "/*! banner */\n".to_string(),
            footer: "//footer".to_string(),
            ..Default::default()
        };
        let job = Job::new(["a.js"], temp_dir.path().join("a.min.js"));
        let map_path = temp_dir.path().join("a.min.js.map");
        let job_options = JobOptions {
            source_map_output: Some(map_path.clone()),
            ..Default::default()
        };

        let report = ArtifactAssembler::new(&config)
            .assemble(&job, &job_options, output("var a=42;", Some("{\"version\":3}")))
            .await
            .unwrap();

        assert_eq!(std::fs::read_to_string(&job.destination).unwrap(), "var a=42;//footer");
        assert_eq!(std::fs::read_to_string(&map_path).unwrap(), "{\"version\":3}");
        assert_eq!(report.source_map, Some(map_path));
    }

    #[tokio::test]
    async fn test_missing_map_content_writes_no_map() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::default();
        let job = Job::new(["a.js"], temp_dir.path().join("a.min.js"));
        let map_path = temp_dir.path().join("a.min.js.map");
        let job_options = JobOptions {
            source_map_output: Some(map_path.clone()),
            ..Default::default()
        };

        let report = ArtifactAssembler::new(&config)
            .assemble(&job, &job_options, output("x", None))
            .await
            .unwrap();

        assert!(!map_path.exists());
        assert_eq!(report.source_map, None);
    }
}
