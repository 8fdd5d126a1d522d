//! # Job Module
//!
//! Un `Job` è una singola unità di lavoro: un insieme ordinato di sorgenti
//! minificato in un'unica destinazione.
//!
//! ## Responsabilità:
//! - Definisce `Job` (immutabile dopo la costruzione)
//! - Carica la lista di job da un manifest JSON
//! - Scopre i job camminando una directory di sorgenti
//! - Definisce `JobOptions`, lo snapshot delle opzioni risolto per ogni job
//!
//! ## Formato manifest:
//! ```json
//! [
//!   { "src": ["src/a.js", "src/b.js"], "dest": "dist/ab.min.js" },
//!   { "src": ["src/c.js"], "dest": "dist/c.min.js", "sourceMap": "dist/c.map" }
//! ]
//! ```

use crate::error::MinifyError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One source set → destination unit of work
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    #[serde(rename = "src")]
    pub sources: Vec<PathBuf>,
    #[serde(rename = "dest")]
    pub destination: PathBuf,
    /// Per-job override of the configured source map output name
    #[serde(default, rename = "sourceMap", skip_serializing_if = "Option::is_none")]
    pub source_map_output: Option<PathBuf>,
    /// Per-job override of the incoming source map
    #[serde(default, rename = "sourceMapIn", skip_serializing_if = "Option::is_none")]
    pub source_map_input: Option<PathBuf>,
    #[serde(default, rename = "sourceMappingURL", skip_serializing_if = "Option::is_none")]
    pub source_mapping_url: Option<String>,
}

impl Job {
    pub fn new<I, P>(sources: I, destination: impl Into<PathBuf>) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            sources: sources.into_iter().map(Into::into).collect(),
            destination: destination.into(),
            source_map_output: None,
            source_map_input: None,
            source_mapping_url: None,
        }
    }

    pub fn with_source_map(mut self, path: impl Into<PathBuf>) -> Self {
        self.source_map_output = Some(path.into());
        self
    }

    pub fn with_source_map_in(mut self, path: impl Into<PathBuf>) -> Self {
        self.source_map_input = Some(path.into());
        self
    }

    pub fn with_source_mapping_url(mut self, url: impl Into<String>) -> Self {
        self.source_mapping_url = Some(url.into());
        self
    }
}

/// Source map names resolved for one job.
///
/// Built fresh by the worker for every job; the shared `Config` is never written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobOptions {
    pub source_map_output: Option<PathBuf>,
    pub source_map_input: Option<PathBuf>,
    pub source_mapping_url: Option<String>,
}

impl JobOptions {
    pub fn produces_source_map(&self) -> bool {
        self.source_map_output.is_some()
    }
}

/// Load a job list from a JSON manifest
pub async fn load_manifest(path: &Path) -> Result<Vec<Job>, MinifyError> {
    let content = tokio::fs::read_to_string(path).await?;
    let jobs: Vec<Job> = serde_json::from_str(&content)?;
    Ok(jobs)
}

/// Build one job per `.js` file under `src_dir`.
///
/// Files already ending in `suffix` are treated as previous outputs and ignored,
/// so the suffix must differ from a plain `.js`.
pub fn discover_jobs(src_dir: &Path, out_dir: &Path, suffix: &str) -> Result<Vec<Job>, MinifyError> {
    if suffix.is_empty() || suffix == ".js" {
        return Err(MinifyError::Validation(format!(
            "Output suffix \"{}\" would match every source file",
            suffix
        )));
    }

    if !src_dir.is_dir() {
        return Err(MinifyError::Validation(format!(
            "Source directory does not exist: {}",
            src_dir.display()
        )));
    }

    let mut jobs = Vec::new();

    for entry in WalkDir::new(src_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        let path = entry.path();
        let name = path.file_name().unwrap_or_default().to_string_lossy();
        if !name.ends_with(".js") || name.ends_with(suffix) {
            continue;
        }

        let relative = path.strip_prefix(src_dir).unwrap_or(path);
        let stem = &name[..name.len() - ".js".len()];
        let destination = out_dir
            .join(relative.parent().unwrap_or(Path::new("")))
            .join(format!("{}{}", stem, suffix));

        jobs.push(Job::new([path.to_path_buf()], destination));
    }

    Ok(jobs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_load_manifest() {
        let temp_dir = TempDir::new().unwrap();
        let manifest = temp_dir.path().join("jobs.json");
        tokio::fs::write(
            &manifest,
            r#"[
                { "src": ["a.js", "b.js"], "dest": "out1.js" },
                { "src": ["c.js"], "dest": "out2.js", "sourceMap": "out2.map" }
            ]"#,
        )
        .await
        .unwrap();

        let jobs = load_manifest(&manifest).await.unwrap();
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].sources, vec![PathBuf::from("a.js"), PathBuf::from("b.js")]);
        assert_eq!(jobs[1].source_map_output, Some(PathBuf::from("out2.map")));
        assert_eq!(jobs[1].source_map_input, None);
    }

    #[test]
    fn test_discover_jobs_mirrors_tree() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("src");
        std::fs::create_dir_all(src.join("lib")).unwrap();
        std::fs::write(src.join("main.js"), "var a = 1;").unwrap();
        std::fs::write(src.join("lib/util.js"), "var b = 2;").unwrap();
        std::fs::write(src.join("lib/old.min.js"), "var c=3;").unwrap();
        std::fs::write(src.join("readme.md"), "# hi").unwrap();

        let out = temp_dir.path().join("dist");
        let jobs = discover_jobs(&src, &out, ".min.js").unwrap();

        let dests: Vec<_> = jobs.iter().map(|j| j.destination.clone()).collect();
        assert_eq!(
            dests,
            vec![out.join("lib/util.min.js"), out.join("main.min.js")]
        );
    }

    #[test]
    fn test_discover_jobs_rejects_plain_suffix() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("main.js"), "var a = 1;").unwrap();
        let out = temp_dir.path().join("dist");

        for suffix in ["", ".js"] {
            assert!(matches!(
                discover_jobs(temp_dir.path(), &out, suffix),
                Err(MinifyError::Validation(_))
            ));
        }
        assert_eq!(discover_jobs(temp_dir.path(), &out, ".min.js").unwrap().len(), 1);
    }

    #[test]
    fn test_discover_jobs_missing_dir() {
        let temp_dir = TempDir::new().unwrap();
        let result = discover_jobs(&temp_dir.path().join("nope"), temp_dir.path(), ".min.js");
        assert!(matches!(result, Err(MinifyError::Validation(_))));
    }
}
