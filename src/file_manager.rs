//! # File Management Module
//!
//! Questo modulo gestisce tutte le operazioni sul filesystem.
//!
//! ## Responsabilità:
//! - Filtra le sorgenti di un job tenendo solo quelle esistenti (con warning)
//! - Scrive gli artefatti creando le directory parent se necessario
//! - Legge e concatena le sorgenti originali per il report dimensioni
//! - Calcolo della dimensione gzip di un artefatto per il report
//! - Formattazione human-readable delle dimensioni
//!
//! ## Esempio:
//! ```ignore
//! let existing = FileManager::existing_sources(&job.sources).await;
//! FileManager::write_file(&job.destination, &content).await?;
//! ```

use anyhow::Result;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::warn;

/// Filesystem collaborator used by workers and the assembler
pub struct FileManager;

impl FileManager {
    /// Keep only sources that exist, warning for each missing one
    pub async fn existing_sources(sources: &[PathBuf]) -> Vec<PathBuf> {
        let mut existing = Vec::with_capacity(sources.len());
        for source in sources {
            if fs::try_exists(source).await.unwrap_or(false) {
                existing.push(source.clone());
            } else {
                warn!("Source file \"{}\" not found.", source.display());
            }
        }
        existing
    }

    /// Write `content` to `path`, creating parent directories
    pub async fn write_file(path: &Path, content: &str) -> std::io::Result<()> {
        Self::ensure_parent_dirs(path).await?;
        fs::write(path, content).await
    }

    /// Crea le directory parent se necessario
    pub async fn ensure_parent_dirs(path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        Ok(())
    }

    /// Read and concatenate sources in order, newline separated
    pub async fn read_concatenated(sources: &[PathBuf]) -> Result<String> {
        let mut parts = Vec::with_capacity(sources.len());
        for source in sources {
            let text = fs::read_to_string(source)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", source.display(), e))?;
            parts.push(text);
        }
        Ok(parts.join("\n"))
    }

    /// Size in bytes of `content` once gzipped at the default level
    pub fn gzip_size(content: &str) -> std::io::Result<u64> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(content.as_bytes())?;
        Ok(encoder.finish()?.len() as u64)
    }

    /// Get human-readable file size
    pub fn format_size(size: u64) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
        let mut size = size as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", size as u64, UNITS[unit_index])
        } else {
            format!("{:.2} {}", size, UNITS[unit_index])
        }
    }

    /// Calculate percentage reduction
    pub fn calculate_reduction(original_size: u64, new_size: u64) -> f64 {
        if original_size == 0 {
            0.0
        } else {
            ((original_size as f64 - new_size as f64) / original_size as f64) * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_existing_sources_filters_missing() {
        let temp_dir = TempDir::new().unwrap();
        let present = temp_dir.path().join("a.js");
        std::fs::write(&present, "a()").unwrap();
        let missing = temp_dir.path().join("b.js");

        let existing = FileManager::existing_sources(&[present.clone(), missing]).await;
        assert_eq!(existing, vec![present]);
    }

    #[tokio::test]
    async fn test_write_file_creates_parents() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("deep/nested/out.js");
        FileManager::write_file(&target, "x").await.unwrap();
        assert_eq!(std::fs::read_to_string(target).unwrap(), "x");
    }

    #[test]
    fn test_gzip_size_shrinks_repetitive_content() {
        let content = "var a = 1;\n".repeat(200);
        let gzipped = FileManager::gzip_size(&content).unwrap();
        assert!(gzipped > 0);
        assert!(gzipped < content.len() as u64);
    }

    #[test]
    fn test_format_size() {
        assert_eq!(FileManager::format_size(512), "512 B");
        assert_eq!(FileManager::format_size(2048), "2.00 KB");
    }

    #[test]
    fn test_calculate_reduction() {
        assert_eq!(FileManager::calculate_reduction(0, 10), 0.0);
        assert_eq!(FileManager::calculate_reduction(200, 50), 75.0);
    }
}
