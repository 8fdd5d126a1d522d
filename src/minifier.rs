//! # Minifier Module
//!
//! Interfaccia verso il motore di minificazione esterno.
//!
//! ## Responsabilità:
//! - Definisce il trait `Minifier` consumato dai worker
//! - Definisce `MinifyOptions`, lo snapshot di opzioni visto dal minifier per un job
//! - Definisce `MinifyOutput` (contenuto minificato, source map, statistiche)
//! - Implementa `CommandMinifier`, che esegue la CLI di terser o uglify-js
//!
//! ## Pipeline di `CommandMinifier`:
//! 1. Legge e concatena le sorgenti originali (per il report dimensioni)
//! 2. Costruisce gli argomenti della CLI dalle opzioni del job
//! 3. Esegue il processo scrivendo in una directory temporanea
//! 4. Rilegge output e source map
//! 5. In caso di errore estrae messaggio e numero di riga dallo stderr

use crate::config::Config;
use crate::error::MinifyError;
use crate::file_manager::FileManager;
use crate::job::JobOptions;
use crate::tool_resolver::{MinifierKind, ResolvedTool, ToolPathResolver};
use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::debug;

/// Diagnostic produced by a failing minifier
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct MinifierDiagnostic {
    pub message: String,
    pub line: Option<u32>,
}

impl MinifierDiagnostic {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line: None,
        }
    }

    pub fn at_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }
}

/// Original text of a job, kept for the size report
#[derive(Debug, Clone, Default)]
pub struct SizeStats {
    pub original: String,
}

impl SizeStats {
    pub fn original_size(&self) -> u64 {
        self.original.len() as u64
    }
}

/// What the minifier returns for one job
#[derive(Debug, Clone, Default)]
pub struct MinifyOutput {
    pub min: String,
    pub source_map: Option<String>,
    pub max: SizeStats,
}

/// Options handed to the minifier for a single job
#[derive(Debug, Clone, Default)]
pub struct MinifyOptions {
    /// `None` disables compression
    pub compress: Option<Value>,
    /// `None` disables mangling
    pub mangle: Option<Value>,
    pub beautify: bool,
    pub warnings: bool,
    pub process: Option<Value>,
    /// Banner the minifier must emit itself when it produces a source map
    pub preamble: Option<String>,
    pub source_map: Option<PathBuf>,
    pub source_map_in: Option<PathBuf>,
    pub source_mapping_url: Option<String>,
}

impl MinifyOptions {
    /// Combine the shared configuration with one job's resolved names
    pub fn for_job(config: &Config, job_options: &JobOptions) -> Self {
        let preamble = if job_options.produces_source_map() && !config.banner.is_empty() {
            Some(config.banner.clone())
        } else {
            None
        };

        Self {
            compress: config.compress_enabled().then(|| config.compress.clone()),
            mangle: config.mangle_enabled().then(|| config.mangle.clone()),
            beautify: config.beautify,
            warnings: config.warnings,
            process: config.process.clone(),
            preamble,
            source_map: job_options.source_map_output.clone(),
            source_map_in: job_options.source_map_input.clone(),
            source_mapping_url: job_options.source_mapping_url.clone(),
        }
    }
}

/// Source to minified transformation capability
#[async_trait]
pub trait Minifier: Send + Sync {
    async fn minify(
        &self,
        sources: &[PathBuf],
        destination: &Path,
        options: &MinifyOptions,
    ) -> Result<MinifyOutput, MinifierDiagnostic>;
}

/// Minifier backed by the terser or uglify-js command line tool
#[derive(Debug, Clone)]
pub struct CommandMinifier {
    tool: ResolvedTool,
}

impl CommandMinifier {
    pub fn new(tool: ResolvedTool) -> Self {
        Self { tool }
    }

    /// Locate an executable, failing when none is installed
    pub fn check_dependencies(explicit: Option<&Path>) -> Result<Self, MinifyError> {
        ToolPathResolver::new()
            .resolve(explicit)
            .map(Self::new)
            .ok_or_else(|| {
                MinifyError::MissingDependency(format!(
                    "terser or uglifyjs. {}",
                    ToolPathResolver::install_instructions()
                ))
            })
    }

    pub fn tool(&self) -> &ResolvedTool {
        &self.tool
    }

    /// Build the CLI arguments for one invocation
    pub fn build_args(&self, sources: &[PathBuf], output: &Path, options: &MinifyOptions) -> Vec<String> {
        let mut args: Vec<String> = sources.iter().map(|s| s.display().to_string()).collect();

        if let Some(ref process) = options.process {
            if let Some(list) = option_list(process) {
                args.push("--parse".to_string());
                args.push(list);
            }
        }

        if let Some(ref compress) = options.compress {
            args.push("--compress".to_string());
            if let Some(list) = option_list(compress) {
                args.push(list);
            }
        }

        if let Some(ref mangle) = options.mangle {
            args.push("--mangle".to_string());
            if let Some(list) = option_list(mangle) {
                args.push(list);
            }
        }

        let mut output_opts = Vec::new();
        if options.beautify {
            output_opts.push("beautify=true".to_string());
        }
        if let Some(ref preamble) = options.preamble {
            output_opts.push(format!("preamble={}", js_string(preamble)));
        }
        if !output_opts.is_empty() {
            args.push(match self.tool.kind {
                MinifierKind::Terser => "--format".to_string(),
                MinifierKind::UglifyJs => "--output-opts".to_string(),
            });
            args.push(output_opts.join(","));
        }

        if let Some(ref map) = options.source_map {
            let mut map_opts = vec![format!("filename={}", js_string(&map.display().to_string()))];
            let url = options
                .source_mapping_url
                .clone()
                .unwrap_or_else(|| relative_url(map));
            map_opts.push(format!("url={}", js_string(&url)));
            if let Some(ref input) = options.source_map_in {
                map_opts.push(format!("content={}", js_string(&input.display().to_string())));
            }
            args.push("--source-map".to_string());
            args.push(map_opts.join(","));
        }

        if options.warnings && self.tool.kind == MinifierKind::UglifyJs {
            args.push("--warn".to_string());
        }

        args.push("--output".to_string());
        args.push(output.display().to_string());
        args
    }
}

#[async_trait]
impl Minifier for CommandMinifier {
    async fn minify(
        &self,
        sources: &[PathBuf],
        destination: &Path,
        options: &MinifyOptions,
    ) -> Result<MinifyOutput, MinifierDiagnostic> {
        let original = FileManager::read_concatenated(sources)
            .await
            .map_err(|e| MinifierDiagnostic::new(e.to_string()))?;

        let work_dir = tempfile::tempdir()
            .map_err(|e| MinifierDiagnostic::new(format!("Failed to create temp dir: {}", e)))?;
        let file_name = destination
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "out.js".to_string());
        let output = work_dir.path().join(&file_name);

        let args = self.build_args(sources, &output, options);
        debug!("Running {} {:?}", self.tool.path.display(), args);

        let result = Command::new(&self.tool.path)
            .args(&args)
            .output()
            .await
            .map_err(|e| {
                MinifierDiagnostic::new(format!(
                    "Failed to run {}: {}",
                    self.tool.path.display(),
                    e
                ))
            })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr).trim().to_string();
            let mut diagnostic = MinifierDiagnostic::new(first_line(&stderr));
            if let Some(line) = parse_line_number(&stderr) {
                diagnostic = diagnostic.at_line(line);
            }
            return Err(diagnostic);
        }

        let min = tokio::fs::read_to_string(&output)
            .await
            .map_err(|e| MinifierDiagnostic::new(format!("Minifier produced no output: {}", e)))?;

        let source_map = if options.source_map.is_some() {
            let map_path = work_dir.path().join(format!("{}.map", file_name));
            Some(tokio::fs::read_to_string(&map_path).await.map_err(|e| {
                MinifierDiagnostic::new(format!("Minifier produced no source map: {}", e))
            })?)
        } else {
            None
        };

        Ok(MinifyOutput {
            min,
            source_map,
            max: SizeStats { original },
        })
    }
}

/// `{"a": 1, "b": true}` → `a=1,b=true`; `None` for `true` or `{}`
fn option_list(value: &Value) -> Option<String> {
    let map = value.as_object()?;
    let items: Vec<String> = map
        .iter()
        // compress-level warnings are a top-level option in current minifiers
        .filter(|(key, _)| key.as_str() != "warnings")
        .map(|(key, value)| format!("{}={}", key, value))
        .collect();
    if items.is_empty() {
        None
    } else {
        Some(items.join(","))
    }
}

fn js_string(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| format!("\"{}\"", value))
}

/// URL written into the output; maps are referenced by file name
fn relative_url(map: &Path) -> String {
    map.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn first_line(text: &str) -> String {
    text.lines()
        .find(|l| !l.trim().is_empty())
        .unwrap_or("minifier exited with an error")
        .trim()
        .to_string()
}

/// Extract a line number from `line 12` or `file.js:12,4` style messages
pub fn parse_line_number(text: &str) -> Option<u32> {
    let lower = text.to_lowercase();
    if let Some(idx) = lower.find("line ") {
        let digits: String = lower[idx + 5..].chars().take_while(|c| c.is_ascii_digit()).collect();
        if let Ok(line) = digits.parse() {
            return Some(line);
        }
    }

    for (idx, _) in text.match_indices(':') {
        let rest = &text[idx + 1..];
        let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
        if !digits.is_empty() && rest[digits.len()..].starts_with(',') {
            if let Ok(line) = digits.parse() {
                return Some(line);
            }
        }
    }

    None
}
