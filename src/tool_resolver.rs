//! # Minifier Executable Resolver
//!
//! This module finds the JavaScript minifier CLI in different environments:
//! - Explicit path from configuration
//! - `UGLIFY_PARALLEL_MINIFIER` environment variable
//! - Project-local `node_modules/.bin`, searched upward from the current directory
//! - System PATH

use std::env;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Which CLI dialect an executable speaks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MinifierKind {
    Terser,
    UglifyJs,
}

impl MinifierKind {
    /// Guess the dialect from the executable name
    pub fn from_path(path: &Path) -> Self {
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        if name.contains("uglify") {
            MinifierKind::UglifyJs
        } else {
            MinifierKind::Terser
        }
    }

    pub fn tool_name(&self) -> &'static str {
        match self {
            MinifierKind::Terser => "terser",
            MinifierKind::UglifyJs => "uglifyjs",
        }
    }
}

/// Resolved executable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTool {
    pub path: PathBuf,
    pub kind: MinifierKind,
}

/// Minifier path resolver
pub struct ToolPathResolver {
    /// Directory the upward `node_modules` search starts from
    search_root: Option<PathBuf>,
}

impl ToolPathResolver {
    pub const ENV_VAR: &'static str = "UGLIFY_PARALLEL_MINIFIER";

    /// Tools tried in order of preference
    const CANDIDATES: [MinifierKind; 2] = [MinifierKind::Terser, MinifierKind::UglifyJs];

    pub fn new() -> Self {
        Self {
            search_root: env::current_dir().ok(),
        }
    }

    pub fn with_search_root(root: impl Into<PathBuf>) -> Self {
        Self {
            search_root: Some(root.into()),
        }
    }

    /// Resolve the minifier, honoring an explicit path first
    pub fn resolve(&self, explicit: Option<&Path>) -> Option<ResolvedTool> {
        // Strategy 1: explicit configuration
        if let Some(path) = explicit {
            debug!("Checking configured minifier: {:?}", path);
            if path.exists() {
                return Some(Self::tool(path.to_path_buf()));
            }
            if let Some(found) = self.find_in_system_path(&path.to_string_lossy()) {
                return Some(Self::tool(found));
            }
            warn!("Configured minifier not found: {}", path.display());
            return None;
        }

        // Strategy 2: environment override
        if let Ok(value) = env::var(Self::ENV_VAR) {
            let path = PathBuf::from(value);
            debug!("Checking {}: {:?}", Self::ENV_VAR, path);
            if path.exists() {
                return Some(Self::tool(path));
            }
        }

        // Strategy 3: node_modules/.bin walking up the tree
        for kind in Self::CANDIDATES {
            if let Some(path) = self.find_in_node_modules(kind.tool_name()) {
                debug!("Using project-local {}: {:?}", kind.tool_name(), path);
                return Some(ResolvedTool { path, kind });
            }
        }

        // Strategy 4: system PATH
        for kind in Self::CANDIDATES {
            if let Some(path) = self.find_in_system_path(kind.tool_name()) {
                debug!("Using system {}: {:?}", kind.tool_name(), path);
                return Some(ResolvedTool { path, kind });
            }
        }

        warn!("No JavaScript minifier found (tried terser, uglifyjs)");
        None
    }

    fn tool(path: PathBuf) -> ResolvedTool {
        let kind = MinifierKind::from_path(&path);
        ResolvedTool { path, kind }
    }

    fn find_in_node_modules(&self, tool_name: &str) -> Option<PathBuf> {
        let extension = if cfg!(windows) { ".cmd" } else { "" };
        let mut search_dir = self.search_root.clone()?;

        for _ in 0..10 {
            let candidate = search_dir
                .join("node_modules")
                .join(".bin")
                .join(format!("{}{}", tool_name, extension));
            if candidate.exists() {
                return Some(candidate);
            }

            match search_dir.parent() {
                Some(parent) => search_dir = parent.to_path_buf(),
                None => break,
            }
        }

        None
    }

    /// Find tool in system PATH
    fn find_in_system_path(&self, tool_name: &str) -> Option<PathBuf> {
        let extension = if cfg!(windows) { ".cmd" } else { "" };
        let tool_with_ext = format!("{}{}", tool_name, extension);

        env::split_paths(&env::var_os("PATH")?)
            .map(|dir| dir.join(&tool_with_ext))
            .find(|path| path.exists())
    }

    /// Installation hint shown when nothing was found
    pub fn install_instructions() -> &'static str {
        "Install a minifier with `npm install --save-dev terser` (or `uglify-js`), \
         or point UGLIFY_PARALLEL_MINIFIER at the executable"
    }
}

impl Default for ToolPathResolver {
    fn default() -> Self {
        Self::new()
    }
}
