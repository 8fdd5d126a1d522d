//! # Configuration Management Module
//!
//! Questo modulo gestisce tutta la configurazione dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce la struct `Config` con tutte le opzioni di minificazione
//! - Normalizza le opzioni (`process: true` diventa un oggetto vuoto)
//! - Fornisce validazione dei parametri di input
//! - Supporta caricamento/salvataggio configurazione da/verso file JSON
//! - Fornisce valori di default sensati per tutti i parametri
//!
//! ## Parametri di configurazione:
//! - `limit`: Numero massimo di worker paralleli (default: numero di CPU)
//! - `banner` / `footer`: Testo letterale attorno all'output (default: "")
//! - `compress` / `mangle`: Opzioni opache passate al minifier
//! - `beautify`: Mantiene l'output leggibile (default: false)
//! - `report`: Statistiche di dimensione (`none` | `min`)
//! - `warnings`: Abilita i warning del minifier, indipendente da `compress`
//! - `process`: Opzioni di processing (`true` = default)
//! - `source_map` / `source_map_in` / `source_mapping_url`: valore letterale,
//!   template o funzione calcolata per ogni job
//!
//! La `Config` è condivisa in sola lettura tra i worker: i valori dinamici
//! vengono risolti in un `JobOptions` separato per ogni job.
//!
//! ## Esempio:
//! ```ignore
//! let config = Config {
//!     limit: 4,
//!     banner: "/*! app */\n".to_string(),
//!     source_map: NameHook::template("{path}.map"),
//!     ..Default::default()
//! };
//! config.validate()?;
//! ```

use crate::error::{HookError, MinifyError};
use anyhow::Result;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Function computing a name from a destination or source path
pub type NameGenerator = Arc<dyn Fn(&Path) -> std::result::Result<String, HookError> + Send + Sync>;

/// How a source-map related name is obtained for each job
#[derive(Clone, Default)]
pub enum NameHook {
    #[default]
    Off,
    /// Same value for every job
    Literal(String),
    /// Placeholders (`{path}`, `{dest}`, `{src}`, `{dir}`, `{name}`, `{stem}`) expanded per job
    Template(String),
    /// Arbitrary function, only available through the library API
    Generator(NameGenerator),
}

impl NameHook {
    /// Parses a user-supplied value: strings with placeholders become templates
    pub fn parse(value: &str) -> Self {
        if value.contains('{') && value.contains('}') {
            NameHook::Template(value.to_string())
        } else {
            NameHook::Literal(value.to_string())
        }
    }

    pub fn template(value: &str) -> Self {
        NameHook::Template(value.to_string())
    }

    pub fn generator<F>(f: F) -> Self
    where
        F: Fn(&Path) -> std::result::Result<String, HookError> + Send + Sync + 'static,
    {
        NameHook::Generator(Arc::new(f))
    }

    pub fn is_off(&self) -> bool {
        matches!(self, NameHook::Off)
    }

    /// True when the value has to be computed for each job
    pub fn is_dynamic(&self) -> bool {
        matches!(self, NameHook::Template(_) | NameHook::Generator(_))
    }

    /// Computes the value for `path`
    pub fn resolve(&self, path: &Path) -> std::result::Result<Option<String>, HookError> {
        match self {
            NameHook::Off => Ok(None),
            NameHook::Literal(value) => Ok(Some(value.clone())),
            NameHook::Template(template) => expand_template(template, path).map(Some),
            NameHook::Generator(f) => f(path).map(Some),
        }
    }
}

impl fmt::Debug for NameHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameHook::Off => write!(f, "Off"),
            NameHook::Literal(v) => f.debug_tuple("Literal").field(v).finish(),
            NameHook::Template(v) => f.debug_tuple("Template").field(v).finish(),
            NameHook::Generator(_) => write!(f, "Generator(<fn>)"),
        }
    }
}

impl Serialize for NameHook {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            NameHook::Literal(v) | NameHook::Template(v) => serializer.serialize_str(v),
            NameHook::Off | NameHook::Generator(_) => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for NameHook {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Option::<Value>::deserialize(deserializer)?;
        match value {
            None | Some(Value::Null) | Some(Value::Bool(false)) => Ok(NameHook::Off),
            Some(Value::String(s)) => Ok(NameHook::parse(&s)),
            Some(other) => Err(serde::de::Error::custom(format!(
                "expected a string or null for a source map name, got {}",
                other
            ))),
        }
    }
}

/// Expands a naming template against one path
pub fn expand_template(template: &str, path: &Path) -> std::result::Result<String, HookError> {
    let mut out = String::with_capacity(template.len() + 16);
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let end = after
            .find('}')
            .ok_or_else(|| format!("unterminated placeholder in template \"{}\"", template))?;
        let key = &after[..end];
        let value = match key {
            "path" | "dest" | "src" => path.display().to_string(),
            "dir" => path
                .parent()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            "name" => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            "stem" => path
                .file_stem()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            other => {
                return Err(format!("unknown placeholder {{{}}} in template \"{}\"", other, template).into())
            }
        };
        out.push_str(&value);
        rest = &after[end + 1..];
    }
    out.push_str(rest);

    Ok(out)
}

/// Size report format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportMode {
    #[default]
    None,
    Min,
    /// Also report the gzipped size of the final output
    Gzip,
}

impl ReportMode {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, ReportMode::None)
    }
}

impl std::str::FromStr for ReportMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" | "false" | "off" => Ok(ReportMode::None),
            "min" | "true" => Ok(ReportMode::Min),
            "gzip" => Ok(ReportMode::Gzip),
            other => Err(format!("unsupported report mode: {}", other)),
        }
    }
}

impl<'de> Deserialize<'de> for ReportMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Null | Value::Bool(false) => Ok(ReportMode::None),
            Value::Bool(true) => Ok(ReportMode::Min),
            Value::String(s) => s.parse().map_err(serde::de::Error::custom),
            other => Err(serde::de::Error::custom(format!("invalid report value: {}", other))),
        }
    }
}

/// Configuration for a parallel minification run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Worker pool size cap
    pub limit: usize,
    /// Text prepended to outputs without a source map
    pub banner: String,
    /// Text appended to every output
    pub footer: String,
    /// Compression settings, passed through to the minifier (`false` disables)
    pub compress: Value,
    /// Identifier renaming settings (`false` disables)
    pub mangle: Value,
    pub beautify: bool,
    pub report: ReportMode,
    pub warnings: bool,
    /// Processing options; `true` means "enabled with defaults"
    pub process: Option<Value>,
    #[serde(alias = "sourceMap")]
    pub source_map: NameHook,
    #[serde(alias = "sourceMapIn")]
    pub source_map_in: NameHook,
    #[serde(alias = "sourceMappingURL")]
    pub source_mapping_url: NameHook,
    /// Output progress and status as JSON for programmatic use
    pub json_output: bool,
    /// Explicit path of the minifier executable
    pub minifier: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            banner: String::new(),
            footer: String::new(),
            compress: serde_json::json!({ "warnings": false }),
            mangle: serde_json::json!({}),
            beautify: false,
            report: ReportMode::None,
            warnings: false,
            process: None,
            source_map: NameHook::Off,
            source_map_in: NameHook::Off,
            source_mapping_url: NameHook::Off,
            json_output: false,
            minifier: None,
        }
    }
}

/// Host CPU count, falling back to a single worker
pub fn default_limit() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

impl Config {
    /// Applies option normalization; call once before a run
    pub fn normalize(mut self) -> Self {
        self.process = match self.process.take() {
            Some(Value::Bool(true)) => Some(Value::Object(serde_json::Map::new())),
            Some(Value::Bool(false)) | Some(Value::Null) | None => None,
            Some(other) => Some(other),
        };
        self
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> std::result::Result<(), MinifyError> {
        if self.limit == 0 {
            return Err(MinifyError::Validation(
                "Worker limit must be greater than 0".to_string(),
            ));
        }

        for (name, value) in [("compress", &self.compress), ("mangle", &self.mangle)] {
            if !matches!(value, Value::Bool(_) | Value::Object(_) | Value::Null) {
                return Err(MinifyError::Validation(format!(
                    "`{}` must be a boolean or an object",
                    name
                )));
            }
        }

        Ok(())
    }

    pub fn compress_enabled(&self) -> bool {
        !matches!(self.compress, Value::Bool(false) | Value::Null)
    }

    pub fn mangle_enabled(&self) -> bool {
        !matches!(self.mangle, Value::Bool(false) | Value::Null)
    }

    /// Load configuration from file
    pub async fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }

    /// Per-user configuration file, if the platform has a config directory
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("uglify-parallel").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.limit = 0;
        assert!(config.validate().is_err());

        config.limit = 2;
        config.mangle = serde_json::json!("yes");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.limit >= 1);
        assert_eq!(config.banner, "");
        assert_eq!(config.footer, "");
        assert_eq!(config.compress, serde_json::json!({ "warnings": false }));
        assert!(!config.beautify);
        assert_eq!(config.report, ReportMode::None);
        assert!(config.source_map.is_off());
    }

    #[test]
    fn test_process_true_is_normalized() {
        let config = Config {
            process: Some(Value::Bool(true)),
            ..Default::default()
        }
        .normalize();
        assert_eq!(config.process, Some(serde_json::json!({})));

        let config = Config {
            process: Some(Value::Bool(false)),
            ..Default::default()
        }
        .normalize();
        assert_eq!(config.process, None);
    }

    #[test]
    fn test_warnings_do_not_touch_compress() {
        let config = Config {
            warnings: false,
            compress: serde_json::json!({ "passes": 2 }),
            ..Default::default()
        }
        .normalize();
        assert!(config.compress_enabled());
    }

    #[test]
    fn test_expand_template() {
        let path = Path::new("dist/app.min.js");
        assert_eq!(expand_template("{path}.map", path).unwrap(), "dist/app.min.js.map");
        assert_eq!(expand_template("{dir}/maps/{name}.map", path).unwrap(), "dist/maps/app.min.js.map");
        assert_eq!(expand_template("{stem}", path).unwrap(), "app.min");
        assert!(expand_template("{nope}", path).is_err());
        assert!(expand_template("{path", path).is_err());
    }

    #[test]
    fn test_name_hook_parse() {
        assert!(matches!(NameHook::parse("out.map"), NameHook::Literal(_)));
        assert!(matches!(NameHook::parse("{dest}.map"), NameHook::Template(_)));
        assert!(NameHook::parse("{dest}.map").is_dynamic());
        assert!(!NameHook::parse("out.map").is_dynamic());
    }

    #[test]
    fn test_report_mode_accepts_bool_and_string() {
        let config: Config = serde_json::from_str(r#"{ "report": true }"#).unwrap();
        assert_eq!(config.report, ReportMode::Min);
        let config: Config = serde_json::from_str(r#"{ "report": "none" }"#).unwrap();
        assert_eq!(config.report, ReportMode::None);
        let config: Config = serde_json::from_str(r#"{ "report": "gzip" }"#).unwrap();
        assert_eq!(config.report, ReportMode::Gzip);
        assert!(serde_json::from_str::<Config>(r#"{ "report": "brotli" }"#).is_err());
        assert_eq!("GZIP".parse::<ReportMode>(), Ok(ReportMode::Gzip));
    }

    #[tokio::test]
    async fn test_config_save_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");

        let original_config = Config {
            limit: 3,
            banner: "/* hi */".to_string(),
            report: ReportMode::Min,
            source_map: NameHook::template("{path}.map"),
            ..Default::default()
        };

        original_config.save_to_file(&config_path).await.unwrap();
        let loaded_config = Config::from_file(&config_path).await.unwrap();

        assert_eq!(loaded_config.limit, 3);
        assert_eq!(loaded_config.banner, "/* hi */");
        assert_eq!(loaded_config.report, ReportMode::Min);
        assert!(matches!(loaded_config.source_map, NameHook::Template(ref t) if t == "{path}.map"));
    }

    #[tokio::test]
    async fn test_missing_config_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::from_file(&temp_dir.path().join("absent.json")).await.unwrap();
        assert_eq!(config.banner, "");
    }
}
