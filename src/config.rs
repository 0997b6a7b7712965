//! Translator configuration.
//!
//! Every key is optional; missing keys fall back to the built-in defaults.
//!
//! ```toml
//! load_path = "/user/hadoop/ambitionlog"
//! check_fields = true
//! symbol_scheme = "alphabetic"
//! fields = ["uri", "mvid"]
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{PigError, PigResult};
use crate::parser::DEFAULT_MAX_DEPTH;
use crate::symbols::SymbolScheme;

/// File name looked up in the working directory.
pub const LOCAL_CONFIG: &str = "sqlpig.toml";

const DEFAULT_JARS: &[&str] = &[
    "/opt/pig/lib/ambition-data.jar",
    "/opt/pig/lib/libthrift.jar",
    "/opt/pig/lib/mediavdailylog.jar",
    "/opt/pig/lib/mediav-pig-farm.jar",
    "/opt/pig/lib/mediav-session-log.jar",
    "/opt/pig/lib/elephant-bird.jar",
    "/opt/pig/lib/guava.jar",
    "/opt/pig/lib/hadoop-lzo.jar",
    "/opt/pig/lib/protobuf-java.jar",
    "/opt/pig/lib/slf4j-api.jar",
    "/opt/pig/lib/slf4j-log4j12.jar",
    "/opt/pig/lib/json-simple.jar",
    "/opt/pig/lib/commons-lang-2.5.jar",
];

const DEFAULT_FIELDS: &[&str] = &[
    "uri",
    "useragent",
    "mvid",
    "reqType",
    "publisherId",
    "channelId",
    "adspaceId",
    "advertiserId",
    "campaignId",
    "solutionId",
    "creativeId",
    "entityType",
    "solutionType",
    "emptyReturnType",
];

/// Main translator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PigConfig {
    /// Base path of the loaded dataset.
    pub load_path: String,

    /// Load function class.
    pub loader: String,

    /// Argument passed to the load function.
    pub schema_class: String,

    /// Nested field flattened right after the load.
    pub flatten_field: String,

    /// Libraries registered ahead of every script, in order.
    pub jars: Vec<String>,

    /// Field whitelist.
    pub fields: Vec<String>,

    /// Reject queries referencing fields outside `fields`.
    pub check_fields: bool,

    /// Fail on clauses that have no translation instead of omitting them.
    pub reject_unsupported: bool,

    pub symbol_scheme: SymbolScheme,

    /// Grammar nesting cap.
    pub max_depth: usize,
}

impl Default for PigConfig {
    fn default() -> Self {
        Self {
            load_path: "/user/hadoop/ambitionlog".to_string(),
            loader: "com.twitter.elephantbird.pig.load.LzoThriftBlockPigLoader".to_string(),
            schema_class: "com.mediav.data.log.CookieDailyLog".to_string(),
            flatten_field: "events".to_string(),
            jars: DEFAULT_JARS.iter().map(|s| s.to_string()).collect(),
            fields: DEFAULT_FIELDS.iter().map(|s| s.to_string()).collect(),
            check_fields: false,
            reject_unsupported: false,
            symbol_scheme: SymbolScheme::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl PigConfig {
    /// Parse a TOML document.
    pub fn from_toml(content: &str) -> PigResult<Self> {
        toml::from_str(content).map_err(|e| PigError::Config(e.to_string()))
    }

    /// Load from an explicit path.
    pub fn load(path: &Path) -> PigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| PigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&content)?;
        info!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Resolve the configuration: the explicit path if given, else
    /// `./sqlpig.toml`, else the user config directory, else defaults.
    pub fn discover(explicit: Option<&Path>) -> PigResult<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        for path in Self::search_paths() {
            if path.is_file() {
                return Self::load(&path);
            }
        }
        Ok(Self::default())
    }

    fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(LOCAL_CONFIG)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("sqlpig").join("config.toml"));
        }
        paths
    }

    pub fn is_allowed_field(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f == field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PigConfig::default();
        assert_eq!(config.jars.len(), 13);
        assert_eq!(config.flatten_field, "events");
        assert!(config.is_allowed_field("mvid"));
        assert!(!config.is_allowed_field("MVID"));
        assert!(!config.check_fields);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = PigConfig::from_toml(
            r#"
            check_fields = true
            symbol_scheme = "alphabetic"
            fields = ["a", "b"]
            "#,
        )
        .unwrap();
        assert!(config.check_fields);
        assert_eq!(config.symbol_scheme, SymbolScheme::Alphabetic);
        assert_eq!(config.fields, vec!["a", "b"]);
        assert_eq!(config.load_path, "/user/hadoop/ambitionlog");
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn test_invalid_toml() {
        let err = PigConfig::from_toml("check_fields = \"yes\"").unwrap_err();
        assert!(matches!(err, PigError::Config(_)));
    }

    #[test]
    fn test_missing_explicit_file() {
        let missing = Path::new("/nonexistent/sqlpig.toml");
        let err = PigConfig::discover(Some(missing)).unwrap_err();
        match &err {
            PigError::Io { path, source } => {
                assert_eq!(path, missing);
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(err.to_string().starts_with("IO error reading /nonexistent/sqlpig.toml: "));
    }

    #[test]
    fn test_load_reads_file() {
        let path = std::env::temp_dir().join(format!("sqlpig-config-{}.toml", std::process::id()));
        fs::write(&path, "flatten_field = \"items\"\n").unwrap();
        let config = PigConfig::load(&path);
        fs::remove_file(&path).unwrap();
        assert_eq!(config.unwrap().flatten_field, "items");
    }
}
