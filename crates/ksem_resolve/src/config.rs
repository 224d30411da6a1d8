//! Resolver settings, read from the `[resolve]` table of `ksem.toml`.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// How production, label and sort references pick the files to search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImportScopePolicy {
    /// A file with no `require` is searched alone, even when other files
    /// require it.
    #[default]
    FileWhenNoRequires,
    /// Like `FileWhenNoRequires`, except a file that another file of its
    /// module requires is searched module-wide.
    ModuleWhenRequiredBy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ResolverConfig {
    pub import_scope: ImportScopePolicy,
    /// Marker introducing the short form inside a label.
    pub label_separator: char,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            import_scope: ImportScopePolicy::default(),
            label_separator: '`',
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    resolve: ResolverConfig,
}

impl ResolverConfig {
    /// Parse the `[resolve]` table out of a TOML document. A missing table or
    /// missing keys fall back to defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(content).map_err(ConfigError::Parse)?;
        Ok(file.resolve)
    }

    /// Load from a specific `ksem.toml`.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Render as a `ksem.toml` document.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        let file = ConfigFile {
            resolve: self.clone(),
        };
        toml::to_string_pretty(&file).map_err(ConfigError::Serialize)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let content = self.to_toml_string()?;
        fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: io::Error },
    Parse(toml::de::Error),
    Serialize(toml::ser::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "failed to access {}: {}", path.display(), source)
            }
            ConfigError::Parse(e) => write!(f, "invalid ksem.toml: {}", e),
            ConfigError::Serialize(e) => write!(f, "failed to serialize config: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Serialize(e) => Some(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_table_missing() {
        let config = ResolverConfig::from_toml_str("[package]\nname = \"imp\"\n").unwrap();
        assert_eq!(config, ResolverConfig::default());
        assert_eq!(config.import_scope, ImportScopePolicy::FileWhenNoRequires);
        assert_eq!(config.label_separator, '`');
    }

    #[test]
    fn test_reads_policy() {
        let config = ResolverConfig::from_toml_str(
            "[resolve]\nimport-scope = \"module-when-required-by\"\n",
        )
        .unwrap();
        assert_eq!(config.import_scope, ImportScopePolicy::ModuleWhenRequiredBy);
        assert_eq!(config.label_separator, '`');
    }

    #[test]
    fn test_reads_separator() {
        let config = ResolverConfig::from_toml_str("[resolve]\nlabel-separator = \"#\"\n").unwrap();
        assert_eq!(config.label_separator, '#');
    }

    #[test]
    fn test_rejects_unknown_policy() {
        let err = ResolverConfig::from_toml_str("[resolve]\nimport-scope = \"everything\"\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().starts_with("invalid ksem.toml"));
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = ResolverConfig {
            import_scope: ImportScopePolicy::ModuleWhenRequiredBy,
            label_separator: '`',
        };
        let text = config.to_toml_string().unwrap();
        assert!(text.contains("[resolve]"));
        assert_eq!(ResolverConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_load_missing_file() {
        let path = std::env::temp_dir().join("ksem-missing-dir").join("ksem.toml");
        let err = ResolverConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_save_and_load() {
        let dir = std::env::temp_dir().join(format!("ksem-config-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("ksem.toml");

        let config = ResolverConfig {
            import_scope: ImportScopePolicy::ModuleWhenRequiredBy,
            label_separator: '#',
        };
        config.save_to(&path).unwrap();
        assert_eq!(ResolverConfig::load_from(&path).unwrap(), config);

        let _ = fs::remove_dir_all(&dir);
    }
}
