use liquidmark_engine::SerializerOptions;
use liquidmark_syntax::ParserOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

/// `[parser]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    pub max_nesting: usize,
    pub liquid_tags: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        let options = ParserOptions::default();
        Self {
            max_nesting: options.max_nesting,
            liquid_tags: options.liquid_tags,
        }
    }
}

impl From<&ParserConfig> for ParserOptions {
    fn from(config: &ParserConfig) -> Self {
        Self {
            max_nesting: config.max_nesting,
            liquid_tags: config.liquid_tags,
        }
    }
}

/// `[serializer]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerializerConfig {
    pub tight_lists: bool,
    pub bullet: char,
}

impl Default for SerializerConfig {
    fn default() -> Self {
        let options = SerializerOptions::default();
        Self {
            tight_lists: options.tight_lists,
            bullet: options.bullet,
        }
    }
}

impl From<&SerializerConfig> for SerializerOptions {
    fn from(config: &SerializerConfig) -> Self {
        Self {
            tight_lists: config.tight_lists,
            bullet: config.bullet,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub parser: ParserConfig,
    pub serializer: SerializerConfig,
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let config = toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
            config_path: config_path.to_path_buf(),
            source,
        })?;

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/liquidmark");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// Expand `~` and environment variables in a user-supplied config path.
    /// Paths that fail to expand are returned unchanged.
    pub fn expand_path(path: &Path) -> PathBuf {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => PathBuf::from(expanded.as_ref()),
            Err(_) => path.to_path_buf(),
        }
    }

    pub fn parser_options(&self) -> ParserOptions {
        (&self.parser).into()
    }

    pub fn serializer_options(&self) -> SerializerOptions {
        (&self.serializer).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::env;
    use tempfile::TempDir;

    #[test]
    fn test_config_path() {
        let config_path = Config::config_path();
        let path_str = config_path.to_string_lossy();

        assert!(!path_str.starts_with('~'));
        assert!(path_str.ends_with(".config/liquidmark/config.toml"));
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.parser_options(), ParserOptions::default());
        assert_eq!(config.serializer_options(), SerializerOptions::default());
    }

    #[test]
    fn test_partial_tables() {
        let config: Config = toml::from_str(
            r#"
[parser]
liquid_tags = false

[serializer]
bullet = "-"
"#,
        )
        .unwrap();

        assert_eq!(
            config.parser_options(),
            ParserOptions {
                max_nesting: 20,
                liquid_tags: false,
            }
        );
        assert_eq!(
            config.serializer_options(),
            SerializerOptions {
                tight_lists: false,
                bullet: '-',
            }
        );
    }

    #[test]
    fn test_bullet_must_be_one_char() {
        let result: Result<Config, _> = toml::from_str("[serializer]\nbullet = \"--\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let expanded = Config::expand_path(Path::new("~/test/config.toml"));
        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert!(expanded.to_string_lossy().ends_with("test/config.toml"));
    }

    #[test]
    fn test_expand_path_with_env_var() {
        unsafe {
            env::set_var("LIQUIDMARK_TEST_DIR", "/test/env/path");
        }

        let expanded = Config::expand_path(Path::new("$LIQUIDMARK_TEST_DIR/config.toml"));
        assert_eq!(expanded, PathBuf::from("/test/env/path/config.toml"));

        unsafe {
            env::remove_var("LIQUIDMARK_TEST_DIR");
        }
    }

    #[test]
    fn test_expand_path_with_unknown_var_is_unchanged() {
        let path = Path::new("$LIQUIDMARK_SURELY_UNSET/config.toml");
        assert_eq!(Config::expand_path(path), path.to_path_buf());
    }

    #[test]
    fn test_load_config_file_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let non_existent_config = temp_dir.path().join("nonexistent.toml");

        let result = Config::load_from_path(&non_existent_config).unwrap();

        assert!(result.is_none());
    }

    #[test]
    fn test_parse_error_names_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(&config_file, "[parser]\nmax_nesting = \"deep\"\n").unwrap();

        let err = Config::load_from_path(&config_file).unwrap_err();

        assert!(matches!(err, ConfigError::ConfigParseError { .. }));
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn test_save_and_load_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("nested").join("config.toml");
        let test_config = Config {
            parser: ParserConfig {
                max_nesting: 8,
                liquid_tags: true,
            },
            serializer: SerializerConfig {
                tight_lists: true,
                bullet: '+',
            },
        };

        test_config.save_to_path(&config_file).unwrap();
        let loaded_config = Config::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(loaded_config, test_config);
    }
}
