//! Configuration file discovery and loading

use std::path::{Path, PathBuf};

use super::gml_config::{CONFIG_FILE_NAMES, GmlFmtConfiguration};
use crate::error::GmlError;
use crate::result::Result;

/// Configuration loader for discovering and loading config files
pub struct ConfigLoader;

impl ConfigLoader {
    /// Auto-discover a config file by walking upward from `start_path`
    ///
    /// Each directory is checked for the names in [`CONFIG_FILE_NAMES`], in
    /// order, before moving to its parent. Returns `None` at the filesystem
    /// root.
    pub fn auto_discover(start_path: &Path) -> Result<Option<PathBuf>> {
        let mut current = start_path
            .canonicalize()
            .map_err(|e| GmlError::config_error(format!("Invalid path: {e}")))?;
        if current.is_file() {
            if let Some(parent) = current.parent() {
                current = parent.to_path_buf();
            }
        }

        loop {
            for filename in CONFIG_FILE_NAMES {
                let config_path = current.join(filename);
                if config_path.is_file() {
                    tracing::debug!("Found config: {}", config_path.display());
                    return Ok(Some(config_path));
                }
            }

            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => break,
            }
        }

        Ok(None)
    }

    pub fn load_from_file(path: &Path) -> Result<GmlFmtConfiguration> {
        GmlFmtConfiguration::load(path)
    }

    /// Load config from an explicit path, or auto-discover one
    ///
    /// A missing explicit file is an error. When nothing is discovered, the
    /// default configuration is used.
    pub fn load(custom_path: Option<&Path>, start_dir: Option<&Path>) -> Result<GmlFmtConfiguration> {
        if let Some(path) = custom_path {
            if !path.exists() {
                return Err(GmlError::config_error(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            return Self::load_from_file(path);
        }

        let search_dir = start_dir.unwrap_or_else(|| Path::new("."));
        match Self::auto_discover(search_dir)? {
            Some(path) => Self::load_from_file(&path),
            None => {
                tracing::debug!("No config file found, using defaults");
                Ok(GmlFmtConfiguration::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_temp_config(dir: &Path, filename: &str, content: &str) -> PathBuf {
        let path = dir.join(filename);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_auto_discover_walks_up() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("scripts/player");
        fs::create_dir_all(&nested).unwrap();
        create_temp_config(temp_dir.path(), "gmlfmt.json", r#"{"root": true}"#);

        let found = ConfigLoader::auto_discover(&nested).unwrap().unwrap();
        assert!(found.ends_with("gmlfmt.json"));
    }

    #[test]
    fn test_auto_discover_priority() {
        let temp_dir = TempDir::new().unwrap();
        create_temp_config(temp_dir.path(), "gmlfmt.yaml", "root: true\n");
        create_temp_config(temp_dir.path(), ".gmlfmtrc.toml", "root = true\n");

        let found = ConfigLoader::auto_discover(temp_dir.path()).unwrap().unwrap();
        assert!(found.ends_with(".gmlfmtrc.toml"));
    }

    #[test]
    fn test_nearest_config_wins() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("objects");
        fs::create_dir_all(&nested).unwrap();
        create_temp_config(temp_dir.path(), "gmlfmt.json", r#"{"formatter": {"lineWidth": 120}}"#);
        create_temp_config(&nested, "gmlfmt.json", r#"{"formatter": {"lineWidth": 60}}"#);

        let config = ConfigLoader::load(None, Some(&nested)).unwrap();
        assert_eq!(config.formatter_config().line_width, Some(60));
    }

    #[test]
    fn test_load_explicit_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = create_temp_config(temp_dir.path(), "custom.json", r#"{"formatter": {"indentSize": 4}}"#);

        let config = ConfigLoader::load(Some(&path), None).unwrap();
        assert_eq!(config.formatter_config().indent_size, Some(4));
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let result = ConfigLoader::load(Some(Path::new("nonexistent.json")), None);
        assert!(matches!(result, Err(GmlError::Config { .. })));
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = ConfigLoader::load_from_file(Path::new("nonexistent.json"));
        assert!(result.is_err());
    }
}
