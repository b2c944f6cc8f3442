//! Configuration types for gmlfmt

use std::fs;
use std::path::Path;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::cst::FormatOptions;
use crate::error::GmlError;
use crate::result::Result;

/// Config file names, in discovery priority order
pub const CONFIG_FILE_NAMES: &[&str] = &[
    ".gmlfmtrc.json",
    ".gmlfmtrc.toml",
    "gmlfmt.yaml",
    "gmlfmt.yml",
    "gmlfmt.json",
];

/// Top-level configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GmlFmtConfiguration {
    /// JSON Schema reference for editor support
    #[serde(rename = "$schema", skip_serializing_if = "Option::is_none")]
    #[schemars(description = "JSON Schema reference")]
    pub schema: Option<String>,

    /// Stop config discovery at this file
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Mark this file as the project root configuration")]
    pub root: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Formatting preferences")]
    pub formatter: Option<FormatterConfiguration>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "File discovery patterns")]
    pub files: Option<FilesConfiguration>,
}

/// Indent style for formatting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum IndentStyle {
    /// Use spaces for indentation
    Spaces,
    /// Use tabs for indentation
    Tabs,
}

/// Formatter configuration
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FormatterConfiguration {
    /// Enable/disable formatter
    #[schemars(description = "Enable or disable the formatter")]
    pub enabled: Option<bool>,

    #[schemars(description = "Indentation style: 'spaces' or 'tabs'")]
    pub indent_style: Option<IndentStyle>,

    /// Indentation size in spaces (when indent_style is 'spaces')
    #[schemars(description = "Number of spaces per indentation level")]
    pub indent_size: Option<usize>,

    #[schemars(description = "Maximum line width before wrapping")]
    pub line_width: Option<usize>,
}

/// Files configuration
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FilesConfiguration {
    /// Glob patterns to include
    #[schemars(description = "Glob patterns for files to include")]
    pub include: Option<Vec<String>>,

    /// Glob patterns to exclude
    #[schemars(description = "Glob patterns for files to exclude")]
    pub exclude: Option<Vec<String>>,
}

impl GmlFmtConfiguration {
    /// Load a configuration file, picking the parser from its extension
    ///
    /// `.json`/`.jsonc` go through json5, so comments and trailing commas are
    /// accepted.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| GmlError::io_error(path, e))?;
        let extension = path.extension().and_then(|e| e.to_str());
        let config = Self::parse(&content, extension).map_err(|message| {
            GmlError::config_error(format!(
                "Failed to load config from '{}': {message}",
                path.display()
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    fn parse(content: &str, extension: Option<&str>) -> std::result::Result<Self, String> {
        match extension {
            Some("json") | Some("jsonc") => json5::from_str(content).map_err(|e| e.to_string()),
            Some("toml") => toml::from_str(content).map_err(|e| e.to_string()),
            Some("yaml") | Some("yml") => serde_yaml::from_str(content).map_err(|e| e.to_string()),
            _ => Err("Unsupported file extension (expected .json, .toml, .yaml or .yml)".into()),
        }
    }

    /// Reject values the layout engine cannot work with
    pub fn validate(&self) -> Result<()> {
        let formatter = self.formatter_config();
        if formatter.line_width == Some(0) {
            return Err(GmlError::config_error("formatter.lineWidth must be at least 1"));
        }
        if let Some(size) = formatter.indent_size {
            if size > 16 {
                return Err(GmlError::config_error(format!(
                    "formatter.indentSize must be at most 16, got {size}"
                )));
            }
        }
        Ok(())
    }

    /// Get formatter configuration with defaults
    pub fn formatter_config(&self) -> FormatterConfiguration {
        self.formatter.clone().unwrap_or_default()
    }

    /// Get files configuration with defaults
    pub fn files_config(&self) -> FilesConfiguration {
        self.files.clone().unwrap_or_default()
    }

    /// Default configuration as written by `gmlfmt config init`
    pub fn default_file_contents() -> Result<String> {
        let config = Self {
            schema: None,
            root: Some(true),
            formatter: Some(FormatterConfiguration::default()),
            files: Some(FilesConfiguration::default()),
        };
        serde_json::to_string_pretty(&config)
            .map_err(|e| GmlError::config_error(format!("Failed to serialize config: {e}")))
    }

    /// JSON Schema of the configuration file
    pub fn json_schema() -> Result<String> {
        let schema = schemars::schema_for!(GmlFmtConfiguration);
        serde_json::to_string_pretty(&schema)
            .map_err(|e| GmlError::config_error(format!("Failed to serialize schema: {e}")))
    }
}

impl FormatterConfiguration {
    /// Core formatting options, with defaults for unset fields
    pub fn to_format_options(&self) -> FormatOptions {
        let defaults = FormatOptions::default();
        FormatOptions {
            line_width: self.line_width.unwrap_or(defaults.line_width),
            indent_width: self.indent_size.unwrap_or(defaults.indent_width),
            use_tabs: self.indent_style == Some(IndentStyle::Tabs),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }
}

impl Default for FormatterConfiguration {
    fn default() -> Self {
        Self {
            enabled: Some(true),
            indent_style: Some(IndentStyle::Spaces),
            indent_size: Some(2),
            line_width: Some(80),
        }
    }
}

impl Default for FilesConfiguration {
    fn default() -> Self {
        Self {
            include: Some(vec!["**/*.gml".to_string()]),
            exclude: Some(vec![
                "**/node_modules/**".to_string(),
                "**/target/**".to_string(),
                "**/build/**".to_string(),
                "**/.git/**".to_string(),
            ]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_indent_style_serialization() {
        assert_eq!(serde_json::to_string(&IndentStyle::Tabs).unwrap(), "\"tabs\"");
        let style: IndentStyle = serde_json::from_str("\"spaces\"").unwrap();
        assert_eq!(style, IndentStyle::Spaces);
    }

    #[test]
    fn test_load_jsonc() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            ".gmlfmtrc.json",
            r#"{
                // comments are fine
                "formatter": { "lineWidth": 100, "indentStyle": "tabs", },
            }"#,
        );
        let config = GmlFmtConfiguration::load(&path).unwrap();
        let options = config.formatter_config().to_format_options();
        assert_eq!(options.line_width, 100);
        assert!(options.use_tabs);
        assert_eq!(options.indent_width, 2);
    }

    #[test]
    fn test_load_toml_and_yaml() {
        let dir = TempDir::new().unwrap();
        let toml_path = write(&dir, ".gmlfmtrc.toml", "[formatter]\nindentSize = 4\n");
        let config = GmlFmtConfiguration::load(&toml_path).unwrap();
        assert_eq!(config.formatter_config().indent_size, Some(4));

        let yaml_path = write(&dir, "gmlfmt.yaml", "files:\n  include:\n    - \"scripts/**/*.gml\"\n");
        let config = GmlFmtConfiguration::load(&yaml_path).unwrap();
        assert_eq!(
            config.files_config().include,
            Some(vec!["scripts/**/*.gml".to_string()])
        );
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config = GmlFmtConfiguration::default();
        assert_eq!(config.formatter_config().to_format_options(), FormatOptions::default());
        assert!(config.formatter_config().is_enabled());
    }

    #[test]
    fn test_invalid_values_are_config_errors() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "gmlfmt.json", r#"{ "formatter": { "lineWidth": 0 } }"#);
        let err = GmlFmtConfiguration::load(&path).unwrap_err();
        assert!(matches!(err, GmlError::Config { .. }));

        let path = write(&dir, "gmlfmt.yml", "formatter: [");
        assert!(GmlFmtConfiguration::load(&path).is_err());
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "gmlfmt.ini", "lineWidth=80");
        let err = GmlFmtConfiguration::load(&path).unwrap_err();
        assert!(err.to_string().contains("Unsupported file extension"));
    }

    #[test]
    fn test_default_file_round_trips() {
        let contents = GmlFmtConfiguration::default_file_contents().unwrap();
        assert!(contents.contains("\"lineWidth\": 80"));
        let parsed: GmlFmtConfiguration = json5::from_str(&contents).unwrap();
        assert_eq!(parsed.root, Some(true));
    }

    #[test]
    fn test_schema_mentions_fields() {
        let schema = GmlFmtConfiguration::json_schema().unwrap();
        assert!(schema.contains("lineWidth"));
        assert!(schema.contains("indentStyle"));
    }
}
