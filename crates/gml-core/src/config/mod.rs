//! Configuration system for gmlfmt
//!
//! - JSON (with comments and trailing commas), TOML and YAML files
//! - Auto-discovery by walking up from the formatted directory
//! - Strong typing with serde and JSON Schema generation via schemars
//!
//! ## Configuration Discovery
//!
//! When no explicit config path is given, the loader searches the starting
//! directory and then each parent for, in order: `.gmlfmtrc.json`,
//! `.gmlfmtrc.toml`, `gmlfmt.yaml`, `gmlfmt.yml`, `gmlfmt.json`.
//!
//! ## Example Configuration
//!
//! ```jsonc
//! {
//!   // Formatting preferences
//!   "formatter": {
//!     "enabled": true,
//!     "indentStyle": "spaces",
//!     "indentSize": 4,
//!     "lineWidth": 100,
//!   },
//!   "files": {
//!     "include": ["scripts/**/*.gml", "objects/**/*.gml"],
//!     "exclude": ["**/generated/**"]
//!   }
//! }
//! ```

mod gml_config;
mod loader;

pub use gml_config::{
    CONFIG_FILE_NAMES, FilesConfiguration, FormatterConfiguration, GmlFmtConfiguration,
    IndentStyle,
};
pub use loader::ConfigLoader;
