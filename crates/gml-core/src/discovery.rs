//! Discovery of GML source files
//!
//! Directories are walked with `walkdir`; the configured include and exclude
//! globs are matched against paths relative to the discovery root.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

use crate::config::GmlFmtConfiguration;
use crate::error::GmlError;
use crate::result::Result;

const GML_EXTENSION: &str = "gml";

/// Trait for file discovery functionality
pub trait FileDiscovery {
    /// Discover GML files below the root, honoring the configured patterns
    fn discover_files(&self, config: &GmlFmtConfiguration) -> Result<Vec<PathBuf>>;

    /// Check if a file should be included based on configuration
    fn should_include(&self, path: &Path, config: &GmlFmtConfiguration) -> bool;
}

/// Default implementation of file discovery
#[derive(Debug, Clone)]
pub struct DefaultFileDiscovery {
    /// Root directory for file discovery
    pub root_dir: PathBuf,
}

/// Compiled include and exclude patterns
struct PatternSet {
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
}

impl PatternSet {
    fn from_config(config: &GmlFmtConfiguration) -> Result<Self> {
        let files = config.files_config();
        Ok(Self {
            include: compile(files.include.as_deref().unwrap_or_default())?,
            exclude: compile(files.exclude.as_deref().unwrap_or_default())?,
        })
    }

    fn matches(&self, relative: &Path) -> bool {
        let options = match_options();
        let included = self.include.is_empty()
            || self
                .include
                .iter()
                .any(|pattern| pattern.matches_path_with(relative, options));
        included
            && !self
                .exclude
                .iter()
                .any(|pattern| pattern.matches_path_with(relative, options))
    }

    /// Directories whose whole subtree is excluded
    fn prunes(&self, relative: &Path) -> bool {
        let options = match_options();
        let probe = relative.join("x");
        self.exclude
            .iter()
            .any(|pattern| pattern.as_str().ends_with("/**") && pattern.matches_path_with(&probe, options))
    }
}

fn match_options() -> MatchOptions {
    MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    }
}

fn compile(patterns: &[String]) -> Result<Vec<Pattern>> {
    patterns
        .iter()
        .map(|pattern| {
            Pattern::new(pattern).map_err(|e| {
                GmlError::config_error(format!("Invalid glob pattern '{pattern}': {e}"))
            })
        })
        .collect()
}

fn is_gml_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(GML_EXTENSION))
}

impl DefaultFileDiscovery {
    /// Create a new file discovery instance
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    fn relative<'p>(&self, path: &'p Path) -> &'p Path {
        path.strip_prefix(&self.root_dir).unwrap_or(path)
    }

    fn walk(&self, patterns: &PatternSet) -> Vec<PathBuf> {
        let keep = |entry: &DirEntry| {
            entry.depth() == 0
                || !entry.file_type().is_dir()
                || !patterns.prunes(self.relative(entry.path()))
        };

        let mut files = Vec::new();
        for entry in WalkDir::new(&self.root_dir)
            .follow_links(false)
            .into_iter()
            .filter_entry(keep)
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };
            let path = entry.path();
            if entry.file_type().is_file()
                && is_gml_file(path)
                && patterns.matches(self.relative(path))
            {
                files.push(path.to_path_buf());
            }
        }
        files
    }

    /// Expand command-line paths: files are taken as given, directories are
    /// discovered
    pub fn collect_paths(
        paths: &[PathBuf],
        config: &GmlFmtConfiguration,
    ) -> Result<Vec<PathBuf>> {
        let mut files = BTreeSet::new();
        for path in paths {
            if path.is_dir() {
                files.extend(Self::new(path).discover_files(config)?);
            } else if path.is_file() {
                files.insert(path.clone());
            } else {
                return Err(GmlError::io_error(
                    path,
                    std::io::Error::new(std::io::ErrorKind::NotFound, "no such file or directory"),
                ));
            }
        }
        Ok(files.into_iter().collect())
    }
}

impl FileDiscovery for DefaultFileDiscovery {
    fn discover_files(&self, config: &GmlFmtConfiguration) -> Result<Vec<PathBuf>> {
        info!("Discovering GML files in {}", self.root_dir.display());
        let patterns = PatternSet::from_config(config)?;
        let mut files = self.walk(&patterns);
        files.sort();
        debug!("Discovered {} GML files", files.len());
        Ok(files)
    }

    fn should_include(&self, path: &Path, config: &GmlFmtConfiguration) -> bool {
        if !is_gml_file(path) {
            return false;
        }
        match PatternSet::from_config(config) {
            Ok(patterns) => patterns.matches(self.relative(path)),
            Err(e) => {
                warn!("{}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FilesConfiguration;
    use std::fs;
    use tempfile::TempDir;

    fn project() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("scripts/player")).unwrap();
        fs::create_dir_all(root.join("objects/obj_enemy")).unwrap();
        fs::create_dir_all(root.join("build/out")).unwrap();
        fs::write(root.join("scripts/player/player.gml"), "x = 1;").unwrap();
        fs::write(root.join("objects/obj_enemy/Step_0.gml"), "y = 2;").unwrap();
        fs::write(root.join("build/out/copy.gml"), "z = 3;").unwrap();
        fs::write(root.join("scripts/player/player.yy"), "{}").unwrap();
        dir
    }

    fn config(include: &[&str], exclude: &[&str]) -> GmlFmtConfiguration {
        GmlFmtConfiguration {
            files: Some(FilesConfiguration {
                include: Some(include.iter().map(|s| s.to_string()).collect()),
                exclude: Some(exclude.iter().map(|s| s.to_string()).collect()),
            }),
            ..GmlFmtConfiguration::default()
        }
    }

    #[test]
    fn test_default_config_skips_build_dirs() {
        let dir = project();
        let discovery = DefaultFileDiscovery::new(dir.path());
        let files = discovery.discover_files(&GmlFmtConfiguration::default()).unwrap();

        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| f.extension().unwrap() == "gml"));
        assert!(!files.iter().any(|f| f.starts_with(dir.path().join("build"))));
    }

    #[test]
    fn test_include_patterns() {
        let dir = project();
        let discovery = DefaultFileDiscovery::new(dir.path());
        let files = discovery
            .discover_files(&config(&["scripts/**/*.gml"], &[]))
            .unwrap();
        assert_eq!(files, vec![dir.path().join("scripts/player/player.gml")]);
    }

    #[test]
    fn test_exclude_patterns() {
        let dir = project();
        let discovery = DefaultFileDiscovery::new(dir.path());
        let files = discovery
            .discover_files(&config(&["**/*.gml"], &["objects/**"]))
            .unwrap();
        assert_eq!(files.len(), 2);
        assert!(!files.iter().any(|f| f.ends_with("Step_0.gml")));
    }

    #[test]
    fn test_invalid_pattern_is_config_error() {
        let dir = project();
        let discovery = DefaultFileDiscovery::new(dir.path());
        let err = discovery.discover_files(&config(&["[unclosed"], &[])).unwrap_err();
        assert!(matches!(err, GmlError::Config { .. }));
    }

    #[test]
    fn test_should_include() {
        let dir = project();
        let discovery = DefaultFileDiscovery::new(dir.path());
        let config = GmlFmtConfiguration::default();
        assert!(discovery.should_include(&dir.path().join("scripts/a.gml"), &config));
        assert!(!discovery.should_include(&dir.path().join("scripts/a.yy"), &config));
        assert!(!discovery.should_include(&dir.path().join("build/a.gml"), &config));
    }

    #[test]
    fn test_collect_paths_mixes_files_and_dirs() {
        let dir = project();
        let single = dir.path().join("build/out/copy.gml");
        let paths = vec![dir.path().join("scripts"), single.clone()];
        let files = DefaultFileDiscovery::collect_paths(&paths, &GmlFmtConfiguration::default()).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files.contains(&single));

        let missing = vec![dir.path().join("nope.gml")];
        assert!(DefaultFileDiscovery::collect_paths(&missing, &GmlFmtConfiguration::default()).is_err());
    }
}
