//! Command implementations

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use gml_core::config::CONFIG_FILE_NAMES;
use gml_core::{ConfigLoader, DefaultFileDiscovery, GmlFmtConfiguration};
use gml_formatter::{FileFormatResult, FormatOutcome, IndentStyle, format_files, write_changes};
use tracing::{debug, info, warn};

use crate::console::Console;
use crate::output;

/// Process exit status of a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    /// `--check` found files that would change
    Unformatted,
    /// At least one file failed to lex, parse or read
    Failed,
}

impl ExitStatus {
    pub fn code(self) -> i32 {
        match self {
            ExitStatus::Success => 0,
            ExitStatus::Unformatted => 1,
            ExitStatus::Failed => 2,
        }
    }
}

/// Arguments of `gmlfmt fmt`
pub struct FormatArgs {
    pub paths: Vec<PathBuf>,
    pub write: bool,
    pub check: bool,
    pub diff: bool,
    pub line_width: Option<usize>,
    pub indent_size: Option<usize>,
    pub use_tabs: bool,
    pub config_path: Option<PathBuf>,
}

impl FormatArgs {
    /// A lone file with no output mode prints its formatted text
    fn prints_to_stdout(&self, files: &[PathBuf]) -> bool {
        !self.write
            && !self.check
            && !self.diff
            && files.len() == 1
            && self.paths.len() == 1
            && self.paths[0].is_file()
    }
}

/// Format command implementation
pub fn format_command(args: FormatArgs, console: &Console) -> Result<ExitStatus> {
    let start_dir = args.paths.first().map(PathBuf::as_path);
    let mut config = ConfigLoader::load(args.config_path.as_deref(), start_dir)
        .context("Failed to load configuration")?;
    apply_overrides(&mut config, &args);
    config.validate()?;

    let formatter = config.formatter_config();
    if !formatter.is_enabled() {
        info!("Formatter is disabled in configuration");
        return Ok(ExitStatus::Success);
    }
    let options = formatter.to_format_options();

    let roots = if args.paths.is_empty() {
        vec![PathBuf::from(".")]
    } else {
        args.paths.clone()
    };
    let files = DefaultFileDiscovery::collect_paths(&roots, &config)?;
    if files.is_empty() {
        warn!("No GML files found");
        return Ok(ExitStatus::Success);
    }
    debug!(
        files = files.len(),
        line_width = options.line_width,
        indent_width = options.indent_width,
        use_tabs = options.use_tabs,
        "formatting"
    );

    let results = format_files(&files, &options);

    if args.prints_to_stdout(&files) {
        return Ok(print_single(&results[0], console));
    }

    let mut changed = 0;
    let mut failed = 0;
    for result in &results {
        match &result.outcome {
            FormatOutcome::Unchanged => {}
            FormatOutcome::Changed { formatted } => {
                changed += 1;
                if args.diff {
                    print!(
                        "{}",
                        output::render_diff(&result.path, &result.original, formatted, console)
                    );
                }
                if !args.write {
                    eprintln!("{}", output::render_unformatted(&result.path, console));
                }
            }
            FormatOutcome::Failed { error } => {
                failed += 1;
                eprintln!("{}", output::render_error(&result.path, error, console));
            }
        }
    }

    let verb = if args.write {
        write_changes(&results)?;
        "reformatted"
    } else {
        "would be reformatted"
    };
    eprintln!("{}", output::render_summary(results.len(), changed, failed, verb));

    Ok(if failed > 0 {
        ExitStatus::Failed
    } else if args.check && changed > 0 {
        ExitStatus::Unformatted
    } else {
        ExitStatus::Success
    })
}

fn print_single(result: &FileFormatResult, console: &Console) -> ExitStatus {
    match &result.outcome {
        FormatOutcome::Unchanged => {
            print!("{}", result.original);
            ExitStatus::Success
        }
        FormatOutcome::Changed { formatted } => {
            print!("{formatted}");
            ExitStatus::Success
        }
        FormatOutcome::Failed { error } => {
            eprintln!("{}", output::render_error(&result.path, error, console));
            ExitStatus::Failed
        }
    }
}

/// Command-line flags take precedence over the configuration file
fn apply_overrides(config: &mut GmlFmtConfiguration, args: &FormatArgs) {
    let formatter = config.formatter.get_or_insert_with(Default::default);
    if let Some(line_width) = args.line_width {
        formatter.line_width = Some(line_width);
    }
    if let Some(indent_size) = args.indent_size {
        formatter.indent_size = Some(indent_size);
    }
    if args.use_tabs {
        formatter.indent_style = Some(IndentStyle::Tabs);
    }
}

/// `gmlfmt config schema`
pub fn config_schema_command() -> Result<ExitStatus> {
    println!("{}", GmlFmtConfiguration::json_schema()?);
    Ok(ExitStatus::Success)
}

/// `gmlfmt config init`
pub fn config_init_command(dir: Option<PathBuf>, force: bool) -> Result<ExitStatus> {
    let dir = dir.unwrap_or_else(|| PathBuf::from("."));
    let path = dir.join(CONFIG_FILE_NAMES[0]);
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }

    let contents = GmlFmtConfiguration::default_file_contents()?;
    fs::write(&path, contents + "\n")
        .with_context(|| format!("Failed to write {}", path.display()))?;
    eprintln!("Created {}", path.display());
    Ok(ExitStatus::Success)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> FormatArgs {
        FormatArgs {
            paths: Vec::new(),
            write: false,
            check: false,
            diff: false,
            line_width: None,
            indent_size: None,
            use_tabs: false,
            config_path: None,
        }
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(ExitStatus::Success.code(), 0);
        assert_eq!(ExitStatus::Unformatted.code(), 1);
        assert_eq!(ExitStatus::Failed.code(), 2);
    }

    #[test]
    fn test_overrides_win_over_config() {
        let mut config = GmlFmtConfiguration::default();
        let args = FormatArgs {
            line_width: Some(100),
            indent_size: Some(4),
            use_tabs: true,
            ..args()
        };
        apply_overrides(&mut config, &args);

        let options = config.formatter_config().to_format_options();
        assert_eq!(options.line_width, 100);
        assert_eq!(options.indent_width, 4);
        assert!(options.use_tabs);
    }

    #[test]
    fn test_no_overrides_keeps_defaults() {
        let mut config = GmlFmtConfiguration::default();
        apply_overrides(&mut config, &args());
        let options = config.formatter_config().to_format_options();
        assert_eq!(options.line_width, 80);
        assert_eq!(options.indent_width, 2);
        assert!(!options.use_tabs);
    }
}
