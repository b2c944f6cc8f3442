//! gmlfmt core
//!
//! Formatting engine for GameMaker Language (GML) sources: lexer, parser,
//! AST, comment attachment, Doc IR and layout, plus the configuration and
//! file discovery the front ends share.

pub mod config;
pub mod cst; // Concrete Syntax Tree (lossless, Rowan-based) and the formatter on top of it
pub mod discovery;
pub mod error;
pub mod result;

// Configuration system
pub use config::{
    ConfigLoader, FilesConfiguration, FormatterConfiguration, GmlFmtConfiguration, IndentStyle,
};
pub use cst::{CommentMap, FormatOptions, format_document, parse_gml};
pub use discovery::{DefaultFileDiscovery, FileDiscovery};
pub use error::{ErrorKind, GmlError};
pub use result::Result;

/// Format GML source text
///
/// Deterministic and all-or-nothing: the same input and options always give
/// the same output, and any error means no output at all.
pub fn format(source: &str, options: &FormatOptions) -> Result<String> {
    format_document(source, options)
}

/// Initialize the tracing subscriber for logging
pub fn init_tracing() {
    init_tracing_with_default("gml=info");
}

/// Initialize tracing with a fallback filter used when `RUST_LOG` is unset
pub fn init_tracing_with_default(default_filter: &str) {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true),
        )
        .try_init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
