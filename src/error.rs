//! Error types for the rasterizer and the base64 codec

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for rasterizer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while rasterizing an HTML file
#[derive(Error, Debug)]
pub enum Error {
    /// The source HTML file does not exist
    #[error("HTML file not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    /// Failed to launch the browser or open a context/tab
    #[error("Browser initialization failed: {0}")]
    InitializationError(String),

    /// Failed to load the source document
    #[error("Failed to load page: {0}")]
    LoadError(String),

    /// Failed to capture or configure the page
    #[error("Rendering failed: {0}")]
    RenderError(String),

    /// Failed to evaluate a script against the loaded document
    #[error("Script execution failed: {0}")]
    ScriptError(String),

    /// Failed to write the output file or create its parent directories
    #[error("Failed to write {}: {source}", path.display())]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Operation timed out
    #[error("Operation timed out after {0}ms")]
    Timeout(u64),

    /// Invalid or incomplete invocation
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

/// Errors reported by the codec functions.
///
/// The codec never panics or propagates through `?` on its own; every
/// variant is logged at the point of failure and handed back for the caller
/// to inspect.
#[derive(Error, Debug)]
pub enum CodecError {
    /// The image file does not exist
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The file exists but could not be read
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The output file could not be written
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The input is not valid base64
    #[error("Invalid base64 input: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_not_found_names_the_path() {
        let err = Error::SourceNotFound(PathBuf::from("/tmp/missing.html"));
        assert_eq!(err.to_string(), "HTML file not found: /tmp/missing.html");
    }

    #[test]
    fn write_error_keeps_io_source() {
        let err = Error::WriteError {
            path: PathBuf::from("/out/x.png"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.to_string(), "Failed to write /out/x.png: denied");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn browser_failures_use_render_kinds() {
        assert_eq!(
            Error::InitializationError("no chrome".into()).to_string(),
            "Browser initialization failed: no chrome"
        );
        assert_eq!(Error::Timeout(30000).to_string(), "Operation timed out after 30000ms");
    }
}
