//! Render requests and their resolution into concrete jobs
//!
//! A [`RenderRequest`] carries the paths exactly as the caller supplied them.
//! [`RenderRequest::resolve`] turns it into a [`RenderJob`] with an absolute
//! source path that is known to exist and a final `.png` destination whose
//! parent directory exists.

use crate::{Error, RenderOptions, Result};
use log::{debug, warn};
use std::path::{Path, PathBuf};

/// Extensions accepted without an advisory warning (compared case-insensitively)
const HTML_EXTENSIONS: &[&str] = &["html", "htm"];

/// An unresolved render request
#[derive(Debug, Clone)]
pub struct RenderRequest {
    /// Source HTML file, relative or absolute
    pub source: PathBuf,
    /// Output file or directory; `None` places the PNG next to the source
    pub destination: Option<PathBuf>,
    /// Render options
    pub options: RenderOptions,
}

/// A resolved render job, ready to be handed to a browser session
#[derive(Debug, Clone)]
pub struct RenderJob {
    /// Absolute path of an existing source file
    pub source: PathBuf,
    /// Final output file path
    pub destination: PathBuf,
    /// Render options
    pub options: RenderOptions,
}

impl RenderRequest {
    pub fn new(
        source: impl Into<PathBuf>,
        destination: Option<impl Into<PathBuf>>,
        options: RenderOptions,
    ) -> Self {
        Self {
            source: source.into(),
            destination: destination.map(Into::into),
            options,
        }
    }

    /// Resolve paths and prepare the destination directory.
    ///
    /// Fails with [`Error::SourceNotFound`] before touching the filesystem
    /// when the source does not exist. A source without an `.html`/`.htm`
    /// extension only produces a warning.
    pub fn resolve(self) -> Result<RenderJob> {
        let source = absolutize(&self.source)?;
        if !source.exists() {
            return Err(Error::SourceNotFound(source));
        }
        let source = source.canonicalize().unwrap_or(source);

        if !is_html_path(&source) {
            let ext = source
                .extension()
                .map(|e| format!(".{}", e.to_string_lossy()))
                .unwrap_or_default();
            warn!(
                "Input file may not be an HTML file: {} ({})",
                ext,
                source.display()
            );
        }

        let destination = resolve_destination(&source, self.destination.as_deref())?;
        ensure_parent_dir(&destination)?;
        debug!("resolved {} -> {}", source.display(), destination.display());

        Ok(RenderJob {
            source,
            destination,
            options: self.options,
        })
    }
}

impl RenderJob {
    /// `file://` URL of the source document
    #[cfg(feature = "cdp")]
    pub fn file_url(&self) -> Result<url::Url> {
        url::Url::from_file_path(&self.source).map_err(|()| {
            Error::LoadError(format!(
                "Cannot build a file URL for {}",
                self.source.display()
            ))
        })
    }
}

/// Whether the path carries an `.html` or `.htm` extension (any case)
pub fn is_html_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| HTML_EXTENSIONS.iter().any(|h| e.eq_ignore_ascii_case(h)))
        .unwrap_or(false)
}

/// Compute the output path for `source`.
///
/// - no destination: the source path with its extension replaced by `.png`
/// - an existing directory: `<dir>/<source stem>.png`
/// - anything else: the destination as given
pub fn resolve_destination(source: &Path, destination: Option<&Path>) -> Result<PathBuf> {
    let Some(dest) = destination else {
        return Ok(source.with_extension("png"));
    };

    let dest = absolutize(dest)?;
    if dest.is_dir() {
        let file_name = source.with_extension("png");
        let file_name = file_name.file_name().ok_or_else(|| {
            Error::ConfigError(format!("Source has no file name: {}", source.display()))
        })?;
        return Ok(dest.join(file_name));
    }
    Ok(dest)
}

fn ensure_parent_dir(destination: &Path) -> Result<()> {
    if let Some(parent) = destination.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!("creating output directory {}", parent.display());
            std::fs::create_dir_all(parent).map_err(|source| Error::WriteError {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }
    Ok(())
}

fn absolutize(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir()
        .map_err(|e| Error::Other(format!("Cannot determine working directory: {}", e)))?;
    Ok(cwd.join(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn write_source(dir: &Path, name: &str) -> PathBuf {
        let p = dir.join(name);
        std::fs::write(&p, "<html><body>hi</body></html>").unwrap();
        p
    }

    #[test]
    fn html_extension_is_case_insensitive() {
        assert!(is_html_path(Path::new("a/b.html")));
        assert!(is_html_path(Path::new("a/b.HTM")));
        assert!(is_html_path(Path::new("B.Html")));
        assert!(!is_html_path(Path::new("b.txt")));
        assert!(!is_html_path(Path::new("html")));
    }

    #[test]
    fn default_destination_replaces_extension() {
        let dest = resolve_destination(Path::new("/tmp/a/b.html"), None).unwrap();
        assert_eq!(dest, PathBuf::from("/tmp/a/b.png"));
    }

    #[test]
    fn directory_destination_uses_source_stem() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        std::fs::create_dir(&out).unwrap();

        let dest = resolve_destination(Path::new("/tmp/a/b.html"), Some(out.as_path())).unwrap();
        assert_eq!(dest, out.join("b.png"));
    }

    #[test]
    fn explicit_destination_is_kept_and_parents_created() {
        let dir = tempfile::tempdir().unwrap();
        let src = write_source(dir.path(), "page.html");
        let wanted = dir.path().join("nested/deeper/shot.png");

        let job = RenderRequest::new(&src, Some(&wanted), RenderOptions::default())
            .resolve()
            .unwrap();

        assert_eq!(job.destination, wanted);
        assert!(wanted.parent().unwrap().is_dir());
        assert!(!wanted.exists());
    }

    #[test]
    fn missing_source_fails_without_creating_output() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("missing.html");
        let out = dir.path().join("made/up.png");

        let err = RenderRequest::new(&src, Some(&out), RenderOptions::default())
            .resolve()
            .unwrap_err();

        assert!(matches!(err, Error::SourceNotFound(ref p) if p == &src));
        assert!(!out.parent().unwrap().exists());
    }

    /// Collects warnings so tests can check which advisories were logged
    struct WarnCapture(Mutex<Vec<String>>);

    impl log::Log for WarnCapture {
        fn enabled(&self, metadata: &log::Metadata) -> bool {
            metadata.level() <= log::Level::Warn
        }

        fn log(&self, record: &log::Record) {
            if self.enabled(record.metadata()) {
                self.0.lock().unwrap().push(record.args().to_string());
            }
        }

        fn flush(&self) {}
    }

    static WARNINGS: WarnCapture = WarnCapture(Mutex::new(Vec::new()));

    fn warnings_mentioning(needle: &str) -> Vec<String> {
        WARNINGS
            .0
            .lock()
            .unwrap()
            .iter()
            .filter(|w| w.contains(needle))
            .cloned()
            .collect()
    }

    fn capture_warnings() {
        // Another test may have installed the logger already
        let _ = log::set_logger(&WARNINGS);
        log::set_max_level(log::LevelFilter::Warn);
    }

    #[test]
    fn non_html_source_is_accepted_with_warning() {
        capture_warnings();
        let dir = tempfile::tempdir().unwrap();
        let src = write_source(dir.path(), "notes.txt");

        let job = RenderRequest::new(&src, None::<PathBuf>, RenderOptions::default())
            .resolve()
            .unwrap();
        assert_eq!(job.destination.file_name().unwrap(), "notes.png");

        let logged = warnings_mentioning(&job.source.display().to_string());
        assert_eq!(logged.len(), 1, "warnings: {:?}", logged);
        assert!(logged[0].starts_with("Input file may not be an HTML file: .txt"));
    }

    #[test]
    fn html_source_logs_no_warning() {
        capture_warnings();
        let dir = tempfile::tempdir().unwrap();
        let src = write_source(dir.path(), "page.HTM");

        let job = RenderRequest::new(&src, None::<PathBuf>, RenderOptions::default())
            .resolve()
            .unwrap();
        assert!(warnings_mentioning(&job.source.display().to_string()).is_empty());
    }

    #[cfg(feature = "cdp")]
    #[test]
    fn file_url_points_at_source() {
        let dir = tempfile::tempdir().unwrap();
        let src = write_source(dir.path(), "page.html");
        let job = RenderRequest::new(&src, None::<PathBuf>, RenderOptions::default())
            .resolve()
            .unwrap();

        let url = job.file_url().unwrap();
        assert_eq!(url.scheme(), "file");
        assert!(url.path().ends_with("/page.html"));
    }
}
