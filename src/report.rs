//! Summary of a finished render

use std::path::{Path, PathBuf};

const MIB: u64 = 1024 * 1024;

/// What a render produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderReport {
    /// Written PNG file
    pub path: PathBuf,
    /// Size of the written file in bytes
    pub bytes: u64,
    /// Scale factor used for the capture
    pub scale: u32,
    /// Output width in device pixels (`width * scale`)
    pub effective_width: u64,
    /// Measured content height in CSS pixels
    pub content_height: u32,
}

impl RenderReport {
    /// Build a report by reading the file size back from disk
    pub fn from_written(
        path: &Path,
        scale: u32,
        effective_width: u64,
        content_height: u32,
    ) -> std::io::Result<Self> {
        let bytes = std::fs::metadata(path)?.len();
        Ok(Self {
            path: path.to_path_buf(),
            bytes,
            scale,
            effective_width,
            content_height,
        })
    }

    pub fn human_size(&self) -> String {
        human_size(self.bytes)
    }
}

/// Format a byte count as `x.y KB` below 1 MiB and `x.yy MB` from there on
pub fn human_size(bytes: u64) -> String {
    if bytes < MIB {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.2} MB", bytes as f64 / MIB as f64)
    }
}
