//! Command-line interface for the `htmlshot` binary
//!
//! Named flags are the primary interface. Up to three bare arguments are also
//! accepted for compatibility with older invocations and are read as
//! `INPUT [OUTPUT [SCALE]]`. [`Cli::into_request`] merges both sources into a
//! single [`RenderRequest`]; a value given by flag always wins over the
//! positional one.

use crate::{
    Error, RenderOptions, RenderRequest, Result, DEFAULT_SCALE, DEFAULT_WAIT_MS, DEFAULT_WIDTH,
};
use clap::Parser;
use std::path::PathBuf;

const EXAMPLES: &str = "\
Examples:
  htmlshot -i document.html -o export.png
  htmlshot --input page.html --output ./exports/page.png --scale 3
  htmlshot document.html                    # writes document.png next to the input
  htmlshot document.html custom.png 4       # positional compatibility mode";

/// HTML to PNG Exporter - Convert HTML files to high-resolution PNG images
#[derive(Parser, Debug)]
#[command(name = "htmlshot", version, about, after_help = EXAMPLES)]
pub struct Cli {
    /// Input HTML file path
    #[arg(short, long, value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// Output PNG file path or directory (default: input path with a .png extension)
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Scale factor for resolution (default: 2, use 3-4 for higher quality)
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    pub scale: Option<u32>,

    /// Viewport width in pixels
    #[arg(short, long, default_value_t = DEFAULT_WIDTH, value_parser = clap::value_parser!(u32).range(1..))]
    pub width: u32,

    /// Wait time in milliseconds for content rendering
    #[arg(long, value_name = "MS", default_value_t = DEFAULT_WAIT_MS)]
    pub wait: u64,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// INPUT [OUTPUT [SCALE]]
    #[arg(hide = true)]
    pub positional: Vec<String>,
}

impl Cli {
    /// Merge flags and positional arguments into one request.
    ///
    /// Returns [`Error::ConfigError`] when no input was given either way. A
    /// positional scale that is not a positive integer is ignored.
    pub fn into_request(self) -> Result<RenderRequest> {
        let mut positional = self.positional.into_iter();
        let pos_input = positional.next();
        let pos_output = positional.next();
        let pos_scale = positional.next();

        let input = self.input.or_else(|| pos_input.map(PathBuf::from));
        let output = self.output.or_else(|| pos_output.map(PathBuf::from));
        let scale = self
            .scale
            .or_else(|| pos_scale.as_deref().and_then(parse_scale))
            .unwrap_or(DEFAULT_SCALE);

        let input = input.ok_or_else(|| {
            Error::ConfigError(
                "Input file is required. Use -i/--input or provide as first positional argument."
                    .into(),
            )
        })?;

        let options = RenderOptions {
            scale,
            width: self.width,
            wait_ms: self.wait,
            ..Default::default()
        };

        Ok(RenderRequest::new(input, output, options))
    }
}

fn parse_scale(raw: &str) -> Option<u32> {
    raw.trim().parse::<u32>().ok().filter(|s| *s >= 1)
}
