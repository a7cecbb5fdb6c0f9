//! htmlshot
//!
//! Two small tools sharing one crate:
//!
//! - **HTML rasterizer**: drives headless Chrome over the DevTools Protocol to
//!   turn a local HTML file into a high-resolution PNG whose height follows the
//!   rendered content.
//! - **Image/base64 codec**: converts image files to base64 (optionally as a
//!   `data:` URI) and back.
//!
//! # Features
//!
//! - **CDP Backend** (default, `cdp`): uses Chrome DevTools Protocol via headless Chrome
//! - The codec has no optional dependencies and is always available
//!
//! # Example
//!
//! ```no_run
//! # #[cfg(feature = "cdp")]
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use htmlshot::{RenderOptions, RenderRequest};
//!
//! let options = RenderOptions {
//!     scale: 3,
//!     width: 1600,
//!     ..Default::default()
//! };
//!
//! let job = RenderRequest::new("page.html", Some("exports/"), options).resolve()?;
//! let report = htmlshot::cdp::render_to_file(&job)?;
//! println!("{} ({})", report.path.display(), report.human_size());
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "cdp"))]
//! # fn main() {}
//! ```

pub mod error;
pub use error::{CodecError, Error, Result};

pub mod cli;
pub mod codec;
pub mod report;
pub mod request;

pub use report::RenderReport;
pub use request::{RenderJob, RenderRequest};

#[cfg(feature = "cdp")]
pub mod cdp;

// Async-friendly renderer (worker-thread backed)
#[cfg(feature = "cdp")]
pub mod async_api;

#[cfg(feature = "cdp")]
pub use async_api::Renderer;

/// Default device-pixel scale factor
pub const DEFAULT_SCALE: u32 = 2;
/// Default viewport width in CSS pixels
pub const DEFAULT_WIDTH: u32 = 1200;
/// Default blind delay after the page reports network idle
pub const DEFAULT_WAIT_MS: u64 = 1000;

/// Options controlling a single render
///
/// The defaults reproduce the exporter's long-standing behaviour: a 1200px
/// wide viewport rendered at 2x, a one second settle delay after load and a
/// half second reflow delay after the viewport is resized to the content.
///
/// # Examples
///
/// ```
/// let opts = htmlshot::RenderOptions::default();
/// assert_eq!(opts.effective_width(), 2400);
/// ```
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Device-pixel ratio applied to the browsing context (>= 1)
    pub scale: u32,
    /// Viewport width in CSS pixels
    pub width: u32,
    /// Blind delay after network idle, in milliseconds
    pub wait_ms: u64,
    /// Blind delay after resizing the viewport to the content height
    pub settle_ms: u64,
    /// Viewport height used for the first layout pass
    pub initial_height: u32,
    /// Upper bound for navigation plus the network-idle wait
    pub load_timeout_ms: u64,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
            width: DEFAULT_WIDTH,
            wait_ms: DEFAULT_WAIT_MS,
            settle_ms: 500,
            initial_height: 800,
            load_timeout_ms: 30000,
        }
    }
}

impl RenderOptions {
    /// Width of the output image in device pixels
    pub fn effective_width(&self) -> u64 {
        u64::from(self.width) * u64::from(self.scale)
    }

    /// Viewport used before the content height is known
    pub fn initial_viewport(&self) -> Viewport {
        Viewport {
            width: self.width,
            height: self.initial_height,
        }
    }
}

/// Viewport dimensions in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}
