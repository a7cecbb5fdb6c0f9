//! Chrome DevTools Protocol backend
//!
//! [`BrowserSession`] owns a headless Chrome process for as long as it lives.
//! Every render opens its own incognito browser context and tab, because the
//! device scale factor and viewport are per-context settings. Dropping the
//! session (on success, on error, or through [`BrowserSession::close`]) shuts
//! the browser process down.

use crate::{Error, RenderJob, RenderOptions, RenderReport, Result, Viewport};
use headless_chrome::browser::tab::Tab;
use headless_chrome::protocol::cdp::{Emulation, Page, Target};
use headless_chrome::{Browser, LaunchOptions};
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Resource count must stay unchanged this long before the page counts as idle
const NETWORK_QUIET: Duration = Duration::from_millis(500);
const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(100);
/// Headroom added to the browser's idle timeout on top of our own waits
const IDLE_BROWSER_MARGIN: Duration = Duration::from_secs(30);

const IDLE_SAMPLE: &str = r#"
    (function() {
        return document.readyState + '|' + performance.getEntriesByType('resource').length;
    })()
"#;

const CONTENT_HEIGHT: &str = r#"
    (function() {
        const body = document.body;
        return body ? body.scrollHeight : document.documentElement.scrollHeight;
    })()
"#;

/// A running headless Chrome instance
pub struct BrowserSession {
    browser: Option<Browser>,
}

impl BrowserSession {
    /// Launch headless Chrome sized for the given options
    pub fn launch(options: &RenderOptions) -> Result<Self> {
        let viewport = options.initial_viewport();
        let idle = browser_idle_timeout(options);

        let launch_options = LaunchOptions::default_builder()
            .headless(true)
            .window_size(Some((viewport.width, viewport.height)))
            .idle_browser_timeout(idle)
            .build()
            .map_err(|e| Error::InitializationError(format!("Failed to build launch options: {}", e)))?;

        debug!("launching headless chrome ({}x{})", viewport.width, viewport.height);
        let browser = Browser::new(launch_options)
            .map_err(|e| Error::InitializationError(format!("Failed to launch browser: {}", e)))?;

        Ok(Self {
            browser: Some(browser),
        })
    }

    /// Run the two-phase render for `job` and write the PNG to its destination.
    ///
    /// The page is laid out at the nominal viewport, measured, resized to the
    /// measured content height and captured. The per-render context and tab are
    /// closed before returning, whatever the outcome.
    ///
    /// The capture covers the viewport, which is sized to `document.body.scrollHeight`.
    /// Content outside the body box (the body's own bottom margin, absolutely
    /// positioned elements overflowing it) is clipped.
    pub fn render(&self, job: &RenderJob) -> Result<RenderReport> {
        let browser = self
            .browser
            .as_ref()
            .ok_or_else(|| Error::Other("Browser session already closed".into()))?;
        let opts = &job.options;

        let context = browser
            .new_context()
            .map_err(|e| Error::InitializationError(format!("Failed to create browser context: {}", e)))?;
        let _disposer = ContextGuard {
            browser,
            id: context.get_id().to_string(),
        };
        let tab = context
            .new_tab()
            .map_err(|e| Error::InitializationError(format!("Failed to create tab: {}", e)))?;
        let page = PageGuard(tab);
        let tab = &page.0;

        tab.set_default_timeout(Duration::from_millis(opts.load_timeout_ms));
        set_device_metrics(tab, opts.initial_viewport(), opts.scale)?;

        let url = job.file_url()?;
        info!("loading {}", url);
        tab.navigate_to(url.as_str())
            .map_err(|e| Error::LoadError(format!("Navigation failed: {}", e)))?;
        tab.wait_until_navigated()
            .map_err(|e| Error::LoadError(format!("Wait for navigation failed: {}", e)))?;
        wait_for_network_idle(tab, Duration::from_millis(opts.load_timeout_ms))?;

        // Blind delay for script- or animation-driven rendering
        std::thread::sleep(Duration::from_millis(opts.wait_ms));

        let height = measure_content_height(tab)?;
        debug!("content height {}px, resizing viewport", height);
        set_device_metrics(
            tab,
            Viewport {
                width: opts.width,
                height,
            },
            opts.scale,
        )?;
        std::thread::sleep(Duration::from_millis(opts.settle_ms));

        let png = tab
            .capture_screenshot(Page::CaptureScreenshotFormatOption::Png, None, None, true)
            .map_err(|e| Error::RenderError(format!("Screenshot failed: {}", e)))?;

        std::fs::write(&job.destination, &png).map_err(|source| Error::WriteError {
            path: job.destination.clone(),
            source,
        })?;
        debug!("wrote {} bytes to {}", png.len(), job.destination.display());

        RenderReport::from_written(&job.destination, opts.scale, opts.effective_width(), height)
            .map_err(|source| Error::WriteError {
                path: job.destination.clone(),
                source,
            })
    }

    /// Shut the browser down
    pub fn close(mut self) -> Result<()> {
        self.shutdown();
        Ok(())
    }

    fn shutdown(&mut self) {
        if let Some(browser) = self.browser.take() {
            debug!("shutting down headless chrome");
            drop(browser);
        }
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Closes the tab it wraps when dropped
struct PageGuard(Arc<Tab>);

impl Drop for PageGuard {
    fn drop(&mut self) {
        if let Err(e) = self.0.close(false) {
            warn!("Failed to close tab: {}", e);
        }
    }
}

/// Disposes an incognito browser context when dropped.
///
/// Declared before the [`PageGuard`] of the same render so the tab is closed first.
struct ContextGuard<'a> {
    browser: &'a Browser,
    id: String,
}

impl Drop for ContextGuard<'_> {
    fn drop(&mut self) {
        let dispose = Target::DisposeBrowserContext {
            browser_context_id: self.id.clone(),
        };
        if let Err(e) = self.browser.call_method(dispose) {
            warn!("Failed to dispose browser context {}: {}", self.id, e);
        }
    }
}

/// Idle timeout for the DevTools connection: every wait of a render plus headroom.
fn browser_idle_timeout(options: &RenderOptions) -> Duration {
    let waits = options
        .load_timeout_ms
        .saturating_add(options.wait_ms)
        .saturating_add(options.settle_ms);
    Duration::from_millis(waits).saturating_add(IDLE_BROWSER_MARGIN)
}

/// Launch a browser, render one job and release the browser again
pub fn render_to_file(job: &RenderJob) -> Result<RenderReport> {
    let session = BrowserSession::launch(&job.options)?;
    let result = session.render(job);
    session.close()?;
    result
}

fn set_device_metrics(tab: &Tab, viewport: Viewport, scale: u32) -> Result<()> {
    let params = serde_json::json!({
        "width": viewport.width,
        "height": viewport.height,
        "deviceScaleFactor": f64::from(scale),
        "mobile": false,
    });
    let method: Emulation::SetDeviceMetricsOverride = serde_json::from_value(params)
        .map_err(|e| Error::RenderError(format!("Invalid device metrics: {}", e)))?;

    tab.call_method(method)
        .map_err(|e| Error::RenderError(format!("Failed to set device metrics: {}", e)))?;
    Ok(())
}

fn measure_content_height(tab: &Tab) -> Result<u32> {
    let result = tab
        .evaluate(CONTENT_HEIGHT, false)
        .map_err(|e| Error::ScriptError(format!("Failed to measure content height: {}", e)))?;

    let height = result
        .value
        .as_ref()
        .and_then(|v| v.as_f64())
        .ok_or_else(|| Error::ScriptError("Content height is not a number".into()))?;

    Ok((height.ceil() as u32).max(1))
}

fn wait_for_network_idle(tab: &Tab, timeout: Duration) -> Result<()> {
    let started = Instant::now();
    let mut tracker = IdleTracker::new(NETWORK_QUIET);

    loop {
        let sample = tab
            .evaluate(IDLE_SAMPLE, false)
            .map_err(|e| Error::LoadError(format!("Failed to poll page state: {}", e)))?;
        let raw = sample
            .value
            .as_ref()
            .and_then(|v| v.as_str())
            .unwrap_or_default();

        if let Some((ready, resources)) = parse_idle_sample(raw) {
            if tracker.observe(ready, resources, Instant::now()) {
                debug!("network idle after {:?} ({} resources)", started.elapsed(), resources);
                return Ok(());
            }
        }

        if started.elapsed() >= timeout {
            return Err(Error::Timeout(timeout.as_millis() as u64));
        }
        std::thread::sleep(IDLE_POLL_INTERVAL);
    }
}

/// Parse `"<readyState>|<resource count>"`
fn parse_idle_sample(raw: &str) -> Option<(bool, usize)> {
    let (state, count) = raw.split_once('|')?;
    let count = count.trim().parse().ok()?;
    Some((state.trim() == "complete", count))
}

/// Decides when a page has stopped loading resources.
///
/// The page is idle once the document is complete and the number of
/// resource entries has not changed for `quiet`.
#[derive(Debug)]
struct IdleTracker {
    quiet: Duration,
    last_count: Option<usize>,
    stable_since: Option<Instant>,
}

impl IdleTracker {
    fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            last_count: None,
            stable_since: None,
        }
    }

    fn observe(&mut self, ready: bool, resources: usize, now: Instant) -> bool {
        if !ready {
            self.last_count = None;
            self.stable_since = None;
            return false;
        }

        match (self.last_count, self.stable_since) {
            (Some(last), Some(since)) if last == resources => now.duration_since(since) >= self.quiet,
            _ => {
                self.last_count = Some(resources);
                self.stable_since = Some(now);
                false
            }
        }
    }
}
