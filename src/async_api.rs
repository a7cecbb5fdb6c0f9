use crate::cdp::BrowserSession;
use crate::{Error, RenderJob, RenderOptions, RenderReport, Result};
use log::debug;
use std::sync::mpsc::{self, Sender};
use std::thread;
use tokio::sync::oneshot;

enum Command {
    Render(Box<RenderJob>, oneshot::Sender<Result<RenderReport>>),
    Close(oneshot::Sender<Result<()>>),
}

/// An async-friendly renderer backed by a dedicated worker thread.
///
/// The worker thread owns a synchronous [`BrowserSession`] and executes
/// render jobs sent from async tasks one at a time. When the worker loop
/// ends, either through [`Renderer::close`] or because every handle was
/// dropped, the session is dropped with it and the browser process exits.
#[derive(Clone)]
pub struct Renderer {
    cmd_tx: Sender<Command>,
}

impl Renderer {
    /// Launch a browser on a new worker thread and wait until it is ready.
    pub async fn new(options: RenderOptions) -> Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<Command>();
        let (init_tx, init_rx) = oneshot::channel::<Result<()>>();

        thread::spawn(move || {
            let session = match BrowserSession::launch(&options) {
                Ok(s) => s,
                Err(err) => {
                    let _ = init_tx.send(Err(err));
                    return;
                }
            };

            // Signal successful launch (no-op when the caller went away)
            let _ = init_tx.send(Ok(()));

            while let Ok(cmd) = cmd_rx.recv() {
                match cmd {
                    Command::Render(job, resp) => {
                        let res = session.render(&job);
                        let _ = resp.send(res);
                    }
                    Command::Close(resp) => {
                        let _ = resp.send(session.close());
                        return;
                    }
                }
            }
            debug!("renderer handles dropped, releasing browser");
        });

        init_rx
            .await
            .map_err(|e| Error::Other(format!("Worker init canceled: {}", e)))??;

        Ok(Self { cmd_tx })
    }

    /// Render one job in a fresh browser context.
    pub async fn render(&self, job: RenderJob) -> Result<RenderReport> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Render(Box::new(job), tx))
            .map_err(|_| Error::Other("Renderer worker has stopped".into()))?;
        rx.await
            .map_err(|e| Error::Other(format!("Render canceled: {}", e)))?
    }

    /// Render several jobs in order; one failure does not stop the rest.
    pub async fn render_all(&self, jobs: Vec<RenderJob>) -> Vec<Result<RenderReport>> {
        let mut results = Vec::with_capacity(jobs.len());
        for job in jobs {
            results.push(self.render(job).await);
        }
        results
    }

    /// Shutdown the background worker and close the browser.
    pub async fn close(self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Close(tx))
            .map_err(|_| Error::Other("Renderer worker has stopped".into()))?;
        rx.await
            .map_err(|e| Error::Other(format!("Close canceled: {}", e)))?
    }
}
