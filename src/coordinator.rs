//! Background rendering with "last request wins" ordering.
//!
//! Every submission takes the next id from a shared counter. The worker skips
//! queued jobs that have been superseded, and after rendering it drops any
//! result whose id is no longer the latest, so a slow render can never
//! overwrite the output of a newer request.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender, unbounded};
use tracing::{debug, warn};

use crate::render::{RenderError, RenderedImage, Renderer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(pub u64);

/// Receives the outcome of the latest render request.
pub trait RenderSink {
    fn rendered(&mut self, request: RequestId, image: RenderedImage);
    fn failed(&mut self, request: RequestId, error: RenderError);
}

#[derive(Debug)]
pub enum RenderOutcome {
    Rendered {
        request: RequestId,
        image: RenderedImage,
    },
    Failed {
        request: RequestId,
        error: RenderError,
    },
}

impl RenderOutcome {
    pub fn request(&self) -> RequestId {
        match self {
            RenderOutcome::Rendered { request, .. } | RenderOutcome::Failed { request, .. } => {
                *request
            }
        }
    }
}

impl RenderSink for Sender<RenderOutcome> {
    fn rendered(&mut self, request: RequestId, image: RenderedImage) {
        let _ = self.send(RenderOutcome::Rendered { request, image });
    }

    fn failed(&mut self, request: RequestId, error: RenderError) {
        let _ = self.send(RenderOutcome::Failed { request, error });
    }
}

struct RenderJob {
    request: RequestId,
    description: String,
}

pub struct RenderCoordinator {
    latest: Arc<AtomicU64>,
    jobs: Option<Sender<RenderJob>>,
    worker: Option<JoinHandle<()>>,
}

impl RenderCoordinator {
    pub fn spawn<R, S>(renderer: R, sink: S) -> std::io::Result<Self>
    where
        R: Renderer + Send + 'static,
        S: RenderSink + Send + 'static,
    {
        let latest = Arc::new(AtomicU64::new(0));
        let (tx, rx) = unbounded::<RenderJob>();
        let worker = thread::Builder::new()
            .name("render-worker".to_string())
            .spawn({
                let latest = Arc::clone(&latest);
                move || run_worker(renderer, sink, rx, latest)
            })?;

        Ok(Self {
            latest,
            jobs: Some(tx),
            worker: Some(worker),
        })
    }

    /// Queue a description for rendering, superseding every earlier request.
    pub fn submit(&self, description: impl Into<String>) -> RequestId {
        let request = RequestId(self.latest.fetch_add(1, Ordering::SeqCst) + 1);
        let job = RenderJob {
            request,
            description: description.into(),
        };
        let queued = self.jobs.as_ref().is_some_and(|jobs| jobs.send(job).is_ok());
        if !queued {
            warn!(request = request.0, "render worker is gone, request dropped");
        }
        request
    }

    /// Id of the most recent submission.
    pub fn latest(&self) -> RequestId {
        RequestId(self.latest.load(Ordering::SeqCst))
    }

    /// Pass `outcome` through only if no newer request has been submitted.
    ///
    /// Outcomes buffered in a channel sink can be overtaken by a submit
    /// between delivery and use; consumers filter with this before applying.
    pub fn accept(&self, outcome: RenderOutcome) -> Option<RenderOutcome> {
        if outcome.request() == self.latest() {
            Some(outcome)
        } else {
            debug!(
                request = outcome.request().0,
                latest = self.latest().0,
                "dropping superseded render outcome"
            );
            None
        }
    }

    /// Cancel outstanding work and wait for the worker to exit.
    ///
    /// A render already running inside the renderer finishes, but its result
    /// is discarded.
    pub fn shutdown(&mut self) {
        self.latest.fetch_add(1, Ordering::SeqCst);
        self.jobs.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("render worker panicked");
            }
        }
    }
}

impl Drop for RenderCoordinator {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_worker<R: Renderer, S: RenderSink>(
    renderer: R,
    mut sink: S,
    jobs: Receiver<RenderJob>,
    latest: Arc<AtomicU64>,
) {
    let is_current = |request: RequestId| latest.load(Ordering::SeqCst) == request.0;

    while let Ok(mut job) = jobs.recv() {
        // Only the newest queued job matters.
        while let Ok(next) = jobs.try_recv() {
            debug!(skipped = job.request.0, "coalesced queued render");
            job = next;
        }
        if !is_current(job.request) {
            debug!(request = job.request.0, "render superseded before start");
            continue;
        }

        let result = renderer.render(&job.description);

        if !is_current(job.request) {
            debug!(request = job.request.0, "discarding superseded render result");
            continue;
        }
        match result {
            Ok(image) => sink.rendered(job.request, image),
            Err(error) => {
                warn!(request = job.request.0, %error, "rendering failed");
                sink.failed(job.request, error);
            }
        }
    }
    debug!("render worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::OutputFormat;
    use std::time::Duration;

    struct Echo;

    impl Renderer for Echo {
        fn render(&self, description: &str) -> Result<RenderedImage, RenderError> {
            if description.is_empty() {
                return Err(RenderError::NoOutput);
            }
            Ok(RenderedImage {
                format: OutputFormat::Png,
                bytes: description.as_bytes().to_vec(),
            })
        }
    }

    #[test]
    fn request_ids_increase() {
        let (tx, _rx) = unbounded::<RenderOutcome>();
        let coord = RenderCoordinator::spawn(Echo, tx).unwrap();
        let a = coord.submit("a");
        let b = coord.submit("b");
        assert!(b > a);
        assert_eq!(coord.latest(), b);
    }

    #[test]
    fn single_request_is_delivered() {
        let (tx, rx) = unbounded::<RenderOutcome>();
        let coord = RenderCoordinator::spawn(Echo, tx).unwrap();
        let id = coord.submit("diagram");
        match rx.recv_timeout(Duration::from_secs(5)).unwrap() {
            RenderOutcome::Rendered { request, image } => {
                assert_eq!(request, id);
                assert_eq!(image.bytes, b"diagram");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn failure_is_reported() {
        let (tx, rx) = unbounded::<RenderOutcome>();
        let coord = RenderCoordinator::spawn(Echo, tx).unwrap();
        let id = coord.submit("");
        let outcome = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(outcome.request(), id);
        assert!(matches!(
            outcome,
            RenderOutcome::Failed {
                error: RenderError::NoOutput,
                ..
            }
        ));
    }

    #[test]
    fn accept_drops_outcome_overtaken_by_submit() {
        let (tx, rx) = unbounded::<RenderOutcome>();
        let coord = RenderCoordinator::spawn(Echo, tx).unwrap();
        coord.submit("old");
        let stale = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        let newer = coord.submit("new");
        assert!(coord.accept(stale).is_none());

        let fresh = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(coord.accept(fresh).map(|o| o.request()), Some(newer));
    }

    #[test]
    fn shutdown_closes_sink() {
        let (tx, rx) = unbounded::<RenderOutcome>();
        let mut coord = RenderCoordinator::spawn(Echo, tx).unwrap();
        coord.shutdown();
        assert!(rx.recv_timeout(Duration::from_secs(5)).is_err());
    }
}
