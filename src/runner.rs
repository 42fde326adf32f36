//! Serialized delivery of frames to the pipeline.
//!
//! Frames arrive from sensor callbacks faster than they may be processed.
//! The [`FrameMailbox`] holds at most one pending frame and replaces it when
//! a newer one arrives, so the pipeline always works on the freshest data and
//! never builds a backlog.

use crate::{
    collaborators::{FrameSource, GazeEstimator, PoseLookup, Publisher},
    constants::DISPATCH_RECV_TIMEOUT_MS,
    pipeline::GazePipeline,
    types::FrameBatch,
    Error, Result,
};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TrySendError};
use log::{debug, info, warn};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Number of frames that may wait for the pipeline
const MAILBOX_CAPACITY: usize = 1;

/// Cooperative shutdown flag shared between producers and the worker
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
    requested: Arc<AtomicBool>,
}

impl ShutdownSignal {
    /// Create an unset signal
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request shutdown
    pub fn request(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    /// Check if shutdown was requested
    #[must_use]
    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }
}

/// Single-slot, drop-oldest frame queue
#[derive(Debug, Clone)]
pub struct FrameMailbox {
    sender: Sender<FrameBatch>,
    receiver: Receiver<FrameBatch>,
    dropped: Arc<AtomicU64>,
    shutdown: ShutdownSignal,
}

impl FrameMailbox {
    /// Create an empty mailbox tied to `shutdown`
    #[must_use]
    pub fn new(shutdown: ShutdownSignal) -> Self {
        let (sender, receiver) = bounded(MAILBOX_CAPACITY);
        Self {
            sender,
            receiver,
            dropped: Arc::new(AtomicU64::new(0)),
            shutdown,
        }
    }

    /// Hand a frame to the pipeline without blocking.
    ///
    /// A frame still waiting in the mailbox is discarded in favour of `frame`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ShutdownRequested`] once shutdown has been requested
    pub fn post(&self, frame: FrameBatch) -> Result<()> {
        if self.shutdown.is_requested() {
            return Err(Error::ShutdownRequested);
        }

        let mut frame = frame;
        loop {
            match self.sender.try_send(frame) {
                Ok(()) => return Ok(()),
                Err(TrySendError::Full(rejected)) => {
                    if let Ok(stale) = self.receiver.try_recv() {
                        self.dropped.fetch_add(1, Ordering::Relaxed);
                        debug!("Dropping unprocessed frame stamped {}", stale.timestamp);
                    }
                    frame = rejected;
                }
                Err(TrySendError::Disconnected(_)) => return Err(Error::ShutdownRequested),
            }
        }
    }

    /// Frames discarded because a newer one arrived first
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Number of frames waiting
    #[must_use]
    pub fn pending(&self) -> usize {
        self.receiver.len()
    }

    fn receiver(&self) -> Receiver<FrameBatch> {
        self.receiver.clone()
    }
}

/// Runs a [`GazePipeline`] on its own thread, fed through a [`FrameMailbox`]
pub struct PipelineRunner<L, E, P> {
    mailbox: FrameMailbox,
    shutdown: ShutdownSignal,
    processed: Arc<AtomicU64>,
    handle: Option<JoinHandle<GazePipeline<L, E, P>>>,
}

impl<L, E, P> PipelineRunner<L, E, P>
where
    L: PoseLookup + Send + 'static,
    E: GazeEstimator + Send + 'static,
    P: Publisher + Send + 'static,
{
    /// Move `pipeline` onto a worker thread and start accepting frames
    pub fn spawn(pipeline: GazePipeline<L, E, P>) -> Self {
        let shutdown = ShutdownSignal::new();
        let mailbox = FrameMailbox::new(shutdown.clone());
        let processed = Arc::new(AtomicU64::new(0));

        let handle = {
            let receiver = mailbox.receiver();
            let shutdown = shutdown.clone();
            let processed = Arc::clone(&processed);
            thread::spawn(move || Self::run(pipeline, &receiver, &shutdown, &processed))
        };

        Self {
            mailbox,
            shutdown,
            processed,
            handle: Some(handle),
        }
    }

    fn run(
        mut pipeline: GazePipeline<L, E, P>,
        receiver: &Receiver<FrameBatch>,
        shutdown: &ShutdownSignal,
        processed: &AtomicU64,
    ) -> GazePipeline<L, E, P> {
        let timeout = Duration::from_millis(DISPATCH_RECV_TIMEOUT_MS);
        loop {
            if shutdown.is_requested() {
                break;
            }

            match receiver.recv_timeout(timeout) {
                Ok(batch) => {
                    pipeline.process_batch(&batch);
                    processed.fetch_add(1, Ordering::SeqCst);
                }
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        pipeline
    }

    /// Producer handle; clone it into sensor callbacks
    pub fn mailbox(&self) -> &FrameMailbox {
        &self.mailbox
    }

    /// Hand a frame to the worker, replacing any frame still waiting
    ///
    /// # Errors
    ///
    /// Returns [`Error::ShutdownRequested`] after shutdown
    pub fn post(&self, frame: FrameBatch) -> Result<()> {
        self.mailbox.post(frame)
    }

    /// Frames fully processed so far
    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::SeqCst)
    }

    /// Stop the worker and hand the pipeline back.
    ///
    /// A frame being processed is finished; a frame still waiting is discarded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WorkerPanicked`] if the worker thread panicked
    pub fn shutdown(mut self) -> Result<GazePipeline<L, E, P>> {
        self.shutdown.request();
        let handle = self.handle.take().ok_or(Error::ShutdownRequested)?;
        let pipeline = handle.join().map_err(|_| Error::WorkerPanicked)?;
        info!(
            "Pipeline stopped after {} frames ({} dropped)",
            self.processed(),
            self.mailbox.dropped()
        );
        Ok(pipeline)
    }
}

impl<L, E, P> Drop for PipelineRunner<L, E, P> {
    fn drop(&mut self) {
        self.shutdown.request();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("Pipeline worker panicked before shutdown");
            }
        }
    }
}

/// Feed every frame of `source` through `pipeline` on the calling thread.
///
/// Stops when the source is exhausted or `shutdown` is requested and returns
/// the number of frames processed.
pub fn run_source<S, L, E, P>(source: &mut S, pipeline: &mut GazePipeline<L, E, P>, shutdown: &ShutdownSignal) -> usize
where
    S: FrameSource + ?Sized,
    L: PoseLookup,
    E: GazeEstimator,
    P: Publisher,
{
    let mut processed = 0;
    while !shutdown.is_requested() {
        let Some(batch) = source.next_batch() else {
            info!("Frame source exhausted");
            break;
        };
        pipeline.process_batch(&batch);
        processed += 1;
    }
    processed
}
