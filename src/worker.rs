//! Background decoding for live frame sources.
//!
//! A camera produces frames faster than a decoder can keep up with, and only
//! the newest one matters. [`DecodeWorker`] keeps a single-slot mailbox: each
//! [`submit`](DecodeWorker::submit) overwrites the pending frame, the worker
//! thread takes whatever is there when it becomes free, and finished decodes
//! come back as [`WorkerReport`]s over a channel.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::clock::Stopwatch;
use crate::error::{DecodeError, SweepError};
use crate::image::ImageBuffer;
use crate::oracle::{guarded_decode, DecodeOracle, DecodeResult};

/// A finished decode.
#[derive(Debug, Clone)]
pub struct WorkerReport {
    pub image: ImageBuffer,
    pub results: Result<Vec<DecodeResult>, DecodeError>,
    pub elapsed: Duration,
}

#[derive(Default)]
struct Slot {
    frame: Option<ImageBuffer>,
    closed: bool,
}

#[derive(Default)]
struct Mailbox {
    slot: Mutex<Slot>,
    ready: Condvar,
}

impl Mailbox {
    fn lock(&self) -> MutexGuard<'_, Slot> {
        match self.slot.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::warn!("decode mailbox lock poisoned, continuing with recovered state");
                poisoned.into_inner()
            }
        }
    }

    fn close(&self) {
        self.lock().closed = true;
        self.ready.notify_all();
    }

    /// Block until a frame is pending or the mailbox is closed.
    fn take(&self) -> Option<ImageBuffer> {
        let mut slot = self.lock();
        loop {
            if slot.closed {
                return None;
            }
            if let Some(frame) = slot.frame.take() {
                return Some(frame);
            }
            slot = match self.ready.wait(slot) {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
        }
    }
}

/// Single background thread decoding the most recently submitted frame.
pub struct DecodeWorker {
    mailbox: Arc<Mailbox>,
    reports: Receiver<WorkerReport>,
    handle: Option<JoinHandle<()>>,
}

impl DecodeWorker {
    pub fn spawn<O: DecodeOracle + 'static>(oracle: Arc<O>) -> Result<Self, SweepError> {
        let mailbox = Arc::new(Mailbox::default());
        let (tx, reports) = mpsc::channel();

        let shared = Arc::clone(&mailbox);
        let handle = thread::Builder::new()
            .name("decode-worker".to_string())
            .spawn(move || run(shared, oracle, tx))?;

        Ok(Self {
            mailbox,
            reports,
            handle: Some(handle),
        })
    }

    /// Hand over a frame. Returns `true` when it replaced one the worker had
    /// not started on yet.
    pub fn submit(&self, frame: ImageBuffer) -> bool {
        let replaced = self.mailbox.lock().frame.replace(frame).is_some();
        self.mailbox.ready.notify_one();
        replaced
    }

    pub fn try_report(&self) -> Option<WorkerReport> {
        self.reports.try_recv().ok()
    }

    /// Wait up to `timeout` for the next report.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<WorkerReport> {
        self.reports.recv_timeout(timeout).ok()
    }

    /// Close the mailbox and join the thread. A decode already in progress
    /// finishes first; a pending frame is dropped.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.mailbox.close();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("decode worker panicked");
            }
        }
    }
}

impl Drop for DecodeWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run<O: DecodeOracle>(mailbox: Arc<Mailbox>, oracle: Arc<O>, tx: Sender<WorkerReport>) {
    log::debug!("decode worker started");
    while let Some(image) = mailbox.take() {
        let watch = Stopwatch::start();
        let results = guarded_decode(&*oracle, &image);
        let elapsed = watch.elapsed();
        if let Err(err) = &results {
            log::warn!("live decode failed: {}", err);
        }

        let report = WorkerReport {
            image,
            results,
            elapsed,
        };
        if tx.send(report).is_err() {
            break;
        }
    }
    log::debug!("decode worker stopped");
}

// ── Tests ──────────────────────────────────────────────────────────
