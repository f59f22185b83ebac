use std::sync::mpsc::{self, Receiver, Sender};

use crate::config::PoseEngineConfig;
use crate::foundation::core::FrameTime;
use crate::foundation::error::{DrapeError, DrapeResult};
use crate::pose::landmark::PoseFrame;
use crate::video::VideoFrame;

/// A pose-estimation engine.
///
/// `submit` may answer synchronously or from another thread, but it must eventually complete or
/// drop the [`PoseReply`]. Dropping it counts as an empty result.
pub trait PoseEngine: Send {
    /// Load the model. Called once before any submission.
    fn initialize(&mut self, config: &PoseEngineConfig) -> DrapeResult<()>;

    /// Estimate the pose in `frame`.
    fn submit(&mut self, frame: &VideoFrame, timestamp: FrameTime, reply: PoseReply);
}

/// A completed estimate as seen by the scheduler.
#[derive(Clone, Debug, PartialEq)]
pub struct PoseResult {
    /// Timestamp of the frame that was analyzed.
    pub timestamp: FrameTime,
    /// `None` when no subject was found.
    pub pose: Option<PoseFrame>,
}

struct Delivery {
    epoch: u64,
    result: PoseResult,
}

/// One-shot completion handle for a single submission.
pub struct PoseReply {
    epoch: u64,
    timestamp: FrameTime,
    tx: Option<Sender<Delivery>>,
}

impl std::fmt::Debug for PoseReply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoseReply")
            .field("epoch", &self.epoch)
            .field("timestamp", &self.timestamp)
            .field("pending", &self.tx.is_some())
            .finish()
    }
}

impl PoseReply {
    /// Timestamp of the submitted frame.
    pub fn timestamp(&self) -> FrameTime {
        self.timestamp
    }

    /// Deliver the estimate. The pose's own timestamp is overwritten with the submitted one.
    pub fn complete(mut self, pose: Option<PoseFrame>) {
        self.send(pose);
    }

    fn send(&mut self, pose: Option<PoseFrame>) {
        let Some(tx) = self.tx.take() else {
            return;
        };
        let pose = pose.map(|mut p| {
            p.timestamp = self.timestamp;
            p
        });
        // The adapter may be gone after a stop; the result is moot then.
        let _ = tx.send(Delivery {
            epoch: self.epoch,
            result: PoseResult {
                timestamp: self.timestamp,
                pose,
            },
        });
    }
}

impl Drop for PoseReply {
    fn drop(&mut self) {
        if self.tx.is_some() {
            tracing::warn!(timestamp = self.timestamp.0, "pose engine dropped a reply");
            self.send(None);
        }
    }
}

/// What happened to a frame offered to the adapter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The frame went to the engine.
    Submitted,
    /// A previous submission is still in flight; the frame is skipped, not queued.
    Busy,
    /// The engine has not been initialized.
    NotReady,
}

/// Bridges an engine's asynchronous replies into the scheduler's tick.
///
/// At most one submission is in flight. Replies go through a channel and the newest one is handed
/// out once per [`PoseAdapter::poll`]. [`PoseAdapter::reset`] starts a new epoch so that replies
/// from a previous run are ignored.
pub struct PoseAdapter {
    engine: Box<dyn PoseEngine>,
    ready: bool,
    epoch: u64,
    in_flight: Option<FrameTime>,
    tx: Sender<Delivery>,
    rx: Receiver<Delivery>,
    submitted: u64,
    skipped_busy: u64,
}

impl std::fmt::Debug for PoseAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoseAdapter")
            .field("ready", &self.ready)
            .field("epoch", &self.epoch)
            .field("in_flight", &self.in_flight)
            .field("submitted", &self.submitted)
            .field("skipped_busy", &self.skipped_busy)
            .finish_non_exhaustive()
    }
}

impl PoseAdapter {
    /// Wrap an uninitialized engine.
    pub fn new(engine: impl PoseEngine + 'static) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            engine: Box::new(engine),
            ready: false,
            epoch: 0,
            in_flight: None,
            tx,
            rx,
            submitted: 0,
            skipped_busy: 0,
        }
    }

    /// Initialize the engine. Failures leave the adapter not ready.
    #[tracing::instrument(skip(self, config), fields(model = %config.model_asset_path))]
    pub fn initialize(&mut self, config: &PoseEngineConfig) -> DrapeResult<()> {
        config.validate()?;
        self.engine.initialize(config).map_err(|e| match e {
            DrapeError::EngineInit(_) => e,
            other => DrapeError::engine_init(other.to_string()),
        })?;
        self.ready = true;
        tracing::info!("pose engine ready");
        Ok(())
    }

    /// Whether `initialize` has succeeded.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Timestamp of the submission awaiting a reply.
    pub fn in_flight(&self) -> Option<FrameTime> {
        self.in_flight
    }

    /// Offer a frame for analysis.
    pub fn try_submit(&mut self, frame: &VideoFrame, timestamp: FrameTime) -> SubmitOutcome {
        if !self.ready {
            return SubmitOutcome::NotReady;
        }
        if self.in_flight.is_some() {
            self.skipped_busy += 1;
            return SubmitOutcome::Busy;
        }
        self.in_flight = Some(timestamp);
        self.submitted += 1;
        let reply = PoseReply {
            epoch: self.epoch,
            timestamp,
            tx: Some(self.tx.clone()),
        };
        self.engine.submit(frame, timestamp, reply);
        SubmitOutcome::Submitted
    }

    /// Take the newest reply of the current epoch, if any arrived since the last poll.
    pub fn poll(&mut self) -> Option<PoseResult> {
        let mut latest: Option<PoseResult> = None;
        while let Ok(d) = self.rx.try_recv() {
            if d.epoch != self.epoch {
                continue;
            }
            if self.in_flight == Some(d.result.timestamp) {
                self.in_flight = None;
            }
            if latest
                .as_ref()
                .is_none_or(|l| l.timestamp <= d.result.timestamp)
            {
                latest = Some(d.result);
            }
        }
        latest
    }

    /// Forget in-flight work and pending replies.
    pub fn reset(&mut self) {
        self.epoch += 1;
        self.in_flight = None;
        while self.rx.try_recv().is_ok() {}
    }

    /// Total submissions sent to the engine.
    pub fn submitted(&self) -> u64 {
        self.submitted
    }

    /// Frames skipped because a submission was still in flight.
    pub fn skipped_busy(&self) -> u64 {
        self.skipped_busy
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pose/provider.rs"]
mod tests;
