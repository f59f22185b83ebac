use crate::assets::garment::GarmentSelection;
use crate::config::{OverlayPersistence, SessionConfig};
use crate::foundation::core::{FrameRGBA, FrameTime};
use crate::foundation::error::{DrapeError, DrapeResult};
use crate::pose::landmark::PoseFrame;
use crate::pose::provider::{PoseAdapter, PoseEngine, SubmitOutcome};
use crate::render::compositor::{Compositor, Overlay};
use crate::render::sink::FrameSink;
use crate::scheduler::cancel::CancelToken;
use crate::scheduler::clock::RefreshClock;
use crate::scheduler::state::{SchedulerState, SessionState};
use crate::solver::placement::{Placement, solve_placement};
use crate::video::{FramePoll, VideoFrame, VideoSource};

/// What a tick did with pose analysis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Analysis {
    /// A new frame went to the pose engine.
    Submitted,
    /// A new frame arrived while a submission was in flight; rendered, not analyzed.
    Busy,
    /// The source repeated an already processed timestamp.
    Duplicate,
    /// The source had nothing new.
    NoFrame,
    /// The scheduler is not running; nothing was drawn.
    Halted,
}

/// Outcome of one [`FrameScheduler::tick`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickReport {
    /// Timestamp of the frame drawn this tick, if any.
    pub timestamp: Option<FrameTime>,
    /// What happened to pose analysis.
    pub analysis: Analysis,
    /// Placement of the garment drawn this tick.
    pub placement: Option<Placement>,
    /// The video source reported end of stream.
    pub source_ended: bool,
}

impl TickReport {
    fn halted() -> Self {
        Self {
            timestamp: None,
            analysis: Analysis::Halted,
            placement: None,
            source_ended: false,
        }
    }
}

/// Totals over the scheduler's lifetime.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Ticks run while running.
    pub ticks: u64,
    /// Surfaces handed to the sink.
    pub presented: u64,
    /// Frames sent to the pose engine.
    pub submitted: u64,
    /// New frames skipped because inference was in flight.
    pub busy: u64,
    /// Frames whose timestamp was already processed.
    pub duplicates: u64,
    /// Ticks that drew the garment.
    pub overlays: u64,
}

/// Drives the per-frame loop: dedup, pose submission, placement, composition.
///
/// All session mutation happens inside [`FrameScheduler::tick`], on the caller's thread. Pose
/// replies and garment loads that complete elsewhere are picked up at the start of the next tick.
pub struct FrameScheduler<V, S> {
    config: SessionConfig,
    state: SchedulerState,
    session: SessionState,
    video: V,
    pose: PoseAdapter,
    compositor: Compositor,
    sink: S,
    cancel: Option<CancelToken>,
    latest_frame: Option<VideoFrame>,
    latest_pose: Option<PoseFrame>,
    stats: RunStats,
}

impl<V, S> std::fmt::Debug for FrameScheduler<V, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameScheduler")
            .field("state", &self.state)
            .field("session", &self.session)
            .field("pose", &self.pose)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl<V: VideoSource, S: FrameSink> FrameScheduler<V, S> {
    /// Assemble a scheduler in `Idle`. Fails when `config` does not validate.
    pub fn new(
        config: SessionConfig,
        session: SessionState,
        video: V,
        engine: impl PoseEngine + 'static,
        sink: S,
    ) -> DrapeResult<Self> {
        config.validate()?;
        let compositor = Compositor::new(config.overlay.clear_rgba);
        Ok(Self {
            config,
            state: SchedulerState::Idle,
            session,
            video,
            pose: PoseAdapter::new(engine),
            compositor,
            sink,
            cancel: None,
            latest_frame: None,
            latest_pose: None,
            stats: RunStats::default(),
        })
    }

    /// Initialize the pose engine with the configured options. Required before [`Self::start`].
    pub fn initialize_engine(&mut self) -> DrapeResult<()> {
        self.pose.initialize(&self.config.engine)
    }

    /// Whether the pose engine is initialized.
    pub fn is_ready(&self) -> bool {
        self.pose.is_ready()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Session record.
    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// Mutable session record.
    pub fn session_mut(&mut self) -> &mut SessionState {
        &mut self.session
    }

    /// Push a garment selection from the host application.
    pub fn select_garment(&mut self, selection: GarmentSelection) -> bool {
        self.session.select_garment(selection)
    }

    /// Remove the garment; subsequent ticks draw no overlay.
    pub fn clear_garment(&mut self) {
        self.session.garment_mut().clear();
    }

    /// The video source.
    pub fn video(&self) -> &V {
        &self.video
    }

    /// Mutable video source.
    pub fn video_mut(&mut self) -> &mut V {
        &mut self.video
    }

    /// The output sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Consume the scheduler and keep its sink.
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// The last fully composed surface.
    pub fn front(&self) -> &FrameRGBA {
        self.compositor.front()
    }

    /// Counters since construction.
    pub fn stats(&self) -> RunStats {
        self.stats
    }

    /// Pose submission state.
    pub fn pose_adapter(&self) -> &PoseAdapter {
        &self.pose
    }

    /// Enter `Running`.
    ///
    /// Fails with [`DrapeError::NotReady`] before the pose engine is initialized and with the
    /// source's error (usually [`DrapeError::CameraUnavailable`]) when the video source cannot be
    /// opened. Either way the scheduler stays where it was. Starting while running returns the
    /// current token.
    #[tracing::instrument(skip(self), fields(state = ?self.state))]
    pub fn start(&mut self) -> DrapeResult<CancelToken> {
        if self.state == SchedulerState::Running
            && let Some(token) = &self.cancel
            && !token.is_cancelled()
        {
            return Ok(token.clone());
        }
        // Cancelled from outside but not yet observed by a tick.
        self.stop();
        if !self.pose.is_ready() {
            tracing::warn!("start requested before the pose engine is ready");
            return Err(DrapeError::not_ready("pose engine is not initialized"));
        }

        let previous = self.state;
        self.state = SchedulerState::Starting;
        let info = match self.video.open() {
            Ok(info) => info,
            Err(err) => {
                tracing::warn!(error = %err, "video source unavailable");
                self.state = previous;
                return Err(err);
            }
        };

        self.session.begin_run();
        self.pose.reset();
        self.latest_frame = None;
        self.latest_pose = None;
        let token = CancelToken::new();
        self.cancel = Some(token.clone());
        self.state = SchedulerState::Running;
        tracing::info!(
            width = info.canvas.width,
            height = info.canvas.height,
            fps = ?info.fps,
            "scheduler running"
        );
        Ok(token)
    }

    /// Leave `Running`: cancel the loop, release the video source, forget in-flight work.
    #[tracing::instrument(skip(self), fields(state = ?self.state))]
    pub fn stop(&mut self) {
        if !matches!(
            self.state,
            SchedulerState::Running | SchedulerState::Starting
        ) {
            return;
        }
        if let Some(token) = &self.cancel {
            token.cancel();
        }
        self.video.close();
        self.pose.reset();
        self.session.end_run();
        self.latest_frame = None;
        self.latest_pose = None;
        self.state = SchedulerState::Stopped;
        tracing::info!(ticks = self.stats.ticks, "scheduler stopped");
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_none_or(CancelToken::is_cancelled)
    }

    /// Run one refresh interval's worth of work.
    pub fn tick(&mut self) -> DrapeResult<TickReport> {
        if self.state != SchedulerState::Running {
            return Ok(TickReport::halted());
        }
        if self.is_cancelled() {
            self.stop();
            return Ok(TickReport::halted());
        }

        self.session.garment_mut().poll();
        if let Some(result) = self.pose.poll() {
            tracing::debug!(
                timestamp = result.timestamp.0,
                found = result.pose.is_some(),
                "pose result consumed"
            );
            self.latest_pose = result.pose;
        }

        let mut source_ended = false;
        let analysis = match self.video.next_frame() {
            FramePoll::Frame(frame) if self.session.accept_timestamp(frame.timestamp) => {
                let outcome = self.pose.try_submit(&frame, frame.timestamp);
                self.latest_frame = Some(frame);
                match outcome {
                    SubmitOutcome::Submitted => Analysis::Submitted,
                    SubmitOutcome::Busy | SubmitOutcome::NotReady => Analysis::Busy,
                }
            }
            FramePoll::Frame(frame) => {
                tracing::debug!(timestamp = frame.timestamp.0, "duplicate frame timestamp");
                if self.latest_frame.is_none() {
                    self.latest_frame = Some(frame);
                }
                Analysis::Duplicate
            }
            FramePoll::Pending => Analysis::NoFrame,
            FramePoll::Ended => {
                source_ended = true;
                Analysis::NoFrame
            }
        };

        let fresh = matches!(analysis, Analysis::Submitted | Analysis::Busy);
        let draw_overlay =
            fresh || self.config.overlay.persistence == OverlayPersistence::HoldLast;

        self.stats.ticks += 1;
        match analysis {
            Analysis::Submitted => self.stats.submitted += 1,
            Analysis::Busy => self.stats.busy += 1,
            Analysis::Duplicate => self.stats.duplicates += 1,
            Analysis::NoFrame | Analysis::Halted => {}
        }

        let Some(frame) = self.latest_frame.as_ref() else {
            return Ok(TickReport {
                timestamp: None,
                analysis,
                placement: None,
                source_ended,
            });
        };

        let garment = self.session.garment().current();
        let placement = match (draw_overlay, garment, self.latest_pose.as_ref()) {
            (true, Some(g), Some(pose)) => {
                solve_placement(pose, g.aspect_ratio(), frame.canvas(), &self.config.solver)
            }
            _ => None,
        };
        let overlay = match (garment, placement) {
            (Some(g), Some(p)) => Some(Overlay {
                garment: g.as_ref(),
                placement: p,
            }),
            _ => None,
        };

        let timestamp = frame.timestamp;
        let drawn_before = self.compositor.stats().overlays_drawn;
        let surface = self.compositor.compose(&frame.image, overlay)?;
        self.sink.present(timestamp, surface)?;
        self.stats.presented += 1;
        self.stats.overlays += self.compositor.stats().overlays_drawn - drawn_before;

        Ok(TickReport {
            timestamp: Some(timestamp),
            analysis,
            placement,
            source_ended,
        })
    }

    /// Tick once per refresh until cancelled or the source ends, then stop.
    ///
    /// The token is checked after every wait, so a cancel issued from another thread takes
    /// effect before the next tick fires.
    pub fn run(&mut self, clock: &mut dyn RefreshClock) -> DrapeResult<RunStats> {
        if self.state != SchedulerState::Running {
            return Err(DrapeError::not_ready("scheduler is not running"));
        }
        loop {
            if self.is_cancelled() || self.state != SchedulerState::Running {
                break;
            }
            clock.wait_next();
            if self.is_cancelled() {
                break;
            }
            let report = match self.tick() {
                Ok(r) => r,
                Err(err) => {
                    self.stop();
                    return Err(err);
                }
            };
            if report.source_ended {
                tracing::debug!("video source ended");
                break;
            }
        }
        self.stop();
        Ok(self.stats)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scheduler/driver.rs"]
mod tests;
