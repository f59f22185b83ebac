use crate::assets::garment::{GarmentCache, GarmentSelection};
use crate::foundation::core::FrameTime;

/// Scheduler lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchedulerState {
    /// Constructed, never started.
    Idle,
    /// Acquiring the video source; only observable from inside `start`.
    Starting,
    /// Ticks analyze and draw frames.
    Running,
    /// Stopped; may be started again.
    Stopped,
}

/// The only mutable session record. Owned by the scheduler; never shared across threads.
#[derive(Debug)]
pub struct SessionState {
    running: bool,
    last_processed: Option<FrameTime>,
    garment: GarmentCache,
}

impl SessionState {
    /// A stopped session around `garment`.
    pub fn new(garment: GarmentCache) -> Self {
        Self {
            running: false,
            last_processed: None,
            garment,
        }
    }

    /// Whether the scheduler is running.
    pub fn running(&self) -> bool {
        self.running
    }

    /// Timestamp of the newest frame analyzed this run; `None` until the first one.
    pub fn last_processed(&self) -> Option<FrameTime> {
        self.last_processed
    }

    /// The garment cache.
    pub fn garment(&self) -> &GarmentCache {
        &self.garment
    }

    /// Mutable garment cache.
    pub fn garment_mut(&mut self) -> &mut GarmentCache {
        &mut self.garment
    }

    /// Forward a selection change to the garment cache.
    pub fn select_garment(&mut self, selection: GarmentSelection) -> bool {
        self.garment.select(selection)
    }

    /// Record `ts` as processed if it is strictly newer than anything seen this run.
    pub(crate) fn accept_timestamp(&mut self, ts: FrameTime) -> bool {
        if self.last_processed.is_some_and(|last| ts <= last) {
            return false;
        }
        self.last_processed = Some(ts);
        true
    }

    pub(crate) fn begin_run(&mut self) {
        self.running = true;
        self.last_processed = None;
    }

    pub(crate) fn end_run(&mut self) {
        self.running = false;
    }
}
