//! Drape composites a garment image over a person in a live video stream.
//!
//! The pipeline is driven by a [`FrameScheduler`]:
//!
//! - a [`VideoSource`] supplies timestamped frames,
//! - a [`PoseEngine`] (behind a [`PoseAdapter`]) estimates body landmarks asynchronously,
//! - [`solve_placement`] maps shoulders and hips to a garment rectangle,
//! - the [`Compositor`] draws frame + garment and presents the result to a [`FrameSink`].
//!
//! The garment itself is loaded by a [`GarmentCache`] whenever the host application changes the
//! selection.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod foundation;

pub(crate) mod pose;
pub(crate) mod render;
pub(crate) mod scheduler;
pub(crate) mod solver;
pub(crate) mod video;

pub mod config;

pub use crate::foundation::core::{Canvas, FrameRGBA, FrameTime, Point, Rect, Size};
pub use crate::foundation::error::{DrapeError, DrapeResult};

pub use crate::assets::decode::decode_image;
pub use crate::assets::garment::{
    GarmentAsset, GarmentCache, GarmentLoader, GarmentSelection, InlineLoader, LoadOutcome,
    LoadRequest, LoadState, ThreadLoader,
};
pub use crate::assets::source::{FsGarmentSource, GarmentSource, MemoryGarmentSource};
pub use crate::config::{
    Delegate, OverlayConfig, OverlayPersistence, PoseEngineConfig, RunningMode, SessionConfig,
    SolverParams, VideoConfig,
};
pub use crate::pose::landmark::{BodyLandmark, Landmark, PoseFrame};
pub use crate::pose::provider::{PoseAdapter, PoseEngine, PoseReply, PoseResult, SubmitOutcome};
pub use crate::pose::replay::{PoseTrack, ReplayEngine};
pub use crate::render::compositor::{Compositor, CompositorStats, Overlay};
pub use crate::render::sink::{FrameSink, InMemorySink, PngSequenceSink};
pub use crate::scheduler::cancel::CancelToken;
pub use crate::scheduler::clock::{ImmediateClock, IntervalClock, RefreshClock};
pub use crate::scheduler::driver::{Analysis, FrameScheduler, RunStats, TickReport};
pub use crate::scheduler::state::{SchedulerState, SessionState};
pub use crate::solver::placement::{Placement, TorsoMetrics, solve_placement, torso_metrics};
pub use crate::video::{
    FramePoll, ImageSequenceSource, MemorySource, VideoFrame, VideoInfo, VideoSource,
};
