//! timewarp-core: point-in-time reconstruction of task state.
//!
//! Given an append-only log of field-level change events and the current task
//! roster, rebuild what every task looked like at any past moment, and scrub
//! through that history with deterministic playback.
//!
//! Data flows one way:
//!
//! ```text
//! EventLog + Roster ─▶ TimelineIndex ─(position)─▶ replay ─▶ Snapshot ─▶ SnapshotView
//!                                          ▲
//!                         PlaybackController (position only)
//! ```
//!
//! # Conventions
//!
//! - **Errors**: reconstruction is infallible. Loading inputs returns typed
//!   [`feed::FeedError`]s; configuration uses `anyhow::Result`.
//! - **Logging**: `tracing` macros only; subscribers are installed by the
//!   binary.

pub mod baseline;
pub mod config;
pub mod error;
pub mod event;
pub mod feed;
pub mod machine;
pub mod model;
pub mod playback;
pub mod replay;
pub mod timeline;
pub mod view;

pub use baseline::{Baseline, DefaultBaseline, RecordedBaseline};
pub use event::{Event, EventLog, FieldName};
pub use machine::TimeMachine;
pub use model::{Roster, Task, TaskId, TaskState};
pub use playback::{PlaybackController, PlaybackState, TickOutcome};
pub use replay::{Snapshot, reconstruct};
pub use timeline::TimelineIndex;
pub use view::{SnapshotView, StatusBucket, StatusCounts};
