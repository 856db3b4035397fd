//! `arrayplay` replays the array mutations recorded from a user's program as an animated,
//! identity-stable sequence of snapshots.
//!
//! An external interpreter turns source code into a [`Script`]: an initial array, a list of
//! [`Command`]s and the source line that produced each one. The [`Engine`] plays that script one
//! step at a time:
//!
//! 1. **Identify**: every element gets an [`ElementId`] when it is created (initial load or
//!    `append`) and keeps it across swaps, reversals and value replacement.
//! 2. **Interpret**: [`step`] applies one command to an immutable [`ArrayModel`] and describes the
//!    [`Change`] in terms of identities, never positions.
//! 3. **Publish**: the engine stores the new snapshot, the active line, the variable table and
//!    the step's [`TransitionHint`]s, and notifies subscribers with a [`PlaybackEvent`].
//! 4. **Pace**: the [`Pacer`] waits out the per-kind delay from [`PlaybackConfig`] before the
//!    next step.
//!
//! Invalid commands (out-of-range indices, missing values, undecodable entries) are skipped and
//! reported as [`StepWarning`]s; a run always drains to completion.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;
mod model;
mod playback;

pub use foundation::error::{PlayError, PlayResult};
pub use foundation::ids::{ElementId, IdAllocator};
pub use model::array::{ArrayModel, Element, values_equal};
pub use model::command::{Command, CommandKind};
pub use model::script::{Playlist, Script};
pub use playback::config::{PlaybackConfig, Timing};
pub use playback::engine::{Engine, RunHandle, StartOutcome};
pub use playback::events::{
    PlaybackEvent, PlaybackView, RunReport, RunState, StepFrame, StepWarning,
};
pub use playback::interpret::{Change, Step, TransitionHint, TransitionKind, step};
pub use playback::pacer::{NoPause, Pacer, ThreadPacer};
