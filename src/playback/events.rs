use std::collections::BTreeMap;

use serde_json::Value;

use crate::model::array::ArrayModel;
use crate::model::command::{Command, CommandKind};
use crate::playback::interpret::{Change, TransitionHint};

/// Whether a run is in progress.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    /// No run in progress; `start` will be accepted.
    #[default]
    Idle,
    /// A run is draining; `start` is rejected.
    Running,
}

/// Everything a presentation layer needs to draw the current moment.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct PlaybackView {
    /// Array snapshot, in order.
    pub elements: ArrayModel,
    /// Source line of the step being shown.
    pub active_line: Option<u32>,
    /// Variable bindings recorded so far in this run.
    pub variables: BTreeMap<String, Value>,
    /// Elements under a two-phase transition for the current step.
    pub transitions: Vec<TransitionHint>,
    /// Whether a run is in progress.
    pub running: bool,
}

/// A step that was skipped.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct StepWarning {
    /// Position in the command list.
    pub step: usize,
    /// Paired source line.
    pub line: Option<u32>,
    /// Kind of the skipped command.
    pub kind: CommandKind,
    /// `bounds`, `lookup` or `malformed`.
    pub category: &'static str,
    /// User-facing message.
    pub message: String,
}

impl std::fmt::Display for StepWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "step {}", self.step)?;
        if let Some(line) = self.line {
            write!(f, " (line {line})")?;
        }
        write!(f, " skipped: {}", self.message)
    }
}

/// One published playback step.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct StepFrame {
    /// Position in the command list.
    pub step: usize,
    /// Command that was interpreted.
    pub command: Command,
    /// What it changed.
    pub change: Change,
    /// Pause taken after this frame, in milliseconds.
    pub delay_ms: u64,
    /// Set when the command was skipped.
    pub warning: Option<StepWarning>,
    /// State after the command.
    pub view: PlaybackView,
}

/// Summary of a completed run.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct RunReport {
    /// Commands consumed.
    pub steps: usize,
    /// Skipped commands, in order.
    pub warnings: Vec<StepWarning>,
    /// Array after the last command.
    pub elements: ArrayModel,
    /// Variable bindings at the end of the run.
    pub variables: BTreeMap<String, Value>,
    /// Whether the final values match the interpreter's reported result, when it sent one.
    pub final_matches_expected: Option<bool>,
}

/// Notifications delivered to [`crate::Engine::subscribe`] receivers, in order.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PlaybackEvent {
    /// A run was accepted.
    RunStarted {
        /// Number of commands queued.
        total: usize,
        /// State at the start of the run.
        view: PlaybackView,
    },
    /// A command was interpreted.
    Step(StepFrame),
    /// The run drained and the engine is idle again.
    Finished(RunReport),
}
