//! Pure step function: one command applied to one array snapshot.

use std::time::Duration;

use serde_json::Value;

use crate::foundation::error::{PlayError, PlayResult};
use crate::foundation::ids::{ElementId, IdAllocator};
use crate::model::array::{ArrayModel, Element};
use crate::model::command::Command;
use crate::playback::config::PlaybackConfig;

/// What a step did to the array, keyed by element identity.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum Change {
    /// Nothing changed (empty `pop`, or a skipped command).
    None,
    /// A new element was pushed.
    Appended {
        /// New element.
        id: ElementId,
    },
    /// The last element was popped.
    RemovedLast {
        /// Popped element.
        id: ElementId,
    },
    /// Element order was reversed.
    Reversed,
    /// Two elements exchanged positions.
    Swapped {
        /// Element that was at the first index.
        a: ElementId,
        /// Element that was at the second index.
        b: ElementId,
    },
    /// An element received a new value.
    Replaced {
        /// Updated element.
        id: ElementId,
    },
    /// An element was removed by value or by position.
    Removed {
        /// Removed element.
        id: ElementId,
    },
    /// A variable binding was recorded.
    VarSet {
        /// Variable name.
        name: String,
        /// Bound value.
        value: Value,
    },
    /// Every element was removed.
    Cleared,
}

/// Kind of an in-flight two-phase visual change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionKind {
    /// Element is mid-swap.
    Swap,
    /// Element is having its value replaced.
    Replace,
    /// Element is leaving the array.
    Remove,
}

/// Identity-keyed annotation consumed by a presentation layer for one step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct TransitionHint {
    /// Element the hint applies to.
    pub id: ElementId,
    /// Transition being animated.
    pub kind: TransitionKind,
}

impl Change {
    /// Transition hints a presentation layer should apply for this change.
    pub fn hints(&self) -> Vec<TransitionHint> {
        let hint = |id, kind| TransitionHint { id, kind };
        match self {
            Self::Swapped { a, b } => vec![
                hint(*a, TransitionKind::Swap),
                hint(*b, TransitionKind::Swap),
            ],
            Self::Replaced { id } => vec![hint(*id, TransitionKind::Replace)],
            Self::Removed { id } => vec![hint(*id, TransitionKind::Remove)],
            Self::None
            | Self::Appended { .. }
            | Self::RemovedLast { .. }
            | Self::Reversed
            | Self::VarSet { .. }
            | Self::Cleared => Vec::new(),
        }
    }
}

/// Result of interpreting one command.
#[derive(Debug)]
pub struct Step {
    /// Array after the command; equal to the input when `fault` is set.
    pub next: ArrayModel,
    /// What changed.
    pub change: Change,
    /// Pause before the next command, already scaled by the configured speed.
    pub delay: Duration,
    /// Why the command was skipped, if it was.
    pub fault: Option<PlayError>,
}

/// Apply `cmd` to `model`.
///
/// Only `append` touches `alloc`. Failures never propagate: the step comes back with the
/// unchanged model, [`Change::None`], and the error in `fault`.
#[tracing::instrument(level = "trace", skip_all, fields(kind = %cmd.kind()))]
pub fn step(
    model: &ArrayModel,
    cmd: &Command,
    alloc: &IdAllocator,
    config: &PlaybackConfig,
) -> Step {
    let kind = cmd.kind();
    match apply(model, cmd, alloc) {
        Ok((next, change)) => Step {
            next,
            change,
            delay: config.delay_for(kind, false),
            fault: None,
        },
        Err(fault) => Step {
            next: model.clone(),
            change: Change::None,
            delay: config.delay_for(kind, true),
            fault: Some(fault),
        },
    }
}

fn apply(
    model: &ArrayModel,
    cmd: &Command,
    alloc: &IdAllocator,
) -> PlayResult<(ArrayModel, Change)> {
    let slice = model.as_slice();
    match cmd {
        Command::Append { value } => {
            let elem = Element::fresh(alloc, value.clone());
            let id = elem.id;
            Ok((model.with_appended(elem), Change::Appended { id }))
        }
        Command::Pop { index: None } => {
            let (next, popped) = model.with_popped_last();
            let change = popped.map_or(Change::None, |e| Change::RemovedLast { id: e.id });
            Ok((next, change))
        }
        Command::Pop { index: Some(index) } => {
            let (next, removed) = model.with_removed_at("pop", *index)?;
            Ok((next, Change::Removed { id: removed.id }))
        }
        Command::Reverse => Ok((model.with_reversed(), Change::Reversed)),
        Command::Swap { indices: [i, j] } => {
            let next = model.with_swapped(*i, *j)?;
            let a = slice[model.checked_index("swap", *i)?].id;
            let b = slice[model.checked_index("swap", *j)?].id;
            Ok((next, Change::Swapped { a, b }))
        }
        Command::Replace { index, value } => {
            let at = model.checked_index("replace", *index)?;
            let next = model.with_replaced_at(*index, value.clone())?;
            Ok((next, Change::Replaced { id: slice[at].id }))
        }
        Command::Remove { value } => match model.with_removed_by_value(value) {
            (next, Some(id)) => Ok((next, Change::Removed { id })),
            (_, None) => Err(PlayError::not_found(value)),
        },
        Command::Delete { index } => {
            let (next, removed) = model.with_removed_at("delete", *index)?;
            Ok((next, Change::Removed { id: removed.id }))
        }
        Command::Clear => Ok((model.cleared(), Change::Cleared)),
        Command::Variable { name, value } => Ok((
            model.clone(),
            Change::VarSet {
                name: name.clone(),
                value: value.clone(),
            },
        )),
        Command::Unrecognized { kind, reason } => {
            Err(PlayError::unrecognized(kind.as_str(), reason.as_str()))
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playback/interpret.rs"]
mod tests;
