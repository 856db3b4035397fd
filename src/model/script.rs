use std::path::Path;

use serde_json::Value;

use crate::foundation::error::{PlayError, PlayResult};
use crate::model::command::Command;

/// Payload produced by the external code interpreter.
///
/// Field names follow the interpreter's JSON response: `initial_arr`, `manipulations`, an
/// optional `lines` list paired by position with `manipulations`, and an optional `final_arr`
/// holding the array obtained by actually executing the code.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Script {
    /// Values of the array before the first command.
    #[serde(rename = "initial_arr", default)]
    pub initial: Vec<Value>,
    /// Commands in execution order.
    #[serde(rename = "manipulations", default)]
    pub commands: Vec<Command>,
    /// Source line per command; shorter lists disable highlighting for the tail.
    #[serde(default)]
    pub lines: Vec<u32>,
    /// Expected final array, when the interpreter reported one.
    #[serde(rename = "final_arr", default, skip_serializing_if = "Option::is_none")]
    pub expected_final: Option<Value>,
}

impl Script {
    /// Script with no line information and no expected result.
    pub fn new(initial: Vec<Value>, commands: Vec<Command>) -> Self {
        Self {
            initial,
            commands,
            ..Self::default()
        }
    }

    /// Attach source lines.
    pub fn with_lines(mut self, lines: Vec<u32>) -> Self {
        self.lines = lines;
        self
    }

    /// Parse a script from JSON text.
    pub fn from_json_str(s: &str) -> PlayResult<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Read and parse a script file.
    pub fn from_path(path: &Path) -> PlayResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            PlayError::Other(anyhow::Error::new(e).context(format!(
                "read script '{}'",
                path.display()
            )))
        })?;
        Self::from_json_str(&text)
    }

    /// Commands, lines and expected result, without the initial array.
    pub fn playlist(&self) -> Playlist {
        Playlist {
            commands: self.commands.clone(),
            lines: self.lines.clone(),
            expected_final: self.expected_final.as_ref().and_then(|v| v.as_array().cloned()),
        }
    }
}

/// What one playback run consumes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Playlist {
    /// Commands in execution order.
    pub commands: Vec<Command>,
    /// Source line per command.
    pub lines: Vec<u32>,
    /// Values the array should hold once the run ends.
    pub expected_final: Option<Vec<Value>>,
}

impl Playlist {
    /// Playlist with line highlighting.
    pub fn new(commands: Vec<Command>, lines: Vec<u32>) -> Self {
        Self {
            commands,
            lines,
            expected_final: None,
        }
    }

    /// Line paired with the command at `step`.
    pub fn line_at(&self, step: usize) -> Option<u32> {
        self.lines.get(step).copied()
    }
}

impl From<Vec<Command>> for Playlist {
    fn from(commands: Vec<Command>) -> Self {
        Self::new(commands, Vec::new())
    }
}

impl From<&Script> for Playlist {
    fn from(script: &Script) -> Self {
        script.playlist()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/script.rs"]
mod tests;
