use std::path::Path;
use std::time::Duration;

use crate::foundation::error::{PlayError, PlayResult};
use crate::model::command::CommandKind;

const MAX_DELAY_MS: u64 = 60_000;

/// Per-kind pause after each step, in milliseconds.
///
/// Swap, replace, remove and delete get a longer window so a presentation layer can highlight the
/// affected elements before the structural change settles.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Timing {
    /// `append`
    pub append_ms: u64,
    /// `pop`
    pub pop_ms: u64,
    /// `reverse`
    pub reverse_ms: u64,
    /// `swap`
    pub swap_ms: u64,
    /// `replace`
    pub replace_ms: u64,
    /// `remove`
    pub remove_ms: u64,
    /// `delete`
    pub delete_ms: u64,
    /// `clear`
    pub clear_ms: u64,
    /// `variable`
    pub variable_ms: u64,
    /// Steps that were skipped because of a bounds, lookup or decode failure.
    pub skipped_ms: u64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            append_ms: 400,
            pop_ms: 400,
            reverse_ms: 400,
            swap_ms: 1000,
            replace_ms: 800,
            remove_ms: 1000,
            delete_ms: 800,
            clear_ms: 400,
            variable_ms: 400,
            skipped_ms: 400,
        }
    }
}

impl Timing {
    /// Base delay for a step of `kind`; `skipped` selects the failure delay.
    pub fn delay_for(&self, kind: CommandKind, skipped: bool) -> Duration {
        if skipped {
            return Duration::from_millis(self.skipped_ms);
        }
        let ms = match kind {
            CommandKind::Append => self.append_ms,
            CommandKind::Pop => self.pop_ms,
            CommandKind::Reverse => self.reverse_ms,
            CommandKind::Swap => self.swap_ms,
            CommandKind::Replace => self.replace_ms,
            CommandKind::Remove => self.remove_ms,
            CommandKind::Delete => self.delete_ms,
            CommandKind::Clear => self.clear_ms,
            CommandKind::Variable => self.variable_ms,
            CommandKind::Unrecognized => self.skipped_ms,
        };
        Duration::from_millis(ms)
    }

    fn entries(&self) -> [(&'static str, u64); 10] {
        [
            ("append_ms", self.append_ms),
            ("pop_ms", self.pop_ms),
            ("reverse_ms", self.reverse_ms),
            ("swap_ms", self.swap_ms),
            ("replace_ms", self.replace_ms),
            ("remove_ms", self.remove_ms),
            ("delete_ms", self.delete_ms),
            ("clear_ms", self.clear_ms),
            ("variable_ms", self.variable_ms),
            ("skipped_ms", self.skipped_ms),
        ]
    }
}

/// Engine configuration, usually loaded from a JSON file.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Per-kind delays.
    pub timing: Timing,
    /// Playback rate; 2.0 halves every delay.
    pub speed: f64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            timing: Timing::default(),
            speed: 1.0,
        }
    }
}

impl PlaybackConfig {
    /// Parse and validate a configuration from JSON text.
    pub fn from_json_str(s: &str) -> PlayResult<Self> {
        let cfg: Self = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read, parse and validate a configuration file.
    pub fn from_path(path: &Path) -> PlayResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            PlayError::Other(
                anyhow::Error::new(e).context(format!("read config '{}'", path.display())),
            )
        })?;
        Self::from_json_str(&text)
    }

    /// Check value ranges.
    pub fn validate(&self) -> PlayResult<()> {
        if !self.speed.is_finite() || self.speed <= 0.0 {
            return Err(PlayError::config(format!(
                "speed must be finite and > 0, got {}",
                self.speed
            )));
        }
        for (name, ms) in self.timing.entries() {
            if ms > MAX_DELAY_MS {
                return Err(PlayError::config(format!(
                    "timing.{name} must be <= {MAX_DELAY_MS}, got {ms}"
                )));
            }
        }
        Ok(())
    }

    /// Speed-scaled delay for one step.
    pub fn delay_for(&self, kind: CommandKind, skipped: bool) -> Duration {
        let base = self.timing.delay_for(kind, skipped);
        let nanos = (base.as_nanos() as f64 / self.speed).round();
        Duration::from_nanos(nanos as u64)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playback/config.rs"]
mod tests;
