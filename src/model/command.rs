use serde_json::Value;

/// One instruction from the external interpreter.
///
/// Decoding never fails: entries with an unknown `type` or a payload of the wrong shape become
/// [`Command::Unrecognized`], which the interpreter reports and skips.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Command {
    /// Push `value` as a new element.
    Append {
        /// Payload of the new element.
        value: Value,
    },
    /// Drop the last element, or the element at `index` when given.
    Pop {
        /// Optional position to pop from.
        #[serde(skip_serializing_if = "Option::is_none")]
        index: Option<i64>,
    },
    /// Reverse the array in place.
    Reverse,
    /// Exchange two positions.
    Swap {
        /// The two positions to exchange.
        indices: [i64; 2],
    },
    /// Overwrite the payload at `index`.
    Replace {
        /// Position to overwrite.
        index: i64,
        /// New payload.
        value: Value,
    },
    /// Remove the first element equal to `value`.
    Remove {
        /// Payload to search for.
        value: Value,
    },
    /// Remove the element at `index`.
    Delete {
        /// Position to remove.
        index: i64,
    },
    /// Remove every element.
    Clear,
    /// Record a variable binding.
    Variable {
        /// Variable name.
        name: String,
        /// Bound value.
        value: Value,
    },
    /// An entry that could not be decoded.
    Unrecognized {
        /// The `type` tag as received, or `<missing>`.
        kind: String,
        /// Decoder message.
        reason: String,
    },
}

/// Discriminant of a [`Command`], used for timing lookups and reporting.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum CommandKind {
    /// [`Command::Append`]
    Append,
    /// [`Command::Pop`]
    Pop,
    /// [`Command::Reverse`]
    Reverse,
    /// [`Command::Swap`]
    Swap,
    /// [`Command::Replace`]
    Replace,
    /// [`Command::Remove`]
    Remove,
    /// [`Command::Delete`]
    Delete,
    /// [`Command::Clear`]
    Clear,
    /// [`Command::Variable`]
    Variable,
    /// [`Command::Unrecognized`]
    Unrecognized,
}

impl CommandKind {
    /// Lowercase wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Append => "append",
            Self::Pop => "pop",
            Self::Reverse => "reverse",
            Self::Swap => "swap",
            Self::Replace => "replace",
            Self::Remove => "remove",
            Self::Delete => "delete",
            Self::Clear => "clear",
            Self::Variable => "variable",
            Self::Unrecognized => "unrecognized",
        }
    }
}

impl std::fmt::Display for CommandKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// Strict wire shape; anything it rejects is demoted to `Command::Unrecognized`.
#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum WireCommand {
    Append {
        value: Value,
    },
    Pop {
        #[serde(default)]
        index: Option<i64>,
    },
    Reverse,
    Swap {
        indices: [i64; 2],
    },
    Replace {
        index: i64,
        value: Value,
    },
    Remove {
        value: Value,
    },
    Delete {
        index: i64,
    },
    Clear,
    Variable {
        name: String,
        value: Value,
    },
}

impl From<WireCommand> for Command {
    fn from(w: WireCommand) -> Self {
        match w {
            WireCommand::Append { value } => Self::Append { value },
            WireCommand::Pop { index } => Self::Pop { index },
            WireCommand::Reverse => Self::Reverse,
            WireCommand::Swap { indices } => Self::Swap { indices },
            WireCommand::Replace { index, value } => Self::Replace { index, value },
            WireCommand::Remove { value } => Self::Remove { value },
            WireCommand::Delete { index } => Self::Delete { index },
            WireCommand::Clear => Self::Clear,
            WireCommand::Variable { name, value } => Self::Variable { name, value },
        }
    }
}

impl Command {
    /// Decode one wire entry, demoting malformed entries to [`Command::Unrecognized`].
    pub fn decode(raw: Value) -> Self {
        let kind = raw
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or("<missing>")
            .to_owned();
        match serde_json::from_value::<WireCommand>(raw) {
            Ok(w) => w.into(),
            Err(err) => Self::Unrecognized {
                kind,
                reason: err.to_string(),
            },
        }
    }

    /// `append(value)`
    pub fn append(value: impl Into<Value>) -> Self {
        Self::Append {
            value: value.into(),
        }
    }

    /// `pop()`
    pub fn pop() -> Self {
        Self::Pop { index: None }
    }

    /// `pop(index)`
    pub fn pop_at(index: i64) -> Self {
        Self::Pop { index: Some(index) }
    }

    /// `swap(i, j)`
    pub fn swap(i: i64, j: i64) -> Self {
        Self::Swap { indices: [i, j] }
    }

    /// `replace(index, value)`
    pub fn replace(index: i64, value: impl Into<Value>) -> Self {
        Self::Replace {
            index,
            value: value.into(),
        }
    }

    /// `remove(value)`
    pub fn remove(value: impl Into<Value>) -> Self {
        Self::Remove {
            value: value.into(),
        }
    }

    /// `delete(index)`
    pub fn delete(index: i64) -> Self {
        Self::Delete { index }
    }

    /// `variable(name, value)`
    pub fn variable(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Variable {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Discriminant of this command.
    pub fn kind(&self) -> CommandKind {
        match self {
            Self::Append { .. } => CommandKind::Append,
            Self::Pop { .. } => CommandKind::Pop,
            Self::Reverse => CommandKind::Reverse,
            Self::Swap { .. } => CommandKind::Swap,
            Self::Replace { .. } => CommandKind::Replace,
            Self::Remove { .. } => CommandKind::Remove,
            Self::Delete { .. } => CommandKind::Delete,
            Self::Clear => CommandKind::Clear,
            Self::Variable { .. } => CommandKind::Variable,
            Self::Unrecognized { .. } => CommandKind::Unrecognized,
        }
    }
}

impl<'de> serde::Deserialize<'de> for Command {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::decode)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/command.rs"]
mod tests;
