use std::sync::atomic::{AtomicU64, Ordering};

/// Stable identity of one logical array element.
///
/// Issued once when the element comes into existence and never reused within the process, so a
/// presentation layer can key animations on it instead of on the element's current position.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct ElementId(pub u64);

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// Shared by every allocator so ids stay unique across engines.
static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Issues process-unique [`ElementId`]s from a monotonically increasing counter.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdAllocator;

impl IdAllocator {
    /// Create an allocator handle.
    pub fn new() -> Self {
        Self
    }

    /// Issue a fresh identity.
    pub fn allocate(&self) -> ElementId {
        ElementId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/ids.rs"]
mod tests;
