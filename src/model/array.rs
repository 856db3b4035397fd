use std::sync::Arc;

use serde_json::Value;

use crate::foundation::error::{PlayError, PlayResult};
use crate::foundation::ids::{ElementId, IdAllocator};

/// One logical array slot: a stable identity plus its current payload.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Element {
    /// Identity issued when the slot was created.
    pub id: ElementId,
    /// Current payload.
    pub value: Value,
}

impl Element {
    /// Create an element with a freshly allocated identity.
    pub fn fresh(alloc: &IdAllocator, value: Value) -> Self {
        Self {
            id: alloc.allocate(),
            value,
        }
    }
}

/// Immutable, ordered snapshot of the array being visualized.
///
/// Every `with_*` operation returns a new model and leaves `self` untouched, so snapshots handed
/// to a presentation layer can be compared across renders. Cloning shares the underlying storage.
///
/// Invariant: ids are unique within a model. Positions are never stored on elements.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct ArrayModel {
    elems: Arc<[Element]>,
}

impl ArrayModel {
    /// Empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a model from raw values, assigning each a fresh identity.
    pub fn from_values(alloc: &IdAllocator, values: impl IntoIterator<Item = Value>) -> Self {
        values
            .into_iter()
            .map(|v| Element::fresh(alloc, v))
            .collect::<Vec<_>>()
            .into()
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.elems.len()
    }

    /// Whether the model holds no elements.
    pub fn is_empty(&self) -> bool {
        self.elems.is_empty()
    }

    /// Element at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&Element> {
        self.elems.get(index)
    }

    /// Elements in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Element> {
        self.elems.iter()
    }

    /// Elements as a slice.
    pub fn as_slice(&self) -> &[Element] {
        &self.elems
    }

    /// Payloads in order, without identities.
    pub fn values(&self) -> Vec<Value> {
        self.elems.iter().map(|e| e.value.clone()).collect()
    }

    /// Identities in order.
    pub fn ids(&self) -> Vec<ElementId> {
        self.elems.iter().map(|e| e.id).collect()
    }

    /// Position of the element with identity `id`.
    pub fn position_of(&self, id: ElementId) -> Option<usize> {
        self.elems.iter().position(|e| e.id == id)
    }

    /// Add `elem` at the end.
    pub fn with_appended(&self, elem: Element) -> Self {
        let mut next = self.elems.to_vec();
        next.push(elem);
        next.into()
    }

    /// Drop the last element. An empty model is returned unchanged with `None`.
    pub fn with_popped_last(&self) -> (Self, Option<Element>) {
        let Some((last, rest)) = self.elems.split_last() else {
            return (self.clone(), None);
        };
        (rest.to_vec().into(), Some(last.clone()))
    }

    /// Reverse element order.
    pub fn with_reversed(&self) -> Self {
        let mut next = self.elems.to_vec();
        next.reverse();
        next.into()
    }

    /// Exchange the elements at `i` and `j`; both keep their identity and value.
    pub fn with_swapped(&self, i: i64, j: i64) -> PlayResult<Self> {
        let a = self.checked_index("swap", i)?;
        let b = self.checked_index("swap", j)?;
        if a == b {
            return Err(PlayError::SameIndex { index: i });
        }
        let mut next = self.elems.to_vec();
        next.swap(a, b);
        Ok(next.into())
    }

    /// Overwrite the payload at `index`, keeping the slot's identity.
    pub fn with_replaced_at(&self, index: i64, value: Value) -> PlayResult<Self> {
        let at = self.checked_index("replace", index)?;
        let mut next = self.elems.to_vec();
        next[at].value = value;
        Ok(next.into())
    }

    /// Whether the payloads, in order, equal `expected` under [`values_equal`].
    pub fn values_match(&self, expected: &[Value]) -> bool {
        self.elems.len() == expected.len()
            && self
                .elems
                .iter()
                .zip(expected)
                .all(|(e, v)| values_equal(&e.value, v))
    }

    /// Remove the first element whose value equals `value` under [`values_equal`].
    ///
    /// No match returns an unchanged model and `None`; callers report that as a lookup failure.
    pub fn with_removed_by_value(&self, value: &Value) -> (Self, Option<ElementId>) {
        let Some(at) = self.elems.iter().position(|e| values_equal(&e.value, value)) else {
            return (self.clone(), None);
        };
        let mut next = self.elems.to_vec();
        let removed = next.remove(at);
        (next.into(), Some(removed.id))
    }

    /// Remove the element at `index`. `op` names the command for error reporting.
    pub fn with_removed_at(&self, op: &'static str, index: i64) -> PlayResult<(Self, Element)> {
        let at = self.checked_index(op, index)?;
        let mut next = self.elems.to_vec();
        let removed = next.remove(at);
        Ok((next.into(), removed))
    }

    /// Remove every element.
    pub fn cleared(&self) -> Self {
        Self::new()
    }

    /// Convert a wire index into a position, or an [`PlayError::Index`] naming `op`.
    pub fn checked_index(&self, op: &'static str, index: i64) -> PlayResult<usize> {
        usize::try_from(index)
            .ok()
            .filter(|&i| i < self.elems.len())
            .ok_or_else(|| PlayError::index(op, index, self.elems.len()))
    }
}

/// Structural equality on payloads where numbers compare by magnitude, so `2` equals `2.0`.
///
/// Integers of the same sign class compare exactly; mixed or fractional numbers compare as `f64`.
/// Arrays and objects recurse element-wise.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            if let (Some(x), Some(y)) = (x.as_i64(), y.as_i64()) {
                return x == y;
            }
            if let (Some(x), Some(y)) = (x.as_u64(), y.as_u64()) {
                return x == y;
            }
            match (x.as_f64(), y.as_f64()) {
                (Some(x), Some(y)) => x == y,
                _ => false,
            }
        }
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).is_some_and(|y| values_equal(x, y)))
        }
        _ => a == b,
    }
}

impl From<Vec<Element>> for ArrayModel {
    fn from(elems: Vec<Element>) -> Self {
        Self {
            elems: elems.into(),
        }
    }
}

impl<'a> IntoIterator for &'a ArrayModel {
    type Item = &'a Element;
    type IntoIter = std::slice::Iter<'a, Element>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl serde::Serialize for ArrayModel {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.elems.iter())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/array.rs"]
mod tests;
