//! Immutable status stack maps.

use std::collections::BTreeMap;

use super::StatusId;

/// Stack counts held by one combatant, keyed by status id.
///
/// Absence means zero: a count of zero is never stored. Every present value
/// lies in `[1, max_stacks]` of its definition. The map is never mutated
/// through the public API; [`StatusRuntime`](super::StatusRuntime) operations
/// return a rebuilt copy, so earlier snapshots stay valid.
///
/// Deserialized maps go through [`From<BTreeMap>`](#impl-From), which drops
/// zero counts. Maxima depend on the registry, so a loaded snapshot is
/// brought under each definition's cap with
/// [`StatusRuntime::normalize_stacks`](super::StatusRuntime::normalize_stacks).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(from = "BTreeMap<StatusId, u32>", into = "BTreeMap<StatusId, u32>")
)]
pub struct StatusStacks {
    entries: BTreeMap<StatusId, u32>,
}

impl StatusStacks {
    /// Creates an empty stack map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the stack count for `id`, zero when absent.
    pub fn get(&self, id: &str) -> u32 {
        self.entries.get(id).copied().unwrap_or(0)
    }

    /// Returns true if at least one stack of `id` is held.
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Iterates present statuses in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&StatusId, u32)> + '_ {
        self.entries.iter().map(|(id, count)| (id, *count))
    }

    /// Number of distinct statuses held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy of this map with `id` set to `count`; zero removes the key.
    pub(crate) fn with_count(&self, id: &StatusId, count: u32) -> Self {
        let mut entries = self.entries.clone();
        if count == 0 {
            entries.remove(id.as_str());
        } else {
            entries.insert(id.clone(), count);
        }
        Self { entries }
    }
}

impl From<BTreeMap<StatusId, u32>> for StatusStacks {
    fn from(mut entries: BTreeMap<StatusId, u32>) -> Self {
        entries.retain(|_, count| *count > 0);
        Self { entries }
    }
}

impl From<StatusStacks> for BTreeMap<StatusId, u32> {
    fn from(stacks: StatusStacks) -> Self {
        stacks.entries
    }
}
