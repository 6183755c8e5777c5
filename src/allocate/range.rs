use crate::constants::SLOT_SIZE;
use alloy_primitives::{B256, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A byte position in storage: slot index plus byte offset inside the slot.
///
/// Offset 0 is the least significant end of the slot word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SlotAddress {
    pub slot: U256,
    pub offset: usize,
}

impl SlotAddress {
    pub const fn new(slot: U256, offset: usize) -> Self {
        Self { slot, offset }
    }
}

impl fmt::Display for SlotAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.slot, self.offset)
    }
}

/// Half-open storage interval `[from, to)` holding one elementary value.
///
/// `to.offset` is in `1..=32`; a value that fills the rest of its slot ends
/// at offset 32 of that same slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StorageRange {
    pub from: SlotAddress,
    pub to: SlotAddress,
}

impl StorageRange {
    /// Number of bytes covered by the range.
    pub fn len(&self) -> U256 {
        (self.to.slot - self.from.slot) * U256::from(SLOT_SIZE) + U256::from(self.to.offset)
            - U256::from(self.from.offset)
    }

    pub fn is_empty(&self) -> bool {
        self.from == self.to
    }

    /// Number of slots the range touches.
    pub fn slot_count(&self) -> U256 {
        if self.is_empty() {
            return U256::ZERO;
        }
        self.to.slot - self.from.slot + U256::from(1)
    }

    /// Storage keys of every slot the range touches, big-endian as used by `SLOAD`.
    pub fn slot_keys(&self) -> impl Iterator<Item = B256> {
        let last = self.to.slot;
        let first = (!self.is_empty()).then_some(self.from.slot);
        std::iter::successors(first, move |slot| (*slot < last).then(|| *slot + U256::from(1)))
            .map(|slot| B256::from(slot.to_be_bytes()))
    }

    /// Whether two ranges share at least one byte.
    pub fn overlaps(&self, other: &StorageRange) -> bool {
        !self.is_empty() && !other.is_empty() && self.from < other.to && other.from < self.to
    }
}

impl fmt::Display for StorageRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.from, self.to)
    }
}

/// Allocation cursor: the next free byte in storage.
///
/// The offset is always below [`SLOT_SIZE`]; reaching the end of a slot moves
/// the cursor to the start of the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotCursor {
    slot: U256,
    offset: usize,
}

impl Default for SlotCursor {
    fn default() -> Self {
        Self::ZERO
    }
}

impl SlotCursor {
    /// Slot 0, offset 0.
    pub const ZERO: Self = Self {
        slot: U256::ZERO,
        offset: 0,
    };

    /// Create a cursor, carrying offsets of a full slot or more into the slot index.
    pub fn new(slot: U256, offset: usize) -> Self {
        Self {
            slot: slot + U256::from(offset / SLOT_SIZE),
            offset: offset % SLOT_SIZE,
        }
    }

    pub fn slot(&self) -> U256 {
        self.slot
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Bytes still free in the current slot.
    pub fn remaining(&self) -> usize {
        SLOT_SIZE - self.offset
    }

    pub fn address(&self) -> SlotAddress {
        SlotAddress::new(self.slot, self.offset)
    }

    /// Move to the start of the next slot unless already at a slot boundary.
    pub fn align_to_slot(self) -> Self {
        if self.offset == 0 {
            self
        } else {
            Self {
                slot: self.slot + U256::from(1),
                offset: 0,
            }
        }
    }

    /// Place a value of `width` bytes; see [`allocate_value`].
    pub fn allocate(self, width: U256) -> (StorageRange, SlotCursor) {
        allocate_value(self, width)
    }
}

impl fmt::Display for SlotCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.address().fmt(f)
    }
}

/// Place a value of `width` bytes at the cursor.
///
/// A value that fits in the rest of the current slot is packed there.
/// Otherwise it starts at offset 0 of the next slot. Values wider than a slot
/// start on a slot boundary and span `ceil(width / 32)` slots. The returned
/// cursor points just past the value.
pub fn allocate_value(cursor: SlotCursor, width: U256) -> (StorageRange, SlotCursor) {
    if width.is_zero() {
        let at = cursor.address();
        return (StorageRange { from: at, to: at }, cursor);
    }

    let start = if width <= U256::from(cursor.remaining()) {
        cursor
    } else {
        cursor.align_to_slot()
    };

    // index of the last byte, counted from the start of the first slot
    let last = U256::from(start.offset) + width - U256::from(1);
    let slot_size = U256::from(SLOT_SIZE);
    let from = start.address();
    let to = SlotAddress::new(
        start.slot + last / slot_size,
        (last % slot_size).to::<usize>() + 1,
    );
    let next = SlotCursor::new(to.slot, to.offset);

    (StorageRange { from, to }, next)
}
