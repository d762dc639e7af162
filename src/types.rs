/// A half-open logical index range `[start, end)`.
///
/// The engine exposes inclusive first/last accessors on the orchestrator; the
/// exclusive form keeps the internal window math free of `size - 1` edge
/// cases when the range is empty.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Window {
    pub start: u64,
    pub end: u64, // exclusive
}

impl Window {
    pub const EMPTY: Self = Self { start: 0, end: 0 };

    pub fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    pub fn contains(&self, index: u64) -> bool {
        index >= self.start && index < self.end
    }
}

/// The outcome of a renormalization step.
///
/// `physical_delta` is the amount every previously written physical
/// coordinate (scroll position and element offsets) moved; the caller must
/// apply it to all of them in the same synchronous step so the on-screen
/// position does not jump.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RenormShift {
    pub previous_origin: u64,
    pub origin: u64,
    pub physical_delta: i64,
}
