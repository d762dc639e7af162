use alloc::vec::Vec;

#[cfg(not(feature = "std"))]
use alloc::collections::BTreeMap as IndexSlotMap;
#[cfg(feature = "std")]
use std::collections::HashMap as IndexSlotMap;

use crate::Window;
use crate::config::{CreateElements, UpdateElement};

/// A fixed roster of host elements, reassigned across logical indices.
///
/// Slots are created once (through the host factory) and recycled for the
/// lifetime of the pool; the pool never destroys elements. The element type
/// is opaque to the engine — only the host callbacks ever look inside.
///
/// Invariant: no two slots share an assigned index (`by_index` is the single
/// source of truth for assignments).
#[derive(Debug)]
pub struct ElementPool<E> {
    slots: Vec<Slot<E>>,
    by_index: IndexSlotMap<u64, usize>,
    free: Vec<usize>,
}

#[derive(Debug)]
struct Slot<E> {
    element: E,
    assigned: Option<u64>,
    /// Last physical offset written for this slot.
    offset: i64,
}

impl<E> ElementPool<E> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            by_index: IndexSlotMap::new(),
            free: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn assigned_count(&self) -> usize {
        self.by_index.len()
    }

    /// Grows the pool to at least `count` elements through the host factory.
    ///
    /// The factory is asked for exactly the missing amount. A factory that
    /// returns a different number of elements is a host contract violation;
    /// the pool keeps whatever was returned rather than looping.
    pub fn ensure_count(&mut self, count: usize, create: &CreateElements<E>) {
        let have = self.slots.len();
        if have >= count {
            return;
        }
        let want = count - have;
        let created = create(want);
        if created.len() != want {
            vwarn!(
                requested = want,
                created = created.len(),
                "create_elements returned an unexpected element count"
            );
            debug_assert_eq!(created.len(), want, "create_elements count mismatch");
        }
        vdebug!(grown_to = have + created.len(), "element pool grow");
        for element in created {
            self.free.push(self.slots.len());
            self.slots.push(Slot {
                element,
                assigned: None,
                offset: 0,
            });
        }
    }

    /// Returns the element assigned to `index`, assigning one if needed.
    ///
    /// If `index` is already assigned its slot is returned untouched —
    /// `update` is never called for an index that stays on the same element.
    /// Otherwise the pool prefers a free slot, then steals a slot whose
    /// assignment fell outside `window` (DOM already near the viewport stays
    /// put), invoking `update(element, index)` exactly once. Returns `None`
    /// only when every slot is assigned inside `window`.
    pub fn recycle(
        &mut self,
        index: u64,
        window: Window,
        update: &UpdateElement<E>,
    ) -> Option<&mut E> {
        if let Some(&slot) = self.by_index.get(&index) {
            return Some(&mut self.slots[slot].element);
        }

        let slot = match self.free.pop() {
            Some(slot) => slot,
            None => {
                let victim = self
                    .slots
                    .iter()
                    .position(|s| s.assigned.is_some_and(|i| !window.contains(i)))?;
                let old = self.slots[victim].assigned.take();
                if let Some(old) = old {
                    self.by_index.remove(&old);
                }
                vtrace!(index, ?old, "recycle steal");
                victim
            }
        };

        self.slots[slot].assigned = Some(index);
        self.by_index.insert(index, slot);
        update(&mut self.slots[slot].element, index);
        Some(&mut self.slots[slot].element)
    }

    /// Unassigns `index`, returning its slot to the free list.
    pub fn release(&mut self, index: u64) {
        if let Some(slot) = self.by_index.remove(&index) {
            self.slots[slot].assigned = None;
            self.free.push(slot);
        }
    }

    /// Releases every assignment with index >= `from` (shrink reconciliation).
    pub fn release_from(&mut self, from: u64) {
        let stale: Vec<u64> = self.by_index.keys().copied().filter(|&i| i >= from).collect();
        for index in stale {
            self.release(index);
        }
    }

    /// Releases every assignment outside `window`.
    pub fn release_outside(&mut self, window: Window) {
        let stale: Vec<u64> = self
            .by_index
            .keys()
            .copied()
            .filter(|&i| !window.contains(i))
            .collect();
        for index in stale {
            self.release(index);
        }
    }

    pub fn element(&self, index: u64) -> Option<&E> {
        let &slot = self.by_index.get(&index)?;
        Some(&self.slots[slot].element)
    }

    pub fn offset_of(&self, index: u64) -> Option<i64> {
        let &slot = self.by_index.get(&index)?;
        Some(self.slots[slot].offset)
    }

    pub fn for_each_assigned(&self, mut f: impl FnMut(u64, &E, i64)) {
        for slot in &self.slots {
            if let Some(index) = slot.assigned {
                f(index, &slot.element, slot.offset);
            }
        }
    }

    pub fn for_each_assigned_mut(&mut self, mut f: impl FnMut(u64, &mut E, &mut i64)) {
        for slot in &mut self.slots {
            if let Some(index) = slot.assigned {
                f(index, &mut slot.element, &mut slot.offset);
            }
        }
    }
}

impl<E> Default for ElementPool<E> {
    fn default() -> Self {
        Self::new()
    }
}
