use crate::size_store::SizeStore;
use crate::types::{RenormShift, Window};

/// Converts between logical indices, virtual offsets, and the physical
/// coordinates of a bounded scroll container.
///
/// `physical = virtual - origin`. The origin (the virtual-index offset) is
/// mutated only by [`PositionMapper::renormalize`]; everything else is pure.
/// While the total virtual size fits inside the physical extent the origin is
/// pinned at 0 and the mapping is the identity.
///
/// In the clamped regime (total > `max_extent`) three scroll interpretations
/// coexist:
/// - ordinary scrolls (delta within one viewport) map exactly, 1:1;
/// - the physical extremes are pinned to the virtual extremes, so dragging
///   the thumb to the very top/bottom always reaches the first/last item;
/// - larger jumps (thumb teleports) map proportionally, scaling the physical
///   scroll ratio onto the whole virtual range.
///
/// The buffer window itself is always computed from exact cumulative offsets;
/// only far-away, unvisited regions are approximated.
#[derive(Clone, Copy, Debug)]
pub struct PositionMapper {
    max_extent: u64,
    origin: u64,
}

impl PositionMapper {
    pub fn new(max_extent: u64) -> Self {
        Self {
            max_extent,
            origin: 0,
        }
    }

    pub fn origin(&self) -> u64 {
        self.origin
    }

    pub fn max_extent(&self) -> u64 {
        self.max_extent
    }

    /// The scrollable height actually given to the container.
    pub fn physical_extent(&self, total: u64) -> u64 {
        total.min(self.max_extent)
    }

    pub fn is_clamped(&self, total: u64) -> bool {
        total > self.max_extent
    }

    pub fn max_physical_scroll(&self, total: u64, viewport: u32) -> u64 {
        self.physical_extent(total).saturating_sub(viewport as u64)
    }

    pub fn max_virtual_scroll(&self, total: u64, viewport: u32) -> u64 {
        total.saturating_sub(viewport as u64)
    }

    pub fn clamp_virtual(&self, total: u64, viewport: u32, offset: u64) -> u64 {
        offset.min(self.max_virtual_scroll(total, viewport))
    }

    /// Physical coordinate for a virtual one under the current origin.
    ///
    /// May be negative or beyond the extent when the origin is stale; callers
    /// renormalize before handing such values to the host.
    pub fn physical_for_virtual(&self, offset: u64) -> i64 {
        let p = offset as i128 - self.origin as i128;
        p.clamp(i64::MIN as i128, i64::MAX as i128) as i64
    }

    /// Interprets a native scroll position as a virtual offset.
    ///
    /// `previous` is the physical position of the last frame, used to tell
    /// ordinary scrolling apart from thumb teleports.
    pub fn virtual_for_scroll(
        &self,
        total: u64,
        physical: u64,
        previous: u64,
        viewport: u32,
    ) -> u64 {
        let max_virtual = self.max_virtual_scroll(total, viewport);
        if !self.is_clamped(total) {
            return physical.min(max_virtual);
        }

        let max_physical = self.max_physical_scroll(total, viewport);
        if physical == 0 {
            return 0;
        }
        if physical >= max_physical {
            return max_virtual;
        }

        let delta = physical.abs_diff(previous);
        if delta > (viewport as u64).max(1) {
            // Thumb teleport: proportional mapping of the scroll ratio.
            let scaled = (physical as u128 * max_virtual as u128) / max_physical.max(1) as u128;
            vtrace!(physical, delta, "teleport scroll");
            return (scaled as u64).min(max_virtual);
        }

        self.origin.saturating_add(physical).min(max_virtual)
    }

    /// Whether the current origin leaves `offset` outside the safe middle
    /// band of the physical extent (and recentring would actually move it).
    pub fn needs_renormalization(&self, total: u64, viewport: u32, offset: u64) -> bool {
        if !self.is_clamped(total) {
            return self.origin != 0;
        }
        let max_physical = self.max_physical_scroll(total, viewport);
        let Some(physical) = offset.checked_sub(self.origin) else {
            return true;
        };
        if physical > max_physical {
            return true;
        }
        let band = self.physical_extent(total) / 4;
        if physical >= band && physical <= max_physical.saturating_sub(band) {
            return false;
        }
        self.ideal_origin(total, viewport, offset) != self.origin
    }

    /// Recenters the origin so `offset` maps near the middle of the safe
    /// physical range.
    ///
    /// The returned shift must be applied to the container's scroll position
    /// and every assigned element's physical offset in the same synchronous
    /// step.
    pub fn renormalize(&mut self, total: u64, viewport: u32, offset: u64) -> RenormShift {
        let previous = self.origin;
        self.origin = self.ideal_origin(total, viewport, offset);
        vdebug!(
            previous_origin = previous,
            origin = self.origin,
            offset,
            "renormalize"
        );
        RenormShift {
            previous_origin: previous,
            origin: self.origin,
            physical_delta: previous as i64 - self.origin as i64,
        }
    }

    fn ideal_origin(&self, total: u64, viewport: u32, offset: u64) -> u64 {
        if !self.is_clamped(total) {
            return 0;
        }
        let mid = self.max_physical_scroll(total, viewport) / 2;
        offset
            .saturating_sub(mid)
            .min(total.saturating_sub(self.physical_extent(total)))
    }

    /// Buffered index window for a virtual offset: exact cumulative offsets,
    /// padded by `buffer_px` on both sides, clamped to the store's size.
    pub fn window_for_scroll(
        &self,
        store: &SizeStore,
        offset: u64,
        viewport: u32,
        buffer_px: u64,
    ) -> Window {
        let size = store.size();
        if size == 0 || viewport == 0 {
            return Window::EMPTY;
        }
        let offset = self.clamp_virtual(store.total_virtual_size(), viewport, offset);
        let start_px = offset.saturating_sub(buffer_px);
        let end_px = offset
            .saturating_add(viewport as u64)
            .saturating_add(buffer_px);
        let first = store.index_at_offset(start_px);
        let last = store.index_at_offset(end_px.saturating_sub(1).max(start_px));
        Window::new(first, (last + 1).min(size))
    }

    /// Strictly visible index window (no buffer).
    pub fn visible_window(&self, store: &SizeStore, offset: u64, viewport: u32) -> Window {
        self.window_for_scroll(store, offset, viewport, 0)
    }
}
