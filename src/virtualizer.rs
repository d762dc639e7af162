use alloc::vec::Vec;

use crate::bridge::{ScrollBridge, ScrollHost};
use crate::config::{
    CreateElements, MeasureElement, PositionElement, ScrollerConfig, UpdateElement,
};
use crate::error::ScrollerError;
use crate::mapper::PositionMapper;
use crate::pool::ElementPool;
use crate::scheduler::RenderQueue;
use crate::size_store::SizeStore;
use crate::types::Window;

/// The virtual-scrolling orchestrator.
///
/// Owns the size store, element pool, position mapper, and scroll bridge,
/// and serializes every mutation through `&mut self`: host callbacks only
/// ever receive the element itself, so re-entrant calls into the engine from
/// inside a callback are ruled out by construction.
///
/// The logical scroll position lives in `virtual_offset`, independent of the
/// container's actual scroll position — detaching and reattaching the host
/// never loses it.
///
/// Render passes are coalesced: mutators mark a render pending and
/// [`Virtualizer::flush`] (synchronous, idempotent) performs it. Hosts wire
/// their frame/microtask scheduling through [`ScrollerConfig::wake`].
pub struct Virtualizer<E, S: ScrollHost> {
    store: SizeStore,
    pool: ElementPool<E>,
    mapper: PositionMapper,
    bridge: ScrollBridge<S>,
    queue: RenderQueue,

    create_elements: CreateElements<E>,
    update_element: UpdateElement<E>,
    position_element: Option<PositionElement<E>>,
    measure_element: Option<MeasureElement<E>>,
    buffer_px: Option<u32>,

    /// Authoritative logical scroll position, in virtual px.
    virtual_offset: u64,
    /// Physical scroll position as of the last frame we saw or wrote.
    last_physical: u64,
    /// Currently rendered buffer window.
    window: Window,
    measure_scratch: Vec<(u64, u32)>,
}

impl<E, S: ScrollHost> Virtualizer<E, S> {
    /// Builds a virtualizer from a configuration and a scroll host.
    ///
    /// Fails fast when the required host callbacks are missing or the
    /// physical extent cap is unusable. An initial render is scheduled.
    pub fn new(config: ScrollerConfig<E>, scroll_host: S) -> Result<Self, ScrollerError> {
        let create_elements = config
            .create_elements
            .ok_or(ScrollerError::MissingCreateElements)?;
        let update_element = config
            .update_element
            .ok_or(ScrollerError::MissingUpdateElement)?;
        if config.max_physical_extent == 0 {
            return Err(ScrollerError::InvalidMaxExtent);
        }
        vdebug!(
            size = config.size,
            item_size = config.item_size,
            max_physical_extent = config.max_physical_extent,
            "Virtualizer::new"
        );
        let v = Self {
            store: SizeStore::new(config.size, config.item_size),
            pool: ElementPool::new(),
            mapper: PositionMapper::new(config.max_physical_extent),
            bridge: ScrollBridge::new(scroll_host),
            queue: RenderQueue::new(config.wake),
            create_elements,
            update_element,
            position_element: config.position_element,
            measure_element: config.measure_element,
            buffer_px: config.buffer_px,
            virtual_offset: 0,
            last_physical: 0,
            window: Window::EMPTY,
            measure_scratch: Vec::new(),
        };
        v.queue.request();
        Ok(v)
    }

    pub fn host(&self) -> &S {
        self.bridge.host()
    }

    pub fn host_mut(&mut self) -> &mut S {
        self.bridge.host_mut()
    }

    pub fn size(&self) -> u64 {
        self.store.size()
    }

    /// Updates the total logical item count.
    ///
    /// Growing only extends the addressable range. Shrinking discards stored
    /// measurements for dropped indices, releases their pool assignments,
    /// and corrects the scroll position: when only buffered (non-visible)
    /// indices were cut the visible range is preserved as-is; when visible
    /// indices were cut the view re-pins to the new end.
    pub fn set_size(&mut self, size: u64) {
        let old = self.store.size();
        if size == old {
            return;
        }
        vdebug!(old, size, "set_size");
        if size < old {
            let visible = self.visible_window();
            self.store.set_size(size);
            self.pool.release_from(size);

            let viewport = self.bridge.viewport_size();
            let total = self.store.total_virtual_size();
            if !visible.is_empty() && visible.end > size {
                // The cut reached into the viewport: pin to the new end.
                self.virtual_offset = self.mapper.max_virtual_scroll(total, viewport);
            } else {
                self.virtual_offset = self.mapper.clamp_virtual(total, viewport, self.virtual_offset);
            }
        } else {
            self.store.set_size(size);
        }
        self.queue.request();
    }

    /// Scrolls so that `index` (clamped to the collection) lands at the top
    /// edge of the viewport, renormalizing the physical mapping as needed.
    pub fn scroll_to_index(&mut self, index: u64) {
        let size = self.store.size();
        if size == 0 {
            return;
        }
        let index = index.min(size - 1);
        let target = self.store.cumulative_offset(index);
        vdebug!(index, target, "scroll_to_index");
        self.scroll_to_offset(target);
    }

    /// Scrolls to a virtual offset (clamped to the scrollable range).
    pub fn scroll_to_offset(&mut self, offset: u64) {
        let viewport = self.bridge.viewport_size();
        let total = self.store.total_virtual_size();
        self.virtual_offset = self.mapper.clamp_virtual(total, viewport, offset);
        self.sync_physical_scroll();
        self.queue.request();
    }

    /// Native-scroll entry point: reads the container's position through the
    /// bridge, inverts it to a virtual offset, and schedules a render.
    /// Multiple scroll events between flushes coalesce into one pass.
    pub fn on_scroll(&mut self) {
        if !self.bridge.is_attached() {
            return;
        }
        let physical = self.bridge.physical_scroll_top();
        let viewport = self.bridge.viewport_size();
        let total = self.store.total_virtual_size();
        let offset = self
            .mapper
            .virtual_for_scroll(total, physical, self.last_physical, viewport);
        self.last_physical = physical;
        if offset != self.virtual_offset {
            vtrace!(physical, offset, "on_scroll");
            self.virtual_offset = offset;
        }
        self.queue.request();
    }

    /// Synchronously performs the pending render pass, if any.
    ///
    /// Idempotent: a second call without intervening mutations is a no-op.
    /// While the host is detached the pass is skipped and stays pending, so
    /// a flush after reattachment picks up where things left off.
    pub fn flush(&mut self) {
        if !self.queue.is_pending() {
            return;
        }
        if !self.bridge.is_attached() {
            vtrace!("flush skipped: host detached");
            return;
        }
        self.queue.take();
        self.render_pass();
    }

    pub fn is_render_pending(&self) -> bool {
        self.queue.is_pending()
    }

    /// First index whose element intersects the visible viewport, computed
    /// from the current store and offset state (never a stale window).
    pub fn first_visible_index(&self) -> Option<u64> {
        let w = self.visible_window();
        (!w.is_empty()).then_some(w.start)
    }

    /// Last index whose element intersects the visible viewport.
    pub fn last_visible_index(&self) -> Option<u64> {
        let w = self.visible_window();
        (!w.is_empty()).then(|| w.end - 1)
    }

    pub fn first_rendered_index(&self) -> Option<u64> {
        (!self.window.is_empty()).then_some(self.window.start)
    }

    pub fn last_rendered_index(&self) -> Option<u64> {
        (!self.window.is_empty()).then(|| self.window.end - 1)
    }

    pub fn rendered_window(&self) -> Window {
        self.window
    }

    pub fn rendered_len(&self) -> usize {
        self.pool.assigned_count()
    }

    /// Visits every rendered element with its index and physical offset.
    pub fn for_each_rendered(&self, f: impl FnMut(u64, &E, i64)) {
        self.pool.for_each_assigned(f);
    }

    pub fn virtual_offset(&self) -> u64 {
        self.virtual_offset
    }

    pub fn total_virtual_size(&self) -> u64 {
        self.store.total_virtual_size()
    }

    pub fn estimated_item_size(&self) -> u32 {
        self.store.estimated_size()
    }

    pub fn is_measured(&self, index: u64) -> bool {
        self.store.is_measured(index)
    }

    /// Records an out-of-band measurement (e.g. an image loaded late and the
    /// element grew). When the measured item sits above the viewport the
    /// scroll position is compensated so the visible content does not shift.
    pub fn measure_now(&mut self, index: u64, px: u32) {
        if index >= self.store.size() {
            return;
        }
        let anchor = self.store.index_at_offset(self.virtual_offset);
        let before = self.store.cumulative_offset(anchor);
        if !self.store.record(index, px) {
            return;
        }
        let after = self.store.cumulative_offset(anchor);
        self.shift_virtual_offset(after as i128 - before as i128);
        self.queue.request();
    }

    fn visible_window(&self) -> Window {
        let viewport = self.bridge.viewport_size();
        self.mapper
            .visible_window(&self.store, self.virtual_offset, viewport)
    }

    fn buffer_px(&self, viewport: u32) -> u64 {
        match self.buffer_px {
            Some(px) => px as u64,
            None => (viewport / 2) as u64,
        }
    }

    fn shift_virtual_offset(&mut self, delta: i128) {
        let shifted = (self.virtual_offset as i128 + delta).max(0);
        let viewport = self.bridge.viewport_size();
        let total = self.store.total_virtual_size();
        self.virtual_offset =
            self.mapper
                .clamp_virtual(total, viewport, shifted.min(u64::MAX as i128) as u64);
    }

    /// Measures every assigned element and folds changed sizes into the
    /// store, anchoring the item at the viewport top so size changes above
    /// it don't shift the visible content. Returns whether anything changed.
    fn measure_assigned(&mut self) -> bool {
        let Some(measure) = &self.measure_element else {
            return false;
        };
        self.measure_scratch.clear();
        let store = &self.store;
        let scratch = &mut self.measure_scratch;
        self.pool.for_each_assigned(|index, element, _| {
            let px = measure(element);
            if !store.is_measured(index) || store.size_of(index) != px {
                scratch.push((index, px));
            }
        });
        if self.measure_scratch.is_empty() {
            return false;
        }
        let anchor = self.store.index_at_offset(self.virtual_offset);
        let before = self.store.cumulative_offset(anchor);
        let changed = self.store.record_many(self.measure_scratch.drain(..));
        let after = self.store.cumulative_offset(anchor);
        self.shift_virtual_offset(after as i128 - before as i128);
        changed
    }

    /// Writes the physical position for the current virtual offset through
    /// the bridge, recentring the mapping first when it is out of band.
    fn sync_physical_scroll(&mut self) {
        if !self.bridge.is_attached() {
            return;
        }
        let viewport = self.bridge.viewport_size();
        let total = self.store.total_virtual_size();
        if self
            .mapper
            .needs_renormalization(total, viewport, self.virtual_offset)
        {
            self.mapper.renormalize(total, viewport, self.virtual_offset);
        }
        let physical = self.mapper.physical_for_virtual(self.virtual_offset).max(0) as u64;
        self.bridge.set_physical_scroll_top(physical);
        self.last_physical = physical;
    }

    /// The synchronous render pass. Positions every element of the buffer
    /// window: reconcile pool size, recycle the window delta, fold in fresh
    /// measurements (compensating drift above the viewport), renormalize the
    /// physical mapping when needed, then write geometry through the bridge.
    ///
    /// Measurements can change cumulative offsets, which can change which
    /// indices the buffer window holds, so reconcile + measure iterates
    /// until the window is stable (it converges immediately for steady item
    /// sizes; the cap only guards against oscillating hosts).
    fn render_pass(&mut self) {
        let viewport = self.bridge.viewport_size();
        let total = self.store.total_virtual_size();
        self.virtual_offset = self
            .mapper
            .clamp_virtual(total, viewport, self.virtual_offset);

        let buffer = self.buffer_px(viewport);
        let mut next = self
            .mapper
            .window_for_scroll(&self.store, self.virtual_offset, viewport, buffer);

        if next.is_empty() {
            self.pool.release_outside(Window::EMPTY);
            self.window = Window::EMPTY;
            self.bridge
                .set_scroll_extent(self.mapper.physical_extent(total));
            return;
        }

        for _ in 0..4 {
            // Pool reconciliation: only the window delta is touched.
            self.pool
                .ensure_count(next.len() as usize, &self.create_elements);
            self.pool.release_outside(next);
            let update = &self.update_element;
            for index in next.start..next.end {
                let assigned = self.pool.recycle(index, next, update);
                debug_assert!(assigned.is_some(), "pool exhausted inside buffer window");
            }

            if !self.measure_assigned() {
                break;
            }
            let total = self.store.total_virtual_size();
            self.virtual_offset = self
                .mapper
                .clamp_virtual(total, viewport, self.virtual_offset);
            let recomputed = self
                .mapper
                .window_for_scroll(&self.store, self.virtual_offset, viewport, buffer);
            if recomputed == next || recomputed.is_empty() {
                break;
            }
            next = recomputed;
        }

        let total = self.store.total_virtual_size();
        if self
            .mapper
            .needs_renormalization(total, viewport, self.virtual_offset)
        {
            self.mapper
                .renormalize(total, viewport, self.virtual_offset);
        }

        self.bridge
            .set_scroll_extent(self.mapper.physical_extent(total));
        let physical = self.mapper.physical_for_virtual(self.virtual_offset).max(0) as u64;
        if physical != self.last_physical || physical != self.bridge.physical_scroll_top() {
            self.bridge.set_physical_scroll_top(physical);
        }
        self.last_physical = physical;

        let store = &self.store;
        let mapper = &self.mapper;
        let position = self.position_element.as_ref();
        self.pool.for_each_assigned_mut(|index, element, offset| {
            let px = mapper.physical_for_virtual(store.cumulative_offset(index));
            *offset = px;
            if let Some(position) = position {
                position(element, px);
            }
        });

        self.window = next;
        vtrace!(
            first = next.start,
            last = next.end - 1,
            physical,
            "render pass"
        );
    }
}

impl<E, S: ScrollHost> core::fmt::Debug for Virtualizer<E, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Virtualizer")
            .field("size", &self.store.size())
            .field("virtual_offset", &self.virtual_offset)
            .field("window", &self.window)
            .field("origin", &self.mapper.origin())
            .field("pool_len", &self.pool.len())
            .finish_non_exhaustive()
    }
}
