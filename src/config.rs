use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::scheduler::WakeCallback;

/// Factory invoked when the pool must grow; returns exactly `count` new
/// elements.
pub type CreateElements<E> = Arc<dyn Fn(usize) -> Vec<E> + Send + Sync>;

/// Populates an element's content for a logical index; called exactly once
/// per (re)assignment, never for pure position updates.
pub type UpdateElement<E> = Arc<dyn Fn(&mut E, u64) + Send + Sync>;

/// Applies a physical main-axis offset to an element.
pub type PositionElement<E> = Arc<dyn Fn(&mut E, i64) + Send + Sync>;

/// Reports an element's rendered main-axis size in px.
pub type MeasureElement<E> = Arc<dyn Fn(&E) -> u32 + Send + Sync>;

/// Default estimated item size before any measurement exists.
pub const DEFAULT_ITEM_SIZE: u32 = 100;

/// Default cap on the container's physical scrollable height, kept safely
/// under engine-specific scroll-position limits.
pub const DEFAULT_MAX_PHYSICAL_EXTENT: u64 = 16_000_000;

/// Configuration for [`crate::Virtualizer`].
///
/// Cheap to clone: callbacks are stored in `Arc`s. `create_elements` and
/// `update_element` are required; [`crate::Virtualizer::new`] fails fast
/// when they are absent. Everything else has a working default.
pub struct ScrollerConfig<E> {
    /// Total logical item count.
    pub size: u64,
    /// Estimated item size until items are measured.
    pub item_size: u32,
    /// Pixel buffer rendered around the viewport on each side. When unset,
    /// half a viewport is used.
    pub buffer_px: Option<u32>,
    /// Cap on the physical scrollable height. The safe value is
    /// browser/engine-dependent, so it is configuration, not a constant.
    pub max_physical_extent: u64,
    pub create_elements: Option<CreateElements<E>>,
    pub update_element: Option<UpdateElement<E>>,
    /// Optional: when absent, physical offsets are still tracked per slot
    /// and observable through `for_each_rendered`.
    pub position_element: Option<PositionElement<E>>,
    /// Optional: when absent, items keep their estimated size.
    pub measure_element: Option<MeasureElement<E>>,
    /// Invoked when a render first becomes pending (scheduler hook).
    pub wake: Option<WakeCallback>,
}

impl<E> ScrollerConfig<E> {
    pub fn new() -> Self {
        Self {
            size: 0,
            item_size: DEFAULT_ITEM_SIZE,
            buffer_px: None,
            max_physical_extent: DEFAULT_MAX_PHYSICAL_EXTENT,
            create_elements: None,
            update_element: None,
            position_element: None,
            measure_element: None,
            wake: None,
        }
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    pub fn with_item_size(mut self, item_size: u32) -> Self {
        self.item_size = item_size;
        self
    }

    pub fn with_buffer_px(mut self, buffer_px: u32) -> Self {
        self.buffer_px = Some(buffer_px);
        self
    }

    pub fn with_max_physical_extent(mut self, max_physical_extent: u64) -> Self {
        self.max_physical_extent = max_physical_extent;
        self
    }

    pub fn with_create_elements(
        mut self,
        f: impl Fn(usize) -> Vec<E> + Send + Sync + 'static,
    ) -> Self {
        self.create_elements = Some(Arc::new(f));
        self
    }

    pub fn with_update_element(mut self, f: impl Fn(&mut E, u64) + Send + Sync + 'static) -> Self {
        self.update_element = Some(Arc::new(f));
        self
    }

    pub fn with_position_element(
        mut self,
        f: impl Fn(&mut E, i64) + Send + Sync + 'static,
    ) -> Self {
        self.position_element = Some(Arc::new(f));
        self
    }

    pub fn with_measure_element(mut self, f: impl Fn(&E) -> u32 + Send + Sync + 'static) -> Self {
        self.measure_element = Some(Arc::new(f));
        self
    }

    pub fn with_wake(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.wake = Some(Arc::new(f));
        self
    }
}

impl<E> Default for ScrollerConfig<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for ScrollerConfig<E> {
    fn clone(&self) -> Self {
        Self {
            size: self.size,
            item_size: self.item_size,
            buffer_px: self.buffer_px,
            max_physical_extent: self.max_physical_extent,
            create_elements: self.create_elements.clone(),
            update_element: self.update_element.clone(),
            position_element: self.position_element.clone(),
            measure_element: self.measure_element.clone(),
            wake: self.wake.clone(),
        }
    }
}

impl<E> core::fmt::Debug for ScrollerConfig<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ScrollerConfig")
            .field("size", &self.size)
            .field("item_size", &self.item_size)
            .field("buffer_px", &self.buffer_px)
            .field("max_physical_extent", &self.max_physical_extent)
            .field("create_elements", &self.create_elements.as_ref().map(|_| ".."))
            .field("update_element", &self.update_element.as_ref().map(|_| ".."))
            .field(
                "position_element",
                &self.position_element.as_ref().map(|_| ".."),
            )
            .field(
                "measure_element",
                &self.measure_element.as_ref().map(|_| ".."),
            )
            .finish_non_exhaustive()
    }
}
