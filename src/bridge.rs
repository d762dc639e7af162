/// Text/layout direction of the host container.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    #[default]
    Ltr,
    Rtl,
}

/// The scroll container as the host sees it.
///
/// Implementations wrap the real scroll target/container pair (a DOM element,
/// a TUI viewport, a test double). Coordinates here are *raw*: they may
/// include a border inset before the content box and, for RTL containers,
/// mirrored cross-axis geometry. [`ScrollBridge`] normalizes all of that so
/// the rest of the engine can assume an LTR, border-excluded space.
pub trait ScrollHost {
    /// Raw main-axis scroll position.
    fn scroll_position(&self) -> i64;

    fn set_scroll_position(&mut self, px: i64);

    /// Visible main-axis size of the scroll target.
    fn viewport_size(&self) -> u32;

    /// Sets the total scrollable height of the container.
    fn set_scroll_extent(&mut self, px: u64);

    /// Border/padding inset between the raw origin and the content box.
    fn border_start(&self) -> i64 {
        0
    }

    fn direction(&self) -> Direction {
        Direction::Ltr
    }

    /// Whether the container is attached to a live layout tree. Render
    /// passes are skipped while detached.
    fn is_attached(&self) -> bool {
        true
    }
}

/// Adapter from raw host geometry to the normalized coordinate space the
/// position mapper assumes: non-negative, border-excluded, LTR.
#[derive(Clone, Debug)]
pub struct ScrollBridge<S> {
    host: S,
}

impl<S: ScrollHost> ScrollBridge<S> {
    pub fn new(host: S) -> Self {
        Self { host }
    }

    pub fn host(&self) -> &S {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut S {
        &mut self.host
    }

    pub fn into_host(self) -> S {
        self.host
    }

    pub fn is_attached(&self) -> bool {
        self.host.is_attached()
    }

    pub fn viewport_size(&self) -> u32 {
        self.host.viewport_size()
    }

    /// Normalized physical scroll position.
    pub fn physical_scroll_top(&self) -> u64 {
        let raw = self.host.scroll_position() - self.host.border_start();
        raw.max(0) as u64
    }

    pub fn set_physical_scroll_top(&mut self, px: u64) {
        let raw = px.min(i64::MAX as u64) as i64 + self.host.border_start();
        self.host.set_scroll_position(raw);
    }

    pub fn set_scroll_extent(&mut self, px: u64) {
        self.host.set_scroll_extent(px);
    }

    /// Mirrors a cross-axis position for RTL containers.
    ///
    /// The virtualized axis is orientation-agnostic; hosts placing elements
    /// along the cross axis use this to keep their geometry direction-aware
    /// without the engine caring.
    pub fn mirror_cross(&self, position: i64, cross_size: u32, cross_extent: u32) -> i64 {
        match self.host.direction() {
            Direction::Ltr => position,
            Direction::Rtl => cross_extent as i64 - position - cross_size as i64,
        }
    }
}
