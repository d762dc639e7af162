/// Construction-time configuration errors.
///
/// These are the only errors the engine surfaces: missing host callbacks are
/// contract violations detected eagerly, while every runtime out-of-range
/// request (scroll targets, indices) clamps instead of failing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollerError {
    /// No `create_elements` callback was configured.
    MissingCreateElements,
    /// No `update_element` callback was configured.
    MissingUpdateElement,
    /// `max_physical_extent` is zero; a scroll range cannot exist.
    InvalidMaxExtent,
}

impl core::fmt::Display for ScrollerError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::MissingCreateElements => {
                f.write_str("virtualizer requires a create_elements callback")
            }
            Self::MissingUpdateElement => {
                f.write_str("virtualizer requires an update_element callback")
            }
            Self::InvalidMaxExtent => f.write_str("max_physical_extent must be non-zero"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ScrollerError {}
