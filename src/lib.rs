//! A headless virtual-scrolling engine for practically unbounded lists.
//!
//! The engine renders only a small window of host elements for a logical
//! collection that may contain billions of items, while presenting the
//! illusion of a single continuously scrollable, correctly sized region.
//! Scroll containers impose a hard cap on physical scrollable height, so the
//! engine maintains a *virtual* coordinate space (exact cumulative item
//! offsets) and periodically renormalizes its mapping onto the bounded
//! *physical* space the container actually sees.
//!
//! It is UI-agnostic. A host layer is expected to provide:
//! - element creation/update callbacks ([`ScrollerConfig`])
//! - a scroll container adapter ([`ScrollHost`])
//! - a call to [`Virtualizer::on_scroll`] when the container scrolls, and
//!   [`Virtualizer::flush`] when a frame is ready to be laid out
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod bridge;
mod config;
mod error;
mod fenwick;
mod mapper;
mod pool;
mod scheduler;
mod size_store;
mod types;
mod virtualizer;


pub use bridge::{Direction, ScrollBridge, ScrollHost};
pub use config::{
    CreateElements, DEFAULT_ITEM_SIZE, DEFAULT_MAX_PHYSICAL_EXTENT, MeasureElement,
    PositionElement, ScrollerConfig, UpdateElement,
};
pub use error::ScrollerError;
pub use mapper::PositionMapper;
pub use pool::ElementPool;
pub use scheduler::{RenderQueue, WakeCallback};
pub use size_store::SizeStore;
pub use types::{RenormShift, Window};
pub use virtualizer::Virtualizer;
