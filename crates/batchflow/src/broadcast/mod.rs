//! Broadcasting of batch progress for real-time consumers.

pub mod batch_events;

pub use batch_events::{BatchEvent, BatchEventBroadcaster, BatchEventKind};
