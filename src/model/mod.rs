/// Core timeline entities.
mod category;
mod era;
mod event;

pub use category::Category;
pub use era::Era;
pub use event::{Alert, Event, EventKind};

pub type EventId = u32;
pub type CategoryId = u32;
pub type EraId = u32;

/// Identity of a container, carried by its sub-events as a back-reference.
/// Distinct from `EventId` because synthesized containers are keyed by the
/// cid their sub-events name before the container exists.
pub type ContainerCid = i64;
