//! Playback progress synchronization: resume on load, rate-limited saves,
//! forced flushes on state changes and best-effort delivery on unload.

pub mod api;
pub mod auth;
pub mod clock;
pub mod events;
pub mod media;
pub mod rate;
pub mod scheduler;
pub mod sync;

pub use api::{LoadTicket, ProgressApi};
pub use auth::{AuthGuard, Navigator};
pub use clock::{Clock, SystemClock};
pub use events::{Phase, PlayerEvent};
pub use media::{MediaSource, SimulatedMedia};
pub use rate::RateControl;
pub use scheduler::{DeliveryMode, SyncScheduler};
pub use sync::{PlayerView, SyncOutcome, Synchronizer};
