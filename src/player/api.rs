use crate::{
    domain::{progress::ProgressUpdate, track::FileId},
    player::scheduler::DeliveryMode,
};

/// Tags a progress fetch with the load it belongs to.
///
/// A completion is only applied while its ticket matches the active load, so a
/// slow response for an abandoned track never leaks into the current one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub file: FileId,
    pub generation: u64,
}

/// Non-blocking access to the remote progress store.
pub trait ProgressApi {
    /// Starts reading the stored progress of `ticket.file`.
    ///
    /// The outcome is delivered later as `PlayerEvent::ProgressFetched` carrying the same ticket.
    fn fetch_progress(&self, ticket: LoadTicket);

    /// Starts a progress write.
    ///
    /// `Awaited` writes report back as `PlayerEvent::SaveCompleted`, `BestEffort`
    /// writes are never acknowledged and must be delivered even if the session ends.
    fn save_progress(&self, update: ProgressUpdate, mode: DeliveryMode);
}
