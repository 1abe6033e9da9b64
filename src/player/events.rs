use crate::{
    domain::{
        progress::ProgressRecord,
        track::{FileId, TrackRef},
    },
    http::error::ApiError,
    player::api::LoadTicket,
};

/// Everything the synchronizer reacts to
#[derive(Debug)]
pub enum PlayerEvent {
    /// user picked a track
    TrackSelected(TrackRef),
    /// media duration became known
    MetadataLoaded,
    /// periodic position update while playing
    TimeUpdate,
    Paused,
    Ended,
    /// user picked a playback rate
    RateSelected(f64),
    /// the session is being torn down
    Unload,
    ProgressFetched {
        ticket: LoadTicket,
        outcome: Result<ProgressRecord, ApiError>,
    },
    SaveCompleted {
        file: FileId,
        outcome: Result<(), ApiError>,
    },
}

/// Lifecycle of the active track
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    /// source set, stored progress being fetched
    Loading,
    /// progress known, waiting for the media duration
    AwaitingMetadata,
    /// playback was moved to the stored position
    ResumeSeek,
    LiveProgress,
    Ended,
}
