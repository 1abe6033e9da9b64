use std::time::Duration;

use log::{debug, info, warn};

use crate::{
    domain::{
        progress::{ProgressRecord, ProgressUpdate},
        time::format_time,
        track::{FileId, TrackRef},
    },
    http::{error::ApiError, urls::Endpoints},
    player::{
        api::{LoadTicket, ProgressApi},
        auth::AuthGuard,
        clock::Clock,
        events::{Phase, PlayerEvent},
        media::MediaSource,
        rate::RateControl,
        scheduler::{DeliveryMode, SyncScheduler},
    },
};

pub const LOADING_MESSAGE: &str = "Loading...";
pub const FINISHED_MESSAGE: &str = "Finished previously";

/// What the player shows next to the media element
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerView {
    pub status: String,
    pub now_playing: Option<String>,
    /// index into the rate options of the highlighted rate
    pub active_rate: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    NoTrack,
    RateLimited,
    Sent,
}

/// State of the active track
#[derive(Debug)]
struct TrackSession {
    track: TrackRef,
    ticket: LoadTicket,
    /// stored position waiting for metadata, 0 when there is nothing to resume
    pending_resume: f64,
    metadata_ready: bool,
    /// where playback was moved to when resuming
    resumed_at: Option<f64>,
}

/// Owns one player's session state and keeps the remote progress store in step
/// with playback.
///
/// All inputs arrive as [`PlayerEvent`]s on a single thread; network work is handed
/// to the [`ProgressApi`] and comes back as completion events.
pub struct Synchronizer<M: MediaSource> {
    media: M,
    api: Box<dyn ProgressApi>,
    clock: Box<dyn Clock>,
    auth: AuthGuard,
    rate: RateControl,
    scheduler: SyncScheduler,
    endpoints: Endpoints,
    session: Option<TrackSession>,
    phase: Phase,
    loads: u64,
    view: PlayerView,
}

impl<M: MediaSource> Synchronizer<M> {
    pub fn new(
        mut media: M,
        api: Box<dyn ProgressApi>,
        clock: Box<dyn Clock>,
        auth: AuthGuard,
        rate: RateControl,
        endpoints: Endpoints,
        sync_interval: Duration,
    ) -> Self {
        media.set_playback_rate(rate.current());
        let view = PlayerView {
            active_rate: rate.active_option(),
            ..PlayerView::default()
        };

        Self {
            media,
            api,
            clock,
            auth,
            rate,
            scheduler: SyncScheduler::new(sync_interval),
            endpoints,
            session: None,
            phase: Phase::Idle,
            loads: 0,
            view,
        }
    }

    pub fn handle(&mut self, event: PlayerEvent) {
        match event {
            PlayerEvent::TrackSelected(track) => self.load_track(track),
            PlayerEvent::MetadataLoaded => self.on_metadata_loaded(),
            PlayerEvent::TimeUpdate => self.on_time_update(),
            PlayerEvent::Paused => {
                self.sync(true, DeliveryMode::Awaited);
            }
            PlayerEvent::Ended => self.on_ended(),
            PlayerEvent::RateSelected(rate) => {
                self.set_rate(rate, true);
            }
            PlayerEvent::Unload => {
                self.sync(true, DeliveryMode::BestEffort);
            }
            PlayerEvent::ProgressFetched { ticket, outcome } => {
                self.on_progress_fetched(ticket, outcome)
            }
            PlayerEvent::SaveCompleted { file, outcome } => self.on_save_completed(file, outcome),
        }
    }

    /// Switches to `track`, flushing the outgoing track's progress first.
    pub fn load_track(&mut self, track: TrackRef) {
        self.media.pause();
        if self.session.is_some() {
            self.sync(true, DeliveryMode::Awaited);
        }

        self.loads += 1;
        let ticket = LoadTicket {
            file: track.file.clone(),
            generation: self.loads,
        };
        info!("Loading {} ({})", track.name, track.file);

        self.view.now_playing = Some(track.name.clone());
        self.view.status = LOADING_MESSAGE.to_string();
        self.scheduler.reset();
        self.phase = Phase::Loading;
        self.media.set_source(&self.endpoints.media_url(&track.file));
        self.media.set_playback_rate(self.rate.current());
        self.session = Some(TrackSession {
            track,
            ticket: ticket.clone(),
            pending_resume: 0.0,
            metadata_ready: false,
            resumed_at: None,
        });

        self.api.fetch_progress(ticket);
    }

    fn on_progress_fetched(&mut self, ticket: LoadTicket, outcome: Result<ProgressRecord, ApiError>) {
        let current = self.session.as_ref().map(|session| &session.ticket);
        if current != Some(&ticket) {
            debug!(
                "Discarding stale progress for {} (load {})",
                ticket.file, ticket.generation
            );
            return;
        }

        let record = match outcome {
            Ok(record) => record,
            Err(e) if e.is_unauthenticated() => {
                self.auth.redirect();
                ProgressRecord::default()
            }
            Err(e) => {
                warn!("Failed to fetch progress for {}: {e}", ticket.file);
                ProgressRecord::default()
            }
        };

        let Some(session) = self.session.as_mut() else {
            return;
        };
        let position = record.resume_position();

        if session.metadata_ready {
            // metadata won the race, resume only if playback is still behind the stored position
            if position > 0.0 && self.media.current_time() < position {
                session.pending_resume = position;
                self.apply_resume();
            }
            return;
        }

        session.pending_resume = position;
        self.view.status = if position > 0.0 {
            resume_message(position, record.known_duration())
        } else if record.played {
            FINISHED_MESSAGE.to_string()
        } else {
            String::new()
        };
        self.phase = Phase::AwaitingMetadata;
    }

    fn on_metadata_loaded(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.metadata_ready = true;
        self.apply_resume();
    }

    /// Seeks to the pending resume point if it lies inside the media, otherwise
    /// switches to the live progress display. The pending point is consumed either way.
    fn apply_resume(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let pending = std::mem::take(&mut session.pending_resume);
        let duration = self.media.duration();

        // NaN duration fails the comparison
        if pending > 0.0 && pending < duration {
            self.media.seek(pending);
            session.resumed_at = Some(pending);
            self.view.status = resume_message(pending, Some(duration));
            self.phase = Phase::ResumeSeek;
        } else {
            self.phase = Phase::LiveProgress;
            self.show_live_progress();
        }
    }

    fn on_time_update(&mut self) {
        let Some(session) = &self.session else {
            return;
        };

        match self.phase {
            Phase::LiveProgress => self.show_live_progress(),
            Phase::ResumeSeek => {
                // the seek itself reports the resume point, keep the resume message until playback moves on
                let moved = session
                    .resumed_at
                    .is_none_or(|at| (self.media.current_time() - at).abs() >= 0.5);
                if moved {
                    self.phase = Phase::LiveProgress;
                    self.show_live_progress();
                }
            }
            _ => {}
        }

        self.sync(false, DeliveryMode::Awaited);
    }

    fn on_ended(&mut self) {
        if self.session.is_none() {
            return;
        }
        self.phase = Phase::Ended;
        self.show_live_progress();
        self.sync(true, DeliveryMode::Awaited);
    }

    fn on_save_completed(&mut self, file: FileId, outcome: Result<(), ApiError>) {
        match outcome {
            Ok(()) => debug!("Progress saved for {file}"),
            Err(e) if e.is_unauthenticated() => {
                self.auth.redirect();
            }
            Err(e) => warn!("Failed to save progress for {file}: {e}"),
        }
    }

    /// Sends the current position of the active track unless rate limited.
    ///
    /// `force` bypasses the rate limit. The last-sync time is updated when the
    /// write is sent, whatever its network outcome.
    pub fn sync(&mut self, force: bool, mode: DeliveryMode) -> SyncOutcome {
        let Some(session) = &self.session else {
            return SyncOutcome::NoTrack;
        };

        if !self.scheduler.try_begin(self.clock.now_millis(), force) {
            debug!("Progress sync for {} rate limited", session.track.file);
            return SyncOutcome::RateLimited;
        }

        let update = ProgressUpdate::capture(
            &session.track.file,
            self.media.current_time(),
            self.media.duration(),
        );
        debug!(
            "Syncing {} at {:.1}s/{:.1}s ({mode:?})",
            update.file, update.position, update.duration
        );
        self.api.save_progress(update, mode);
        SyncOutcome::Sent
    }

    /// Applies `rate` to the media; persists it unless `persist` is false.
    ///
    /// Returns false and changes nothing when the rate is invalid.
    pub fn set_rate(&mut self, rate: f64, persist: bool) -> bool {
        let Some(rate) = self.rate.set_rate(rate, persist) else {
            return false;
        };
        self.media.set_playback_rate(rate);
        self.view.active_rate = self.rate.active_option();
        true
    }

    fn show_live_progress(&mut self) {
        self.view.status = format!(
            "Progress {} / {}",
            format_time(self.media.current_time()),
            format_time(self.media.duration())
        );
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn view(&self) -> &PlayerView {
        &self.view
    }

    pub fn active_track(&self) -> Option<&TrackRef> {
        self.session.as_ref().map(|session| &session.track)
    }

    pub fn pending_resume(&self) -> f64 {
        self.session
            .as_ref()
            .map_or(0.0, |session| session.pending_resume)
    }

    pub fn playback_rate(&self) -> f64 {
        self.rate.current()
    }

    pub fn is_redirected(&self) -> bool {
        self.auth.is_redirected()
    }

    pub fn media(&self) -> &M {
        &self.media
    }

    pub fn media_mut(&mut self) -> &mut M {
        &mut self.media
    }
}

fn resume_message(position: f64, duration: Option<f64>) -> String {
    match duration {
        Some(duration) => format!(
            "Resume from {} of {}",
            format_time(position),
            format_time(duration)
        ),
        None => format!("Resume from {}", format_time(position)),
    }
}
