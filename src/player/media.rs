use std::time::Duration;

/// The playback element: a black box reporting position and duration.
///
/// Times are in seconds. `duration` is NaN until metadata is known, like an
/// HTML media element.
pub trait MediaSource {
    /// replaces the current source, position and duration are reset
    fn set_source(&mut self, url: &str);

    fn pause(&mut self);

    fn seek(&mut self, position: f64);

    fn set_playback_rate(&mut self, rate: f64);

    fn current_time(&self) -> f64;

    fn duration(&self) -> f64;
}

/// Media source that advances with wall time instead of decoding anything.
///
/// Drives headless sessions from the CLI.
#[derive(Debug)]
pub struct SimulatedMedia {
    source: Option<String>,
    duration: f64,
    position: f64,
    rate: f64,
    playing: bool,
}

impl SimulatedMedia {
    pub fn new() -> Self {
        Self {
            source: None,
            duration: f64::NAN,
            position: 0.0,
            rate: 1.0,
            playing: false,
        }
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn load_metadata(&mut self, duration: f64) {
        self.duration = duration;
    }

    pub fn play(&mut self) {
        if self.source.is_some() {
            self.playing = true;
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn playback_rate(&self) -> f64 {
        self.rate
    }

    /// Moves the position forward by `elapsed` scaled by the playback rate.
    ///
    /// Returns true when the end is reached during this step; playback stops there.
    pub fn advance(&mut self, elapsed: Duration) -> bool {
        if !self.playing {
            return false;
        }
        self.position += elapsed.as_secs_f64() * self.rate;
        if self.duration.is_finite() && self.position >= self.duration {
            self.position = self.duration;
            self.playing = false;
            return true;
        }
        false
    }
}

impl Default for SimulatedMedia {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaSource for SimulatedMedia {
    fn set_source(&mut self, url: &str) {
        self.source = Some(url.to_string());
        self.duration = f64::NAN;
        self.position = 0.0;
        self.playing = false;
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn seek(&mut self, position: f64) {
        let position = position.max(0.0);
        self.position = if self.duration.is_finite() {
            position.min(self.duration)
        } else {
            position
        };
    }

    fn set_playback_rate(&mut self, rate: f64) {
        self.rate = rate;
    }

    fn current_time(&self) -> f64 {
        self.position
    }

    fn duration(&self) -> f64 {
        self.duration
    }
}
