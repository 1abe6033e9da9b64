use serde::{Deserialize, Serialize};

use super::track::FileId;

/// Stored progress for a file, as returned by `GET /api/progress`.
///
/// Fields missing from the response default to zero / not played.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProgressRecord {
    #[serde(default)]
    pub position: f64,
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub played: bool,
}

impl ProgressRecord {
    /// resume point, or 0 when the stored position is unusable
    pub fn resume_position(&self) -> f64 {
        non_negative(self.position)
    }

    /// `None` when the service does not know the duration yet
    pub fn known_duration(&self) -> Option<f64> {
        positive(self.duration)
    }
}

/// Body of `POST /api/progress`, also used for beacons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub file: String,
    pub position: f64,
    pub duration: f64,
}

impl ProgressUpdate {
    /// Captures position and duration read from a playback source.
    ///
    /// Position must be finite and >= 0, duration finite and > 0, otherwise 0 is sent.
    pub fn capture(file: &FileId, position: f64, duration: f64) -> Self {
        Self {
            file: file.as_str().to_string(),
            position: non_negative(position),
            duration: positive(duration).unwrap_or(0.0),
        }
    }
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        0.0
    }
}

fn positive(value: f64) -> Option<f64> {
    (value.is_finite() && value > 0.0).then_some(value)
}
