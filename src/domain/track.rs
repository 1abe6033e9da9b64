use std::fmt::Display;

/// Opaque identifier of a media file, as understood by the progress service.
///
/// Usually a path relative to the service's media root, e.g. `podcasts/ep1.mp3`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileId(pub String);

impl FileId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for FileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Represent a track selected by the user
#[derive(Debug, Clone, PartialEq)]
pub struct TrackRef {
    pub file: FileId,
    pub name: String,
}

impl TrackRef {
    pub fn new(file: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            file: FileId::new(file),
            name: name.into(),
        }
    }

    /// display name falls back to the last path segment of the file id
    pub fn from_file(file: impl Into<String>) -> Self {
        let file = file.into();
        let name = file.rsplit('/').next().unwrap_or(&file).to_string();
        Self::new(file, name)
    }
}
