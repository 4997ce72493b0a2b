use std::path::PathBuf;

use thiserror::Error;

/// Failures on the gallery's setup path, before a frame loop is running.
#[derive(Debug, Error)]
pub enum GalleryError {
    #[error("unknown demo index {index} (the gallery has {count} demos)")]
    UnknownDemo { index: i64, count: usize },

    #[error("failed to load font {}: {reason}", path.display())]
    Font { path: PathBuf, reason: String },

    #[error("failed to relaunch the gallery at demo {index}")]
    Relaunch {
        index: usize,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_input() {
        let err = GalleryError::UnknownDemo { index: 9, count: 4 };
        assert_eq!(err.to_string(), "unknown demo index 9 (the gallery has 4 demos)");

        let err = GalleryError::Font {
            path: PathBuf::from("/nope.ttf"),
            reason: "no such file".into(),
        };
        assert_eq!(err.to_string(), "failed to load font /nope.ttf: no such file");
    }

    #[test]
    fn relaunch_keeps_io_source() {
        let err = GalleryError::Relaunch {
            index: 2,
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        let source = std::error::Error::source(&err).map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("gone"));
    }
}
