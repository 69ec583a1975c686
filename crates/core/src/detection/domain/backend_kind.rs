use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// The closed set of face-detection backends.
///
/// An unrecognized backend name is a caller error, surfaced as
/// [`UnknownBackendError`] — never a silent fallback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// In-process multi-scale cascade. No model file, never unavailable.
    Haar,
    /// Single-shot object detector filtered to the person class.
    DnnPerson,
    /// BlazeFace short-range face detector (relative-coordinate output).
    MediaPipe,
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("unknown detection backend: {0:?}")]
pub struct UnknownBackendError(pub String);

impl BackendKind {
    pub const ALL: [BackendKind; 3] =
        [BackendKind::Haar, BackendKind::DnnPerson, BackendKind::MediaPipe];

    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Haar => "haar",
            BackendKind::DnnPerson => "dnn_person",
            BackendKind::MediaPipe => "mediapipe",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = UnknownBackendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "haar" => Ok(BackendKind::Haar),
            "dnn_person" => Ok(BackendKind::DnnPerson),
            "mediapipe" => Ok(BackendKind::MediaPipe),
            other => Err(UnknownBackendError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_through_names() {
        for kind in BackendKind::ALL {
            assert_eq!(kind.as_str().parse::<BackendKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_unknown_name_is_an_error() {
        let err = "yolo".parse::<BackendKind>().unwrap_err();
        assert_eq!(err, UnknownBackendError("yolo".to_string()));
    }

    #[test]
    fn test_names_are_case_sensitive() {
        assert!("Haar".parse::<BackendKind>().is_err());
        assert!("MEDIAPIPE".parse::<BackendKind>().is_err());
    }

    #[test]
    fn test_display_matches_as_str() {
        assert_eq!(BackendKind::DnnPerson.to_string(), "dnn_person");
    }
}
