//! Error types for the motion core

use serde::{Deserialize, Serialize};

use crate::ids::ElementId;

/// Every failure the orchestration layer can observe.
///
/// Controllers catch these at their boundary and degrade (no-op, static
/// presentation); only construction and explicit registry calls hand them back
/// to the caller.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum MotionError {
    /// An effect with this name is already registered
    #[error("Effect already registered: {name}")]
    DuplicateEffect { name: String },

    /// No effect registered under this name
    #[error("Unknown effect: {name}")]
    UnknownEffect { name: String },

    /// Navigation target outside the slide list
    #[error("Slide index {index} is out of range (slide count {len})")]
    InvalidIndex { index: usize, len: usize },

    /// The host refused to start or control media playback
    #[error("Media playback failed for slide {index}: {reason}")]
    MediaPlayback { index: usize, reason: String },

    /// Operation on an element whose controller was already torn down
    #[error("Element {element:?} has been disposed")]
    DisposedElement { element: ElementId },

    /// Attempt to restart a timeline after kill
    #[error("Timeline has been killed and cannot be reused")]
    TimelineKilled,

    /// An effect's enter/leave callback failed
    #[error("Effect '{effect}' failed: {reason}")]
    EffectFailed { effect: String, reason: String },

    /// Carousel constructed without slides
    #[error("Carousel requires at least one slide")]
    EmptySlides,

    /// Two slides share an id
    #[error("Duplicate slide id: {id}")]
    DuplicateSlide { id: String },

    /// Configuration value rejected during validation
    #[error("Invalid config: {reason}")]
    InvalidConfig { reason: String },

    /// Serialization error
    #[error("Serialization error: {reason}")]
    Serialization { reason: String },
}

impl MotionError {
    /// Errors the orchestration loop absorbs without changing presentation.
    #[inline]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::UnknownEffect { .. }
                | Self::InvalidIndex { .. }
                | Self::MediaPlayback { .. }
                | Self::DisposedElement { .. }
                | Self::EffectFailed { .. }
        )
    }

    /// Get error category for logging
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::DuplicateEffect { .. } | Self::UnknownEffect { .. } => "registry",
            Self::EffectFailed { .. } => "effect",
            Self::InvalidIndex { .. } | Self::EmptySlides | Self::DuplicateSlide { .. } => {
                "carousel"
            }
            Self::MediaPlayback { .. } => "media",
            Self::DisposedElement { .. } | Self::TimelineKilled => "lifecycle",
            Self::InvalidConfig { .. } | Self::Serialization { .. } => "config",
        }
    }
}

impl From<serde_json::Error> for MotionError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recoverable_errors_are_the_degradable_ones() {
        assert!(MotionError::UnknownEffect {
            name: "sparkle".into()
        }
        .is_recoverable());
        assert!(MotionError::InvalidIndex { index: 99, len: 3 }.is_recoverable());
        assert!(!MotionError::EmptySlides.is_recoverable());
        assert!(!MotionError::DuplicateEffect {
            name: "glow".into()
        }
        .is_recoverable());
    }

    #[test]
    fn categories() {
        assert_eq!(MotionError::TimelineKilled.category(), "lifecycle");
        assert_eq!(
            MotionError::MediaPlayback {
                index: 0,
                reason: "autoplay".into()
            }
            .category(),
            "media"
        );
    }

    #[test]
    fn serde_roundtrip_keeps_payload() {
        let err = MotionError::DisposedElement {
            element: ElementId(7),
        };
        let text = serde_json::to_string(&err).unwrap();
        let back: MotionError = serde_json::from_str(&text).unwrap();
        assert_eq!(err, back);
    }
}
