//! Media playback collaborator.
//!
//! The carousel never touches video elements directly; it drives them through
//! a [`MediaHost`] keyed by slide index.

use serde::{Deserialize, Serialize};

use crate::error::MotionError;

/// Playback position of one media element, in seconds.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MediaPosition {
    pub current: f32,
    pub duration: f32,
}

impl MediaPosition {
    /// `current / duration`, or `None` while the duration is unknown.
    pub fn fraction(&self) -> Option<f32> {
        if self.duration.is_finite() && self.duration > 0.0 {
            Some((self.current / self.duration).clamp(0.0, 1.0))
        } else {
            None
        }
    }
}

pub trait MediaHost {
    /// Start playback. Hosts report autoplay refusals as `MotionError::MediaPlayback`.
    fn play(&mut self, slide: usize) -> Result<(), MotionError>;
    fn pause(&mut self, slide: usize);
    /// Seek back to the beginning.
    fn rewind(&mut self, slide: usize);
    fn set_muted(&mut self, slide: usize, muted: bool);
    fn position(&self, slide: usize) -> Option<MediaPosition>;
}

/// Host for carousels without embedded video.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoMedia;

impl MediaHost for NoMedia {
    fn play(&mut self, _slide: usize) -> Result<(), MotionError> {
        Ok(())
    }

    fn pause(&mut self, _slide: usize) {}

    fn rewind(&mut self, _slide: usize) {}

    fn set_muted(&mut self, _slide: usize, _muted: bool) {}

    fn position(&self, _slide: usize) -> Option<MediaPosition> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fraction_requires_known_duration() {
        let p = MediaPosition {
            current: 3.0,
            duration: 12.0,
        };
        assert_eq!(p.fraction(), Some(0.25));
        let unknown = MediaPosition {
            current: 3.0,
            duration: f32::NAN,
        };
        assert_eq!(unknown.fraction(), None);
    }
}
