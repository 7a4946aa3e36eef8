//! Configuration for the motion controllers.

use serde::{Deserialize, Serialize};

use crate::error::MotionError;

/// Top-level configuration, loadable from JSON.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    pub carousel: CarouselConfig,
    pub reveal: RevealConfig,
}

impl MotionConfig {
    /// Parse and validate. Missing fields take their defaults.
    pub fn from_json_str(text: &str) -> Result<Self, MotionError> {
        let cfg: MotionConfig = serde_json::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), MotionError> {
        self.carousel.validate()?;
        self.reveal.validate()
    }
}

/// Timing of the hero carousel. All durations are seconds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarouselConfig {
    /// Time each slide stays on screen before auto-advancing.
    pub auto_advance_secs: f32,
    /// Start in the playing state.
    pub autoplay: bool,
    /// Start muted (browsers only allow muted autoplay).
    pub muted: bool,
    pub text_fade_out_secs: f32,
    /// Gap between the text fading out and the slides starting to crossfade.
    pub crossfade_delay_secs: f32,
    pub crossfade_secs: f32,
    /// Fraction of `crossfade_secs` during which both slides are fading.
    pub crossfade_overlap: f32,
    pub indicator_secs: f32,
    pub text_fade_in_secs: f32,
    /// Vertical offset the caption drifts to while fading out.
    pub text_offset_y: f32,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            auto_advance_secs: 6.0,
            autoplay: true,
            muted: true,
            text_fade_out_secs: 0.5,
            crossfade_delay_secs: 0.2,
            crossfade_secs: 1.0,
            crossfade_overlap: 0.5,
            indicator_secs: 0.3,
            text_fade_in_secs: 0.8,
            text_offset_y: -30.0,
        }
    }
}

impl CarouselConfig {
    pub fn validate(&self) -> Result<(), MotionError> {
        if !(self.auto_advance_secs.is_finite() && self.auto_advance_secs > 0.0) {
            return Err(invalid(format!(
                "auto_advance_secs must be positive, got {}",
                self.auto_advance_secs
            )));
        }
        for (name, value) in [
            ("text_fade_out_secs", self.text_fade_out_secs),
            ("crossfade_delay_secs", self.crossfade_delay_secs),
            ("crossfade_secs", self.crossfade_secs),
            ("indicator_secs", self.indicator_secs),
            ("text_fade_in_secs", self.text_fade_in_secs),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(invalid(format!("{name} must be >= 0, got {value}")));
            }
        }
        if !(0.0..=1.0).contains(&self.crossfade_overlap) {
            return Err(invalid(format!(
                "crossfade_overlap must be within [0, 1], got {}",
                self.crossfade_overlap
            )));
        }
        if !self.text_offset_y.is_finite() {
            return Err(invalid("text_offset_y must be finite".to_string()));
        }
        Ok(())
    }

    /// Seconds between the start of the crossfade and the incoming slide starting to fade in.
    #[inline]
    pub fn incoming_delay_secs(&self) -> f32 {
        self.crossfade_secs * (1.0 - self.crossfade_overlap)
    }
}

/// Scroll-triggered entrance settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealConfig {
    /// The reveal starts once the element's top rises this many pixels above the viewport bottom.
    pub start_offset: f32,
    /// Play the reveal backwards when the element scrolls back below the start line.
    pub reverse_on_exit: bool,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            start_offset: 100.0,
            reverse_on_exit: false,
        }
    }
}

impl RevealConfig {
    pub fn validate(&self) -> Result<(), MotionError> {
        if !self.start_offset.is_finite() {
            return Err(invalid("start_offset must be finite".to_string()));
        }
        Ok(())
    }
}

fn invalid(reason: String) -> MotionError {
    MotionError::InvalidConfig { reason }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        MotionConfig::default().validate().unwrap();
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = MotionConfig::from_json_str(
            r#"{ "carousel": { "auto_advance_secs": 4.0 }, "reveal": { "reverse_on_exit": true } }"#,
        )
        .unwrap();
        assert_eq!(cfg.carousel.auto_advance_secs, 4.0);
        assert_eq!(cfg.carousel.crossfade_secs, 1.0);
        assert!(cfg.reveal.reverse_on_exit);
        assert_eq!(cfg.reveal.start_offset, 100.0);
    }

    #[test]
    fn rejects_bad_values() {
        let err = MotionConfig::from_json_str(r#"{ "carousel": { "crossfade_overlap": 1.5 } }"#)
            .unwrap_err();
        assert_eq!(err.category(), "config");

        let err = MotionConfig::from_json_str(r#"{ "carousel": { "auto_advance_secs": 0 } }"#)
            .unwrap_err();
        assert!(matches!(err, MotionError::InvalidConfig { .. }));

        let err = MotionConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, MotionError::Serialization { .. }));
    }
}
