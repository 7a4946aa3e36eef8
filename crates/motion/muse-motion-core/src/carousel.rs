//! Hero carousel: auto-advancing slides with crossfade transitions.
//!
//! At most one transition is in flight. A transition is a single timeline:
//! caption out, slides crossfade, indicator dots swap, a cue swaps the caption
//! text, caption back in. The logical index only changes when that timeline
//! completes (or is cut short by [`Carousel::unmount`]).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::CarouselConfig;
use crate::ease::Ease;
use crate::error::MotionError;
use crate::events::MotionEvent;
use crate::ids::{CueId, ElementId};
use crate::media::{MediaHost, NoMedia};
use crate::stage::{Property, Stage};
use crate::timeline::{Position, Snap, Timeline, Tween};

/// Fired mid-transition, once both slides have crossfaded.
const SWAP_CONTENT: CueId = CueId(0);

const INDICATOR_ACTIVE_WIDTH: f32 = 2.0;
const INDICATOR_IDLE_OPACITY: f32 = 0.5;

const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "ogg", "ogv", "mov", "m3u8"];

/// Slide identifier; content files use both numbers and strings.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SlideId {
    Number(u64),
    Name(String),
}

impl fmt::Display for SlideId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Name(s) => f.write_str(s),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Guess from the URI: known video extensions and embed players are video.
    pub fn infer(uri: &str) -> Self {
        let path = uri
            .split(|c: char| c == '?' || c == '#')
            .next()
            .unwrap_or(uri)
            .to_ascii_lowercase();
        if path.contains("youtube.com/embed") || path.contains("player.vimeo.com") {
            return Self::Video;
        }
        match path.rsplit_once('.') {
            Some((_, ext)) if VIDEO_EXTENSIONS.contains(&ext) => Self::Video,
            _ => Self::Image,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slide {
    pub id: SlideId,
    #[serde(alias = "videoSrc", alias = "video", alias = "imageSrc")]
    pub media_ref: String,
    #[serde(default)]
    pub kind: Option<MediaKind>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, alias = "ctaLabel")]
    pub cta_text: Option<String>,
    #[serde(default, alias = "ctaTarget")]
    pub cta_link: Option<String>,
}

impl Slide {
    pub fn media_kind(&self) -> MediaKind {
        self.kind.unwrap_or_else(|| MediaKind::infer(&self.media_ref))
    }

    pub fn is_video(&self) -> bool {
        self.media_kind() == MediaKind::Video
    }

    /// Parse a JSON array of slides.
    pub fn list_from_json_str(text: &str) -> Result<Vec<Slide>, MotionError> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Snapshot handed to renderers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CarouselState {
    pub current_index: usize,
    pub is_playing: bool,
    pub is_muted: bool,
    /// Progress of the current slide in [0, 1].
    pub progress_fraction: f32,
    /// Target of the transition in flight.
    pub pending_transition: Option<usize>,
}

/// Stage elements driven by the carousel.
#[derive(Clone, Debug, PartialEq)]
pub struct CarouselElements {
    pub slides: Vec<ElementId>,
    /// Caption block (title, description, call to action).
    pub overlay: ElementId,
    pub indicators: Vec<ElementId>,
}

impl CarouselElements {
    fn spawn(count: usize, stage: &mut Stage) -> Self {
        let slides = (0..count)
            .map(|i| stage.spawn(&[(Property::Opacity, if i == 0 { 1.0 } else { 0.0 })]))
            .collect();
        let overlay = stage.spawn(&[]);
        let indicators = (0..count)
            .map(|i| {
                if i == 0 {
                    stage.spawn(&[(Property::Width, INDICATOR_ACTIVE_WIDTH)])
                } else {
                    stage.spawn(&[(Property::Opacity, INDICATOR_IDLE_OPACITY)])
                }
            })
            .collect();
        Self {
            slides,
            overlay,
            indicators,
        }
    }
}

/// Lifecycle callbacks; every method defaults to a no-op.
pub trait CarouselObserver {
    fn on_transition_start(&mut self, _from: usize, _to: usize) {}
    fn on_index_changed(&mut self, _index: usize) {}
    fn on_transition_end(&mut self, _index: usize) {}
}

#[derive(Debug)]
enum Phase {
    Idle,
    Transitioning { target: usize, timeline: Timeline },
}

pub struct Carousel<M: MediaHost = NoMedia> {
    slides: Vec<Slide>,
    config: CarouselConfig,
    media: M,
    elements: CarouselElements,
    current: usize,
    displayed: usize,
    phase: Phase,
    is_playing: bool,
    is_muted: bool,
    elapsed: f32,
    progress: f32,
    unmounted: bool,
    events: Vec<MotionEvent>,
    observers: Vec<Box<dyn CarouselObserver>>,
}

impl<M: MediaHost> fmt::Debug for Carousel<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Carousel")
            .field("slides", &self.slides.len())
            .field("current", &self.current)
            .field("phase", &self.phase)
            .field("is_playing", &self.is_playing)
            .field("unmounted", &self.unmounted)
            .finish()
    }
}

impl<M: MediaHost> Carousel<M> {
    pub fn new(
        slides: Vec<Slide>,
        config: CarouselConfig,
        media: M,
        stage: &mut Stage,
    ) -> Result<Self, MotionError> {
        config.validate()?;
        if slides.is_empty() {
            return Err(MotionError::EmptySlides);
        }
        for (i, slide) in slides.iter().enumerate() {
            if slides[..i].iter().any(|s| s.id == slide.id) {
                return Err(MotionError::DuplicateSlide {
                    id: slide.id.to_string(),
                });
            }
        }

        let elements = CarouselElements::spawn(slides.len(), stage);
        let mut carousel = Self {
            is_playing: config.autoplay,
            is_muted: config.muted,
            slides,
            config,
            media,
            elements,
            current: 0,
            displayed: 0,
            phase: Phase::Idle,
            elapsed: 0.0,
            progress: 0.0,
            unmounted: false,
            events: Vec::new(),
            observers: Vec::new(),
        };
        log::debug!("carousel mounted with {} slides", carousel.slides.len());
        carousel.sync_media();
        Ok(carousel)
    }

    pub fn state(&self) -> CarouselState {
        CarouselState {
            current_index: self.current,
            is_playing: self.is_playing,
            is_muted: self.is_muted,
            progress_fraction: self.progress,
            pending_transition: self.pending(),
        }
    }

    fn pending(&self) -> Option<usize> {
        match &self.phase {
            Phase::Transitioning { target, .. } => Some(*target),
            Phase::Idle => None,
        }
    }

    /// Index the carousel is at or heading to.
    pub fn target_index(&self) -> usize {
        self.pending().unwrap_or(self.current)
    }

    /// Slide whose caption is currently shown; switches mid-transition.
    pub fn displayed_content(&self) -> &Slide {
        &self.slides[self.displayed]
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn elements(&self) -> &CarouselElements {
        &self.elements
    }

    pub fn config(&self) -> &CarouselConfig {
        &self.config
    }

    pub fn media(&self) -> &M {
        &self.media
    }

    pub fn media_mut(&mut self) -> &mut M {
        &mut self.media
    }

    pub fn is_transitioning(&self) -> bool {
        matches!(self.phase, Phase::Transitioning { .. })
    }

    pub fn is_unmounted(&self) -> bool {
        self.unmounted
    }

    pub fn subscribe(&mut self, observer: Box<dyn CarouselObserver>) {
        self.observers.push(observer);
    }

    pub fn drain_events(&mut self) -> Vec<MotionEvent> {
        std::mem::take(&mut self.events)
    }

    fn emit(&mut self, event: MotionEvent) {
        for observer in self.observers.iter_mut() {
            match &event {
                MotionEvent::TransitionStarted { from, to } => {
                    observer.on_transition_start(*from, *to)
                }
                MotionEvent::IndexChanged { index } => observer.on_index_changed(*index),
                MotionEvent::TransitionEnded { index } => observer.on_transition_end(*index),
                _ => {}
            }
        }
        self.events.push(event);
    }

    fn ensure_mounted(&self) -> Result<(), MotionError> {
        if self.unmounted {
            log::warn!("carousel used after unmount");
            return Err(MotionError::DisposedElement {
                element: self.elements.overlay,
            });
        }
        Ok(())
    }

    /// Start a transition to `index`.
    ///
    /// Returns `Ok(false)` when `index` is already current or another
    /// transition is in flight.
    pub fn go_to(&mut self, index: usize, stage: &mut Stage) -> Result<bool, MotionError> {
        self.ensure_mounted()?;
        let len = self.slides.len();
        if index >= len {
            log::warn!("ignoring go_to({index}) with {len} slides");
            return Err(MotionError::InvalidIndex { index, len });
        }
        if index == self.current || self.is_transitioning() {
            return Ok(false);
        }

        let from = self.current;
        let mut timeline = self.transition_timeline(from, index);
        let _ = timeline.play();
        timeline.advance(0.0, stage);
        self.phase = Phase::Transitioning {
            target: index,
            timeline,
        };
        self.elapsed = 0.0;
        self.progress = 0.0;
        log::debug!("carousel transition {from} -> {index}");
        self.emit(MotionEvent::TransitionStarted { from, to: index });
        Ok(true)
    }

    pub fn next(&mut self, stage: &mut Stage) -> Result<bool, MotionError> {
        let len = self.slides.len();
        self.go_to((self.current + 1) % len, stage)
    }

    pub fn previous(&mut self, stage: &mut Stage) -> Result<bool, MotionError> {
        let len = self.slides.len();
        self.go_to((self.current + len - 1) % len, stage)
    }

    pub fn play(&mut self) {
        self.set_playing(true);
    }

    pub fn pause(&mut self) {
        self.set_playing(false);
    }

    pub fn toggle_play(&mut self) {
        self.set_playing(!self.is_playing);
    }

    fn set_playing(&mut self, playing: bool) {
        if self.unmounted || self.is_playing == playing {
            return;
        }
        self.is_playing = playing;
        self.emit(MotionEvent::PlaybackChanged { playing });
        self.sync_media();
    }

    pub fn mute(&mut self) {
        self.set_muted(true);
    }

    pub fn unmute(&mut self) {
        self.set_muted(false);
    }

    pub fn toggle_mute(&mut self) {
        self.set_muted(!self.is_muted);
    }

    fn set_muted(&mut self, muted: bool) {
        if self.unmounted || self.is_muted == muted {
            return;
        }
        self.is_muted = muted;
        if self.slides[self.current].is_video() {
            self.media.set_muted(self.current, muted);
        }
        self.emit(MotionEvent::MuteChanged { muted });
    }

    /// The host reports that slide `index` finished playing.
    ///
    /// Only the current slide, outside a transition, advances the carousel;
    /// late or duplicate reports are dropped.
    pub fn on_media_ended(&mut self, index: usize, stage: &mut Stage) -> Result<bool, MotionError> {
        self.ensure_mounted()?;
        if index != self.current || self.is_transitioning() {
            return Ok(false);
        }
        self.next(stage)
    }

    pub fn tick(&mut self, dt: f32, stage: &mut Stage) {
        if self.unmounted {
            return;
        }
        let dt = dt.max(0.0);
        if let Phase::Transitioning { target, timeline } = &mut self.phase {
            let target = *target;
            let step = timeline.advance(dt, stage);
            if step.cues.contains(&SWAP_CONTENT) {
                self.swap_content(target);
            }
            if step.completed {
                self.finish(target);
            }
        } else if self.is_playing {
            self.elapsed += dt;
            if self.elapsed >= self.config.auto_advance_secs {
                self.elapsed = 0.0;
                // A single slide has nowhere to go; the timer just restarts.
                let _ = self.next(stage);
            }
        }
        self.sample_progress();
    }

    fn sample_progress(&mut self) {
        self.progress = if self.is_transitioning() {
            0.0
        } else if self.slides[self.current].is_video() {
            self.media
                .position(self.current)
                .and_then(|p| p.fraction())
                .unwrap_or(0.0)
        } else {
            (self.elapsed / self.config.auto_advance_secs).clamp(0.0, 1.0)
        };
    }

    fn swap_content(&mut self, index: usize) {
        self.displayed = index;
        self.emit(MotionEvent::ContentSwapped { index });
    }

    fn finish(&mut self, target: usize) {
        self.phase = Phase::Idle;
        self.current = target;
        self.displayed = target;
        self.elapsed = 0.0;
        self.progress = 0.0;
        self.emit(MotionEvent::IndexChanged { index: target });
        self.emit(MotionEvent::TransitionEnded { index: target });
        self.sync_media();
    }

    /// Pause and rewind every other video, then drive the current one.
    fn sync_media(&mut self) {
        let current = self.current;
        for (i, slide) in self.slides.iter().enumerate() {
            if i != current && slide.is_video() {
                self.media.pause(i);
                self.media.rewind(i);
            }
        }
        if !self.slides[current].is_video() {
            return;
        }
        self.media.set_muted(current, self.is_muted);
        if !self.is_playing {
            self.media.pause(current);
            return;
        }
        if let Err(err) = self.media.play(current) {
            log::warn!("{err}; carousel paused");
            self.is_playing = false;
            self.emit(MotionEvent::Error { error: err });
            self.emit(MotionEvent::PlaybackChanged { playing: false });
        }
    }

    /// Stop everything. A transition in flight completes instantly so the
    /// stage is left in a consistent final state; nothing is written afterwards.
    pub fn unmount(&mut self, stage: &mut Stage) {
        if self.unmounted {
            return;
        }
        if let Phase::Transitioning { target, timeline } = &mut self.phase {
            let target = *target;
            // Pending cues fire here; the caption swap is committed below.
            timeline.kill(Snap::End, stage);
            self.current = target;
            self.displayed = target;
        }
        self.phase = Phase::Idle;
        if self.slides[self.current].is_video() {
            self.media.pause(self.current);
        }
        self.unmounted = true;
        log::debug!("carousel unmounted at slide {}", self.current);
    }

    fn transition_timeline(&self, from: usize, to: usize) -> Timeline {
        let cfg = &self.config;
        let el = &self.elements;
        let text_out = Ease::PowerIn(2);
        let text_in = Ease::PowerOut(2);

        let mut tl = Timeline::new();
        tl.add(
            Tween::to(el.overlay, Property::Y, cfg.text_offset_y)
                .duration(cfg.text_fade_out_secs)
                .ease(text_out),
            Position::End,
        )
        .add(
            Tween::to(el.overlay, Property::Opacity, 0.0)
                .duration(cfg.text_fade_out_secs)
                .ease(text_out),
            Position::WithPrevious,
        );

        let out_start = tl.duration() + cfg.crossfade_delay_secs;
        let in_start = out_start + cfg.incoming_delay_secs();
        tl.add(
            Tween::to(el.slides[from], Property::Opacity, 0.0).duration(cfg.crossfade_secs),
            Position::At(out_start),
        )
        .add(
            Tween::to(el.slides[to], Property::Opacity, 1.0).duration(cfg.crossfade_secs),
            Position::At(in_start),
        );
        for (dot, width, opacity) in [
            (el.indicators[from], 1.0, INDICATOR_IDLE_OPACITY),
            (el.indicators[to], INDICATOR_ACTIVE_WIDTH, 1.0),
        ] {
            tl.add(
                Tween::to(dot, Property::Width, width).duration(cfg.indicator_secs),
                Position::At(out_start),
            )
            .add(
                Tween::to(dot, Property::Opacity, opacity).duration(cfg.indicator_secs),
                Position::WithPrevious,
            );
        }

        tl.cue(SWAP_CONTENT, Position::End)
            .add(
                Tween::to(el.overlay, Property::Y, 0.0)
                    .duration(cfg.text_fade_in_secs)
                    .ease(text_in),
                Position::End,
            )
            .add(
                Tween::to(el.overlay, Property::Opacity, 1.0)
                    .duration(cfg.text_fade_in_secs)
                    .ease(text_in),
                Position::WithPrevious,
            );
        tl
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slide(id: u64, media: &str) -> Slide {
        Slide {
            id: SlideId::Number(id),
            media_ref: media.into(),
            kind: None,
            title: format!("Slide {id}"),
            description: String::new(),
            cta_text: None,
            cta_link: None,
        }
    }

    #[test]
    fn media_kind_inference() {
        assert_eq!(MediaKind::infer("/videos/a.MP4"), MediaKind::Video);
        assert_eq!(MediaKind::infer("/v/b.webm?t=3"), MediaKind::Video);
        assert_eq!(
            MediaKind::infer("https://www.youtube.com/embed/LLJSfU8oD60"),
            MediaKind::Video
        );
        assert_eq!(MediaKind::infer("/api/placeholder/500/320"), MediaKind::Image);
        assert_eq!(MediaKind::infer("hero.jpg"), MediaKind::Image);
    }

    #[test]
    fn site_field_names_deserialize() {
        let slides = Slide::list_from_json_str(
            r#"[
                { "id": 1, "videoSrc": "/a.mp4", "title": "A", "ctaText": "Shop Now", "ctaLink": "/shop" },
                { "id": "intro", "imageSrc": "/b.png", "title": "B" }
            ]"#,
        )
        .unwrap();
        assert_eq!(slides[0].cta_text.as_deref(), Some("Shop Now"));
        assert!(slides[0].is_video());
        assert_eq!(slides[1].id, SlideId::Name("intro".into()));
        assert!(!slides[1].is_video());
    }

    #[test]
    fn construction_validates_slides() {
        let mut stage = Stage::new();
        let empty = Carousel::new(Vec::new(), CarouselConfig::default(), NoMedia, &mut stage);
        assert_eq!(empty.unwrap_err(), MotionError::EmptySlides);

        let dup = Carousel::new(
            vec![slide(1, "a.jpg"), slide(1, "b.jpg")],
            CarouselConfig::default(),
            NoMedia,
            &mut stage,
        );
        assert_eq!(
            dup.unwrap_err(),
            MotionError::DuplicateSlide { id: "1".into() }
        );
    }

    #[test]
    fn transition_layout_matches_site_timing() {
        let mut stage = Stage::new();
        let carousel = Carousel::new(
            vec![slide(1, "a.jpg"), slide(2, "b.jpg")],
            CarouselConfig::default(),
            NoMedia,
            &mut stage,
        )
        .unwrap();
        // 0.5 out + 0.2 gap + 0.5 stagger + 1.0 fade + 0.8 in
        let tl = carousel.transition_timeline(0, 1);
        assert!((tl.duration() - 3.0).abs() < 1e-4, "{}", tl.duration());
    }

    #[test]
    fn wrap_around_navigation() {
        let mut stage = Stage::new();
        let mut carousel = Carousel::new(
            vec![slide(1, "a.jpg"), slide(2, "b.jpg"), slide(3, "c.jpg")],
            CarouselConfig::default(),
            NoMedia,
            &mut stage,
        )
        .unwrap();
        assert_eq!(carousel.previous(&mut stage), Ok(true));
        assert_eq!(carousel.target_index(), 2);
        carousel.tick(5.0, &mut stage);
        assert_eq!(carousel.state().current_index, 2);
        assert_eq!(carousel.next(&mut stage), Ok(true));
        assert_eq!(carousel.target_index(), 0);
    }
}
