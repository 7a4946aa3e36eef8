//! Timeline: an ordered set of property tweens and cue markers laid out on a
//! shared clock, with a play / reverse / kill lifecycle.
//!
//! Start values are captured lazily, the first time the playhead reaches a
//! tween, so a timeline built while another animation is still running picks up
//! from wherever that animation left the element.

use serde::{Deserialize, Serialize};

use crate::ease::Ease;
use crate::error::MotionError;
use crate::ids::{CueId, ElementId};
use crate::stage::{Property, Stage};

/// Default tween length in seconds.
pub const DEFAULT_DURATION: f32 = 0.5;

/// Single property transition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tween {
    pub target: ElementId,
    pub property: Property,
    /// Explicit start value; `None` means "whatever the stage holds when the tween starts".
    #[serde(default)]
    pub from: Option<f32>,
    pub to: f32,
    pub duration: f32,
    #[serde(default)]
    pub ease: Ease,
}

impl Tween {
    pub fn to(target: ElementId, property: Property, value: f32) -> Self {
        Self {
            target,
            property,
            from: None,
            to: value,
            duration: DEFAULT_DURATION,
            ease: Ease::default(),
        }
    }

    pub fn from_to(target: ElementId, property: Property, from: f32, to: f32) -> Self {
        Self {
            from: Some(from),
            ..Self::to(target, property, to)
        }
    }

    /// Zero-length tween: jumps to `value` when reached.
    pub fn set(target: ElementId, property: Property, value: f32) -> Self {
        Self {
            duration: 0.0,
            ..Self::to(target, property, value)
        }
    }

    #[inline]
    pub fn duration(mut self, secs: f32) -> Self {
        self.duration = secs.max(0.0);
        self
    }

    #[inline]
    pub fn ease(mut self, ease: impl Into<Ease>) -> Self {
        self.ease = ease.into();
        self
    }
}

/// Where a new entry lands relative to what is already on the timeline.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Position {
    /// Append after the current end.
    End,
    /// Relative to the current end: negative overlaps ("-=0.8"), positive leaves a gap ("+=0.2").
    Offset(f32),
    /// Same start as the previously added entry ("<").
    WithPrevious,
    /// Absolute time in seconds.
    At(f32),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayState {
    Idle,
    Playing,
    Reversed,
    Killed,
}

impl PlayState {
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Playing => "playing",
            Self::Reversed => "reversed",
            Self::Killed => "killed",
        }
    }
}

/// Where a killed timeline leaves its targets.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Snap {
    /// Restore every captured start value.
    Start,
    /// Write every end value and report cues not yet crossed.
    End,
    /// Stop in place. Only valid when a successor immediately animates the same properties.
    Hold,
}

/// Result of advancing (or killing) a timeline.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TimelineTick {
    /// Cues crossed in forward direction, in timeline order.
    pub cues: Vec<CueId>,
    /// True on the tick the playhead reached the end (or start, when reversed).
    pub completed: bool,
}

#[derive(Clone, Debug)]
struct Scheduled {
    tween: Tween,
    start: f32,
    captured: Option<f32>,
    rendered: Option<f32>,
}

impl Scheduled {
    #[inline]
    fn local(&self, time: f32) -> f32 {
        if time < self.start {
            0.0
        } else if self.tween.duration <= 0.0 {
            1.0
        } else {
            ((time - self.start) / self.tween.duration).clamp(0.0, 1.0)
        }
    }

    #[inline]
    fn value_at(&self, from: f32, local: f32) -> f32 {
        from + (self.tween.to - from) * self.tween.ease.apply(local)
    }
}

#[derive(Clone, Debug)]
enum Entry {
    Tween(Scheduled),
    Cue { id: CueId, at: f32, fired: bool },
}

#[derive(Clone, Debug)]
pub struct Timeline {
    entries: Vec<Entry>,
    duration: f32,
    last_start: f32,
    playhead: f32,
    state: PlayState,
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Timeline {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            duration: 0.0,
            last_start: 0.0,
            playhead: 0.0,
            state: PlayState::Idle,
        }
    }

    fn resolve(&self, position: Position) -> f32 {
        match position {
            Position::End => self.duration,
            Position::Offset(dt) => (self.duration + dt).max(0.0),
            Position::WithPrevious => self.last_start,
            Position::At(t) => t.max(0.0),
        }
    }

    /// Schedule a tween.
    pub fn add(&mut self, tween: Tween, position: Position) -> &mut Self {
        let start = self.resolve(position);
        self.duration = self.duration.max(start + tween.duration);
        self.last_start = start;
        self.entries.push(Entry::Tween(Scheduled {
            tween,
            start,
            captured: None,
            rendered: None,
        }));
        self
    }

    /// Builder form of [`Timeline::add`].
    pub fn with(mut self, tween: Tween, position: Position) -> Self {
        self.add(tween, position);
        self
    }

    /// Place a cue marker.
    pub fn cue(&mut self, id: CueId, position: Position) -> &mut Self {
        let at = self.resolve(position);
        self.duration = self.duration.max(at);
        self.last_start = at;
        self.entries.push(Entry::Cue {
            id,
            at,
            fired: false,
        });
        self
    }

    /// Extend the timeline by an empty span.
    pub fn hold(&mut self, secs: f32) -> &mut Self {
        let start = self.duration;
        self.duration += secs.max(0.0);
        self.last_start = start;
        self
    }

    #[inline]
    pub fn duration(&self) -> f32 {
        self.duration
    }

    #[inline]
    pub fn playhead(&self) -> f32 {
        self.playhead
    }

    #[inline]
    pub fn state(&self) -> PlayState {
        self.state
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        matches!(self.state, PlayState::Playing | PlayState::Reversed)
    }

    #[inline]
    pub fn is_killed(&self) -> bool {
        self.state == PlayState::Killed
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Playhead as a fraction of the duration (1.0 for empty timelines).
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.playhead / self.duration).clamp(0.0, 1.0)
        }
    }

    /// Distinct (element, property) pairs this timeline writes, in first-seen order.
    pub fn targets(&self) -> Vec<(ElementId, Property)> {
        let mut out: Vec<(ElementId, Property)> = Vec::new();
        for entry in &self.entries {
            if let Entry::Tween(s) = entry {
                let key = (s.tween.target, s.tween.property);
                if !out.contains(&key) {
                    out.push(key);
                }
            }
        }
        out
    }

    pub fn play(&mut self) -> Result<(), MotionError> {
        if self.is_killed() {
            return Err(MotionError::TimelineKilled);
        }
        self.state = PlayState::Playing;
        Ok(())
    }

    pub fn reverse(&mut self) -> Result<(), MotionError> {
        if self.is_killed() {
            return Err(MotionError::TimelineKilled);
        }
        self.state = PlayState::Reversed;
        Ok(())
    }

    /// Stop the clock without touching targets; `play`/`reverse` resume.
    pub fn pause(&mut self) {
        if self.is_active() {
            self.state = PlayState::Idle;
        }
    }

    /// Move the playhead by `dt` seconds in the current direction and write
    /// every tween whose sampled value changed.
    pub fn advance(&mut self, dt: f32, stage: &mut Stage) -> TimelineTick {
        let mut tick = TimelineTick::default();
        let dt = dt.max(0.0);
        match self.state {
            PlayState::Playing => {
                let next = (self.playhead + dt).min(self.duration);
                self.playhead = next;
                self.render_forward(next, stage, &mut tick);
                if next >= self.duration {
                    self.state = PlayState::Idle;
                    tick.completed = true;
                }
            }
            PlayState::Reversed => {
                let next = (self.playhead - dt).max(0.0);
                self.playhead = next;
                self.render_backward(next, stage);
                if next <= 0.0 {
                    self.state = PlayState::Idle;
                    tick.completed = true;
                }
            }
            PlayState::Idle | PlayState::Killed => {}
        }
        tick
    }

    /// Halt immediately. The timeline is inert afterwards.
    pub fn kill(&mut self, snap: Snap, stage: &mut Stage) -> TimelineTick {
        let mut tick = TimelineTick::default();
        if self.is_killed() {
            return tick;
        }
        match snap {
            Snap::Start => {
                for entry in self.entries.iter_mut().rev() {
                    match entry {
                        Entry::Tween(s) => {
                            if let Some(from) = s.captured {
                                stage.set(s.tween.target, s.tween.property, from);
                                s.rendered = Some(0.0);
                            }
                        }
                        Entry::Cue { fired, .. } => *fired = false,
                    }
                }
                self.playhead = 0.0;
            }
            Snap::End => {
                for entry in self.entries.iter_mut() {
                    match entry {
                        Entry::Tween(s) => {
                            if s.captured.is_none() {
                                s.captured = Some(
                                    s.tween
                                        .from
                                        .unwrap_or_else(|| stage.get(s.tween.target, s.tween.property)),
                                );
                            }
                            stage.set(s.tween.target, s.tween.property, s.tween.to);
                            s.rendered = Some(1.0);
                        }
                        Entry::Cue { id, fired, .. } => {
                            if !*fired {
                                *fired = true;
                                tick.cues.push(*id);
                            }
                        }
                    }
                }
                self.playhead = self.duration;
                tick.completed = true;
            }
            Snap::Hold => {}
        }
        self.state = PlayState::Killed;
        tick
    }

    fn render_forward(&mut self, time: f32, stage: &mut Stage, tick: &mut TimelineTick) {
        for entry in self.entries.iter_mut() {
            match entry {
                Entry::Tween(s) => {
                    if time < s.start {
                        continue;
                    }
                    let local = s.local(time);
                    if s.rendered == Some(local) {
                        continue;
                    }
                    let from = match s.captured {
                        Some(v) => v,
                        None => {
                            let v = s
                                .tween
                                .from
                                .unwrap_or_else(|| stage.get(s.tween.target, s.tween.property));
                            s.captured = Some(v);
                            v
                        }
                    };
                    stage.set(s.tween.target, s.tween.property, s.value_at(from, local));
                    s.rendered = Some(local);
                }
                Entry::Cue { id, at, fired } => {
                    if !*fired && time >= *at {
                        *fired = true;
                        tick.cues.push(*id);
                    }
                }
            }
        }
    }

    fn render_backward(&mut self, time: f32, stage: &mut Stage) {
        for entry in self.entries.iter_mut().rev() {
            match entry {
                Entry::Tween(s) => {
                    let Some(from) = s.captured else {
                        continue;
                    };
                    let local = s.local(time);
                    if s.rendered == Some(local) {
                        continue;
                    }
                    stage.set(s.tween.target, s.tween.property, s.value_at(from, local));
                    s.rendered = Some(local);
                }
                Entry::Cue { at, fired, .. } => {
                    if *fired && time < *at {
                        *fired = false;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) {
        assert!((a - b).abs() <= 1e-4, "left={a} right={b}");
    }

    #[test]
    fn positions_resolve_like_gsap() {
        let el = ElementId(0);
        let mut tl = Timeline::new();
        tl.add(Tween::to(el, Property::Opacity, 1.0).duration(1.0), Position::End)
            .add(
                Tween::to(el, Property::Y, 0.0).duration(0.8),
                Position::Offset(-0.4),
            )
            .add(
                Tween::to(el, Property::Scale, 1.0).duration(0.2),
                Position::WithPrevious,
            );
        approx(tl.duration(), 1.4);
        tl.hold(5.0);
        approx(tl.duration(), 6.4);
        tl.add(Tween::to(el, Property::X, 1.0).duration(1.0), Position::At(0.0));
        approx(tl.duration(), 6.4);
    }

    #[test]
    fn start_value_is_captured_when_reached() {
        let mut stage = Stage::new();
        let el = stage.spawn(&[(Property::Opacity, 0.0)]);
        let mut tl = Timeline::new();
        tl.add(Tween::to(el, Property::Opacity, 1.0).duration(1.0).ease(Ease::Linear), Position::At(1.0));
        tl.play().unwrap();
        tl.advance(0.5, &mut stage);
        // Not reached yet: a change made now becomes the start value.
        stage.set(el, Property::Opacity, 0.5);
        tl.advance(1.0, &mut stage);
        approx(stage.get(el, Property::Opacity), 0.75);
    }

    #[test]
    fn reverse_returns_to_captured_start() {
        let mut stage = Stage::new();
        let el = stage.spawn(&[(Property::Y, 50.0)]);
        let mut tl = Timeline::new()
            .with(Tween::to(el, Property::Y, 0.0).duration(0.8), Position::End);
        tl.play().unwrap();
        let t = tl.advance(1.0, &mut stage);
        assert!(t.completed);
        approx(stage.get(el, Property::Y), 0.0);
        tl.reverse().unwrap();
        let t = tl.advance(1.0, &mut stage);
        assert!(t.completed);
        approx(stage.get(el, Property::Y), 50.0);
        assert_eq!(tl.state(), PlayState::Idle);
    }

    #[test]
    fn finished_tweens_stop_writing() {
        let mut stage = Stage::new();
        let el = stage.spawn(&[]);
        let mut tl = Timeline::new();
        tl.add(Tween::to(el, Property::X, 10.0).duration(0.1), Position::End)
            .hold(1.0);
        tl.play().unwrap();
        tl.advance(0.2, &mut stage);
        let writes = stage.writes_to(el);
        tl.advance(0.2, &mut stage);
        tl.advance(0.2, &mut stage);
        assert_eq!(stage.writes_to(el), writes);
    }

    #[test]
    fn cues_fire_once_in_order() {
        let mut stage = Stage::new();
        let mut tl = Timeline::new();
        tl.cue(CueId(1), Position::At(0.5)).cue(CueId(2), Position::At(1.0));
        tl.play().unwrap();
        assert!(tl.advance(0.4, &mut stage).cues.is_empty());
        assert_eq!(tl.advance(0.2, &mut stage).cues, vec![CueId(1)]);
        let last = tl.advance(1.0, &mut stage);
        assert_eq!(last.cues, vec![CueId(2)]);
        assert!(last.completed);
    }

    #[test]
    fn empty_timeline_completes_on_first_advance() {
        let mut stage = Stage::new();
        let mut tl = Timeline::new();
        tl.play().unwrap();
        assert!(tl.advance(0.0, &mut stage).completed);
        approx(tl.progress(), 1.0);
    }

    #[test]
    fn kill_snap_start_restores_pre_state() {
        let mut stage = Stage::new();
        let el = stage.spawn(&[(Property::Opacity, 0.2)]);
        let mut tl = Timeline::new();
        tl.add(Tween::to(el, Property::Opacity, 1.0).duration(1.0), Position::End)
            .add(Tween::to(el, Property::Opacity, 0.5).duration(1.0), Position::End);
        tl.play().unwrap();
        tl.advance(1.5, &mut stage);
        tl.kill(Snap::Start, &mut stage);
        approx(stage.get(el, Property::Opacity), 0.2);
    }

    #[test]
    fn kill_snap_end_writes_final_values_and_pending_cues() {
        let mut stage = Stage::new();
        let el = stage.spawn(&[]);
        let mut tl = Timeline::new();
        tl.add(Tween::to(el, Property::X, 4.0).duration(1.0), Position::End)
            .cue(CueId(9), Position::End)
            .add(Tween::to(el, Property::X, 8.0).duration(1.0), Position::End);
        tl.play().unwrap();
        tl.advance(0.3, &mut stage);
        let tick = tl.kill(Snap::End, &mut stage);
        assert_eq!(tick.cues, vec![CueId(9)]);
        approx(stage.get(el, Property::X), 8.0);
    }

    #[test]
    fn killed_timeline_is_inert() {
        let mut stage = Stage::new();
        let el = stage.spawn(&[]);
        let mut tl = Timeline::new()
            .with(Tween::to(el, Property::X, 4.0).duration(1.0), Position::End);
        tl.play().unwrap();
        tl.advance(0.5, &mut stage);
        tl.kill(Snap::Hold, &mut stage);
        let writes = stage.writes_to(el);
        assert_eq!(tl.play(), Err(MotionError::TimelineKilled));
        assert_eq!(tl.reverse(), Err(MotionError::TimelineKilled));
        tl.advance(1.0, &mut stage);
        tl.kill(Snap::End, &mut stage);
        assert_eq!(stage.writes_to(el), writes);
    }
}
