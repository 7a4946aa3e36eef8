//! Scroll-triggered entrance.
//!
//! The host reports element geometry whenever the page scrolls; the
//! controller maps it onto three zones relative to a start line
//! `start_offset` pixels above the viewport bottom:
//!
//! * `Before`: the element's top is still below the start line.
//! * `Active`: between the start line and the element leaving through the top.
//! * `After`: the element's bottom is above the viewport.
//!
//! The first move out of `Before` plays the reveal. With `reverse_on_exit`,
//! scrolling back into `Before` plays it backwards, and the cycle repeats.

use serde::{Deserialize, Serialize};

use crate::config::RevealConfig;
use crate::effect::{timeline_from_specs, ElementGroup, Part, TweenSpec};
use crate::error::MotionError;
use crate::events::MotionEvent;
use crate::ids::ObservationId;
use crate::stage::{Property, Stage};
use crate::timeline::{Snap, Timeline};

/// Immediate property assignment applied before any animation runs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PropertySet {
    pub part: Part,
    pub property: Property,
    pub value: f32,
}

impl PropertySet {
    pub fn new(part: Part, property: Property, value: f32) -> Self {
        Self {
            part,
            property,
            value,
        }
    }
}

/// Hidden starting state plus the tweens that reveal the element.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RevealSpec {
    #[serde(default)]
    pub initial: Vec<PropertySet>,
    pub reveal: Vec<TweenSpec>,
}

/// Element box relative to the viewport, in pixels (top = 0).
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScrollGeometry {
    pub element_top: f32,
    pub element_bottom: f32,
    pub viewport_height: f32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Zone {
    Before,
    Active,
    After,
}

impl ScrollGeometry {
    pub fn zone(&self, start_offset: f32) -> Zone {
        if self.element_top > self.viewport_height - start_offset {
            Zone::Before
        } else if self.element_bottom < 0.0 {
            Zone::After
        } else {
            Zone::Active
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RevealState {
    Hidden,
    Revealing,
    Revealed,
    Concealing,
    Disposed,
}

#[derive(Debug)]
pub struct ScrollRevealController {
    group: ElementGroup,
    config: RevealConfig,
    timeline: Timeline,
    state: RevealState,
    zone: Zone,
    observation: Option<ObservationId>,
    events: Vec<MotionEvent>,
}

impl ScrollRevealController {
    /// Apply the hidden state and start observing the element.
    pub fn new(
        group: ElementGroup,
        spec: &RevealSpec,
        config: RevealConfig,
        stage: &mut Stage,
    ) -> Result<Self, MotionError> {
        config.validate()?;
        for set in &spec.initial {
            if let Some(element) = group.part(set.part) {
                stage.set(element, set.property, set.value);
            }
        }
        let timeline = timeline_from_specs(&spec.reveal, &group);
        let observation = stage.observe(group.root);
        log::debug!("observing {:?} for scroll reveal", group.root);
        Ok(Self {
            group,
            config,
            timeline,
            state: RevealState::Hidden,
            zone: Zone::Before,
            observation: Some(observation),
            events: Vec::new(),
        })
    }

    #[inline]
    pub fn state(&self) -> RevealState {
        self.state
    }

    #[inline]
    pub fn zone(&self) -> Zone {
        self.zone
    }

    pub fn group(&self) -> &ElementGroup {
        &self.group
    }

    pub fn drain_events(&mut self) -> Vec<MotionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Geometry changed (scroll, resize). Ignored once disposed.
    pub fn observe(&mut self, geometry: ScrollGeometry, stage: &mut Stage) {
        if self.state == RevealState::Disposed {
            return;
        }
        let zone = geometry.zone(self.config.start_offset);
        let next = self.trigger(zone);
        self.zone = zone;
        match next {
            Some(RevealState::Revealing) => self.reveal(stage),
            Some(RevealState::Concealing) => self.conceal(stage),
            _ => {}
        }
    }

    /// Whether reporting `geometry` would start the reveal or the conceal.
    pub fn would_animate(&self, geometry: ScrollGeometry) -> bool {
        self.state != RevealState::Disposed
            && self
                .trigger(geometry.zone(self.config.start_offset))
                .is_some()
    }

    #[inline]
    pub fn is_animating(&self) -> bool {
        matches!(self.state, RevealState::Revealing | RevealState::Concealing)
    }

    fn trigger(&self, zone: Zone) -> Option<RevealState> {
        match (self.zone, zone) {
            (Zone::Before, Zone::Active | Zone::After)
                if !matches!(self.state, RevealState::Revealing | RevealState::Revealed) =>
            {
                Some(RevealState::Revealing)
            }
            (Zone::Active | Zone::After, Zone::Before)
                if self.config.reverse_on_exit
                    && !matches!(self.state, RevealState::Hidden | RevealState::Concealing) =>
            {
                Some(RevealState::Concealing)
            }
            _ => None,
        }
    }

    /// Jump a running reveal or conceal to its end. The timeline stays usable
    /// for later scrolls.
    pub fn finish(&mut self, stage: &mut Stage) {
        if self.is_animating() {
            let rest = self.timeline.duration();
            self.settle(rest, stage);
        }
    }

    fn reveal(&mut self, stage: &mut Stage) {
        if matches!(self.state, RevealState::Revealing | RevealState::Revealed) {
            return;
        }
        if self.timeline.play().is_ok() {
            log::debug!("revealing {:?}", self.group.root);
            self.state = RevealState::Revealing;
            self.settle(0.0, stage);
        }
    }

    fn conceal(&mut self, stage: &mut Stage) {
        if matches!(self.state, RevealState::Hidden | RevealState::Concealing) {
            return;
        }
        if self.timeline.reverse().is_ok() {
            log::debug!("concealing {:?}", self.group.root);
            self.state = RevealState::Concealing;
            self.settle(0.0, stage);
        }
    }

    pub fn tick(&mut self, dt: f32, stage: &mut Stage) {
        if self.is_animating() {
            self.settle(dt, stage);
        }
    }

    fn settle(&mut self, dt: f32, stage: &mut Stage) {
        if !self.timeline.advance(dt, stage).completed {
            return;
        }
        let element = self.group.root;
        match self.state {
            RevealState::Revealing => {
                self.state = RevealState::Revealed;
                self.events.push(MotionEvent::Revealed { element });
            }
            RevealState::Concealing => {
                self.state = RevealState::Hidden;
                self.events.push(MotionEvent::Concealed { element });
            }
            _ => {}
        }
    }

    /// Finish any running animation in its direction of travel and release
    /// the observation. Idempotent.
    pub fn dispose(&mut self, stage: &mut Stage) {
        if self.state == RevealState::Disposed {
            return;
        }
        let snap = match self.state {
            RevealState::Revealing => Snap::End,
            RevealState::Concealing => Snap::Start,
            _ => Snap::Hold,
        };
        self.timeline.kill(snap, stage);
        if let Some(observation) = self.observation.take() {
            stage.unobserve(observation);
        }
        self.state = RevealState::Disposed;
    }
}
