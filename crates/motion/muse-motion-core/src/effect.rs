//! Effects: named, reversible visual transformations of an element group.
//!
//! An effect turns an [`ElementGroup`] into timelines. It never writes to the
//! stage itself; the [`TransitionController`](crate::transition::TransitionController)
//! owns playback, disposal and failure recovery.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ease::Ease;
use crate::error::MotionError;
use crate::ids::ElementId;
use crate::stage::{Property, Stage};
use crate::timeline::{Position, Timeline, Tween, DEFAULT_DURATION};

/// Addressable sub-element of an interactive card.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Part {
    Root,
    Image,
    Content,
    Cta,
}

/// The elements one effect animates together.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ElementGroup {
    pub root: ElementId,
    #[serde(default)]
    pub image: Option<ElementId>,
    #[serde(default)]
    pub content: Option<ElementId>,
    #[serde(default)]
    pub cta: Option<ElementId>,
}

impl ElementGroup {
    pub fn single(root: ElementId) -> Self {
        Self {
            root,
            image: None,
            content: None,
            cta: None,
        }
    }

    /// Spawn a card (root, image, content, call-to-action) on the stage.
    pub fn spawn_card(stage: &mut Stage) -> Self {
        Self {
            root: stage.spawn(&[]),
            image: Some(stage.spawn(&[])),
            content: Some(stage.spawn(&[])),
            cta: Some(stage.spawn(&[])),
        }
    }

    #[inline]
    pub fn part(&self, part: Part) -> Option<ElementId> {
        match part {
            Part::Root => Some(self.root),
            Part::Image => self.image,
            Part::Content => self.content,
            Part::Cta => self.cta,
        }
    }

    pub fn elements(&self) -> Vec<ElementId> {
        [Some(self.root), self.image, self.content, self.cta]
            .into_iter()
            .flatten()
            .collect()
    }
}

fn default_duration() -> f32 {
    DEFAULT_DURATION
}

/// Declarative tween addressed by part rather than element.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TweenSpec {
    pub part: Part,
    pub property: Property,
    pub to: f32,
    #[serde(default)]
    pub from: Option<f32>,
    #[serde(default = "default_duration")]
    pub duration: f32,
    #[serde(default)]
    pub delay: f32,
    #[serde(default)]
    pub ease: Ease,
}

impl TweenSpec {
    pub fn new(part: Part, property: Property, to: f32) -> Self {
        Self {
            part,
            property,
            to,
            from: None,
            duration: DEFAULT_DURATION,
            delay: 0.0,
            ease: Ease::default(),
        }
    }

    pub fn duration(mut self, secs: f32) -> Self {
        self.duration = secs;
        self
    }

    pub fn delay(mut self, secs: f32) -> Self {
        self.delay = secs;
        self
    }

    pub fn ease(mut self, ease: impl Into<Ease>) -> Self {
        self.ease = ease.into();
        self
    }

    /// Bind to a concrete element; `None` when the group lacks the part.
    pub fn bind(&self, group: &ElementGroup) -> Option<Tween> {
        let target = group.part(self.part)?;
        Some(Tween {
            target,
            property: self.property,
            from: self.from,
            to: self.to,
            duration: self.duration.max(0.0),
            ease: self.ease,
        })
    }
}

/// Lay specs out in parallel, each starting at its own delay.
pub fn timeline_from_specs(specs: &[TweenSpec], group: &ElementGroup) -> Timeline {
    let mut timeline = Timeline::new();
    for spec in specs {
        if let Some(tween) = spec.bind(group) {
            timeline.add(tween, Position::At(spec.delay.max(0.0)));
        }
    }
    timeline
}

/// Pointer position relative to an element's box; both axes in [-0.5, 0.5].
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointerPos {
    pub x: f32,
    pub y: f32,
}

/// Client-space rectangle.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl PointerPos {
    pub fn within(client_x: f32, client_y: f32, rect: Rect) -> Self {
        let norm = |offset: f32, size: f32| {
            if size > 0.0 {
                (offset / size - 0.5).clamp(-0.5, 0.5)
            } else {
                0.0
            }
        };
        Self {
            x: norm(client_x - rect.left, rect.width),
            y: norm(client_y - rect.top, rect.height),
        }
    }
}

/// Pointer-driven 3D tilt while an effect is entered.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointerTilt {
    /// Root rotation at the box edge, degrees.
    pub root_degrees: f32,
    pub image_degrees: f32,
    pub image_scale: f32,
    pub image_opacity: f32,
    #[serde(default = "default_duration")]
    pub duration: f32,
    #[serde(default)]
    pub ease: Ease,
}

impl Default for PointerTilt {
    fn default() -> Self {
        Self {
            root_degrees: 10.0,
            image_degrees: 5.0,
            image_scale: 1.1,
            image_opacity: 0.9,
            duration: 0.4,
            ease: Ease::PowerOut(1),
        }
    }
}

#[derive(Clone, Debug)]
struct Chase {
    target: ElementId,
    property: Property,
    from: f32,
    to: f32,
    elapsed: f32,
}

/// Retargetable tweens that follow the pointer ("quick-to").
///
/// Each move restarts the affected properties from their current value, so a
/// stream of pointer events never stacks animations.
#[derive(Clone, Debug)]
pub struct PointerFollower {
    tilt: PointerTilt,
    group: ElementGroup,
    chases: Vec<Chase>,
}

impl PointerFollower {
    pub fn new(tilt: PointerTilt, group: ElementGroup) -> Self {
        Self {
            tilt,
            group,
            chases: Vec::new(),
        }
    }

    fn goals(&self, pos: PointerPos) -> Vec<(ElementId, Property, f32)> {
        let tilt = &self.tilt;
        let mut goals = vec![
            (self.group.root, Property::RotationY, pos.x * tilt.root_degrees),
            (self.group.root, Property::RotationX, -pos.y * tilt.root_degrees),
        ];
        if let Some(image) = self.group.image {
            goals.extend([
                (image, Property::RotationY, pos.x * tilt.image_degrees),
                (image, Property::RotationX, -pos.y * tilt.image_degrees),
                (image, Property::Scale, tilt.image_scale),
                (image, Property::Opacity, tilt.image_opacity),
            ]);
        }
        goals
    }

    /// Properties the follower may write.
    pub fn targets(&self) -> Vec<(ElementId, Property)> {
        self.goals(PointerPos { x: 0.0, y: 0.0 })
            .into_iter()
            .map(|(el, prop, _)| (el, prop))
            .collect()
    }

    pub fn retarget(&mut self, pos: PointerPos, stage: &Stage) {
        for (target, property, to) in self.goals(pos) {
            let from = stage.get(target, property);
            let chase = Chase {
                target,
                property,
                from,
                to,
                elapsed: 0.0,
            };
            match self
                .chases
                .iter_mut()
                .find(|c| c.target == target && c.property == property)
            {
                Some(existing) => *existing = chase,
                None => self.chases.push(chase),
            }
        }
    }

    pub fn is_settled(&self) -> bool {
        self.chases.is_empty()
    }

    pub fn tick(&mut self, dt: f32, stage: &mut Stage) {
        let duration = self.tilt.duration;
        let ease = self.tilt.ease;
        for chase in self.chases.iter_mut() {
            chase.elapsed += dt.max(0.0);
            let local = if duration <= 0.0 {
                1.0
            } else {
                (chase.elapsed / duration).min(1.0)
            };
            let value = chase.from + (chase.to - chase.from) * ease.apply(local);
            stage.set(chase.target, chase.property, value);
        }
        self.chases
            .retain(|c| duration > 0.0 && c.elapsed < duration);
    }
}

/// What an effect's enter hands to the controller.
#[derive(Debug)]
pub struct EffectRun {
    pub timeline: Timeline,
    /// Pointer listener to install while entered.
    pub pointer: Option<PointerTilt>,
}

impl EffectRun {
    pub fn timeline(timeline: Timeline) -> Self {
        Self {
            timeline,
            pointer: None,
        }
    }
}

pub trait Effect: fmt::Debug + Send + Sync {
    fn name(&self) -> &str;

    /// Build the enter animation. Must not write to the stage.
    fn enter(&self, group: &ElementGroup) -> Result<EffectRun, MotionError>;

    /// Build the animation that returns the group to its resting state.
    fn leave(&self, group: &ElementGroup) -> Result<Timeline, MotionError>;
}

/// Effect that does nothing; stands in for unknown names.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopEffect;

impl Effect for NoopEffect {
    fn name(&self) -> &str {
        "noop"
    }

    fn enter(&self, _group: &ElementGroup) -> Result<EffectRun, MotionError> {
        Ok(EffectRun::timeline(Timeline::new()))
    }

    fn leave(&self, _group: &ElementGroup) -> Result<Timeline, MotionError> {
        Ok(Timeline::new())
    }
}

/// Data-only effect definition, loadable from JSON.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EffectSpec {
    pub name: String,
    pub enter: Vec<TweenSpec>,
    pub leave: Vec<TweenSpec>,
    #[serde(default)]
    pub pointer: Option<PointerTilt>,
}

impl EffectSpec {
    pub fn from_json_str(text: &str) -> Result<Vec<EffectSpec>, MotionError> {
        Ok(serde_json::from_str(text)?)
    }
}

impl Effect for EffectSpec {
    fn name(&self) -> &str {
        &self.name
    }

    fn enter(&self, group: &ElementGroup) -> Result<EffectRun, MotionError> {
        Ok(EffectRun {
            timeline: timeline_from_specs(&self.enter, group),
            pointer: self.pointer.clone(),
        })
    }

    fn leave(&self, group: &ElementGroup) -> Result<Timeline, MotionError> {
        Ok(timeline_from_specs(&self.leave, group))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) {
        assert!((a - b).abs() <= 1e-4, "left={a} right={b}");
    }

    #[test]
    fn specs_skip_missing_parts() {
        let mut stage = Stage::new();
        let group = ElementGroup::single(stage.spawn(&[]));
        let tl = timeline_from_specs(
            &[
                TweenSpec::new(Part::Root, Property::Y, -10.0).duration(0.4),
                TweenSpec::new(Part::Image, Property::Scale, 1.1),
            ],
            &group,
        );
        assert_eq!(tl.targets(), vec![(group.root, Property::Y)]);
    }

    #[test]
    fn delays_become_start_times() {
        let mut stage = Stage::new();
        let group = ElementGroup::spawn_card(&mut stage);
        let tl = timeline_from_specs(
            &[
                TweenSpec::new(Part::Content, Property::Opacity, 1.0).duration(0.4),
                TweenSpec::new(Part::Cta, Property::Opacity, 1.0)
                    .duration(0.4)
                    .delay(0.1),
            ],
            &group,
        );
        approx(tl.duration(), 0.5);
    }

    #[test]
    fn pointer_pos_is_centred() {
        let rect = Rect {
            left: 100.0,
            top: 50.0,
            width: 200.0,
            height: 100.0,
        };
        let p = PointerPos::within(300.0, 50.0, rect);
        approx(p.x, 0.5);
        approx(p.y, -0.5);
        let centre = PointerPos::within(200.0, 100.0, rect);
        approx(centre.x, 0.0);
        approx(centre.y, 0.0);
    }

    #[test]
    fn follower_retargets_from_current_value() {
        let mut stage = Stage::new();
        let group = ElementGroup::spawn_card(&mut stage);
        let mut follower = PointerFollower::new(
            PointerTilt {
                ease: Ease::Linear,
                ..PointerTilt::default()
            },
            group.clone(),
        );
        follower.retarget(PointerPos { x: 0.5, y: 0.0 }, &stage);
        follower.tick(0.2, &mut stage);
        approx(stage.get(group.root, Property::RotationY), 2.5);
        follower.retarget(PointerPos { x: -0.5, y: 0.0 }, &stage);
        follower.tick(0.4, &mut stage);
        approx(stage.get(group.root, Property::RotationY), -5.0);
        assert!(follower.is_settled());
    }

    #[test]
    fn effect_spec_json() {
        let specs = EffectSpec::from_json_str(
            r#"[{
                "name": "lift",
                "enter": [{ "part": "root", "property": "y", "to": -10, "ease": "power2.out" }],
                "leave": [{ "part": "root", "property": "y", "to": 0, "duration": 0.3 }]
            }]"#,
        )
        .unwrap();
        assert_eq!(specs[0].enter[0].ease, Ease::PowerOut(2));
        assert_eq!(specs[0].enter[0].duration, DEFAULT_DURATION);
        assert!(specs[0].pointer.is_none());
    }
}
