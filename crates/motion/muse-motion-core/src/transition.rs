//! Per-element interaction lifecycle.
//!
//! State machine: `Idle -> Entering -> Entered -> Leaving -> Idle`, plus a
//! terminal `Disposed`. The controller holds at most one running timeline for
//! its element: the active effect's enter timeline (inside its [`Disposer`]) or
//! the leave timeline, never both. A new enter always disposes the previous
//! effect before the next effect's `enter` runs.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::effect::{Effect, ElementGroup, PointerFollower, PointerPos};
use crate::error::MotionError;
use crate::events::MotionEvent;
use crate::ids::ElementId;
use crate::registry::EffectRegistry;
use crate::stage::{Property, Stage};
use crate::timeline::{Position, Snap, Timeline, Tween};

/// Duration used for properties an effect's leave does not restore itself.
const RESTORE_SECS: f32 = 0.4;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InteractionState {
    Idle,
    Entering,
    Entered,
    Leaving,
    Disposed,
}

/// Lifetime counters; `enters == disposals` whenever the element is at rest.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionStats {
    pub enters: usize,
    pub disposals: usize,
    pub failures: usize,
}

/// How a disposer leaves the element.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Release {
    /// Write the values captured before the effect entered.
    Restore,
    /// Stop in place; a leave timeline takes over.
    Handoff,
}

/// Everything one `enter` allocated. Consumed exactly once.
#[must_use = "a disposer must be disposed to undo its effect"]
pub struct Disposer {
    /// Name the host asked for; differs from the effect's own name for
    /// aliases and for the no-op fallback.
    requested: String,
    effect: Arc<dyn Effect>,
    timeline: Timeline,
    follower: Option<PointerFollower>,
    baseline: Vec<(ElementId, Property, f32)>,
}

impl std::fmt::Debug for Disposer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Disposer")
            .field("requested", &self.requested)
            .field("effect", &self.effect.name())
            .field("timeline", &self.timeline.state())
            .field("pointer", &self.follower.is_some())
            .finish()
    }
}

impl Disposer {
    pub fn effect_name(&self) -> &str {
        self.effect.name()
    }

    fn dispose(
        mut self,
        release: Release,
        stage: &mut Stage,
    ) -> (Arc<dyn Effect>, Vec<(ElementId, Property, f32)>) {
        self.timeline.kill(Snap::Hold, stage);
        self.follower = None;
        if release == Release::Restore {
            for &(element, property, value) in &self.baseline {
                stage.set(element, property, value);
            }
        }
        (self.effect, self.baseline)
    }
}

#[derive(Debug)]
struct Leaving {
    effect: String,
    timeline: Timeline,
}

#[derive(Debug)]
pub struct TransitionController {
    group: ElementGroup,
    registry: Arc<EffectRegistry>,
    state: InteractionState,
    active: Option<Disposer>,
    leaving: Option<Leaving>,
    stats: InteractionStats,
    events: Vec<MotionEvent>,
}

impl TransitionController {
    pub fn new(group: ElementGroup, registry: Arc<EffectRegistry>) -> Self {
        Self {
            group,
            registry,
            state: InteractionState::Idle,
            active: None,
            leaving: None,
            stats: InteractionStats::default(),
            events: Vec::new(),
        }
    }

    #[inline]
    pub fn state(&self) -> InteractionState {
        self.state
    }

    #[inline]
    pub fn stats(&self) -> InteractionStats {
        self.stats
    }

    pub fn group(&self) -> &ElementGroup {
        &self.group
    }

    /// Name of the effect currently entering or entered.
    pub fn active_effect(&self) -> Option<&str> {
        self.active.as_ref().map(Disposer::effect_name)
    }

    /// Number of timelines currently playing for this element (0 or 1).
    pub fn running_timelines(&self) -> usize {
        let entering = self
            .active
            .as_ref()
            .map_or(false, |d| d.timeline.is_active());
        let leaving = self
            .leaving
            .as_ref()
            .map_or(false, |l| l.timeline.is_active());
        usize::from(entering) + usize::from(leaving)
    }

    pub fn drain_events(&mut self) -> Vec<MotionEvent> {
        std::mem::take(&mut self.events)
    }

    fn ensure_live(&self) -> Result<(), MotionError> {
        if self.state == InteractionState::Disposed {
            log::warn!("interaction on disposed element {:?}", self.group.root);
            return Err(MotionError::DisposedElement {
                element: self.group.root,
            });
        }
        Ok(())
    }

    fn report(&mut self, error: MotionError) {
        self.events.push(MotionEvent::Error { error });
    }

    fn release(
        &mut self,
        disposer: Disposer,
        release: Release,
        stage: &mut Stage,
    ) -> (Arc<dyn Effect>, Vec<(ElementId, Property, f32)>) {
        self.stats.disposals += 1;
        log::debug!(
            "disposing '{}' on {:?} ({:?})",
            disposer.effect_name(),
            self.group.root,
            release
        );
        disposer.dispose(release, stage)
    }

    /// Pointer entered the element.
    pub fn on_enter(&mut self, effect_name: &str, stage: &mut Stage) -> Result<(), MotionError> {
        self.ensure_live()?;
        if matches!(
            self.state,
            InteractionState::Entering | InteractionState::Entered
        ) && self
            .active
            .as_ref()
            .map_or(false, |active| active.requested == effect_name)
        {
            return Ok(());
        }

        if let Some(previous) = self.active.take() {
            self.release(previous, Release::Restore, stage);
        }
        if let Some(mut leaving) = self.leaving.take() {
            leaving.timeline.kill(Snap::End, stage);
        }

        let effect = match self.registry.resolve(effect_name) {
            Ok(effect) => effect,
            Err(err) => {
                log::warn!("{err}; element {:?} stays static", self.group.root);
                self.report(err);
                self.registry.noop()
            }
        };

        let run = match effect.enter(&self.group) {
            Ok(run) => run,
            Err(err) => {
                self.fail(effect, err, None, stage);
                return Ok(());
            }
        };

        let follower = run
            .pointer
            .map(|tilt| PointerFollower::new(tilt, self.group.clone()));
        let mut keys = run.timeline.targets();
        if let Some(f) = &follower {
            for key in f.targets() {
                if !keys.contains(&key) {
                    keys.push(key);
                }
            }
        }
        let baseline = keys
            .into_iter()
            .map(|(element, property)| (element, property, stage.get(element, property)))
            .collect();

        let mut timeline = run.timeline;
        // Freshly built timelines are never killed.
        let _ = timeline.play();
        self.active = Some(Disposer {
            requested: effect_name.to_string(),
            effect: Arc::clone(&effect),
            timeline,
            follower,
            baseline,
        });
        self.stats.enters += 1;
        self.state = InteractionState::Entering;
        self.events.push(MotionEvent::EffectStarted {
            element: self.group.root,
            effect: effect.name().to_string(),
        });
        log::debug!("'{}' entering on {:?}", effect.name(), self.group.root);

        self.advance_enter(0.0, stage);
        Ok(())
    }

    /// Pointer left the element. A second call in a row is a no-op.
    pub fn on_leave(&mut self, stage: &mut Stage) -> Result<(), MotionError> {
        self.ensure_live()?;
        if matches!(
            self.state,
            InteractionState::Idle | InteractionState::Leaving
        ) {
            return Ok(());
        }
        let Some(active) = self.active.take() else {
            self.state = InteractionState::Idle;
            return Ok(());
        };

        let (effect, baseline) = self.release(active, Release::Handoff, stage);
        let mut timeline = match effect.leave(&self.group) {
            Ok(timeline) => timeline,
            Err(err) => {
                self.fail(effect, err, Some(baseline.as_slice()), stage);
                return Ok(());
            }
        };

        let covered = timeline.targets();
        for (element, property, value) in baseline {
            if !covered.contains(&(element, property)) {
                timeline.add(
                    Tween::to(element, property, value).duration(RESTORE_SECS),
                    Position::At(0.0),
                );
            }
        }
        let _ = timeline.play();
        self.state = InteractionState::Leaving;
        self.events.push(MotionEvent::EffectLeaving {
            element: self.group.root,
            effect: effect.name().to_string(),
        });
        self.leaving = Some(Leaving {
            effect: effect.name().to_string(),
            timeline,
        });
        self.advance_leave(0.0, stage);
        Ok(())
    }

    /// Pointer moved within the element; only pointer-tracking effects react.
    pub fn on_pointer_move(&mut self, pos: PointerPos, stage: &Stage) -> Result<(), MotionError> {
        self.ensure_live()?;
        if let Some(follower) = self
            .active
            .as_mut()
            .and_then(|active| active.follower.as_mut())
        {
            follower.retarget(pos, stage);
        }
        Ok(())
    }

    /// Put the element back at rest without animating and return to `Idle`.
    /// Used when another animation needs the element to itself.
    pub fn reset(&mut self, stage: &mut Stage) -> Result<(), MotionError> {
        self.ensure_live()?;
        if self.state == InteractionState::Idle {
            return Ok(());
        }
        if let Some(active) = self.active.take() {
            self.release(active, Release::Restore, stage);
        }
        if let Some(mut leaving) = self.leaving.take() {
            leaving.timeline.kill(Snap::End, stage);
        }
        self.state = InteractionState::Idle;
        self.events.push(MotionEvent::EffectLeft {
            element: self.group.root,
        });
        log::debug!("reset interaction on {:?}", self.group.root);
        Ok(())
    }

    /// Element unmount: restore the resting state and stop all writes.
    pub fn on_dispose(&mut self, stage: &mut Stage) {
        if self.state == InteractionState::Disposed {
            return;
        }
        if let Some(active) = self.active.take() {
            self.release(active, Release::Restore, stage);
        }
        if let Some(mut leaving) = self.leaving.take() {
            leaving.timeline.kill(Snap::End, stage);
        }
        self.state = InteractionState::Disposed;
        self.events.push(MotionEvent::ElementDisposed {
            element: self.group.root,
        });
        log::debug!("disposed interaction controller for {:?}", self.group.root);
    }

    pub fn tick(&mut self, dt: f32, stage: &mut Stage) {
        match self.state {
            InteractionState::Entering | InteractionState::Entered => self.advance_enter(dt, stage),
            InteractionState::Leaving => self.advance_leave(dt, stage),
            InteractionState::Idle | InteractionState::Disposed => {}
        }
    }

    fn advance_enter(&mut self, dt: f32, stage: &mut Stage) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        let completed = active.timeline.advance(dt, stage).completed;
        if let Some(follower) = active.follower.as_mut() {
            follower.tick(dt, stage);
        }
        if completed && self.state == InteractionState::Entering {
            self.state = InteractionState::Entered;
            let effect = active.effect_name().to_string();
            self.events.push(MotionEvent::EffectEntered {
                element: self.group.root,
                effect,
            });
        }
    }

    fn advance_leave(&mut self, dt: f32, stage: &mut Stage) {
        let Some(leaving) = self.leaving.as_mut() else {
            return;
        };
        if leaving.timeline.advance(dt, stage).completed {
            log::debug!("'{}' left {:?}", leaving.effect, self.group.root);
            self.leaving = None;
            self.state = InteractionState::Idle;
            self.events.push(MotionEvent::EffectLeft {
                element: self.group.root,
            });
        }
    }

    /// A callback failed: snap to the resting state and go idle.
    fn fail(
        &mut self,
        effect: Arc<dyn Effect>,
        err: MotionError,
        baseline: Option<&[(ElementId, Property, f32)]>,
        stage: &mut Stage,
    ) {
        let err = match err {
            failed @ MotionError::EffectFailed { .. } => failed,
            other => MotionError::EffectFailed {
                effect: effect.name().to_string(),
                reason: other.to_string(),
            },
        };
        log::error!("{err} on {:?}", self.group.root);
        self.stats.failures += 1;
        self.report(err);

        let leave = match baseline {
            // Leave already failed; fall back to the captured values.
            Some(_) => None,
            None => effect.leave(&self.group).ok(),
        };
        if let Some(mut timeline) = leave {
            let _ = timeline.play();
            timeline.kill(Snap::End, stage);
        }
        if let Some(values) = baseline {
            for &(element, property, value) in values {
                stage.set(element, property, value);
            }
        }
        self.state = InteractionState::Idle;
        self.events.push(MotionEvent::EffectLeft {
            element: self.group.root,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (Stage, TransitionController) {
        let mut stage = Stage::new();
        let group = ElementGroup::spawn_card(&mut stage);
        let ctrl = TransitionController::new(group, Arc::new(EffectRegistry::with_builtin()));
        (stage, ctrl)
    }

    #[test]
    fn enter_settles_into_entered() {
        let (mut stage, mut ctrl) = setup();
        ctrl.on_enter("fadeUp", &mut stage).unwrap();
        assert_eq!(ctrl.state(), InteractionState::Entering);
        ctrl.tick(1.0, &mut stage);
        assert_eq!(ctrl.state(), InteractionState::Entered);
        let root = ctrl.group().root;
        assert!((stage.get(root, Property::Y) + 10.0).abs() < 1e-4);
    }

    #[test]
    fn same_effect_reenter_is_ignored() {
        let (mut stage, mut ctrl) = setup();
        ctrl.on_enter("glow", &mut stage).unwrap();
        ctrl.on_enter("glow", &mut stage).unwrap();
        assert_eq!(ctrl.stats().enters, 1);
        assert_eq!(ctrl.stats().disposals, 0);
    }

    #[test]
    fn aliased_effect_reenter_is_ignored() {
        let mut stage = Stage::new();
        let group = ElementGroup::spawn_card(&mut stage);
        let mut registry = EffectRegistry::with_builtin();
        let glow = registry.resolve("glow").unwrap();
        registry.register("shine", glow).unwrap();
        let mut ctrl = TransitionController::new(group, Arc::new(registry));

        ctrl.on_enter("shine", &mut stage).unwrap();
        ctrl.tick(0.1, &mut stage);
        ctrl.on_enter("shine", &mut stage).unwrap();
        assert_eq!(ctrl.stats().enters, 1);
        assert_eq!(ctrl.stats().disposals, 0);
        assert_eq!(ctrl.active_effect(), Some("glow"));
    }

    #[test]
    fn unknown_effect_reenter_reports_once() {
        let (mut stage, mut ctrl) = setup();
        ctrl.on_enter("sparkle", &mut stage).unwrap();
        ctrl.on_enter("sparkle", &mut stage).unwrap();
        assert_eq!(ctrl.stats().enters, 1);
        assert_eq!(ctrl.stats().disposals, 0);
        let errors = ctrl
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, MotionEvent::Error { .. }))
            .count();
        assert_eq!(errors, 1);
    }

    #[test]
    fn reset_restores_rest_without_disposing_the_controller() {
        let (mut stage, mut ctrl) = setup();
        let root = ctrl.group().root;
        ctrl.on_enter("fadeUp", &mut stage).unwrap();
        ctrl.tick(0.2, &mut stage);
        ctrl.reset(&mut stage).unwrap();
        assert_eq!(ctrl.state(), InteractionState::Idle);
        assert_eq!(ctrl.running_timelines(), 0);
        assert!(stage.get(root, Property::Y).abs() < 1e-4);
        let stats = ctrl.stats();
        assert_eq!(stats.enters, stats.disposals);

        ctrl.on_enter("glow", &mut stage).unwrap();
        assert_eq!(ctrl.state(), InteractionState::Entering);
    }

    #[test]
    fn unknown_effect_is_a_static_noop() {
        let (mut stage, mut ctrl) = setup();
        ctrl.on_enter("sparkle", &mut stage).unwrap();
        assert_eq!(ctrl.state(), InteractionState::Entered);
        assert_eq!(ctrl.active_effect(), Some("noop"));
        let events = ctrl.drain_events();
        assert!(events.iter().any(|e| matches!(
            e,
            MotionEvent::Error {
                error: MotionError::UnknownEffect { .. }
            }
        )));
    }

    #[test]
    fn double_leave_is_idempotent() {
        let (mut stage, mut ctrl) = setup();
        ctrl.on_enter("fadeUp", &mut stage).unwrap();
        ctrl.on_leave(&mut stage).unwrap();
        let stats = ctrl.stats();
        ctrl.on_leave(&mut stage).unwrap();
        assert_eq!(ctrl.stats(), stats);
        assert_eq!(ctrl.state(), InteractionState::Leaving);
        ctrl.tick(1.0, &mut stage);
        assert_eq!(ctrl.state(), InteractionState::Idle);
    }

    #[test]
    fn disposed_controller_rejects_work() {
        let (mut stage, mut ctrl) = setup();
        ctrl.on_dispose(&mut stage);
        let root = ctrl.group().root;
        assert_eq!(
            ctrl.on_enter("glow", &mut stage),
            Err(MotionError::DisposedElement { element: root })
        );
        assert_eq!(ctrl.stats().enters, 0);
    }
}
