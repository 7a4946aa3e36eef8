//! Interactive card: hover effect plus scroll reveal over one element group.
//!
//! The two never animate the elements together. Hovering finishes a running
//! reveal first. A scroll that starts the reveal or conceal puts a hovered
//! card back at rest, and the hover resumes once the card is revealed again
//! if the pointer is still inside.

use std::sync::Arc;

use crate::config::RevealConfig;
use crate::effect::{ElementGroup, PointerPos};
use crate::error::MotionError;
use crate::events::MotionEvent;
use crate::presets;
use crate::registry::EffectRegistry;
use crate::reveal::{RevealState, ScrollGeometry, ScrollRevealController};
use crate::stage::Stage;
use crate::transition::{InteractionState, TransitionController};

#[derive(Debug)]
pub struct Card {
    effect: String,
    hover: TransitionController,
    reveal: ScrollRevealController,
    pointer_inside: bool,
    resume_hover: bool,
}

impl Card {
    /// Spawn the card's elements hidden, waiting to scroll into view.
    pub fn mount(
        effect: impl Into<String>,
        registry: Arc<EffectRegistry>,
        reveal: RevealConfig,
        stage: &mut Stage,
    ) -> Result<Self, MotionError> {
        let group = ElementGroup::spawn_card(stage);
        let reveal =
            ScrollRevealController::new(group.clone(), &presets::card_reveal(), reveal, stage)?;
        Ok(Self {
            effect: effect.into(),
            hover: TransitionController::new(group, registry),
            reveal,
            pointer_inside: false,
            resume_hover: false,
        })
    }

    pub fn group(&self) -> &ElementGroup {
        self.hover.group()
    }

    pub fn effect(&self) -> &str {
        &self.effect
    }

    pub fn hover(&self) -> &TransitionController {
        &self.hover
    }

    pub fn interaction(&self) -> InteractionState {
        self.hover.state()
    }

    pub fn reveal_state(&self) -> RevealState {
        self.reveal.state()
    }

    pub fn pointer_enter(&mut self, stage: &mut Stage) -> Result<(), MotionError> {
        if self.hover.state() == InteractionState::Disposed {
            return self.hover.on_enter(&self.effect, stage);
        }
        self.pointer_inside = true;
        self.resume_hover = false;
        self.reveal.finish(stage);
        self.hover.on_enter(&self.effect, stage)
    }

    pub fn pointer_leave(&mut self, stage: &mut Stage) -> Result<(), MotionError> {
        self.pointer_inside = false;
        self.resume_hover = false;
        self.hover.on_leave(stage)
    }

    pub fn pointer_move(&mut self, pos: PointerPos, stage: &Stage) -> Result<(), MotionError> {
        self.hover.on_pointer_move(pos, stage)
    }

    pub fn scrolled(&mut self, geometry: ScrollGeometry, stage: &mut Stage) {
        if self.reveal.would_animate(geometry) && self.hover.state() != InteractionState::Idle {
            // Only fails once disposed, and then the reveal ignores geometry too.
            if self.hover.reset(stage).is_ok() {
                self.resume_hover = self.pointer_inside;
            }
        }
        self.reveal.observe(geometry, stage);
    }

    pub fn tick(&mut self, dt: f32, stage: &mut Stage) {
        self.reveal.tick(dt, stage);
        if self.resume_hover && self.reveal.state() == RevealState::Revealed {
            self.resume_hover = false;
            if let Err(err) = self.hover.on_enter(&self.effect, stage) {
                log::warn!("hover not resumed on {:?}: {err}", self.group().root);
            }
        }
        self.hover.tick(dt, stage);
    }

    /// Reveal and hover events, in that order.
    pub fn drain_events(&mut self) -> Vec<MotionEvent> {
        let mut events = self.reveal.drain_events();
        events.extend(self.hover.drain_events());
        events
    }

    pub fn unmount(&mut self, stage: &mut Stage) {
        self.pointer_inside = false;
        self.resume_hover = false;
        self.hover.on_dispose(stage);
        self.reveal.dispose(stage);
    }
}
