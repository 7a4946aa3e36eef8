//! Semantic signals emitted by the controllers.
//!
//! Controllers queue these as they change state; hosts drain them once per
//! frame (render active dots, swap captions, forward errors to reporting).

use serde::{Deserialize, Serialize};

use crate::error::MotionError;
use crate::ids::ElementId;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum MotionEvent {
    /// An effect's enter animation started on an element.
    EffectStarted { element: ElementId, effect: String },
    /// The enter animation finished.
    EffectEntered { element: ElementId, effect: String },
    /// The element is animating back to its resting state.
    EffectLeaving { element: ElementId, effect: String },
    /// The element is back at rest.
    EffectLeft { element: ElementId },
    /// Element controller torn down.
    ElementDisposed { element: ElementId },

    TransitionStarted { from: usize, to: usize },
    /// Caption now shows this slide's content.
    ContentSwapped { index: usize },
    IndexChanged { index: usize },
    TransitionEnded { index: usize },
    PlaybackChanged { playing: bool },
    MuteChanged { muted: bool },

    Revealed { element: ElementId },
    Concealed { element: ElementId },

    /// A failure absorbed at a controller boundary.
    Error { error: MotionError },
}
