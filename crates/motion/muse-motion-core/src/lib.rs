//! Muse Motion Core (renderer-agnostic)
//!
//! Timed visual transitions for the Blush & Muse site: an auto-advancing hero
//! carousel, mutually exclusive hover effects on cards, scroll-triggered
//! reveals and the banner entrance. Everything runs on cooperative ticks
//! against a [`Stage`], which records property writes for a host adapter to
//! apply.

pub mod banner;
pub mod card;
pub mod carousel;
pub mod config;
pub mod ease;
pub mod effect;
pub mod error;
pub mod events;
pub mod ids;
pub mod media;
pub mod presets;
pub mod registry;
pub mod reveal;
pub mod stage;
pub mod timeline;
pub mod transition;

// Re-exports for host adapters
pub use banner::{Banner, BannerElements};
pub use card::Card;
pub use carousel::{
    Carousel, CarouselElements, CarouselObserver, CarouselState, MediaKind, Slide, SlideId,
};
pub use config::{CarouselConfig, MotionConfig, RevealConfig};
pub use ease::Ease;
pub use effect::{
    Effect, EffectRun, EffectSpec, ElementGroup, NoopEffect, Part, PointerFollower, PointerPos,
    PointerTilt, Rect, TweenSpec,
};
pub use error::MotionError;
pub use events::MotionEvent;
pub use ids::{CueId, ElementId, ObservationId};
pub use media::{MediaHost, MediaPosition, NoMedia};
pub use registry::EffectRegistry;
pub use reveal::{PropertySet, RevealSpec, RevealState, ScrollGeometry, ScrollRevealController, Zone};
pub use stage::{Change, Property, Stage};
pub use timeline::{PlayState, Position, Snap, Timeline, TimelineTick, Tween};
pub use transition::{Disposer, InteractionState, InteractionStats, TransitionController};

pub type Result<T> = core::result::Result<T, MotionError>;
