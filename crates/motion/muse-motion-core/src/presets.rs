//! The site's stock animations: card hover effects, the card scroll reveal
//! and the banner entrance.

use crate::banner::BannerElements;
use crate::ease::Ease;
use crate::effect::{EffectSpec, Part, PointerTilt, TweenSpec};
use crate::reveal::{PropertySet, RevealSpec};
use crate::stage::Property;
use crate::timeline::{Position, Timeline, Tween};

/// Resting card shadow (small drop shadow).
const REST_SHADOW: f32 = 0.2;

fn spec(part: Part, property: Property, to: f32, duration: f32) -> TweenSpec {
    TweenSpec::new(part, property, to).duration(duration)
}

/// Caption and call-to-action settle in; shared by every hover effect.
fn content_in() -> Vec<TweenSpec> {
    vec![
        spec(Part::Content, Property::Y, 0.0, 0.4),
        spec(Part::Content, Property::Opacity, 1.0, 0.4),
        spec(Part::Content, Property::Scale, 1.0, 0.4),
        spec(Part::Cta, Property::Opacity, 1.0, 0.4).delay(0.1),
        spec(Part::Cta, Property::Y, 0.0, 0.4).delay(0.1),
    ]
}

fn content_out() -> Vec<TweenSpec> {
    vec![
        spec(Part::Content, Property::Y, 10.0, 0.4),
        spec(Part::Content, Property::Opacity, 0.9, 0.4),
        spec(Part::Content, Property::Scale, 0.98, 0.4),
        spec(Part::Cta, Property::Opacity, 0.9, 0.3),
    ]
}

pub fn fade_up() -> EffectSpec {
    let out = Ease::PowerOut(2);
    let mut enter = vec![
        spec(Part::Image, Property::Scale, 1.1, 0.5).ease(out),
        spec(Part::Image, Property::Opacity, 1.0, 0.5).ease(out),
        spec(Part::Root, Property::Shadow, 1.0, 0.4),
        spec(Part::Root, Property::Y, -10.0, 0.4),
    ];
    enter.extend(content_in().into_iter().map(|s| s.ease(out)));

    let mut leave = vec![
        spec(Part::Image, Property::Scale, 1.0, 0.5).ease(out),
        spec(Part::Image, Property::Opacity, 0.7, 0.5).ease(out),
        spec(Part::Root, Property::Shadow, REST_SHADOW, 0.4),
        spec(Part::Root, Property::Y, 0.0, 0.4),
    ];
    leave.extend(content_out());

    EffectSpec {
        name: "fadeUp".into(),
        enter,
        leave,
        pointer: None,
    }
}

pub fn glow() -> EffectSpec {
    let mut enter = vec![
        spec(Part::Image, Property::Brightness, 1.3, 0.5),
        spec(Part::Image, Property::Saturation, 1.2, 0.5),
        spec(Part::Image, Property::Scale, 1.05, 0.5),
        spec(Part::Image, Property::Opacity, 0.9, 0.5),
        spec(Part::Root, Property::Glow, 1.0, 0.5),
        spec(Part::Cta, Property::Glow, 1.0, 0.4).delay(0.1),
    ];
    enter.extend(content_in());

    let mut leave = vec![
        spec(Part::Image, Property::Brightness, 1.0, 0.5),
        spec(Part::Image, Property::Saturation, 1.0, 0.5),
        spec(Part::Image, Property::Scale, 1.0, 0.5),
        spec(Part::Image, Property::Opacity, 0.7, 0.5),
        spec(Part::Root, Property::Glow, 0.0, 0.5),
        spec(Part::Root, Property::Shadow, REST_SHADOW, 0.5),
        spec(Part::Cta, Property::Glow, 0.0, 0.3),
    ];
    leave.extend(content_out());

    EffectSpec {
        name: "glow".into(),
        enter,
        leave,
        pointer: None,
    }
}

/// Pointer-tracking tilt; the image rotation and scale come from the pointer follower.
pub fn rotate_3d() -> EffectSpec {
    let mut enter = vec![
        spec(Part::Root, Property::Shadow, 1.0, 0.5),
        spec(Part::Cta, Property::Glow, 1.0, 0.4).delay(0.1),
    ];
    enter.extend(content_in());

    let settle = Ease::PowerOut(1);
    let mut leave = vec![
        spec(Part::Root, Property::RotationX, 0.0, 0.6).ease(settle),
        spec(Part::Root, Property::RotationY, 0.0, 0.6).ease(settle),
        spec(Part::Image, Property::RotationX, 0.0, 0.6),
        spec(Part::Image, Property::RotationY, 0.0, 0.6),
        spec(Part::Image, Property::Scale, 1.0, 0.6),
        spec(Part::Image, Property::Opacity, 0.7, 0.6),
        spec(Part::Root, Property::Shadow, 0.3, 0.6),
        spec(Part::Cta, Property::Glow, 0.0, 0.3),
    ];
    leave.extend(content_out());

    EffectSpec {
        name: "rotate3D".into(),
        enter,
        leave,
        pointer: Some(PointerTilt::default()),
    }
}

pub fn card_effects() -> Vec<EffectSpec> {
    vec![fade_up(), glow(), rotate_3d()]
}

/// Cards start lowered and transparent, then rise in when scrolled into view.
pub fn card_reveal() -> RevealSpec {
    let out = Ease::PowerOut(2);
    RevealSpec {
        initial: vec![
            PropertySet::new(Part::Root, Property::Opacity, 0.0),
            PropertySet::new(Part::Root, Property::Y, 50.0),
            PropertySet::new(Part::Image, Property::Opacity, 0.7),
            PropertySet::new(Part::Content, Property::Y, 20.0),
            PropertySet::new(Part::Content, Property::Opacity, 0.0),
            PropertySet::new(Part::Content, Property::Scale, 0.95),
            PropertySet::new(Part::Cta, Property::Opacity, 0.0),
            PropertySet::new(Part::Cta, Property::Y, 10.0),
        ],
        reveal: vec![
            spec(Part::Root, Property::Opacity, 1.0, 0.8).ease(out),
            spec(Part::Root, Property::Y, 0.0, 0.8).ease(out),
            spec(Part::Content, Property::Y, 0.0, 0.6).delay(0.2).ease(out),
            spec(Part::Content, Property::Opacity, 1.0, 0.6).delay(0.2).ease(out),
            spec(Part::Content, Property::Scale, 1.0, 0.6).delay(0.2).ease(out),
            spec(Part::Cta, Property::Opacity, 1.0, 0.4).delay(0.3),
            spec(Part::Cta, Property::Y, 0.0, 0.4).delay(0.3),
        ],
    }
}

/// Banner entrance: backdrop, then heading, subheading and button overlapping.
pub fn banner_intro(el: &BannerElements) -> Timeline {
    let mut tl = Timeline::new();
    tl.add(
        Tween::to(el.banner, Property::Opacity, 1.0)
            .duration(1.0)
            .ease(Ease::PowerInOut(2)),
        Position::End,
    );
    for (target, duration, ease, position) in [
        (el.heading, 0.8, Ease::BackOut(1.2), Position::End),
        (el.subheading, 0.8, Ease::BackOut(1.0), Position::Offset(-0.4)),
        (el.button, 0.6, Ease::PowerOut(3), Position::Offset(-0.2)),
    ] {
        tl.add(
            Tween::to(target, Property::Opacity, 1.0)
                .duration(duration)
                .ease(ease),
            position,
        )
        .add(
            Tween::to(target, Property::Y, 0.0)
                .duration(duration)
                .ease(ease),
            Position::WithPrevious,
        );
    }
    tl
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::Stage;

    #[test]
    fn only_rotate_3d_tracks_the_pointer() {
        assert!(fade_up().pointer.is_none());
        assert!(glow().pointer.is_none());
        assert!(rotate_3d().pointer.is_some());
    }

    #[test]
    fn banner_overlaps_follow_the_site() {
        let mut stage = Stage::new();
        let el = BannerElements::spawn(&mut stage);
        let tl = banner_intro(&el);
        // 1.0 banner + 0.8 heading, subheading -0.4 (ends 2.2), button -0.2 (ends 2.6)
        assert!((tl.duration() - 2.6).abs() < 1e-4, "{}", tl.duration());
    }
}
