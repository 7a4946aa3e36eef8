//! One-shot banner entrance played on mount.

use crate::ids::ElementId;
use crate::presets;
use crate::stage::{Property, Stage};
use crate::timeline::{Snap, Timeline};

#[derive(Clone, Debug, PartialEq)]
pub struct BannerElements {
    pub banner: ElementId,
    pub heading: ElementId,
    pub subheading: ElementId,
    pub button: ElementId,
}

impl BannerElements {
    /// Spawn the banner hidden, text lowered by 20px.
    pub fn spawn(stage: &mut Stage) -> Self {
        let hidden_text = [(Property::Opacity, 0.0), (Property::Y, 20.0)];
        Self {
            banner: stage.spawn(&[(Property::Opacity, 0.0)]),
            heading: stage.spawn(&hidden_text),
            subheading: stage.spawn(&hidden_text),
            button: stage.spawn(&hidden_text),
        }
    }
}

#[derive(Debug)]
pub struct Banner {
    elements: BannerElements,
    intro: Timeline,
}

impl Banner {
    /// Spawn the elements and start the entrance.
    pub fn mount(stage: &mut Stage) -> Self {
        let elements = BannerElements::spawn(stage);
        let mut intro = presets::banner_intro(&elements);
        // Fresh timelines are never killed.
        let _ = intro.play();
        Self { elements, intro }
    }

    pub fn elements(&self) -> &BannerElements {
        &self.elements
    }

    pub fn is_settled(&self) -> bool {
        !self.intro.is_active()
    }

    pub fn tick(&mut self, dt: f32, stage: &mut Stage) {
        self.intro.advance(dt, stage);
    }

    /// Finish the entrance instantly; nothing is written afterwards.
    pub fn unmount(&mut self, stage: &mut Stage) {
        if self.intro.is_active() {
            self.intro.kill(Snap::End, stage);
        } else {
            self.intro.kill(Snap::Hold, stage);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intro_settles_everything_visible() {
        let mut stage = Stage::new();
        let mut banner = Banner::mount(&mut stage);
        for _ in 0..200 {
            banner.tick(1.0 / 60.0, &mut stage);
        }
        assert!(banner.is_settled());
        let el = banner.elements().clone();
        for id in [el.banner, el.heading, el.subheading, el.button] {
            assert!((stage.get(id, Property::Opacity) - 1.0).abs() < 1e-4);
        }
        assert!(stage.get(el.heading, Property::Y).abs() < 1e-4);
    }

    #[test]
    fn unmount_mid_intro_snaps_to_final_state() {
        let mut stage = Stage::new();
        let mut banner = Banner::mount(&mut stage);
        banner.tick(1.2, &mut stage);
        banner.unmount(&mut stage);
        let el = banner.elements().clone();
        assert_eq!(stage.get(el.button, Property::Opacity), 1.0);
        let writes = stage.writes_to(el.button);
        banner.tick(1.0, &mut stage);
        assert_eq!(stage.writes_to(el.button), writes);
    }
}
