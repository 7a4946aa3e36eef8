//! Frame cost of the home page: hero carousel plus hovered cards at 60 Hz.

use std::hint::black_box;
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion};
use muse_motion::{
    Card, Carousel, CarouselConfig, EffectRegistry, NoMedia, PointerPos, RevealConfig,
    ScrollGeometry, Slide, Stage,
};

const FRAME: f32 = 1.0 / 60.0;

fn slides() -> Vec<Slide> {
    let json = muse_test_fixtures::decks::json("video-slides").expect("deck fixture");
    Slide::list_from_json_str(&json).expect("deck parses")
}

fn bench_carousel(c: &mut Criterion) {
    let mut group = c.benchmark_group("carousel_tick");
    let config = CarouselConfig {
        auto_advance_secs: 0.5,
        ..CarouselConfig::default()
    };

    group.bench_function("ten_seconds_of_frames", |b| {
        b.iter(|| {
            let mut stage = Stage::new();
            let mut carousel =
                Carousel::new(slides(), config.clone(), NoMedia, &mut stage).expect("carousel");
            for _ in 0..600 {
                carousel.tick(FRAME, &mut stage);
                black_box(stage.take_changes());
            }
            black_box(carousel.state());
        });
    });

    group.finish();
}

fn bench_page(c: &mut Criterion) {
    let mut group = c.benchmark_group("carousel_tick");
    let registry = Arc::new(EffectRegistry::with_builtin());
    let effects = ["fadeUp", "glow", "rotate3D", "glow"];

    group.bench_function("page_with_cards", |b| {
        b.iter(|| {
            let mut stage = Stage::new();
            let mut carousel =
                Carousel::new(slides(), CarouselConfig::default(), NoMedia, &mut stage)
                    .expect("carousel");
            let mut cards: Vec<Card> = effects
                .iter()
                .map(|name| {
                    Card::mount(*name, Arc::clone(&registry), RevealConfig::default(), &mut stage)
                        .expect("card")
                })
                .collect();
            let geometry = ScrollGeometry {
                element_top: 300.0,
                element_bottom: 684.0,
                viewport_height: 900.0,
            };
            for card in cards.iter_mut() {
                card.scrolled(geometry, &mut stage);
            }

            for frame in 0..600usize {
                let hovered = (frame / 90) % cards.len();
                if frame % 90 == 0 {
                    for (i, card) in cards.iter_mut().enumerate() {
                        let _ = if i == hovered {
                            card.pointer_enter(&mut stage)
                        } else {
                            card.pointer_leave(&mut stage)
                        };
                    }
                }
                let x = (frame % 60) as f32 / 60.0 - 0.5;
                let _ = cards[hovered].pointer_move(PointerPos { x, y: 0.1 }, &stage);

                carousel.tick(FRAME, &mut stage);
                for card in cards.iter_mut() {
                    card.tick(FRAME, &mut stage);
                }
                black_box(stage.take_changes());
            }
            for card in cards.iter_mut() {
                card.unmount(&mut stage);
            }
            carousel.unmount(&mut stage);
        });
    });

    group.finish();
}

criterion_group!(benches, bench_carousel, bench_page);
criterion_main!(benches);
