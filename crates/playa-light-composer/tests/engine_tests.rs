//! Integration tests for the `LightEngine` scene handling and render steps.

use embassy_time::Instant;
use playa_light_composer::{
    Effect, EngineError, FrameRecorder, LightEngine, PaletteId, PixelSink, Rgb, Scene,
    StripSink, color::WHITE, color_from_palette, palette::PALETTE_SIZE, scene::EffectId,
};

const RED: Rgb = Rgb { r: 255, g: 0, b: 0 };
const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

fn at(ms: u64) -> Instant {
    Instant::from_millis(ms)
}

fn strip(len: usize) -> StripSink<FrameRecorder> {
    StripSink::new(FrameRecorder::default(), len)
}

/// Sink that remembers every solid color and buffer head it was asked to show
#[derive(Default)]
struct ShownColorSink {
    pixels: Vec<Rgb>,
    shown: Vec<Rgb>,
}

impl ShownColorSink {
    fn new(len: usize) -> Self {
        Self {
            pixels: vec![Rgb::default(); len],
            shown: Vec::new(),
        }
    }
}

impl PixelSink for ShownColorSink {
    fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    fn pixels_mut(&mut self) -> &mut [Rgb] {
        &mut self.pixels
    }

    fn show_color(&mut self, color: Rgb, _brightness: u8) {
        self.shown.push(color);
    }

    fn show(&mut self, _brightness: u8) {
        let head = self.pixels.first().copied().unwrap_or_default();
        self.shown.push(head);
    }
}

// -----------------------------------------------------------------------------
// Sinks
// -----------------------------------------------------------------------------

#[test]
fn sink_limit_is_enforced() {
    let mut sinks: Vec<StripSink<FrameRecorder>> = (0..9).map(|_| strip(4)).collect();
    let mut engine = LightEngine::new();

    let results: Vec<_> = sinks
        .iter_mut()
        .map(|sink| engine.add_sink(sink))
        .collect();

    assert!(results[..8].iter().all(Result::is_ok));
    assert_eq!(results[8], Err(EngineError::TooManySinks));
    assert_eq!(engine.sink_count(), 8);
    assert_eq!(engine.total_pixels(), 32);
}

#[test]
fn render_without_sinks_is_harmless() {
    let mut engine = LightEngine::new();
    engine.fire_plasma(10, 100, PaletteId::Lava);
    engine.palette_cycle(PaletteId::Heart, 10);
    engine.render(at(0));
    engine.color_explosion(10, 0, PaletteId::Nebula);
    engine.render(at(600));

    assert!(engine.heat().is_empty());
}

// -----------------------------------------------------------------------------
// Scene updates
// -----------------------------------------------------------------------------

#[test]
fn identical_setter_call_is_a_no_op() {
    let mut first = strip(6);
    let mut second = strip(4);
    let mut engine = LightEngine::new();
    engine.add_sink(&mut first).unwrap();
    engine.add_sink(&mut second).unwrap();

    engine.fire_plasma(30, 40, PaletteId::Flame);
    assert!(engine.scene_changed());
    engine.render(at(0));
    assert!(!engine.scene_changed());

    let heat = engine.heat().to_vec();
    engine.fire_plasma(30, 40, PaletteId::Flame);

    assert!(!engine.scene_changed());
    assert_eq!(engine.heat(), heat.as_slice());
}

#[test]
fn fire_heat_is_seeded_for_every_pixel() {
    let mut first = strip(7);
    let mut second = strip(5);
    let mut engine = LightEngine::new().with_seed(42);
    engine.add_sink(&mut first).unwrap();
    engine.add_sink(&mut second).unwrap();

    engine.fire_plasma(20, 80, PaletteId::Lava);

    assert_eq!(engine.heat().len(), 12);
    assert!(engine.heat().iter().all(|cell| *cell < 100));
}

#[test]
fn meteor_phases_match_meteor_count() {
    let mut sink = strip(30);
    let mut engine = LightEngine::new();
    engine.add_sink(&mut sink).unwrap();

    engine.meteor_shower(40, 5, 8, PaletteId::Nebula);
    assert_eq!(engine.meteor_phases().len(), 5);

    engine.solid(RED);
    assert!(engine.meteor_phases().is_empty());
}

#[test]
fn brightness_survives_effect_changes() {
    let mut engine = LightEngine::new();
    engine.set_brightness(90);
    engine.solid(RED);
    engine.palette_stream(20, PaletteId::Sunset, false);

    assert_eq!(engine.brightness(), 90);
    assert_eq!(engine.scene().brightness, 90);
}

#[test]
fn same_brightness_does_not_mark_scene_changed() {
    let mut engine = LightEngine::new();
    engine.render(at(0));
    engine.set_brightness(255);
    assert!(!engine.scene_changed());

    engine.set_brightness(10);
    assert!(engine.scene_changed());
}

#[test]
fn set_speed_updates_effect_duration() {
    let mut engine = LightEngine::new();
    engine.palette_cycle(PaletteId::Cool, 100);
    engine.set_speed(20);

    assert_eq!(engine.speed(), 20);
    assert_eq!(engine.scene().effect.duration(), Some(20));
}

#[test]
fn sync_update_adopts_differing_fields() {
    let mut engine = LightEngine::new();
    engine.solid(RED);
    engine.render(at(0));

    let mut incoming = Scene::new(Effect::PaletteStream {
        palette: PaletteId::Vivid,
        duration: 40,
        direction: false,
    });
    incoming.brightness = 80;
    engine.apply_sync_update(&incoming);

    let scene = engine.scene();
    assert_eq!(scene.effect_id(), EffectId::PaletteStream);
    assert_eq!(scene.brightness, 80);
    assert_eq!(scene.primary_palette, PaletteId::Vivid);
    assert_eq!(scene.speed, 40);
    assert!(!scene.direction);
    assert!(engine.scene_changed());

    engine.render(at(1));
    engine.apply_sync_update(&incoming);
    assert!(!engine.scene_changed());
}

// -----------------------------------------------------------------------------
// Render steps
// -----------------------------------------------------------------------------

#[test]
fn palette_stream_flows_toward_first_pixel() {
    let mut sink = strip(5);
    let mut engine = LightEngine::new();
    engine.add_sink(&mut sink).unwrap();

    engine.palette_stream(50, PaletteId::Cool, true);
    let palette = PaletteId::Cool.palette();
    let before = engine.sink(0).unwrap().pixels().to_vec();
    for (i, pixel) in before.iter().enumerate() {
        assert_eq!(*pixel, palette.entry(i % PALETTE_SIZE));
    }

    engine.render(at(0));

    let after = engine.sink(0).unwrap().pixels();
    assert_eq!(&after[..4], &before[1..]);
    assert_eq!(after[4], color_from_palette(&palette, 5));
}

#[test]
fn palette_stream_reverse_flows_toward_last_pixel() {
    let mut sink = strip(5);
    let mut engine = LightEngine::new();
    engine.add_sink(&mut sink).unwrap();

    engine.palette_stream(50, PaletteId::Cool, false);
    let before = engine.sink(0).unwrap().pixels().to_vec();
    engine.render(at(0));

    let after = engine.sink(0).unwrap().pixels();
    assert_eq!(&after[1..], &before[..4]);
    assert_eq!(after[0], color_from_palette(&PaletteId::Cool.palette(), 5));
}

#[test]
fn animated_effects_wait_for_their_frame_duration() {
    let mut sink = strip(5);
    let mut engine = LightEngine::new();
    engine.add_sink(&mut sink).unwrap();

    engine.palette_stream(50, PaletteId::Cool, true);
    engine.render(at(0));
    let first = engine.sink(0).unwrap().pixels().to_vec();

    engine.render(at(30));
    assert_eq!(engine.sink(0).unwrap().pixels(), first.as_slice());

    engine.render(at(51));
    assert_ne!(engine.sink(0).unwrap().pixels(), first.as_slice());
}

#[test]
fn static_scene_is_refreshed_slowly() {
    let mut sink = strip(3);
    {
        let mut engine = LightEngine::new();
        engine.add_sink(&mut sink).unwrap();
        engine.solid(RED);

        engine.render(at(0));
        engine.render(at(5_000));
        engine.render(at(10_001));
    }

    assert_eq!(sink.driver().writes(), 2);
    assert_eq!(sink.driver().last_frame(), &[RED; 3]);
}

#[test]
fn invalidate_redraws_static_scene_after_blank() {
    let mut sink = strip(3);
    {
        let mut engine = LightEngine::new();
        engine.add_sink(&mut sink).unwrap();
        engine.solid(RED);

        engine.render(at(0));
        engine.blank();
        engine.render(at(100));
        engine.invalidate();
        engine.render(at(200));
    }

    assert_eq!(sink.driver().writes(), 3);
    assert_eq!(sink.driver().last_frame(), &[RED; 3]);
}

#[test]
fn brightness_is_applied_on_output() {
    let mut sink = strip(2);
    {
        let mut engine = LightEngine::new();
        engine.add_sink(&mut sink).unwrap();
        engine.set_brightness(128);
        engine.solid(WHITE);
        engine.render(at(0));
    }

    let expected = Rgb {
        r: 127,
        g: 127,
        b: 127,
    };
    assert_eq!(sink.driver().last_frame(), &[expected; 2]);
}

#[test]
fn strobe_alternates_and_rests_between_sets() {
    let mut sink = ShownColorSink::new(4);
    {
        let mut engine = LightEngine::new();
        engine.add_sink(&mut sink).unwrap();
        engine.strobe(2, 10, 20, 100, WHITE);

        for ms in [0, 11, 32, 43, 64, 100, 165] {
            engine.render(at(ms));
        }
    }

    assert_eq!(sink.shown, vec![WHITE, BLACK, WHITE, BLACK, BLACK, WHITE]);
}

#[test]
fn breathe_starts_on_base_color() {
    let mut sink = ShownColorSink::new(3);
    {
        let mut engine = LightEngine::new();
        engine.add_sink(&mut sink).unwrap();
        engine.breathe(10, 200, RED);
        engine.render(at(0));
        engine.render(at(5));
    }

    assert_eq!(sink.shown, vec![RED]);
}

#[test]
fn sparkle_lights_at_most_density_share() {
    let mut sink = strip(100);
    let mut engine = LightEngine::new();
    engine.add_sink(&mut sink).unwrap();

    engine.sparkle(10, 51, RED);
    engine.render(at(0));

    let pixels = engine.sink(0).unwrap().pixels();
    let lit = pixels.iter().filter(|pixel| **pixel == RED).count();
    assert!((1..=20).contains(&lit));
    assert!(pixels.iter().all(|pixel| *pixel == RED || *pixel == BLACK));
}

#[test]
fn every_effect_renders_on_tiny_sinks() {
    let mut empty = strip(0);
    let mut single = strip(1);
    let mut engine = LightEngine::new();
    engine.add_sink(&mut empty).unwrap();
    engine.add_sink(&mut single).unwrap();

    let palette = PaletteId::PsychedelicPlaya;
    let effects = [
        Effect::SpectrumCycle { duration: 0 },
        Effect::SpectrumStream { duration: 1 },
        Effect::SpectrumSparkle {
            duration: 1,
            density: 255,
        },
        Effect::PulseWave {
            duration: 1,
            wave_width: 9,
            palette,
        },
        Effect::Kaleidoscope {
            duration: 1,
            mirror_count: 0,
            palette,
        },
        Effect::RainbowComet {
            duration: 1,
            comet_count: 0,
            trail_length: 5,
        },
        Effect::MatrixRain {
            duration: 1,
            drop_rate: 255,
            color: RED,
        },
        Effect::PlasmaClouds {
            duration: 1,
            cloud_scale: 7,
            palette,
        },
        Effect::LavaLamp {
            duration: 1,
            blob_count: 3,
            palette,
        },
        Effect::AuroraBorealis {
            duration: 1,
            wave_count: 2,
            palette,
        },
        Effect::LightningStorm {
            duration: 1,
            flash_intensity: 100,
            flash_frequency: 1,
        },
        Effect::ColorExplosion {
            duration: 1,
            explosion_size: 0,
            palette,
        },
        Effect::SpiralGalaxy {
            duration: 1,
            spiral_arms: 0,
            palette,
        },
    ];

    let mut ms = 0;
    for effect in effects {
        engine.apply_scene_update(Scene::new(effect));
        for _ in 0..4 {
            engine.render(at(ms));
            ms += 600;
        }
        assert_eq!(engine.scene().effect_id(), effect.id());
    }
}
