//! Light Engine - scene holder and render loop step
//!
//! The `LightEngine` is the central coordinator that:
//! - Borrows an ordered list of pixel sinks
//! - Holds the active [`Scene`] and a `changed` flag
//! - Owns the per-effect animation state (timers, heat and meteor buffers)
//! - Advances exactly one effect step per [`LightEngine::render`] call
//!
//! Every effect is rate limited by its own frame duration, so the caller
//! can invoke `render` as often as its loop spins.

mod effects;

use alloc::{vec, vec::Vec};
use embassy_time::{Duration, Instant};

use crate::{
    color::Rgb,
    math8::{Random8, lerp_colors},
    palette::{PALETTE_SIZE, PaletteId},
    scene::{Effect, Scene},
    sink::PixelSink,
};

/// Maximum number of sinks one engine drives
pub const MAX_SINKS: usize = 8;

/// Static scenes are pushed again at this interval so LEDs connected after
/// the scene was set still light up.
pub const STATIC_SCENE_REFRESH: Duration = Duration::from_secs(10);

/// Number of matrix rain drop slots
pub const MATRIX_DROPS: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineError {
    /// All sink slots are taken
    TooManySinks,
}

/// Animation state owned by the active effect. Reset whenever the effect
/// or one of its parameters changes.
#[derive(Debug, Clone)]
pub(crate) struct EffectState {
    pub(crate) hue: u8,
    pub(crate) frame_number: u32,
    pub(crate) frame_duration: Duration,
    pub(crate) scale: u8,
    pub(crate) palette_index: usize,
    pub(crate) pulse_center: usize,
    pub(crate) heat: Vec<u8>,
    pub(crate) meteor_phases: Vec<u8>,
    pub(crate) matrix_drops: [u8; MATRIX_DROPS],
    pub(crate) plasma_offset: u8,
    /// Aurora drift, in 0.1 and 0.05 steps respectively
    pub(crate) noise_x: u32,
    pub(crate) noise_y: u32,
    pub(crate) explosion_center: usize,
    pub(crate) spiral_angle: u8,
    pub(crate) breathe_palette: [Rgb; 2],
    pub(crate) last_render: Option<Instant>,
    pub(crate) start: Option<Instant>,
}

impl EffectState {
    const fn new() -> Self {
        Self {
            hue: 0,
            frame_number: 0,
            frame_duration: Duration::from_ticks(0),
            scale: 0,
            palette_index: 0,
            pulse_center: 0,
            heat: Vec::new(),
            meteor_phases: Vec::new(),
            matrix_drops: [0; MATRIX_DROPS],
            plasma_offset: 0,
            noise_x: 0,
            noise_y: 0,
            explosion_center: 0,
            spiral_angle: 0,
            breathe_palette: [Rgb { r: 0, g: 0, b: 0 }; 2],
            last_render: None,
            start: None,
        }
    }
}

/// Light Engine - the main orchestrator
pub struct LightEngine<'a> {
    sinks: heapless::Vec<&'a mut dyn PixelSink, MAX_SINKS>,
    scene: Scene,
    changed: bool,
    state: EffectState,
    rng: Random8,
}

impl Default for LightEngine<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> LightEngine<'a> {
    /// Create an engine with no sinks and the `off` scene
    pub fn new() -> Self {
        Self {
            sinks: heapless::Vec::new(),
            scene: Scene::default(),
            changed: false,
            state: EffectState::new(),
            rng: Random8::default(),
        }
    }

    /// Seed the effect randomness
    #[must_use]
    pub fn with_seed(mut self, seed: u16) -> Self {
        self.rng = Random8::new(seed);
        self
    }

    /// Mix platform entropy into the effect randomness
    pub fn add_entropy(&mut self, entropy: u16) {
        self.rng.add_entropy(entropy);
    }

    /// Register a sink. Sinks render in registration order.
    pub fn add_sink(&mut self, sink: &'a mut dyn PixelSink) -> Result<(), EngineError> {
        self.sinks.push(sink).map_err(|_| {
            #[cfg(feature = "log")]
            log::warn!("engine: sink limit of {} reached", MAX_SINKS);
            EngineError::TooManySinks
        })
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    pub fn sink(&self, index: usize) -> Option<&dyn PixelSink> {
        self.sinks.get(index).map(|sink| &**sink)
    }

    /// Sum of all sink lengths
    pub fn total_pixels(&self) -> usize {
        self.sinks.iter().map(|sink| sink.len()).sum()
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Whether the scene changed since the last render
    pub fn scene_changed(&self) -> bool {
        self.changed
    }

    pub fn brightness(&self) -> u8 {
        self.scene.brightness
    }

    pub fn speed(&self) -> u16 {
        self.scene.speed
    }

    /// Fire heat buffer, one cell per pixel across all sinks
    pub fn heat(&self) -> &[u8] {
        &self.state.heat
    }

    /// Meteor phase counters, one per meteor
    pub fn meteor_phases(&self) -> &[u8] {
        &self.state.meteor_phases
    }

    // ========================================================================
    // Scene setters
    // ========================================================================

    pub fn set_brightness(&mut self, brightness: u8) {
        if self.scene.brightness != brightness {
            self.scene.brightness = brightness;
            self.changed = true;
        }
    }

    /// Change the frame duration of the active effect
    pub fn set_speed(&mut self, speed: u16) {
        let mut candidate = self.scene;
        candidate.speed = speed;
        self.apply_scene_update(candidate.normalized());
    }

    pub fn off(&mut self) {
        self.apply_scene_update(Scene::new(Effect::Off));
    }

    pub fn solid(&mut self, color: Rgb) {
        self.apply_scene_update(Scene::new(Effect::Solid { color }));
    }

    pub fn palette_cycle(&mut self, palette: PaletteId, duration: u16) {
        self.apply_scene_update(Scene::new(Effect::PaletteCycle { palette, duration }));
    }

    pub fn palette_stream(&mut self, duration: u16, palette: PaletteId, direction: bool) {
        self.apply_scene_update(Scene::new(Effect::PaletteStream {
            palette,
            duration,
            direction,
        }));
    }

    pub fn spectrum_cycle(&mut self, duration: u16) {
        self.apply_scene_update(Scene::new(Effect::SpectrumCycle { duration }));
    }

    pub fn spectrum_stream(&mut self, duration: u16) {
        self.apply_scene_update(Scene::new(Effect::SpectrumStream { duration }));
    }

    pub fn spectrum_sparkle(&mut self, duration: u16, density: u8) {
        self.apply_scene_update(Scene::new(Effect::SpectrumSparkle { duration, density }));
    }

    pub fn strobe(
        &mut self,
        num_flashes: u16,
        duration_on: u16,
        duration_off: u16,
        duration_between_sets: u16,
        color: Rgb,
    ) {
        self.apply_scene_update(Scene::new(Effect::Strobe {
            num_flashes,
            duration_on,
            duration_off,
            duration_between_sets,
            color,
        }));
    }

    pub fn sparkle(&mut self, duration: u16, density: u8, color: Rgb) {
        self.apply_scene_update(Scene::new(Effect::Sparkle {
            duration,
            density,
            color,
        }));
    }

    pub fn breathe(&mut self, duration: u16, dimness: u8, color: Rgb) {
        self.apply_scene_update(Scene::new(Effect::Breathe {
            duration,
            dimness,
            color,
        }));
    }

    pub fn set_chsv(&mut self, hue: u8, saturation: u8, value: u8) {
        self.apply_scene_update(Scene::new(Effect::SetChsv {
            hue,
            saturation,
            value,
        }));
    }

    pub fn pulse_wave(&mut self, duration: u16, wave_width: u8, palette: PaletteId) {
        self.apply_scene_update(Scene::new(Effect::PulseWave {
            duration,
            wave_width,
            palette,
        }));
    }

    pub fn meteor_shower(
        &mut self,
        duration: u16,
        meteor_count: u8,
        trail_length: u8,
        palette: PaletteId,
    ) {
        self.apply_scene_update(Scene::new(Effect::MeteorShower {
            duration,
            meteor_count,
            trail_length,
            palette,
        }));
    }

    pub fn fire_plasma(&mut self, duration: u16, heat_variance: u8, palette: PaletteId) {
        self.apply_scene_update(Scene::new(Effect::FirePlasma {
            duration,
            heat_variance,
            palette,
        }));
    }

    pub fn kaleidoscope(&mut self, duration: u16, mirror_count: u8, palette: PaletteId) {
        self.apply_scene_update(Scene::new(Effect::Kaleidoscope {
            duration,
            mirror_count,
            palette,
        }));
    }

    pub fn rainbow_comet(&mut self, duration: u16, comet_count: u8, trail_length: u8) {
        self.apply_scene_update(Scene::new(Effect::RainbowComet {
            duration,
            comet_count,
            trail_length,
        }));
    }

    pub fn matrix_rain(&mut self, duration: u16, drop_rate: u8, color: Rgb) {
        self.apply_scene_update(Scene::new(Effect::MatrixRain {
            duration,
            drop_rate,
            color,
        }));
    }

    pub fn plasma_clouds(&mut self, duration: u16, cloud_scale: u8, palette: PaletteId) {
        self.apply_scene_update(Scene::new(Effect::PlasmaClouds {
            duration,
            cloud_scale,
            palette,
        }));
    }

    pub fn lava_lamp(&mut self, duration: u16, blob_count: u8, palette: PaletteId) {
        self.apply_scene_update(Scene::new(Effect::LavaLamp {
            duration,
            blob_count,
            palette,
        }));
    }

    pub fn aurora_borealis(&mut self, duration: u16, wave_count: u8, palette: PaletteId) {
        self.apply_scene_update(Scene::new(Effect::AuroraBorealis {
            duration,
            wave_count,
            palette,
        }));
    }

    pub fn lightning_storm(&mut self, duration: u16, flash_intensity: u8, flash_frequency: u16) {
        self.apply_scene_update(Scene::new(Effect::LightningStorm {
            duration,
            flash_intensity,
            flash_frequency,
        }));
    }

    pub fn color_explosion(&mut self, duration: u16, explosion_size: u8, palette: PaletteId) {
        self.apply_scene_update(Scene::new(Effect::ColorExplosion {
            duration,
            explosion_size,
            palette,
        }));
    }

    pub fn spiral_galaxy(&mut self, duration: u16, spiral_arms: u8, palette: PaletteId) {
        self.apply_scene_update(Scene::new(Effect::SpiralGalaxy {
            duration,
            spiral_arms,
            palette,
        }));
    }

    // ========================================================================
    // Scene updates
    // ========================================================================

    /// Replace the active scene when `candidate` differs from it.
    ///
    /// The active brightness is kept. Returns `true` if the scene changed,
    /// in which case the effect state is reset for the new scene.
    pub fn apply_scene_update(&mut self, mut candidate: Scene) -> bool {
        candidate.brightness = self.scene.brightness;
        if self.scene.same_content(&candidate) {
            return false;
        }

        #[cfg(feature = "log")]
        log::debug!("engine: scene -> {}", candidate.effect_id().as_str());

        self.scene = candidate;
        self.changed = true;
        self.reset_effect_state();
        true
    }

    /// Merge a scene received from another device.
    ///
    /// Each descriptor field (color, palette, effect, speed, brightness,
    /// direction) is taken from `incoming` only when it differs; the last
    /// writer wins per field. A different effect id brings the incoming
    /// effect payload along with it.
    pub fn apply_sync_update(&mut self, incoming: &Scene) {
        let mut merged = self.scene;
        let mut updated = false;

        if merged.color != incoming.color {
            merged.color = incoming.color;
            updated = true;
        }
        if merged.primary_palette != incoming.primary_palette {
            merged.primary_palette = incoming.primary_palette;
            updated = true;
        }
        if merged.effect.id() != incoming.effect.id() {
            merged.effect = incoming.effect;
            updated = true;
        }
        if merged.speed != incoming.speed {
            merged.speed = incoming.speed;
            updated = true;
        }
        if merged.brightness != incoming.brightness {
            merged.brightness = incoming.brightness;
            updated = true;
        }
        if merged.direction != incoming.direction {
            merged.direction = incoming.direction;
            updated = true;
        }

        if !updated {
            return;
        }

        let merged = merged.normalized();
        let content_changed = !self.scene.same_content(&merged);
        self.scene = merged;
        self.changed = true;
        if content_changed {
            self.reset_effect_state();
        }
    }

    /// Reset timers and ephemeral buffers for the active effect
    fn reset_effect_state(&mut self) {
        let state = &mut self.state;
        state.hue = 0;
        state.frame_number = 0;
        state.frame_duration = Duration::from_ticks(0);
        state.scale = 0;
        state.palette_index = 0;
        state.last_render = None;
        state.start = None;

        if !matches!(self.scene.effect, Effect::FirePlasma { .. }) {
            state.heat = Vec::new();
        }
        if !matches!(self.scene.effect, Effect::MeteorShower { .. }) {
            state.meteor_phases = Vec::new();
        }

        match self.scene.effect {
            Effect::PaletteStream { palette, .. } => self.setup_palette_stream(palette),
            Effect::SpectrumStream { .. } => self.setup_spectrum_stream(),
            Effect::Breathe { dimness, color, .. } => {
                self.state.breathe_palette = [color, lerp_colors(color, Rgb::default(), dimness)];
            }
            Effect::PulseWave { .. } => self.state.pulse_center = 0,
            Effect::MeteorShower { meteor_count, .. } => {
                let mut phases = vec![0u8; usize::from(meteor_count)];
                for phase in &mut phases {
                    *phase = self.rng.below(255);
                }
                self.state.meteor_phases = phases;
            }
            Effect::FirePlasma { .. } => self.seed_heat(),
            Effect::MatrixRain { .. } => self.state.matrix_drops = [0; MATRIX_DROPS],
            Effect::PlasmaClouds { .. } | Effect::AuroraBorealis { .. } => {
                self.state.plasma_offset = 0;
                self.state.noise_x = 0;
                self.state.noise_y = 0;
            }
            Effect::ColorExplosion { .. } => self.state.explosion_center = 0,
            Effect::SpiralGalaxy { .. } => self.state.spiral_angle = 0,
            _ => {}
        }
    }

    /// One heat cell per pixel across all sinks, seeded in `0..100`
    fn seed_heat(&mut self) {
        let mut heat = vec![0u8; self.total_pixels()];
        for cell in &mut heat {
            *cell = self.rng.below(100);
        }
        self.state.heat = heat;
    }

    /// Seed every sink with raw palette entries so the stream starts full
    fn setup_palette_stream(&mut self, palette: PaletteId) {
        let palette = palette.palette();
        let mut hue = self.state.hue;
        for sink in &mut self.sinks {
            for pixel in sink.pixels_mut() {
                *pixel = palette.entry(usize::from(hue) % PALETTE_SIZE);
                hue = hue.wrapping_add(1);
            }
        }
        self.state.hue = hue;
    }

    fn setup_spectrum_stream(&mut self) {
        let mut hue = self.state.hue;
        for sink in &mut self.sinks {
            for pixel in sink.pixels_mut() {
                *pixel = crate::color::hsv(hue, 255, 255);
                hue = hue.wrapping_add(3);
            }
        }
        self.state.hue = hue;
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    /// Force the next [`render`](Self::render) to draw a full frame.
    ///
    /// Needed after the sinks were driven from outside the engine, e.g.
    /// blanked while powered off. Effect state is kept.
    pub fn invalidate(&mut self) {
        self.changed = true;
        self.state.last_render = None;
    }

    /// Blank every sink, used while the device is powered off
    pub fn blank(&mut self) {
        for sink in &mut self.sinks {
            sink.show_color(Rgb::default(), 0);
        }
    }

    /// Advance the active effect by at most one frame
    pub fn render(&mut self, now: Instant) {
        if self.state.start.is_none() {
            self.state.start = Some(now);
        }

        match self.scene.effect {
            Effect::Off => self.render_static(now, Rgb::default()),
            Effect::Solid { color } => self.render_static(now, color),
            Effect::SetChsv {
                hue,
                saturation,
                value,
            } => self.render_static(now, crate::color::hsv(hue, saturation, value)),
            Effect::PaletteCycle { palette, duration } => {
                self.render_palette_cycle(now, palette, duration);
            }
            Effect::PaletteStream {
                palette,
                duration,
                direction,
            } => self.render_palette_stream(now, palette, duration, direction),
            Effect::SpectrumCycle { duration } => self.render_spectrum_cycle(now, duration),
            Effect::SpectrumStream { duration } => self.render_spectrum_stream(now, duration),
            Effect::SpectrumSparkle { duration, density } => {
                self.render_sparkle(now, duration, density, None);
            }
            Effect::Strobe {
                num_flashes,
                duration_on,
                duration_off,
                duration_between_sets,
                color,
            } => self.render_strobe(
                now,
                num_flashes,
                duration_on,
                duration_off,
                duration_between_sets,
                color,
            ),
            Effect::Sparkle {
                duration,
                density,
                color,
            } => self.render_sparkle(now, duration, density, Some(color)),
            Effect::Breathe { duration, .. } => self.render_breathe(now, duration),
            Effect::PulseWave {
                duration,
                wave_width,
                palette,
            } => self.render_pulse_wave(now, duration, wave_width, palette),
            Effect::MeteorShower {
                duration, palette, ..
            } => self.render_meteor_shower(now, duration, palette),
            Effect::FirePlasma {
                duration,
                heat_variance,
                palette,
            } => self.render_fire_plasma(now, duration, heat_variance, palette),
            Effect::Kaleidoscope {
                duration,
                mirror_count,
                palette,
            } => self.render_kaleidoscope(now, duration, mirror_count, palette),
            Effect::RainbowComet {
                duration,
                comet_count,
                trail_length,
            } => self.render_rainbow_comet(now, duration, comet_count, trail_length),
            Effect::MatrixRain {
                duration,
                drop_rate,
                color,
            } => self.render_matrix_rain(now, duration, drop_rate, color),
            Effect::PlasmaClouds {
                duration,
                cloud_scale,
                palette,
            } => self.render_plasma_clouds(now, duration, cloud_scale, palette),
            Effect::LavaLamp {
                duration,
                blob_count,
                palette,
            } => self.render_lava_lamp(now, duration, blob_count, palette),
            Effect::AuroraBorealis {
                duration, palette, ..
            } => self.render_aurora_borealis(now, duration, palette),
            Effect::LightningStorm {
                flash_intensity,
                flash_frequency,
                ..
            } => self.render_lightning_storm(now, flash_intensity, flash_frequency),
            Effect::ColorExplosion {
                duration,
                explosion_size,
                palette,
            } => self.render_color_explosion(now, duration, explosion_size, palette),
            Effect::SpiralGalaxy {
                duration,
                spiral_arms,
                palette,
            } => self.render_spiral_galaxy(now, duration, spiral_arms, palette),
        }

        self.changed = false;
    }

    /// Whether more than `interval` has passed since the last frame. Always
    /// true right after a reset.
    fn frame_due(&self, now: Instant, interval: Duration) -> bool {
        match self.state.last_render {
            None => true,
            Some(last) => now.saturating_duration_since(last) > interval,
        }
    }

    /// Time since the effect's start anchor
    fn since_start(&self, now: Instant) -> Duration {
        self.state
            .start
            .map_or(Duration::from_ticks(0), |start| {
                now.saturating_duration_since(start)
            })
    }

    fn show_color_all(&mut self, color: Rgb, brightness: u8) {
        for sink in &mut self.sinks {
            sink.show_color(color, brightness);
        }
    }

    fn show_all(&mut self) {
        let brightness = self.scene.brightness;
        for sink in &mut self.sinks {
            sink.show(brightness);
        }
    }
}

const fn millis(value: u16) -> Duration {
    Duration::from_millis(value as u64)
}
