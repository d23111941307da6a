//! Scene reconstruction.
//!
//! The engine never receives partial updates: after every state change the
//! whole scene is rebuilt from [`DeviceState`] and handed to
//! [`LightEngine::apply_scene_update`], which ignores it when nothing
//! differs.

use playa_light_composer::{Effect, EffectId, LightEngine, Scene};

use crate::{
    config::SPEED_MIN,
    domain::{dto::DeviceDefaults, entity::DeviceState},
};

/// Frame duration after the GPS speed mapping.
///
/// Slower than `gps_low_speed` the configured speed is kept, faster than
/// `gps_top_speed` the fastest speed is used, linear in between.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn effective_speed(state: &DeviceState, defaults: &DeviceDefaults) -> u16 {
    if !defaults.gps_lightshow_speed_enabled || state.position.is_none() {
        return state.speed;
    }

    let low = defaults.gps_low_speed;
    let top = defaults.gps_top_speed;
    let ground_speed = state.current_speed;
    if ground_speed <= low {
        return state.speed;
    }
    if ground_speed >= top || top <= low {
        return SPEED_MIN;
    }

    let span = f32::from(state.speed.saturating_sub(SPEED_MIN));
    let fraction = (ground_speed - low) / (top - low);
    SPEED_MIN + (span * (1.0 - fraction)) as u16
}

/// Complete scene for the current state at the given frame duration.
///
/// Effects without a standard renderer, the position-dependent ones
/// included, fall back to a palette stream.
pub fn build_scene(state: &DeviceState, speed: u16) -> Scene {
    let palette = state.palette;
    let params = &state.params;

    let effect = match state.effect {
        EffectId::Off => Effect::Off,
        EffectId::Solid => Effect::Solid {
            color: state.effect_color,
        },
        EffectId::PaletteCycle => Effect::PaletteCycle {
            palette,
            duration: speed,
        },
        EffectId::SpectrumCycle => Effect::SpectrumCycle { duration: speed },
        EffectId::SpectrumStream => Effect::SpectrumStream { duration: speed },
        EffectId::PulseWave => Effect::PulseWave {
            duration: speed,
            wave_width: params.wave_width,
            palette,
        },
        EffectId::MeteorShower => Effect::MeteorShower {
            duration: speed,
            meteor_count: params.meteor_count,
            trail_length: params.trail_length,
            palette,
        },
        EffectId::FirePlasma => Effect::FirePlasma {
            duration: speed,
            heat_variance: params.heat_variance,
            palette,
        },
        EffectId::Kaleidoscope => Effect::Kaleidoscope {
            duration: speed,
            mirror_count: params.mirror_count,
            palette,
        },
        EffectId::RainbowComet => Effect::RainbowComet {
            duration: speed,
            comet_count: params.comet_count,
            trail_length: params.trail_length,
        },
        EffectId::MatrixRain => Effect::MatrixRain {
            duration: speed,
            drop_rate: params.drop_rate,
            color: state.effect_color,
        },
        EffectId::PlasmaClouds => Effect::PlasmaClouds {
            duration: speed,
            cloud_scale: params.cloud_scale,
            palette,
        },
        EffectId::LavaLamp => Effect::LavaLamp {
            duration: speed,
            blob_count: params.blob_count,
            palette,
        },
        EffectId::AuroraBorealis => Effect::AuroraBorealis {
            duration: speed,
            wave_count: params.wave_count,
            palette,
        },
        EffectId::LightningStorm => Effect::LightningStorm {
            duration: speed,
            flash_intensity: params.flash_intensity,
            flash_frequency: params.flash_frequency,
        },
        EffectId::ColorExplosion => Effect::ColorExplosion {
            duration: speed,
            explosion_size: params.explosion_size,
            palette,
        },
        EffectId::SpiralGalaxy => Effect::SpiralGalaxy {
            duration: speed,
            spiral_arms: params.spiral_arms,
            palette,
        },
        _ => Effect::PaletteStream {
            palette,
            duration: speed,
            direction: state.reverse,
        },
    };

    let mut scene = Scene::new(effect);
    scene.color = state.effect_color;
    scene.primary_palette = palette;
    scene.speed = speed;
    scene.direction = state.reverse;
    scene.normalized()
}

/// Copy the stored defaults into the live state.
///
/// Power follows `auto_on`.
pub fn apply_defaults(state: &mut DeviceState, defaults: &DeviceDefaults) {
    state.set_brightness(i32::from(defaults.brightness), defaults.max_brightness);
    state.set_speed(i32::from(defaults.speed));
    state.palette = defaults.palette;
    state.effect = defaults.effect;
    state.reverse = defaults.reverse_direction;
    state.effect_color = defaults.effect_color;
    state.power = defaults.auto_on;
}

/// Push brightness and the rebuilt scene to the engine.
///
/// Returns whether the scene content changed.
pub fn apply_state(
    engine: &mut LightEngine<'_>,
    state: &DeviceState,
    defaults: &DeviceDefaults,
) -> bool {
    engine.set_brightness(state.output_brightness());
    let scene = build_scene(state, effective_speed(state, defaults));
    engine.apply_scene_update(scene)
}
