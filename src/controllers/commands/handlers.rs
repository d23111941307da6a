//! Standard command handlers.
//!
//! Lengths are checked by the dispatcher before a handler runs.

use playa_light_composer::{EffectId, PaletteId, Rgb};
use serde::Serialize;

use super::{CommandContext, Opcode};
use crate::{
    config::MAX_FRAGMENT_LEN,
    domain::{
        dto::{ColorOrder, ConfigurationDocument, LedStripConfig, ResetReply, SaveReply},
        entity::Position,
    },
};

fn flag(command: &[u8]) -> bool {
    command.get(1).is_some_and(|value| *value != 0)
}

fn read_i32(command: &[u8], offset: usize) -> Option<i32> {
    let bytes = command.get(offset..offset + 4)?;
    bytes.try_into().ok().map(i32::from_ne_bytes)
}

fn read_f32(command: &[u8], offset: usize) -> Option<f32> {
    let bytes = command.get(offset..offset + 4)?;
    bytes.try_into().ok().map(f32::from_ne_bytes)
}

/// Longest valid UTF-8 prefix before the first NUL
fn read_text(bytes: &[u8]) -> &str {
    let bytes = match bytes.iter().position(|byte| *byte == 0) {
        Some(end) => &bytes[..end],
        None => bytes,
    };
    match core::str::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => core::str::from_utf8(&bytes[..e.valid_up_to()]).unwrap_or_default(),
    }
}

fn reply_json<T: Serialize>(ctx: &mut CommandContext<'_, '_>, value: &T) {
    let mut buffer = [0u8; MAX_FRAGMENT_LEN];
    match serde_json_core::to_slice(value, &mut buffer) {
        Ok(len) => ctx.reply(&buffer[..len]),
        Err(_e) => {
            #[cfg(feature = "log")]
            log::error!("dispatcher: failed to encode reply: {:?}", _e);
        }
    }
}

pub(super) fn power(ctx: &mut CommandContext<'_, '_>, command: &[u8]) {
    let was_on = ctx.state.power;
    ctx.state.power = flag(command);
    ctx.refresh_scene();
    if ctx.state.power && !was_on {
        // sinks were blanked while off
        ctx.engine.invalidate();
    }
}

pub(super) fn brightness(ctx: &mut CommandContext<'_, '_>, command: &[u8]) {
    let Some(value) = read_i32(command, 1) else {
        return;
    };
    let max_brightness = ctx.defaults.defaults().max_brightness;
    ctx.state.set_brightness(value, max_brightness);
    ctx.refresh_scene();
}

pub(super) fn speed(ctx: &mut CommandContext<'_, '_>, command: &[u8]) {
    let Some(value) = read_i32(command, 1) else {
        return;
    };
    ctx.state.set_speed(value);
    ctx.refresh_scene();
}

pub(super) fn direction(ctx: &mut CommandContext<'_, '_>, command: &[u8]) {
    ctx.state.reverse = flag(command);
    ctx.refresh_scene();
}

pub(super) fn origin(ctx: &mut CommandContext<'_, '_>, command: &[u8]) {
    let (Some(latitude), Some(longitude)) = (read_f32(command, 1), read_f32(command, 5)) else {
        return;
    };
    ctx.state.origin = Position::new(latitude, longitude);
}

/// A single byte selects by id, anything longer is a name
pub(super) fn palette(ctx: &mut CommandContext<'_, '_>, command: &[u8]) {
    let palette = if command.len() == 2 {
        let Some(palette) = PaletteId::from_raw(command[1]) else {
            #[cfg(feature = "log")]
            log::warn!("dispatcher: palette id {} out of range", command[1]);
            return;
        };
        palette
    } else {
        PaletteId::parse_from_str(read_text(&command[1..]))
    };
    ctx.state.palette = palette;
    ctx.refresh_scene();
}

pub(super) fn effect(ctx: &mut CommandContext<'_, '_>, command: &[u8]) {
    let effect = if command.len() == 2 {
        let Some(effect) = EffectId::from_raw(command[1]) else {
            #[cfg(feature = "log")]
            log::warn!("dispatcher: effect id {} out of range", command[1]);
            return;
        };
        effect
    } else {
        EffectId::parse_from_str(read_text(&command[1..]))
    };
    ctx.state.effect = effect;
    ctx.refresh_scene();
}

pub(super) fn effect_parameter(ctx: &mut CommandContext<'_, '_>, command: &[u8]) {
    let Some(parameter) = Opcode::from_u8(command[0]).and_then(Opcode::effect_parameter) else {
        return;
    };
    let Some(value) = read_i32(command, 1) else {
        return;
    };
    ctx.state.params.set(parameter, value);
    ctx.refresh_scene();
}

pub(super) fn color(ctx: &mut CommandContext<'_, '_>, command: &[u8]) {
    ctx.state.effect_color = Rgb {
        r: command[1],
        g: command[2],
        b: command[3],
    };
    ctx.refresh_scene();
}

pub(super) fn get_defaults(ctx: &mut CommandContext<'_, '_>, _command: &[u8]) {
    let mut buffer = [0u8; MAX_FRAGMENT_LEN];
    match ctx.defaults.export_json(&mut buffer) {
        Ok(len) => ctx.reply(&buffer[..len]),
        Err(_e) => {
            #[cfg(feature = "log")]
            log::error!("dispatcher: failed to export defaults: {:?}", _e);
        }
    }
}

pub(super) fn set_defaults(ctx: &mut CommandContext<'_, '_>, command: &[u8]) {
    if let Err(_e) = ctx.defaults.import_json(&command[1..]) {
        #[cfg(feature = "log")]
        log::warn!("dispatcher: rejected defaults document: {:?}", _e);
    }
}

pub(super) fn save_current_as_defaults(ctx: &mut CommandContext<'_, '_>, _command: &[u8]) {
    let mut defaults = ctx.defaults.defaults().clone();
    defaults.brightness = ctx.state.brightness;
    defaults.speed = ctx.state.speed;
    defaults.palette = ctx.state.palette;
    defaults.effect = ctx.state.effect;
    defaults.reverse_direction = ctx.state.reverse;
    defaults.effect_color = ctx.state.effect_color;

    let saved = ctx.defaults.save(defaults).is_ok();
    reply_json(
        ctx,
        &SaveReply {
            defaults_saved: saved,
        },
    );
}

pub(super) fn reset_to_factory(ctx: &mut CommandContext<'_, '_>, _command: &[u8]) {
    let reset = ctx.defaults.reset_to_factory().is_ok();
    if reset {
        ctx.apply_defaults();
    }
    reply_json(
        ctx,
        &ResetReply {
            factory_reset: reset,
        },
    );
}

pub(super) fn set_max_brightness(ctx: &mut CommandContext<'_, '_>, command: &[u8]) {
    let Some(value) = read_i32(command, 1) else {
        return;
    };
    if let Err(_e) = ctx.defaults.set_max_brightness(value) {
        #[cfg(feature = "log")]
        log::warn!("dispatcher: failed to store max brightness: {:?}", _e);
        return;
    }
    let max_brightness = ctx.defaults.defaults().max_brightness;
    if ctx.state.brightness > max_brightness {
        ctx.state.brightness = max_brightness;
    }
    ctx.refresh_scene();
}

pub(super) fn set_owner(ctx: &mut CommandContext<'_, '_>, command: &[u8]) {
    if let Err(_e) = ctx.defaults.set_owner(read_text(&command[1..])) {
        #[cfg(feature = "log")]
        log::warn!("dispatcher: failed to store owner: {:?}", _e);
    }
}

pub(super) fn set_device_type(ctx: &mut CommandContext<'_, '_>, command: &[u8]) {
    if let Err(_e) = ctx.defaults.set_device_type(read_text(&command[1..])) {
        #[cfg(feature = "log")]
        log::warn!("dispatcher: failed to store device type: {:?}", _e);
    }
}

pub(super) fn set_auto_on(ctx: &mut CommandContext<'_, '_>, command: &[u8]) {
    if let Err(_e) = ctx.defaults.set_auto_on(flag(command)) {
        #[cfg(feature = "log")]
        log::warn!("dispatcher: failed to store auto-on: {:?}", _e);
    }
}

pub(super) fn set_gps_low_speed(ctx: &mut CommandContext<'_, '_>, command: &[u8]) {
    let Some(value) = read_f32(command, 1) else {
        return;
    };
    if let Err(_e) = ctx.defaults.set_gps_low_speed(value) {
        #[cfg(feature = "log")]
        log::warn!("dispatcher: failed to store gps low speed: {:?}", _e);
        return;
    }
    ctx.refresh_scene();
}

pub(super) fn set_gps_top_speed(ctx: &mut CommandContext<'_, '_>, command: &[u8]) {
    let Some(value) = read_f32(command, 1) else {
        return;
    };
    if let Err(_e) = ctx.defaults.set_gps_top_speed(value) {
        #[cfg(feature = "log")]
        log::warn!("dispatcher: failed to store gps top speed: {:?}", _e);
        return;
    }
    ctx.refresh_scene();
}

pub(super) fn set_gps_lightshow_speed(ctx: &mut CommandContext<'_, '_>, command: &[u8]) {
    if let Err(_e) = ctx.defaults.set_gps_lightshow_speed_enabled(flag(command)) {
        #[cfg(feature = "log")]
        log::warn!("dispatcher: failed to store gps lightshow flag: {:?}", _e);
        return;
    }
    ctx.refresh_scene();
}

/// `[op][index][pin][count_hi][count_lo][order][enabled?]`
pub(super) fn configure_led_strip(ctx: &mut CommandContext<'_, '_>, command: &[u8]) {
    let index = usize::from(command[1]);
    let strip = LedStripConfig {
        pin: command[2],
        num_leds: u16::from_be_bytes([command[3], command[4]]),
        color_order: ColorOrder::from_u8(command[5]).unwrap_or_default(),
        enabled: command.get(6).is_none_or(|enabled| *enabled != 0),
    };
    if let Err(_e) = ctx.defaults.set_led_strip_config(index, strip) {
        #[cfg(feature = "log")]
        log::warn!("dispatcher: failed to configure strip {}: {:?}", index, _e);
    }
}

pub(super) fn get_configuration(ctx: &mut CommandContext<'_, '_>, _command: &[u8]) {
    let document = ConfigurationDocument::from(ctx.defaults.defaults());
    let mut buffer = [0u8; MAX_FRAGMENT_LEN];
    let encoded = serde_json_core::to_slice(&document, &mut buffer);
    match encoded {
        Ok(len) => ctx.reply(&buffer[..len]),
        Err(_e) => {
            #[cfg(feature = "log")]
            log::error!("dispatcher: failed to encode configuration: {:?}", _e);
        }
    }
}
