//! Standard status chunks and the legacy full-state fragment.

use serde::Serialize;

use super::{StatusError, StatusSnapshot};
use crate::domain::dto::{ColorDto, PositionDto};

fn encode<T: Serialize>(value: &T, buffer: &mut [u8]) -> Result<usize, StatusError> {
    serde_json_core::to_slice(value, buffer).map_err(|_e| {
        #[cfg(feature = "log")]
        log::error!("status: fragment does not fit: {:?}", _e);

        StatusError::Encode
    })
}

fn position(snapshot: &StatusSnapshot<'_>) -> Option<PositionDto> {
    snapshot.state.position.map(|position| PositionDto {
        lat: position.latitude,
        lon: position.longitude,
    })
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BasicStatus<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    pwr: bool,
    bri: u8,
    spd: u16,
    dir: bool,
    fx: &'a str,
    pal: &'a str,
    max_bri: u8,
    owner: &'a str,
    device_name: &'a str,
}

pub fn basic_status(snapshot: &StatusSnapshot<'_>, buffer: &mut [u8]) -> Result<usize, StatusError> {
    let state = snapshot.state;
    let defaults = snapshot.defaults;
    let chunk = BasicStatus {
        kind: "basicStatus",
        pwr: state.power,
        bri: state.brightness,
        spd: state.speed,
        dir: state.reverse,
        fx: state.effect.as_str(),
        pal: state.palette.as_str(),
        max_bri: defaults.max_brightness,
        owner: &defaults.owner,
        device_name: &defaults.device_name,
    };
    encode(&chunk, buffer)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DeviceConfigStatus<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    device_type: &'a str,
    #[serde(rename = "activeLEDStrips")]
    active_led_strips: u8,
    auto_on: bool,
    status_interval: u32,
    gps_enabled: bool,
    gps_low_speed: f32,
    gps_top_speed: f32,
    gps_lightshow_speed_enabled: bool,
    sync_enabled: bool,
    pos_avail: bool,
    spd_cur: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pos: Option<PositionDto>,
}

pub fn device_config(
    snapshot: &StatusSnapshot<'_>,
    buffer: &mut [u8],
) -> Result<usize, StatusError> {
    let defaults = snapshot.defaults;
    let chunk = DeviceConfigStatus {
        kind: "devConfig",
        device_type: &defaults.device_type,
        active_led_strips: defaults.active_led_strips,
        auto_on: defaults.auto_on,
        status_interval: defaults.status_interval,
        gps_enabled: defaults.gps_enabled,
        gps_low_speed: defaults.gps_low_speed,
        gps_top_speed: defaults.gps_top_speed,
        gps_lightshow_speed_enabled: defaults.gps_lightshow_speed_enabled,
        sync_enabled: defaults.sync_enabled,
        pos_avail: snapshot.state.position_available(),
        spd_cur: snapshot.state.current_speed,
        pos: position(snapshot),
    };
    encode(&chunk, buffer)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EffectParamsStatus<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    wave_width: u8,
    meteor_count: u8,
    trail_length: u8,
    heat_variance: u8,
    mirror_count: u8,
    comet_count: u8,
    drop_rate: u8,
    cloud_scale: u8,
    blob_count: u8,
    wave_count: u8,
    flash_intensity: u8,
    flash_frequency: u16,
    explosion_size: u8,
    spiral_arms: u8,
    effect_color: ColorDto,
}

pub fn effect_params(
    snapshot: &StatusSnapshot<'_>,
    buffer: &mut [u8],
) -> Result<usize, StatusError> {
    let params = &snapshot.state.params;
    let chunk = EffectParamsStatus {
        kind: "effectParams",
        wave_width: params.wave_width,
        meteor_count: params.meteor_count,
        trail_length: params.trail_length,
        heat_variance: params.heat_variance,
        mirror_count: params.mirror_count,
        comet_count: params.comet_count,
        drop_rate: params.drop_rate,
        cloud_scale: params.cloud_scale,
        blob_count: params.blob_count,
        wave_count: params.wave_count,
        flash_intensity: params.flash_intensity,
        flash_frequency: params.flash_frequency,
        explosion_size: params.explosion_size,
        spiral_arms: params.spiral_arms,
        effect_color: ColorDto::from(snapshot.state.effect_color),
    };
    encode(&chunk, buffer)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DefaultsStatus<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    brightness: u8,
    max_brightness: u8,
    speed: u16,
    palette: &'a str,
    effect: &'a str,
    reverse_direction: bool,
    auto_on: bool,
    version: u8,
}

pub fn defaults(snapshot: &StatusSnapshot<'_>, buffer: &mut [u8]) -> Result<usize, StatusError> {
    let defaults = snapshot.defaults;
    let chunk = DefaultsStatus {
        kind: "defaults",
        brightness: defaults.brightness,
        max_brightness: defaults.max_brightness,
        speed: defaults.speed,
        palette: defaults.palette.as_str(),
        effect: defaults.effect.as_str(),
        reverse_direction: defaults.reverse_direction,
        auto_on: defaults.auto_on,
        version: defaults.version,
    };
    encode(&chunk, buffer)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LegacyStatus<'a> {
    pwr: bool,
    bri: u8,
    spd: u16,
    dir: bool,
    fx: &'a str,
    pal: &'a str,
    pos_avail: bool,
    spd_cur: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pos: Option<PositionDto>,
    max_bri: u8,
    owner: &'a str,
    device_name: &'a str,
}

/// Single fragment with the whole state, used when no chunks are registered
pub fn legacy_status(
    snapshot: &StatusSnapshot<'_>,
    buffer: &mut [u8],
) -> Result<usize, StatusError> {
    let state = snapshot.state;
    let defaults = snapshot.defaults;
    let status = LegacyStatus {
        pwr: state.power,
        bri: state.brightness,
        spd: state.speed,
        dir: state.reverse,
        fx: state.effect.as_str(),
        pal: state.palette.as_str(),
        pos_avail: state.position_available(),
        spd_cur: state.current_speed,
        pos: position(snapshot),
        max_bri: defaults.max_brightness,
        owner: &defaults.owner,
        device_name: &defaults.device_name,
    };
    encode(&status, buffer)
}
