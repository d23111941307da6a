//! Per-effect render steps
//!
//! Each step is rate limited by its own frame duration and returns early
//! when no frame is due.

use embassy_time::{Duration, Instant};

use super::{LightEngine, STATIC_SCENE_REFRESH, millis};
use crate::{
    color::{BLACK, Rgb, WHITE, hsv},
    math8::{cos8, fade_to_black_by, lerp_colors, sin8},
    palette::{PaletteId, color_from_palette},
};

const STORM_FLICKER: Rgb = Rgb {
    r: 20,
    g: 20,
    b: 40,
};
const STORM_CLOUD: Rgb = Rgb { r: 5, g: 5, b: 10 };

/// A new explosion center is picked after this long
const EXPLOSION_INTERVAL: Duration = Duration::from_millis(500);

/// Lava blobs influence pixels closer than this
const BLOB_RADIUS: usize = 10;

#[allow(clippy::cast_possible_truncation)]
impl LightEngine<'_> {
    pub(super) fn render_static(&mut self, now: Instant, color: Rgb) {
        if !self.changed && !self.frame_due(now, STATIC_SCENE_REFRESH) {
            return;
        }
        self.state.last_render = Some(now);
        self.show_color_all(color, self.scene.brightness);
    }

    pub(super) fn render_palette_cycle(&mut self, now: Instant, palette: PaletteId, duration: u16) {
        if !self.frame_due(now, millis(duration)) {
            return;
        }
        self.state.last_render = Some(now);

        let palette = palette.palette();
        let step = (256 / self.sinks.len().max(1)) as u8;
        let hue = self.state.hue;
        let brightness = self.scene.brightness;
        for sink in &mut self.sinks {
            for (i, pixel) in sink.pixels_mut().iter_mut().enumerate() {
                let led_hue = hue.wrapping_add((i as u8).wrapping_mul(step));
                *pixel = color_from_palette(&palette, led_hue);
            }
            sink.show(brightness);
        }
        self.state.hue = hue.wrapping_add(5);
    }

    pub(super) fn render_palette_stream(
        &mut self,
        now: Instant,
        palette: PaletteId,
        duration: u16,
        direction: bool,
    ) {
        if !self.frame_due(now, millis(duration)) {
            return;
        }
        self.state.last_render = Some(now);

        let palette = palette.palette();
        let brightness = self.scene.brightness;
        for sink in &mut self.sinks {
            let sample = color_from_palette(&palette, self.state.hue);
            let pixels = sink.pixels_mut();
            if direction {
                // Flow toward index 0, new sample enters at the far end
                pixels.rotate_left(1.min(pixels.len()));
                if let Some(last) = pixels.last_mut() {
                    *last = sample;
                }
            } else {
                pixels.rotate_right(1.min(pixels.len()));
                if let Some(first) = pixels.first_mut() {
                    *first = sample;
                }
            }
            self.state.hue = ((u16::from(self.state.hue) + 1) % 255) as u8;
            sink.show(brightness);
        }
    }

    pub(super) fn render_spectrum_cycle(&mut self, now: Instant, duration: u16) {
        let elapsed = self.since_start(now).as_millis();
        let hue = (elapsed / u64::from(duration.max(1)) % 256) as u8;
        if hue == self.state.hue && !self.changed && self.state.last_render.is_some() {
            return;
        }
        self.state.last_render = Some(now);
        self.state.hue = hue;
        self.show_color_all(hsv(hue, 255, 255), self.scene.brightness);
    }

    pub(super) fn render_spectrum_stream(&mut self, now: Instant, duration: u16) {
        if !self.frame_due(now, millis(duration)) {
            return;
        }
        self.state.last_render = Some(now);

        let brightness = self.scene.brightness;
        for sink in &mut self.sinks {
            let pixels = sink.pixels_mut();
            pixels.rotate_left(1.min(pixels.len()));
            if let Some(last) = pixels.last_mut() {
                *last = hsv(self.state.hue, 255, 255);
            }
            self.state.hue = self.state.hue.wrapping_add(3);
            sink.show(brightness);
        }
    }

    /// Light a random subset of pixels. Without a color every lit pixel
    /// gets a random hue.
    pub(super) fn render_sparkle(
        &mut self,
        now: Instant,
        duration: u16,
        density: u8,
        color: Option<Rgb>,
    ) {
        if !self.frame_due(now, millis(duration)) {
            return;
        }
        self.state.last_render = Some(now);

        let brightness = self.scene.brightness;
        for sink in &mut self.sinks {
            let len = sink.len();
            let lit = len * usize::from(density) / 255;
            let pixels = sink.pixels_mut();
            pixels.fill(BLACK);
            for _ in 0..lit {
                let position = self.rng.index(len);
                pixels[position] = match color {
                    Some(color) => color,
                    None => hsv(self.rng.next_u8(), 255, 255),
                };
            }
            sink.show(brightness);
        }
    }

    pub(super) fn render_strobe(
        &mut self,
        now: Instant,
        num_flashes: u16,
        duration_on: u16,
        duration_off: u16,
        duration_between_sets: u16,
        color: Rgb,
    ) {
        if !self.frame_due(now, self.state.frame_duration) {
            return;
        }
        self.state.last_render = Some(now);

        let brightness = self.scene.brightness;
        if self.state.frame_number < u32::from(num_flashes) * 2 {
            if self.state.frame_number & 1 == 1 {
                self.show_color_all(BLACK, brightness);
                self.state.frame_duration = millis(duration_off);
            } else {
                self.show_color_all(color, brightness);
                self.state.frame_duration = millis(duration_on);
            }
            self.state.frame_number += 1;
        } else {
            self.show_color_all(BLACK, brightness);
            self.state.frame_duration = millis(duration_between_sets);
            self.state.frame_number = 0;
        }
    }

    pub(super) fn render_breathe(&mut self, now: Instant, duration: u16) {
        let intervals = self.since_start(now).as_millis() / u64::from(duration.max(1));
        let scale = (intervals % 256) as u8;
        let index = ((intervals / 256) % 2) as usize;
        if scale == self.state.scale
            && index == self.state.palette_index
            && !self.changed
            && self.state.last_render.is_some()
        {
            return;
        }
        self.state.last_render = Some(now);

        let from = self.state.breathe_palette[index];
        let to = self.state.breathe_palette[(index + 1) % 2];
        self.show_color_all(lerp_colors(from, to, scale), self.scene.brightness);
        self.state.scale = scale;
        self.state.palette_index = index;
    }

    pub(super) fn render_pulse_wave(
        &mut self,
        now: Instant,
        duration: u16,
        wave_width: u8,
        palette: PaletteId,
    ) {
        if !self.frame_due(now, millis(duration)) {
            return;
        }
        self.state.last_render = Some(now);

        let palette = palette.palette();
        let brightness = self.scene.brightness;
        let (center, hue) = (self.state.pulse_center, self.state.hue);
        for sink in &mut self.sinks {
            for (i, pixel) in sink.pixels_mut().iter_mut().enumerate() {
                let distance = i.abs_diff(center) as u8;
                let wave = sin8(distance.wrapping_mul(wave_width).wrapping_add(hue));
                *pixel = color_from_palette(&palette, wave);
            }
            sink.show(brightness);
        }

        let span = self.sinks.first().map_or(1, |sink| sink.len().max(1));
        self.state.pulse_center = (center + 1) % span;
        self.state.hue = hue.wrapping_add(4);
    }

    pub(super) fn render_meteor_shower(&mut self, now: Instant, duration: u16, palette: PaletteId) {
        if !self.frame_due(now, millis(duration)) {
            return;
        }
        self.state.last_render = Some(now);

        let palette = palette.palette();
        let brightness = self.scene.brightness;
        let hue = self.state.hue;
        for sink in &mut self.sinks {
            let len = sink.len();
            let pixels = sink.pixels_mut();
            for pixel in pixels.iter_mut() {
                *pixel = fade_to_black_by(*pixel, 60);
            }
            for &phase in &self.state.meteor_phases {
                let position = (usize::from(phase) * len) >> 8;
                if let Some(pixel) = pixels.get_mut(position) {
                    *pixel = color_from_palette(&palette, phase.wrapping_add(hue));
                }
            }
            sink.show(brightness);
        }

        for phase in &mut self.state.meteor_phases {
            *phase = phase.wrapping_add(2);
        }
        self.state.hue = hue.wrapping_add(1);
    }

    pub(super) fn render_fire_plasma(
        &mut self,
        now: Instant,
        duration: u16,
        heat_variance: u8,
        palette: PaletteId,
    ) {
        if !self.frame_due(now, millis(duration)) {
            return;
        }
        self.state.last_render = Some(now);

        if self.state.heat.len() != self.total_pixels() {
            self.seed_heat();
        }

        let palette = palette.palette();
        let brightness = self.scene.brightness;
        let total = self.state.heat.len();
        let heat = &mut self.state.heat;
        let mut cell = 0;
        for sink in &mut self.sinks {
            for pixel in sink.pixels_mut() {
                if cell >= total {
                    break;
                }
                heat[cell] = heat[cell].saturating_sub(self.rng.below(10));
                if cell > 0 && cell < total - 1 {
                    let sum = u16::from(heat[cell - 1]) + u16::from(heat[cell]) + u16::from(heat[cell + 1]);
                    heat[cell] = (sum / 3) as u8;
                }
                if self.rng.below(255) < heat_variance {
                    heat[cell] = heat[cell].saturating_add(self.rng.between(50, 255));
                }
                *pixel = color_from_palette(&palette, heat[cell]);
                cell += 1;
            }
            sink.show(brightness);
        }
    }

    pub(super) fn render_kaleidoscope(
        &mut self,
        now: Instant,
        duration: u16,
        mirror_count: u8,
        palette: PaletteId,
    ) {
        if !self.frame_due(now, millis(duration)) {
            return;
        }
        self.state.last_render = Some(now);

        let palette = palette.palette();
        let brightness = self.scene.brightness;
        let hue = self.state.hue;
        for sink in &mut self.sinks {
            let section = (sink.len() / usize::from(mirror_count.max(1))).max(1);
            for (i, pixel) in sink.pixels_mut().iter_mut().enumerate() {
                let position = (i % section) as u8;
                let pattern = sin8(position.wrapping_mul(8).wrapping_add(hue))
                    .wrapping_add(cos8(position.wrapping_mul(4).wrapping_add(hue.wrapping_mul(2))));
                *pixel = color_from_palette(&palette, pattern);
            }
            sink.show(brightness);
        }
        self.state.hue = hue.wrapping_add(3);
    }

    pub(super) fn render_rainbow_comet(
        &mut self,
        now: Instant,
        duration: u16,
        comet_count: u8,
        trail_length: u8,
    ) {
        if !self.frame_due(now, millis(duration)) {
            return;
        }
        self.state.last_render = Some(now);

        let brightness = self.scene.brightness;
        let hue = self.state.hue;
        let spacing = 256 / u16::from(comet_count.max(1));
        for sink in &mut self.sinks {
            let len = sink.len();
            let pixels = sink.pixels_mut();
            for pixel in pixels.iter_mut() {
                *pixel = fade_to_black_by(*pixel, 80);
            }

            for comet in 0..comet_count {
                let position = hue.wrapping_add((u16::from(comet) * spacing) as u8);
                let led = (usize::from(position) * len) >> 8;
                if led >= len {
                    continue;
                }
                let comet_hue = position.wrapping_add(hue);
                pixels[led] = hsv(comet_hue, 255, 255);
                for tail in 1..trail_length {
                    let Some(index) = led.checked_sub(usize::from(tail)) else {
                        break;
                    };
                    let value = 255u16.saturating_sub(u16::from(tail) * 40) as u8;
                    pixels[index] = hsv(comet_hue, 255, value);
                }
            }
            sink.show(brightness);
        }
        self.state.hue = hue.wrapping_add(4);
    }

    pub(super) fn render_matrix_rain(
        &mut self,
        now: Instant,
        duration: u16,
        drop_rate: u8,
        color: Rgb,
    ) {
        if !self.frame_due(now, millis(duration)) {
            return;
        }
        self.state.last_render = Some(now);

        if self.rng.below(255) < drop_rate {
            if let Some(slot) = self.state.matrix_drops.iter_mut().find(|drop| **drop == 0) {
                *slot = 1;
            }
        }

        let brightness = self.scene.brightness;
        for sink in &mut self.sinks {
            let len = sink.len();
            let pixels = sink.pixels_mut();
            for pixel in pixels.iter_mut() {
                *pixel = fade_to_black_by(*pixel, 50);
            }
            for &drop in self.state.matrix_drops.iter().filter(|drop| **drop > 0) {
                let position = (usize::from(drop) * len) >> 8;
                if let Some(pixel) = pixels.get_mut(position) {
                    *pixel = color;
                }
            }
            sink.show(brightness);
        }

        // A drop that runs off the end frees its slot
        for drop in self.state.matrix_drops.iter_mut().filter(|drop| **drop > 0) {
            *drop = drop.checked_add(3).unwrap_or(0);
        }
    }

    pub(super) fn render_plasma_clouds(
        &mut self,
        now: Instant,
        duration: u16,
        cloud_scale: u8,
        palette: PaletteId,
    ) {
        if !self.frame_due(now, millis(duration)) {
            return;
        }
        self.state.last_render = Some(now);

        let palette = palette.palette();
        let brightness = self.scene.brightness;
        let offset = self.state.plasma_offset;
        let half_scale = cloud_scale / 2;
        for sink in &mut self.sinks {
            for (i, pixel) in sink.pixels_mut().iter_mut().enumerate() {
                let i = i as u8;
                let first = sin8(i.wrapping_mul(cloud_scale).wrapping_add(offset));
                let second = cos8(i.wrapping_mul(half_scale).wrapping_add(offset.wrapping_mul(2)));
                let combined = ((u16::from(first) + u16::from(second)) / 2) as u8;
                *pixel = color_from_palette(&palette, combined);
            }
            sink.show(brightness);
        }
        self.state.plasma_offset = offset.wrapping_add(2);
    }

    pub(super) fn render_lava_lamp(
        &mut self,
        now: Instant,
        duration: u16,
        blob_count: u8,
        palette: PaletteId,
    ) {
        if !self.frame_due(now, millis(duration)) {
            return;
        }
        self.state.last_render = Some(now);

        let palette = palette.palette();
        let brightness = self.scene.brightness;
        let time_offset = (self.since_start(now).as_millis() / 10) as u8;
        for sink in &mut self.sinks {
            let last = sink.len().saturating_sub(1);
            for (i, pixel) in sink.pixels_mut().iter_mut().enumerate() {
                let mut influence = 0u8;
                for blob in 0..blob_count {
                    let phase = time_offset.wrapping_add(blob.wrapping_mul(64));
                    let blob_position = usize::from(sin8(phase) >> 2) * last / 63;
                    let distance = i.abs_diff(blob_position);
                    if distance < BLOB_RADIUS {
                        influence = influence.max(255 - distance as u8 * 25);
                    }
                }
                *pixel = color_from_palette(&palette, influence);
            }
            sink.show(brightness);
        }
    }

    pub(super) fn render_aurora_borealis(&mut self, now: Instant, duration: u16, palette: PaletteId) {
        if !self.frame_due(now, millis(duration)) {
            return;
        }
        self.state.last_render = Some(now);

        let palette = palette.palette();
        let brightness = self.scene.brightness;
        let hue = self.state.hue;
        let drift_x = (self.state.noise_x * 2 / 10) as u8;
        let drift_y = (self.state.noise_y * 3 / 20) as u8;
        for sink in &mut self.sinks {
            for (i, pixel) in sink.pixels_mut().iter_mut().enumerate() {
                let i = i as u8;
                let first = sin8(i.wrapping_mul(4).wrapping_add(drift_x));
                let second = cos8(i.wrapping_mul(6).wrapping_add(drift_y));
                let third = sin8(i.wrapping_mul(2).wrapping_add(hue));
                let intensity = (u16::from(first) + u16::from(second) + u16::from(third)) / 3;
                *pixel = color_from_palette(&palette, intensity as u8);
            }
            sink.show(brightness);
        }

        self.state.noise_x = self.state.noise_x.wrapping_add(1);
        self.state.noise_y = self.state.noise_y.wrapping_add(1);
        self.state.hue = hue.wrapping_add(1);
    }

    /// Flash intensity is a percentage of full brightness
    pub(super) fn render_lightning_storm(
        &mut self,
        now: Instant,
        flash_intensity: u8,
        flash_frequency: u16,
    ) {
        if !self.frame_due(now, millis(flash_frequency)) {
            return;
        }
        self.state.last_render = Some(now);

        let intensity = (u16::from(flash_intensity) * 255 / 100).min(255) as u8;
        if self.rng.below(100) < 20 {
            self.show_color_all(WHITE, intensity);
            self.state.frame_number = 3;
        } else if self.state.frame_number > 0 {
            let fading = (u32::from(intensity) * self.state.frame_number / 3) as u8;
            self.show_color_all(WHITE, fading);
            self.state.frame_number -= 1;
        } else {
            let brightness = self.scene.brightness;
            for sink in &mut self.sinks {
                for pixel in sink.pixels_mut() {
                    *pixel = if self.rng.below(100) < 5 {
                        STORM_FLICKER
                    } else {
                        STORM_CLOUD
                    };
                }
                sink.show(brightness);
            }
        }
    }

    pub(super) fn render_color_explosion(
        &mut self,
        now: Instant,
        duration: u16,
        explosion_size: u8,
        palette: PaletteId,
    ) {
        if !self.frame_due(now, millis(duration)) {
            return;
        }
        self.state.last_render = Some(now);

        let palette = palette.palette();
        let brightness = self.scene.brightness;
        let hue = self.state.hue;
        let center = self.state.explosion_center;
        let elapsed = self.since_start(now);
        let size = usize::from(explosion_size.max(1));
        let falloff = 255 / size;
        for sink in &mut self.sinks {
            let span = (sink.len() * 2).max(1) as u64;
            let wave = ((elapsed.as_millis() / 20) % span) as usize;
            for (i, pixel) in sink.pixels_mut().iter_mut().enumerate() {
                let distance = i.abs_diff(center);
                let intensity = if distance <= wave && distance + size >= wave {
                    255usize.saturating_sub((wave - distance) * falloff) as u8
                } else {
                    0
                };
                *pixel = color_from_palette(&palette, intensity.wrapping_add(hue));
            }
            sink.show(brightness);
        }

        if elapsed >= EXPLOSION_INTERVAL {
            let span = self.sinks.first().map_or(1, |sink| sink.len().max(1));
            self.state.explosion_center = self.rng.index(span);
            self.state.start = Some(now);
        }
        self.state.hue = hue.wrapping_add(2);
    }

    pub(super) fn render_spiral_galaxy(
        &mut self,
        now: Instant,
        duration: u16,
        spiral_arms: u8,
        palette: PaletteId,
    ) {
        if !self.frame_due(now, millis(duration)) {
            return;
        }
        self.state.last_render = Some(now);

        let palette = palette.palette();
        let brightness = self.scene.brightness;
        let (angle, hue) = (self.state.spiral_angle, self.state.hue);
        let arms = usize::from(spiral_arms.max(1));
        let arm_spacing = 256 / arms;
        for sink in &mut self.sinks {
            let len = sink.len().max(1);
            for (i, pixel) in sink.pixels_mut().iter_mut().enumerate() {
                let radial = i * 256 / len;
                let position = (radial as u8).wrapping_add(angle);
                let arm_offset = ((i * arms / len) * arm_spacing) as u8;
                let intensity = sin8(position.wrapping_add(arm_offset));
                let fade = 255 - 128usize.abs_diff(radial).min(255) as u8;
                let value = ((u16::from(intensity) * u16::from(fade)) >> 8) as u8;
                *pixel = color_from_palette(&palette, value.wrapping_add(hue));
            }
            sink.show(brightness);
        }
        self.state.spiral_angle = angle.wrapping_add(2);
        self.state.hue = hue.wrapping_add(1);
    }
}
