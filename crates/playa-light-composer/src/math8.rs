//! 8-bit fixed-point helpers shared by the effect renderers.
//!
//! The wave and scaling functions follow the FastLED conventions so that
//! effects keep the same look on every sink.

use crate::color::Rgb;

/// Scale an 8-bit value by a factor (0-255 = 0.0-1.0)
///
/// Uses integer math for efficiency on embedded systems.
#[inline]
#[allow(clippy::cast_lossless, clippy::cast_possible_truncation)]
pub const fn scale8(value: u8, scale: u8) -> u8 {
    ((value as u16 * scale as u16) >> 8) as u8
}

/// Blend two 8-bit values
///
/// # Arguments
/// * `a` - First value
/// * `b` - Second value
/// * `amount_of_b` - Blend factor (0 = all a, 255 = all b)
#[inline]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn blend8(a: u8, b: u8, amount_of_b: u8) -> u8 {
    let a = i16::from(a);
    let b = i16::from(b);
    let amount = i16::from(amount_of_b);

    (a + (((b - a) * amount) >> 8)) as u8
}

/// Linear interpolation between two 8-bit values, always landing on `a`
/// for `frac == 0`.
#[inline]
pub const fn lerp8(a: u8, b: u8, frac: u8) -> u8 {
    if b > a {
        a + scale8(b - a, frac)
    } else {
        a - scale8(a - b, frac)
    }
}

/// Interleaved base/slope pairs for the four sine quadrant sections.
const SIN8_TABLE: [u8; 8] = [0, 49, 49, 41, 90, 27, 117, 10];

/// Fast 8-bit sine approximation: input 0-255 is one full cycle, output is
/// centered on 128.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub const fn sin8(theta: u8) -> u8 {
    let mut offset = theta;
    if theta & 0x40 != 0 {
        offset = 255 - offset;
    }
    offset &= 0x3F;

    let mut secoffset = offset & 0x0F;
    if theta & 0x40 != 0 {
        secoffset += 1;
    }

    let section = (offset >> 4) as usize;
    let b = SIN8_TABLE[section * 2] as i16;
    let m16 = SIN8_TABLE[section * 2 + 1] as u16;

    let mx = ((m16 * secoffset as u16) >> 4) as i16;
    let mut y = mx + b;
    if theta & 0x80 != 0 {
        y = -y;
    }

    (y + 128) as u8
}

/// Fast 8-bit cosine approximation
#[inline]
pub const fn cos8(theta: u8) -> u8 {
    sin8(theta.wrapping_add(64))
}

/// Dim a color toward black by `amount` (0 = unchanged, 255 = black)
#[inline]
pub const fn fade_to_black_by(color: Rgb, amount: u8) -> Rgb {
    let keep = 255 - amount;
    Rgb {
        r: scale8(color.r, keep),
        g: scale8(color.g, keep),
        b: scale8(color.b, keep),
    }
}

/// Linear interpolation between two colors
#[inline]
pub const fn lerp_colors(a: Rgb, b: Rgb, frac: u8) -> Rgb {
    Rgb {
        r: lerp8(a.r, b.r, frac),
        g: lerp8(a.g, b.g, frac),
        b: lerp8(a.b, b.b, frac),
    }
}

/// Small linear congruential generator for effect randomness.
///
/// Not cryptographic. Seeded once by the firmware from the hardware RNG.
#[derive(Clone, Debug)]
pub struct Random8 {
    seed: u16,
}

impl Random8 {
    pub const fn new(seed: u16) -> Self {
        Self { seed }
    }

    /// Reseed with entropy from the platform
    pub fn add_entropy(&mut self, entropy: u16) {
        self.seed = self.seed.wrapping_add(entropy);
    }

    /// Next value in 0..=255
    #[allow(clippy::cast_possible_truncation)]
    pub fn next_u8(&mut self) -> u8 {
        self.seed = self.seed.wrapping_mul(2053).wrapping_add(13849);
        ((self.seed & 0xFF) as u8).wrapping_add((self.seed >> 8) as u8)
    }

    /// Next value in 0..=65535
    pub fn next_u16(&mut self) -> u16 {
        let hi = u16::from(self.next_u8());
        let lo = u16::from(self.next_u8());
        (hi << 8) | lo
    }

    /// Value in `0..lim`; returns 0 for an empty range
    #[allow(clippy::cast_possible_truncation)]
    pub fn below(&mut self, lim: u8) -> u8 {
        ((u16::from(self.next_u8()) * u16::from(lim)) >> 8) as u8
    }

    /// Value in `min..lim`; returns `min` when the range is empty
    pub fn between(&mut self, min: u8, lim: u8) -> u8 {
        if lim <= min {
            return min;
        }
        min + self.below(lim - min)
    }

    /// Index in `0..len`; returns 0 for an empty range
    #[allow(clippy::cast_possible_truncation)]
    pub fn index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        (u32::from(self.next_u16()) as usize * len) >> 16
    }
}

impl Default for Random8 {
    fn default() -> Self {
        Self::new(1337)
    }
}
