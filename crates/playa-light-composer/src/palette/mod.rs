//! Palette registry
//!
//! A closed set of named gradients. Every gradient is expanded into a
//! 16-entry palette which is sampled with linear blending between entries.

mod gradients;

use gradients::Gradient;

use crate::{color::Rgb, math8::scale8};

/// Number of entries in an expanded palette
pub const PALETTE_SIZE: usize = 16;

/// Identifier of a registered palette. The discriminant is the wire id.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum PaletteId {
    Candy = 0,
    #[default]
    Cool = 1,
    CosmicWaves = 2,
    Earth = 3,
    Eblossom = 4,
    Emerald = 5,
    Everglow = 6,
    Fatboy = 7,
    Fireice = 8,
    FireyNight = 9,
    Flame = 10,
    Heart = 11,
    Lava = 12,
    Meadow = 13,
    Melonball = 14,
    Nebula = 15,
    Oasis = 16,
    Pinksplash = 17,
    R = 18,
    Sofia = 19,
    Sunset = 20,
    SunsetFusion = 21,
    Trove = 22,
    Vivid = 23,
    Velvet = 24,
    Vga = 25,
    Wave = 26,
    ElectricDesert = 27,
    PsychedelicPlaya = 28,
    BurningRainbow = 29,
    NeonNights = 30,
    DesertStorm = 31,
    CosmicFire = 32,
    AlienGlow = 33,
    MoltenMetal = 34,
}

impl PaletteId {
    /// Highest valid wire id
    pub const MAX_ID: u8 = PaletteId::MoltenMetal as u8;

    pub const ALL: [PaletteId; 35] = [
        PaletteId::Candy,
        PaletteId::Cool,
        PaletteId::CosmicWaves,
        PaletteId::Earth,
        PaletteId::Eblossom,
        PaletteId::Emerald,
        PaletteId::Everglow,
        PaletteId::Fatboy,
        PaletteId::Fireice,
        PaletteId::FireyNight,
        PaletteId::Flame,
        PaletteId::Heart,
        PaletteId::Lava,
        PaletteId::Meadow,
        PaletteId::Melonball,
        PaletteId::Nebula,
        PaletteId::Oasis,
        PaletteId::Pinksplash,
        PaletteId::R,
        PaletteId::Sofia,
        PaletteId::Sunset,
        PaletteId::SunsetFusion,
        PaletteId::Trove,
        PaletteId::Vivid,
        PaletteId::Velvet,
        PaletteId::Vga,
        PaletteId::Wave,
        PaletteId::ElectricDesert,
        PaletteId::PsychedelicPlaya,
        PaletteId::BurningRainbow,
        PaletteId::NeonNights,
        PaletteId::DesertStorm,
        PaletteId::CosmicFire,
        PaletteId::AlienGlow,
        PaletteId::MoltenMetal,
    ];

    pub const fn from_raw(raw: u8) -> Option<Self> {
        if raw > Self::MAX_ID {
            return None;
        }
        Some(Self::ALL[raw as usize])
    }

    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Candy => "candy",
            Self::Cool => "cool",
            Self::CosmicWaves => "cosmicwaves",
            Self::Earth => "earth",
            Self::Eblossom => "eblossom",
            Self::Emerald => "emerald",
            Self::Everglow => "everglow",
            Self::Fatboy => "fatboy",
            Self::Fireice => "fireice",
            Self::FireyNight => "fireynight",
            Self::Flame => "flame",
            Self::Heart => "heart",
            Self::Lava => "lava",
            Self::Meadow => "meadow",
            Self::Melonball => "melonball",
            Self::Nebula => "nebula",
            Self::Oasis => "oasis",
            Self::Pinksplash => "pinksplash",
            Self::R => "r",
            Self::Sofia => "sofia",
            Self::Sunset => "sunset",
            Self::SunsetFusion => "sunsetfusion",
            Self::Trove => "trove",
            Self::Vivid => "vivid",
            Self::Velvet => "velvet",
            Self::Vga => "vga",
            Self::Wave => "wave",
            Self::ElectricDesert => "electricdesert",
            Self::PsychedelicPlaya => "psychedelicplaya",
            Self::BurningRainbow => "burningrainbow",
            Self::NeonNights => "neonnights",
            Self::DesertStorm => "desertstorm",
            Self::CosmicFire => "cosmicfire",
            Self::AlienGlow => "alienglow",
            Self::MoltenMetal => "moltenmetal",
        }
    }

    /// Look a palette up by name, ignoring ASCII case. Both `lava` and the
    /// long form `lavaPalette` are accepted.
    pub fn find(name: &str) -> Option<Self> {
        let name = name.trim_matches(char::from(0)).trim();
        if let Some(id) = Self::ALL
            .iter()
            .copied()
            .find(|id| id.as_str().eq_ignore_ascii_case(name))
        {
            return Some(id);
        }

        const SUFFIX: &str = "palette";
        let split = name.len().checked_sub(SUFFIX.len())?;
        let (stem, suffix) = (name.get(..split)?, name.get(split..)?);
        if stem.is_empty() || !suffix.eq_ignore_ascii_case(SUFFIX) {
            return None;
        }
        Self::ALL
            .iter()
            .copied()
            .find(|id| id.as_str().eq_ignore_ascii_case(stem))
    }

    /// Parse a palette name, falling back to [`PaletteId::Cool`] for
    /// anything unknown.
    pub fn parse_from_str(name: &str) -> Self {
        Self::find(name).unwrap_or(Self::Cool)
    }

    const fn gradient(self) -> Gradient {
        match self {
            Self::Candy => gradients::CANDY,
            Self::Cool => gradients::COOL,
            Self::CosmicWaves => gradients::COSMIC_WAVES,
            Self::Earth => gradients::EARTH,
            Self::Eblossom => gradients::EBLOSSOM,
            Self::Emerald => gradients::EMERALD,
            Self::Everglow => gradients::EVERGLOW,
            Self::Fatboy => gradients::FATBOY,
            Self::Fireice => gradients::FIREICE,
            Self::FireyNight => gradients::FIREY_NIGHT,
            Self::Flame => gradients::FLAME,
            Self::Heart => gradients::HEART,
            Self::Lava => gradients::LAVA,
            Self::Meadow => gradients::MEADOW,
            Self::Melonball => gradients::MELONBALL,
            Self::Nebula => gradients::NEBULA,
            Self::Oasis => gradients::OASIS,
            Self::Pinksplash => gradients::PINKSPLASH,
            Self::R => gradients::R,
            Self::Sofia => gradients::SOFIA,
            Self::Sunset => gradients::SUNSET,
            Self::SunsetFusion => gradients::SUNSET_FUSION,
            Self::Trove => gradients::TROVE,
            Self::Vivid => gradients::VIVID,
            Self::Velvet => gradients::VELVET,
            Self::Vga => gradients::VGA,
            Self::Wave => gradients::WAVE,
            Self::ElectricDesert => gradients::ELECTRIC_DESERT,
            Self::PsychedelicPlaya => gradients::PSYCHEDELIC_PLAYA,
            Self::BurningRainbow => gradients::BURNING_RAINBOW,
            Self::NeonNights => gradients::NEON_NIGHTS,
            Self::DesertStorm => gradients::DESERT_STORM,
            Self::CosmicFire => gradients::COSMIC_FIRE,
            Self::AlienGlow => gradients::ALIEN_GLOW,
            Self::MoltenMetal => gradients::MOLTEN_METAL,
        }
    }

    /// Expand the gradient into a 16-entry palette
    pub fn palette(self) -> Palette16 {
        Palette16::from_gradient(self.gradient())
    }
}

/// A 16-entry color palette
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette16 {
    entries: [Rgb; PALETTE_SIZE],
}

impl Palette16 {
    pub const fn from_entries(entries: [Rgb; PALETTE_SIZE]) -> Self {
        Self { entries }
    }

    pub const fn entries(&self) -> &[Rgb; PALETTE_SIZE] {
        &self.entries
    }

    pub const fn entry(&self, index: usize) -> Rgb {
        self.entries[index % PALETTE_SIZE]
    }

    /// Expand gradient anchors over the 16 slots. Each anchor pair fills
    /// the slot range `start/16..=end/16`; overlapping ranges are pushed
    /// forward so every anchor gets at least one slot while slots remain.
    fn from_gradient(stops: Gradient) -> Self {
        let mut entries = [Rgb::default(); PALETTE_SIZE];
        let Some(first) = stops.first() else {
            return Self { entries };
        };

        let count = stops.len() - 1;
        let mut start_index = usize::from(first[0]);
        let mut start_color = stop_color(*first);
        let mut last_slot: Option<usize> = None;

        for stop in &stops[1..] {
            let end_index = usize::from(stop[0]);
            let end_color = stop_color(*stop);

            let mut start_slot = start_index / PALETTE_SIZE;
            let mut end_slot = end_index / PALETTE_SIZE;
            if count < PALETTE_SIZE {
                if let Some(last) = last_slot {
                    if start_slot <= last && last < PALETTE_SIZE - 1 {
                        start_slot = last + 1;
                        end_slot = end_slot.max(start_slot);
                    }
                }
                last_slot = Some(end_slot);
            }

            fill_gradient(&mut entries, start_slot, start_color, end_slot, end_color);
            start_index = end_index;
            start_color = end_color;
        }

        Self { entries }
    }
}

const fn stop_color(stop: [u8; 4]) -> Rgb {
    Rgb {
        r: stop[1],
        g: stop[2],
        b: stop[3],
    }
}

/// Linear RGB fill between two slots using 8.8 fixed-point steps
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_possible_wrap)]
fn fill_gradient(
    entries: &mut [Rgb; PALETTE_SIZE],
    start: usize,
    start_color: Rgb,
    end: usize,
    end_color: Rgb,
) {
    let (start, start_color, end, end_color) = if end < start {
        (end, end_color, start, start_color)
    } else {
        (start, start_color, end, end_color)
    };
    let end = end.min(PALETTE_SIZE - 1);
    if start > end {
        return;
    }

    let divisor = (end - start).max(1) as i32;
    let delta = |from: u8, to: u8| ((i32::from(to) - i32::from(from)) << 7) / divisor * 2;
    let (dr, dg, db) = (
        delta(start_color.r, end_color.r),
        delta(start_color.g, end_color.g),
        delta(start_color.b, end_color.b),
    );

    let mut r = i32::from(start_color.r) << 8;
    let mut g = i32::from(start_color.g) << 8;
    let mut b = i32::from(start_color.b) << 8;
    for entry in &mut entries[start..=end] {
        *entry = Rgb {
            r: (r >> 8) as u8,
            g: (g >> 8) as u8,
            b: (b >> 8) as u8,
        };
        r += dr;
        g += dg;
        b += db;
    }
}

/// Sample a palette at `index` (0-255), blending linearly between the two
/// nearest entries. The top slot blends back into slot zero.
pub fn color_from_palette(palette: &Palette16, index: u8) -> Rgb {
    let hi = usize::from(index >> 4);
    let lo = index & 0x0F;
    let entry = palette.entries[hi];
    if lo == 0 {
        return entry;
    }

    let next = palette.entries[(hi + 1) % PALETTE_SIZE];
    let f2 = lo << 4;
    let f1 = 255 - f2;
    Rgb {
        r: scale8(entry.r, f1) + scale8(next.r, f2),
        g: scale8(entry.g, f1) + scale8(next.g, f2),
        b: scale8(entry.b, f1) + scale8(next.b, f2),
    }
}
