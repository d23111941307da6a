//! Tests for the palette registry, effect catalog and 8-bit helpers.

use playa_light_composer::{
    EffectId, PaletteId, Rgb, color_from_palette,
    math8::{Random8, cos8, fade_to_black_by, lerp8, scale8, sin8},
    palette::PALETTE_SIZE,
};

// -----------------------------------------------------------------------------
// Palettes
// -----------------------------------------------------------------------------

#[test]
fn palette_ids_round_trip_through_raw_values() {
    for id in PaletteId::ALL {
        assert_eq!(PaletteId::from_raw(id.as_u8()), Some(id));
    }
    assert_eq!(PaletteId::from_raw(PaletteId::MAX_ID + 1), None);
}

#[test]
fn palette_lookup_accepts_long_names() {
    assert_eq!(PaletteId::find("lava"), Some(PaletteId::Lava));
    assert_eq!(PaletteId::find("lavaPalette"), Some(PaletteId::Lava));
    assert_eq!(PaletteId::find("FatBoy"), Some(PaletteId::Fatboy));
    assert_eq!(PaletteId::find("palette"), None);
    assert_eq!(PaletteId::parse_from_str("no-such-palette"), PaletteId::Cool);
}

#[test]
fn fatboy_is_wire_id_seven() {
    assert_eq!(PaletteId::from_raw(7), Some(PaletteId::Fatboy));
    assert_eq!(PaletteId::Fatboy.as_str(), "fatboy");
}

#[test]
fn palette_sampling_hits_entries_on_slot_boundaries() {
    for id in PaletteId::ALL {
        let palette = id.palette();
        for slot in 0..PALETTE_SIZE {
            let index = u8::try_from(slot * 16).unwrap();
            assert_eq!(color_from_palette(&palette, index), palette.entry(slot));
        }
    }
}

#[test]
fn gradient_endpoints_are_kept() {
    // cool runs from cyan to magenta
    let palette = PaletteId::Cool.palette();
    assert_eq!(palette.entry(0), Rgb { r: 0, g: 255, b: 255 });
    assert_eq!(palette.entry(PALETTE_SIZE - 1), Rgb { r: 255, g: 0, b: 255 });
}

// -----------------------------------------------------------------------------
// Effect catalog
// -----------------------------------------------------------------------------

#[test]
fn effect_names_resolve_both_ways() {
    for id in EffectId::ALL {
        assert_eq!(EffectId::find(id.as_str()), Some(id));
        assert_eq!(EffectId::from_raw(id.as_u8()), Some(id));
    }
    assert_eq!(EffectId::find("palette_stream"), Some(EffectId::PaletteStream));
    assert_eq!(EffectId::parse_from_str("bogus"), EffectId::PaletteStream);
}

#[test]
fn position_effects_are_flagged() {
    assert!(EffectId::Speedometer.is_position_dependent());
    assert!(EffectId::ColorWheel.is_position_dependent());
    assert!(!EffectId::FirePlasma.is_position_dependent());
}

// -----------------------------------------------------------------------------
// math8
// -----------------------------------------------------------------------------

#[test]
fn sine_table_hits_quadrant_points() {
    assert_eq!(sin8(0), 128);
    assert_eq!(sin8(64), 255);
    assert_eq!(sin8(128), 128);
    assert_eq!(sin8(192), 1);
    assert_eq!(cos8(0), sin8(64));
}

#[test]
fn scaling_helpers_match_fixed_point_math() {
    assert_eq!(scale8(255, 128), 127);
    assert_eq!(scale8(200, 0), 0);
    assert_eq!(lerp8(10, 200, 0), 10);
    assert_eq!(lerp8(200, 10, 255), 11);
    assert_eq!(fade_to_black_by(Rgb { r: 200, g: 100, b: 0 }, 255), Rgb::default());
}

#[test]
fn random_ranges_are_respected() {
    let mut rng = Random8::new(7);
    for _ in 0..1_000 {
        assert!(rng.below(100) < 100);
        let value = rng.between(50, 255);
        assert!((50..255).contains(&value));
        assert!(rng.index(13) < 13);
    }
    assert_eq!(rng.below(0), 0);
    assert_eq!(rng.index(0), 0);
}
