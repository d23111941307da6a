#![no_std]

//! Playa light composer - scenes, palettes and the render engine
//!
//! Layers:
//! - `sink` - Pixel outputs (`[PixelSink]` trait + a driver-backed strip)
//! - `palette` - Named gradient registry expanded to 16-entry palettes
//! - `scene` - Effect catalog and the [`Scene`] descriptor
//! - `engine` - Holds the active scene and renders one frame per call
//! - `math8` - FastLED-style 8-bit helpers and the effect RNG
//!
//! The engine borrows its sinks and never touches hardware directly.

extern crate alloc;

pub mod color;
pub mod engine;
pub mod math8;
pub mod palette;
pub mod scene;
pub mod sink;

// Engine exports
pub use engine::{EngineError, LightEngine, MAX_SINKS};

// Palette exports
pub use palette::{Palette16, PaletteId, color_from_palette};

// Scene exports
pub use scene::{Effect, EffectId, Scene};

// Sink exports
pub use sink::{FrameRecorder, LedDriver, PixelSink, StripSink};

pub use color::Rgb;
