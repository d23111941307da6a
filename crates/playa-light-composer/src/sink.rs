//! Pixel sinks
//!
//! A sink owns a pixel buffer and knows how to push it to hardware. The
//! engine only borrows sinks; it never owns them.

use alloc::{vec, vec::Vec};

use crate::{color::Rgb, math8::scale8};

/// Output destination for rendered frames
pub trait PixelSink {
    /// Number of pixels
    fn len(&self) -> usize {
        self.pixels().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current buffer contents
    fn pixels(&self) -> &[Rgb];

    /// Mutable access to the buffer
    fn pixels_mut(&mut self) -> &mut [Rgb];

    /// Show one color on every pixel without touching the buffer
    fn show_color(&mut self, color: Rgb, brightness: u8);

    /// Push the current buffer
    fn show(&mut self, brightness: u8);
}

/// Abstract LED driver trait
///
/// Implement this trait to support different hardware platforms.
pub trait LedDriver {
    /// Write colors to the LED strip
    fn write(&mut self, colors: &[Rgb]);
}

/// Heap-backed sink that applies brightness and forwards frames to a driver
pub struct StripSink<D: LedDriver> {
    driver: D,
    pixels: Vec<Rgb>,
    frame: Vec<Rgb>,
}

impl<D: LedDriver> StripSink<D> {
    pub fn new(driver: D, len: usize) -> Self {
        Self {
            driver,
            pixels: vec![Rgb::default(); len],
            frame: vec![Rgb::default(); len],
        }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }
}

impl<D: LedDriver> PixelSink for StripSink<D> {
    fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    fn pixels_mut(&mut self) -> &mut [Rgb] {
        &mut self.pixels
    }

    fn show_color(&mut self, color: Rgb, brightness: u8) {
        let scaled = scale_color(color, brightness);
        self.frame.fill(scaled);
        self.driver.write(&self.frame);
    }

    fn show(&mut self, brightness: u8) {
        for (out, pixel) in self.frame.iter_mut().zip(self.pixels.iter()) {
            *out = scale_color(*pixel, brightness);
        }
        self.driver.write(&self.frame);
    }
}

/// Driver that keeps the last written frame, for hosts and tests
#[derive(Debug, Default, Clone)]
pub struct FrameRecorder {
    last: Vec<Rgb>,
    writes: usize,
}

impl FrameRecorder {
    pub fn last_frame(&self) -> &[Rgb] {
        &self.last
    }

    /// Number of frames written so far
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl LedDriver for FrameRecorder {
    fn write(&mut self, colors: &[Rgb]) {
        self.last.clear();
        self.last.extend_from_slice(colors);
        self.writes += 1;
    }
}

#[inline]
fn scale_color(color: Rgb, brightness: u8) -> Rgb {
    if brightness == u8::MAX {
        return color;
    }
    Rgb {
        r: scale8(color.r, brightness),
        g: scale8(color.g, brightness),
        b: scale8(color.b, brightness),
    }
}
