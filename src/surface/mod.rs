//! Drawing surface abstraction shared by the mask painter, the scratch pad and
//! the fireworks renderer.
//!
//! The trait mirrors the small slice of the 2D canvas API the card needs:
//! path clipping, a gradient rect fill, filled circles, round-capped lines, a
//! composite switch for erasing and RGBA readback. `CanvasSurface` drives a
//! real `<canvas>`; `PixmapSurface` renders in software so the same logic runs
//! headless and under `cargo test`.

use crate::geometry::{PathCmd, Point};

#[cfg(target_arch = "wasm32")]
mod canvas;
mod pixmap;

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasSurface;
pub use pixmap::PixmapSurface;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::hex(0xFFFFFF);

    /// Build from a packed `0xRRGGBB` literal.
    pub const fn hex(v: u32) -> Self {
        Self {
            r: (v >> 16) as u8,
            g: (v >> 8) as u8,
            b: v as u8,
        }
    }

    pub fn to_css(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Solid colour plus global alpha for a single draw call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fill {
    pub color: Rgb,
    pub alpha: f64,
}

impl Fill {
    pub const fn opaque(color: Rgb) -> Self {
        Self { color, alpha: 1.0 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradientStop {
    pub offset: f32,
    pub color: Rgb,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LinearGradient<'a> {
    pub from: Point,
    pub to: Point,
    pub stops: &'a [GradientStop],
}

/// How new draws combine with what is already on the surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Composite {
    /// Paint over ("source-over").
    #[default]
    SourceOver,
    /// Remove coverage where drawn ("destination-out").
    DestinationOut,
}

impl Composite {
    pub fn css_name(self) -> &'static str {
        match self {
            Composite::SourceOver => "source-over",
            Composite::DestinationOut => "destination-out",
        }
    }
}

pub trait Surface {
    /// Intrinsic size in pixels.
    fn size(&self) -> (u32, u32);

    /// Push clip and composite state.
    fn save(&mut self);
    fn restore(&mut self);

    /// Intersect the current clip with the closed path (non-zero winding).
    fn clip(&mut self, path: &[PathCmd]);

    fn set_composite(&mut self, mode: Composite);

    fn fill_rect_gradient(&mut self, x: f64, y: f64, w: f64, h: f64, gradient: &LinearGradient);

    fn fill_circle(&mut self, center: Point, radius: f64, fill: Fill);

    /// Stroke a straight segment with round caps.
    fn stroke_line(&mut self, from: Point, to: Point, width: f64, fill: Fill);

    /// Make every pixel fully transparent. Called outside any clip.
    fn clear(&mut self);

    /// RGBA bytes, row-major, or `None` if the backend cannot read back.
    fn read_rgba(&self) -> Option<Vec<u8>>;
}
