//! Gold heart mask: gradient base clipped to the heart, sprinkled with glitter.

use rand::Rng;

use crate::config::ScratchConfig;
use crate::geometry::{Point, heart_outline};
use crate::surface::{Composite, Fill, GradientStop, LinearGradient, Rgb, Surface};

pub const GOLD_STOPS: [GradientStop; 5] = [
    GradientStop {
        offset: 0.0,
        color: Rgb::hex(0xBF953F),
    },
    GradientStop {
        offset: 0.25,
        color: Rgb::hex(0xFCF6BA),
    },
    GradientStop {
        offset: 0.5,
        color: Rgb::hex(0xB38728),
    },
    GradientStop {
        offset: 0.75,
        color: Rgb::hex(0xFBF5B7),
    },
    GradientStop {
        offset: 1.0,
        color: Rgb::hex(0xAA771C),
    },
];

pub const GLITTER_GOLD: Rgb = Rgb::hex(0xFFD700);

/// Paint the mask over the whole surface.
///
/// Safe to call again at any time: drawing always uses source-over inside a
/// saved state, so previously erased areas become opaque again and the
/// surface's composite mode is left as it was.
pub fn paint_mask<S, R>(surface: &mut S, rng: &mut R, config: &ScratchConfig)
where
    S: Surface + ?Sized,
    R: Rng,
{
    let (w, h) = surface.size();
    if w == 0 || h == 0 {
        log::warn!("mask surface has no area; nothing to paint");
        return;
    }
    let (w, h) = (w as f64, h as f64);

    surface.save();
    surface.set_composite(Composite::SourceOver);
    surface.clip(&heart_outline(w, h));

    let gradient = LinearGradient {
        from: Point::new(0.0, 0.0),
        to: Point::new(w, h),
        stops: &GOLD_STOPS,
    };
    surface.fill_rect_gradient(0.0, 0.0, w, h, &gradient);

    for _ in 0..config.glitter_count {
        let color = if rng.gen_bool(0.5) {
            Rgb::WHITE
        } else {
            GLITTER_GOLD
        };
        let alpha = rng.gen_range(0.0..1.0) * config.glitter_max_alpha;
        let center = Point::new(rng.gen_range(0.0..w), rng.gen_range(0.0..h));
        let radius = rng.gen_range(0.0..1.0) * config.glitter_max_radius;
        surface.fill_circle(center, radius, Fill { color, alpha });
    }

    surface.restore();
    log::debug!("mask painted ({} glitter dots)", config.glitter_count);
}
