//! Erasing the mask and deciding when the card counts as revealed.
//!
//! `ScratchPad` is a two-state machine (`Masked` -> `Revealed`, never back).
//! While masked, strokes cut holes into the surface with a round brush; every so
//! often the surface's alpha channel is sampled and, once the opaque share drops
//! under the configured threshold, the pad flips to `Revealed`, wipes the
//! surface and fires its reveal callback. The callback is an `FnOnce`, so it can
//! fire at most once by construction.

use rand::Rng;

use crate::config::{CheckPolicy, ScratchConfig};
use crate::geometry::Point;
use crate::surface::{Composite, Fill, Rgb, Surface};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Masked,
    Revealed,
}

/// Pointer / touch input already mapped into surface pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerInput {
    Down(Point),
    Move(Point),
    Up,
    Leave,
    Cancel,
}

#[derive(Clone, Copy, Debug)]
struct Stroke {
    last: Point,
    moves: u32,
}

pub struct ScratchPad {
    config: ScratchConfig,
    phase: Phase,
    stroke: Option<Stroke>,
    on_reveal: Option<Box<dyn FnOnce()>>,
}

/// Percentage (0..=100) of sampled pixels with any coverage left.
///
/// Only the alpha byte of every `stride`-th pixel is read. A buffer with no
/// samples counts as fully uncovered.
pub fn opaque_percentage(rgba: &[u8], stride: usize) -> f64 {
    let step = stride.max(1) * 4;
    let mut total = 0usize;
    let mut opaque = 0usize;
    for alpha in rgba.iter().skip(3).step_by(step) {
        total += 1;
        if *alpha > 0 {
            opaque += 1;
        }
    }
    if total == 0 {
        return 0.0;
    }
    100.0 * opaque as f64 / total as f64
}

/// `gen_bool` panics outside `0..=1`; a NaN or infinite probability never checks.
fn check_probability(p: f64) -> f64 {
    if p.is_finite() { p.clamp(0.0, 1.0) } else { 0.0 }
}

impl ScratchPad {
    pub fn new(config: ScratchConfig) -> Self {
        Self {
            config,
            phase: Phase::Masked,
            stroke: None,
            on_reveal: None,
        }
    }

    /// Register the callback fired on the first detected reveal. Replaces any
    /// earlier callback that has not fired yet.
    pub fn on_reveal(&mut self, f: impl FnOnce() + 'static) {
        if self.phase == Phase::Masked {
            self.on_reveal = Some(Box::new(f));
        }
    }

    pub fn config(&self) -> &ScratchConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_revealed(&self) -> bool {
        self.phase == Phase::Revealed
    }

    pub fn is_stroking(&self) -> bool {
        self.stroke.is_some()
    }

    /// Route one input event. Returns the measured opaque percentage when a
    /// progress check ran.
    pub fn handle<S, R>(&mut self, surface: &mut S, input: PointerInput, rng: &mut R) -> Option<f64>
    where
        S: Surface + ?Sized,
        R: Rng,
    {
        match input {
            PointerInput::Down(p) => {
                self.begin_stroke(surface, p);
                None
            }
            PointerInput::Move(p) => self.continue_stroke(surface, p, rng),
            PointerInput::Up | PointerInput::Leave | PointerInput::Cancel => {
                self.end_stroke(surface)
            }
        }
    }

    /// Start a stroke and erase under the press point. Ignored once revealed.
    pub fn begin_stroke<S: Surface + ?Sized>(&mut self, surface: &mut S, point: Point) -> bool {
        if self.is_revealed() {
            return false;
        }
        self.erase(surface, None, point);
        self.stroke = Some(Stroke {
            last: point,
            moves: 0,
        });
        true
    }

    /// Extend the active stroke to `point`, then maybe sample progress
    /// according to the check policy.
    pub fn continue_stroke<S, R>(&mut self, surface: &mut S, point: Point, rng: &mut R) -> Option<f64>
    where
        S: Surface + ?Sized,
        R: Rng,
    {
        if self.is_revealed() {
            return None;
        }
        let mut stroke = self.stroke?;
        self.erase(surface, Some(stroke.last), point);
        stroke.last = point;
        stroke.moves = stroke.moves.wrapping_add(1);
        self.stroke = Some(stroke);

        let due = match self.config.check_policy {
            CheckPolicy::Random { probability } => rng.gen_bool(check_probability(probability)),
            CheckPolicy::EveryNth { n } => stroke.moves % n.max(1) == 0,
            CheckPolicy::StrokeEnd => false,
        };
        if due { self.check_progress(surface) } else { None }
    }

    /// Finish the stroke (if any) and always sample progress once.
    pub fn end_stroke<S: Surface + ?Sized>(&mut self, surface: &mut S) -> Option<f64> {
        self.stroke = None;
        if self.is_revealed() {
            return None;
        }
        self.check_progress(surface)
    }

    /// Sample the surface and reveal if the opaque share fell below the
    /// threshold. `None` when the surface cannot be read back.
    pub fn check_progress<S: Surface + ?Sized>(&mut self, surface: &mut S) -> Option<f64> {
        let rgba = surface.read_rgba()?;
        let pct = opaque_percentage(&rgba, self.config.sample_stride);
        log::debug!("scratch progress: {pct:.1}% opaque");
        if pct < self.config.reveal_threshold && self.phase == Phase::Masked {
            log::info!(
                "revealed at {pct:.1}% opaque (threshold {}%)",
                self.config.reveal_threshold
            );
            self.enter_revealed(surface);
            if let Some(cb) = self.on_reveal.take() {
                cb();
            }
        }
        Some(pct)
    }

    /// Reveal on the parent's behalf. The reveal callback is dropped unfired.
    pub fn force_reveal<S: Surface + ?Sized>(&mut self, surface: &mut S) {
        if self.phase == Phase::Masked {
            log::info!("reveal forced");
        }
        self.enter_revealed(surface);
        self.on_reveal = None;
    }

    fn enter_revealed<S: Surface + ?Sized>(&mut self, surface: &mut S) {
        self.phase = Phase::Revealed;
        self.stroke = None;
        surface.clear();
    }

    fn erase<S: Surface + ?Sized>(&self, surface: &mut S, from: Option<Point>, to: Point) {
        let brush = Fill::opaque(Rgb::WHITE);
        let r = self.config.brush_radius;
        surface.save();
        surface.set_composite(Composite::DestinationOut);
        surface.fill_circle(to, r, brush);
        if let Some(from) = from {
            surface.stroke_line(from, to, r * 2.0, brush);
        }
        surface.restore();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::PixmapSurface;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::cell::Cell;
    use std::rc::Rc;

    fn opaque_surface(w: u32, h: u32) -> PixmapSurface {
        let mut s = PixmapSurface::new(w, h).unwrap();
        let g = crate::surface::LinearGradient {
            from: Point::new(0.0, 0.0),
            to: Point::new(w as f64, h as f64),
            stops: &crate::mask::GOLD_STOPS,
        };
        s.fill_rect_gradient(0.0, 0.0, w as f64, h as f64, &g);
        s
    }

    fn counter(pad: &mut ScratchPad) -> Rc<Cell<u32>> {
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        pad.on_reveal(move || h.set(h.get() + 1));
        hits
    }

    #[test]
    fn sampling_reads_every_fourth_alpha() {
        // 8 pixels: sampled are #0 and #4.
        let mut rgba = vec![0u8; 8 * 4];
        rgba[3] = 255;
        rgba[4 * 4 + 3] = 0;
        rgba[4 + 3] = 255; // not sampled
        assert_eq!(opaque_percentage(&rgba, 4), 50.0);
        assert_eq!(opaque_percentage(&rgba, 1), 25.0);
        assert_eq!(opaque_percentage(&[], 4), 0.0);
    }

    #[test]
    fn move_without_press_does_nothing() {
        let mut s = opaque_surface(50, 50);
        let mut pad = ScratchPad::new(ScratchConfig::default());
        let before = s.read_rgba().unwrap();
        let res = pad.continue_stroke(&mut s, Point::new(25.0, 25.0), &mut StdRng::seed_from_u64(0));
        assert_eq!(res, None);
        assert_eq!(s.read_rgba().unwrap(), before);
    }

    #[test]
    fn drag_leaves_continuous_trail() {
        let mut s = opaque_surface(400, 100);
        let cfg = ScratchConfig {
            brush_radius: 10.0,
            check_policy: CheckPolicy::StrokeEnd,
            ..ScratchConfig::default()
        };
        let mut pad = ScratchPad::new(cfg);
        let mut rng = StdRng::seed_from_u64(0);
        pad.begin_stroke(&mut s, Point::new(20.0, 50.0));
        pad.continue_stroke(&mut s, Point::new(380.0, 50.0), &mut rng);
        let rgba = s.read_rgba().unwrap();
        for x in (20..380).step_by(10) {
            assert_eq!(rgba[(50 * 400 + x) * 4 + 3], 0, "gap at x={x}");
        }
        assert_eq!(rgba[(5 * 400 + 200) * 4 + 3], 255);
    }

    #[test]
    fn every_nth_policy_checks_on_schedule() {
        let mut s = opaque_surface(100, 100);
        let cfg = ScratchConfig {
            brush_radius: 2.0,
            check_policy: CheckPolicy::EveryNth { n: 3 },
            ..ScratchConfig::default()
        };
        let mut pad = ScratchPad::new(cfg);
        let mut rng = StdRng::seed_from_u64(0);
        pad.begin_stroke(&mut s, Point::new(10.0, 10.0));
        let checks: Vec<bool> = (1..=6)
            .map(|i| {
                pad.continue_stroke(&mut s, Point::new(10.0 + i as f64, 10.0), &mut rng)
                    .is_some()
            })
            .collect();
        assert_eq!(checks, vec![false, false, true, false, false, true]);
    }

    /// Drag back and forth `moves` times, returning how many moves sampled progress.
    fn scribble(pad: &mut ScratchPad, s: &mut PixmapSurface, rng: &mut StdRng, moves: u32) -> u32 {
        pad.begin_stroke(s, Point::new(10.0, 50.0));
        (0..moves)
            .filter(|i| {
                let x = 10.0 + (i % 80) as f64;
                pad.continue_stroke(s, Point::new(x, 50.0), rng).is_some()
            })
            .count() as u32
    }

    #[test]
    fn random_policy_checks_about_its_share_of_moves() {
        let mut s = opaque_surface(100, 100);
        let cfg = ScratchConfig {
            brush_radius: 2.0,
            reveal_threshold: 0.0,
            ..ScratchConfig::default()
        };
        assert_eq!(cfg.check_policy, CheckPolicy::Random { probability: 0.2 });
        let mut pad = ScratchPad::new(cfg);
        let checks = scribble(&mut pad, &mut s, &mut StdRng::seed_from_u64(17), 1_000);
        assert!((150..=250).contains(&checks), "checked {checks}/1000 moves");
        assert!(!pad.is_revealed());
    }

    #[test]
    fn zero_probability_only_checks_on_stroke_end() {
        let mut s = opaque_surface(100, 100);
        let cfg = ScratchConfig {
            brush_radius: 2.0,
            check_policy: CheckPolicy::Random { probability: 0.0 },
            ..ScratchConfig::default()
        };
        let mut pad = ScratchPad::new(cfg);
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(scribble(&mut pad, &mut s, &mut rng, 200), 0);
        assert!(pad.end_stroke(&mut s).is_some());
    }

    #[test]
    fn non_finite_probability_does_not_panic() {
        for probability in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let mut s = opaque_surface(100, 100);
            let cfg = ScratchConfig {
                brush_radius: 2.0,
                check_policy: CheckPolicy::Random { probability },
                ..ScratchConfig::default()
            };
            let mut pad = ScratchPad::new(cfg);
            let mut rng = StdRng::seed_from_u64(4);
            assert_eq!(scribble(&mut pad, &mut s, &mut rng, 50), 0, "{probability}");
            assert!(pad.end_stroke(&mut s).is_some());
        }
    }

    #[test]
    fn reveal_fires_once_and_freezes_input() {
        let mut s = opaque_surface(100, 100);
        let mut pad = ScratchPad::new(ScratchConfig::default());
        let hits = counter(&mut pad);

        s.clear();
        assert_eq!(pad.check_progress(&mut s), Some(0.0));
        assert_eq!(pad.check_progress(&mut s), Some(0.0));
        assert_eq!(hits.get(), 1);
        assert!(pad.is_revealed());

        assert!(!pad.begin_stroke(&mut s, Point::new(50.0, 50.0)));
        assert!(!pad.is_stroking());
    }

    #[test]
    fn forced_reveal_clears_and_skips_callback() {
        let mut s = opaque_surface(100, 100);
        let mut pad = ScratchPad::new(ScratchConfig::default());
        let hits = counter(&mut pad);
        pad.begin_stroke(&mut s, Point::new(50.0, 50.0));

        pad.force_reveal(&mut s);
        assert!(pad.is_revealed());
        assert!(!pad.is_stroking());
        assert!(s.read_rgba().unwrap().iter().all(|b| *b == 0));
        pad.end_stroke(&mut s);
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn handle_routes_lifecycle() {
        let mut s = opaque_surface(100, 100);
        let mut pad = ScratchPad::new(ScratchConfig::default());
        let mut rng = StdRng::seed_from_u64(9);
        pad.handle(&mut s, PointerInput::Down(Point::new(30.0, 30.0)), &mut rng);
        assert!(pad.is_stroking());
        pad.handle(&mut s, PointerInput::Move(Point::new(60.0, 30.0)), &mut rng);
        let pct = pad.handle(&mut s, PointerInput::Leave, &mut rng);
        assert!(!pad.is_stroking());
        assert!(pct.is_some());
    }
}
