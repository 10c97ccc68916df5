//! Confetti fireworks played after the reveal.
//!
//! Bursts are emitted on a fixed cadence from two random origins (one left,
//! one right of centre) with a particle count that shrinks linearly to zero
//! over the show's duration. Particles advance one tick per animation frame.

use rand::Rng;

use crate::config::{FireworksConfig, MAX_PARTICLES_PER_BURST};
use crate::geometry::Point;
use crate::surface::{Fill, Rgb, Surface};

pub const PALETTE: [Rgb; 7] = [
    Rgb::hex(0x26CCFF),
    Rgb::hex(0xA25AFD),
    Rgb::hex(0xFF5E7E),
    Rgb::hex(0x88FF5A),
    Rgb::hex(0xFCFF42),
    Rgb::hex(0xFFA62D),
    Rgb::hex(0xFF36FF),
];

#[derive(Clone, Debug)]
struct Particle {
    pos: Point,
    angle: f64,
    velocity: f64,
    tick: u32,
    color: Rgb,
}

pub struct Fireworks {
    config: FireworksConfig,
    viewport: (f64, f64),
    start_ms: f64,
    next_burst_ms: f64,
    particles: Vec<Particle>,
}

impl Fireworks {
    pub fn new(config: FireworksConfig, viewport: (f64, f64), start_ms: f64) -> Self {
        Self {
            config,
            viewport,
            start_ms,
            next_burst_ms: start_ms,
            particles: Vec::new(),
        }
    }

    pub fn set_viewport(&mut self, viewport: (f64, f64)) {
        self.viewport = viewport;
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    fn end_ms(&self) -> f64 {
        self.start_ms + self.config.duration_ms
    }

    /// No more bursts are due and every particle has burnt out.
    pub fn is_finished(&self, now_ms: f64) -> bool {
        now_ms >= self.end_ms() && self.particles.is_empty()
    }

    /// Emit any bursts due by `now_ms`, then advance all particles one tick.
    pub fn update<R: Rng>(&mut self, now_ms: f64, rng: &mut R) {
        let interval = self.config.interval_ms.max(1.0);
        while self.next_burst_ms <= now_ms && self.next_burst_ms < self.end_ms() {
            let time_left = self.end_ms() - self.next_burst_ms;
            let count = (self.config.particles_per_burst * time_left / self.config.duration_ms)
                .clamp(0.0, MAX_PARTICLES_PER_BURST) as usize;
            let left = Point::new(rng.gen_range(0.1..0.3), rng.gen_range(0.0..1.0) - 0.2);
            let right = Point::new(rng.gen_range(0.7..0.9), rng.gen_range(0.0..1.0) - 0.2);
            self.burst(left, count, rng);
            self.burst(right, count, rng);
            self.next_burst_ms += interval;
        }

        let cfg = &self.config;
        for p in &mut self.particles {
            p.pos.x += p.angle.cos() * p.velocity;
            p.pos.y += p.angle.sin() * p.velocity + cfg.gravity;
            p.velocity *= cfg.decay;
            p.tick += 1;
        }
        self.particles.retain(|p| p.tick < cfg.ticks);
    }

    /// `origin` is in viewport fractions.
    fn burst<R: Rng>(&mut self, origin: Point, count: usize, rng: &mut R) {
        let start = Point::new(origin.x * self.viewport.0, origin.y * self.viewport.1);
        let launch = (-90f64).to_radians();
        let spread = self.config.spread_deg.to_radians();
        let v0 = self.config.start_velocity;
        for _ in 0..count {
            self.particles.push(Particle {
                pos: start,
                angle: launch + (0.5 * spread - rng.gen_range(0.0..1.0) * spread),
                velocity: v0 * 0.5 + rng.gen_range(0.0..1.0) * v0,
                tick: 0,
                color: PALETTE[rng.gen_range(0..PALETTE.len())],
            });
        }
    }

    /// Draw the current particles, fading each one out over its lifetime.
    pub fn render<S: Surface + ?Sized>(&self, surface: &mut S) {
        surface.clear();
        let ticks = self.config.ticks.max(1) as f64;
        for p in &self.particles {
            let alpha = 1.0 - p.tick as f64 / ticks;
            surface.fill_circle(
                p.pos,
                self.config.particle_radius,
                Fill {
                    color: p.color,
                    alpha,
                },
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::PixmapSurface;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn show() -> Fireworks {
        Fireworks::new(FireworksConfig::default(), (800.0, 600.0), 1_000.0)
    }

    #[test]
    fn first_frame_emits_two_full_bursts() {
        let mut fw = show();
        fw.update(1_000.0, &mut StdRng::seed_from_u64(1));
        assert_eq!(fw.particle_count(), 100);
    }

    #[test]
    fn bursts_shrink_over_time() {
        let mut fw = show();
        let mut rng = StdRng::seed_from_u64(2);
        fw.update(1_000.0, &mut rng);
        let first = fw.particle_count();
        // Jump ahead so earlier particles have burnt out and only the late
        // bursts are alive.
        let mut late = show();
        late.next_burst_ms = 1_000.0 + 4_750.0;
        late.update(1_000.0 + 4_750.0, &mut rng);
        assert!(late.particle_count() < first / 4);
    }

    #[test]
    fn runs_to_completion() {
        let mut fw = show();
        let mut rng = StdRng::seed_from_u64(3);
        let mut now = 1_000.0;
        assert!(!fw.is_finished(now));
        while !fw.is_finished(now) {
            fw.update(now, &mut rng);
            now += 16.0;
            assert!(now < 20_000.0, "fireworks never finished");
        }
        assert_eq!(fw.particle_count(), 0);
        assert!(now >= 6_000.0);
    }

    #[test]
    fn particles_fall_under_gravity() {
        let cfg = FireworksConfig {
            start_velocity: 0.0,
            ..FireworksConfig::default()
        };
        let mut fw = Fireworks::new(cfg, (100.0, 100.0), 0.0);
        let mut rng = StdRng::seed_from_u64(4);
        fw.update(0.0, &mut rng);
        let y0: Vec<f64> = fw.particles.iter().map(|p| p.pos.y).collect();
        fw.update(1.0, &mut rng);
        for (p, y) in fw.particles.iter().zip(y0) {
            assert!((p.pos.y - y - 3.0).abs() < 1e-9);
        }
    }

    #[test]
    fn oversized_burst_is_capped() {
        let cfg = FireworksConfig {
            particles_per_burst: 1e300,
            ..FireworksConfig::default()
        };
        let mut fw = Fireworks::new(cfg, (100.0, 100.0), 0.0);
        fw.update(0.0, &mut StdRng::seed_from_u64(6));
        assert_eq!(fw.particle_count(), 2 * MAX_PARTICLES_PER_BURST as usize);
    }

    #[test]
    fn render_draws_onto_surface() {
        let mut fw = Fireworks::new(FireworksConfig::default(), (200.0, 200.0), 0.0);
        fw.update(0.0, &mut StdRng::seed_from_u64(5));
        let mut s = PixmapSurface::new(200, 200).unwrap();
        fw.render(&mut s);
        assert!(s.read_rgba().unwrap().chunks(4).any(|px| px[3] > 0));
    }
}
