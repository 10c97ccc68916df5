use tiny_skia::{
    BlendMode, Color, FillRule, LineCap, Mask, Paint, Path, PathBuilder, Pixmap, Rect, SpreadMode,
    Stroke, Transform,
};

use super::{Composite, Fill, LinearGradient, Surface};
use crate::geometry::{PathCmd, Point};

#[derive(Clone)]
struct DrawState {
    clip: Option<Mask>,
    composite: Composite,
}

/// Software surface backed by a tiny-skia `Pixmap`.
pub struct PixmapSurface {
    pixmap: Pixmap,
    state: DrawState,
    stack: Vec<DrawState>,
}

impl PixmapSurface {
    /// Transparent surface, or `None` for a zero-sized request.
    pub fn new(width: u32, height: u32) -> Option<Self> {
        Some(Self {
            pixmap: Pixmap::new(width, height)?,
            state: DrawState {
                clip: None,
                composite: Composite::SourceOver,
            },
            stack: Vec::new(),
        })
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    fn paint(&self, fill: Fill) -> Paint<'static> {
        let mut paint = Paint::default();
        let a = (fill.alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
        paint.set_color(Color::from_rgba8(fill.color.r, fill.color.g, fill.color.b, a));
        paint.blend_mode = self.blend_mode();
        paint.anti_alias = true;
        paint
    }

    fn blend_mode(&self) -> BlendMode {
        match self.state.composite {
            Composite::SourceOver => BlendMode::SourceOver,
            Composite::DestinationOut => BlendMode::DestinationOut,
        }
    }
}

fn build_path(cmds: &[PathCmd]) -> Option<Path> {
    let mut pb = PathBuilder::new();
    for cmd in cmds {
        match *cmd {
            PathCmd::MoveTo(p) => pb.move_to(p.x as f32, p.y as f32),
            PathCmd::CubicTo(c1, c2, p) => pb.cubic_to(
                c1.x as f32,
                c1.y as f32,
                c2.x as f32,
                c2.y as f32,
                p.x as f32,
                p.y as f32,
            ),
            PathCmd::Close => pb.close(),
        }
    }
    pb.finish()
}

impl Surface for PixmapSurface {
    fn size(&self) -> (u32, u32) {
        (self.pixmap.width(), self.pixmap.height())
    }

    fn save(&mut self) {
        self.stack.push(self.state.clone());
    }

    fn restore(&mut self) {
        if let Some(prev) = self.stack.pop() {
            self.state = prev;
        }
    }

    fn clip(&mut self, cmds: &[PathCmd]) {
        let Some(path) = build_path(cmds) else {
            log::warn!("clip path is empty; ignoring");
            return;
        };
        match self.state.clip.as_mut() {
            Some(mask) => mask.intersect_path(&path, FillRule::Winding, true, Transform::identity()),
            None => {
                let Some(mut mask) = Mask::new(self.pixmap.width(), self.pixmap.height()) else {
                    return;
                };
                mask.fill_path(&path, FillRule::Winding, true, Transform::identity());
                self.state.clip = Some(mask);
            }
        }
    }

    fn set_composite(&mut self, mode: Composite) {
        self.state.composite = mode;
    }

    fn fill_rect_gradient(&mut self, x: f64, y: f64, w: f64, h: f64, gradient: &LinearGradient) {
        let Some(rect) = Rect::from_xywh(x as f32, y as f32, w as f32, h as f32) else {
            return;
        };
        let stops = gradient
            .stops
            .iter()
            .map(|s| {
                tiny_skia::GradientStop::new(
                    s.offset,
                    Color::from_rgba8(s.color.r, s.color.g, s.color.b, 255),
                )
            })
            .collect();
        let shader = tiny_skia::LinearGradient::new(
            tiny_skia::Point::from_xy(gradient.from.x as f32, gradient.from.y as f32),
            tiny_skia::Point::from_xy(gradient.to.x as f32, gradient.to.y as f32),
            stops,
            SpreadMode::Pad,
            Transform::identity(),
        );
        let Some(shader) = shader else {
            log::warn!("degenerate gradient; skipping fill");
            return;
        };
        let paint = Paint {
            shader,
            blend_mode: self.blend_mode(),
            anti_alias: true,
            ..Paint::default()
        };
        self.pixmap
            .fill_rect(rect, &paint, Transform::identity(), self.state.clip.as_ref());
    }

    fn fill_circle(&mut self, center: Point, radius: f64, fill: Fill) {
        let Some(path) = PathBuilder::from_circle(center.x as f32, center.y as f32, radius as f32)
        else {
            return;
        };
        let paint = self.paint(fill);
        self.pixmap.fill_path(
            &path,
            &paint,
            FillRule::Winding,
            Transform::identity(),
            self.state.clip.as_ref(),
        );
    }

    fn stroke_line(&mut self, from: Point, to: Point, width: f64, fill: Fill) {
        let mut pb = PathBuilder::new();
        pb.move_to(from.x as f32, from.y as f32);
        pb.line_to(to.x as f32, to.y as f32);
        let Some(path) = pb.finish() else {
            return;
        };
        let stroke = Stroke {
            width: width as f32,
            line_cap: LineCap::Round,
            ..Stroke::default()
        };
        let paint = self.paint(fill);
        self.pixmap.stroke_path(
            &path,
            &paint,
            &stroke,
            Transform::identity(),
            self.state.clip.as_ref(),
        );
    }

    fn clear(&mut self) {
        self.pixmap.fill(Color::TRANSPARENT);
    }

    fn read_rgba(&self) -> Option<Vec<u8>> {
        Some(self.pixmap.data().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{GradientStop, Rgb};

    fn alpha_at(s: &PixmapSurface, x: u32, y: u32) -> u8 {
        let (w, _) = s.size();
        s.pixmap().data()[((y * w + x) * 4 + 3) as usize]
    }

    const STOPS: [GradientStop; 2] = [
        GradientStop {
            offset: 0.0,
            color: Rgb::hex(0x000000),
        },
        GradientStop {
            offset: 1.0,
            color: Rgb::hex(0xFFFFFF),
        },
    ];

    fn fill_all(s: &mut PixmapSurface) {
        let (w, h) = s.size();
        let g = LinearGradient {
            from: Point::new(0.0, 0.0),
            to: Point::new(w as f64, h as f64),
            stops: &STOPS,
        };
        s.fill_rect_gradient(0.0, 0.0, w as f64, h as f64, &g);
    }

    #[test]
    fn zero_size_is_rejected() {
        assert!(PixmapSurface::new(0, 10).is_none());
    }

    #[test]
    fn gradient_fill_is_opaque() {
        let mut s = PixmapSurface::new(20, 20).unwrap();
        fill_all(&mut s);
        assert!(s.pixmap().data().chunks(4).all(|px| px[3] == 255));
    }

    #[test]
    fn destination_out_removes_coverage() {
        let mut s = PixmapSurface::new(40, 40).unwrap();
        fill_all(&mut s);
        s.set_composite(Composite::DestinationOut);
        s.fill_circle(Point::new(20.0, 20.0), 5.0, Fill::opaque(Rgb::WHITE));
        assert_eq!(alpha_at(&s, 20, 20), 0);
        assert_eq!(alpha_at(&s, 2, 2), 255);
    }

    #[test]
    fn round_line_erases_between_endpoints() {
        let mut s = PixmapSurface::new(60, 20).unwrap();
        fill_all(&mut s);
        s.set_composite(Composite::DestinationOut);
        s.stroke_line(
            Point::new(5.0, 10.0),
            Point::new(55.0, 10.0),
            6.0,
            Fill::opaque(Rgb::WHITE),
        );
        assert_eq!(alpha_at(&s, 30, 10), 0);
        assert_eq!(alpha_at(&s, 30, 1), 255);
    }

    #[test]
    fn restore_drops_clip() {
        let mut s = PixmapSurface::new(20, 20).unwrap();
        s.save();
        s.clip(&[
            PathCmd::MoveTo(Point::new(0.0, 0.0)),
            PathCmd::CubicTo(
                Point::new(3.0, 0.0),
                Point::new(7.0, 0.0),
                Point::new(10.0, 0.0),
            ),
            PathCmd::CubicTo(
                Point::new(10.0, 3.0),
                Point::new(10.0, 7.0),
                Point::new(10.0, 10.0),
            ),
            PathCmd::CubicTo(
                Point::new(7.0, 10.0),
                Point::new(3.0, 10.0),
                Point::new(0.0, 10.0),
            ),
            PathCmd::Close,
        ]);
        fill_all(&mut s);
        assert_eq!(alpha_at(&s, 15, 15), 0);
        s.restore();
        fill_all(&mut s);
        assert_eq!(alpha_at(&s, 15, 15), 255);
    }
}
