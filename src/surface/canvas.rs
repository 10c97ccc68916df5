use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::{Composite, Fill, LinearGradient, Surface};
use crate::error::CardError;
use crate::geometry::{PathCmd, Point};

/// Surface over a browser `<canvas>` 2D context.
///
/// Draw errors from the context are logged and otherwise ignored: a broken
/// canvas only costs the decoration, never the page.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    /// Wrap the canvas' 2D context. `read_back` hints the browser that pixels
    /// will be read frequently (keeps the backing store on the CPU).
    pub fn new(canvas: &HtmlCanvasElement, read_back: bool) -> Result<Self, CardError> {
        let options = js_sys::Object::new();
        js_sys::Reflect::set(
            &options,
            &JsValue::from_str("willReadFrequently"),
            &JsValue::from_bool(read_back),
        )?;
        let ctx: CanvasRenderingContext2d = canvas
            .get_context_with_context_options("2d", &options)?
            .ok_or(CardError::ContextUnavailable)?
            .dyn_into()
            .map_err(|_| CardError::ContextUnavailable)?;
        Ok(Self {
            canvas: canvas.clone(),
            ctx,
        })
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    fn trace_path(&self, cmds: &[PathCmd]) {
        self.ctx.begin_path();
        for cmd in cmds {
            match *cmd {
                PathCmd::MoveTo(p) => self.ctx.move_to(p.x, p.y),
                PathCmd::CubicTo(c1, c2, p) => {
                    self.ctx.bezier_curve_to(c1.x, c1.y, c2.x, c2.y, p.x, p.y)
                }
                PathCmd::Close => self.ctx.close_path(),
            }
        }
    }

    fn apply_fill(&self, fill: Fill) {
        let css = fill.color.to_css();
        self.ctx.set_fill_style_str(&css);
        self.ctx.set_stroke_style_str(&css);
        self.ctx.set_global_alpha(fill.alpha.clamp(0.0, 1.0));
    }
}

fn warn_js(op: &str, err: JsValue) {
    log::warn!("canvas {op} failed: {err:?}");
}

impl Surface for CanvasSurface {
    fn size(&self) -> (u32, u32) {
        (self.canvas.width(), self.canvas.height())
    }

    fn save(&mut self) {
        self.ctx.save();
    }

    fn restore(&mut self) {
        self.ctx.restore();
    }

    fn clip(&mut self, path: &[PathCmd]) {
        self.trace_path(path);
        self.ctx.clip();
    }

    fn set_composite(&mut self, mode: Composite) {
        if let Err(e) = self.ctx.set_global_composite_operation(mode.css_name()) {
            warn_js("composite", e);
        }
    }

    fn fill_rect_gradient(&mut self, x: f64, y: f64, w: f64, h: f64, gradient: &LinearGradient) {
        let g = self.ctx.create_linear_gradient(
            gradient.from.x,
            gradient.from.y,
            gradient.to.x,
            gradient.to.y,
        );
        for stop in gradient.stops {
            if let Err(e) = g.add_color_stop(stop.offset, &stop.color.to_css()) {
                warn_js("gradient stop", e);
                return;
            }
        }
        self.ctx.set_global_alpha(1.0);
        self.ctx.set_fill_style_canvas_gradient(&g);
        self.ctx.fill_rect(x, y, w, h);
    }

    fn fill_circle(&mut self, center: Point, radius: f64, fill: Fill) {
        if radius <= 0.0 {
            return;
        }
        self.apply_fill(fill);
        self.ctx.begin_path();
        if let Err(e) = self
            .ctx
            .arc(center.x, center.y, radius, 0.0, std::f64::consts::TAU)
        {
            warn_js("arc", e);
            return;
        }
        self.ctx.fill();
    }

    fn stroke_line(&mut self, from: Point, to: Point, width: f64, fill: Fill) {
        self.apply_fill(fill);
        self.ctx.set_line_width(width);
        self.ctx.set_line_cap("round");
        self.ctx.begin_path();
        self.ctx.move_to(from.x, from.y);
        self.ctx.line_to(to.x, to.y);
        self.ctx.stroke();
    }

    fn clear(&mut self) {
        let (w, h) = self.size();
        self.ctx.clear_rect(0.0, 0.0, w as f64, h as f64);
    }

    fn read_rgba(&self) -> Option<Vec<u8>> {
        let (w, h) = self.size();
        match self.ctx.get_image_data(0.0, 0.0, w as f64, h as f64) {
            Ok(img) => Some(img.data().0),
            Err(e) => {
                warn_js("getImageData", e);
                None
            }
        }
    }
}
