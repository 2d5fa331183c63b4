//! Canvas 2D surface (wasm32)

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::{DrawCommand, RenderSurface, css_color};

pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, wasm_bindgen::JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| wasm_bindgen::JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        Ok(Self { canvas, ctx })
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    pub fn width(&self) -> f32 {
        self.canvas.width() as f32
    }

    pub fn height(&self) -> f32 {
        self.canvas.height() as f32
    }
}

impl RenderSurface for CanvasSurface {
    fn present(&mut self, commands: &[DrawCommand]) {
        let ctx = &self.ctx;
        for command in commands {
            match *command {
                DrawCommand::Clear { color } => {
                    ctx.set_fill_style_str(&css_color(color));
                    ctx.fill_rect(0.0, 0.0, self.width() as f64, self.height() as f64);
                }
                DrawCommand::Rect { x, y, w, h, color } => {
                    ctx.set_fill_style_str(&css_color(color));
                    ctx.fill_rect(x as f64, y as f64, w as f64, h as f64);
                }
                DrawCommand::Circle {
                    x,
                    y,
                    radius,
                    color,
                } => {
                    ctx.set_fill_style_str(&css_color(color));
                    ctx.begin_path();
                    if ctx
                        .arc(x as f64, y as f64, radius.max(0.0) as f64, 0.0, std::f64::consts::TAU)
                        .is_ok()
                    {
                        ctx.fill();
                    }
                }
                DrawCommand::Line {
                    from,
                    to,
                    width,
                    color,
                } => {
                    ctx.set_stroke_style_str(&css_color(color));
                    ctx.set_line_width(width as f64);
                    ctx.begin_path();
                    ctx.move_to(from[0] as f64, from[1] as f64);
                    ctx.line_to(to[0] as f64, to[1] as f64);
                    ctx.stroke();
                }
            }
        }
    }
}
